//! Walking automation collections through `_NewEnum` and `IEnumVARIANT`.

use super::abi::{IEnumVariantVtbl, Variant, DISPID_NEWENUM, IID_IENUMVARIANT};
use super::bstr::variant_clear;
use super::dispatch::{self, CallKind, Value};
use super::handle::ComPtr;
use super::vtable;
use crate::error::{Error, Result};

const ENUMERATOR: &str = "IEnumVARIANT";

/// Call `visit` with every element of an automation collection, in order.
///
/// Each element is handed over as an owned [`Value`]. The walk stops at the
/// first error, whether from the enumerator or from `visit`.
pub fn for_each<F>(collection: &ComPtr, interface: &'static str, mut visit: F) -> Result<usize>
where
    F: FnMut(usize, Value) -> Result<()>,
{
    let enumerator = new_enum(collection, interface)?;
    // SAFETY: `enumerator` was obtained for IID_IEnumVARIANT.
    let (this, vtbl) = unsafe { vtable::slots::<IEnumVariantVtbl>(&enumerator, ENUMERATOR)? };

    let mut index = 0;
    loop {
        let mut item = Variant::empty();
        let mut fetched = 0u32;
        // SAFETY: room for exactly one element is provided.
        let hr = unsafe { (vtbl.next)(this, 1, &mut item, &mut fetched) };
        if hr.is_err() {
            unsafe { variant_clear(&mut item) };
            return Err(Error::VtableCall { interface: ENUMERATOR, member: "Next", code: hr });
        }
        if fetched == 0 {
            break;
        }
        // SAFETY: Next transfers ownership of each fetched element.
        let value = unsafe { Value::from_variant(&mut item) };
        visit(index, value)?;
        index += 1;
    }
    Ok(index)
}

/// Fetch the collection's `_NewEnum` property and ask it for `IEnumVARIANT`.
fn new_enum(collection: &ComPtr, interface: &'static str) -> Result<ComPtr> {
    let value = dispatch::invoke_dispid(
        collection,
        interface,
        "_NewEnum",
        DISPID_NEWENUM,
        CallKind::PropertyGet,
        &[],
    )?;
    let unknown = match value {
        Value::Object(unknown) => unknown,
        other => {
            return Err(Error::UnexpectedType {
                member: "_NewEnum",
                expected: "VT_UNKNOWN",
                actual: other.type_name(),
            })
        }
    };
    unknown
        .query_interface(&IID_IENUMVARIANT)
        .map_err(|code| Error::Resolve { interface: ENUMERATOR, iid: IID_IENUMVARIANT, code })
}
