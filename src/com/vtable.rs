//! Direct vtable-slot invocation.
//!
//! Used for members that are not reachable through automation: anything
//! returning a GUID, several out-parameters at once, or an interface pointer
//! typed in the IDL. The vtable layouts themselves live next to the proxies
//! that use them and must match the SDK header slot for slot.

use super::abi::{HResult, RawPtr};
use super::handle::ComPtr;
use crate::error::{Error, Result};

/// The receiver pointer and its vtable, or `Released`.
///
/// # Safety
/// `handle` must point at an interface whose vtable has layout `V`.
pub unsafe fn slots<'a, V>(handle: &'a ComPtr, interface: &'static str) -> Result<(RawPtr, &'a V)> {
    handle.vtable::<V>().ok_or(Error::Released { interface })
}

/// Map the status of a vtable call. Success codes, `S_FALSE` included, pass.
pub fn check(code: HResult, interface: &'static str, member: &'static str) -> Result<()> {
    if code.is_err() {
        tracing::debug!(interface, member, %code, "vtable call failed");
        return Err(Error::VtableCall { interface, member, code });
    }
    Ok(())
}

/// Wrap an interface pointer returned through an out-parameter.
///
/// # Safety
/// `raw` must be null or a pointer whose reference the callee handed over.
pub unsafe fn adopt(raw: RawPtr, interface: &'static str, member: &'static str) -> Result<ComPtr> {
    ComPtr::from_raw(raw).ok_or(Error::VtableCall { interface, member, code: HResult::E_POINTER })
}
