//! GUID-keyed interface resolution.
//!
//! Each proxy type names the one interface identifier it wraps. Resolution
//! asks the native object for that identifier and wraps the answer, so the
//! proxy type is chosen by the constant, never by inspecting the object.

use super::abi::{Guid, RawPtr};
use super::dispatch::Value;
use super::handle::ComPtr;
use crate::error::{Error, Result};

/// A proxy bound to one well-known interface.
pub trait Interface: Sized {
    const IID: Guid;
    const NAME: &'static str;

    /// Wrap a handle that already points at `Self::IID`.
    fn from_handle(handle: ComPtr) -> Self;

    /// The wrapped handle.
    fn handle(&self) -> &ComPtr;

    fn handle_mut(&mut self) -> &mut ComPtr;

    /// Drop the native reference now. Later calls are no-ops and later
    /// member calls fail with [`Error::Released`].
    fn release(&mut self) {
        if self.handle_mut().release().is_some() {
            tracing::trace!(interface = Self::NAME, "proxy released");
        }
    }

    fn is_released(&self) -> bool {
        self.handle().is_released()
    }
}

/// Query `unknown` for `T::IID` and wrap the new reference.
///
/// The caller keeps its own reference on `unknown`.
pub fn resolve<T: Interface>(unknown: &ComPtr) -> Result<T> {
    if unknown.is_released() {
        return Err(null_handle::<T>());
    }
    match unknown.query_interface(&T::IID) {
        Ok(handle) => Ok(T::from_handle(handle)),
        Err(code) => {
            tracing::debug!(interface = T::NAME, iid = %T::IID, %code, "QueryInterface failed");
            Err(Error::Resolve { interface: T::NAME, iid: T::IID, code })
        }
    }
}

/// [`resolve`] over a borrowed raw pointer; null fails before any native call.
///
/// # Safety
/// `raw` must be null or a live COM interface pointer.
pub unsafe fn resolve_raw<T: Interface>(raw: RawPtr) -> Result<T> {
    let unknown = ComPtr::from_borrowed(raw).ok_or_else(null_handle::<T>)?;
    resolve(&unknown)
}

/// Resolve the object carried by an automation result.
pub fn resolve_value<T: Interface>(value: Value) -> Result<T> {
    match value {
        Value::Object(unknown) => resolve(&unknown),
        Value::Null => Err(null_handle::<T>()),
        other => Err(Error::UnexpectedType {
            member: T::NAME,
            expected: "VT_UNKNOWN",
            actual: other.type_name(),
        }),
    }
}

fn null_handle<T: Interface>() -> Error {
    Error::NullHandle { interface: T::NAME, iid: T::IID }
}
