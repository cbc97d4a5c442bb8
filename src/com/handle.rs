//! Owned, reference-counted native interface pointers.

use std::ffi::c_void;
use std::fmt;
use std::ptr::NonNull;

use super::abi::{Guid, HResult, IUnknownVtbl, RawPtr};

/// One owned reference on a COM object.
///
/// `release` gives the reference back exactly once; further calls are no-ops
/// and `Drop` only releases what is still held. Cloning takes a new
/// reference, so the clone is an independent owner. The raw pointer keeps
/// this type `!Send` and `!Sync`.
pub struct ComPtr {
    raw: Option<NonNull<c_void>>,
}

impl ComPtr {
    /// Adopt one reference on `raw`. Null yields `None`.
    ///
    /// # Safety
    /// `raw` must be null or a live COM interface pointer whose reference the
    /// caller hands over.
    pub unsafe fn from_raw(raw: RawPtr) -> Option<Self> {
        NonNull::new(raw).map(|raw| Self { raw: Some(raw) })
    }

    /// Take an additional reference on a borrowed pointer.
    ///
    /// # Safety
    /// Same as [`ComPtr::from_raw`], except the caller keeps its own reference.
    pub unsafe fn from_borrowed(raw: RawPtr) -> Option<Self> {
        let ptr = Self::from_raw(raw)?;
        (Self::unknown_vtbl(raw).add_ref)(raw);
        Some(ptr)
    }

    /// The interface pointer, or `None` once released.
    pub fn as_raw(&self) -> Option<RawPtr> {
        self.raw.map(NonNull::as_ptr)
    }

    pub fn is_released(&self) -> bool {
        self.raw.is_none()
    }

    /// Give up ownership without releasing.
    pub fn into_raw(mut self) -> RawPtr {
        self.raw.take().map_or(std::ptr::null_mut(), NonNull::as_ptr)
    }

    /// Reinterpret the object's vtable as `V`.
    ///
    /// # Safety
    /// The pointer must have been obtained for an interface whose vtable is
    /// laid out exactly as `V`.
    pub unsafe fn vtable<V>(&self) -> Option<(RawPtr, &V)> {
        let raw = self.as_raw()?;
        let vtbl = *(raw as *const *const V);
        Some((raw, &*vtbl))
    }

    unsafe fn unknown_vtbl<'a>(raw: RawPtr) -> &'a IUnknownVtbl {
        &**(raw as *const *const IUnknownVtbl)
    }

    /// `IUnknown::QueryInterface`. The result is a new, independent owner.
    pub fn query_interface(&self, iid: &Guid) -> Result<ComPtr, HResult> {
        let Some(raw) = self.as_raw() else {
            return Err(HResult::E_POINTER);
        };
        let mut out: RawPtr = std::ptr::null_mut();
        // SAFETY: `raw` is live and every COM vtable starts with IUnknown.
        let hr = unsafe { (Self::unknown_vtbl(raw).query_interface)(raw, iid, &mut out) };
        hr.ok()?;
        // SAFETY: a successful QueryInterface hands us one reference.
        unsafe { ComPtr::from_raw(out) }.ok_or(HResult::E_POINTER)
    }

    /// `IUnknown::Release`, at most once. Returns the remaining count reported
    /// by the object, or `None` if this handle was already released.
    pub fn release(&mut self) -> Option<u32> {
        let raw = self.raw.take()?;
        // SAFETY: we owned exactly this one reference.
        let remaining = unsafe { (Self::unknown_vtbl(raw.as_ptr()).release)(raw.as_ptr()) };
        tracing::trace!(ptr = ?raw, remaining, "released native handle");
        Some(remaining)
    }
}

impl Clone for ComPtr {
    fn clone(&self) -> Self {
        match self.as_raw() {
            // SAFETY: the pointer is live while we hold our own reference.
            Some(raw) => unsafe { Self::from_borrowed(raw) }.unwrap_or(Self { raw: None }),
            None => Self { raw: None },
        }
    }
}

impl Drop for ComPtr {
    fn drop(&mut self) {
        self.release();
    }
}

impl fmt::Debug for ComPtr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.raw {
            Some(raw) => write!(f, "ComPtr({raw:p})"),
            None => f.write_str("ComPtr(released)"),
        }
    }
}
