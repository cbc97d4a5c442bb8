//! BSTR ownership and VARIANT cleanup.
//!
//! On Windows the strings come from `windows::core::BSTR` and variants are
//! cleared with `VariantClear`. Elsewhere an allocator with the same memory
//! layout (32-bit byte-length prefix, UTF-16 payload, terminating NUL) stands
//! in so the binding layer runs unchanged against in-process objects.

use std::ptr::NonNull;

use super::abi::{HResult, IUnknownVtbl, RawPtr, Variant, VT_BSTR, VT_DISPATCH, VT_EMPTY, VT_UNKNOWN};

/// An owned BSTR. Freed on drop.
pub struct Bstr(Option<NonNull<u16>>);

impl Bstr {
    /// Allocate a copy of `value`. Fails with `E_OUTOFMEMORY` when the
    /// allocator hands back nothing for a non-empty string.
    pub fn new(value: &str) -> Result<Self, HResult> {
        let wide: Vec<u16> = value.encode_utf16().collect();
        // SAFETY: `wide` is a valid slice for the duration of the call.
        let raw = unsafe { sys::alloc(&wide) }?;
        Self::adopt_alloc(raw, wide.is_empty())
    }

    fn adopt_alloc(raw: *mut u16, empty: bool) -> Result<Self, HResult> {
        match NonNull::new(raw) {
            Some(p) => Ok(Self(Some(p))),
            None if empty => Ok(Self(None)),
            None => Err(HResult::E_OUTOFMEMORY),
        }
    }

    /// Adopt a BSTR allocated by the system. Null is the empty string.
    ///
    /// # Safety
    /// `raw` must be null or a BSTR this process owns and nobody else frees.
    pub unsafe fn from_raw(raw: *mut u16) -> Self {
        Self(NonNull::new(raw))
    }

    /// Give up ownership; the caller must free the result.
    pub fn into_raw(mut self) -> *mut u16 {
        self.0.take().map_or(std::ptr::null_mut(), NonNull::as_ptr)
    }

    pub fn len(&self) -> usize {
        // SAFETY: the pointer is a live BSTR owned by `self`.
        self.0.map_or(0, |p| unsafe { sys::len(p.as_ptr()) })
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn as_wide(&self) -> &[u16] {
        match self.0 {
            // SAFETY: a BSTR holds `len` initialized code units after its prefix.
            Some(p) => unsafe { std::slice::from_raw_parts(p.as_ptr(), self.len()) },
            None => &[],
        }
    }
}

impl std::fmt::Display for Bstr {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&String::from_utf16_lossy(self.as_wide()))
    }
}

impl Drop for Bstr {
    fn drop(&mut self) {
        if let Some(p) = self.0.take() {
            // SAFETY: we own the string and free it exactly once.
            unsafe { sys::free(p.as_ptr()) }
        }
    }
}

/// Release whatever `variant` owns and reset it to `VT_EMPTY`.
///
/// # Safety
/// `variant` must hold a payload this process owns.
pub unsafe fn variant_clear(variant: &mut Variant) {
    match variant.vt {
        VT_EMPTY => {}
        VT_BSTR => drop(Bstr::from_raw(variant.data.bstr)),
        VT_UNKNOWN | VT_DISPATCH => {
            let raw: RawPtr = variant.data.unknown;
            if !raw.is_null() {
                let vtbl = *(raw as *const *const IUnknownVtbl);
                ((*vtbl).release)(raw);
            }
        }
        vt => {
            if let Err(code) = sys::clear_other(variant) {
                tracing::debug!(vt, %code, "VariantClear failed");
            }
        }
    }
    *variant = Variant::empty();
}

#[cfg(windows)]
mod sys {
    use std::mem::ManuallyDrop;

    use windows::core::BSTR;
    use windows::Win32::System::Variant::{VariantClear, VARIANT};

    use crate::com::abi::{HResult, Variant};

    /// Null for an empty slice, matching `BSTR::from_wide`.
    pub unsafe fn alloc(wide: &[u16]) -> Result<*mut u16, HResult> {
        let bstr = BSTR::from_wide(wide).map_err(HResult::from)?;
        Ok(bstr.into_raw() as *mut u16)
    }

    pub unsafe fn free(bstr: *mut u16) {
        drop(BSTR::from_raw(bstr));
    }

    pub unsafe fn len(bstr: *mut u16) -> usize {
        ManuallyDrop::new(BSTR::from_raw(bstr)).len()
    }

    pub unsafe fn clear_other(variant: &mut Variant) -> Result<(), HResult> {
        VariantClear(variant as *mut Variant as *mut VARIANT).map_err(HResult::from)
    }
}

#[cfg(not(windows))]
mod sys {
    use std::alloc::{alloc as raw_alloc, dealloc, Layout};

    use crate::com::abi::{HResult, Variant};

    const PREFIX: usize = std::mem::size_of::<u32>();

    fn layout(units: usize) -> Option<Layout> {
        Layout::from_size_align(PREFIX + (units + 1) * 2, PREFIX).ok()
    }

    pub unsafe fn alloc(wide: &[u16]) -> Result<*mut u16, HResult> {
        let bytes = u32::try_from(wide.len() * 2).map_err(|_| HResult::E_OUTOFMEMORY)?;
        let layout = layout(wide.len()).ok_or(HResult::E_OUTOFMEMORY)?;
        let base = raw_alloc(layout);
        if base.is_null() {
            return Err(HResult::E_OUTOFMEMORY);
        }
        (base as *mut u32).write(bytes);
        let data = base.add(PREFIX) as *mut u16;
        std::ptr::copy_nonoverlapping(wide.as_ptr(), data, wide.len());
        data.add(wide.len()).write(0);
        Ok(data)
    }

    pub unsafe fn free(bstr: *mut u16) {
        let units = len(bstr);
        let base = (bstr as *mut u8).sub(PREFIX);
        if let Some(layout) = layout(units) {
            dealloc(base, layout);
        }
    }

    pub unsafe fn len(bstr: *mut u16) -> usize {
        let base = (bstr as *const u8).sub(PREFIX) as *const u32;
        base.read() as usize / 2
    }

    /// Scalars own nothing.
    pub unsafe fn clear_other(_variant: &mut Variant) -> Result<(), HResult> {
        Ok(())
    }
}
