//! Raw COM ABI: GUIDs, HRESULTs, VARIANTs and the base vtable layouts.
//!
//! GUIDs and HRESULTs wrap the `windows-core` types. The rest is
//! `#[repr(C)]` and laid out exactly like the Windows SDK headers
//! (`unknwn.h`, `oaidl.h`). Interface-specific vtables embed these as their
//! first field.

use std::ffi::c_void;
use std::fmt;
use std::str::FromStr;

use windows_core::{GUID, HRESULT};

/// Untyped interface pointer as it crosses the ABI.
pub type RawPtr = *mut c_void;

// ─── GUID ────────────────────────────────────────────────────────────────────

/// 128-bit interface, class or object identifier.
///
/// Same layout as `windows_core::GUID`, with the braced registry-style
/// `Display` and a parser that rejects malformed text instead of panicking.
#[repr(transparent)]
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Guid(pub GUID);

impl Guid {
    pub const fn zeroed() -> Self {
        Self(GUID::zeroed())
    }

    /// Build a GUID from its big-endian textual value, e.g.
    /// `Guid::from_u128(0xDCB00000_570F_4A9B_8D69_199FDBA5723B)`.
    pub const fn from_u128(value: u128) -> Self {
        Self(GUID::from_u128(value))
    }

    pub const fn to_u128(&self) -> u128 {
        self.0.to_u128()
    }

    pub const fn is_zero(&self) -> bool {
        self.to_u128() == 0
    }

    pub const fn as_raw(&self) -> &GUID {
        &self.0
    }
}

impl From<GUID> for Guid {
    fn from(guid: GUID) -> Self {
        Self(guid)
    }
}

impl From<Guid> for GUID {
    fn from(guid: Guid) -> Self {
        guid.0
    }
}

impl fmt::Display for Guid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{{:?}}}", self.0)
    }
}

impl fmt::Debug for Guid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

/// Error returned when a string is not a GUID.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid GUID: {0:?}")]
pub struct ParseGuidError(pub String);

impl FromStr for Guid {
    type Err = ParseGuidError;

    /// Accepts `XXXXXXXX-XXXX-XXXX-XXXX-XXXXXXXXXXXX`, with or without braces,
    /// in any case.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || ParseGuidError(s.to_string());
        let inner = s.trim();
        let inner = match inner.strip_prefix('{') {
            Some(rest) => rest.strip_suffix('}').ok_or_else(err)?,
            None => inner,
        };

        // `GUID::from(&str)` panics on anything but the bare 36-character form.
        let lengths = [8, 4, 4, 4, 12];
        let groups: Vec<&str> = inner.split('-').collect();
        if groups.len() != lengths.len()
            || groups.iter().zip(lengths).any(|(g, len)| g.len() != len)
            || !groups.iter().all(|g| g.bytes().all(|b| b.is_ascii_hexdigit()))
        {
            return Err(err());
        }
        Ok(Self(GUID::from(inner)))
    }
}

// ─── HRESULT ─────────────────────────────────────────────────────────────────

/// Native status code. Negative values are failures.
#[repr(transparent)]
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct HResult(pub HRESULT);

const fn hr(value: u32) -> HResult {
    HResult(HRESULT(value as i32))
}

impl HResult {
    pub const S_OK: Self = hr(0);
    pub const S_FALSE: Self = hr(1);
    pub const E_NOTIMPL: Self = hr(0x8000_4001);
    pub const E_NOINTERFACE: Self = hr(0x8000_4002);
    pub const E_POINTER: Self = hr(0x8000_4003);
    pub const E_FAIL: Self = hr(0x8000_4005);
    pub const E_UNEXPECTED: Self = hr(0x8000_FFFF);
    pub const E_OUTOFMEMORY: Self = hr(0x8007_000E);
    pub const E_INVALIDARG: Self = hr(0x8007_0057);
    pub const E_ACCESSDENIED: Self = hr(0x8007_0005);
    pub const DISP_E_MEMBERNOTFOUND: Self = hr(0x8002_0003);
    pub const DISP_E_UNKNOWNNAME: Self = hr(0x8002_0006);
    pub const DISP_E_TYPEMISMATCH: Self = hr(0x8002_0005);
    pub const DISP_E_BADPARAMCOUNT: Self = hr(0x8002_000E);
    pub const RPC_E_CHANGED_MODE: Self = hr(0x8001_0106);
    pub const CO_E_NOTINITIALIZED: Self = hr(0x8004_01F0);
    pub const REGDB_E_CLASSNOTREG: Self = hr(0x8004_0154);

    pub const fn from_code(value: i32) -> Self {
        Self(HRESULT(value))
    }

    pub const fn code(self) -> i32 {
        self.0 .0
    }

    pub const fn is_ok(self) -> bool {
        self.0.is_ok()
    }

    pub const fn is_err(self) -> bool {
        self.0.is_err()
    }

    /// `Ok(self)` for success codes (including `S_FALSE`), `Err(self)` otherwise.
    pub const fn ok(self) -> Result<Self, Self> {
        if self.is_ok() { Ok(self) } else { Err(self) }
    }

    /// Symbolic name for the codes this crate cares about.
    pub fn name(self) -> Option<&'static str> {
        Some(match self {
            Self::S_OK => "S_OK",
            Self::S_FALSE => "S_FALSE",
            Self::E_NOTIMPL => "E_NOTIMPL",
            Self::E_NOINTERFACE => "E_NOINTERFACE",
            Self::E_POINTER => "E_POINTER",
            Self::E_FAIL => "E_FAIL",
            Self::E_UNEXPECTED => "E_UNEXPECTED",
            Self::E_OUTOFMEMORY => "E_OUTOFMEMORY",
            Self::E_INVALIDARG => "E_INVALIDARG",
            Self::E_ACCESSDENIED => "E_ACCESSDENIED",
            Self::DISP_E_MEMBERNOTFOUND => "DISP_E_MEMBERNOTFOUND",
            Self::DISP_E_UNKNOWNNAME => "DISP_E_UNKNOWNNAME",
            Self::DISP_E_TYPEMISMATCH => "DISP_E_TYPEMISMATCH",
            Self::DISP_E_BADPARAMCOUNT => "DISP_E_BADPARAMCOUNT",
            Self::RPC_E_CHANGED_MODE => "RPC_E_CHANGED_MODE",
            Self::CO_E_NOTINITIALIZED => "CO_E_NOTINITIALIZED",
            Self::REGDB_E_CLASSNOTREG => "REGDB_E_CLASSNOTREG",
            _ => return None,
        })
    }
}

impl From<HRESULT> for HResult {
    fn from(hr: HRESULT) -> Self {
        Self(hr)
    }
}

impl From<windows_core::Error> for HResult {
    fn from(err: windows_core::Error) -> Self {
        Self(err.code())
    }
}

impl fmt::Display for HResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.name() {
            Some(name) => write!(f, "{} ({})", self.0, name),
            None => fmt::Display::fmt(&self.0, f),
        }
    }
}

impl fmt::Debug for HResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

// ─── VARIANT ─────────────────────────────────────────────────────────────────

pub const VT_EMPTY: u16 = 0;
pub const VT_NULL: u16 = 1;
pub const VT_I2: u16 = 2;
pub const VT_I4: u16 = 3;
pub const VT_BSTR: u16 = 8;
pub const VT_DISPATCH: u16 = 9;
pub const VT_ERROR: u16 = 10;
pub const VT_BOOL: u16 = 11;
pub const VT_UNKNOWN: u16 = 13;
pub const VT_UI1: u16 = 17;
pub const VT_UI4: u16 = 19;
pub const VT_I8: u16 = 20;
pub const VT_INT: u16 = 22;

pub const VARIANT_TRUE: i16 = -1;
pub const VARIANT_FALSE: i16 = 0;

/// Human-readable name of a `VARTYPE`, used in type-mismatch errors.
pub fn vartype_name(vt: u16) -> &'static str {
    match vt {
        VT_EMPTY => "VT_EMPTY",
        VT_NULL => "VT_NULL",
        VT_I2 => "VT_I2",
        VT_I4 => "VT_I4",
        VT_BSTR => "VT_BSTR",
        VT_DISPATCH => "VT_DISPATCH",
        VT_ERROR => "VT_ERROR",
        VT_BOOL => "VT_BOOL",
        VT_UNKNOWN => "VT_UNKNOWN",
        VT_UI1 => "VT_UI1",
        VT_UI4 => "VT_UI4",
        VT_I8 => "VT_I8",
        VT_INT => "VT_INT",
        _ => "VT_OTHER",
    }
}

/// Payload half of a `VARIANT`. Two pointers wide so the struct is 24 bytes
/// on 64-bit targets and 16 on 32-bit, matching `oaidl.h`.
#[repr(C)]
#[derive(Clone, Copy)]
pub union VariantData {
    pub i2: i16,
    pub i4: i32,
    pub i8: i64,
    pub ui1: u8,
    pub ui4: u32,
    pub bool_val: i16,
    pub scode: i32,
    pub bstr: *mut u16,
    pub unknown: RawPtr,
    pub record: [RawPtr; 2],
}

/// `VARIANT`. Ownership of BSTR and interface payloads follows the COM rules;
/// see `com::bstr::variant_clear`.
#[repr(C)]
pub struct Variant {
    pub vt: u16,
    pub reserved: [u16; 3],
    pub data: VariantData,
}

impl Variant {
    pub const fn empty() -> Self {
        Self { vt: VT_EMPTY, reserved: [0; 3], data: VariantData { record: [std::ptr::null_mut(); 2] } }
    }

    pub const fn i4(value: i32) -> Self {
        let mut v = Self::empty();
        v.vt = VT_I4;
        v.data.i4 = value;
        v
    }

    pub const fn bool(value: bool) -> Self {
        let mut v = Self::empty();
        v.vt = VT_BOOL;
        v.data.bool_val = if value { VARIANT_TRUE } else { VARIANT_FALSE };
        v
    }

    /// Takes ownership of an allocated BSTR.
    pub const fn bstr(raw: *mut u16) -> Self {
        let mut v = Self::empty();
        v.vt = VT_BSTR;
        v.data.bstr = raw;
        v
    }

    /// Takes ownership of one reference on `raw`.
    pub const fn unknown(vt: u16, raw: RawPtr) -> Self {
        let mut v = Self::empty();
        v.vt = vt;
        v.data.unknown = raw;
        v
    }
}

/// `DISPPARAMS`. Positional arguments are stored in reverse order.
#[repr(C)]
pub struct DispParams {
    pub args: *mut Variant,
    pub named_args: *mut i32,
    pub arg_count: u32,
    pub named_arg_count: u32,
}

pub const DISPATCH_METHOD: u16 = 0x1;
pub const DISPATCH_PROPERTYGET: u16 = 0x2;
pub const DISPATCH_PROPERTYPUT: u16 = 0x4;

pub const DISPID_UNKNOWN: i32 = -1;
pub const DISPID_PROPERTYPUT: i32 = -3;
pub const DISPID_NEWENUM: i32 = -4;

pub const LOCALE_USER_DEFAULT: u32 = 0x0400;
pub const LOCALE_SYSTEM_DEFAULT: u32 = 0x0800;

// ─── Base interfaces ─────────────────────────────────────────────────────────

pub const IID_IUNKNOWN: Guid = Guid::from_u128(0x00000000_0000_0000_C000_000000000046);
pub const IID_IDISPATCH: Guid = Guid::from_u128(0x00020400_0000_0000_C000_000000000046);
pub const IID_IENUMVARIANT: Guid = Guid::from_u128(0x00020404_0000_0000_C000_000000000046);
pub const IID_NULL: Guid = Guid::zeroed();

#[repr(C)]
pub struct IUnknownVtbl {
    pub query_interface: unsafe extern "system" fn(this: RawPtr, iid: *const Guid, out: *mut RawPtr) -> HResult,
    pub add_ref: unsafe extern "system" fn(this: RawPtr) -> u32,
    pub release: unsafe extern "system" fn(this: RawPtr) -> u32,
}

#[repr(C)]
pub struct IDispatchVtbl {
    pub base: IUnknownVtbl,
    pub get_type_info_count: unsafe extern "system" fn(this: RawPtr, count: *mut u32) -> HResult,
    pub get_type_info: unsafe extern "system" fn(this: RawPtr, index: u32, lcid: u32, info: *mut RawPtr) -> HResult,
    pub get_ids_of_names: unsafe extern "system" fn(
        this: RawPtr,
        iid: *const Guid,
        names: *const *const u16,
        name_count: u32,
        lcid: u32,
        dispids: *mut i32,
    ) -> HResult,
    pub invoke: unsafe extern "system" fn(
        this: RawPtr,
        dispid: i32,
        iid: *const Guid,
        lcid: u32,
        flags: u16,
        params: *mut DispParams,
        result: *mut Variant,
        excep_info: *mut c_void,
        arg_err: *mut u32,
    ) -> HResult,
}

#[repr(C)]
pub struct IEnumVariantVtbl {
    pub base: IUnknownVtbl,
    pub next: unsafe extern "system" fn(this: RawPtr, count: u32, items: *mut Variant, fetched: *mut u32) -> HResult,
    pub skip: unsafe extern "system" fn(this: RawPtr, count: u32) -> HResult,
    pub reset: unsafe extern "system" fn(this: RawPtr) -> HResult,
    pub clone: unsafe extern "system" fn(this: RawPtr, out: *mut RawPtr) -> HResult,
}

const PTR: usize = std::mem::size_of::<usize>();
const _: () = assert!(std::mem::size_of::<IUnknownVtbl>() == 3 * PTR);
const _: () = assert!(std::mem::size_of::<IDispatchVtbl>() == 7 * PTR);
const _: () = assert!(std::mem::size_of::<IEnumVariantVtbl>() == 7 * PTR);
const _: () = assert!(std::mem::size_of::<Guid>() == 16);
const _: () = assert!(std::mem::size_of::<Variant>() == 8 + 2 * PTR);
