//! Named automation dispatch through `IDispatch`.
//!
//! Members are looked up with `GetIDsOfNames` and called with `Invoke`.
//! Results come back as a `VARIANT`, are converted into an owned [`Value`],
//! and then into the type the caller declared. A payload of the wrong type
//! is an error, never a coercion.

use std::sync::atomic::{AtomicU32, Ordering};

use super::abi::{
    vartype_name, HResult, DispParams, IDispatchVtbl, RawPtr, Variant, DISPATCH_METHOD,
    DISPATCH_PROPERTYGET, IID_NULL, LOCALE_USER_DEFAULT, VT_BOOL, VT_BSTR, VT_DISPATCH,
    VT_EMPTY, VT_I2, VT_I4, VT_NULL, VT_UI1, VT_UNKNOWN,
};
use super::bstr::{variant_clear, Bstr};
use super::handle::ComPtr;
use crate::error::{Error, Result};

static LOCALE: AtomicU32 = AtomicU32::new(LOCALE_USER_DEFAULT);

/// Locale passed to `GetIDsOfNames` and `Invoke`.
pub fn locale() -> u32 {
    LOCALE.load(Ordering::Relaxed)
}

/// Process-wide; set by `runtime::initialize_with`.
pub fn set_locale(lcid: u32) {
    LOCALE.store(lcid, Ordering::Relaxed);
}

// ─── Values ──────────────────────────────────────────────────────────────────

/// How a member is invoked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallKind {
    Method,
    PropertyGet,
}

impl CallKind {
    const fn flags(self) -> u16 {
        match self {
            Self::Method => DISPATCH_METHOD,
            Self::PropertyGet => DISPATCH_PROPERTYGET,
        }
    }
}

/// Argument to a dispatch call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arg<'a> {
    I32(i32),
    Bool(bool),
    Str(&'a str),
}

impl Arg<'_> {
    fn to_variant(self) -> std::result::Result<Variant, HResult> {
        Ok(match self {
            Self::I32(v) => Variant::i4(v),
            Self::Bool(v) => Variant::bool(v),
            Self::Str(s) => Variant::bstr(Bstr::new(s)?.into_raw()),
        })
    }
}

/// Owned automation result.
#[derive(Debug)]
pub enum Value {
    Empty,
    Null,
    I32(i32),
    I16(i16),
    U8(u8),
    Bool(bool),
    Str(String),
    /// `VT_UNKNOWN` or `VT_DISPATCH` with a non-null pointer.
    Object(ComPtr),
    /// Any payload this layer does not decode.
    Other(u16),
}

impl Value {
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Empty => "VT_EMPTY",
            Self::Null => "VT_NULL",
            Self::I32(_) => "VT_I4",
            Self::I16(_) => "VT_I2",
            Self::U8(_) => "VT_UI1",
            Self::Bool(_) => "VT_BOOL",
            Self::Str(_) => "VT_BSTR",
            Self::Object(_) => "VT_UNKNOWN",
            Self::Other(vt) => vartype_name(*vt),
        }
    }

    /// Take ownership of the payload of `variant`, leaving it empty.
    ///
    /// # Safety
    /// `variant` must have been filled in by a COM call that transferred
    /// ownership of its payload to us.
    pub unsafe fn from_variant(variant: &mut Variant) -> Self {
        let value = match variant.vt {
            VT_EMPTY => Self::Empty,
            VT_NULL => Self::Null,
            VT_I4 => Self::I32(variant.data.i4),
            VT_I2 => Self::I16(variant.data.i2),
            VT_UI1 => Self::U8(variant.data.ui1),
            VT_BOOL => Self::Bool(variant.data.bool_val != 0),
            VT_BSTR => {
                let s = Bstr::from_raw(variant.data.bstr);
                variant.vt = VT_EMPTY;
                Self::Str(s.to_string())
            }
            VT_UNKNOWN | VT_DISPATCH => {
                let raw = variant.data.unknown;
                variant.vt = VT_EMPTY;
                match ComPtr::from_raw(raw) {
                    Some(ptr) => Self::Object(ptr),
                    None => Self::Null,
                }
            }
            vt => Self::Other(vt),
        };
        variant_clear(variant);
        value
    }
}

/// Conversion from an automation result into a statically expected type.
pub trait FromValue: Sized {
    /// Variant type this conversion accepts, for error messages.
    const EXPECTED: &'static str;

    fn from_value(value: Value) -> std::result::Result<Self, Value>;
}

impl FromValue for String {
    const EXPECTED: &'static str = "VT_BSTR";

    fn from_value(value: Value) -> std::result::Result<Self, Value> {
        match value {
            Value::Str(s) => Ok(s),
            other => Err(other),
        }
    }
}

impl FromValue for i32 {
    const EXPECTED: &'static str = "VT_I4";

    fn from_value(value: Value) -> std::result::Result<Self, Value> {
        match value {
            Value::I32(v) => Ok(v),
            other => Err(other),
        }
    }
}

impl FromValue for bool {
    const EXPECTED: &'static str = "VT_BOOL";

    fn from_value(value: Value) -> std::result::Result<Self, Value> {
        match value {
            Value::Bool(v) => Ok(v),
            other => Err(other),
        }
    }
}

/// Setters return nothing.
impl FromValue for () {
    const EXPECTED: &'static str = "VT_EMPTY";

    fn from_value(value: Value) -> std::result::Result<Self, Value> {
        match value {
            Value::Empty => Ok(()),
            other => Err(other),
        }
    }
}

impl FromValue for ComPtr {
    const EXPECTED: &'static str = "VT_UNKNOWN";

    fn from_value(value: Value) -> std::result::Result<Self, Value> {
        match value {
            Value::Object(ptr) => Ok(ptr),
            other => Err(other),
        }
    }
}

// ─── Invocation ──────────────────────────────────────────────────────────────

/// Resolve a member name to its dispatch id.
pub fn dispid_of(handle: &ComPtr, interface: &'static str, member: &'static str) -> Result<i32> {
    let (this, vtbl) = dispatch_vtable(handle, interface)?;
    let name: Vec<u16> = member.encode_utf16().chain(Some(0)).collect();
    let names = [name.as_ptr()];
    let mut dispid = 0i32;
    // SAFETY: `this` is a live IDispatch and every pointer outlives the call.
    let hr = unsafe {
        (vtbl.get_ids_of_names)(this, &IID_NULL, names.as_ptr(), 1, locale(), &mut dispid)
    };
    if hr.is_err() {
        return Err(Error::Dispatch { interface, member, code: hr });
    }
    Ok(dispid)
}

/// Invoke `member` by name and return the raw result.
pub fn invoke(
    handle: &ComPtr,
    interface: &'static str,
    member: &'static str,
    kind: CallKind,
    args: &[Arg<'_>],
) -> Result<Value> {
    let dispid = dispid_of(handle, interface, member)?;
    invoke_dispid(handle, interface, member, dispid, kind, args)
}

/// Invoke a member whose dispatch id is already known.
pub fn invoke_dispid(
    handle: &ComPtr,
    interface: &'static str,
    member: &'static str,
    dispid: i32,
    kind: CallKind,
    args: &[Arg<'_>],
) -> Result<Value> {
    let (this, vtbl) = dispatch_vtable(handle, interface)?;

    let mut variants = marshal(args).map_err(|code| Error::Dispatch { interface, member, code })?;
    let mut params = DispParams {
        args: if variants.is_empty() { std::ptr::null_mut() } else { variants.as_mut_ptr() },
        named_args: std::ptr::null_mut(),
        arg_count: variants.len() as u32,
        named_arg_count: 0,
    };
    let mut result = Variant::empty();

    tracing::trace!(interface, member, dispid, args = args.len(), "IDispatch::Invoke");
    // SAFETY: `this` is a live IDispatch; params and result outlive the call;
    // exception info and argument error are optional and passed as null.
    let hr = unsafe {
        (vtbl.invoke)(
            this,
            dispid,
            &IID_NULL,
            locale(),
            kind.flags(),
            &mut params,
            &mut result,
            std::ptr::null_mut(),
            std::ptr::null_mut(),
        )
    };

    for v in &mut variants {
        // SAFETY: the arguments were allocated here and are still ours.
        unsafe { variant_clear(v) };
    }

    if hr.is_err() {
        // SAFETY: a failed call may still have written into `result`.
        unsafe { variant_clear(&mut result) };
        return Err(Error::Dispatch { interface, member, code: hr });
    }
    // SAFETY: a successful Invoke transfers ownership of the result.
    Ok(unsafe { Value::from_variant(&mut result) })
}

/// Build the DISPPARAMS argument array, last argument first. Nothing leaks
/// when one argument cannot be allocated.
fn marshal(args: &[Arg<'_>]) -> std::result::Result<Vec<Variant>, HResult> {
    let mut variants = Vec::with_capacity(args.len());
    for arg in args.iter().rev() {
        match arg.to_variant() {
            Ok(v) => variants.push(v),
            Err(code) => {
                for v in &mut variants {
                    // SAFETY: every variant so far was allocated here.
                    unsafe { variant_clear(v) };
                }
                return Err(code);
            }
        }
    }
    Ok(variants)
}

/// Invoke a method and convert its result.
pub fn call<T: FromValue>(
    handle: &ComPtr,
    interface: &'static str,
    member: &'static str,
    args: &[Arg<'_>],
) -> Result<T> {
    let value = invoke(handle, interface, member, CallKind::Method, args)?;
    expect(member, value)
}

/// Read a property and convert its value.
pub fn get<T: FromValue>(handle: &ComPtr, interface: &'static str, member: &'static str) -> Result<T> {
    let value = invoke(handle, interface, member, CallKind::PropertyGet, &[])?;
    expect(member, value)
}

fn expect<T: FromValue>(member: &'static str, value: Value) -> Result<T> {
    T::from_value(value).map_err(|actual| Error::UnexpectedType {
        member,
        expected: T::EXPECTED,
        actual: actual.type_name(),
    })
}

fn dispatch_vtable<'a>(handle: &'a ComPtr, interface: &'static str) -> Result<(RawPtr, &'a IDispatchVtbl)> {
    // SAFETY: every interface wrapped by a dispatch-capable proxy derives from
    // IDispatch, so its vtable starts with the IDispatch layout.
    unsafe { handle.vtable::<IDispatchVtbl>() }.ok_or(Error::Released { interface })
}
