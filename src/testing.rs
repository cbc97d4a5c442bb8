//! In-process COM objects for tests.
//!
//! Each fake is a heap object whose first field is a pointer to a real
//! `#[repr(C)]` vtable, so the binding layer drives it through exactly the
//! same slot calls it makes against the native service. Every fake reports
//! `AddRef`/`Release` traffic through a [`Probe`].

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::ffi::c_void;
use std::sync::atomic::{AtomicBool, AtomicU32, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use crate::com::abi::{
    DispParams, Guid, HResult, IDispatchVtbl, IEnumVariantVtbl, IUnknownVtbl, RawPtr, Variant,
    DISPID_NEWENUM, DISPID_UNKNOWN, IID_IDISPATCH, IID_IENUMVARIANT, IID_IUNKNOWN, VT_BOOL,
    VT_BSTR, VT_DISPATCH, VT_I4, VT_UNKNOWN,
};
use crate::com::bstr::Bstr;
use crate::com::runtime::ComBackend;
use crate::nlm::vtbl::{INetworkConnectionVtbl, INetworkListManagerVtbl, INetworkVtbl};
use crate::nlm::{IID_IENUM_NETWORKS, IID_IENUM_NETWORK_CONNECTIONS, IID_INETWORK, IID_INETWORK_CONNECTION, IID_INETWORK_LIST_MANAGER};

// ─── Probe ───────────────────────────────────────────────────────────────────

#[derive(Default)]
struct Counters {
    add_refs: AtomicUsize,
    releases: AtomicUsize,
    freed: AtomicBool,
}

/// Reference-count observer for one fake object.
#[derive(Clone)]
pub struct Probe(Arc<Counters>);

impl Probe {
    pub fn add_refs(&self) -> usize {
        self.0.add_refs.load(Ordering::SeqCst)
    }

    pub fn releases(&self) -> usize {
        self.0.releases.load(Ordering::SeqCst)
    }

    /// The last reference is gone and the object was destroyed.
    pub fn freed(&self) -> bool {
        self.0.freed.load(Ordering::SeqCst)
    }
}

// ─── Object core ─────────────────────────────────────────────────────────────

#[repr(C)]
pub struct Object<S> {
    vtbl: *const c_void,
    refs: AtomicU32,
    iids: Vec<Guid>,
    counters: Arc<Counters>,
    state: S,
}

fn spawn_object<S>(vtbl: *const c_void, iids: &[Guid], state: S) -> (RawPtr, Probe) {
    let counters = Arc::new(Counters::default());
    let object = Box::new(Object {
        vtbl,
        refs: AtomicU32::new(1),
        iids: iids.to_vec(),
        counters: counters.clone(),
        state,
    });
    (Box::into_raw(object) as RawPtr, Probe(counters))
}

unsafe fn object<'a, S>(raw: RawPtr) -> &'a Object<S> {
    &*(raw as *const Object<S>)
}

/// Take an extra reference on any COM pointer.
pub unsafe fn add_ref_raw(raw: RawPtr) {
    let vtbl = &**(raw as *const *const IUnknownVtbl);
    (vtbl.add_ref)(raw);
}

/// Drop one reference on any COM pointer.
pub unsafe fn release_raw(raw: RawPtr) {
    if raw.is_null() {
        return;
    }
    let vtbl = &**(raw as *const *const IUnknownVtbl);
    (vtbl.release)(raw);
}

unsafe extern "system" fn query_interface<S>(this: RawPtr, iid: *const Guid, out: *mut RawPtr) -> HResult {
    let obj = object::<S>(this);
    let iid = *iid;
    if iid == IID_IUNKNOWN || obj.iids.contains(&iid) {
        add_ref::<S>(this);
        *out = this;
        HResult::S_OK
    } else {
        *out = std::ptr::null_mut();
        HResult::E_NOINTERFACE
    }
}

unsafe extern "system" fn add_ref<S>(this: RawPtr) -> u32 {
    let obj = object::<S>(this);
    obj.counters.add_refs.fetch_add(1, Ordering::SeqCst);
    obj.refs.fetch_add(1, Ordering::SeqCst) + 1
}

unsafe extern "system" fn release<S>(this: RawPtr) -> u32 {
    let remaining = {
        let obj = object::<S>(this);
        obj.counters.releases.fetch_add(1, Ordering::SeqCst);
        obj.refs.fetch_sub(1, Ordering::SeqCst) - 1
    };
    if remaining == 0 {
        let obj = Box::from_raw(this as *mut Object<S>);
        obj.counters.freed.store(true, Ordering::SeqCst);
        drop(obj);
    }
    remaining
}

const fn unknown_vtbl<S>() -> IUnknownVtbl {
    IUnknownVtbl {
        query_interface: query_interface::<S>,
        add_ref: add_ref::<S>,
        release: release::<S>,
    }
}

// ─── Dispatch core ───────────────────────────────────────────────────────────

/// Decoded dispatch argument, in call order.
#[derive(Debug, Clone, PartialEq)]
pub enum FakeArg {
    I32(i32),
    Bool(bool),
    Str(String),
    Other(u16),
}

impl std::fmt::Display for FakeArg {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::I32(v) => write!(f, "{v}"),
            Self::Bool(v) => write!(f, "{v}"),
            Self::Str(s) => f.write_str(s),
            Self::Other(vt) => write!(f, "vt{vt}"),
        }
    }
}

/// Automation behavior of a fake.
pub trait Dispatcher: Sized {
    fn members(&self) -> Vec<&'static str>;

    fn invoke(obj: &Object<Self>, member: &str, args: &[FakeArg]) -> Result<Variant, HResult>;

    fn new_enum(_obj: &Object<Self>) -> Result<Variant, HResult> {
        Err(HResult::DISP_E_MEMBERNOTFOUND)
    }
}

unsafe extern "system" fn get_type_info_count(_this: RawPtr, count: *mut u32) -> HResult {
    *count = 0;
    HResult::S_OK
}

unsafe extern "system" fn get_type_info(_this: RawPtr, _index: u32, _lcid: u32, _info: *mut RawPtr) -> HResult {
    HResult::E_NOTIMPL
}

unsafe fn wide_to_string(mut p: *const u16) -> String {
    let mut units = Vec::new();
    while *p != 0 {
        units.push(*p);
        p = p.add(1);
    }
    String::from_utf16_lossy(&units)
}

unsafe extern "system" fn get_ids_of_names<S: Dispatcher>(
    this: RawPtr,
    _iid: *const Guid,
    names: *const *const u16,
    count: u32,
    _lcid: u32,
    dispids: *mut i32,
) -> HResult {
    if count != 1 {
        return HResult::E_INVALIDARG;
    }
    let name = wide_to_string(*names);
    let members = object::<S>(this).state.members();
    match members.iter().position(|m| m.eq_ignore_ascii_case(&name)) {
        Some(index) => {
            *dispids = index as i32 + 1;
            HResult::S_OK
        }
        None => {
            *dispids = DISPID_UNKNOWN;
            HResult::DISP_E_UNKNOWNNAME
        }
    }
}

unsafe fn decode_args(params: *mut DispParams) -> Vec<FakeArg> {
    if params.is_null() || (*params).arg_count == 0 {
        return Vec::new();
    }
    let raw = std::slice::from_raw_parts((*params).args, (*params).arg_count as usize);
    raw.iter()
        .rev()
        .map(|v| match v.vt {
            VT_I4 => FakeArg::I32(v.data.i4),
            VT_BOOL => FakeArg::Bool(v.data.bool_val != 0),
            VT_BSTR => {
                let borrowed = Bstr::from_raw(v.data.bstr);
                let s = borrowed.to_string();
                borrowed.into_raw();
                FakeArg::Str(s)
            }
            vt => FakeArg::Other(vt),
        })
        .collect()
}

#[allow(clippy::too_many_arguments)]
unsafe extern "system" fn invoke<S: Dispatcher>(
    this: RawPtr,
    dispid: i32,
    _iid: *const Guid,
    _lcid: u32,
    _flags: u16,
    params: *mut DispParams,
    result: *mut Variant,
    _excep_info: *mut c_void,
    _arg_err: *mut u32,
) -> HResult {
    let obj = object::<S>(this);
    let outcome = if dispid == DISPID_NEWENUM {
        S::new_enum(obj)
    } else {
        let members = obj.state.members();
        match usize::try_from(dispid - 1).ok().and_then(|i| members.get(i)) {
            Some(member) => S::invoke(obj, member, &decode_args(params)),
            None => Err(HResult::DISP_E_MEMBERNOTFOUND),
        }
    };
    match outcome {
        Ok(value) => {
            if !result.is_null() {
                *result = value;
            }
            HResult::S_OK
        }
        Err(code) => code,
    }
}

const fn dispatch_vtbl<S: Dispatcher>() -> IDispatchVtbl {
    IDispatchVtbl {
        base: unknown_vtbl::<S>(),
        get_type_info_count,
        get_type_info,
        get_ids_of_names: get_ids_of_names::<S>,
        invoke: invoke::<S>,
    }
}

fn string(value: &str) -> Variant {
    Variant::bstr(Bstr::new(value).unwrap().into_raw())
}

/// Hand out a new reference on `raw` as an object variant.
unsafe fn object_variant(vt: u16, raw: RawPtr) -> Variant {
    if !raw.is_null() {
        add_ref_raw(raw);
    }
    Variant::unknown(vt, raw)
}

// ─── FakeUnknown ─────────────────────────────────────────────────────────────

/// Plain object answering only `IUnknown` and the listed identifiers.
pub struct FakeUnknown;

static UNKNOWN_VTBL: IUnknownVtbl = unknown_vtbl::<()>();

impl FakeUnknown {
    pub fn spawn(iids: &[Guid]) -> (RawPtr, Probe) {
        spawn_object(&UNKNOWN_VTBL as *const _ as *const c_void, iids, ())
    }
}

// ─── FakeDispatch ────────────────────────────────────────────────────────────

/// Canned reply of a [`FakeDispatch`] member.
#[derive(Debug, Clone)]
pub enum Reply {
    Empty,
    I32(i32),
    Bool(bool),
    Str(String),
    /// Comma-joined arguments as a string.
    Echo,
    Fail(HResult),
}

pub struct FakeDispatch {
    replies: Vec<(&'static str, Reply)>,
}

impl Dispatcher for FakeDispatch {
    fn members(&self) -> Vec<&'static str> {
        self.replies.iter().map(|(name, _)| *name).collect()
    }

    fn invoke(obj: &Object<Self>, member: &str, args: &[FakeArg]) -> Result<Variant, HResult> {
        let reply = obj
            .state
            .replies
            .iter()
            .find(|(name, _)| *name == member)
            .map(|(_, reply)| reply.clone())
            .ok_or(HResult::DISP_E_MEMBERNOTFOUND)?;
        match reply {
            Reply::Empty => Ok(Variant::empty()),
            Reply::I32(v) => Ok(Variant::i4(v)),
            Reply::Bool(v) => Ok(Variant::bool(v)),
            Reply::Str(s) => Ok(string(&s)),
            Reply::Echo => {
                let joined: Vec<String> = args.iter().map(ToString::to_string).collect();
                Ok(string(&joined.join(",")))
            }
            Reply::Fail(code) => Err(code),
        }
    }
}

static FAKE_DISPATCH_VTBL: IDispatchVtbl = dispatch_vtbl::<FakeDispatch>();

impl FakeDispatch {
    pub fn spawn(iids: &[Guid], replies: Vec<(&'static str, Reply)>) -> (RawPtr, Probe) {
        let mut all = vec![IID_IDISPATCH];
        all.extend_from_slice(iids);
        spawn_object(&FAKE_DISPATCH_VTBL as *const _ as *const c_void, &all, FakeDispatch { replies })
    }
}

// ─── Collections ─────────────────────────────────────────────────────────────

fn release_all(items: &[RawPtr]) {
    for &raw in items {
        // SAFETY: each entry is one reference owned by the fake.
        unsafe { release_raw(raw) };
    }
}

/// `IEnumVARIANT` over owned element references.
pub struct FakeEnumVariant {
    items: Vec<RawPtr>,
    position: Cell<usize>,
}

impl Drop for FakeEnumVariant {
    fn drop(&mut self) {
        release_all(&self.items);
    }
}

unsafe extern "system" fn enum_next(this: RawPtr, count: u32, items: *mut Variant, fetched: *mut u32) -> HResult {
    let state = &object::<FakeEnumVariant>(this).state;
    let mut written = 0u32;
    while written < count {
        let pos = state.position.get();
        let Some(&raw) = state.items.get(pos) else { break };
        *items.add(written as usize) = object_variant(VT_UNKNOWN, raw);
        state.position.set(pos + 1);
        written += 1;
    }
    if !fetched.is_null() {
        *fetched = written;
    }
    if written == count { HResult::S_OK } else { HResult::S_FALSE }
}

unsafe extern "system" fn enum_skip(this: RawPtr, count: u32) -> HResult {
    let state = &object::<FakeEnumVariant>(this).state;
    state.position.set(state.position.get() + count as usize);
    HResult::S_OK
}

unsafe extern "system" fn enum_reset(this: RawPtr) -> HResult {
    object::<FakeEnumVariant>(this).state.position.set(0);
    HResult::S_OK
}

unsafe extern "system" fn enum_clone(_this: RawPtr, _out: *mut RawPtr) -> HResult {
    HResult::E_NOTIMPL
}

static ENUM_VARIANT_VTBL: IEnumVariantVtbl = IEnumVariantVtbl {
    base: unknown_vtbl::<FakeEnumVariant>(),
    next: enum_next,
    skip: enum_skip,
    reset: enum_reset,
    clone: enum_clone,
};

/// Automation collection whose `_NewEnum` walks `items`.
pub struct FakeCollection {
    items: Vec<RawPtr>,
}

impl Drop for FakeCollection {
    fn drop(&mut self) {
        release_all(&self.items);
    }
}

impl Dispatcher for FakeCollection {
    fn members(&self) -> Vec<&'static str> {
        vec!["_NewEnum"]
    }

    fn invoke(obj: &Object<Self>, _member: &str, _args: &[FakeArg]) -> Result<Variant, HResult> {
        Self::new_enum(obj)
    }

    fn new_enum(obj: &Object<Self>) -> Result<Variant, HResult> {
        for &raw in &obj.state.items {
            // SAFETY: the enumerator gets its own reference on each element.
            unsafe { if !raw.is_null() { add_ref_raw(raw) } };
        }
        let state = FakeEnumVariant { items: obj.state.items.clone(), position: Cell::new(0) };
        let (raw, _probe) = spawn_object(
            &ENUM_VARIANT_VTBL as *const _ as *const c_void,
            &[IID_IENUMVARIANT],
            state,
        );
        Ok(Variant::unknown(VT_UNKNOWN, raw))
    }
}

static COLLECTION_VTBL: IDispatchVtbl = dispatch_vtbl::<FakeCollection>();

impl FakeCollection {
    /// Takes ownership of one reference on every item.
    pub fn spawn(iids: &[Guid], items: Vec<RawPtr>) -> (RawPtr, Probe) {
        let mut all = vec![IID_IDISPATCH];
        all.extend_from_slice(iids);
        spawn_object(&COLLECTION_VTBL as *const _ as *const c_void, &all, FakeCollection { items })
    }

    fn spawn_borrowed(iids: &[Guid], items: &[RawPtr]) -> RawPtr {
        for &raw in items {
            // SAFETY: the new collection owns its own references.
            unsafe { add_ref_raw(raw) };
        }
        Self::spawn(iids, items.to_vec()).0
    }
}

// ─── Stub slots ──────────────────────────────────────────────────────────────

unsafe extern "system" fn notimpl_out_bstr(_this: RawPtr, _out: *mut *mut u16) -> HResult {
    HResult::E_NOTIMPL
}
unsafe extern "system" fn notimpl_in_bstr(_this: RawPtr, _value: *mut u16) -> HResult {
    HResult::E_NOTIMPL
}
unsafe extern "system" fn notimpl_out_i32(_this: RawPtr, _out: *mut i32) -> HResult {
    HResult::E_NOTIMPL
}
unsafe extern "system" fn notimpl_in_i32(_this: RawPtr, _value: i32) -> HResult {
    HResult::E_NOTIMPL
}
unsafe extern "system" fn notimpl_out_bool(_this: RawPtr, _out: *mut i16) -> HResult {
    HResult::E_NOTIMPL
}
unsafe extern "system" fn notimpl_out_ptr(_this: RawPtr, _out: *mut RawPtr) -> HResult {
    HResult::E_NOTIMPL
}
unsafe extern "system" fn notimpl_in_i32_out_ptr(_this: RawPtr, _flags: i32, _out: *mut RawPtr) -> HResult {
    HResult::E_NOTIMPL
}
unsafe extern "system" fn notimpl_in_ptr(_this: RawPtr, _value: *mut c_void) -> HResult {
    HResult::E_NOTIMPL
}
unsafe extern "system" fn notimpl(_this: RawPtr) -> HResult {
    HResult::E_NOTIMPL
}

// ─── FakeNetwork ─────────────────────────────────────────────────────────────

/// Contents of a fake `INetwork`.
#[derive(Debug, Clone)]
pub struct NetworkSpec {
    pub name: String,
    pub description: String,
    pub id: Guid,
    pub category: i32,
    pub domain_type: i32,
    pub connectivity: i32,
    pub connected: bool,
    pub connected_to_internet: bool,
    pub created: (u32, u32),
    pub connected_at: (u32, u32),
    /// Owned references handed out through `GetNetworkConnections`.
    pub connections: Vec<RawPtr>,
    /// Status returned by the vtable getters, to exercise failures.
    pub vtable_status: HResult,
}

impl Default for NetworkSpec {
    fn default() -> Self {
        Self {
            name: "Network".into(),
            description: "Network".into(),
            id: Guid::from_u128(0xA0A0),
            category: 0,
            domain_type: 0,
            connectivity: 0,
            connected: false,
            connected_to_internet: false,
            created: (0, 0),
            connected_at: (0, 0),
            connections: Vec::new(),
            vtable_status: HResult::S_OK,
        }
    }
}

pub struct FakeNetwork {
    spec: RefCell<NetworkSpec>,
}

impl Drop for FakeNetwork {
    fn drop(&mut self) {
        release_all(&self.spec.borrow().connections);
    }
}

impl Dispatcher for FakeNetwork {
    fn members(&self) -> Vec<&'static str> {
        vec![
            "GetName",
            "SetName",
            "GetDescription",
            "SetDescription",
            "GetDomainType",
            "GetNetworkConnections",
            "IsConnectedToInternet",
            "IsConnected",
            "GetConnectivity",
            "GetCategory",
            "SetCategory",
        ]
    }

    fn invoke(obj: &Object<Self>, member: &str, args: &[FakeArg]) -> Result<Variant, HResult> {
        let mut spec = obj.state.spec.borrow_mut();
        match (member, args) {
            ("GetName", []) => Ok(string(&spec.name)),
            ("SetName", [FakeArg::Str(name)]) => {
                spec.name = name.clone();
                Ok(Variant::empty())
            }
            ("GetDescription", []) => Ok(string(&spec.description)),
            ("SetDescription", [FakeArg::Str(description)]) => {
                spec.description = description.clone();
                Ok(Variant::empty())
            }
            ("GetDomainType", []) => Ok(Variant::i4(spec.domain_type)),
            ("GetNetworkConnections", []) => {
                let raw = FakeCollection::spawn_borrowed(&[IID_IENUM_NETWORK_CONNECTIONS], &spec.connections);
                Ok(Variant::unknown(VT_DISPATCH, raw))
            }
            ("IsConnectedToInternet", []) => Ok(Variant::bool(spec.connected_to_internet)),
            ("IsConnected", []) => Ok(Variant::bool(spec.connected)),
            ("GetConnectivity", []) => Ok(Variant::i4(spec.connectivity)),
            ("GetCategory", []) => Ok(Variant::i4(spec.category)),
            ("SetCategory", [FakeArg::I32(category)]) => {
                if !(0..=2).contains(category) {
                    return Err(HResult::E_INVALIDARG);
                }
                spec.category = *category;
                Ok(Variant::empty())
            }
            _ => Err(HResult::DISP_E_BADPARAMCOUNT),
        }
    }
}

unsafe extern "system" fn network_get_network_id(this: RawPtr, id: *mut Guid) -> HResult {
    let spec = object::<FakeNetwork>(this).state.spec.borrow();
    if spec.vtable_status.is_err() {
        return spec.vtable_status;
    }
    *id = spec.id;
    HResult::S_OK
}

unsafe extern "system" fn network_get_times(
    this: RawPtr,
    created_low: *mut u32,
    created_high: *mut u32,
    connected_low: *mut u32,
    connected_high: *mut u32,
) -> HResult {
    let spec = object::<FakeNetwork>(this).state.spec.borrow();
    if spec.vtable_status.is_err() {
        return spec.vtable_status;
    }
    *created_low = spec.created.0;
    *created_high = spec.created.1;
    *connected_low = spec.connected_at.0;
    *connected_high = spec.connected_at.1;
    HResult::S_OK
}

static NETWORK_VTBL: INetworkVtbl = INetworkVtbl {
    base: dispatch_vtbl::<FakeNetwork>(),
    get_name: notimpl_out_bstr,
    set_name: notimpl_in_bstr,
    get_description: notimpl_out_bstr,
    set_description: notimpl_in_bstr,
    get_network_id: network_get_network_id,
    get_domain_type: notimpl_out_i32,
    get_network_connections: notimpl_out_ptr,
    get_time_created_and_connected: network_get_times,
    get_is_connected_to_internet: notimpl_out_bool,
    get_is_connected: notimpl_out_bool,
    get_connectivity: notimpl_out_i32,
    get_category: notimpl_out_i32,
    set_category: notimpl_in_i32,
};

impl FakeNetwork {
    pub fn spawn(spec: NetworkSpec) -> (RawPtr, Probe) {
        spawn_object(
            &NETWORK_VTBL as *const _ as *const c_void,
            &[IID_IDISPATCH, IID_INETWORK],
            FakeNetwork { spec: RefCell::new(spec) },
        )
    }

    /// Current contents of a live fake network.
    ///
    /// # Safety
    /// `raw` must be a pointer returned by [`FakeNetwork::spawn`] that is
    /// still alive.
    pub unsafe fn spec(raw: RawPtr) -> NetworkSpec {
        object::<FakeNetwork>(raw).state.spec.borrow().clone()
    }
}

// ─── FakeConnection ──────────────────────────────────────────────────────────

/// Contents of a fake `INetworkConnection`.
#[derive(Debug, Clone)]
pub struct ConnectionSpec {
    /// Owned reference returned (with a fresh AddRef) by `GetNetwork`.
    pub network: RawPtr,
    pub connection_id: Guid,
    pub adapter_id: Guid,
    pub connectivity: i32,
    pub domain_type: i32,
    pub connected: bool,
    pub connected_to_internet: bool,
    pub vtable_status: HResult,
}

impl Default for ConnectionSpec {
    fn default() -> Self {
        Self {
            network: std::ptr::null_mut(),
            connection_id: Guid::from_u128(0xC0C0),
            adapter_id: Guid::from_u128(0xADAD),
            connectivity: 0,
            domain_type: 0,
            connected: false,
            connected_to_internet: false,
            vtable_status: HResult::S_OK,
        }
    }
}

pub struct FakeConnection {
    spec: ConnectionSpec,
}

impl Drop for FakeConnection {
    fn drop(&mut self) {
        // SAFETY: the fake owns one reference on its network.
        unsafe { release_raw(self.spec.network) };
    }
}

impl Dispatcher for FakeConnection {
    fn members(&self) -> Vec<&'static str> {
        vec!["GetConnectivity", "GetDomainType", "IsConnected", "IsConnectedToInternet"]
    }

    fn invoke(obj: &Object<Self>, member: &str, _args: &[FakeArg]) -> Result<Variant, HResult> {
        let spec = &obj.state.spec;
        match member {
            "GetConnectivity" => Ok(Variant::i4(spec.connectivity)),
            "GetDomainType" => Ok(Variant::i4(spec.domain_type)),
            "IsConnected" => Ok(Variant::bool(spec.connected)),
            "IsConnectedToInternet" => Ok(Variant::bool(spec.connected_to_internet)),
            _ => Err(HResult::DISP_E_MEMBERNOTFOUND),
        }
    }
}

unsafe extern "system" fn connection_get_network(this: RawPtr, out: *mut RawPtr) -> HResult {
    let spec = &object::<FakeConnection>(this).state.spec;
    if spec.vtable_status.is_err() {
        return spec.vtable_status;
    }
    if spec.network.is_null() {
        *out = std::ptr::null_mut();
        return HResult::E_POINTER;
    }
    add_ref_raw(spec.network);
    *out = spec.network;
    HResult::S_OK
}

unsafe extern "system" fn connection_get_connection_id(this: RawPtr, id: *mut Guid) -> HResult {
    let spec = &object::<FakeConnection>(this).state.spec;
    if spec.vtable_status.is_err() {
        return spec.vtable_status;
    }
    *id = spec.connection_id;
    HResult::S_OK
}

unsafe extern "system" fn connection_get_adapter_id(this: RawPtr, id: *mut Guid) -> HResult {
    let spec = &object::<FakeConnection>(this).state.spec;
    if spec.vtable_status.is_err() {
        return spec.vtable_status;
    }
    *id = spec.adapter_id;
    HResult::S_OK
}

static CONNECTION_VTBL: INetworkConnectionVtbl = INetworkConnectionVtbl {
    base: dispatch_vtbl::<FakeConnection>(),
    get_network: connection_get_network,
    get_is_connected_to_internet: notimpl_out_bool,
    get_is_connected: notimpl_out_bool,
    get_connectivity: notimpl_out_i32,
    get_connection_id: connection_get_connection_id,
    get_adapter_id: connection_get_adapter_id,
    get_domain_type: notimpl_out_i32,
};

impl FakeConnection {
    pub fn spawn(spec: ConnectionSpec) -> (RawPtr, Probe) {
        spawn_object(
            &CONNECTION_VTBL as *const _ as *const c_void,
            &[IID_IDISPATCH, IID_INETWORK_CONNECTION],
            FakeConnection { spec },
        )
    }
}

// ─── FakeManager ─────────────────────────────────────────────────────────────

/// Contents of a fake `INetworkListManager`. Entries are `(id, owned ref)`.
#[derive(Debug, Clone, Default)]
pub struct ManagerSpec {
    pub connections: Vec<(Guid, RawPtr)>,
    pub networks: Vec<(Guid, RawPtr)>,
    pub connectivity: i32,
}

pub struct FakeManager {
    spec: ManagerSpec,
    last_network_flags: Cell<Option<i32>>,
}

impl Drop for FakeManager {
    fn drop(&mut self) {
        for (_, raw) in self.spec.connections.iter().chain(&self.spec.networks) {
            // SAFETY: the fake owns one reference per entry.
            unsafe { release_raw(*raw) };
        }
    }
}

impl Dispatcher for FakeManager {
    fn members(&self) -> Vec<&'static str> {
        vec!["GetNetworks", "GetNetworkConnections", "GetConnectivity", "IsConnected", "IsConnectedToInternet"]
    }

    fn invoke(obj: &Object<Self>, member: &str, args: &[FakeArg]) -> Result<Variant, HResult> {
        let state = &obj.state;
        let connectivity = state.spec.connectivity;
        match (member, args) {
            ("GetNetworks", [FakeArg::I32(flags)]) => {
                state.last_network_flags.set(Some(*flags));
                let items: Vec<RawPtr> = state.spec.networks.iter().map(|(_, raw)| *raw).collect();
                let raw = FakeCollection::spawn_borrowed(&[IID_IENUM_NETWORKS], &items);
                Ok(Variant::unknown(VT_DISPATCH, raw))
            }
            ("GetNetworkConnections", []) => {
                let items: Vec<RawPtr> = state.spec.connections.iter().map(|(_, raw)| *raw).collect();
                let raw = FakeCollection::spawn_borrowed(&[IID_IENUM_NETWORK_CONNECTIONS], &items);
                Ok(Variant::unknown(VT_DISPATCH, raw))
            }
            ("GetConnectivity", []) => Ok(Variant::i4(connectivity)),
            ("IsConnected", []) => Ok(Variant::bool(connectivity != 0)),
            ("IsConnectedToInternet", []) => Ok(Variant::bool(connectivity & 0x0440 != 0)),
            _ => Err(HResult::DISP_E_BADPARAMCOUNT),
        }
    }
}

unsafe fn find_entry(entries: &[(Guid, RawPtr)], id: Guid, out: *mut RawPtr) -> HResult {
    match entries.iter().find(|(entry, _)| *entry == id) {
        Some((_, raw)) => {
            add_ref_raw(*raw);
            *out = *raw;
            HResult::S_OK
        }
        None => {
            *out = std::ptr::null_mut();
            HResult::E_INVALIDARG
        }
    }
}

unsafe extern "system" fn manager_get_network(this: RawPtr, id: Guid, out: *mut RawPtr) -> HResult {
    find_entry(&object::<FakeManager>(this).state.spec.networks, id, out)
}

unsafe extern "system" fn manager_get_network_connection(this: RawPtr, id: Guid, out: *mut RawPtr) -> HResult {
    find_entry(&object::<FakeManager>(this).state.spec.connections, id, out)
}

static MANAGER_VTBL: INetworkListManagerVtbl = INetworkListManagerVtbl {
    base: dispatch_vtbl::<FakeManager>(),
    get_networks: notimpl_in_i32_out_ptr,
    get_network: manager_get_network,
    get_network_connections: notimpl_out_ptr,
    get_network_connection: manager_get_network_connection,
    get_is_connected_to_internet: notimpl_out_bool,
    get_is_connected: notimpl_out_bool,
    get_connectivity: notimpl_out_i32,
    set_simulated_profile_info: notimpl_in_ptr,
    clear_simulated_profile_info: notimpl,
};

impl FakeManager {
    pub fn spawn(spec: ManagerSpec) -> (RawPtr, Probe) {
        spawn_object(
            &MANAGER_VTBL as *const _ as *const c_void,
            &[IID_IDISPATCH, IID_INETWORK_LIST_MANAGER],
            FakeManager { spec, last_network_flags: Cell::new(None) },
        )
    }

    /// Flags passed to the most recent `GetNetworks` call.
    ///
    /// # Safety
    /// `raw` must be a live pointer returned by [`FakeManager::spawn`].
    pub unsafe fn last_network_flags(raw: RawPtr) -> Option<i32> {
        object::<FakeManager>(raw).state.last_network_flags.get()
    }
}

// ─── FakeBackend ─────────────────────────────────────────────────────────────

/// Record of the calls a [`FakeBackend`] received.
#[derive(Default)]
pub struct BackendCalls {
    uninitialized: AtomicUsize,
    coinit: Mutex<Vec<u32>>,
}

impl BackendCalls {
    pub fn uninitialized(&self) -> usize {
        self.uninitialized.load(Ordering::SeqCst)
    }

    pub fn coinit_flags(&self) -> Vec<u32> {
        self.coinit.lock().unwrap().clone()
    }
}

/// Runtime backend that replays scripted `CoInitializeEx` results and
/// activates one prepared object.
pub struct FakeBackend {
    init_results: Mutex<VecDeque<HResult>>,
    instance: Mutex<Option<usize>>,
    calls: Arc<BackendCalls>,
}

impl FakeBackend {
    pub fn new(init_results: Vec<HResult>) -> (Self, Arc<BackendCalls>) {
        let calls = Arc::new(BackendCalls::default());
        let backend = Self {
            init_results: Mutex::new(init_results.into()),
            instance: Mutex::new(None),
            calls: calls.clone(),
        };
        (backend, calls)
    }

    /// The object handed out by the next `create_instance`. Takes ownership
    /// of one reference.
    pub fn with_instance(self, raw: RawPtr) -> Self {
        *self.instance.lock().unwrap() = Some(raw as usize);
        self
    }
}

impl ComBackend for FakeBackend {
    fn initialize(&self, coinit: u32) -> HResult {
        self.calls.coinit.lock().unwrap().push(coinit);
        self.init_results.lock().unwrap().pop_front().unwrap_or(HResult::S_OK)
    }

    fn uninitialize(&self) {
        self.calls.uninitialized.fetch_add(1, Ordering::SeqCst);
    }

    fn create_instance(&self, _clsid: &Guid, _context: u32) -> Result<RawPtr, HResult> {
        match self.instance.lock().unwrap().take() {
            Some(raw) => Ok(raw as RawPtr),
            None => Err(HResult::REGDB_E_CLASSNOTREG),
        }
    }
}
