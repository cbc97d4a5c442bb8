//! INetworkListManager proxy, the entry point to the service.

use std::fmt;

use crate::com::abi::{Guid, RawPtr};
use crate::com::dispatch::{self, Arg, CallKind};
use crate::com::handle::ComPtr;
use crate::com::interface::{resolve, Interface};
use crate::com::runtime::{self, Runtime};
use crate::com::vtable;
use crate::error::Result;

use super::connection::Connection;
use super::enumeration::{ConnectionEnumeration, NetworkEnumeration};
use super::network::Network;
use super::vtbl::INetworkListManagerVtbl;
use super::{Connectivity, CLSID_NETWORK_LIST_MANAGER, IID_INETWORK_LIST_MANAGER};

/// NLM_ENUM_NETWORK: which networks `GetNetworks` returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EnumNetworkFlags(pub i32);

impl EnumNetworkFlags {
    pub const CONNECTED: Self = Self(0x01);
    pub const DISCONNECTED: Self = Self(0x02);
    pub const ALL: Self = Self(0x03);

    pub fn label(&self) -> &'static str {
        match *self {
            Self::CONNECTED => "Connected",
            Self::DISCONNECTED => "Disconnected",
            Self::ALL => "All",
            _ => "",
        }
    }
}

impl fmt::Display for EnumNetworkFlags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Connection to the Network List Manager service.
#[derive(Debug)]
pub struct Manager {
    handle: ComPtr,
}

impl Interface for Manager {
    const IID: Guid = IID_INETWORK_LIST_MANAGER;
    const NAME: &'static str = "INetworkListManager";

    fn from_handle(handle: ComPtr) -> Self {
        Self { handle }
    }

    fn handle(&self) -> &ComPtr {
        &self.handle
    }

    fn handle_mut(&mut self) -> &mut ComPtr {
        &mut self.handle
    }
}

impl Manager {
    /// Activate the service through the process-wide runtime, which must
    /// already be initialized.
    pub fn new() -> Result<Self> {
        Self::with_runtime(runtime::global())
    }

    pub fn with_runtime(runtime: &Runtime) -> Result<Self> {
        let unknown = runtime.create_instance(&CLSID_NETWORK_LIST_MANAGER)?;
        Self::from_unknown(&unknown)
    }

    /// Resolve an existing object; the caller keeps its reference.
    pub fn from_unknown(unknown: &ComPtr) -> Result<Self> {
        resolve(unknown)
    }

    fn slots(&self) -> Result<(RawPtr, &INetworkListManagerVtbl)> {
        // SAFETY: the handle was resolved for IID_INetworkListManager.
        unsafe { vtable::slots::<INetworkListManagerVtbl>(&self.handle, Self::NAME) }
    }

    /// Every network connection on the machine.
    pub fn network_connections(&self) -> Result<ConnectionEnumeration> {
        let value = dispatch::invoke(&self.handle, Self::NAME, "GetNetworkConnections", CallKind::Method, &[])?;
        ConnectionEnumeration::from_value(value)
    }

    /// Networks matching `flags`.
    pub fn networks(&self, flags: EnumNetworkFlags) -> Result<NetworkEnumeration> {
        let value = dispatch::invoke(&self.handle, Self::NAME, "GetNetworks", CallKind::Method, &[Arg::I32(flags.0)])?;
        NetworkEnumeration::from_value(value)
    }

    /// Look up one network by identifier.
    pub fn network(&self, network_id: &Guid) -> Result<Network> {
        let (this, vtbl) = self.slots()?;
        let mut raw = std::ptr::null_mut();
        // SAFETY: the GUID is passed by value; `raw` receives one reference.
        let hr = unsafe { (vtbl.get_network)(this, *network_id, &mut raw) };
        vtable::check(hr, Self::NAME, "GetNetwork")?;
        // SAFETY: the callee handed over the reference written to `raw`.
        let handle = unsafe { vtable::adopt(raw, Self::NAME, "GetNetwork")? };
        Ok(Network::from_handle(handle))
    }

    /// Look up one connection by identifier.
    pub fn network_connection(&self, connection_id: &Guid) -> Result<Connection> {
        let (this, vtbl) = self.slots()?;
        let mut raw = std::ptr::null_mut();
        // SAFETY: as for `network`.
        let hr = unsafe { (vtbl.get_network_connection)(this, *connection_id, &mut raw) };
        vtable::check(hr, Self::NAME, "GetNetworkConnection")?;
        // SAFETY: the callee handed over the reference written to `raw`.
        let handle = unsafe { vtable::adopt(raw, Self::NAME, "GetNetworkConnection")? };
        Ok(Connection::from_handle(handle))
    }

    pub fn connectivity(&self) -> Result<Connectivity> {
        dispatch::call::<i32>(&self.handle, Self::NAME, "GetConnectivity", &[]).map(Connectivity::from)
    }

    pub fn is_connected(&self) -> Result<bool> {
        dispatch::get(&self.handle, Self::NAME, "IsConnected")
    }

    pub fn is_connected_to_internet(&self) -> Result<bool> {
        dispatch::get(&self.handle, Self::NAME, "IsConnectedToInternet")
    }
}
