//! INetworkConnection proxy.

use crate::com::abi::{Guid, RawPtr};
use crate::com::dispatch;
use crate::com::handle::ComPtr;
use crate::com::interface::Interface;
use crate::com::vtable;
use crate::error::Result;

use super::enumeration::Element;
use super::network::Network;
use super::vtbl::INetworkConnectionVtbl;
use super::{Connectivity, DomainType, IID_IENUM_NETWORK_CONNECTIONS, IID_INETWORK_CONNECTION};

/// One adapter's attachment to a network.
#[derive(Debug)]
pub struct Connection {
    handle: ComPtr,
}

impl Interface for Connection {
    const IID: Guid = IID_INETWORK_CONNECTION;
    const NAME: &'static str = "INetworkConnection";

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

impl Element for Connection {
    const COLLECTION: &'static str = "IEnumNetworkConnections";
    const COLLECTION_IID: Guid = IID_IENUM_NETWORK_CONNECTIONS;
}

impl Connection {
    fn slots(&self) -> Result<(RawPtr, &INetworkConnectionVtbl)> {
        // SAFETY: the handle was resolved for IID_INetworkConnection.
        unsafe { vtable::slots::<INetworkConnectionVtbl>(&self.handle, Self::NAME) }
    }

    /// The network this connection belongs to, as an independent proxy.
    pub fn network(&self) -> Result<Network> {
        let (this, vtbl) = self.slots()?;
        let mut raw = std::ptr::null_mut();
        // SAFETY: `raw` receives one owned INetwork reference on success.
        let hr = unsafe { (vtbl.get_network)(this, &mut raw) };
        vtable::check(hr, Self::NAME, "GetNetwork")?;
        // SAFETY: the callee handed over the reference written to `raw`.
        let handle = unsafe { vtable::adopt(raw, Self::NAME, "GetNetwork")? };
        Ok(Network::from_handle(handle))
    }

    /// Identifier of the network adapter behind this connection.
    pub fn adapter_id(&self) -> Result<Guid> {
        let (this, vtbl) = self.slots()?;
        let mut id = Guid::zeroed();
        // SAFETY: `id` outlives the call.
        let hr = unsafe { (vtbl.get_adapter_id)(this, &mut id) };
        vtable::check(hr, Self::NAME, "GetAdapterId")?;
        Ok(id)
    }

    pub fn connection_id(&self) -> Result<Guid> {
        let (this, vtbl) = self.slots()?;
        let mut id = Guid::zeroed();
        // SAFETY: `id` outlives the call.
        let hr = unsafe { (vtbl.get_connection_id)(this, &mut id) };
        vtable::check(hr, Self::NAME, "GetConnectionId")?;
        Ok(id)
    }

    pub fn connectivity(&self) -> Result<Connectivity> {
        dispatch::call::<i32>(&self.handle, Self::NAME, "GetConnectivity", &[]).map(Connectivity::from)
    }

    pub fn domain_type(&self) -> Result<DomainType> {
        dispatch::call::<i32>(&self.handle, Self::NAME, "GetDomainType", &[]).map(DomainType::from)
    }

    pub fn is_connected(&self) -> Result<bool> {
        dispatch::get(&self.handle, Self::NAME, "IsConnected")
    }

    pub fn is_connected_to_internet(&self) -> Result<bool> {
        dispatch::get(&self.handle, Self::NAME, "IsConnectedToInternet")
    }
}
