//! INetwork proxy.
//!
//! Names, category, domain type and connectivity go through automation.
//! The identifier and the timestamp pair are only reachable through the
//! vtable.

use chrono::{DateTime, Utc};

use crate::com::abi::Guid;
use crate::com::dispatch::{self, Arg, CallKind};
use crate::com::handle::ComPtr;
use crate::com::interface::Interface;
use crate::com::vtable;
use crate::error::Result;
use crate::wintime;

use super::enumeration::{ConnectionEnumeration, Element};
use super::vtbl::INetworkVtbl;
use super::{Connectivity, DomainType, NetworkCategory, IID_IENUM_NETWORKS, IID_INETWORK};

/// A network the machine has connected to at some point.
#[derive(Debug)]
pub struct Network {
    handle: ComPtr,
}

impl Interface for Network {
    const IID: Guid = IID_INETWORK;
    const NAME: &'static str = "INetwork";

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

impl Element for Network {
    const COLLECTION: &'static str = "IEnumNetworks";
    const COLLECTION_IID: Guid = IID_IENUM_NETWORKS;
}

impl Network {
    pub fn name(&self) -> Result<String> {
        dispatch::call(&self.handle, Self::NAME, "GetName", &[])
    }

    /// Rename the network. Needs administrative rights on a live system.
    pub fn set_name(&self, name: &str) -> Result<()> {
        dispatch::call(&self.handle, Self::NAME, "SetName", &[Arg::Str(name)])
    }

    pub fn description(&self) -> Result<String> {
        dispatch::call(&self.handle, Self::NAME, "GetDescription", &[])
    }

    pub fn set_description(&self, description: &str) -> Result<()> {
        dispatch::call(&self.handle, Self::NAME, "SetDescription", &[Arg::Str(description)])
    }

    /// Unique identifier of the network.
    pub fn network_id(&self) -> Result<Guid> {
        // SAFETY: the handle was resolved for IID_INetwork.
        let (this, vtbl) = unsafe { vtable::slots::<INetworkVtbl>(&self.handle, Self::NAME)? };
        let mut id = Guid::zeroed();
        // SAFETY: `id` is a valid out-parameter for the duration of the call.
        let hr = unsafe { (vtbl.get_network_id)(this, &mut id) };
        vtable::check(hr, Self::NAME, "GetNetworkId")?;
        Ok(id)
    }

    pub fn domain_type(&self) -> Result<DomainType> {
        dispatch::call::<i32>(&self.handle, Self::NAME, "GetDomainType", &[]).map(DomainType::from)
    }

    /// Connections currently attached to this network.
    pub fn network_connections(&self) -> Result<ConnectionEnumeration> {
        let value = dispatch::invoke(&self.handle, Self::NAME, "GetNetworkConnections", CallKind::Method, &[])?;
        ConnectionEnumeration::from_value(value)
    }

    /// When the network was first created and when it was last connected.
    pub fn time_created_and_connected(&self) -> Result<(DateTime<Utc>, DateTime<Utc>)> {
        // SAFETY: the handle was resolved for IID_INetwork.
        let (this, vtbl) = unsafe { vtable::slots::<INetworkVtbl>(&self.handle, Self::NAME)? };
        let (mut created_low, mut created_high) = (0u32, 0u32);
        let (mut connected_low, mut connected_high) = (0u32, 0u32);
        // SAFETY: all four out-parameters outlive the call.
        let hr = unsafe {
            (vtbl.get_time_created_and_connected)(
                this,
                &mut created_low,
                &mut created_high,
                &mut connected_low,
                &mut connected_high,
            )
        };
        vtable::check(hr, Self::NAME, "GetTimeCreatedAndConnected")?;
        Ok((
            wintime::to_datetime(created_low, created_high),
            wintime::to_datetime(connected_low, connected_high),
        ))
    }

    pub fn is_connected_to_internet(&self) -> Result<bool> {
        dispatch::get(&self.handle, Self::NAME, "IsConnectedToInternet")
    }

    pub fn is_connected(&self) -> Result<bool> {
        dispatch::get(&self.handle, Self::NAME, "IsConnected")
    }

    pub fn connectivity(&self) -> Result<Connectivity> {
        dispatch::call::<i32>(&self.handle, Self::NAME, "GetConnectivity", &[]).map(Connectivity::from)
    }

    pub fn category(&self) -> Result<NetworkCategory> {
        dispatch::call::<i32>(&self.handle, Self::NAME, "GetCategory", &[]).map(NetworkCategory::from)
    }

    /// Change the firewall profile category. Needs administrative rights on
    /// a live system.
    pub fn set_category(&self, category: NetworkCategory) -> Result<()> {
        tracing::debug!(category = %category, "setting network category");
        dispatch::call(&self.handle, Self::NAME, "SetCategory", &[Arg::I32(category.0)])
    }
}
