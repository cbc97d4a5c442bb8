//! Network List Manager bindings.
//!
//! [`Manager`] is the entry point. It hands out [`Network`] and
//! [`Connection`] proxies, either one by identifier or as an
//! [`Enumeration`] built eagerly from the service's collections.

use crate::com::abi::Guid;

pub mod category;
pub mod connection;
pub mod connectivity;
pub mod domain_type;
pub mod enumeration;
pub mod manager;
pub mod network;
pub mod network_class;
pub mod vtbl;

pub use category::NetworkCategory;
pub use connection::Connection;
pub use connectivity::{Connectivity, InternetConnectivity};
pub use domain_type::DomainType;
pub use enumeration::{ConnectionEnumeration, Element, Enumeration, NetworkEnumeration};
pub use manager::{EnumNetworkFlags, Manager};
pub use network::Network;
pub use network_class::NetworkClass;

pub const CLSID_NETWORK_LIST_MANAGER: Guid = Guid::from_u128(0xDCB00C01_570F_4A9B_8D69_199FDBA5723B);

pub const IID_INETWORK_LIST_MANAGER: Guid = Guid::from_u128(0xDCB00000_570F_4A9B_8D69_199FDBA5723B);
pub const IID_INETWORK: Guid = Guid::from_u128(0xDCB00002_570F_4A9B_8D69_199FDBA5723B);
pub const IID_IENUM_NETWORKS: Guid = Guid::from_u128(0xDCB00003_570F_4A9B_8D69_199FDBA5723B);
pub const IID_INETWORK_CONNECTION: Guid = Guid::from_u128(0xDCB00005_570F_4A9B_8D69_199FDBA5723B);
pub const IID_IENUM_NETWORK_CONNECTIONS: Guid = Guid::from_u128(0xDCB00006_570F_4A9B_8D69_199FDBA5723B);
