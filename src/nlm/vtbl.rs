// https://learn.microsoft.com/en-us/windows/win32/api/netlistmgr/
//
// um/netlistmgr.h
//
// Slot order is the binary contract: every layout starts with the seven
// IUnknown + IDispatch slots and then lists the interface's own methods in
// the exact order the header declares them. Property getters appear as
// `get_X` slots in place. Enum parameters are 32-bit.

use crate::com::abi::{Guid, HResult, IDispatchVtbl, RawPtr};

#[repr(C)]
pub struct INetworkListManagerVtbl {
    pub base: IDispatchVtbl,
    pub get_networks: unsafe extern "system" fn(this: RawPtr, flags: i32, networks: *mut RawPtr) -> HResult,
    pub get_network: unsafe extern "system" fn(this: RawPtr, network_id: Guid, network: *mut RawPtr) -> HResult,
    pub get_network_connections: unsafe extern "system" fn(this: RawPtr, connections: *mut RawPtr) -> HResult,
    pub get_network_connection: unsafe extern "system" fn(this: RawPtr, connection_id: Guid, connection: *mut RawPtr) -> HResult,
    pub get_is_connected_to_internet: unsafe extern "system" fn(this: RawPtr, connected: *mut i16) -> HResult,
    pub get_is_connected: unsafe extern "system" fn(this: RawPtr, connected: *mut i16) -> HResult,
    pub get_connectivity: unsafe extern "system" fn(this: RawPtr, connectivity: *mut i32) -> HResult,
    pub set_simulated_profile_info: unsafe extern "system" fn(this: RawPtr, info: *mut std::ffi::c_void) -> HResult,
    pub clear_simulated_profile_info: unsafe extern "system" fn(this: RawPtr) -> HResult,
}

#[repr(C)]
pub struct INetworkVtbl {
    pub base: IDispatchVtbl,
    pub get_name: unsafe extern "system" fn(this: RawPtr, name: *mut *mut u16) -> HResult,
    pub set_name: unsafe extern "system" fn(this: RawPtr, name: *mut u16) -> HResult,
    pub get_description: unsafe extern "system" fn(this: RawPtr, description: *mut *mut u16) -> HResult,
    pub set_description: unsafe extern "system" fn(this: RawPtr, description: *mut u16) -> HResult,
    pub get_network_id: unsafe extern "system" fn(this: RawPtr, network_id: *mut Guid) -> HResult,
    pub get_domain_type: unsafe extern "system" fn(this: RawPtr, domain_type: *mut i32) -> HResult,
    pub get_network_connections: unsafe extern "system" fn(this: RawPtr, connections: *mut RawPtr) -> HResult,
    pub get_time_created_and_connected: unsafe extern "system" fn(
        this: RawPtr,
        created_low: *mut u32,
        created_high: *mut u32,
        connected_low: *mut u32,
        connected_high: *mut u32,
    ) -> HResult,
    pub get_is_connected_to_internet: unsafe extern "system" fn(this: RawPtr, connected: *mut i16) -> HResult,
    pub get_is_connected: unsafe extern "system" fn(this: RawPtr, connected: *mut i16) -> HResult,
    pub get_connectivity: unsafe extern "system" fn(this: RawPtr, connectivity: *mut i32) -> HResult,
    pub get_category: unsafe extern "system" fn(this: RawPtr, category: *mut i32) -> HResult,
    pub set_category: unsafe extern "system" fn(this: RawPtr, category: i32) -> HResult,
}

#[repr(C)]
pub struct INetworkConnectionVtbl {
    pub base: IDispatchVtbl,
    pub get_network: unsafe extern "system" fn(this: RawPtr, network: *mut RawPtr) -> HResult,
    pub get_is_connected_to_internet: unsafe extern "system" fn(this: RawPtr, connected: *mut i16) -> HResult,
    pub get_is_connected: unsafe extern "system" fn(this: RawPtr, connected: *mut i16) -> HResult,
    pub get_connectivity: unsafe extern "system" fn(this: RawPtr, connectivity: *mut i32) -> HResult,
    pub get_connection_id: unsafe extern "system" fn(this: RawPtr, connection_id: *mut Guid) -> HResult,
    pub get_adapter_id: unsafe extern "system" fn(this: RawPtr, adapter_id: *mut Guid) -> HResult,
    pub get_domain_type: unsafe extern "system" fn(this: RawPtr, domain_type: *mut i32) -> HResult,
}

const PTR: usize = std::mem::size_of::<usize>();
const DISPATCH_SLOTS: usize = 7;
const _: () = assert!(std::mem::size_of::<INetworkListManagerVtbl>() == (DISPATCH_SLOTS + 9) * PTR);
const _: () = assert!(std::mem::size_of::<INetworkVtbl>() == (DISPATCH_SLOTS + 13) * PTR);
const _: () = assert!(std::mem::size_of::<INetworkConnectionVtbl>() == (DISPATCH_SLOTS + 7) * PTR);
