//! Minimal COM plumbing: ABI types, owned handles, the runtime connection,
//! interface resolution, and the two ways of calling a member.

pub mod abi;
pub mod bstr;
pub mod dispatch;
pub mod enum_variant;
pub mod handle;
pub mod interface;
pub mod runtime;
pub mod vtable;

pub use abi::{Guid, HResult};
pub use handle::ComPtr;
pub use interface::{resolve, resolve_raw, resolve_value, Interface};
pub use runtime::{InitStatus, Runtime};
