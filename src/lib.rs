//! netlistmgr: Rust bindings for the Windows Network List Manager.
//!
//! The Network List Manager is a COM service that knows every network the
//! machine has seen and every live connection to one. This crate talks to it
//! through hand-declared vtables and `IDispatch`, without generated
//! bindings:
//!
//!   - runtime: explicit `CoInitializeEx`/`CoUninitialize` with balanced counts
//!   - resolution: each proxy type is bound to one interface identifier
//!   - invocation: named automation calls or direct vtable slots, per member
//!   - enumeration: eager, all-or-nothing snapshots of the service collections
//!   - decoding: categories, domain types, connectivity bits, FILETIMEs
//!
//! ```no_run
//! use netlistmgr::{com::runtime, nlm::Manager};
//!
//! # fn main() -> netlistmgr::Result<()> {
//! runtime::initialize()?;
//! let manager = Manager::new()?;
//! for connection in &manager.network_connections()? {
//!     let network = connection.network()?;
//!     println!("{} ({})", network.name()?, network.category()?);
//! }
//! drop(manager);
//! runtime::uninitialize();
//! # Ok(())
//! # }
//! ```

pub mod bits;
pub mod com;
pub mod config;
pub mod error;
pub mod nlm;
pub mod wintime;

#[cfg(test)]
pub(crate) mod testing;

pub use com::{Guid, HResult, Interface};
pub use config::RuntimeConfig;
pub use error::{Error, Result};
