//! Unified error type for the binding layer.
//!
//! Every native failure keeps the `HResult` that caused it and names the
//! interface member (or identifier) involved, so callers can decide between
//! aborting and skipping an element.

use crate::com::abi::{Guid, HResult};

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A proxy was requested before the COM runtime was initialized.
    #[error("COM runtime is not initialized")]
    NotInitialized,

    /// `CoInitializeEx` failed.
    #[error("failed to initialize COM runtime: {0}")]
    Runtime(HResult),

    /// `CoCreateInstance` failed for a class.
    #[error("failed to create instance of class {clsid}: {code}")]
    Activation { clsid: Guid, code: HResult },

    /// Resolution was attempted on a null or already-released handle.
    #[error("cannot resolve {interface} {iid} from a null handle")]
    NullHandle { interface: &'static str, iid: Guid },

    /// `QueryInterface` refused the identifier.
    #[error("failed to use unknown interface as {interface} {iid}: {code}")]
    Resolve { interface: &'static str, iid: Guid, code: HResult },

    /// A named automation call failed.
    #[error("failed to call {interface}::{member}: {code}")]
    Dispatch { interface: &'static str, member: &'static str, code: HResult },

    /// A direct vtable call returned a failure status.
    #[error("vtable call {interface}::{member} failed: {code}")]
    VtableCall { interface: &'static str, member: &'static str, code: HResult },

    /// An automation result carried a different payload than declared.
    #[error("unexpected result type for {member}: expected {expected} but got {actual}")]
    UnexpectedType { member: &'static str, expected: &'static str, actual: &'static str },

    /// One element of a collection could not be resolved; everything built
    /// before it has already been released.
    #[error("failed to resolve element {index} of {collection}: {source}")]
    Enumeration {
        collection: &'static str,
        index: usize,
        #[source]
        source: Box<Error>,
    },

    /// The proxy's handle was already released.
    #[error("{interface} used after release")]
    Released { interface: &'static str },

    /// Invalid configuration value.
    #[error("invalid configuration: {0}")]
    Config(String),
}

impl Error {
    /// The native status code behind this error, if there is one.
    pub fn code(&self) -> Option<HResult> {
        match self {
            Self::Runtime(code)
            | Self::Activation { code, .. }
            | Self::Resolve { code, .. }
            | Self::Dispatch { code, .. }
            | Self::VtableCall { code, .. } => Some(*code),
            Self::Enumeration { source, .. } => source.code(),
            _ => None,
        }
    }

    /// Returns the error kind as a string matching the variant name.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::NotInitialized => "NotInitialized",
            Self::Runtime(_) => "Runtime",
            Self::Activation { .. } => "Activation",
            Self::NullHandle { .. } => "NullHandle",
            Self::Resolve { .. } => "Resolve",
            Self::Dispatch { .. } => "Dispatch",
            Self::VtableCall { .. } => "VtableCall",
            Self::UnexpectedType { .. } => "UnexpectedType",
            Self::Enumeration { .. } => "Enumeration",
            Self::Released { .. } => "Released",
            Self::Config(_) => "Config",
        }
    }
}
