//! NLM_NETWORK_CLASS.
//!
//! https://learn.microsoft.com/en-us/windows/win32/api/netlistmgr/ne-netlistmgr-nlm_network_class

use std::fmt;

/// Identification state of a network.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NetworkClass(pub i32);

impl NetworkClass {
    pub const IDENTIFYING: Self = Self(0x1);
    pub const IDENTIFIED: Self = Self(0x2);
    pub const UNIDENTIFIED: Self = Self(0x3);

    pub fn label(&self) -> &'static str {
        match *self {
            Self::IDENTIFYING => "Identifying",
            Self::IDENTIFIED => "Identified",
            Self::UNIDENTIFIED => "Unidentified",
            _ => "",
        }
    }
}

impl fmt::Display for NetworkClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
