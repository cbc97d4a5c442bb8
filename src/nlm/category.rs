//! NLM_NETWORK_CATEGORY.
//!
//! https://learn.microsoft.com/en-us/windows/win32/api/netlistmgr/ne-netlistmgr-nlm_network_category

use std::fmt;

/// Firewall profile category of a network. A closed code set, not a bitmask.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NetworkCategory(pub i32);

impl NetworkCategory {
    pub const PUBLIC: Self = Self(0x0);
    pub const PRIVATE: Self = Self(0x1);
    pub const DOMAIN_AUTHENTICATED: Self = Self(0x2);

    /// Label for known codes, `""` otherwise.
    pub fn label(&self) -> &'static str {
        match *self {
            Self::PUBLIC => "Public",
            Self::PRIVATE => "Private",
            Self::DOMAIN_AUTHENTICATED => "DomainAuthenticated",
            _ => "",
        }
    }
}

impl fmt::Display for NetworkCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl From<i32> for NetworkCategory {
    fn from(code: i32) -> Self {
        Self(code)
    }
}
