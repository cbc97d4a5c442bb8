//! NLM_DOMAIN_TYPE.
//!
//! https://learn.microsoft.com/en-us/windows/win32/api/netlistmgr/ne-netlistmgr-nlm_domain_type

use std::fmt;

/// Whether a network belongs to an Active Directory domain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DomainType(pub i32);

impl DomainType {
    pub const NON_DOMAIN_NETWORK: Self = Self(0x0);
    pub const DOMAIN_NETWORK: Self = Self(0x1);
    pub const DOMAIN_AUTHENTICATED: Self = Self(0x2);

    pub fn label(&self) -> &'static str {
        match *self {
            Self::NON_DOMAIN_NETWORK => "None",
            Self::DOMAIN_NETWORK => "Domain",
            Self::DOMAIN_AUTHENTICATED => "DomainAuthenticated",
            _ => "",
        }
    }
}

impl fmt::Display for DomainType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl From<i32> for DomainType {
    fn from(code: i32) -> Self {
        Self(code)
    }
}
