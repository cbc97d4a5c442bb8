//! NLM_CONNECTIVITY and NLM_INTERNET_CONNECTIVITY bitmasks.
//!
//! https://learn.microsoft.com/en-us/windows/win32/api/netlistmgr/ne-netlistmgr-nlm_connectivity
//! https://learn.microsoft.com/en-us/windows/win32/api/netlistmgr/ne-netlistmgr-nlm_internet_connectivity

use std::fmt;
use std::ops::{BitAnd, BitOr};

use crate::bits;

macro_rules! flag_ops {
    ($name:ident) => {
        impl BitAnd for $name {
            type Output = Self;
            fn bitand(self, rhs: Self) -> Self {
                Self(self.0 & rhs.0)
            }
        }

        impl BitOr for $name {
            type Output = Self;
            fn bitor(self, rhs: Self) -> Self {
                Self(self.0 | rhs.0)
            }
        }

        impl From<i32> for $name {
            fn from(bits: i32) -> Self {
                Self(bits)
            }
        }

        impl $name {
            /// True if every bit of `flags` is set.
            pub fn contains(self, flags: Self) -> bool {
                bits::are_set(self, flags)
            }
        }
    };
}

/// Sorted, comma-joined names of the set flags.
fn render(names: &[(&'static str, bool)]) -> String {
    let mut set: Vec<&str> = names.iter().filter(|(_, on)| *on).map(|(name, _)| *name).collect();
    set.sort_unstable();
    set.join(", ")
}

// ─── Connectivity ────────────────────────────────────────────────────────────

/// Per-protocol reachability of a network or connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Connectivity(pub i32);

flag_ops!(Connectivity);

impl Connectivity {
    pub const DISCONNECTED: Self = Self(0x0000);
    pub const IPV4_NOTRAFFIC: Self = Self(0x0001);
    pub const IPV6_NOTRAFFIC: Self = Self(0x0002);
    pub const IPV4_SUBNET: Self = Self(0x0010);
    pub const IPV4_LOCALNETWORK: Self = Self(0x0020);
    pub const IPV4_INTERNET: Self = Self(0x0040);
    pub const IPV6_SUBNET: Self = Self(0x0100);
    pub const IPV6_LOCALNETWORK: Self = Self(0x0200);
    pub const IPV6_INTERNET: Self = Self(0x0400);

    pub fn is_disconnected(self) -> bool {
        self == Self::DISCONNECTED
    }
    pub fn is_ipv4_no_traffic(self) -> bool {
        self.contains(Self::IPV4_NOTRAFFIC)
    }
    pub fn is_ipv6_no_traffic(self) -> bool {
        self.contains(Self::IPV6_NOTRAFFIC)
    }
    pub fn is_ipv4_subnet(self) -> bool {
        self.contains(Self::IPV4_SUBNET)
    }
    pub fn is_ipv4_local_network(self) -> bool {
        self.contains(Self::IPV4_LOCALNETWORK)
    }
    pub fn is_ipv4_internet(self) -> bool {
        self.contains(Self::IPV4_INTERNET)
    }
    pub fn is_ipv6_subnet(self) -> bool {
        self.contains(Self::IPV6_SUBNET)
    }
    pub fn is_ipv6_local_network(self) -> bool {
        self.contains(Self::IPV6_LOCALNETWORK)
    }
    pub fn is_ipv6_internet(self) -> bool {
        self.contains(Self::IPV6_INTERNET)
    }
}

impl fmt::Display for Connectivity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_disconnected() {
            return f.write_str("Disconnected");
        }
        let c = *self;
        f.write_str(&render(&[
            ("IPv4NoTraffic", c.is_ipv4_no_traffic()),
            ("IPv6NoTraffic", c.is_ipv6_no_traffic()),
            ("IPv4Subnet", c.is_ipv4_subnet()),
            ("IPv4LocalNetwork", c.is_ipv4_local_network()),
            ("IPv4Internet", c.is_ipv4_internet()),
            ("IPv6Subnet", c.is_ipv6_subnet()),
            ("IPv6LocalNetwork", c.is_ipv6_local_network()),
            ("IPv6Internet", c.is_ipv6_internet()),
        ]))
    }
}

// ─── Internet connectivity ───────────────────────────────────────────────────

/// Extra detail about how a network reaches the Internet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct InternetConnectivity(pub i32);

flag_ops!(InternetConnectivity);

impl InternetConnectivity {
    pub const WEBHIJACK: Self = Self(0x1);
    pub const PROXIED: Self = Self(0x2);
    pub const CORPORATE: Self = Self(0x4);

    pub fn is_web_hijack(self) -> bool {
        self.contains(Self::WEBHIJACK)
    }
    pub fn is_proxied(self) -> bool {
        self.contains(Self::PROXIED)
    }
    pub fn is_corporate(self) -> bool {
        self.contains(Self::CORPORATE)
    }
}

impl fmt::Display for InternetConnectivity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let c = *self;
        f.write_str(&render(&[
            ("WebHijack", c.is_web_hijack()),
            ("Proxied", c.is_proxied()),
            ("Corporate", c.is_corporate()),
        ]))
    }
}
