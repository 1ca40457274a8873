//! IP address and prefix types with safe parsing.
//!
//! Route dumps disagree on how they print host routes: the routing daemon
//! prints `10.0.0.1/32` while the kernel prints the bare `10.0.0.1`. The
//! types here accept both shapes and compare structurally.

use crate::ParseError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};
use std::str::FromStr;

/// Address family a prefix or address belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AddressFamily {
    V4,
    V6,
}

impl AddressFamily {
    /// Maximum mask length for the family (32 or 128).
    pub const fn max_prefix_len(&self) -> u8 {
        match self {
            AddressFamily::V4 => 32,
            AddressFamily::V6 => 128,
        }
    }

    /// Unspecified address of the family (`0.0.0.0` or `::`).
    pub const fn unspecified(&self) -> IpAddress {
        match self {
            AddressFamily::V4 => IpAddress::V4(Ipv4Addr::UNSPECIFIED),
            AddressFamily::V6 => IpAddress::V6(Ipv6Addr::UNSPECIFIED),
        }
    }
}

impl fmt::Display for AddressFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AddressFamily::V4 => f.write_str("ipv4"),
            AddressFamily::V6 => f.write_str("ipv6"),
        }
    }
}

/// An IP address that can be either IPv4 or IPv6.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(untagged)]
pub enum IpAddress {
    V4(Ipv4Addr),
    V6(Ipv6Addr),
}

impl IpAddress {
    /// Returns the address family.
    pub const fn family(&self) -> AddressFamily {
        match self {
            IpAddress::V4(_) => AddressFamily::V4,
            IpAddress::V6(_) => AddressFamily::V6,
        }
    }

    /// Returns true if this is an IPv4 address.
    pub const fn is_ipv4(&self) -> bool {
        matches!(self, IpAddress::V4(_))
    }

    /// Returns true if this is an IPv6 address.
    pub const fn is_ipv6(&self) -> bool {
        matches!(self, IpAddress::V6(_))
    }

    /// Returns true for `0.0.0.0` and `::`.
    pub fn is_unspecified(&self) -> bool {
        match self {
            IpAddress::V4(addr) => addr.is_unspecified(),
            IpAddress::V6(addr) => addr.is_unspecified(),
        }
    }
}

impl fmt::Display for IpAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IpAddress::V4(addr) => fmt::Display::fmt(addr, f),
            IpAddress::V6(addr) => fmt::Display::fmt(addr, f),
        }
    }
}

impl FromStr for IpAddress {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse::<IpAddr>()
            .map(IpAddress::from)
            .map_err(|_| ParseError::InvalidIpAddress(s.to_string()))
    }
}

impl From<IpAddr> for IpAddress {
    fn from(addr: IpAddr) -> Self {
        match addr {
            IpAddr::V4(v4) => IpAddress::V4(v4),
            IpAddr::V6(v6) => IpAddress::V6(v6),
        }
    }
}

impl From<Ipv4Addr> for IpAddress {
    fn from(addr: Ipv4Addr) -> Self {
        IpAddress::V4(addr)
    }
}

impl From<Ipv6Addr> for IpAddress {
    fn from(addr: Ipv6Addr) -> Self {
        IpAddress::V6(addr)
    }
}

/// An IP prefix in CIDR notation (e.g., 10.0.0.0/24 or 2001:db8::/32).
///
/// Parsing accepts a bare address as the host prefix of its family, so
/// `"10.0.0.1"` and `"10.0.0.1/32"` yield equal values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct IpPrefix {
    address: IpAddress,
    prefix_len: u8,
}

impl IpPrefix {
    /// Creates a new IP prefix.
    ///
    /// # Errors
    ///
    /// Returns an error if the prefix length is invalid for the address type
    /// (>32 for IPv4, >128 for IPv6).
    pub fn new(address: IpAddress, prefix_len: u8) -> Result<Self, ParseError> {
        let max_len = address.family().max_prefix_len();
        if prefix_len > max_len {
            return Err(ParseError::InvalidIpPrefix(format!(
                "prefix length {} exceeds maximum {} for address type",
                prefix_len, max_len
            )));
        }

        Ok(IpPrefix {
            address,
            prefix_len,
        })
    }

    /// Creates the host prefix (/32 or /128) for an address.
    pub const fn host(address: IpAddress) -> Self {
        IpPrefix {
            address,
            prefix_len: address.family().max_prefix_len(),
        }
    }

    /// Creates the default route prefix (`0.0.0.0/0` or `::/0`).
    pub const fn default_route(family: AddressFamily) -> Self {
        IpPrefix {
            address: family.unspecified(),
            prefix_len: 0,
        }
    }

    /// Returns the network address of this prefix.
    pub const fn address(&self) -> &IpAddress {
        &self.address
    }

    /// Returns the prefix length in bits.
    pub const fn prefix_len(&self) -> u8 {
        self.prefix_len
    }

    /// Returns the address family.
    pub const fn family(&self) -> AddressFamily {
        self.address.family()
    }

    /// Returns true if this is an IPv4 prefix.
    pub const fn is_ipv4(&self) -> bool {
        self.address.is_ipv4()
    }

    /// Returns true if this is an IPv6 prefix.
    pub const fn is_ipv6(&self) -> bool {
        self.address.is_ipv6()
    }

    /// Returns true if this is a host route (/32 for IPv4, /128 for IPv6).
    pub const fn is_host_route(&self) -> bool {
        self.prefix_len == self.address.family().max_prefix_len()
    }

    /// Returns true if this is the default route (0.0.0.0/0 or ::/0).
    pub fn is_default(&self) -> bool {
        self.prefix_len == 0
    }

    /// Formats the prefix as `addr/len` even for host routes.
    pub fn cidr(&self) -> String {
        format!("{}/{}", self.address, self.prefix_len)
    }
}

/// Host routes print as the bare address; everything else as `addr/len`.
impl fmt::Display for IpPrefix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_host_route() {
            fmt::Display::fmt(&self.address, f)
        } else {
            write!(f, "{}/{}", self.address, self.prefix_len)
        }
    }
}

impl FromStr for IpPrefix {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let Some((addr_str, len_str)) = s.rsplit_once('/') else {
            let address: IpAddress = s
                .parse()
                .map_err(|_| ParseError::InvalidIpPrefix(s.to_string()))?;
            return Ok(IpPrefix::host(address));
        };

        let address: IpAddress = addr_str
            .parse()
            .map_err(|_| ParseError::InvalidIpPrefix(s.to_string()))?;
        let prefix_len: u8 = len_str
            .parse()
            .map_err(|_| ParseError::InvalidIpPrefix(s.to_string()))?;

        IpPrefix::new(address, prefix_len)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_ip_address_discrimination() {
        let v4: IpAddress = "10.0.0.1".parse().unwrap();
        assert!(v4.is_ipv4());
        assert_eq!(v4.family(), AddressFamily::V4);

        let v6: IpAddress = "::1".parse().unwrap();
        assert!(v6.is_ipv6());
        assert_eq!(v6.family(), AddressFamily::V6);
    }

    #[test]
    fn test_unspecified() {
        assert!("0.0.0.0".parse::<IpAddress>().unwrap().is_unspecified());
        assert!("::".parse::<IpAddress>().unwrap().is_unspecified());
        assert!(!"1.1.1.2".parse::<IpAddress>().unwrap().is_unspecified());
    }

    #[test]
    fn test_ip_prefix_parse() {
        let prefix: IpPrefix = "10.0.0.0/24".parse().unwrap();
        assert!(prefix.is_ipv4());
        assert_eq!(prefix.prefix_len(), 24);

        let v6_prefix: IpPrefix = "2001:db8::/32".parse().unwrap();
        assert!(v6_prefix.is_ipv6());
        assert_eq!(v6_prefix.prefix_len(), 32);
    }

    #[test]
    fn test_bare_address_is_host_route() {
        let bare: IpPrefix = "10.0.0.0".parse().unwrap();
        let full: IpPrefix = "10.0.0.0/32".parse().unwrap();
        assert_eq!(bare, full);
        assert!(bare.is_host_route());

        let bare_v6: IpPrefix = "2001:db8::1".parse().unwrap();
        let full_v6: IpPrefix = "2001:db8:0::1/128".parse().unwrap();
        assert_eq!(bare_v6, full_v6);
    }

    #[test]
    fn test_display_canonical_form() {
        let host: IpPrefix = "123.0.0.1/32".parse().unwrap();
        assert_eq!(host.to_string(), "123.0.0.1");
        assert_eq!(host.cidr(), "123.0.0.1/32");

        let network: IpPrefix = "192.168.0.0/16".parse().unwrap();
        assert_eq!(network.to_string(), "192.168.0.0/16");

        let v6: IpPrefix = "2001:0db8:0000::/48".parse().unwrap();
        assert_eq!(v6.to_string(), "2001:db8::/48");
    }

    #[test]
    fn test_default_route() {
        let default_v4: IpPrefix = "0.0.0.0/0".parse().unwrap();
        assert!(default_v4.is_default());
        assert_eq!(default_v4, IpPrefix::default_route(AddressFamily::V4));

        let default_v6: IpPrefix = "::/0".parse().unwrap();
        assert_eq!(default_v6, IpPrefix::default_route(AddressFamily::V6));
    }

    #[test]
    fn test_invalid_prefix() {
        assert!("10.0.0.0/33".parse::<IpPrefix>().is_err());
        assert!("2001:db8::/129".parse::<IpPrefix>().is_err());
        assert!("Ethernet0".parse::<IpPrefix>().is_err());
        assert!("10.0.0.0/abc".parse::<IpPrefix>().is_err());
    }
}
