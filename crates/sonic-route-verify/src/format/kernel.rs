//! Kernel route dumps (`ip route show`).
//!
//! ```text
//! 123.0.0.1 proto static metric 20
//!         nexthop via 1.1.1.2 dev Ethernet0 weight 1
//!         nexthop dev Ethernet4 weight 1
//! 10.0.0.0/24 dev Ethernet0 proto kernel scope link src 10.0.0.1
//! 20.0.0.0/24 via 10.0.0.2 dev Ethernet0 proto bgp metric 20
//! ```
//!
//! The kernel drops the mask of host routes, so headers are parsed into a
//! prefix rather than matched as text. Distance and metric are never
//! reported; the route type is whatever the caller asked for.
//!
//! Older iproute2 releases print IPv6 multipath routes as one header per
//! member, so every header of the target prefix contributes next-hops.

use once_cell::sync::Lazy;
use regex::Regex;
use sonic_types::{AddressFamily, IpPrefix};

use crate::locator::{locate_blocks, BlockGrammar, RouteHeader};
use crate::record::{NextHopAttrs, RouteRecord, RouteSource};

use super::RouteQuery;

/// Route kinds `ip route` prints ahead of the destination.
const ROUTE_KINDS: &[&str] = &[
    "unicast",
    "local",
    "broadcast",
    "blackhole",
    "unreachable",
    "prohibit",
    "throw",
    "anycast",
    "multicast",
];

static VIA_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\bvia\s+(?:inet6?\s+)?(?P<gateway>[0-9A-Fa-f:.]+)").expect("Invalid regex pattern")
});

static DEV_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\bdev\s+(?P<dev>\S+)").expect("Invalid regex pattern"));

/// Grammar of `ip route show` output for one address family.
#[derive(Debug, Clone, Copy)]
pub struct KernelGrammar {
    family: AddressFamily,
}

impl KernelGrammar {
    pub fn new(family: AddressFamily) -> Self {
        Self { family }
    }

    fn destination(&self, token: &str) -> Option<IpPrefix> {
        let prefix = if token == "default" {
            IpPrefix::default_route(self.family)
        } else {
            token.parse::<IpPrefix>().ok()?
        };
        (prefix.family() == self.family).then_some(prefix)
    }
}

impl BlockGrammar for KernelGrammar {
    fn header(&self, line: &str) -> Option<RouteHeader> {
        if line.is_empty() || line.starts_with(char::is_whitespace) {
            return None;
        }
        let mut tokens = line.split_whitespace();
        let mut token = tokens.next()?;
        if ROUTE_KINDS.contains(&token) {
            token = tokens.next()?;
        }
        self.destination(token).map(RouteHeader::new)
    }

    fn is_nexthop_line(&self, line: &str) -> bool {
        let trimmed = line.trim_start();
        line.len() != trimmed.len() && trimmed.starts_with("nexthop ")
    }
}

/// Parses the next-hop carried by a header or `nexthop` line.
///
/// The identifier is the gateway address when present, else the device.
pub fn parse_nexthop(line: &str) -> Option<String> {
    if let Some(caps) = VIA_RE.captures(line) {
        return Some(caps["gateway"].to_string());
    }
    DEV_RE.captures(line).map(|caps| caps["dev"].to_string())
}

/// Extracts the target route from a kernel route dump.
pub fn extract(lines: &[&str], query: &RouteQuery<'_>) -> Option<RouteRecord> {
    let grammar = KernelGrammar::new(query.prefix().family());
    let blocks = locate_blocks(lines, &grammar, query.prefix());
    let first = blocks.first()?;

    let route_type = query.route_type.cloned().unwrap_or(RouteSource::Kernel);
    let mut record = RouteRecord::new(first.header.prefix);

    for block in &blocks {
        for id in block.lines().into_iter().filter_map(parse_nexthop) {
            record.insert_nexthop(id, NextHopAttrs::without_preference(route_type.clone()));
        }
    }
    Some(record)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn v4() -> KernelGrammar {
        KernelGrammar::new(AddressFamily::V4)
    }

    #[test]
    fn test_header_shapes() {
        let g = v4();
        assert_eq!(
            g.header("123.0.0.1 proto static metric 20").unwrap().prefix,
            "123.0.0.1/32".parse().unwrap()
        );
        assert_eq!(
            g.header("default via 10.0.0.1 dev eth0").unwrap().prefix,
            "0.0.0.0/0".parse().unwrap()
        );
        assert_eq!(
            g.header("blackhole 10.9.0.0/16 proto static").unwrap().prefix,
            "10.9.0.0/16".parse().unwrap()
        );
        assert!(g.header("\tnexthop via 1.1.1.2 dev Ethernet0 weight 1").is_none());
        assert!(g.header("2001:db8::/64 dev Ethernet0").is_none());
    }

    #[test]
    fn test_parse_nexthop_shapes() {
        assert_eq!(
            parse_nexthop("20.0.0.0/24 via 10.0.0.2 dev Ethernet0 proto bgp"),
            Some("10.0.0.2".to_string())
        );
        assert_eq!(
            parse_nexthop("10.0.0.0/24 dev Ethernet0 proto kernel scope link"),
            Some("Ethernet0".to_string())
        );
        assert_eq!(
            parse_nexthop("\tnexthop via 1.1.1.2 dev Ethernet0 weight 1"),
            Some("1.1.1.2".to_string())
        );
        assert_eq!(
            parse_nexthop("\tnexthop dev Ethernet4 weight 1"),
            Some("Ethernet4".to_string())
        );
        assert_eq!(
            parse_nexthop("10.1.0.0/24 via inet6 fe80::1 dev Ethernet8"),
            Some("fe80::1".to_string())
        );
        assert_eq!(parse_nexthop("123.0.0.1 proto static metric 20"), None);
    }

    #[test]
    fn test_extract_ecmp_host_route() {
        let text = "10.0.0.0/24 dev Ethernet0 proto kernel scope link src 10.0.0.1\n\
                    123.0.0.1 proto static metric 20\n\
                    \tnexthop via 1.1.1.2 dev Ethernet0 weight 1\n\
                    \tnexthop dev Ethernet4 weight 1\n\
                    123.0.0.10 via 1.1.1.2 dev Ethernet0 proto static";
        let lines: Vec<&str> = text.lines().collect();
        let expected = RouteRecord::for_prefix("123.0.0.1/32").unwrap();
        let query = RouteQuery::new(&expected).with_route_type(Some(&RouteSource::Static));

        let record = extract(&lines, &query).unwrap();
        assert_eq!(record.number_nexthops(), 2);
        assert_eq!(
            record.nexthop("Ethernet4"),
            Some(&NextHopAttrs::without_preference("static"))
        );
        assert!(record.nexthop("1.1.1.2").is_some());
    }

    #[test]
    fn test_extract_defaults_to_kernel_type() {
        let lines = vec!["10.0.0.0/24 dev Ethernet0 proto kernel scope link"];
        let expected = RouteRecord::for_prefix("10.0.0.0/24").unwrap();
        let record = extract(&lines, &RouteQuery::new(&expected)).unwrap();
        assert_eq!(
            record.nexthop("Ethernet0").unwrap().route_type,
            RouteSource::Kernel
        );
    }

    #[test]
    fn test_extract_merges_per_member_ipv6_headers() {
        let text = "2001:db8::/64 via fe80::1 dev Ethernet0 proto bgp metric 20 pref medium\n\
                    2001:db8:1::/64 via fe80::9 dev Ethernet0 proto bgp metric 20 pref medium\n\
                    2001:db8::/64 via fe80::2 dev Ethernet4 proto bgp metric 20 pref medium";
        let lines: Vec<&str> = text.lines().collect();
        let expected = RouteRecord::for_prefix("2001:db8::/64").unwrap();
        let query = RouteQuery::new(&expected).with_route_type(Some(&RouteSource::Bgp));

        let record = extract(&lines, &query).unwrap();
        assert_eq!(record.number_nexthops(), 2);
        assert!(record.nexthop("fe80::1").is_some());
        assert!(record.nexthop("fe80::2").is_some());
        assert!(record.nexthop("fe80::9").is_none());
    }
}
