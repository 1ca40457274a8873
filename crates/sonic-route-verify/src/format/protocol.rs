//! Routing daemon RIB and FIB displays.
//!
//! ```text
//! 123.0.0.1/32, 4 unicast next-hops
//!     *via 1.1.1.2, [1/0], static
//!     via 2, [1/0], 00:01:10, static
//! ```
//!
//! FIB dumps print the same next-hop lines under a header without the
//! `unicast next-hops` count.

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::warn;

use crate::locator::{locate_block, BlockGrammar, RouteHeader};
use crate::record::{NextHopAttrs, RouteRecord, RouteSource};

use super::RouteQuery;

static RIB_HEADER_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?P<prefix>[0-9A-Fa-f:.]+(?:/\d{1,3})?),\s+(?P<count>\d+)\s+unicast\s+next-hops?\b")
        .expect("Invalid regex pattern")
});

static FIB_HEADER_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?P<prefix>[0-9A-Fa-f:.]+(?:/\d{1,3})?)\s*(?:,.*)?$")
        .expect("Invalid regex pattern")
});

static NEXTHOP_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^\s*\*?\s*via\s+(?P<nexthop>[^,\s]+),\s*\[(?P<distance>\d+)/(?P<metric>\d+)\](?P<rest>.*)$",
    )
    .expect("Invalid regex pattern")
});

/// Which header shape the dump uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisplayKind {
    Rib,
    Fib,
}

/// Grammar of the RIB/FIB displays.
#[derive(Debug, Clone, Copy)]
pub struct DisplayGrammar {
    kind: DisplayKind,
}

impl DisplayGrammar {
    pub fn new(kind: DisplayKind) -> Self {
        Self { kind }
    }
}

impl BlockGrammar for DisplayGrammar {
    fn header(&self, line: &str) -> Option<RouteHeader> {
        match self.kind {
            DisplayKind::Rib => {
                let caps = RIB_HEADER_RE.captures(line)?;
                let prefix = caps["prefix"].parse().ok()?;
                Some(RouteHeader {
                    prefix,
                    declared_nexthops: caps["count"].parse().ok(),
                })
            }
            DisplayKind::Fib => {
                let caps = FIB_HEADER_RE.captures(line.trim_end())?;
                caps["prefix"].parse().ok().map(RouteHeader::new)
            }
        }
    }

    fn is_nexthop_line(&self, line: &str) -> bool {
        NEXTHOP_RE.is_match(line)
    }
}

/// Parses one next-hop line into its identifier and attributes.
pub fn parse_nexthop_line(line: &str) -> Option<(String, NextHopAttrs)> {
    let caps = NEXTHOP_RE.captures(line)?;
    // The route type is the last comma-separated field; uptime and other
    // columns may precede it.
    let route_type = caps["rest"]
        .rsplit(',')
        .next()
        .map(|field| field.trim_matches(|c: char| c.is_whitespace() || c == '\r'))
        .unwrap_or_default();

    Some((
        caps["nexthop"].to_string(),
        NextHopAttrs::new(&caps["distance"], &caps["metric"], RouteSource::from(route_type)),
    ))
}

/// Extracts the target route from a RIB or FIB display.
pub fn extract(kind: DisplayKind, lines: &[&str], query: &RouteQuery<'_>) -> Option<RouteRecord> {
    let grammar = DisplayGrammar::new(kind);
    let block = locate_block(lines, &grammar, query.prefix())?;

    let mut record = RouteRecord::new(block.header.prefix);
    for line in &block.nexthop_lines {
        if let Some((id, attrs)) = parse_nexthop_line(line) {
            record.insert_nexthop(id, attrs);
        }
    }

    if let Some(declared) = block.header.declared_nexthops {
        if declared != record.number_nexthops() {
            warn!(
                prefix = %record.prefix(),
                declared,
                parsed = record.number_nexthops(),
                "RIB header next-hop count disagrees with listed next-hops"
            );
        }
    }

    if let Some(route_type) = query.route_type {
        record.retain_route_type(route_type);
    }
    Some(record)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_rib_header() {
        let grammar = DisplayGrammar::new(DisplayKind::Rib);
        let header = grammar.header("123.0.0.1/32, 4 unicast next-hops").unwrap();
        assert_eq!(header.prefix.to_string(), "123.0.0.1");
        assert_eq!(header.declared_nexthops, Some(4));

        let one = grammar.header("10.0.0.0/24, 1 unicast next-hop").unwrap();
        assert_eq!(one.declared_nexthops, Some(1));

        assert!(grammar.header("    via 1.1.1.2, [1/0], static").is_none());
        assert!(grammar.header("123.0.0.1/32").is_none());
        assert!(grammar.header("Codes: K - kernel route").is_none());
    }

    #[test]
    fn test_fib_header() {
        let grammar = DisplayGrammar::new(DisplayKind::Fib);
        assert_eq!(
            grammar.header("2001:db8::/64").unwrap().prefix.to_string(),
            "2001:db8::/64"
        );
        assert_eq!(
            grammar.header("10.0.0.0/24, ubest/mbest: 1/0").unwrap().prefix.to_string(),
            "10.0.0.0/24"
        );
        assert!(grammar.header("  10.0.0.0/24").is_none());
        assert!(grammar.header("add").is_none());
    }

    #[test]
    fn test_parse_nexthop_line() {
        let (id, attrs) = parse_nexthop_line("    *via 1.1.1.2, [1/0], static\r").unwrap();
        assert_eq!(id, "1.1.1.2");
        assert_eq!(attrs, NextHopAttrs::new("1", "0", "static"));

        let (id, attrs) = parse_nexthop_line("    via Ethernet4, [20/100], 00:01:10, bgp").unwrap();
        assert_eq!(id, "Ethernet4");
        assert_eq!(attrs, NextHopAttrs::new("20", "100", "bgp"));

        assert!(parse_nexthop_line("    via 1.1.1.2 dev Ethernet0").is_none());
    }

    #[test]
    fn test_mixed_route_types_are_all_kept_without_filter() {
        let text = "10.0.0.0/24, 2 unicast next-hops\n    via 1.1.1.2, [1/0], static\n    via 2.2.2.2, [20/0], bgp\n    via 3.3.3.3, [1/0], static";
        let lines: Vec<&str> = text.lines().collect();
        let expected = RouteRecord::for_prefix("10.0.0.0/24").unwrap();

        let all = extract(DisplayKind::Rib, &lines, &RouteQuery::new(&expected)).unwrap();
        assert_eq!(all.number_nexthops(), 3);

        let static_only = extract(
            DisplayKind::Rib,
            &lines,
            &RouteQuery::new(&expected).with_route_type(Some(&RouteSource::Static)),
        )
        .unwrap();
        // A mismatched line is skipped, not a terminator.
        assert_eq!(static_only.number_nexthops(), 2);
        assert!(static_only.nexthop("3.3.3.3").is_some());
    }
}
