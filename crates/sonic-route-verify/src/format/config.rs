//! Running-configuration line matcher.
//!
//! No structural parsing: for every expected next-hop the exact static
//! route line is built and looked up. Static routes of a VRF live inside its
//! `vrf <name>` stanza and are only matched there.
//!
//! FRR does not print the default administrative distance, so a next-hop
//! expected at distance 1 matches the bare line as well as the explicit one.

use sonic_types::{AddressFamily, IpPrefix};

use crate::record::RouteRecord;

use super::RouteQuery;

/// Distance staticd applies when the line carries none.
pub const DEFAULT_STATIC_DISTANCE: &str = "1";

/// Builds the configuration line for one static next-hop, as FRR prints it.
pub fn build_static_route_line(prefix: &IpPrefix, nexthop: &str, distance: Option<&str>) -> String {
    let afi = match prefix.family() {
        AddressFamily::V4 => "ip",
        AddressFamily::V6 => "ipv6",
    };
    match distance.filter(|d| *d != DEFAULT_STATIC_DISTANCE) {
        Some(distance) => format!("{} route {} {} {}", afi, prefix.cidr(), nexthop, distance),
        None => format!("{} route {} {}", afi, prefix.cidr(), nexthop),
    }
}

/// Every spelling of the line configuring `nexthop` at `distance`.
fn static_route_lines(prefix: &IpPrefix, nexthop: &str, distance: Option<&str>) -> Vec<String> {
    let line = build_static_route_line(prefix, nexthop, distance);
    if distance == Some(DEFAULT_STATIC_DISTANCE) {
        let explicit = format!("{} {}", line, DEFAULT_STATIC_DISTANCE);
        vec![line, explicit]
    } else {
        vec![line]
    }
}

/// Dump lines that belong to `vrf` (`None` = default VRF), trimmed.
fn vrf_scoped_lines<'a>(lines: &[&'a str], vrf: Option<&str>) -> Vec<&'a str> {
    let mut current: Option<&str> = None;
    let mut scoped = Vec::new();

    for line in lines {
        let trimmed = line.trim();
        if let Some(name) = line.strip_prefix("vrf ") {
            current = Some(name.trim());
            continue;
        }
        if trimmed == "exit-vrf" || *line == "!" {
            current = None;
            continue;
        }
        if current == vrf {
            scoped.push(trimmed);
        }
    }
    scoped
}

/// Returns true if the exact configuration line is present.
pub fn contains_line(lines: &[&str], vrf: Option<&str>, wanted: &str) -> bool {
    vrf_scoped_lines(lines, vrf).iter().any(|line| *line == wanted)
}

/// Builds the observed record from the expected next-hops whose lines exist.
///
/// A present line confirms the expected next-hop as a whole, so its
/// attributes are carried over unchanged. Returns `None` when none of them
/// is configured.
pub fn extract(lines: &[&str], query: &RouteQuery<'_>) -> Option<RouteRecord> {
    let expected = query.expected();
    let scoped = vrf_scoped_lines(lines, query.vrf);
    let mut record = RouteRecord::new(*expected.prefix());

    for (id, attrs) in expected.nexthops() {
        let configured = static_route_lines(expected.prefix(), id, attrs.distance.as_deref())
            .iter()
            .any(|wanted| scoped.iter().any(|line| line == wanted));
        if configured {
            record.insert_nexthop(id.clone(), attrs.clone());
        }
    }

    if record.number_nexthops() == 0 {
        None
    } else {
        Some(record)
    }
}
