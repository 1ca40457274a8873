//! APPL_DB route table entries read with the database client.
//!
//! `HGETALL` prints alternating field and value lines:
//!
//! ```text
//! nexthop
//! 1.1.1.2,0.0.0.0
//! ifname
//! Ethernet0,Ethernet4
//! protocol
//! static
//! ```
//!
//! `nexthop` and `ifname` are parallel lists. An unspecified gateway means
//! the interface itself is the next-hop.

use std::collections::HashMap;

use sonic_types::IpAddress;

use crate::record::{NextHopAttrs, RouteRecord, RouteSource};

use super::RouteQuery;

/// Route entry field names.
pub mod fields {
    pub const NEXTHOP: &str = "nexthop";
    pub const IFNAME: &str = "ifname";
    pub const PROTOCOL: &str = "protocol";
    pub const BLACKHOLE: &str = "blackhole";
}

/// Pairs up the field/value lines of an `HGETALL` reply.
pub fn parse_field_values(lines: &[&str]) -> HashMap<String, String> {
    lines
        .iter()
        .map(|line| line.trim())
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .chunks(2)
        .filter_map(|pair| match pair {
            [field, value] => Some((field.to_string(), value.to_string())),
            _ => None,
        })
        .collect()
}

fn split_list(value: Option<&String>) -> Vec<&str> {
    value
        .map(|v| v.split(',').map(str::trim).collect())
        .unwrap_or_default()
}

fn is_unspecified(gateway: &str) -> bool {
    gateway.is_empty()
        || gateway
            .parse::<IpAddress>()
            .map(|addr| addr.is_unspecified())
            .unwrap_or(false)
}

/// Extracts the queried route from an `HGETALL` reply.
///
/// An empty reply means the key does not exist.
pub fn extract(lines: &[&str], query: &RouteQuery<'_>) -> Option<RouteRecord> {
    let fvs = parse_field_values(lines);
    if fvs.is_empty() {
        return None;
    }

    let route_type = fvs
        .get(fields::PROTOCOL)
        .map(|p| RouteSource::from(p.as_str()))
        .or_else(|| query.route_type.cloned())
        .unwrap_or(RouteSource::Kernel);

    let mut record = RouteRecord::new(*query.prefix());
    if fvs.contains_key(fields::BLACKHOLE) {
        return Some(record);
    }

    let gateways = split_list(fvs.get(fields::NEXTHOP));
    let ifnames = split_list(fvs.get(fields::IFNAME));
    let members = gateways.len().max(ifnames.len());

    for idx in 0..members {
        let gateway = gateways.get(idx).copied().unwrap_or_default();
        let ifname = ifnames.get(idx).copied().unwrap_or_default();
        let id = if is_unspecified(gateway) { ifname } else { gateway };
        if id.is_empty() {
            continue;
        }
        record.insert_nexthop(id, NextHopAttrs::without_preference(route_type.clone()));
    }

    if let Some(route_type) = query.route_type {
        record.retain_route_type(route_type);
    }
    Some(record)
}
