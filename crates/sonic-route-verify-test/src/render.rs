//! Synthetic route dumps
//!
//! Renders known records in the text shape each dump format prints, so
//! tests can drive the parsers with output whose expected extraction is
//! known up front. Absent distances and metrics render as `0` in the
//! RIB/FIB displays.

use sonic_route_verify::format::appl_db::fields;
use sonic_route_verify::format::config::build_static_route_line;
use sonic_route_verify::{NextHopAttrs, RouteRecord};
use sonic_types::{AddressFamily, IpAddress};

/// Interface reported for gateway next-hops.
pub const DEFAULT_EGRESS: &str = "Ethernet0";

const RIB_BANNER: &str = "Codes: K - kernel route, C - connected, S - static, B - BGP, O - OSPF,
       > - selected route, * - FIB route, q - queued, r - rejected, b - backup";

fn is_gateway(id: &str) -> bool {
    id.parse::<IpAddress>().is_ok()
}

fn preference(attrs: &NextHopAttrs) -> (&str, &str) {
    (
        attrs.distance.as_deref().unwrap_or("0"),
        attrs.metric.as_deref().unwrap_or("0"),
    )
}

fn push_display_nexthops(out: &mut Vec<String>, record: &RouteRecord) {
    for (idx, (id, attrs)) in record.nexthops().iter().enumerate() {
        let (distance, metric) = preference(attrs);
        // Alternate the two line shapes the daemon prints.
        if idx % 2 == 0 {
            out.push(format!(
                "  * via {}, [{}/{}], {}",
                id, distance, metric, attrs.route_type
            ));
        } else {
            out.push(format!(
                "    via {}, [{}/{}], 00:01:10, {}",
                id, distance, metric, attrs.route_type
            ));
        }
    }
}

/// RIB display (`show ip route`) for `records`.
pub fn render_rib(records: &[RouteRecord]) -> String {
    let mut out = vec![RIB_BANNER.to_string(), String::new()];
    for record in records {
        out.push(format!(
            "{}, {} unicast next-hops",
            record.prefix().cidr(),
            record.number_nexthops()
        ));
        push_display_nexthops(&mut out, record);
    }
    out.join("\n")
}

/// FIB display (`show ip fib`) for `records`.
pub fn render_fib(records: &[RouteRecord]) -> String {
    let mut out = Vec::new();
    for record in records {
        out.push(record.prefix().cidr());
        push_display_nexthops(&mut out, record);
    }
    out.join("\n")
}

fn kernel_hop(id: &str) -> String {
    if is_gateway(id) {
        format!("via {} dev {}", id, DEFAULT_EGRESS)
    } else {
        format!("dev {}", id)
    }
}

/// Kernel dump (`ip route show`) for `records`.
///
/// Host routes lose their mask the way the kernel prints them; multi-hop
/// routes use `nexthop` continuation lines.
pub fn render_kernel(records: &[RouteRecord]) -> String {
    let mut out = Vec::new();
    for record in records {
        // Display drops the mask of host routes.
        let dst = record.prefix().to_string();
        let hops: Vec<&String> = record.nexthops().keys().collect();
        match hops.as_slice() {
            [] => out.push(format!("blackhole {} proto static metric 20", dst)),
            [only] => out.push(format!("{} {} proto static metric 20", dst, kernel_hop(only))),
            many => {
                out.push(format!("{} proto static metric 20", dst));
                for id in many {
                    out.push(format!("\tnexthop {} weight 1", kernel_hop(id)));
                }
            }
        }
    }
    out.join("\n")
}

/// Running configuration with one static route line per next-hop.
///
/// Routes go into the `vrf` stanza when one is given.
pub fn render_running_config(records: &[RouteRecord], vrf: Option<&str>) -> String {
    let mut out = vec![
        "Building configuration...".to_string(),
        String::new(),
        "Current configuration:".to_string(),
        "!".to_string(),
        "frr version 8.5".to_string(),
        "hostname sonic".to_string(),
        "!".to_string(),
    ];
    let indent = if let Some(vrf) = vrf {
        out.push(format!("vrf {}", vrf));
        " "
    } else {
        ""
    };
    for record in records {
        for (id, attrs) in record.nexthops() {
            out.push(format!(
                "{}{}",
                indent,
                build_static_route_line(record.prefix(), id, attrs.distance.as_deref())
            ));
        }
    }
    if vrf.is_some() {
        out.push("exit-vrf".to_string());
    }
    out.push("!".to_string());
    out.push("end".to_string());
    out.join("\n")
}

/// `HGETALL` reply of the APPL_DB route entry of `record`.
///
/// `None` renders the empty reply of a missing key.
pub fn render_appl_db(record: Option<&RouteRecord>) -> String {
    let Some(record) = record else {
        return String::new();
    };
    let unspecified = match record.prefix().family() {
        AddressFamily::V4 => "0.0.0.0",
        AddressFamily::V6 => "::",
    };

    let mut gateways = Vec::new();
    let mut ifnames = Vec::new();
    for id in record.nexthops().keys() {
        if is_gateway(id) {
            gateways.push(id.as_str());
            ifnames.push(DEFAULT_EGRESS);
        } else {
            gateways.push(unspecified);
            ifnames.push(id.as_str());
        }
    }
    let protocol = record
        .nexthops()
        .values()
        .next()
        .map(|attrs| attrs.route_type.to_string())
        .unwrap_or_else(|| "static".to_string());

    let mut out = Vec::new();
    if gateways.is_empty() {
        out.push(fields::BLACKHOLE.to_string());
        out.push("true".to_string());
    } else {
        out.push(fields::NEXTHOP.to_string());
        out.push(gateways.join(","));
        out.push(fields::IFNAME.to_string());
        out.push(ifnames.join(","));
    }
    out.push(fields::PROTOCOL.to_string());
    out.push(protocol);
    out.join("\n")
}

/// Drops every line that mentions `needle`.
pub fn without_lines(text: &str, needle: &str) -> String {
    text.lines()
        .filter(|line| !line.contains(needle))
        .collect::<Vec<_>>()
        .join("\n")
}
