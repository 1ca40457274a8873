//! Test fixtures for common route verification scenarios
//!
//! Expected states for typical routes, in both record and mapping form.

use serde_json::{json, Value};
use sonic_route_verify::{NextHopAttrs, RouteRecord};

/// Device name used by single-device scenarios.
pub const DUT: &str = "dut1";

/// Builds a record, panicking on a malformed fixture prefix.
pub fn route(prefix: &str) -> RouteRecord {
    RouteRecord::for_prefix(prefix)
        .unwrap_or_else(|e| panic!("bad fixture prefix {}: {}", prefix, e))
}

/// Static route fixtures
pub mod static_fixtures {
    use super::*;

    /// Static next-hop with distance 1, metric 0
    pub fn static_hop() -> NextHopAttrs {
        NextHopAttrs::new("1", "0", "static")
    }

    /// `123.0.0.1/32` over four static next-hops, mapping form
    pub fn ecmp_host_route_mapping() -> Value {
        json!({
            "Route": "123.0.0.1/32",
            "NumberNexthops": "4",
            "1.1.1.2": {"Distance": "1", "Metric": "0", "RouteType": "static"},
            "2": {"Distance": "1", "Metric": "0", "RouteType": "static"},
            "3": {"Distance": "1", "Metric": "0", "RouteType": "static"},
            "5.5.5.1": {"Distance": "1", "Metric": "0", "RouteType": "static"},
        })
    }

    /// `123.0.0.1/32` over four static next-hops
    pub fn ecmp_host_route() -> RouteRecord {
        route("123.0.0.1/32")
            .with_nexthop("1.1.1.2", static_hop())
            .with_nexthop("2", static_hop())
            .with_nexthop("3", static_hop())
            .with_nexthop("5.5.5.1", static_hop())
    }

    /// Single-hop static route
    pub fn single_hop(prefix: &str, nexthop: &str) -> RouteRecord {
        route(prefix).with_nexthop(nexthop, static_hop())
    }
}

/// Kernel route fixtures
pub mod kernel_fixtures {
    use super::*;

    /// Kernel view of a route: no distance or metric
    pub fn kernel_route(prefix: &str, nexthops: &[&str], route_type: &str) -> RouteRecord {
        nexthops.iter().fold(route(prefix), |record, hop| {
            record.with_nexthop(*hop, NextHopAttrs::without_preference(route_type))
        })
    }

    /// Connected subnet on one interface
    pub fn connected(prefix: &str, ifname: &str) -> RouteRecord {
        kernel_route(prefix, &[ifname], "kernel")
    }
}

/// BGP route fixtures
pub mod bgp_fixtures {
    use super::*;

    /// eBGP-learned route with distance 20
    pub fn ebgp_route(prefix: &str, nexthops: &[&str]) -> RouteRecord {
        nexthops.iter().fold(route(prefix), |record, hop| {
            record.with_nexthop(*hop, NextHopAttrs::new("20", "0", "bgp"))
        })
    }
}

/// Routes whose text collides with `123.0.0.1/32` in a naive substring
/// search, plus the target itself.
pub fn neighbouring_routes() -> Vec<RouteRecord> {
    vec![
        static_fixtures::single_hop("123.0.0.10/32", "9.9.9.9"),
        static_fixtures::single_hop("123.0.0.0/24", "8.8.8.8"),
        static_fixtures::ecmp_host_route(),
        bgp_fixtures::ebgp_route("10.123.0.1/32", &["7.7.7.7"]),
    ]
}
