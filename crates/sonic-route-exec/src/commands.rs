//! Command builders for route dumps.
//!
//! Management CLI commands are returned unquoted; [`crate::ShellOutputSource`]
//! quotes them as a whole. Shell and db-client commands quote their
//! caller-supplied parts here.

use sonic_types::{AddressFamily, IpPrefix};

use crate::shell::{shellquote, IP_CMD};

/// APPL_DB database index.
pub const APPL_DB_INDEX: u32 = 0;

/// APPL_DB route table name.
pub const APP_ROUTE_TABLE_NAME: &str = "ROUTE_TABLE";

fn cli_afi(family: AddressFamily) -> &'static str {
    match family {
        AddressFamily::V4 => "ip",
        AddressFamily::V6 => "ipv6",
    }
}

fn vrf_clause(vrf: Option<&str>) -> String {
    match vrf {
        Some(name) => format!(" vrf {}", name),
        None => String::new(),
    }
}

/// Build the protocol RIB dump command
pub fn build_show_rib_cmd(family: AddressFamily, vrf: Option<&str>) -> String {
    format!("show {} route{}", cli_afi(family), vrf_clause(vrf))
}

/// Build the FIB dump command
pub fn build_show_fib_cmd(family: AddressFamily, vrf: Option<&str>) -> String {
    format!("show {} fib{}", cli_afi(family), vrf_clause(vrf))
}

/// Build the running configuration dump command
pub fn build_show_running_config_cmd() -> String {
    "show running-config".to_string()
}

/// Build the kernel route dump command
pub fn build_kernel_route_cmd(family: AddressFamily, vrf: Option<&str>) -> String {
    let afi = match family {
        AddressFamily::V4 => "-4",
        AddressFamily::V6 => "-6",
    };
    match vrf {
        Some(name) => format!("{} {} route show vrf {}", IP_CMD, afi, shellquote(name)),
        None => format!("{} {} route show", IP_CMD, afi),
    }
}

/// Build the APPL_DB route entry query (db-client arguments)
///
/// Keys use the `addr/len` form; VRF routes are keyed `ROUTE_TABLE:<vrf>:<prefix>`.
pub fn build_appl_db_route_cmd(prefix: &IpPrefix, vrf: Option<&str>) -> String {
    let key = match vrf {
        Some(name) => format!("{}:{}:{}", APP_ROUTE_TABLE_NAME, name, prefix.cidr()),
        None => format!("{}:{}", APP_ROUTE_TABLE_NAME, prefix.cidr()),
    };
    format!("-n {} HGETALL {}", APPL_DB_INDEX, shellquote(&key))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_show_rib_cmd() {
        assert_eq!(build_show_rib_cmd(AddressFamily::V4, None), "show ip route");
        assert_eq!(
            build_show_rib_cmd(AddressFamily::V6, Some("Vrf1")),
            "show ipv6 route vrf Vrf1"
        );
    }

    #[test]
    fn test_build_show_fib_cmd() {
        assert_eq!(build_show_fib_cmd(AddressFamily::V4, None), "show ip fib");
    }

    #[test]
    fn test_build_kernel_route_cmd() {
        assert_eq!(
            build_kernel_route_cmd(AddressFamily::V4, None),
            "/sbin/ip -4 route show"
        );
        let cmd = build_kernel_route_cmd(AddressFamily::V6, Some("Vrf'; rm -rf /"));
        assert!(cmd.starts_with("/sbin/ip -6 route show vrf"));
        assert!(cmd.contains("\"Vrf'; rm -rf /\""));
    }

    #[test]
    fn test_build_appl_db_route_cmd() {
        let host: IpPrefix = "123.0.0.1".parse().unwrap();
        assert_eq!(
            build_appl_db_route_cmd(&host, None),
            "-n 0 HGETALL \"ROUTE_TABLE:123.0.0.1/32\""
        );

        let net: IpPrefix = "10.0.0.0/24".parse().unwrap();
        assert_eq!(
            build_appl_db_route_cmd(&net, Some("Vrf1")),
            "-n 0 HGETALL \"ROUTE_TABLE:Vrf1:10.0.0.0/24\""
        );
    }
}
