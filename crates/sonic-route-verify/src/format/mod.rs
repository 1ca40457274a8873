//! Route dump formats.
//!
//! Each [`OutputFormat`] knows which channel and command produce its dump
//! and how to turn that dump into a [`RouteRecord`] for one queried route.

pub mod appl_db;
pub mod config;
pub mod kernel;
pub mod protocol;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use sonic_route_exec::{commands, ExecChannel};

use crate::record::{RoutePrefix, RouteRecord, RouteSource};
use crate::scanner::scan_lines;

use self::protocol::DisplayKind;

/// What a single extraction looks for.
#[derive(Debug, Clone, Copy)]
pub struct RouteQuery<'a> {
    expected: &'a RouteRecord,
    /// Route-type filter; for kernel dumps, the type to label next-hops with.
    pub route_type: Option<&'a RouteSource>,
    /// VRF to query; `None` is the default VRF.
    pub vrf: Option<&'a str>,
}

impl<'a> RouteQuery<'a> {
    /// Query for the route of `expected`, default VRF, no type filter.
    pub fn new(expected: &'a RouteRecord) -> Self {
        Self {
            expected,
            route_type: None,
            vrf: None,
        }
    }

    pub fn with_route_type(mut self, route_type: Option<&'a RouteSource>) -> Self {
        self.route_type = route_type;
        self
    }

    pub fn with_vrf(mut self, vrf: Option<&'a str>) -> Self {
        self.vrf = vrf;
        self
    }

    /// The expected record; the running-config matcher builds lines from it.
    pub fn expected(&self) -> &'a RouteRecord {
        self.expected
    }

    /// Target prefix.
    pub fn prefix(&self) -> &'a RoutePrefix {
        self.expected.prefix()
    }
}

/// Dump format, one per extraction strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OutputFormat {
    /// Routing daemon RIB display.
    Rib,
    /// Routing daemon FIB display.
    Fib,
    /// Kernel route dump.
    Kernel,
    /// Routing daemon running configuration.
    RunningConfig,
    /// APPL_DB route table entry.
    ApplDb,
}

impl OutputFormat {
    /// All formats.
    pub const ALL: [OutputFormat; 5] = [
        OutputFormat::Rib,
        OutputFormat::Fib,
        OutputFormat::Kernel,
        OutputFormat::RunningConfig,
        OutputFormat::ApplDb,
    ];

    /// Channel that produces this format.
    pub fn channel(&self) -> ExecChannel {
        match self {
            OutputFormat::Rib | OutputFormat::Fib | OutputFormat::RunningConfig => {
                ExecChannel::ManagementCli
            }
            OutputFormat::Kernel => ExecChannel::Shell,
            OutputFormat::ApplDb => ExecChannel::DbClient,
        }
    }

    /// Command that produces the dump for `query`.
    pub fn command(&self, query: &RouteQuery<'_>) -> String {
        let family = query.prefix().family();
        match self {
            OutputFormat::Rib => commands::build_show_rib_cmd(family, query.vrf),
            OutputFormat::Fib => commands::build_show_fib_cmd(family, query.vrf),
            OutputFormat::Kernel => commands::build_kernel_route_cmd(family, query.vrf),
            OutputFormat::RunningConfig => commands::build_show_running_config_cmd(),
            OutputFormat::ApplDb => commands::build_appl_db_route_cmd(query.prefix(), query.vrf),
        }
    }

    /// Extracts the queried route from a captured dump.
    ///
    /// `None` means the route was not found. Unparseable text is
    /// indistinguishable from an absent route.
    pub fn extract(&self, text: &str, query: &RouteQuery<'_>) -> Option<RouteRecord> {
        let lines = scan_lines(text);
        match self {
            OutputFormat::Rib => protocol::extract(DisplayKind::Rib, &lines, query),
            OutputFormat::Fib => protocol::extract(DisplayKind::Fib, &lines, query),
            OutputFormat::Kernel => kernel::extract(&lines, query),
            OutputFormat::RunningConfig => config::extract(&lines, query),
            OutputFormat::ApplDb => appl_db::extract(&lines, query),
        }
    }

    /// Format name.
    pub fn as_str(&self) -> &'static str {
        match self {
            OutputFormat::Rib => "rib",
            OutputFormat::Fib => "fib",
            OutputFormat::Kernel => "kernel",
            OutputFormat::RunningConfig => "running-config",
            OutputFormat::ApplDb => "appl-db",
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        OutputFormat::ALL
            .into_iter()
            .find(|format| format.as_str() == s)
            .ok_or_else(|| format!("unknown output format: {}", s))
    }
}
