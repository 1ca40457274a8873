//! Configuration file support for route-verify
//!
//! Loads and validates poll and execution settings from TOML files.
//! Default location: /etc/sonic/route-verify.toml

use std::fs;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use sonic_route_exec::{ChannelTools, ShellOutputSource};
use tracing::info;

use crate::error::{VerifyError, VerifyResult};
use crate::poller::{PollPolicy, DEFAULT_MAX_ATTEMPTS, DEFAULT_POLL_INTERVAL};

/// Default configuration file path.
pub const DEFAULT_CONFIG_PATH: &str = "/etc/sonic/route-verify.toml";

/// Poll configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PollConfig {
    /// Interval between two ticks in milliseconds
    #[serde(default = "default_interval_ms")]
    pub interval_ms: u64,

    /// Number of ticks before giving up
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
}

/// Command execution configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecConfig {
    /// Reach non-local devices over ssh
    #[serde(default = "default_ssh")]
    pub ssh: bool,

    /// Remote user for ssh
    #[serde(default)]
    pub ssh_user: Option<String>,

    /// Per-command timeout in seconds
    #[serde(default = "default_command_timeout")]
    pub command_timeout_secs: u64,

    /// Management CLI binary
    #[serde(default = "default_vtysh_path")]
    pub vtysh_path: String,

    /// Database client binary
    #[serde(default = "default_db_cli_path")]
    pub db_cli_path: String,
}

/// Complete route-verify configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteVerifyConfig {
    /// Poll configuration
    #[serde(default)]
    pub poll: PollConfig,

    /// Execution configuration
    #[serde(default)]
    pub exec: ExecConfig,
}

// Default functions
fn default_interval_ms() -> u64 {
    DEFAULT_POLL_INTERVAL.as_millis() as u64
}

fn default_max_attempts() -> u32 {
    DEFAULT_MAX_ATTEMPTS
}

fn default_ssh() -> bool {
    true
}

fn default_command_timeout() -> u64 {
    30
}

fn default_vtysh_path() -> String {
    ChannelTools::default().vtysh
}

fn default_db_cli_path() -> String {
    ChannelTools::default().db_cli
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            interval_ms: default_interval_ms(),
            max_attempts: default_max_attempts(),
        }
    }
}

impl Default for ExecConfig {
    fn default() -> Self {
        Self {
            ssh: default_ssh(),
            ssh_user: None,
            command_timeout_secs: default_command_timeout(),
            vtysh_path: default_vtysh_path(),
            db_cli_path: default_db_cli_path(),
        }
    }
}

impl RouteVerifyConfig {
    /// Load configuration from file, falling back to defaults if file not found
    pub fn load_or_default(path: impl AsRef<Path>) -> VerifyResult<Self> {
        let path = path.as_ref();

        match fs::read_to_string(path) {
            Ok(content) => toml::from_str(&content).map_err(|e| {
                VerifyError::Configuration(format!(
                    "Failed to parse config file {}: {}",
                    path.display(),
                    e
                ))
            }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                info!(path = %path.display(), "Config file not found, using defaults");
                Ok(Self::default())
            }
            Err(e) => Err(VerifyError::Io(e)),
        }
    }

    /// Load from default location or defaults
    pub fn load() -> VerifyResult<Self> {
        Self::load_or_default(DEFAULT_CONFIG_PATH)
    }

    /// Get poll interval as Duration
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll.interval_ms)
    }

    /// Get command timeout as Duration
    pub fn command_timeout(&self) -> Duration {
        Duration::from_secs(self.exec.command_timeout_secs)
    }

    /// Retry policy described by the `[poll]` section
    pub fn poll_policy(&self) -> PollPolicy {
        PollPolicy::new(self.poll_interval(), self.poll.max_attempts)
    }

    /// Output source described by the `[exec]` section
    pub fn output_source(&self) -> ShellOutputSource {
        let source = if self.exec.ssh {
            ShellOutputSource::ssh(self.exec.ssh_user.clone())
        } else {
            ShellOutputSource::local()
        };
        source
            .with_tools(ChannelTools {
                vtysh: self.exec.vtysh_path.clone(),
                db_cli: self.exec.db_cli_path.clone(),
            })
            .with_timeout(self.command_timeout())
    }

    /// Validate configuration
    pub fn validate(&self) -> VerifyResult<()> {
        if self.poll.max_attempts == 0 {
            return Err(VerifyError::Configuration(
                "max_attempts must be > 0".to_string(),
            ));
        }

        if self.exec.command_timeout_secs == 0 {
            return Err(VerifyError::Configuration(
                "command_timeout_secs must be > 0".to_string(),
            ));
        }

        if self.exec.vtysh_path.is_empty() || self.exec.db_cli_path.is_empty() {
            return Err(VerifyError::Configuration(
                "tool paths must not be empty".to_string(),
            ));
        }

        Ok(())
    }
}
