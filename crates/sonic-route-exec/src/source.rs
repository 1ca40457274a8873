//! Raw output sources.
//!
//! The verification engine only ever asks a device for the text output of
//! one command on one [`ExecChannel`]. [`OutputSource`] is that contract;
//! [`ShellOutputSource`] fulfils it with local or ssh shell execution.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::error::{CommandError, CommandResult};
use crate::shell::{self, shellquote, REDIS_CLI_CMD, SSH_CMD, VTYSH_CMD};

/// Device name that is always executed locally.
pub const LOCAL_DEVICE: &str = "localhost";

/// Execution path for a command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ExecChannel {
    /// Routing daemon management CLI (vtysh).
    ManagementCli,
    /// Plain shell on the device.
    Shell,
    /// Database client; the command is the client's argument list.
    DbClient,
}

impl ExecChannel {
    /// Returns the channel name used in logs and errors.
    pub fn as_str(&self) -> &'static str {
        match self {
            ExecChannel::ManagementCli => "management-cli",
            ExecChannel::Shell => "shell",
            ExecChannel::DbClient => "db-client",
        }
    }
}

impl fmt::Display for ExecChannel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ExecChannel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "management-cli" | "cli" | "vtysh" => Ok(ExecChannel::ManagementCli),
            "shell" => Ok(ExecChannel::Shell),
            "db-client" | "db" => Ok(ExecChannel::DbClient),
            other => Err(format!("unknown execution channel: {}", other)),
        }
    }
}

/// Executes a command against a device and returns its captured text.
///
/// Implementations own any per-device serialization. Errors are final:
/// callers do not retry a failed execution.
#[async_trait]
pub trait OutputSource: Send + Sync {
    /// Runs `command` on `device` through `channel`.
    async fn execute(
        &self,
        device: &str,
        command: &str,
        channel: ExecChannel,
    ) -> CommandResult<String>;
}

#[async_trait]
impl<T: OutputSource + ?Sized> OutputSource for &T {
    async fn execute(
        &self,
        device: &str,
        command: &str,
        channel: ExecChannel,
    ) -> CommandResult<String> {
        (**self).execute(device, command, channel).await
    }
}

/// Tool paths used to wrap commands per channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelTools {
    /// Management CLI binary.
    pub vtysh: String,
    /// Database client binary.
    pub db_cli: String,
}

impl Default for ChannelTools {
    fn default() -> Self {
        Self {
            vtysh: VTYSH_CMD.to_string(),
            db_cli: REDIS_CLI_CMD.to_string(),
        }
    }
}

/// Shell-backed [`OutputSource`].
///
/// Commands for [`LOCAL_DEVICE`] (or any device when ssh is disabled) run
/// through the local `/bin/sh`; other devices are reached with
/// `ssh -o BatchMode=yes`.
#[derive(Debug, Clone)]
pub struct ShellOutputSource {
    tools: ChannelTools,
    ssh_user: Option<String>,
    use_ssh: bool,
    timeout: Option<Duration>,
}

impl ShellOutputSource {
    /// Creates a source that runs everything locally.
    pub fn local() -> Self {
        Self {
            tools: ChannelTools::default(),
            ssh_user: None,
            use_ssh: false,
            timeout: None,
        }
    }

    /// Creates a source that reaches non-local devices over ssh.
    pub fn ssh(user: Option<String>) -> Self {
        Self {
            tools: ChannelTools::default(),
            ssh_user: user,
            use_ssh: true,
            timeout: None,
        }
    }

    /// Overrides the channel tool paths.
    pub fn with_tools(mut self, tools: ChannelTools) -> Self {
        self.tools = tools;
        self
    }

    /// Bounds every command by `timeout`.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Builds the full shell line that runs `command` on `device`.
    pub fn command_line(&self, device: &str, command: &str, channel: ExecChannel) -> String {
        let inner = match channel {
            ExecChannel::ManagementCli => format!("{} -c {}", self.tools.vtysh, shellquote(command)),
            ExecChannel::Shell => command.to_string(),
            ExecChannel::DbClient => format!("{} {}", self.tools.db_cli, command),
        };

        if !self.use_ssh || device == LOCAL_DEVICE {
            return inner;
        }

        let target = match &self.ssh_user {
            Some(user) => format!("{}@{}", user, device),
            None => device.to_string(),
        };
        format!(
            "{} -o BatchMode=yes {} {}",
            SSH_CMD,
            shellquote(&target),
            shellquote(&inner)
        )
    }
}

impl Default for ShellOutputSource {
    fn default() -> Self {
        Self::local()
    }
}

#[async_trait]
impl OutputSource for ShellOutputSource {
    #[instrument(skip(self))]
    async fn execute(
        &self,
        device: &str,
        command: &str,
        channel: ExecChannel,
    ) -> CommandResult<String> {
        let line = self.command_line(device, command, channel);
        shell::exec_or_throw(device, &line, self.timeout)
            .await
            .map_err(|e| match e {
                CommandError::Failed {
                    device,
                    exit_code,
                    output,
                    ..
                } => CommandError::Failed {
                    device,
                    command: command.to_string(),
                    exit_code,
                    output,
                },
                other => other,
            })
    }
}
