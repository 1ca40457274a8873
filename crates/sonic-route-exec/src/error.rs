//! Error types for command execution.
//!
//! A [`CommandError`] means the execution channel itself failed. The
//! verification engine never retries these; they propagate to the caller.

use std::io;
use std::time::Duration;
use thiserror::Error;

/// Result type alias for command execution.
pub type CommandResult<T> = Result<T, CommandError>;

/// Errors that can occur while running a command against a device.
#[derive(Debug, Error)]
pub enum CommandError {
    /// Failed to spawn the command.
    #[error("Failed to execute command '{command}': {source}")]
    Spawn {
        /// The command that failed to execute.
        command: String,
        /// The underlying IO error.
        #[source]
        source: io::Error,
    },

    /// Command returned a non-zero exit code.
    #[error("Command failed on {device}: '{command}' (exit code {exit_code}): {output}")]
    Failed {
        /// Device the command ran against.
        device: String,
        /// The command that failed.
        command: String,
        /// The exit code.
        exit_code: i32,
        /// Combined stdout/stderr output.
        output: String,
    },

    /// Command did not finish within the configured limit.
    #[error("Command timed out on {device} after {timeout:?}: '{command}'")]
    Timeout {
        /// Device the command ran against.
        device: String,
        /// The command that timed out.
        command: String,
        /// The limit that was exceeded.
        timeout: Duration,
    },

    /// The source cannot serve the requested channel.
    #[error("Channel {channel} is not available on {device}")]
    ChannelUnavailable {
        /// Device name.
        device: String,
        /// Channel name.
        channel: String,
    },
}

impl CommandError {
    /// Creates a non-zero exit error.
    pub fn failed(
        device: impl Into<String>,
        command: impl Into<String>,
        exit_code: i32,
        output: impl Into<String>,
    ) -> Self {
        Self::Failed {
            device: device.into(),
            command: command.into(),
            exit_code,
            output: output.into(),
        }
    }

    /// Creates a channel unavailable error.
    pub fn channel_unavailable(device: impl Into<String>, channel: impl Into<String>) -> Self {
        Self::ChannelUnavailable {
            device: device.into(),
            channel: channel.into(),
        }
    }

    /// Returns the command text, if the error carries one.
    pub fn command(&self) -> Option<&str> {
        match self {
            CommandError::Spawn { command, .. }
            | CommandError::Failed { command, .. }
            | CommandError::Timeout { command, .. } => Some(command),
            CommandError::ChannelUnavailable { .. } => None,
        }
    }
}
