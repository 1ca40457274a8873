//! Shell command execution utilities.
//!
//! Every command reaches the device through `/bin/sh -c`, either locally or
//! wrapped in `ssh`. Arguments that come from callers (prefixes, VRF names,
//! interface names) must go through [`shellquote`].
//!
//! # Example
//!
//! ```ignore
//! use sonic_route_exec::shell::{self, IP_CMD, shellquote};
//!
//! let cmd = format!("{} route show vrf {}", IP_CMD, shellquote("Vrf1"));
//! let result = shell::exec(&cmd, None).await?;
//! ```

use once_cell::sync::Lazy;
use regex::Regex;
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;

use crate::error::{CommandError, CommandResult};

/// Path to the `ip` command for kernel route dumps.
pub const IP_CMD: &str = "/sbin/ip";

/// Path to the FRR management shell.
pub const VTYSH_CMD: &str = "/usr/bin/vtysh";

/// Path to the Redis client used for database queries.
pub const REDIS_CLI_CMD: &str = "/usr/bin/redis-cli";

/// Path to the `ssh` client used for remote devices.
pub const SSH_CMD: &str = "/usr/bin/ssh";

/// Regex for characters that need escaping in shell double-quotes.
/// Matches: $, `, ", \, and newline
static SHELL_ESCAPE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"([$`"\\\n])"#).expect("Invalid regex pattern"));

/// Quotes a string for safe use in shell commands.
///
/// Wraps the string in double quotes and escapes `$`, `` ` ``, `"`, `\`
/// and newline.
///
/// # Example
///
/// ```
/// use sonic_route_exec::shell::shellquote;
///
/// assert_eq!(shellquote("simple"), "\"simple\"");
/// assert_eq!(shellquote("with$var"), "\"with\\$var\"");
/// ```
pub fn shellquote(s: &str) -> String {
    let escaped = SHELL_ESCAPE_RE.replace_all(s, r"\$1");
    format!("\"{}\"", escaped)
}

/// Result of a shell command execution.
#[derive(Debug, Clone)]
pub struct ExecResult {
    /// The exit code of the command (0 = success).
    pub exit_code: i32,
    /// The captured stdout output.
    pub stdout: String,
    /// The captured stderr output.
    pub stderr: String,
}

impl ExecResult {
    /// Returns true if the command succeeded (exit code 0).
    pub fn success(&self) -> bool {
        self.exit_code == 0
    }

    /// Returns the combined output (stdout + stderr) for error messages.
    pub fn combined_output(&self) -> String {
        if self.stderr.is_empty() {
            self.stdout.clone()
        } else if self.stdout.is_empty() {
            self.stderr.clone()
        } else {
            format!("{}\n{}", self.stdout, self.stderr)
        }
    }
}

/// Executes a shell command, optionally bounded by `timeout`.
///
/// Stdout is kept verbatim apart from trailing whitespace: leading
/// indentation is significant to the route dump parsers.
///
/// # Errors
///
/// Returns [`CommandError::Spawn`] if the shell could not be started and
/// [`CommandError::Timeout`] if the limit elapsed. A non-zero exit is not an
/// error here; see [`exec_or_throw`].
pub async fn exec(cmd: &str, timeout: Option<Duration>) -> CommandResult<ExecResult> {
    tracing::debug!(command = %cmd, "Executing shell command");

    let child = Command::new("/bin/sh")
        .arg("-c")
        .arg(cmd)
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .output();

    let output = match timeout {
        Some(limit) => tokio::time::timeout(limit, child).await.map_err(|_| {
            CommandError::Timeout {
                device: "localhost".to_string(),
                command: cmd.to_string(),
                timeout: limit,
            }
        })?,
        None => child.await,
    }
    .map_err(|e| CommandError::Spawn {
        command: cmd.to_string(),
        source: e,
    })?;

    let exit_code = output.status.code().unwrap_or(-1);
    let stdout = String::from_utf8_lossy(&output.stdout)
        .trim_end()
        .to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();

    let result = ExecResult {
        exit_code,
        stdout,
        stderr,
    };

    if result.success() {
        tracing::trace!(command = %cmd, exit_code = exit_code, "Command succeeded");
    } else {
        tracing::warn!(
            command = %cmd,
            exit_code = exit_code,
            stderr = %result.stderr,
            "Command failed"
        );
    }

    Ok(result)
}

/// Executes a shell command and fails on non-zero exit.
///
/// `device` only labels the error.
pub async fn exec_or_throw(
    device: &str,
    cmd: &str,
    timeout: Option<Duration>,
) -> CommandResult<String> {
    let result = exec(cmd, timeout).await.map_err(|e| match e {
        CommandError::Timeout {
            command, timeout, ..
        } => CommandError::Timeout {
            device: device.to_string(),
            command,
            timeout,
        },
        other => other,
    })?;

    if result.success() {
        Ok(result.stdout)
    } else {
        Err(CommandError::failed(
            device,
            cmd,
            result.exit_code,
            result.combined_output(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shellquote_simple() {
        assert_eq!(shellquote("simple"), "\"simple\"");
        assert_eq!(shellquote("123.0.0.1/32"), "\"123.0.0.1/32\"");
    }

    #[test]
    fn test_shellquote_special_chars() {
        assert_eq!(shellquote("$HOME"), "\"\\$HOME\"");
        assert_eq!(shellquote("`whoami`"), "\"\\`whoami\\`\"");
        assert_eq!(shellquote("say \"hello\""), "\"say \\\"hello\\\"\"");
        assert_eq!(shellquote("path\\to"), "\"path\\\\to\"");
    }

    #[test]
    fn test_shellquote_nested() {
        // vtysh command quoted once more for ssh
        let inner = format!("{} -c {}", VTYSH_CMD, shellquote("show ip route"));
        assert_eq!(
            shellquote(&inner),
            "\"/usr/bin/vtysh -c \\\"show ip route\\\"\""
        );
    }

    #[test]
    fn test_exec_result_combined() {
        let result = ExecResult {
            exit_code: 1,
            stdout: "stdout".to_string(),
            stderr: "stderr".to_string(),
        };
        assert!(!result.success());
        assert_eq!(result.combined_output(), "stdout\nstderr");
    }

    #[tokio::test]
    async fn test_exec_preserves_indentation() {
        let result = exec("printf 'a\\n    via b\\n'", None).await.unwrap();
        assert!(result.success());
        assert_eq!(result.stdout, "a\n    via b");
    }

    #[tokio::test]
    async fn test_exec_or_throw_failure() {
        let result = exec_or_throw("dut1", "exit 3", None).await;
        match result {
            Err(CommandError::Failed {
                device, exit_code, ..
            }) => {
                assert_eq!(device, "dut1");
                assert_eq!(exit_code, 3);
            }
            other => panic!("Expected Failed error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_exec_timeout() {
        let result = exec_or_throw("dut1", "sleep 5", Some(Duration::from_millis(50))).await;
        assert!(matches!(result, Err(CommandError::Timeout { ref device, .. }) if device == "dut1"));
    }
}
