//! Error types for route verification.

use sonic_route_exec::CommandError;
use thiserror::Error;

/// Result type alias for verification operations.
pub type VerifyResult<T> = Result<T, VerifyError>;

/// Errors surfaced by the verification engine.
///
/// A dump that cannot be parsed is deliberately not an error: it yields an
/// empty observation and is reported as a mismatch.
#[derive(Debug, Error)]
pub enum VerifyError {
    /// Execution channel failure, never retried.
    #[error(transparent)]
    Command(#[from] CommandError),

    /// The caller's expected state is malformed.
    #[error("Invalid expected route state: {message}")]
    InvalidExpectation {
        /// What is wrong with it.
        message: String,
    },

    /// The poll budget ran out before the route reached the desired state.
    #[error(
        "Route {prefix} on {device} did not become {desired} after {attempts} attempts: {diff}"
    )]
    Timeout {
        /// Device that was polled.
        device: String,
        /// Route prefix (canonical form).
        prefix: String,
        /// Desired presence ("present" or "absent").
        desired: String,
        /// Number of ticks performed.
        attempts: u32,
        /// Last observed differences.
        diff: String,
    },

    /// Configuration file or flag error.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl VerifyError {
    /// Creates an invalid expectation error.
    pub fn invalid_expectation(message: impl Into<String>) -> Self {
        Self::InvalidExpectation {
            message: message.into(),
        }
    }

    /// Returns true if the error came from the execution channel.
    pub fn is_command_error(&self) -> bool {
        matches!(self, VerifyError::Command(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_expectation_display() {
        let err = VerifyError::invalid_expectation("missing Route");
        assert_eq!(
            err.to_string(),
            "Invalid expected route state: missing Route"
        );
        assert!(!err.is_command_error());
    }

    #[test]
    fn test_command_error_is_transparent() {
        let err: VerifyError = CommandError::failed("dut1", "show ip route", 1, "boom").into();
        assert!(err.is_command_error());
        assert!(err.to_string().starts_with("Command failed on dut1"));
    }

    #[test]
    fn test_timeout_display() {
        let err = VerifyError::Timeout {
            device: "dut1".to_string(),
            prefix: "123.0.0.1".to_string(),
            desired: "present".to_string(),
            attempts: 15,
            diff: "NumberNexthops: expected 4, observed 3".to_string(),
        };
        assert!(err.to_string().contains("after 15 attempts"));
    }
}
