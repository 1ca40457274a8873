//! Verification helpers for testing the route verification engine
//!
//! Assertion helpers over verification results and executed commands.

use sonic_route_verify::{RouteRecord, Verification};
use thiserror::Error;

/// Verification error types
#[derive(Error, Debug)]
pub enum VerificationError {
    #[error("Route {prefix} on {device} did not converge after {attempts} attempts: {diff}")]
    NotConverged {
        device: String,
        prefix: String,
        attempts: u32,
        diff: String,
    },

    #[error("Expected convergence on attempt {expected}, got {actual}")]
    AttemptMismatch { expected: u32, actual: u32 },

    #[error("Observed route differs: expected {expected}, got {actual}")]
    ObservedMismatch { expected: String, actual: String },

    #[error("Expected command '{expected}' in {executed:?}")]
    CommandNotExecuted {
        expected: String,
        executed: Vec<String>,
    },

    #[error("Command '{command}' was executed but should not have been")]
    UnexpectedCommand { command: String },

    #[error("Expected {expected} commands, found {actual}")]
    CommandCountMismatch { expected: usize, actual: usize },
}

/// Result type for verification operations
pub type CheckResult<T> = Result<T, VerificationError>;

/// Assertions over one [`Verification`]
pub struct VerificationChecker<'a> {
    verification: &'a Verification,
}

impl<'a> VerificationChecker<'a> {
    /// Create a new checker
    pub fn new(verification: &'a Verification) -> Self {
        Self { verification }
    }

    /// Verify that the desired state was reached
    pub fn assert_converged(&self) -> CheckResult<&Self> {
        let v = self.verification;
        if !v.converged {
            return Err(VerificationError::NotConverged {
                device: v.device.clone(),
                prefix: v.prefix.to_string(),
                attempts: v.attempts,
                diff: v.comparison.to_string(),
            });
        }
        Ok(self)
    }

    /// Verify that the poll ended on exactly this tick
    pub fn assert_attempts(&self, expected: u32) -> CheckResult<&Self> {
        if self.verification.attempts != expected {
            return Err(VerificationError::AttemptMismatch {
                expected,
                actual: self.verification.attempts,
            });
        }
        Ok(self)
    }

    /// Verify the last observation
    pub fn assert_observed(&self, expected: Option<&RouteRecord>) -> CheckResult<&Self> {
        if self.verification.observed.as_ref() != expected {
            return Err(VerificationError::ObservedMismatch {
                expected: format!("{:?}", expected.map(RouteRecord::to_mapping)),
                actual: self.verification.observed_mapping().to_string(),
            });
        }
        Ok(self)
    }
}

/// Command execution verifier
pub struct CommandVerifier {
    captured_commands: Vec<String>,
}

impl CommandVerifier {
    /// Create a new command verifier
    pub fn new(captured_commands: Vec<String>) -> Self {
        Self { captured_commands }
    }

    /// Verify that a specific command was executed
    pub fn assert_command_executed(&self, expected: &str) -> CheckResult<()> {
        if self.captured_commands.iter().any(|cmd| cmd == expected) {
            Ok(())
        } else {
            Err(VerificationError::CommandNotExecuted {
                expected: expected.to_string(),
                executed: self.captured_commands.clone(),
            })
        }
    }

    /// Verify that a command was NOT executed
    pub fn assert_command_not_executed(&self, command: &str) -> CheckResult<()> {
        if self.captured_commands.iter().any(|cmd| cmd == command) {
            Err(VerificationError::UnexpectedCommand {
                command: command.to_string(),
            })
        } else {
            Ok(())
        }
    }

    /// Verify the number of executed commands
    pub fn assert_command_count(&self, expected: usize) -> CheckResult<()> {
        let actual = self.captured_commands.len();
        if actual != expected {
            return Err(VerificationError::CommandCountMismatch { expected, actual });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_verifier() {
        let verifier = CommandVerifier::new(vec![
            "show ip route".to_string(),
            "show ip route".to_string(),
        ]);
        assert!(verifier.assert_command_executed("show ip route").is_ok());
        assert!(verifier.assert_command_executed("show ip").is_err());
        assert!(verifier.assert_command_not_executed("show ip fib").is_ok());
        assert!(verifier.assert_command_count(2).is_ok());
        assert!(verifier.assert_command_count(3).is_err());
    }
}
