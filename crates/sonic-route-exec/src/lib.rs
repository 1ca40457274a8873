//! Command execution for SONiC route verification.
//!
//! - [`OutputSource`]: the one call the verification engine makes against a
//!   device (`execute(device, command, channel) -> text`)
//! - [`ShellOutputSource`]: local or ssh shell implementation
//! - [`shell`]: quoting and process execution
//! - [`commands`]: builders for the route dump commands
//! - [`error`]: [`CommandError`], propagated to callers unretried

pub mod commands;
pub mod error;
pub mod shell;
pub mod source;

pub use error::{CommandError, CommandResult};
pub use source::{ChannelTools, ExecChannel, OutputSource, ShellOutputSource, LOCAL_DEVICE};
