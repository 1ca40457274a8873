//! Route-state extraction and convergence verification for SONiC devices.
//!
//! The pipeline for one poll tick:
//!
//! 1. an [`OutputSource`](sonic_route_exec::OutputSource) runs the dump
//!    command of an [`OutputFormat`] on a device
//! 2. [`scanner`] splits the text into lines
//! 3. [`locator`] isolates the block of the target route
//! 4. the format parser builds a [`RouteRecord`]
//! 5. [`compare`] diffs it against the expected record
//!
//! [`poller`] repeats the tick until the route reaches the desired
//! [`Presence`] or the [`PollPolicy`] budget runs out.
//!
//! # Example
//!
//! ```no_run
//! use serde_json::json;
//! use sonic_route_exec::ShellOutputSource;
//! use sonic_route_verify::{
//!     verify_route, OutputFormat, Presence, RouteCheck, RouteRecord, VerificationContext,
//! };
//!
//! # async fn run() -> sonic_route_verify::VerifyResult<()> {
//! let expected = RouteRecord::from_mapping(&json!({
//!     "Route": "123.0.0.1/32",
//!     "NumberNexthops": "1",
//!     "1.1.1.2": {"Distance": "1", "Metric": "0", "RouteType": "static"},
//! }))?;
//! let check = RouteCheck::new(expected, OutputFormat::Rib);
//! let ctx = VerificationContext::default();
//!
//! verify_route(&ShellOutputSource::local(), "localhost", &check, Presence::Present, &ctx)
//!     .await?
//!     .ensure_converged()?;
//! # Ok(())
//! # }
//! ```

pub mod compare;
pub mod config;
pub mod context;
pub mod error;
pub mod format;
pub mod locator;
pub mod poller;
pub mod record;
pub mod scanner;

pub use compare::{compare, Comparison, Mismatch};
pub use config::RouteVerifyConfig;
pub use context::{verify_on_devices, verify_route, RouteCheck, VerificationContext};
pub use error::{VerifyError, VerifyResult};
pub use format::{OutputFormat, RouteQuery};
pub use poller::{poll_route, PollPolicy, Presence, Verification};
pub use record::{NextHopAttrs, RoutePrefix, RouteRecord, RouteSource};
