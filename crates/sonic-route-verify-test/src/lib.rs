//! Test infrastructure for SONiC route verification
//!
//! Provides:
//! - Synthetic RIB/FIB/kernel/running-config/APPL_DB dumps for known routes
//! - A scripted stub output source that records executed commands
//! - Expected-state fixtures
//! - Verification and command assertion helpers

pub mod fixtures;
pub mod render;
mod source;
mod verification;

pub use fixtures::*;
pub use render::*;
pub use source::{ExecutedCommand, Reply, ScriptedSource};
pub use verification::*;
