//! igfinder-cli — configuration, logging and run orchestration behind the
//! `igfinder` binary.

pub mod cli;
pub mod config;
pub mod logging;
pub mod pipeline;

pub use cli::Args;
pub use config::Config;
pub use pipeline::{Pipeline, RunOutcome};
