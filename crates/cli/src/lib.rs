//! `cyclecount` command-line front end: configuration, commands and the
//! interactive count session.

pub mod cli;
pub mod commands;
pub mod config;
pub mod context;
pub mod output;
pub mod session;

pub use cli::{Cli, Commands};
pub use config::CycleCountConfig;
pub use context::{AppContext, DailyBatch};
pub use output::OutputFormat;
