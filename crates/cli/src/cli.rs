//! Command-line surface.

use std::io::Write;
use std::path::PathBuf;

use anyhow::Context;
use chrono::{Local, NaiveDate};
use clap::{Parser, Subcommand};

use crate::commands;
use crate::config::CycleCountConfig;
use crate::context::AppContext;
use crate::output::OutputFormat;
use crate::session::run_session;

/// Daily inventory cycle counting.
#[derive(Parser, Debug)]
#[command(name = "cyclecount", about = "Daily inventory cycle counting", version)]
pub struct Cli {
    /// Path to config file (default: ./cyclecount.toml if present).
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Inventory workbook (overrides config and environment).
    #[arg(long, global = true)]
    pub inventory: Option<PathBuf>,

    /// Directory for exported workbooks and the chart.
    #[arg(long = "output-dir", global = true)]
    pub output_dir: Option<PathBuf>,

    /// Output format.
    #[arg(long = "output", short = 'o', global = true, value_enum, default_value_t = OutputFormat::Table)]
    pub output: OutputFormat,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show today's batch and write the daily count list.
    Plan {
        /// Count date (default: today).
        #[arg(long)]
        date: Option<NaiveDate>,
    },

    /// Build the variance report from a counts workbook (SKU, CountedQty).
    Report {
        /// Counts workbook.
        #[arg(long)]
        counts: PathBuf,
        /// Count date (default: today).
        #[arg(long)]
        date: Option<NaiveDate>,
    },

    /// Interactive counting session on stdin/stdout.
    Session {
        /// Count date (default: today).
        #[arg(long)]
        date: Option<NaiveDate>,
    },
}

impl Cli {
    /// Resolve configuration: file, then environment, then flags.
    pub fn resolve_config(&self) -> anyhow::Result<CycleCountConfig> {
        let mut config = CycleCountConfig::load(self.config.as_deref())?;
        if let Some(path) = &self.inventory {
            config.inventory_path = path.clone();
        }
        if let Some(dir) = &self.output_dir {
            config.output_dir = dir.clone();
        }
        config.validate().context("invalid configuration")?;
        Ok(config)
    }
}

/// Execute a parsed command line against stdin/stdout.
pub fn run(cli: Cli, config: CycleCountConfig) -> anyhow::Result<()> {
    let mut ctx = AppContext::new(config, cli.output)?;
    let today = Local::now().date_naive();
    let stdout = std::io::stdout();
    let mut out = stdout.lock();

    match cli.command {
        Commands::Plan { date } => {
            commands::plan(&mut ctx, date.unwrap_or(today), &mut out)?;
        }
        Commands::Report { counts, date } => {
            commands::report(&mut ctx, date.unwrap_or(today), &counts, &mut out)?;
        }
        Commands::Session { date } => {
            let mut scanner = ctx.scanner();
            let stdin = std::io::stdin();
            run_session(&mut ctx, date.unwrap_or(today), stdin.lock(), &mut out, scanner.as_mut())?;
        }
    }

    out.flush()?;
    Ok(())
}
