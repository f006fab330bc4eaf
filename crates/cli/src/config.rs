//! Runtime configuration.
//!
//! Layering, lowest to highest precedence: built-in defaults, TOML file,
//! `CYCLECOUNT_*` environment variables, command-line flags.

use std::path::{Path, PathBuf};

use anyhow::{Context, bail};
use serde::{Deserialize, Serialize};

use cyclecount_infra::DEFAULT_CHART_FILE;
use cyclecount_inventory::{DEFAULT_DAYS, DEFAULT_SEED, DEFAULT_TOP_N, DuplicatePolicy};
use cyclecount_observability::LogFormat;

/// Config file picked up from the working directory when `--config` is not given.
pub const DEFAULT_CONFIG_FILE: &str = "cyclecount.toml";

pub const ENV_INVENTORY: &str = "CYCLECOUNT_INVENTORY";
pub const ENV_OUTPUT_DIR: &str = "CYCLECOUNT_OUTPUT_DIR";
pub const ENV_SCANNER: &str = "CYCLECOUNT_SCANNER";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CycleCountConfig {
    /// Master inventory workbook.
    pub inventory_path: PathBuf,
    /// Directory receiving the daily list, final report and chart.
    pub output_dir: PathBuf,
    /// Plan width in days.
    pub days: u32,
    /// Shuffle seed. Changing it moves SKUs to different days.
    pub seed: u64,
    /// Length of the shortage/overage lists.
    pub top_n: usize,
    pub duplicate_policy: DuplicatePolicy,
    pub chart_file: String,
    /// External decoder command; scanning is disabled when unset.
    pub scanner_command: Option<String>,
    pub log_format: LogFormat,
}

impl Default for CycleCountConfig {
    fn default() -> Self {
        Self {
            inventory_path: PathBuf::from("inventory.xlsx"),
            output_dir: PathBuf::from("."),
            days: DEFAULT_DAYS,
            seed: DEFAULT_SEED,
            top_n: DEFAULT_TOP_N,
            duplicate_policy: DuplicatePolicy::LastWins,
            chart_file: DEFAULT_CHART_FILE.to_string(),
            scanner_command: None,
            log_format: LogFormat::Compact,
        }
    }
}

impl CycleCountConfig {
    /// Load from `explicit` (must exist) or from `cyclecount.toml` if present,
    /// then apply environment overrides.
    pub fn load(explicit: Option<&Path>) -> anyhow::Result<Self> {
        let mut config = match explicit {
            Some(path) => Self::from_file(path)?,
            None if Path::new(DEFAULT_CONFIG_FILE).exists() => {
                Self::from_file(Path::new(DEFAULT_CONFIG_FILE))?
            }
            None => Self::default(),
        };
        config.apply_env(|key| std::env::var(key).ok());
        Ok(config)
    }

    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        Self::from_toml_str(&content)
            .with_context(|| format!("invalid config file {}", path.display()))
    }

    pub fn from_toml_str(content: &str) -> anyhow::Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Apply `CYCLECOUNT_*` overrides. Blank values are ignored.
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(path) = get(ENV_INVENTORY) {
            self.inventory_path = PathBuf::from(path);
        }
        if let Some(dir) = get(ENV_OUTPUT_DIR) {
            self.output_dir = PathBuf::from(dir);
        }
        if let Some(cmd) = get(ENV_SCANNER) {
            self.scanner_command = Some(cmd);
        }
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if self.days == 0 {
            bail!("days must be at least 1");
        }
        if self.top_n == 0 {
            bail!("top_n must be at least 1");
        }
        if self.chart_file.trim().is_empty() {
            bail!("chart_file cannot be empty");
        }
        Ok(())
    }

    pub fn chart_path(&self) -> PathBuf {
        self.output_dir.join(&self.chart_file)
    }
}
