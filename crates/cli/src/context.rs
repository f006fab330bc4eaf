//! Per-process application context.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use chrono::NaiveDate;

use cyclecount_infra::{
    CommandScanner, ExportKind, InventorySheet, InventorySource, NoScanner, SkuScanner,
    export_file_name,
};
use cyclecount_inventory::{InventoryRecord, active_day_for, generate_plan};

use crate::config::CycleCountConfig;
use crate::output::OutputFormat;

/// Configuration plus the cached inventory source.
#[derive(Debug)]
pub struct AppContext {
    pub config: CycleCountConfig,
    pub output: OutputFormat,
    source: InventorySource,
}

/// The batch assigned to one calendar date.
#[derive(Debug, Clone)]
pub struct DailyBatch {
    pub date: NaiveDate,
    pub day: u32,
    pub days: u32,
    pub records: Vec<InventoryRecord>,
    pub passthrough_columns: Vec<String>,
}

impl AppContext {
    pub fn new(config: CycleCountConfig, output: OutputFormat) -> anyhow::Result<Self> {
        config.validate().context("invalid configuration")?;
        let source = InventorySource::new(config.inventory_path.clone());
        Ok(Self {
            config,
            output,
            source,
        })
    }

    pub fn inventory(&mut self) -> anyhow::Result<Arc<InventorySheet>> {
        let path = self.source.path().display().to_string();
        self.source
            .load()
            .with_context(|| format!("failed to load inventory from {path}"))
    }

    /// Regenerate the plan and pick the batch for `date`.
    pub fn daily_batch(&mut self, date: NaiveDate) -> anyhow::Result<DailyBatch> {
        let sheet = self.inventory()?;
        let days = self.config.days;
        let plan = generate_plan(&sheet.records, days, self.config.seed)?;
        let day = active_day_for(date, days)?;
        let records = plan.require_batch(day)?.to_vec();

        tracing::info!(%date, day, days, records = records.len(), "selected daily batch");

        Ok(DailyBatch {
            date,
            day,
            days,
            records,
            passthrough_columns: sheet.passthrough_columns.clone(),
        })
    }

    pub fn export_path(&self, kind: ExportKind, date: NaiveDate) -> PathBuf {
        self.config.output_dir.join(export_file_name(kind, date))
    }

    /// Scanner described by the configuration.
    pub fn scanner(&self) -> Box<dyn SkuScanner> {
        match self
            .config
            .scanner_command
            .as_deref()
            .and_then(CommandScanner::from_command_line)
        {
            Some(scanner) => Box::new(scanner),
            None => Box::new(NoScanner),
        }
    }
}
