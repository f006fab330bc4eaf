//! `plan` and `report` commands, plus the report pipeline shared with sessions.

use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::Context;
use chrono::NaiveDate;

use cyclecount_infra::{ExportKind, export_daily_list, export_report, load_counts, render_variance_chart};
use cyclecount_inventory::{CountedRecord, compute_variance};

use crate::context::{AppContext, DailyBatch};
use crate::output::{OutputFormat, write_batch, write_report};

/// Files written by one report request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportFiles {
    pub workbook: PathBuf,
    pub chart: PathBuf,
}

/// Show the batch for `date` and write the daily list.
pub fn plan(ctx: &mut AppContext, date: NaiveDate, out: &mut dyn Write) -> anyhow::Result<DailyBatch> {
    let batch = ctx.daily_batch(date)?;
    write_batch(out, ctx.output, &batch)?;
    let path = export_list(ctx, &batch)?;
    if ctx.output == OutputFormat::Table {
        writeln!(out, "Daily list saved: {}", path.display())?;
    }
    Ok(batch)
}

pub fn export_list(ctx: &AppContext, batch: &DailyBatch) -> anyhow::Result<PathBuf> {
    let path = ctx.export_path(ExportKind::DailyList, batch.date);
    export_daily_list(&path, &batch.records, &batch.passthrough_columns)
        .context("daily list export failed")?;
    Ok(path)
}

/// Non-interactive report from a counts workbook.
pub fn report(
    ctx: &mut AppContext,
    date: NaiveDate,
    counts: &Path,
    out: &mut dyn Write,
) -> anyhow::Result<ReportFiles> {
    let batch = ctx.daily_batch(date)?;
    let counted = load_counts(counts)
        .with_context(|| format!("failed to load counts from {}", counts.display()))?;
    produce_report(ctx, &batch, &counted, out)
}

/// Compute and display the variance report, then export workbook and chart.
///
/// The report is written to `out` before any file is touched, so an export
/// failure leaves what the operator already sees intact.
pub fn produce_report(
    ctx: &AppContext,
    batch: &DailyBatch,
    counted: &[CountedRecord],
    out: &mut dyn Write,
) -> anyhow::Result<ReportFiles> {
    let report = compute_variance(&batch.records, counted, ctx.config.duplicate_policy)?;
    let summary = report.summary(ctx.config.top_n);
    write_report(out, ctx.output, &report, &summary)?;

    tracing::info!(
        day = batch.day,
        rows = summary.rows,
        counted = summary.counted,
        accuracy = summary.accuracy,
        "variance report computed"
    );

    let workbook = ctx.export_path(ExportKind::FinalReport, batch.date);
    export_report(&workbook, &report, &batch.passthrough_columns).context("report export failed")?;
    let chart = render_variance_chart(&report, &ctx.config.chart_path()).context("chart export failed")?;

    if ctx.output == OutputFormat::Table {
        writeln!(out)?;
        writeln!(out, "Report saved: {}", workbook.display())?;
        writeln!(out, "Chart saved: {}", chart.display())?;
    }

    Ok(ReportFiles { workbook, chart })
}
