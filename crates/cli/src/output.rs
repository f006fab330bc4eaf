//! Rendering of batches, counts and reports for the terminal.

use std::io::Write;

use clap::ValueEnum;
use serde::Serialize;

use cyclecount_inventory::{CountedRecord, InventoryRecord, VarianceReport, VarianceRow, VarianceSummary};

use crate::context::DailyBatch;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
}

#[derive(Serialize)]
struct BatchView<'a> {
    date: String,
    day: u32,
    days: u32,
    records: &'a [InventoryRecord],
}

#[derive(Serialize)]
struct ReportView<'a> {
    rows: &'a [VarianceRow],
    unmatched: &'a [CountedRecord],
    summary: &'a VarianceSummary,
}

pub fn write_batch(out: &mut dyn Write, format: OutputFormat, batch: &DailyBatch) -> anyhow::Result<()> {
    match format {
        OutputFormat::Json => write_json(
            out,
            &BatchView {
                date: batch.date.to_string(),
                day: batch.day,
                days: batch.days,
                records: &batch.records,
            },
        ),
        OutputFormat::Table => {
            writeln!(
                out,
                "Cycle count for {} (Day {}/{}): {} SKU(s)",
                batch.date,
                batch.day,
                batch.days,
                batch.records.len()
            )?;
            let mut headers = vec!["SKU".to_string(), "SystemQty".to_string()];
            headers.extend(batch.passthrough_columns.iter().cloned());
            let rows: Vec<Vec<String>> = batch
                .records
                .iter()
                .map(|r| {
                    let mut row = vec![r.sku.to_string(), r.system_qty.to_string()];
                    row.extend(r.attributes.iter().map(ToString::to_string));
                    row
                })
                .collect();
            write_table(out, &headers, &rows)
        }
    }
}

pub fn write_counts(out: &mut dyn Write, format: OutputFormat, counted: &[CountedRecord]) -> anyhow::Result<()> {
    match format {
        OutputFormat::Json => write_json(out, &counted),
        OutputFormat::Table => {
            if counted.is_empty() {
                writeln!(out, "No counts recorded yet.")?;
                return Ok(());
            }
            let rows: Vec<Vec<String>> = counted
                .iter()
                .enumerate()
                .map(|(i, c)| vec![(i + 1).to_string(), c.sku.to_string(), c.counted_qty.to_string()])
                .collect();
            write_table(out, &["#".into(), "SKU".into(), "CountedQty".into()], &rows)
        }
    }
}

pub fn write_report(
    out: &mut dyn Write,
    format: OutputFormat,
    report: &VarianceReport,
    summary: &VarianceSummary,
) -> anyhow::Result<()> {
    match format {
        OutputFormat::Json => write_json(
            out,
            &ReportView {
                rows: report.rows(),
                unmatched: report.unmatched(),
                summary,
            },
        ),
        OutputFormat::Table => {
            write_table(out, &variance_headers(), &variance_rows(report.rows()))?;
            writeln!(out)?;
            writeln!(
                out,
                "Accuracy: {:.2}% ({} of {} counted SKU(s) match; {} not counted)",
                summary.accuracy, summary.matched, summary.counted, summary.not_counted
            )?;
            writeln!(out)?;
            writeln!(out, "Top shortages:")?;
            write_ranked(out, &summary.shortages)?;
            writeln!(out, "Top overages:")?;
            write_ranked(out, &summary.overages)?;
            if !report.unmatched().is_empty() {
                let skus: Vec<String> = report.unmatched().iter().map(|c| c.sku.to_string()).collect();
                writeln!(out)?;
                writeln!(out, "Not in today's batch (left out of the report): {}", skus.join(", "))?;
            }
            Ok(())
        }
    }
}

fn write_ranked(out: &mut dyn Write, rows: &[VarianceRow]) -> anyhow::Result<()> {
    if rows.is_empty() {
        writeln!(out, "  (none)")?;
        return Ok(());
    }
    write_table(out, &variance_headers(), &variance_rows(rows))
}

fn variance_headers() -> Vec<String> {
    ["SKU", "SystemQty", "CountedQty", "Variance"]
        .into_iter()
        .map(String::from)
        .collect()
}

fn variance_rows(rows: &[VarianceRow]) -> Vec<Vec<String>> {
    rows.iter()
        .map(|r| {
            vec![
                r.sku().to_string(),
                r.system_qty().to_string(),
                r.counted_qty.map(|q| q.to_string()).unwrap_or_else(|| "-".into()),
                r.variance.map(|v| format!("{v:+}")).unwrap_or_else(|| "-".into()),
            ]
        })
        .collect()
}

fn write_json<T: Serialize + ?Sized>(out: &mut dyn Write, value: &T) -> anyhow::Result<()> {
    serde_json::to_writer_pretty(&mut *out, value)?;
    writeln!(out)?;
    Ok(())
}

/// Left-aligned plain-text table.
fn write_table(out: &mut dyn Write, headers: &[String], rows: &[Vec<String>]) -> anyhow::Result<()> {
    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
    for row in rows {
        for (i, cell) in row.iter().enumerate() {
            if let Some(w) = widths.get_mut(i) {
                *w = (*w).max(cell.chars().count());
            }
        }
    }

    let line = |cells: &[String]| {
        cells
            .iter()
            .zip(&widths)
            .map(|(c, &w)| format!("{c:<w$}"))
            .collect::<Vec<_>>()
            .join("  ")
            .trim_end()
            .to_string()
    };

    writeln!(out, "{}", line(headers))?;
    for row in rows {
        writeln!(out, "{}", line(row))?;
    }
    Ok(())
}
