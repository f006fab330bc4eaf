//! Workbook exports.
//!
//! Each export is written to a hidden sibling file and renamed into place, so a
//! failed write never leaves a truncated workbook behind and never touches the
//! in-memory report.

use std::path::{Path, PathBuf};

use rust_xlsxwriter::{Format, Workbook, Worksheet, XlsxError};

use cyclecount_inventory::{CellValue, InventoryRecord, VarianceReport};

use super::{COUNTED_QTY_COLUMN, SKU_COLUMN, SYSTEM_QTY_COLUMN, VARIANCE_COLUMN};
use crate::error::{InfraError, InfraResult};

/// Write today's batch: SKU, SystemQty, then the passthrough columns.
pub fn export_daily_list(
    path: &Path,
    batch: &[InventoryRecord],
    passthrough_columns: &[String],
) -> InfraResult<PathBuf> {
    let mut headers = vec![SKU_COLUMN, SYSTEM_QTY_COLUMN];
    headers.extend(passthrough_columns.iter().map(String::as_str));

    save_atomically(path, |sheet| {
        write_headers(sheet, &headers)?;
        for (i, record) in batch.iter().enumerate() {
            let row = row_index(i + 1)?;
            sheet.write_string(row, 0, record.sku.as_str())?;
            sheet.write_number(row, 1, record.system_qty as f64)?;
            write_attributes(sheet, row, 2, &record.attributes)?;
        }
        Ok(())
    })?;

    tracing::info!(path = %path.display(), rows = batch.len(), "exported daily list");
    Ok(path.to_path_buf())
}

/// Write the variance report: SKU, SystemQty, CountedQty, Variance, then the
/// passthrough columns. Not-counted rows leave CountedQty and Variance blank.
pub fn export_report(
    path: &Path,
    report: &VarianceReport,
    passthrough_columns: &[String],
) -> InfraResult<PathBuf> {
    let mut headers = vec![SKU_COLUMN, SYSTEM_QTY_COLUMN, COUNTED_QTY_COLUMN, VARIANCE_COLUMN];
    headers.extend(passthrough_columns.iter().map(String::as_str));

    save_atomically(path, |sheet| {
        write_headers(sheet, &headers)?;
        for (i, line) in report.rows().iter().enumerate() {
            let row = row_index(i + 1)?;
            sheet.write_string(row, 0, line.sku().as_str())?;
            sheet.write_number(row, 1, line.system_qty() as f64)?;
            if let Some(counted) = line.counted_qty {
                sheet.write_number(row, 2, counted as f64)?;
            }
            if let Some(variance) = line.variance {
                sheet.write_number(row, 3, variance as f64)?;
            }
            write_attributes(sheet, row, 4, &line.record.attributes)?;
        }
        Ok(())
    })?;

    tracing::info!(path = %path.display(), rows = report.rows().len(), "exported variance report");
    Ok(path.to_path_buf())
}

fn save_atomically<F>(path: &Path, fill: F) -> InfraResult<()>
where
    F: FnOnce(&mut Worksheet) -> Result<(), XlsxError>,
{
    let export_err = |source| InfraError::Export {
        path: path.to_path_buf(),
        source,
    };

    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();
    sheet.set_name("Cycle Count").map_err(export_err)?;
    fill(sheet).map_err(export_err)?;

    let tmp = temp_sibling(path);
    if let Err(source) = workbook.save(&tmp) {
        let _ = std::fs::remove_file(&tmp);
        return Err(export_err(source));
    }
    std::fs::rename(&tmp, path).map_err(|e| {
        let _ = std::fs::remove_file(&tmp);
        InfraError::io(path, e)
    })
}

fn temp_sibling(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    path.with_file_name(format!(".{name}.partial.xlsx"))
}

fn write_headers(sheet: &mut Worksheet, headers: &[&str]) -> Result<(), XlsxError> {
    let bold = Format::new().set_bold();
    for (i, header) in headers.iter().enumerate() {
        sheet.write_string_with_format(0, col_index(i)?, *header, &bold)?;
    }
    Ok(())
}

fn write_attributes(
    sheet: &mut Worksheet,
    row: u32,
    first_col: usize,
    attributes: &[CellValue],
) -> Result<(), XlsxError> {
    for (offset, value) in attributes.iter().enumerate() {
        let col = col_index(first_col + offset)?;
        match value {
            CellValue::Empty => {}
            CellValue::Bool(b) => {
                sheet.write_boolean(row, col, *b)?;
            }
            CellValue::Int(i) => {
                sheet.write_number(row, col, *i as f64)?;
            }
            CellValue::Float(f) => {
                sheet.write_number(row, col, *f)?;
            }
            CellValue::Text(s) => {
                sheet.write_string(row, col, s)?;
            }
        }
    }
    Ok(())
}

fn row_index(i: usize) -> Result<u32, XlsxError> {
    u32::try_from(i).map_err(|_| XlsxError::RowColumnLimitError)
}

fn col_index(i: usize) -> Result<u16, XlsxError> {
    u16::try_from(i).map_err(|_| XlsxError::RowColumnLimitError)
}
