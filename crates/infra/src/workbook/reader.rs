//! Workbook loading with up-front schema validation.
//!
//! Loads are all-or-nothing: the first bad header or cell fails the whole file.

use std::path::{Path, PathBuf};

use calamine::{Data, Reader, open_workbook_auto};

use cyclecount_core::Sku;
use cyclecount_inventory::{CellValue, CountedRecord, InventoryRecord};

use super::{COUNTED_QTY_COLUMN, SKU_COLUMN, SYSTEM_QTY_COLUMN};
use crate::error::{InfraError, InfraResult};

/// Parsed inventory workbook.
#[derive(Debug, Clone, PartialEq)]
pub struct InventorySheet {
    /// Headers of the columns other than SKU/SystemQty, in sheet order.
    pub passthrough_columns: Vec<String>,
    /// Records in sheet order. Each record's `attributes` align with
    /// `passthrough_columns`.
    pub records: Vec<InventoryRecord>,
}

/// Load the master inventory (first worksheet, header row first).
pub fn load_inventory(path: &Path) -> InfraResult<InventorySheet> {
    let table = Table::read(path)?;
    let sku_idx = table.require(SKU_COLUMN)?;
    let qty_idx = table.require(SYSTEM_QTY_COLUMN)?;

    let passthrough: Vec<usize> = (0..table.headers.len())
        .filter(|i| *i != sku_idx && *i != qty_idx)
        .collect();

    let mut records = Vec::with_capacity(table.rows.len());
    for (row_number, row) in &table.rows {
        let sku = table.sku_cell(*row_number, SKU_COLUMN, cell(row, sku_idx))?;
        let system_qty = table.int_cell(*row_number, SYSTEM_QTY_COLUMN, cell(row, qty_idx))?;
        let attributes = passthrough.iter().map(|i| to_cell_value(cell(row, *i))).collect();
        records.push(InventoryRecord::new(sku, system_qty).with_attributes(attributes));
    }

    tracing::info!(
        path = %path.display(),
        records = records.len(),
        passthrough = passthrough.len(),
        "loaded inventory workbook"
    );

    Ok(InventorySheet {
        passthrough_columns: passthrough.iter().map(|i| table.headers[*i].clone()).collect(),
        records,
    })
}

/// Load counted quantities from a workbook with `SKU` and `CountedQty` columns.
pub fn load_counts(path: &Path) -> InfraResult<Vec<CountedRecord>> {
    let table = Table::read(path)?;
    let sku_idx = table.require(SKU_COLUMN)?;
    let qty_idx = table.require(COUNTED_QTY_COLUMN)?;

    let mut counted = Vec::with_capacity(table.rows.len());
    for (row_number, row) in &table.rows {
        let sku = table.sku_cell(*row_number, SKU_COLUMN, cell(row, sku_idx))?;
        let qty = table.int_cell(*row_number, COUNTED_QTY_COLUMN, cell(row, qty_idx))?;
        let record = CountedRecord::new(sku, qty)
            .map_err(|e| table.invalid(*row_number, COUNTED_QTY_COLUMN, e.to_string()))?;
        counted.push(record);
    }

    tracing::info!(path = %path.display(), counted = counted.len(), "loaded counts workbook");
    Ok(counted)
}

/// Header row plus non-blank data rows, tagged with 1-based sheet row numbers.
struct Table {
    path: PathBuf,
    headers: Vec<String>,
    rows: Vec<(usize, Vec<Data>)>,
}

impl Table {
    fn read(path: &Path) -> InfraResult<Self> {
        let workbook_err = |source| InfraError::Workbook {
            path: path.to_path_buf(),
            source,
        };

        let mut workbook = open_workbook_auto(path).map_err(workbook_err)?;
        let range = workbook
            .worksheet_range_at(0)
            .ok_or_else(|| InfraError::EmptyWorkbook {
                path: path.to_path_buf(),
            })?
            .map_err(workbook_err)?;

        let first_row = range.start().map(|(r, _)| r as usize).unwrap_or(0) + 1;
        let mut rows = range.rows();

        let headers: Vec<String> = rows
            .next()
            .map(|header| header.iter().enumerate().map(|(i, c)| header_name(i, c)).collect())
            .unwrap_or_default();

        let rows = rows
            .enumerate()
            .filter(|(_, row)| row.iter().any(|c| !matches!(c, Data::Empty)))
            .map(|(i, row)| (first_row + 1 + i, row.to_vec()))
            .collect();

        Ok(Self {
            path: path.to_path_buf(),
            headers,
            rows,
        })
    }

    fn require(&self, column: &str) -> InfraResult<usize> {
        self.headers
            .iter()
            .position(|h| h == column)
            .ok_or_else(|| InfraError::MissingColumn {
                path: self.path.clone(),
                column: column.to_string(),
            })
    }

    fn invalid(&self, row: usize, column: &str, reason: impl Into<String>) -> InfraError {
        InfraError::InvalidCell {
            path: self.path.clone(),
            row,
            column: column.to_string(),
            reason: reason.into(),
        }
    }

    fn sku_cell(&self, row: usize, column: &str, value: &Data) -> InfraResult<Sku> {
        let parsed = match value {
            Data::String(s) => Sku::parse(s),
            Data::Int(i) => Ok(Sku::from_int(*i)),
            Data::Float(f) => Sku::from_float(*f),
            Data::Empty => return Err(self.invalid(row, column, "SKU is blank")),
            other => return Err(self.invalid(row, column, format!("unsupported SKU cell {other:?}"))),
        };
        parsed.map_err(|e| self.invalid(row, column, e.to_string()))
    }

    fn int_cell(&self, row: usize, column: &str, value: &Data) -> InfraResult<i64> {
        match value {
            Data::Int(i) => Ok(*i),
            Data::Float(f) if f.fract() == 0.0 && f.abs() < 9.0e15 => Ok(*f as i64),
            Data::String(s) => s
                .trim()
                .parse::<i64>()
                .map_err(|_| self.invalid(row, column, format!("'{s}' is not a whole number"))),
            Data::Empty => Err(self.invalid(row, column, "quantity is blank")),
            other => Err(self.invalid(row, column, format!("{other:?} is not a whole number"))),
        }
    }
}

fn cell(row: &[Data], idx: usize) -> &Data {
    row.get(idx).unwrap_or(&Data::Empty)
}

fn header_name(idx: usize, value: &Data) -> String {
    let name = match value {
        Data::String(s) => s.trim().to_string(),
        Data::Empty => String::new(),
        other => to_cell_value(other).to_string(),
    };
    if name.is_empty() {
        format!("Column{}", idx + 1)
    } else {
        name
    }
}

fn to_cell_value(value: &Data) -> CellValue {
    match value {
        Data::Empty => CellValue::Empty,
        Data::String(s) => CellValue::Text(s.clone()),
        Data::Int(i) => CellValue::Int(*i),
        Data::Float(f) => CellValue::Float(*f),
        Data::Bool(b) => CellValue::Bool(*b),
        Data::DateTime(dt) => CellValue::Float(dt.as_f64()),
        Data::DateTimeIso(s) | Data::DurationIso(s) => CellValue::Text(s.clone()),
        Data::Error(e) => CellValue::Text(e.to_string()),
    }
}
