use serde::{Deserialize, Serialize};

use cyclecount_core::{DomainError, DomainResult, Sku};

/// A passthrough spreadsheet cell.
///
/// Descriptive columns of the inventory (location, description, ...) are carried
/// through planning and reporting untouched.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CellValue {
    #[default]
    Empty,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
}

impl CellValue {
    pub fn is_empty(&self) -> bool {
        matches!(self, CellValue::Empty)
    }
}

impl core::fmt::Display for CellValue {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            CellValue::Empty => Ok(()),
            CellValue::Bool(b) => write!(f, "{b}"),
            CellValue::Int(i) => write!(f, "{i}"),
            CellValue::Float(x) => write!(f, "{x}"),
            CellValue::Text(s) => f.write_str(s),
        }
    }
}

/// One row of the master inventory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InventoryRecord {
    pub sku: Sku,
    /// Expected on-hand quantity according to the system of record.
    pub system_qty: i64,
    /// Passthrough columns, aligned with the source sheet's extra headers.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub attributes: Vec<CellValue>,
}

impl InventoryRecord {
    pub fn new(sku: Sku, system_qty: i64) -> Self {
        Self {
            sku,
            system_qty,
            attributes: Vec::new(),
        }
    }

    pub fn with_attributes(mut self, attributes: Vec<CellValue>) -> Self {
        self.attributes = attributes;
        self
    }
}

/// An operator-submitted count.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CountedRecord {
    pub sku: Sku,
    pub counted_qty: i64,
}

impl CountedRecord {
    /// Build a counted record. Physical counts cannot be negative.
    pub fn new(sku: Sku, counted_qty: i64) -> DomainResult<Self> {
        if counted_qty < 0 {
            return Err(DomainError::validation(format!(
                "counted quantity for {sku} cannot be negative ({counted_qty})"
            )));
        }
        Ok(Self { sku, counted_qty })
    }
}
