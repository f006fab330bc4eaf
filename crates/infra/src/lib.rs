//! `cyclecount-infra`
//!
//! **Responsibility:** everything that touches files or devices.
//!
//! - Inventory workbook loading with schema validation and mtime-based reload
//! - Daily list / final report workbook exports
//! - Variance chart rendering
//! - Barcode scanner capabilities
//!
//! Domain rules stay in `cyclecount-inventory`; this crate only moves data in and out.

pub mod chart;
pub mod error;
pub mod inventory_source;
pub mod scanner;
pub mod workbook;

pub use chart::{CHART_HEIGHT, DEFAULT_CHART_FILE, chart_width, render_variance_chart};
pub use error::{InfraError, InfraResult};
pub use inventory_source::InventorySource;
pub use scanner::{CommandScanner, NoScanner, ScriptedScanner, SkuScanner};
pub use workbook::{
    ExportKind, InventorySheet, export_daily_list, export_file_name, export_report, load_counts,
    load_inventory,
};
