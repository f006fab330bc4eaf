//! Spreadsheet input and output.

mod reader;
mod writer;

use chrono::NaiveDate;

pub use reader::{InventorySheet, load_counts, load_inventory};
pub use writer::{export_daily_list, export_report};

/// Column holding the SKU in every workbook this tool reads or writes.
pub const SKU_COLUMN: &str = "SKU";
/// Expected on-hand quantity column of the inventory workbook.
pub const SYSTEM_QTY_COLUMN: &str = "SystemQty";
/// Physical count column of counts workbooks and the final report.
pub const COUNTED_QTY_COLUMN: &str = "CountedQty";
/// Derived column of the final report.
pub const VARIANCE_COLUMN: &str = "Variance";

/// Which export a file name is for.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ExportKind {
    /// Today's batch, written at session start.
    DailyList,
    /// The variance report, written on request.
    FinalReport,
}

impl ExportKind {
    fn suffix(self) -> &'static str {
        match self {
            ExportKind::DailyList => "list",
            ExportKind::FinalReport => "final",
        }
    }
}

/// `cycle_count_<list|final>_<YYYY-MM-DD>.xlsx`
pub fn export_file_name(kind: ExportKind, date: NaiveDate) -> String {
    format!("cycle_count_{}_{}.xlsx", kind.suffix(), date.format("%Y-%m-%d"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn export_names_carry_kind_and_date() {
        let date = NaiveDate::from_ymd_opt(2026, 3, 7).unwrap();
        assert_eq!(
            export_file_name(ExportKind::DailyList, date),
            "cycle_count_list_2026-03-07.xlsx"
        );
        assert_eq!(
            export_file_name(ExportKind::FinalReport, date),
            "cycle_count_final_2026-03-07.xlsx"
        );
    }
}
