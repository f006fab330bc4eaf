//! Cycle-count domain module.
//!
//! Business rules for the rolling physical recount: partitioning the inventory
//! into daily batches, joining counts against the expected batch, and the
//! per-operator count session. Purely deterministic (no IO, no UI, no storage).

pub mod plan;
pub mod record;
pub mod session;
pub mod summary;
pub mod variance;

pub use plan::{CyclePlan, DEFAULT_DAYS, DEFAULT_SEED, active_day, active_day_for, generate_plan};
pub use record::{CellValue, CountedRecord, InventoryRecord};
pub use session::{
    CountSession, CountSubmitted, OpenScanner, RecordScan, Reset, ScanMissed, ScannerOpened,
    SessionCommand, SessionEvent, SessionReset, SkuScanned, SubmitCount,
};
pub use summary::{DEFAULT_TOP_N, VarianceSummary};
pub use variance::{DuplicatePolicy, VarianceReport, VarianceRow, compute_variance};
