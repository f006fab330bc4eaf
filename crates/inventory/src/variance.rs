//! Variance calculation: left join of the expected batch against submitted counts.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use cyclecount_core::{DomainError, DomainResult, Sku};

use crate::record::{CountedRecord, InventoryRecord};
use crate::summary::VarianceSummary;

/// How repeated submissions for one SKU are resolved.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DuplicatePolicy {
    /// The most recent submission for a SKU wins.
    #[default]
    LastWins,
    /// Any SKU submitted more than once fails the report.
    Reject,
}

impl core::str::FromStr for DuplicatePolicy {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "last_wins" | "last-wins" => Ok(Self::LastWins),
            "reject" => Ok(Self::Reject),
            other => Err(DomainError::validation(format!(
                "unknown duplicate policy '{other}' (expected last_wins or reject)"
            ))),
        }
    }
}

/// One expected record joined with its count.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VarianceRow {
    #[serde(flatten)]
    pub record: InventoryRecord,
    /// `None` when the SKU has not been counted yet.
    pub counted_qty: Option<i64>,
    /// `counted_qty - system_qty`; `None` when not counted (never zero by default).
    pub variance: Option<i64>,
}

impl VarianceRow {
    pub fn sku(&self) -> &Sku {
        &self.record.sku
    }

    pub fn system_qty(&self) -> i64 {
        self.record.system_qty
    }

    pub fn is_counted(&self) -> bool {
        self.counted_qty.is_some()
    }
}

/// Result of joining a day's batch with the session's counts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VarianceReport {
    rows: Vec<VarianceRow>,
    unmatched: Vec<CountedRecord>,
}

impl VarianceReport {
    /// Rows in expected-batch order.
    pub fn rows(&self) -> &[VarianceRow] {
        &self.rows
    }

    /// Counts whose SKU is not part of the expected batch. These never appear in
    /// `rows`; they are kept so callers can tell the operator.
    pub fn unmatched(&self) -> &[CountedRecord] {
        &self.unmatched
    }

    pub fn summary(&self, top_n: usize) -> VarianceSummary {
        VarianceSummary::from_report(self, top_n)
    }
}

/// Join `expected` with `counted` on normalized SKU.
pub fn compute_variance(
    expected: &[InventoryRecord],
    counted: &[CountedRecord],
    policy: DuplicatePolicy,
) -> DomainResult<VarianceReport> {
    let mut latest: HashMap<&Sku, i64> = HashMap::with_capacity(counted.len());
    for entry in counted {
        let previous = latest.insert(&entry.sku, entry.counted_qty);
        if previous.is_some() && policy == DuplicatePolicy::Reject {
            return Err(DomainError::conflict(format!(
                "SKU {} was submitted more than once",
                entry.sku
            )));
        }
    }

    let expected_skus: HashSet<&Sku> = expected.iter().map(|r| &r.sku).collect();
    let unmatched: Vec<CountedRecord> = counted
        .iter()
        .filter(|c| !expected_skus.contains(&c.sku))
        .cloned()
        .collect();

    let rows = expected
        .iter()
        .map(|record| {
            let counted_qty = latest.get(&record.sku).copied();
            let variance = counted_qty
                .map(|qty| {
                    qty.checked_sub(record.system_qty).ok_or_else(|| {
                        DomainError::invariant(format!("variance overflow for SKU {}", record.sku))
                    })
                })
                .transpose()?;
            Ok(VarianceRow {
                record: record.clone(),
                counted_qty,
                variance,
            })
        })
        .collect::<DomainResult<Vec<_>>>()?;

    if !unmatched.is_empty() {
        tracing::warn!(
            unmatched = unmatched.len(),
            "counted SKUs not in today's batch were left out of the report"
        );
    }

    Ok(VarianceReport { rows, unmatched })
}
