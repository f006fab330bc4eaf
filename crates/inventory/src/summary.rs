//! Aggregate statistics over a variance report.

use std::cmp::Reverse;

use serde::Serialize;

use crate::variance::{VarianceReport, VarianceRow};

/// Length of the shortage/overage lists.
pub const DEFAULT_TOP_N: usize = 5;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VarianceSummary {
    /// Rows in the report.
    pub rows: usize,
    /// Rows with a count.
    pub counted: usize,
    /// Counted rows whose variance is zero.
    pub matched: usize,
    pub not_counted: usize,
    /// `matched / counted * 100`, or `0` when nothing was counted.
    pub accuracy: f64,
    /// Most negative variances first.
    pub shortages: Vec<VarianceRow>,
    /// Most positive variances first.
    pub overages: Vec<VarianceRow>,
}

impl VarianceSummary {
    pub fn from_report(report: &VarianceReport, top_n: usize) -> Self {
        let rows = report.rows();
        let counted = rows.iter().filter(|r| r.is_counted()).count();
        let matched = rows.iter().filter(|r| r.variance == Some(0)).count();

        let accuracy = if counted == 0 {
            0.0
        } else {
            matched as f64 * 100.0 / counted as f64
        };

        // Stable sorts: ties keep report order.
        let mut shortages: Vec<VarianceRow> = rows
            .iter()
            .filter(|r| r.variance.is_some_and(|v| v < 0))
            .cloned()
            .collect();
        shortages.sort_by_key(|r| r.variance);
        shortages.truncate(top_n);

        let mut overages: Vec<VarianceRow> = rows
            .iter()
            .filter(|r| r.variance.is_some_and(|v| v > 0))
            .cloned()
            .collect();
        overages.sort_by_key(|r| Reverse(r.variance));
        overages.truncate(top_n);

        Self {
            rows: rows.len(),
            counted,
            matched,
            not_counted: rows.len() - counted,
            accuracy,
            shortages,
            overages,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::{CountedRecord, InventoryRecord};
    use crate::variance::{DuplicatePolicy, compute_variance};
    use cyclecount_core::Sku;

    fn report(rows: &[(&str, i64, Option<i64>)]) -> VarianceReport {
        let expected: Vec<InventoryRecord> = rows
            .iter()
            .map(|(s, q, _)| InventoryRecord::new(Sku::parse(s).unwrap(), *q))
            .collect();
        let counted: Vec<CountedRecord> = rows
            .iter()
            .filter_map(|(s, _, c)| c.map(|c| CountedRecord::new(Sku::parse(s).unwrap(), c).unwrap()))
            .collect();
        compute_variance(&expected, &counted, DuplicatePolicy::LastWins).unwrap()
    }

    fn skus(rows: &[VarianceRow]) -> Vec<&str> {
        rows.iter().map(|r| r.sku().as_str()).collect()
    }

    #[test]
    fn top_lists_order_by_magnitude() {
        let r = report(&[
            ("A", 10, Some(7)),
            ("B", 10, Some(1)),
            ("C", 10, Some(15)),
            ("D", 10, Some(11)),
            ("E", 10, Some(10)),
            ("F", 10, None),
        ]);
        let s = r.summary(DEFAULT_TOP_N);
        assert_eq!(skus(&s.shortages), vec!["B", "A"]);
        assert_eq!(skus(&s.overages), vec!["C", "D"]);
        assert_eq!(s.counted, 5);
        assert_eq!(s.matched, 1);
        assert_eq!(s.not_counted, 1);
        assert_eq!(s.accuracy, 20.0);
    }

    #[test]
    fn ties_keep_report_order() {
        let r = report(&[
            ("A", 5, Some(3)),
            ("B", 5, Some(3)),
            ("C", 1, Some(3)),
            ("D", 1, Some(3)),
        ]);
        let s = r.summary(DEFAULT_TOP_N);
        assert_eq!(skus(&s.shortages), vec!["A", "B"]);
        assert_eq!(skus(&s.overages), vec!["C", "D"]);
    }

    #[test]
    fn lists_are_truncated() {
        let rows: Vec<(String, i64, Option<i64>)> = (0..8)
            .map(|i| (format!("S{i}"), 100, Some(i as i64)))
            .collect();
        let borrowed: Vec<(&str, i64, Option<i64>)> =
            rows.iter().map(|(s, q, c)| (s.as_str(), *q, *c)).collect();
        let s = report(&borrowed).summary(3);
        assert_eq!(skus(&s.shortages), vec!["S0", "S1", "S2"]);
        assert!(s.overages.is_empty());
    }

    #[test]
    fn nothing_counted_means_zero_accuracy() {
        let s = report(&[("A", 1, None)]).summary(DEFAULT_TOP_N);
        assert_eq!(s.accuracy, 0.0);
        assert!(s.shortages.is_empty() && s.overages.is_empty());
    }

    mod proptest_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            /// Property: shortages are strictly negative and non-decreasing,
            /// overages strictly positive and non-increasing.
            #[test]
            fn top_lists_respect_sign_and_order(
                entries in prop::collection::vec((0i64..50, prop::option::of(0i64..50)), 0..40),
                top_n in 0usize..10,
            ) {
                let names: Vec<String> = (0..entries.len()).map(|i| format!("P{i}")).collect();
                let rows: Vec<(&str, i64, Option<i64>)> = names
                    .iter()
                    .zip(&entries)
                    .map(|(n, (q, c))| (n.as_str(), *q, *c))
                    .collect();
                let s = report(&rows).summary(top_n);

                prop_assert!(s.shortages.len() <= top_n && s.overages.len() <= top_n);
                prop_assert!(s.shortages.iter().all(|r| r.variance.is_some_and(|v| v < 0)));
                prop_assert!(s.overages.iter().all(|r| r.variance.is_some_and(|v| v > 0)));
                prop_assert!(s.shortages.windows(2).all(|w| w[0].variance <= w[1].variance));
                prop_assert!(s.overages.windows(2).all(|w| w[0].variance >= w[1].variance));
                prop_assert!((0.0..=100.0).contains(&s.accuracy));
            }
        }
    }
}
