//! Daily cycle plan: one seeded shuffle of the inventory, split into equal batches.
//!
//! The plan is never stored. Operators rely on "Day 7" naming the same SKUs every
//! month, so the permutation must depend only on (inventory content, seed, days).

use chrono::{Datelike, NaiveDate};
use rand::SeedableRng;
use rand::seq::SliceRandom;
use rand_chacha::ChaCha20Rng;
use serde::Serialize;

use cyclecount_core::{DomainError, DomainResult};

use crate::record::InventoryRecord;

/// Plan width used by the counting calendar.
pub const DEFAULT_DAYS: u32 = 30;

/// Shuffle seed. Changing it reassigns every SKU to a different day.
pub const DEFAULT_SEED: u64 = 42;

/// Mapping from day number (1..=days) to that day's batch.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CyclePlan {
    days: u32,
    per_day: usize,
    batches: Vec<Vec<InventoryRecord>>,
}

impl CyclePlan {
    pub fn days(&self) -> u32 {
        self.days
    }

    /// Batch size for every day but possibly the trailing ones (`ceil(total / days)`).
    pub fn per_day(&self) -> usize {
        self.per_day
    }

    /// Number of records across all batches.
    pub fn total(&self) -> usize {
        self.batches.iter().map(Vec::len).sum()
    }

    /// Batch for a 1-based day number. `None` outside `1..=days`.
    pub fn batch(&self, day: u32) -> Option<&[InventoryRecord]> {
        let index = usize::try_from(day.checked_sub(1)?).ok()?;
        self.batches.get(index).map(Vec::as_slice)
    }

    /// Like [`CyclePlan::batch`], but an out-of-range day is an error.
    pub fn require_batch(&self, day: u32) -> DomainResult<&[InventoryRecord]> {
        self.batch(day)
            .ok_or_else(|| DomainError::not_found(format!("day {day} (plan has {} days)", self.days)))
    }

    /// `(day, batch)` pairs in day order.
    pub fn iter(&self) -> impl Iterator<Item = (u32, &[InventoryRecord])> + '_ {
        (1..).zip(self.batches.iter().map(Vec::as_slice))
    }
}

/// Partition `inventory` into `days` contiguous batches of a seeded permutation.
///
/// Every record lands in exactly one batch. When `total` is not a multiple of
/// `days` the trailing batches are short or empty; an empty inventory yields
/// `days` empty batches.
pub fn generate_plan(inventory: &[InventoryRecord], days: u32, seed: u64) -> DomainResult<CyclePlan> {
    if days == 0 {
        return Err(DomainError::validation("plan must span at least one day"));
    }

    let total = inventory.len();
    let per_day = total.div_ceil(days as usize);

    let mut shuffled = inventory.to_vec();
    let mut rng = ChaCha20Rng::seed_from_u64(seed);
    shuffled.shuffle(&mut rng);

    let mut remaining = shuffled.into_iter();
    let batches: Vec<Vec<InventoryRecord>> = (0..days)
        .map(|_| remaining.by_ref().take(per_day).collect())
        .collect();

    tracing::debug!(total, days, per_day, seed, "generated cycle plan");

    Ok(CyclePlan {
        days,
        per_day,
        batches,
    })
}

/// Active plan day for a calendar day-of-month: `((d - 1) mod days) + 1`.
///
/// Day 31 wraps to day 1 on a 30-day plan.
pub fn active_day(calendar_day: u32, days: u32) -> DomainResult<u32> {
    if days == 0 {
        return Err(DomainError::validation("plan must span at least one day"));
    }
    if !(1..=31).contains(&calendar_day) {
        return Err(DomainError::validation(format!(
            "calendar day must be within 1..=31 (got {calendar_day})"
        )));
    }
    Ok((calendar_day - 1) % days + 1)
}

pub fn active_day_for(date: NaiveDate, days: u32) -> DomainResult<u32> {
    active_day(date.day(), days)
}
