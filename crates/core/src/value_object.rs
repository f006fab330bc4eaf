//! Value object trait: equality by value, not identity.

/// Marker trait for value objects.
///
/// Value objects are **immutable** and **compared by value**: two SKUs with the
/// same normalized text are the same SKU, regardless of which spreadsheet cell or
/// scanner produced them.
pub trait ValueObject: Clone + PartialEq + core::fmt::Debug {}
