//! Matching layers of the reconciliation pipeline
//!
//! Each layer receives the records still unmatched after the previous layer
//! and returns the matches it could establish. A layer never claims a record
//! id twice; the pipeline threads the shrinking working sets forward.

pub mod exact;
pub mod features;
pub mod grouping;
pub mod heuristic;
pub mod identifiers;
pub mod semantic;

use bigdecimal::{BigDecimal, ToPrimitive};
use chrono::NaiveDate;

use crate::types::Record;

/// Clamp a raw score into the valid confidence range
pub(crate) fn clamp_confidence(value: f64) -> f64 {
    value.clamp(0.0, 100.0)
}

/// Lossy conversion used only for score arithmetic, never for comparisons
pub(crate) fn to_f64(value: &BigDecimal) -> f64 {
    value.to_f64().unwrap_or_default()
}

/// Absolute difference between two absolute amounts
pub(crate) fn amount_difference(a: &BigDecimal, b: &BigDecimal) -> BigDecimal {
    (a.abs() - b.abs()).abs()
}

/// Distance between two dates in whole days
pub(crate) fn day_distance(a: NaiveDate, b: NaiveDate) -> i64 {
    (a - b).num_days().abs()
}

/// Sum of absolute amounts over a set of records
pub(crate) fn sum_abs<'a, I>(records: I) -> BigDecimal
where
    I: IntoIterator<Item = &'a Record>,
{
    records
        .into_iter()
        .fold(BigDecimal::from(0), |acc, r| acc + r.amount_abs())
}

/// Normalized edit-distance similarity between two descriptions, in [0, 100]
///
/// Comparison is case-insensitive; an empty description on either side
/// yields 0 so the zero-information case never passes a threshold.
pub fn text_similarity(a: &str, b: &str) -> f64 {
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }
    strsim::normalized_levenshtein(&a.to_lowercase(), &b.to_lowercase()) * 100.0
}
