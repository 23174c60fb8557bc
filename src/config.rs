//! Matching configuration passed explicitly to the reconciliation engine
//!
//! The configuration is a plain value owned by the caller; there is no
//! process-wide state. Construct one per run, tweak the tolerances, and hand
//! it to [`crate::ReconciliationEngine::new`].

use bigdecimal::BigDecimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::types::{ReconError, ReconResult};

/// Tolerances and bounds for a reconciliation run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchingConfig {
    /// Maximum date distance, in days, accepted by the heuristic and
    /// semantic layers; the combinatorial layer widens this to twice the
    /// value when collecting group candidates
    pub date_tolerance_days: i64,
    /// Maximum absolute amount difference, in currency units, accepted by
    /// the heuristic and semantic layers
    pub amount_tolerance: BigDecimal,
    /// Minimum text similarity (0-100) required by the heuristic layer
    pub min_similarity: f64,
    /// Cap on the number of bank candidates considered per ledger record in
    /// the combinatorial layer; the nearest by date are kept
    pub max_group_candidates: usize,
    /// Work budget for the combinatorial layer: total combinations
    /// evaluated per run before the search stops
    pub max_group_combinations: usize,
}

impl Default for MatchingConfig {
    fn default() -> Self {
        Self {
            date_tolerance_days: 2,
            amount_tolerance: BigDecimal::from_str("0.02").unwrap_or_default(),
            min_similarity: 70.0,
            max_group_candidates: 20,
            max_group_combinations: 50_000,
        }
    }
}

impl MatchingConfig {
    /// Validate the configuration before a run
    pub fn validate(&self) -> ReconResult<()> {
        if self.date_tolerance_days < 0 {
            return Err(ReconError::InvalidConfig(
                "Date tolerance cannot be negative".to_string(),
            ));
        }

        if self.amount_tolerance < BigDecimal::from(0) {
            return Err(ReconError::InvalidConfig(
                "Amount tolerance cannot be negative".to_string(),
            ));
        }

        if !(0.0..=100.0).contains(&self.min_similarity) {
            return Err(ReconError::InvalidConfig(format!(
                "Minimum similarity must be within 0-100, got {}",
                self.min_similarity
            )));
        }

        // The grouping layer needs at least one pair to enumerate
        if self.max_group_candidates < 2 {
            return Err(ReconError::InvalidConfig(
                "Group candidate cap must be at least 2".to_string(),
            ));
        }

        if self.max_group_combinations == 0 {
            return Err(ReconError::InvalidConfig(
                "Group combination budget must be positive".to_string(),
            ));
        }

        Ok(())
    }
}
