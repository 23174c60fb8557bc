//! Pipeline orchestrator: runs the matching layers in order and aggregates
//! the run output
//!
//! The engine owns no matching logic. It validates the inputs, normalizes
//! identifiers, runs exact → heuristic → combinatorial → semantic matching
//! while threading the shrinking "still unmatched" sets forward, builds
//! exceptions from the final leftovers, and assembles the counters. A record
//! claimed by any match is never re-examined by a later layer.

use std::collections::HashSet;

use tracing::info;

use crate::config::MatchingConfig;
use crate::exceptions::build_exceptions;
use crate::matching::{exact, grouping, heuristic, identifiers, semantic};
use crate::types::{
    BankTransaction, LayerStats, LedgerEntry, Match, PipelineResult, ReconResult, Record, Side,
};
use crate::utils::validation::validate_batch;

/// Multi-layer reconciliation engine
///
/// Construct one per run (or reuse across runs; the engine holds only the
/// configuration and no per-run state).
pub struct ReconciliationEngine {
    config: MatchingConfig,
}

impl Default for ReconciliationEngine {
    fn default() -> Self {
        Self::new(MatchingConfig::default())
    }
}

impl ReconciliationEngine {
    /// Create an engine with the given matching configuration
    pub fn new(config: MatchingConfig) -> Self {
        Self { config }
    }

    /// The configuration this engine runs with
    pub fn config(&self) -> &MatchingConfig {
        &self.config
    }

    /// Reconcile one immutable pair of input batches
    ///
    /// Deterministic and idempotent: identical inputs and configuration
    /// produce identical ordered match and exception lists.
    pub fn reconcile(
        &self,
        bank: &[BankTransaction],
        ledger: &[LedgerEntry],
    ) -> ReconResult<PipelineResult> {
        self.config.validate()?;

        let mut bank_records: Vec<Record> = bank.iter().map(|t| t.record.clone()).collect();
        let mut ledger_records: Vec<Record> = ledger.iter().map(|e| e.record.clone()).collect();
        validate_batch(&bank_records, Side::Bank)?;
        validate_batch(&ledger_records, Side::Ledger)?;

        identifiers::normalize_records(&mut bank_records);
        identifiers::normalize_records(&mut ledger_records);

        let mut stats = LayerStats {
            bank_records: bank_records.len(),
            ledger_records: ledger_records.len(),
            ..LayerStats::default()
        };
        let mut matches = Vec::new();

        let mut bank_open: Vec<&Record> = bank_records.iter().collect();
        let mut ledger_open: Vec<&Record> = ledger_records.iter().collect();

        let exact_matches = exact::run(&bank_open, &ledger_open);
        stats.exact_matches = exact_matches.len();
        info!(count = exact_matches.len(), "exact matching complete");
        remove_claimed(&mut bank_open, &mut ledger_open, &exact_matches);
        matches.extend(exact_matches);

        let heuristic_matches = heuristic::run(&bank_open, &ledger_open, &self.config);
        stats.heuristic_matches = heuristic_matches.len();
        info!(count = heuristic_matches.len(), "heuristic matching complete");
        remove_claimed(&mut bank_open, &mut ledger_open, &heuristic_matches);
        matches.extend(heuristic_matches);

        let combinatorial_matches = grouping::run(&bank_open, &ledger_open, &self.config);
        stats.combinatorial_matches = combinatorial_matches.len();
        info!(count = combinatorial_matches.len(), "combinatorial matching complete");
        remove_claimed(&mut bank_open, &mut ledger_open, &combinatorial_matches);
        matches.extend(combinatorial_matches);

        let semantic_matches = semantic::run(&bank_open, &ledger_open, &self.config);
        stats.semantic_matches = semantic_matches.len();
        info!(count = semantic_matches.len(), "semantic matching complete");
        remove_claimed(&mut bank_open, &mut ledger_open, &semantic_matches);
        matches.extend(semantic_matches);

        let mut exceptions = build_exceptions(&bank_open, Side::Bank);
        exceptions.extend(build_exceptions(&ledger_open, Side::Ledger));
        stats.unmatched_bank = bank_open.len();
        stats.unmatched_ledger = ledger_open.len();
        stats.exceptions = exceptions.len();
        info!(
            matches = stats.total_matches(),
            exceptions = stats.exceptions,
            "reconciliation run complete"
        );

        Ok(PipelineResult {
            matches,
            exceptions,
            stats,
        })
    }
}

/// Drop every record claimed by the given matches from the working sets
fn remove_claimed(bank_open: &mut Vec<&Record>, ledger_open: &mut Vec<&Record>, matches: &[Match]) {
    if matches.is_empty() {
        return;
    }

    let claimed_bank: HashSet<&str> = matches
        .iter()
        .flat_map(|m| m.bank_ids.iter().map(String::as_str))
        .collect();
    let claimed_ledger: HashSet<&str> = matches
        .iter()
        .flat_map(|m| m.ledger_ids.iter().map(String::as_str))
        .collect();

    bank_open.retain(|r| !claimed_bank.contains(r.id.as_str()));
    ledger_open.retain(|r| !claimed_ledger.contains(r.id.as_str()));
}
