//! Heuristic matching layer: tolerance-based greedy pairing
//!
//! Greedy, first-fit in input order: for each unmatched bank record the first
//! ledger candidate inside the amount and date tolerances whose text
//! similarity clears the threshold is accepted. This is intentionally not
//! globally optimal; iteration order can starve a better pairing later. The
//! semantic layer compensates with global best-candidate selection.

use std::collections::HashSet;

use tracing::debug;

use crate::config::MatchingConfig;
use crate::matching::{amount_difference, clamp_confidence, day_distance, text_similarity, to_f64};
use crate::types::{Match, MatchKind, MatchLayer, Record};

/// Run the heuristic layer over the still-unmatched records of both sides
pub fn run(bank: &[&Record], ledger: &[&Record], config: &MatchingConfig) -> Vec<Match> {
    let mut matches = match_one_to_one(bank, ledger, config);

    // Declared sub-matchers kept as documented no-ops; installment and
    // consolidation detection is handled by the combinatorial layer
    matches.extend(match_installments(bank, ledger, config));
    matches.extend(match_consolidations(bank, ledger, config));

    matches
}

fn match_one_to_one(bank: &[&Record], ledger: &[&Record], config: &MatchingConfig) -> Vec<Match> {
    let mut matches = Vec::new();
    let mut claimed_ledger: HashSet<String> = HashSet::new();

    for bank_record in bank {
        let bank_abs = bank_record.amount_abs();

        for ledger_record in ledger {
            if claimed_ledger.contains(&ledger_record.id) {
                continue;
            }

            let amount_diff = amount_difference(&bank_record.amount, &ledger_record.amount);
            if amount_diff > config.amount_tolerance {
                continue;
            }

            let days = day_distance(bank_record.date, ledger_record.date);
            if days > config.date_tolerance_days {
                continue;
            }

            let similarity = text_similarity(&bank_record.description, &ledger_record.description);
            if similarity < config.min_similarity {
                continue;
            }

            let confidence = heuristic_confidence(days, to_f64(&amount_diff), similarity);
            debug!(
                bank_id = %bank_record.id,
                ledger_id = %ledger_record.id,
                similarity,
                confidence,
                "heuristic pair accepted"
            );

            matches.push(Match {
                kind: MatchKind::OneToOne,
                layer: MatchLayer::Heuristic,
                bank_ids: vec![bank_record.id.clone()],
                ledger_ids: vec![ledger_record.id.clone()],
                total: bank_abs.clone(),
                confidence,
                rationale: format!(
                    "Heuristic match: similarity {similarity:.1}%, {days} day(s) apart, \
                     amount difference {amount_diff}"
                ),
                key: format!("HEUR_{}_{}", bank_record.id, ledger_record.id),
            });

            claimed_ledger.insert(ledger_record.id.clone());
            // First fit wins; move on to the next bank record
            break;
        }
    }

    matches
}

/// Confidence for a heuristic pair: date and amount penalties scaled by the
/// text similarity ratio, clamped into [0, 100]
fn heuristic_confidence(days: i64, amount_diff: f64, similarity: f64) -> f64 {
    let base = clamp_confidence(100.0 - days as f64 * 5.0 - amount_diff * 10.0);
    clamp_confidence(base * (similarity / 100.0))
}

/// 1:N installment detection
///
/// Declared for pipeline completeness but returns no matches; installment
/// splitting has not shown up in production data, while N:1 consolidation is
/// covered by the combinatorial layer.
fn match_installments(_bank: &[&Record], _ledger: &[&Record], _config: &MatchingConfig) -> Vec<Match> {
    Vec::new()
}

/// N:1 heuristic consolidation, superseded by the combinatorial layer
fn match_consolidations(
    _bank: &[&Record],
    _ledger: &[&Record],
    _config: &MatchingConfig,
) -> Vec<Match> {
    Vec::new()
}
