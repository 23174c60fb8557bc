//! Combinatorial grouping layer: N:1 consolidation detection via subset-sum
//!
//! For each still-unmatched ledger entry the layer collects nearby bank
//! movements and searches for a combination of 2 to 5 of them whose summed
//! absolute amount lands within ±1% of the entry amount. This is the only
//! superlinear-cost component of the pipeline, so the candidate window, the
//! candidate count, and the total number of combinations evaluated are all
//! bounded.

use std::collections::HashSet;
use std::str::FromStr;

use bigdecimal::BigDecimal;
use tracing::debug;

use crate::config::MatchingConfig;
use crate::matching::day_distance;
use crate::types::{Match, MatchKind, MatchLayer, Record};

/// Smallest and largest group size the subset-sum search will consider
const MIN_GROUP_SIZE: usize = 2;
const MAX_GROUP_SIZE: usize = 5;

/// Run the combinatorial layer over the still-unmatched records of both sides
pub fn run(bank: &[&Record], ledger: &[&Record], config: &MatchingConfig) -> Vec<Match> {
    let mut matches = Vec::new();
    let mut claimed_bank: HashSet<String> = HashSet::new();
    let mut budget = config.max_group_combinations;

    // ±1% acceptance window around the ledger amount
    let low_factor = BigDecimal::from_str("0.99").unwrap_or_default();
    let high_factor = BigDecimal::from_str("1.01").unwrap_or_default();

    for ledger_record in ledger {
        if budget == 0 {
            debug!("combination budget exhausted, stopping group search");
            break;
        }

        let candidates = collect_candidates(bank, ledger_record, &claimed_bank, config);
        if candidates.len() < MIN_GROUP_SIZE {
            continue;
        }

        let target = ledger_record.amount_abs();
        let low = &target * &low_factor;
        let high = &target * &high_factor;

        let Some(chosen) = find_combination(&candidates, &low, &high, &mut budget) else {
            continue;
        };

        let bank_ids: Vec<String> = chosen.iter().map(|&i| candidates[i].id.clone()).collect();
        claimed_bank.extend(bank_ids.iter().cloned());
        debug!(
            ledger_id = %ledger_record.id,
            group_size = bank_ids.len(),
            "consolidation group accepted"
        );

        matches.push(Match {
            kind: MatchKind::ManyToOne,
            layer: MatchLayer::Combinatorial,
            rationale: format!(
                "Consolidation of {} bank movements summing to {} (within 1% of {})",
                bank_ids.len(),
                chosen
                    .iter()
                    .fold(BigDecimal::from(0), |acc, &i| acc + candidates[i].amount_abs()),
                target
            ),
            key: format!("GROUP_{}", ledger_record.id),
            bank_ids,
            ledger_ids: vec![ledger_record.id.clone()],
            total: target,
            confidence: 85.0,
        });
    }

    matches
}

/// Unclaimed bank records within twice the date tolerance of the ledger
/// entry, capped at the configured candidate count (nearest by date kept)
fn collect_candidates<'a>(
    bank: &[&'a Record],
    ledger_record: &Record,
    claimed_bank: &HashSet<String>,
    config: &MatchingConfig,
) -> Vec<&'a Record> {
    let window = config.date_tolerance_days * 2;

    let mut candidates: Vec<(usize, &Record)> = bank
        .iter()
        .enumerate()
        .filter(|(_, b)| {
            !claimed_bank.contains(&b.id) && day_distance(b.date, ledger_record.date) <= window
        })
        .map(|(idx, b)| (idx, *b))
        .collect();

    if candidates.len() > config.max_group_candidates {
        candidates.sort_by_key(|(idx, b)| (day_distance(b.date, ledger_record.date), *idx));
        candidates.truncate(config.max_group_candidates);
        // Restore input order so the search stays deterministic
        candidates.sort_by_key(|(idx, _)| *idx);
    }

    candidates.into_iter().map(|(_, b)| b).collect()
}

/// First combination of MIN..=MAX candidates whose abs-amount sum falls in
/// [low, high], enumerated size-ascending and lexicographically
fn find_combination(
    candidates: &[&Record],
    low: &BigDecimal,
    high: &BigDecimal,
    budget: &mut usize,
) -> Option<Vec<usize>> {
    let max_size = MAX_GROUP_SIZE.min(candidates.len());

    for size in MIN_GROUP_SIZE..=max_size {
        let mut chosen = Vec::with_capacity(size);
        if search(candidates, size, 0, &mut chosen, &BigDecimal::from(0), low, high, budget) {
            return Some(chosen);
        }
        if *budget == 0 {
            return None;
        }
    }

    None
}

#[allow(clippy::too_many_arguments)]
fn search(
    candidates: &[&Record],
    size: usize,
    start: usize,
    chosen: &mut Vec<usize>,
    sum: &BigDecimal,
    low: &BigDecimal,
    high: &BigDecimal,
    budget: &mut usize,
) -> bool {
    if chosen.len() == size {
        *budget = budget.saturating_sub(1);
        return sum >= low && sum <= high;
    }
    if *budget == 0 {
        return false;
    }

    let remaining = size - chosen.len();
    for idx in start..candidates.len() {
        if candidates.len() - idx < remaining {
            break;
        }

        chosen.push(idx);
        let next_sum = sum + candidates[idx].amount_abs();
        if search(candidates, size, idx + 1, chosen, &next_sum, low, high, budget) {
            return true;
        }
        chosen.pop();

        if *budget == 0 {
            return false;
        }
    }

    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn record(id: &str, day: u32, amount: &str) -> Record {
        Record::new(
            id.to_string(),
            NaiveDate::from_ymd_opt(2024, 3, day).unwrap(),
            BigDecimal::from_str(amount).unwrap(),
            format!("movimento {id}"),
        )
    }

    fn refs(records: &[Record]) -> Vec<&Record> {
        records.iter().collect()
    }

    #[test]
    fn test_triple_within_one_percent_is_grouped() {
        let config = MatchingConfig::default();
        let bank = vec![
            record("b1", 1, "-100.00"),
            record("b2", 2, "-100.00"),
            record("b3", 2, "-99.50"),
        ];
        let ledger = vec![record("l9", 1, "300.00")];

        let matches = run(&refs(&bank), &refs(&ledger), &config);
        assert_eq!(matches.len(), 1);
        let m = &matches[0];
        assert_eq!(m.kind, MatchKind::ManyToOne);
        assert_eq!(m.confidence, 85.0);
        assert_eq!(m.bank_ids.len(), 3);
        assert_eq!(m.total, BigDecimal::from_str("300.00").unwrap());
        assert_eq!(m.key, "GROUP_l9");
    }

    #[test]
    fn test_two_item_subsets_too_far_off_are_rejected() {
        let config = MatchingConfig::default();
        // Any pair sums to at most 200.00, 33% below the target
        let bank = vec![
            record("b1", 1, "-100.00"),
            record("b2", 2, "-100.00"),
        ];
        let ledger = vec![record("l9", 1, "300.00")];

        assert!(run(&refs(&bank), &refs(&ledger), &config).is_empty());
    }

    #[test]
    fn test_candidates_outside_widened_window_excluded() {
        let config = MatchingConfig::default();
        // Window is 2 * 2 = 4 days; b3 sits 10 days out
        let bank = vec![
            record("b1", 1, "-150.00"),
            record("b2", 2, "-150.00"),
            record("b3", 12, "-150.00"),
        ];
        let ledger = vec![record("l1", 2, "450.00")];

        assert!(run(&refs(&bank), &refs(&ledger), &config).is_empty());
    }

    #[test]
    fn test_claimed_movements_not_reused_across_groups() {
        let config = MatchingConfig::default();
        let bank = vec![
            record("b1", 1, "-100.00"),
            record("b2", 1, "-100.00"),
        ];
        // Both entries would consume the same pair; only the first may win
        let ledger = vec![record("l1", 1, "200.00"), record("l2", 1, "200.00")];

        let matches = run(&refs(&bank), &refs(&ledger), &config);
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].ledger_ids, vec!["l1".to_string()]);
    }

    #[test]
    fn test_combination_budget_stops_search() {
        let config = MatchingConfig {
            max_group_combinations: 1,
            ..MatchingConfig::default()
        };
        let bank = vec![
            record("b1", 1, "-100.00"),
            record("b2", 1, "-150.00"),
            record("b3", 1, "-200.00"),
        ];
        // The matching pair (b2, b3) is not the first combination evaluated
        let ledger = vec![record("l1", 1, "350.00")];

        assert!(run(&refs(&bank), &refs(&ledger), &config).is_empty());
    }
}
