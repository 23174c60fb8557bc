//! Exact matching layer: identifier-based and exact amount/date pairing
//!
//! Runs two steps in strict order, each step removing claimed ids before the
//! next: (1) grouping by each identifier class, any value populated on both
//! sides becomes a confidence-100 match; (2) a fallback pairing records with
//! identical absolute amount and identical date, emitted only when exactly
//! one candidate exists on the other side. Genuine ties are deliberately left
//! unresolved for later layers.

use std::collections::{BTreeMap, HashSet};

use tracing::debug;

use crate::matching::sum_abs;
use crate::types::{IdentifierClass, Match, MatchKind, MatchLayer, Record};

/// Run the exact layer over the still-unmatched records of both sides
pub fn run(bank: &[&Record], ledger: &[&Record]) -> Vec<Match> {
    let mut matches = Vec::new();
    let mut claimed_bank: HashSet<String> = HashSet::new();
    let mut claimed_ledger: HashSet<String> = HashSet::new();

    for class in IdentifierClass::ALL {
        let identifier_matches =
            match_by_identifier(class, bank, ledger, &mut claimed_bank, &mut claimed_ledger);
        debug!(
            class = class.label(),
            count = identifier_matches.len(),
            "identifier matching step complete"
        );
        matches.extend(identifier_matches);
    }

    let fallback = match_by_amount_and_date(bank, ledger, &mut claimed_bank, &mut claimed_ledger);
    debug!(count = fallback.len(), "amount/date fallback step complete");
    matches.extend(fallback);

    matches
}

/// Group both sides by a non-empty identifier value; any value populated on
/// both sides becomes one match claiming every grouped record
fn match_by_identifier(
    class: IdentifierClass,
    bank: &[&Record],
    ledger: &[&Record],
    claimed_bank: &mut HashSet<String>,
    claimed_ledger: &mut HashSet<String>,
) -> Vec<Match> {
    // BTreeMap keeps the value iteration order deterministic across runs
    let mut groups: BTreeMap<String, (Vec<usize>, Vec<usize>)> = BTreeMap::new();

    for (idx, record) in bank.iter().enumerate() {
        let value = class.value(&record.identifiers);
        if !value.is_empty() && !claimed_bank.contains(&record.id) {
            groups.entry(value.to_string()).or_default().0.push(idx);
        }
    }

    for (idx, record) in ledger.iter().enumerate() {
        let value = class.value(&record.identifiers);
        if !value.is_empty() && !claimed_ledger.contains(&record.id) {
            groups.entry(value.to_string()).or_default().1.push(idx);
        }
    }

    let mut matches = Vec::new();

    for (value, (bank_idxs, ledger_idxs)) in groups {
        if bank_idxs.is_empty() || ledger_idxs.is_empty() {
            continue;
        }

        let bank_ids: Vec<String> = bank_idxs.iter().map(|&i| bank[i].id.clone()).collect();
        let ledger_ids: Vec<String> = ledger_idxs.iter().map(|&i| ledger[i].id.clone()).collect();
        claimed_bank.extend(bank_ids.iter().cloned());
        claimed_ledger.extend(ledger_ids.iter().cloned());

        matches.push(Match {
            kind: MatchKind::from_counts(bank_ids.len(), ledger_ids.len()),
            layer: MatchLayer::Exact,
            total: sum_abs(bank_idxs.iter().map(|&i| bank[i])),
            confidence: 100.0,
            rationale: format!("Exact match on {} {}", class.label(), value),
            key: format!("{}_{}", class.label(), value),
            bank_ids,
            ledger_ids,
        });
    }

    matches
}

/// Fallback pairing by identical absolute amount and identical date
///
/// A match is emitted only when exactly one ledger candidate exists for the
/// bank record; ambiguous ties stay unresolved rather than guessed.
fn match_by_amount_and_date(
    bank: &[&Record],
    ledger: &[&Record],
    claimed_bank: &mut HashSet<String>,
    claimed_ledger: &mut HashSet<String>,
) -> Vec<Match> {
    let mut matches = Vec::new();

    for bank_record in bank {
        if claimed_bank.contains(&bank_record.id) {
            continue;
        }

        let amount_abs = bank_record.amount_abs();
        let candidates: Vec<&&Record> = ledger
            .iter()
            .filter(|l| {
                !claimed_ledger.contains(&l.id)
                    && l.date == bank_record.date
                    && l.amount_abs() == amount_abs
            })
            .collect();

        if candidates.len() != 1 {
            continue;
        }

        let ledger_record = *candidates[0];
        claimed_bank.insert(bank_record.id.clone());
        claimed_ledger.insert(ledger_record.id.clone());

        matches.push(Match {
            kind: MatchKind::OneToOne,
            layer: MatchLayer::Exact,
            bank_ids: vec![bank_record.id.clone()],
            ledger_ids: vec![ledger_record.id.clone()],
            total: amount_abs.clone(),
            confidence: 95.0,
            rationale: format!(
                "Exact match on absolute amount {} and date {}",
                amount_abs, bank_record.date
            ),
            key: format!("VALUE_DATE_{}_{}", amount_abs, bank_record.date),
        });
    }

    matches
}
