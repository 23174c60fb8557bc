//! Semantic/entity matching layer: weighted feature-similarity scoring
//!
//! Two passes run over the leftovers of the combinatorial layer. The pure
//! semantic pass scores every tolerable candidate pair with a weighted
//! feature blend and keeps the global best candidate per bank record; the
//! entity-led pass then re-examines the remainder through an
//! entity-compatibility pre-filter with a secondary three-way average.
//! Unlike the heuristic layer, candidate selection here is a global arg-max,
//! not first-fit.

use std::collections::HashSet;

use tracing::debug;

use crate::config::MatchingConfig;
use crate::matching::features::{
    amount_closeness, date_closeness, entity_compatibility, entity_overlap, extract_features,
    keyword_overlap, SemanticFeatures,
};
use crate::matching::{amount_difference, clamp_confidence, day_distance, to_f64};
use crate::types::{Match, MatchKind, MatchLayer, Record};

/// Weighted blend applied by the pure semantic pass
const KEYWORD_WEIGHT: f64 = 0.30;
const TYPE_WEIGHT: f64 = 0.20;
const METHOD_WEIGHT: f64 = 0.15;
const ENTITY_WEIGHT: f64 = 0.20;
const AMOUNT_WEIGHT: f64 = 0.10;
const DATE_WEIGHT: f64 = 0.05;

/// Minimum blended score for a pure semantic match
const SEMANTIC_THRESHOLD: f64 = 65.0;
/// Entity-compatibility pre-filter for the entity-led pass
const ENTITY_COMPATIBILITY_THRESHOLD: f64 = 75.0;
/// Minimum secondary average for an entity-led match
const ENTITY_CONFIDENCE_THRESHOLD: f64 = 70.0;

/// Run the semantic layer over the still-unmatched records of both sides
pub fn run(bank: &[&Record], ledger: &[&Record], config: &MatchingConfig) -> Vec<Match> {
    let bank_features: Vec<SemanticFeatures> = bank
        .iter()
        .map(|r| extract_features(&r.description, &r.amount))
        .collect();
    let ledger_features: Vec<SemanticFeatures> = ledger
        .iter()
        .map(|r| extract_features(&r.description, &r.amount))
        .collect();

    let mut claimed_bank: HashSet<String> = HashSet::new();
    let mut claimed_ledger: HashSet<String> = HashSet::new();

    let mut matches = semantic_pass(
        bank,
        ledger,
        &bank_features,
        &ledger_features,
        config,
        &mut claimed_bank,
        &mut claimed_ledger,
    );
    matches.extend(entity_pass(
        bank,
        ledger,
        &bank_features,
        &ledger_features,
        config,
        &mut claimed_bank,
        &mut claimed_ledger,
    ));
    matches.extend(match_temporal_patterns(bank, ledger));

    matches
}

/// Pure semantic pass: global best candidate per bank record
fn semantic_pass(
    bank: &[&Record],
    ledger: &[&Record],
    bank_features: &[SemanticFeatures],
    ledger_features: &[SemanticFeatures],
    config: &MatchingConfig,
    claimed_bank: &mut HashSet<String>,
    claimed_ledger: &mut HashSet<String>,
) -> Vec<Match> {
    let mut matches = Vec::new();

    for (bank_idx, bank_record) in bank.iter().enumerate() {
        let mut best: Option<(usize, f64)> = None;

        for (ledger_idx, ledger_record) in ledger.iter().enumerate() {
            if claimed_ledger.contains(&ledger_record.id) {
                continue;
            }
            if !within_tolerances(bank_record, ledger_record, config) {
                continue;
            }

            let score = semantic_score(
                &bank_features[bank_idx],
                &ledger_features[ledger_idx],
                bank_record,
                ledger_record,
            );

            // Strictly-greater keeps the earliest candidate on ties, which
            // keeps the pass deterministic
            if score >= SEMANTIC_THRESHOLD && best.map_or(true, |(_, s)| score > s) {
                best = Some((ledger_idx, score));
            }
        }

        if let Some((ledger_idx, score)) = best {
            let ledger_record = ledger[ledger_idx];
            claimed_bank.insert(bank_record.id.clone());
            claimed_ledger.insert(ledger_record.id.clone());
            debug!(bank_id = %bank_record.id, ledger_id = %ledger_record.id, score, "semantic pair accepted");

            matches.push(Match {
                kind: MatchKind::OneToOne,
                layer: MatchLayer::Semantic,
                bank_ids: vec![bank_record.id.clone()],
                ledger_ids: vec![ledger_record.id.clone()],
                total: bank_record.amount_abs(),
                confidence: clamp_confidence(score),
                rationale: format!("Semantic match (score {score:.1}%)"),
                key: format!("SEM_{}_{}", bank_record.id, ledger_record.id),
            });
        }
    }

    matches
}

/// Entity-led pass: compatibility pre-filter plus a secondary average over
/// entity, amount, and date closeness
fn entity_pass(
    bank: &[&Record],
    ledger: &[&Record],
    bank_features: &[SemanticFeatures],
    ledger_features: &[SemanticFeatures],
    config: &MatchingConfig,
    claimed_bank: &mut HashSet<String>,
    claimed_ledger: &mut HashSet<String>,
) -> Vec<Match> {
    let mut matches = Vec::new();

    for (bank_idx, bank_record) in bank.iter().enumerate() {
        if claimed_bank.contains(&bank_record.id) {
            continue;
        }

        for (ledger_idx, ledger_record) in ledger.iter().enumerate() {
            if claimed_ledger.contains(&ledger_record.id) {
                continue;
            }

            let compatibility = entity_compatibility(
                &bank_features[bank_idx].entities,
                &ledger_features[ledger_idx].entities,
            );
            if compatibility < ENTITY_COMPATIBILITY_THRESHOLD {
                continue;
            }
            if !within_tolerances(bank_record, ledger_record, config) {
                continue;
            }

            let confidence = entity_confidence(compatibility, bank_record, ledger_record);
            if confidence < ENTITY_CONFIDENCE_THRESHOLD {
                continue;
            }

            claimed_bank.insert(bank_record.id.clone());
            claimed_ledger.insert(ledger_record.id.clone());
            debug!(bank_id = %bank_record.id, ledger_id = %ledger_record.id, confidence, "entity pair accepted");

            matches.push(Match {
                kind: MatchKind::OneToOne,
                layer: MatchLayer::Semantic,
                bank_ids: vec![bank_record.id.clone()],
                ledger_ids: vec![ledger_record.id.clone()],
                total: bank_record.amount_abs(),
                confidence: clamp_confidence(confidence),
                rationale: format!("Entity match (compatibility {compatibility:.1}%)"),
                key: format!("ENT_{}_{}", bank_record.id, ledger_record.id),
            });
            break;
        }
    }

    matches
}

/// Basic amount/date tolerance gate shared by both passes
fn within_tolerances(bank_record: &Record, ledger_record: &Record, config: &MatchingConfig) -> bool {
    amount_difference(&bank_record.amount, &ledger_record.amount) <= config.amount_tolerance
        && day_distance(bank_record.date, ledger_record.date) <= config.date_tolerance_days
}

/// Weighted feature blend in [0, 100]
fn semantic_score(
    bank_features: &SemanticFeatures,
    ledger_features: &SemanticFeatures,
    bank_record: &Record,
    ledger_record: &Record,
) -> f64 {
    let keywords = keyword_overlap(&bank_features.keywords, &ledger_features.keywords);
    let type_match = if bank_features.transaction_type == ledger_features.transaction_type {
        100.0
    } else {
        0.0
    };
    let method_match = if bank_features.payment_method == ledger_features.payment_method {
        100.0
    } else {
        0.0
    };
    let entities = entity_overlap(&bank_features.entities, &ledger_features.entities);
    let amounts = amount_closeness(to_f64(&bank_record.amount), to_f64(&ledger_record.amount));
    let dates = date_closeness(day_distance(bank_record.date, ledger_record.date));

    keywords * KEYWORD_WEIGHT
        + type_match * TYPE_WEIGHT
        + method_match * METHOD_WEIGHT
        + entities * ENTITY_WEIGHT
        + amounts * AMOUNT_WEIGHT
        + dates * DATE_WEIGHT
}

/// Secondary confidence for the entity-led pass: the mean of compatibility,
/// amount closeness relative to the bank amount, and a capped date closeness
fn entity_confidence(compatibility: f64, bank_record: &Record, ledger_record: &Record) -> f64 {
    let bank_abs = to_f64(&bank_record.amount).abs();
    let ledger_abs = to_f64(&ledger_record.amount).abs();

    let amount_score = if bank_abs == 0.0 {
        if ledger_abs == 0.0 {
            100.0
        } else {
            0.0
        }
    } else {
        (100.0 - (bank_abs - ledger_abs).abs() / bank_abs * 100.0).max(0.0)
    };

    let days = day_distance(bank_record.date, ledger_record.date).min(10);
    let date_score = 100.0 - days as f64 * 10.0;

    (compatibility + amount_score + date_score) / 3.0
}

/// Temporal-pattern detection (monthly fees, recurring installments)
///
/// Declared for pipeline completeness but returns no matches; recurring
/// charges are already absorbed by the earlier layers on real data.
fn match_temporal_patterns(_bank: &[&Record], _ledger: &[&Record]) -> Vec<Match> {
    Vec::new()
}
