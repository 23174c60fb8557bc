//! Integration tests for recon-core

use bigdecimal::BigDecimal;
use chrono::NaiveDate;
use recon_core::{
    utils::MemorySource, BankTransaction, ExceptionCategory, LedgerEntry, MatchKind, MatchLayer,
    MatchingConfig, PipelineResult, ReconciliationEngine, Record, RecordSource, ResultSink,
};
use std::collections::HashSet;
use std::str::FromStr;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn dec(value: &str) -> BigDecimal {
    BigDecimal::from_str(value).unwrap()
}

fn bank(id: &str, date_: NaiveDate, amount: &str, description: &str) -> BankTransaction {
    BankTransaction::new(Record::new(
        id.to_string(),
        date_,
        dec(amount),
        description.to_string(),
    ))
}

fn ledger(id: &str, date_: NaiveDate, amount: &str, description: &str) -> LedgerEntry {
    LedgerEntry::new(Record::new(
        id.to_string(),
        date_,
        dec(amount),
        description.to_string(),
    ))
}

/// Every confidence stays in [0, 100] and no id is claimed twice, within a
/// layer or across layers, on a mixed workload exercising all four layers
#[test]
fn test_full_pipeline_invariants() {
    let engine = ReconciliationEngine::default();

    let bank_batch = vec![
        // Exact by TXID despite a large date gap
        bank("b1", date(2024, 5, 2), "-320.00", "PIX ENVIADO TXID: AAB1234XYZ"),
        // Exact by amount and date
        bank("b2", date(2024, 5, 3), "-150.00", "SUPERMERCADO ABC"),
        // Heuristic: close amount, one day off, same wording
        bank("b3", date(2024, 5, 6), "-89.99", "MENSALIDADE SISTEMA GESTAO"),
        // Combinatorial trio against l4
        bank("b4", date(2024, 5, 10), "-100.00", "PIX FORNECEDOR PARCELA UM"),
        bank("b5", date(2024, 5, 10), "-100.00", "PIX FORNECEDOR PARCELA DOIS"),
        bank("b6", date(2024, 5, 11), "-99.50", "PIX FORNECEDOR PARCELA TRES"),
        // Semantic: shared type, method, and keywords, but reordered wording
        // keeps the plain edit-distance similarity below the heuristic bar
        bank("b7", date(2024, 5, 20), "-450.01", "pix pagamento fornecedor acme materiais"),
        // Leftover
        bank("b8", date(2024, 5, 25), "-77.10", "TARIFA AVULSA"),
    ];
    let ledger_batch = vec![
        ledger("l1", date(2024, 5, 28), "320.00", "RECEBIMENTO TXID: AAB1234XYZ"),
        ledger("l2", date(2024, 5, 3), "150.00", "COMPRA SUPERMERCADO ABC"),
        ledger("l3", date(2024, 5, 7), "90.00", "MENSALIDADE SISTEMA GESTAO"),
        ledger("l4", date(2024, 5, 10), "300.00", "CONSOLIDADO FORNECEDOR"),
        ledger("l5", date(2024, 5, 20), "450.00", "acme materiais fornecedor pagamento via pix ref nf 1023"),
    ];

    let result = engine.reconcile(&bank_batch, &ledger_batch).unwrap();

    assert_eq!(result.stats.exact_matches, 2);
    assert_eq!(result.stats.heuristic_matches, 1);
    assert_eq!(result.stats.combinatorial_matches, 1);
    assert_eq!(result.stats.semantic_matches, 1);
    assert_eq!(result.stats.total_matches(), 5);
    assert_eq!(result.exceptions.len(), 1);
    assert_eq!(result.exceptions[0].record_ids, vec!["b8".to_string()]);

    for m in &result.matches {
        assert!((0.0..=100.0).contains(&m.confidence), "confidence {}", m.confidence);
    }

    let mut claimed_bank = HashSet::new();
    let mut claimed_ledger = HashSet::new();
    for m in &result.matches {
        for id in &m.bank_ids {
            assert!(claimed_bank.insert(id.clone()), "bank id {id} claimed twice");
        }
        for id in &m.ledger_ids {
            assert!(claimed_ledger.insert(id.clone()), "ledger id {id} claimed twice");
        }
    }
}

/// Matches appear in layer order: exact, heuristic, combinatorial, semantic
#[test]
fn test_matches_ordered_by_layer() {
    let engine = ReconciliationEngine::default();

    let bank_batch = vec![
        bank("b1", date(2024, 6, 3), "-150.00", "SUPERMERCADO ABC"),
        bank("b2", date(2024, 6, 6), "-89.99", "MENSALIDADE SISTEMA GESTAO"),
        bank("b3", date(2024, 6, 10), "-100.00", "PIX PARCELA UM"),
        bank("b4", date(2024, 6, 10), "-99.50", "PIX PARCELA DOIS"),
    ];
    let ledger_batch = vec![
        ledger("l1", date(2024, 6, 3), "150.00", "COMPRA SUPERMERCADO ABC"),
        ledger("l2", date(2024, 6, 7), "90.00", "MENSALIDADE SISTEMA GESTAO"),
        ledger("l3", date(2024, 6, 10), "199.50", "CONSOLIDADO PARCELAS"),
    ];

    let result = engine.reconcile(&bank_batch, &ledger_batch).unwrap();
    let layers: Vec<MatchLayer> = result.matches.iter().map(|m| m.layer).collect();
    assert_eq!(
        layers,
        vec![MatchLayer::Exact, MatchLayer::Heuristic, MatchLayer::Combinatorial]
    );
    assert_eq!(result.matches[2].kind, MatchKind::ManyToOne);
    assert_eq!(result.matches[2].total, dec("199.50"));
}

/// Shared non-empty identifier with identical absolute amount matches at
/// confidence 100 regardless of how far the dates sit apart
#[test]
fn test_identifier_match_ignores_date_distance() {
    let engine = ReconciliationEngine::default();

    let result = engine
        .reconcile(
            &[bank("b1", date(2024, 1, 2), "-512.33", "Compra cartao NSU 998877")],
            &[ledger("l1", date(2024, 11, 30), "512.33", "Venda cartao NSU 998877")],
        )
        .unwrap();

    assert_eq!(result.matches.len(), 1);
    assert_eq!(result.matches[0].confidence, 100.0);
    assert_eq!(result.matches[0].layer, MatchLayer::Exact);
    assert!(result.exceptions.is_empty());
}

/// Heuristic amount tolerance is a hard boundary: 0.02 passes, 0.021 does not
#[test]
fn test_amount_tolerance_boundary_through_pipeline() {
    let engine = ReconciliationEngine::new(MatchingConfig {
        amount_tolerance: dec("0.02"),
        ..MatchingConfig::default()
    });

    let within = engine
        .reconcile(
            &[bank("b1", date(2024, 7, 1), "-200.02", "ALUGUEL ESCRITORIO CENTRO")],
            &[ledger("l1", date(2024, 7, 1), "200.00", "ALUGUEL ESCRITORIO CENTRO")],
        )
        .unwrap();
    assert_eq!(within.matches.len(), 1);
    assert_eq!(within.matches[0].layer, MatchLayer::Heuristic);

    let beyond = engine
        .reconcile(
            &[bank("b1", date(2024, 7, 1), "-200.021", "ALUGUEL ESCRITORIO CENTRO")],
            &[ledger("l1", date(2024, 7, 1), "200.00", "ALUGUEL ESCRITORIO CENTRO")],
        )
        .unwrap();
    assert!(beyond.matches.is_empty());
    assert_eq!(beyond.exceptions.len(), 2);
}

/// Scenario: one unmatched bank movement becomes exactly one high-severity
/// exception referencing it
#[test]
fn test_bank_movement_without_ledger_entry() {
    let engine = ReconciliationEngine::default();
    let result = engine
        .reconcile(&[bank("2", date(2024, 2, 1), "-999.00", "X")], &[])
        .unwrap();

    assert!(result.matches.is_empty());
    assert_eq!(result.exceptions.len(), 1);
    let e = &result.exceptions[0];
    assert_eq!(e.category, ExceptionCategory::BankWithoutLedger);
    assert_eq!(e.record_ids, vec!["2".to_string()]);
}

/// Scenario: a near-sum triple groups against the ledger entry while the
/// 2-item subsets stay out of the 1% window
#[test]
fn test_consolidation_triple_within_one_percent() {
    let engine = ReconciliationEngine::default();
    let result = engine
        .reconcile(
            &[
                bank("b1", date(2024, 3, 1), "-100.00", "PIX A"),
                bank("b2", date(2024, 3, 1), "-100.00", "PIX B"),
                bank("b3", date(2024, 3, 2), "-99.50", "PIX C"),
            ],
            &[ledger("9", date(2024, 3, 1), "300.00", "CONSOLIDADO")],
        )
        .unwrap();

    assert_eq!(result.matches.len(), 1);
    let m = &result.matches[0];
    assert_eq!(m.kind, MatchKind::ManyToOne);
    assert_eq!(m.layer, MatchLayer::Combinatorial);
    assert_eq!(m.bank_ids.len(), 3);
    assert_eq!(m.confidence, 85.0);
    assert!(result.exceptions.is_empty());
}

/// Identical inputs and parameters produce identical ordered output
#[test]
fn test_pipeline_is_idempotent() {
    let engine = ReconciliationEngine::default();
    let bank_batch = vec![
        bank("b1", date(2024, 8, 1), "-55.00", "PIX PADARIA CENTRAL"),
        bank("b2", date(2024, 8, 2), "-120.00", "BOLETO NN: 4456 ENERGIA"),
        bank("b3", date(2024, 8, 9), "-14.90", "TARIFA PACOTE SERVICOS"),
    ];
    let ledger_batch = vec![
        ledger("l1", date(2024, 8, 2), "55.01", "PIX PADARIA CENTRAL"),
        ledger("l2", date(2024, 8, 20), "120.00", "BOLETO NN: 4456 ENERGIA"),
    ];

    let first = engine.reconcile(&bank_batch, &ledger_batch).unwrap();
    let second = engine.reconcile(&bank_batch, &ledger_batch).unwrap();
    assert_eq!(first, second);

    let keys: Vec<&str> = first.matches.iter().map(|m| m.key.as_str()).collect();
    let unique: HashSet<&str> = keys.iter().copied().collect();
    assert_eq!(keys.len(), unique.len());
}

/// PipelineResult survives a serde round trip unchanged
#[test]
fn test_result_serde_round_trip() {
    let engine = ReconciliationEngine::default();
    let result = engine
        .reconcile(
            &[bank("b1", date(2024, 1, 5), "-150.00", "SUPERMERCADO ABC")],
            &[ledger("l1", date(2024, 1, 5), "150.00", "COMPRA SUPERMERCADO ABC")],
        )
        .unwrap();

    let json = serde_json::to_string(&result).unwrap();
    let restored: PipelineResult = serde_json::from_str(&json).unwrap();
    assert_eq!(result, restored);
}

/// The engine composes with the async ingestion and sink seams
#[tokio::test]
async fn test_engine_with_memory_source_and_sink() {
    let mut source = MemorySource::new(
        vec![bank("b1", date(2024, 1, 5), "-150.00", "SUPERMERCADO ABC")],
        vec![ledger("l1", date(2024, 1, 5), "150.00", "COMPRA SUPERMERCADO ABC")],
    );

    let bank_batch = source.fetch_bank_transactions().await.unwrap();
    let ledger_batch = source.fetch_ledger_entries().await.unwrap();

    let engine = ReconciliationEngine::default();
    let result = engine.reconcile(&bank_batch, &ledger_batch).unwrap();
    assert_eq!(result.stats.total_matches(), 1);

    source.save_result(&result).await.unwrap();
    assert_eq!(source.saved_results().len(), 1);
    assert_eq!(source.saved_results()[0], result);
}
