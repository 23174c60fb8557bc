//! Core types and data structures for the reconciliation engine

use bigdecimal::BigDecimal;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Origin side of a record within a reconciliation run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    /// Bank statement movement
    Bank,
    /// Accounting ledger entry
    Ledger,
}

impl Side {
    /// Human-readable label used in rationales and exception descriptions
    pub fn label(&self) -> &'static str {
        match self {
            Side::Bank => "bank",
            Side::Ledger => "ledger",
        }
    }
}

/// Structured identifiers extracted from a record's free-text description
///
/// Absent identifiers are represented by the empty string rather than
/// `Option` so that downstream equality checks stay total.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identifiers {
    /// Instant-payment network transaction id (PIX TXID)
    pub txid: String,
    /// Card-acquirer network sequence number
    pub nsu: String,
    /// Bank-slip issuer reference ("nosso número")
    pub slip_reference: String,
    /// National tax id (CPF/CNPJ)
    pub tax_id: String,
}

impl Identifiers {
    /// True when no identifier class is populated
    pub fn is_empty(&self) -> bool {
        self.txid.is_empty()
            && self.nsu.is_empty()
            && self.slip_reference.is_empty()
            && self.tax_id.is_empty()
    }
}

/// The identifier classes the exact layer matches on, in matching order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum IdentifierClass {
    Txid,
    Nsu,
    SlipReference,
    TaxId,
}

impl IdentifierClass {
    /// All classes in the order the exact layer examines them
    pub const ALL: [IdentifierClass; 4] = [
        IdentifierClass::Txid,
        IdentifierClass::Nsu,
        IdentifierClass::SlipReference,
        IdentifierClass::TaxId,
    ];

    /// Short label used in match keys and rationales
    pub fn label(&self) -> &'static str {
        match self {
            IdentifierClass::Txid => "TXID",
            IdentifierClass::Nsu => "NSU",
            IdentifierClass::SlipReference => "SLIP",
            IdentifierClass::TaxId => "TAXID",
        }
    }

    /// Read the value for this class out of an [`Identifiers`] set
    pub fn value<'a>(&self, identifiers: &'a Identifiers) -> &'a str {
        match self {
            IdentifierClass::Txid => &identifiers.txid,
            IdentifierClass::Nsu => &identifiers.nsu,
            IdentifierClass::SlipReference => &identifiers.slip_reference,
            IdentifierClass::TaxId => &identifiers.tax_id,
        }
    }
}

/// A single statement or ledger record as supplied by the ingestion step
///
/// Records are immutable once constructed; the engine never mutates them,
/// it only computes filtered "still unmatched" subsets between layers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    /// Unique identifier within the record's side
    pub id: String,
    /// Date the movement or entry was booked
    pub date: NaiveDate,
    /// Signed amount (negative for outflows on the bank side)
    pub amount: BigDecimal,
    /// Free-text description, possibly empty
    pub description: String,
    /// Structured identifiers extracted from the description
    #[serde(default)]
    pub identifiers: Identifiers,
}

impl Record {
    /// Create a record with no extracted identifiers
    pub fn new(id: String, date: NaiveDate, amount: BigDecimal, description: String) -> Self {
        Self {
            id,
            date,
            amount,
            description,
            identifiers: Identifiers::default(),
        }
    }

    /// Absolute amount, the quantity all matching layers compare on
    pub fn amount_abs(&self) -> BigDecimal {
        self.amount.abs()
    }
}

/// A bank statement movement
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BankTransaction {
    pub record: Record,
}

impl BankTransaction {
    pub fn new(record: Record) -> Self {
        Self { record }
    }
}

/// An accounting ledger entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LedgerEntry {
    pub record: Record,
}

impl LedgerEntry {
    pub fn new(record: Record) -> Self {
        Self { record }
    }
}

/// Cardinality of a match between the two sides
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MatchKind {
    /// One bank movement paired with one ledger entry
    OneToOne,
    /// One bank movement covering several ledger entries
    OneToMany,
    /// Several bank movements consolidated into one ledger entry
    ManyToOne,
}

impl MatchKind {
    pub fn label(&self) -> &'static str {
        match self {
            MatchKind::OneToOne => "1:1",
            MatchKind::OneToMany => "1:N",
            MatchKind::ManyToOne => "N:1",
        }
    }

    /// Derive the kind from the number of records on each side
    pub fn from_counts(bank_count: usize, ledger_count: usize) -> Self {
        if bank_count > 1 && ledger_count == 1 {
            MatchKind::ManyToOne
        } else if bank_count == 1 && ledger_count > 1 {
            MatchKind::OneToMany
        } else {
            MatchKind::OneToOne
        }
    }
}

/// The matching layer that produced a match, in pipeline order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MatchLayer {
    Exact,
    Heuristic,
    Combinatorial,
    Semantic,
}

impl MatchLayer {
    pub fn as_str(&self) -> &'static str {
        match self {
            MatchLayer::Exact => "exact",
            MatchLayer::Heuristic => "heuristic",
            MatchLayer::Combinatorial => "combinatorial",
            MatchLayer::Semantic => "semantic",
        }
    }

    /// Resolve a layer from its wire name
    ///
    /// Unknown names map to `None`; callers decide how to treat them.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "exact" => Some(MatchLayer::Exact),
            "heuristic" => Some(MatchLayer::Heuristic),
            "combinatorial" => Some(MatchLayer::Combinatorial),
            "semantic" => Some(MatchLayer::Semantic),
            _ => None,
        }
    }
}

/// A pairing between bank movements and ledger entries produced by one layer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Match {
    /// Cardinality of the pairing
    pub kind: MatchKind,
    /// Layer that produced the pairing
    pub layer: MatchLayer,
    /// Ids of the bank movements involved
    pub bank_ids: Vec<String>,
    /// Ids of the ledger entries involved
    pub ledger_ids: Vec<String>,
    /// Summed absolute amount of the relevant side
    pub total: BigDecimal,
    /// Certainty score in [0, 100]
    pub confidence: f64,
    /// Human-readable explanation of why the records were paired
    pub rationale: String,
    /// Deterministic unique key for the match
    pub key: String,
}

/// Severity assigned to an exception for review prioritization
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ExceptionSeverity {
    High,
    Medium,
    Low,
}

/// Category of a reconciliation exception
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ExceptionCategory {
    /// A bank movement no ledger entry could be paired with
    BankWithoutLedger,
    /// A ledger entry no bank movement could be paired with
    LedgerWithoutBank,
}

impl ExceptionCategory {
    pub fn label(&self) -> &'static str {
        match self {
            ExceptionCategory::BankWithoutLedger => "bank movement without ledger entry",
            ExceptionCategory::LedgerWithoutBank => "ledger entry without bank movement",
        }
    }
}

/// A record left unmatched by every layer, flagged for human review
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Exception {
    pub category: ExceptionCategory,
    pub severity: ExceptionSeverity,
    /// Description of the divergence, including the record's own description
    pub description: String,
    /// Ids of the records involved (always exactly one in the current design)
    pub record_ids: Vec<String>,
    /// Suggested next step for the reviewer
    pub suggested_action: String,
}

/// Per-layer counters for one pipeline run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayerStats {
    pub bank_records: usize,
    pub ledger_records: usize,
    pub exact_matches: usize,
    pub heuristic_matches: usize,
    pub combinatorial_matches: usize,
    pub semantic_matches: usize,
    pub unmatched_bank: usize,
    pub unmatched_ledger: usize,
    pub exceptions: usize,
}

impl LayerStats {
    /// Total matches across all layers
    pub fn total_matches(&self) -> usize {
        self.exact_matches + self.heuristic_matches + self.combinatorial_matches
            + self.semantic_matches
    }

    /// Share of bank records claimed by some match, in [0, 100]
    pub fn match_rate(&self) -> f64 {
        if self.bank_records == 0 {
            return 0.0;
        }
        let matched = self.bank_records.saturating_sub(self.unmatched_bank);
        matched as f64 / self.bank_records as f64 * 100.0
    }
}

/// Aggregated output of one reconciliation run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineResult {
    /// Matches in layer order, stable within each layer
    pub matches: Vec<Match>,
    /// One exception per record no layer could pair
    pub exceptions: Vec<Exception>,
    /// Per-layer counters
    pub stats: LayerStats,
}

/// Errors that can occur in the reconciliation engine
#[derive(Debug, thiserror::Error)]
pub enum ReconError {
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("Invalid record: {0}")]
    InvalidRecord(String),
    #[error("Duplicate {side} record id: {id}")]
    DuplicateRecordId { side: &'static str, id: String },
    #[error("Record source error: {0}")]
    Source(String),
}

/// Result type for reconciliation operations
pub type ReconResult<T> = Result<T, ReconError>;
