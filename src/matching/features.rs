//! Per-record feature extraction for the semantic matching layer
//!
//! Features are deterministic rule-based signals: a stop-word-filtered
//! keyword set, transaction-type and payment-method classes from ordered
//! pattern lists, entities picked out of the description, and an amount
//! bucket. There is no trained model anywhere in this layer.

use std::collections::BTreeSet;

use bigdecimal::BigDecimal;
use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Transaction type inferred from the description, first matching pattern wins
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TransactionType {
    Pix,
    Transfer,
    Slip,
    Card,
    Withdrawal,
    Deposit,
    Supplier,
    Customer,
    Tax,
    Other,
}

/// Payment method inferred from the description
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PaymentMethod {
    Pix,
    CreditCard,
    DebitCard,
    Slip,
    Ted,
    Doc,
    Cash,
    Unknown,
}

/// Value range bucket for an absolute amount
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AmountBucket {
    /// Below 100 currency units
    Small,
    /// Below 1 000
    Medium,
    /// Below 10 000
    Large,
    VeryLarge,
}

impl AmountBucket {
    pub fn from_amount(amount: &BigDecimal) -> Self {
        let abs = amount.abs();
        if abs < BigDecimal::from(100) {
            AmountBucket::Small
        } else if abs < BigDecimal::from(1000) {
            AmountBucket::Medium
        } else if abs < BigDecimal::from(10000) {
            AmountBucket::Large
        } else {
            AmountBucket::VeryLarge
        }
    }
}

/// Named entities extracted from a description
///
/// Empty strings mean the entity was not found, mirroring the identifier
/// sentinel convention.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entities {
    pub bank: String,
    pub company: String,
    pub person: String,
    pub place: String,
}

impl Entities {
    fn slots<'a>(&'a self, other: &'a Entities) -> [(&'a str, &'a str); 4] {
        [
            (self.bank.as_str(), other.bank.as_str()),
            (self.company.as_str(), other.company.as_str()),
            (self.person.as_str(), other.person.as_str()),
            (self.place.as_str(), other.place.as_str()),
        ]
    }

    /// Number of populated entity slots
    pub fn populated(&self) -> usize {
        [&self.bank, &self.company, &self.person, &self.place]
            .iter()
            .filter(|v| !v.is_empty())
            .count()
    }
}

/// Full feature set for one record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SemanticFeatures {
    pub keywords: BTreeSet<String>,
    pub transaction_type: TransactionType,
    pub payment_method: PaymentMethod,
    pub entities: Entities,
    pub amount_bucket: AmountBucket,
}

lazy_static! {
    static ref KEYWORD_PATTERN: Regex = Regex::new(r"\b[a-z]{3,}\b").unwrap();

    static ref TYPE_PATTERNS: Vec<(TransactionType, Regex)> = vec![
        (TransactionType::Pix, Regex::new(r"pix").unwrap()),
        (TransactionType::Transfer, Regex::new(r"transfer[eê]ncia|\bted\b|\bdoc\b").unwrap()),
        (TransactionType::Slip, Regex::new(r"boleto|fatura").unwrap()),
        (TransactionType::Card, Regex::new(r"cart[aã]o|d[eé]bito|cr[eé]dito").unwrap()),
        (TransactionType::Withdrawal, Regex::new(r"saque|retirada").unwrap()),
        (TransactionType::Deposit, Regex::new(r"dep[oó]sito").unwrap()),
        (TransactionType::Supplier, Regex::new(r"fornecedor|compra|mercadoria").unwrap()),
        (TransactionType::Customer, Regex::new(r"cliente|venda|recebimento").unwrap()),
        (TransactionType::Tax, Regex::new(r"imposto|taxa|tributo|contribui").unwrap()),
    ];

    static ref METHOD_PATTERNS: Vec<(PaymentMethod, Regex)> = vec![
        (PaymentMethod::Pix, Regex::new(r"pix").unwrap()),
        (PaymentMethod::CreditCard, Regex::new(r"cart[aã]o\s+de\s+cr[eé]dito").unwrap()),
        (PaymentMethod::DebitCard, Regex::new(r"cart[aã]o\s+de\s+d[eé]bito").unwrap()),
        (PaymentMethod::Slip, Regex::new(r"boleto").unwrap()),
        (PaymentMethod::Ted, Regex::new(r"\bted\b").unwrap()),
        (PaymentMethod::Doc, Regex::new(r"\bdoc\b").unwrap()),
        (PaymentMethod::Cash, Regex::new(r"dinheiro").unwrap()),
    ];

    static ref COMPANY_PATTERN: Regex =
        Regex::new(r"([A-Z][A-Za-z]+\s+[A-Z][A-Za-z]+)\s+(LTDA|S/A|SA|ME|EPP)").unwrap();

    static ref PERSON_PATTERN: Regex =
        Regex::new(r"[A-Z][a-z]+\s+[A-Z][a-z]+(\s+[A-Z][a-z]+)?").unwrap();
}

const STOPWORDS: [&str; 14] = [
    "de", "a", "o", "que", "e", "do", "da", "em", "um", "para", "com", "nao", "uma", "dos",
];

const BANK_NAMES: [&str; 11] = [
    "itau", "itaú", "bradesco", "santander", "banco do brasil", "bb", "caixa", "nubank", "inter",
    "c6", "next",
];

const PLACE_KEYWORDS: [&str; 8] = [
    "shopping", "centro", "avenida", "av.", "rua", "praça", "mercado", "supermercado",
];

/// Extract the full feature set from a description and signed amount
pub fn extract_features(description: &str, amount: &BigDecimal) -> SemanticFeatures {
    let lower = description.to_lowercase();

    SemanticFeatures {
        keywords: extract_keywords(&lower),
        transaction_type: classify_transaction_type(&lower),
        payment_method: classify_payment_method(&lower),
        entities: extract_entities(description, &lower),
        amount_bucket: AmountBucket::from_amount(amount),
    }
}

/// Significant lowercase tokens of at least three characters
fn extract_keywords(lower: &str) -> BTreeSet<String> {
    KEYWORD_PATTERN
        .find_iter(lower)
        .map(|m| m.as_str().to_string())
        .filter(|word| !STOPWORDS.contains(&word.as_str()))
        .collect()
}

fn classify_transaction_type(lower: &str) -> TransactionType {
    for (kind, pattern) in TYPE_PATTERNS.iter() {
        if pattern.is_match(lower) {
            return *kind;
        }
    }
    TransactionType::Other
}

fn classify_payment_method(lower: &str) -> PaymentMethod {
    for (method, pattern) in METHOD_PATTERNS.iter() {
        if pattern.is_match(lower) {
            return *method;
        }
    }
    PaymentMethod::Unknown
}

/// Pick out bank, company, person, and place entities
///
/// Company and person patterns are case-sensitive and run on the original
/// text; bank and place lookups run on the lowercased text.
fn extract_entities(original: &str, lower: &str) -> Entities {
    let bank = BANK_NAMES
        .iter()
        .find(|name| lower.contains(*name))
        .map(|name| name.to_string())
        .unwrap_or_default();

    let company = COMPANY_PATTERN
        .captures(original)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_string())
        .unwrap_or_default();

    let person = if company.is_empty() {
        PERSON_PATTERN
            .find(original)
            .map(|m| m.as_str().to_string())
            .unwrap_or_default()
    } else {
        String::new()
    };

    let place = PLACE_KEYWORDS
        .iter()
        .find(|keyword| lower.contains(*keyword))
        .map(|keyword| keyword.to_string())
        .unwrap_or_default();

    Entities {
        bank,
        company,
        person,
        place,
    }
}

/// Keyword-set overlap ratio in [0, 100]; empty sets carry no signal
pub fn keyword_overlap(a: &BTreeSet<String>, b: &BTreeSet<String>) -> f64 {
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }
    let common = a.intersection(b).count();
    common as f64 / a.len().max(b.len()) as f64 * 100.0
}

/// Entity overlap ratio in [0, 100]: equal populated slots over the larger
/// populated count
pub fn entity_overlap(a: &Entities, b: &Entities) -> f64 {
    let len_a = a.populated();
    let len_b = b.populated();
    if len_a == 0 || len_b == 0 {
        return 0.0;
    }

    let common = a
        .slots(b)
        .iter()
        .filter(|(va, vb)| !va.is_empty() && !vb.is_empty() && va == vb)
        .count();

    common as f64 / len_a.max(len_b) as f64 * 100.0
}

/// Entity compatibility in [0, 100]: equal slots over all slots populated on
/// either side
pub fn entity_compatibility(a: &Entities, b: &Entities) -> f64 {
    let mut compatible = 0usize;
    let mut total = 0usize;

    for (va, vb) in a.slots(b) {
        match (!va.is_empty(), !vb.is_empty()) {
            (true, true) => {
                total += 1;
                if va == vb {
                    compatible += 1;
                }
            }
            (true, false) | (false, true) => total += 1,
            (false, false) => {}
        }
    }

    if total == 0 {
        return 0.0;
    }
    compatible as f64 / total as f64 * 100.0
}

/// Amount closeness in [0, 100] from the relative difference
///
/// Two zero amounts are trivially identical, so the zero denominator maps to
/// full closeness rather than an error.
pub fn amount_closeness(a: f64, b: f64) -> f64 {
    let max = a.abs().max(b.abs());
    if max == 0.0 {
        return 100.0;
    }
    (100.0 - (a.abs() - b.abs()).abs() / max * 100.0).max(0.0)
}

/// Date closeness in [0, 100], losing five points per day apart
pub fn date_closeness(days: i64) -> f64 {
    (100.0 - days as f64 * 5.0).max(0.0)
}

/// Parse helper for bucket thresholds expressed as strings in tests
#[cfg(test)]
pub(crate) fn dec(value: &str) -> BigDecimal {
    use std::str::FromStr;
    BigDecimal::from_str(value).unwrap()
}
