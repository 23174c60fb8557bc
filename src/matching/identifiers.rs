//! Identifier normalization: extracting structured identifiers from free text
//!
//! For each identifier class an ordered list of patterns is tried against the
//! record description; the first pattern that matches wins. Absence yields the
//! empty-string sentinel so downstream equality checks stay total.

use lazy_static::lazy_static;
use regex::Regex;

use crate::types::{Identifiers, Record};

lazy_static! {
    // Instant-payment (PIX) transaction ids: UUID-shaped, explicit TXID
    // prefix, or a bare 32-character id
    static ref TXID_PATTERNS: Vec<Regex> = vec![
        Regex::new(r"[A-Z0-9]{8}-[A-Z0-9]{4}-[A-Z0-9]{4}-[A-Z0-9]{4}-[A-Z0-9]{12}").unwrap(),
        Regex::new(r"TXID[:\s]*([A-Z0-9]+)").unwrap(),
        Regex::new(r"ID[:\s]*([A-Z0-9]{32})").unwrap(),
    ];

    // Card-acquirer sequence numbers
    static ref NSU_PATTERNS: Vec<Regex> = vec![
        Regex::new(r"NSU[:\s]*(\d{6,})").unwrap(),
        Regex::new(r"NS\s*(\d{6,})").unwrap(),
        Regex::new(r"(\d{6,})\s*NSU").unwrap(),
    ];

    // Bank-slip references ("nosso número")
    static ref SLIP_PATTERNS: Vec<Regex> = vec![
        Regex::new(r"NOSSO\s*N[ÚU]MERO[:\s]*(\d+)").unwrap(),
        Regex::new(r"NOSSO\s*NRO[:\s]*(\d+)").unwrap(),
        Regex::new(r"NN[:\s]*(\d+)").unwrap(),
    ];

    // National tax ids: formatted or bare CPF (11 digits), then CNPJ (14)
    static ref TAX_ID_PATTERNS: Vec<Regex> = vec![
        Regex::new(r"\d{3}\.\d{3}\.\d{3}-\d{2}").unwrap(),
        Regex::new(r"\d{2}\.\d{3}\.\d{3}/\d{4}-\d{2}").unwrap(),
        Regex::new(r"\d{14}").unwrap(),
        Regex::new(r"\d{11}").unwrap(),
    ];
}

/// Apply the ordered pattern list, returning the first capture or whole match
fn first_match(patterns: &[Regex], text: &str) -> String {
    for pattern in patterns {
        if let Some(captures) = pattern.captures(text) {
            let value = captures
                .get(1)
                .or_else(|| captures.get(0))
                .map(|m| m.as_str())
                .unwrap_or_default();
            if !value.is_empty() {
                return value.to_string();
            }
        }
    }
    String::new()
}

/// Extract all identifier classes from a free-text description
pub fn extract_identifiers(description: &str) -> Identifiers {
    if description.trim().is_empty() {
        return Identifiers::default();
    }

    // TXID/NSU/slip patterns are written against uppercase text; tax ids are
    // purely numeric and matched on the raw text
    let upper = description.to_uppercase();

    Identifiers {
        txid: first_match(&TXID_PATTERNS, &upper),
        nsu: first_match(&NSU_PATTERNS, &upper),
        slip_reference: first_match(&SLIP_PATTERNS, &upper),
        tax_id: first_match(&TAX_ID_PATTERNS, description),
    }
}

/// Fill in identifiers for a batch of records
///
/// Records whose identifiers were already populated by the ingestion step are
/// left untouched.
pub fn normalize_records(records: &mut [Record]) {
    for record in records.iter_mut() {
        if record.identifiers.is_empty() {
            record.identifiers = extract_identifiers(&record.description);
        }
    }
}
