//! # Recon Core
//!
//! A multi-layer bank reconciliation engine: matches bank-statement
//! transactions against accounting-ledger entries and flags unresolved items
//! for human review.
//!
//! ## Matching layers
//!
//! - **Exact**: identifier-based (PIX TXID, NSU, slip reference, tax id) and
//!   exact amount/date pairing
//! - **Heuristic**: tolerance-based greedy pairing with text similarity
//! - **Combinatorial**: subset-sum search detecting N:1 consolidations
//! - **Semantic**: weighted feature-similarity scoring with global
//!   best-candidate selection
//!
//! Records no layer could pair become [`Exception`]s for manual review.
//! All scoring is deterministic rule evaluation; there is no trained model.
//!
//! ## Quick Start
//!
//! ```rust
//! use recon_core::{BankTransaction, LedgerEntry, MatchingConfig, ReconciliationEngine, Record};
//! use bigdecimal::BigDecimal;
//! use chrono::NaiveDate;
//! use std::str::FromStr;
//!
//! let date = NaiveDate::from_ymd_opt(2024, 1, 5).unwrap();
//! let bank = vec![BankTransaction::new(Record::new(
//!     "b1".to_string(),
//!     date,
//!     BigDecimal::from_str("-150.00").unwrap(),
//!     "SUPERMERCADO ABC".to_string(),
//! ))];
//! let ledger = vec![LedgerEntry::new(Record::new(
//!     "l1".to_string(),
//!     date,
//!     BigDecimal::from_str("150.00").unwrap(),
//!     "COMPRA SUPERMERCADO ABC".to_string(),
//! ))];
//!
//! let engine = ReconciliationEngine::new(MatchingConfig::default());
//! let result = engine.reconcile(&bank, &ledger).unwrap();
//! assert_eq!(result.matches.len(), 1);
//! assert!(result.exceptions.is_empty());
//! ```

pub mod config;
pub mod exceptions;
pub mod matching;
pub mod pipeline;
pub mod traits;
pub mod types;
pub mod utils;

// Re-export commonly used types
pub use config::MatchingConfig;
pub use pipeline::ReconciliationEngine;
pub use traits::*;
pub use types::*;

// Re-export the feature vocabulary for downstream reporting
pub use matching::features::{AmountBucket, PaymentMethod, TransactionType};
