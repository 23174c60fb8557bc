//! Traits for the engine's external collaborators
//!
//! The engine never reads raw files and never persists anything itself;
//! ingestion and persistence sit behind these seams so the core can work with
//! any backend (database, parsed bank files, in-memory fixtures, etc.).

use async_trait::async_trait;

use crate::types::*;

/// Ingestion collaborator supplying the two immutable input batches
///
/// Implementations are expected to have already filtered out input defects
/// (unparsable dates or amounts) and applied any minimum-amount or
/// current-period filters; the engine consumes the batches as-is.
#[async_trait]
pub trait RecordSource: Send + Sync {
    /// Fetch the bank statement movements for the period under reconciliation
    async fn fetch_bank_transactions(&self) -> ReconResult<Vec<BankTransaction>>;

    /// Fetch the accounting ledger entries for the same period
    async fn fetch_ledger_entries(&self) -> ReconResult<Vec<LedgerEntry>>;
}

/// Downstream collaborator consuming a finished run
///
/// Report rendering, audit logging, and the manual-review workflow all live
/// behind this seam.
#[async_trait]
pub trait ResultSink: Send + Sync {
    /// Persist or forward the result of one reconciliation run
    async fn save_result(&mut self, result: &PipelineResult) -> ReconResult<()>;
}

/// Trait for implementing custom record validation rules
pub trait RecordValidator: Send + Sync {
    /// Validate a single record before it enters the engine
    fn validate_record(&self, record: &Record) -> ReconResult<()>;
}

/// Default record validator with basic rules
pub struct DefaultRecordValidator;

impl RecordValidator for DefaultRecordValidator {
    fn validate_record(&self, record: &Record) -> ReconResult<()> {
        if record.id.trim().is_empty() {
            return Err(ReconError::InvalidRecord(
                "Record id cannot be empty".to_string(),
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bigdecimal::BigDecimal;
    use chrono::NaiveDate;

    #[test]
    fn test_default_validator_rejects_blank_id() {
        let validator = DefaultRecordValidator;
        let record = Record::new(
            "  ".to_string(),
            NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            BigDecimal::from(10),
            "X".to_string(),
        );
        assert!(validator.validate_record(&record).is_err());
    }
}
