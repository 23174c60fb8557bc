//! Validation utilities

use std::collections::HashSet;

use crate::traits::{DefaultRecordValidator, RecordValidator};
use crate::types::{ReconError, ReconResult, Record, Side};

/// Validate one input batch: every record valid, every id unique within the side
pub fn validate_batch(records: &[Record], side: Side) -> ReconResult<()> {
    let validator = DefaultRecordValidator;
    let mut seen: HashSet<&str> = HashSet::with_capacity(records.len());

    for record in records {
        validator.validate_record(record)?;
        if !seen.insert(record.id.as_str()) {
            return Err(ReconError::DuplicateRecordId {
                side: side.label(),
                id: record.id.clone(),
            });
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use bigdecimal::BigDecimal;
    use chrono::NaiveDate;

    fn record(id: &str) -> Record {
        Record::new(
            id.to_string(),
            NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            BigDecimal::from(10),
            "X".to_string(),
        )
    }

    #[test]
    fn test_unique_ids_pass() {
        assert!(validate_batch(&[record("1"), record("2")], Side::Bank).is_ok());
    }

    #[test]
    fn test_duplicate_ids_rejected() {
        let err = validate_batch(&[record("1"), record("1")], Side::Ledger).unwrap_err();
        match err {
            ReconError::DuplicateRecordId { side, id } => {
                assert_eq!(side, "ledger");
                assert_eq!(id, "1");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_empty_id_rejected() {
        assert!(validate_batch(&[record("")], Side::Bank).is_err());
    }
}
