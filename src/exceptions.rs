//! Exception building: converting final leftovers into reviewable divergences
//!
//! Every record still unmatched after the last matching layer becomes exactly
//! one exception, tagged by side and carrying a suggested action for the
//! reviewer. Leftovers are expected output of a run, not failures.

use crate::types::{Exception, ExceptionCategory, ExceptionSeverity, Record, Side};

/// Build one exception per leftover record on the given side
pub fn build_exceptions(records: &[&Record], side: Side) -> Vec<Exception> {
    records
        .iter()
        .map(|record| build_exception(record, side))
        .collect()
}

fn build_exception(record: &Record, side: Side) -> Exception {
    let (category, suggested_action) = match side {
        Side::Bank => (
            ExceptionCategory::BankWithoutLedger,
            "Check whether this is an unrecorded expense or unidentified income",
        ),
        Side::Ledger => (
            ExceptionCategory::LedgerWithoutBank,
            "Check for provisions, future-dated entries, or posting errors",
        ),
    };

    Exception {
        category,
        severity: ExceptionSeverity::High,
        description: format!(
            "{} ({} {} on {}: {})",
            category.label(),
            side.label(),
            record.id,
            record.date,
            if record.description.is_empty() {
                "no description"
            } else {
                &record.description
            }
        ),
        record_ids: vec![record.id.clone()],
        suggested_action: suggested_action.to_string(),
    }
}
