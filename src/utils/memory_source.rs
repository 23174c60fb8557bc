//! In-memory record source and result sink for testing and examples

use async_trait::async_trait;

use crate::traits::{RecordSource, ResultSink};
use crate::types::{BankTransaction, LedgerEntry, PipelineResult, ReconResult};

/// In-memory implementation of [`RecordSource`] and [`ResultSink`]
///
/// Holds pre-built batches and collects saved results; useful for tests and
/// for wiring the engine before a real ingestion backend exists.
#[derive(Debug, Default, Clone)]
pub struct MemorySource {
    bank: Vec<BankTransaction>,
    ledger: Vec<LedgerEntry>,
    saved: Vec<PipelineResult>,
}

impl MemorySource {
    /// Create a source over the given batches
    pub fn new(bank: Vec<BankTransaction>, ledger: Vec<LedgerEntry>) -> Self {
        Self {
            bank,
            ledger,
            saved: Vec::new(),
        }
    }

    /// Results saved through the [`ResultSink`] seam, oldest first
    pub fn saved_results(&self) -> &[PipelineResult] {
        &self.saved
    }
}

#[async_trait]
impl RecordSource for MemorySource {
    async fn fetch_bank_transactions(&self) -> ReconResult<Vec<BankTransaction>> {
        Ok(self.bank.clone())
    }

    async fn fetch_ledger_entries(&self) -> ReconResult<Vec<LedgerEntry>> {
        Ok(self.ledger.clone())
    }
}

#[async_trait]
impl ResultSink for MemorySource {
    async fn save_result(&mut self, result: &PipelineResult) -> ReconResult<()> {
        self.saved.push(result.clone());
        Ok(())
    }
}
