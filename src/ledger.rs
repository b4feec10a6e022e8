//! Append-only transaction ledger.

use crate::model::TransactionRecord;

/// Ordered list of every attempted operation, oldest first.
///
/// Records are only ever appended; nothing is reordered, deduplicated or
/// evicted.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Ledger {
    records: Vec<TransactionRecord>,
}

impl Ledger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&mut self, record: TransactionRecord) {
        self.records.push(record);
    }

    /// The most recent `k` records in chronological order.
    pub fn last_n(&self, k: usize) -> &[TransactionRecord] {
        let start = self.records.len().saturating_sub(k);
        &self.records[start..]
    }

    pub fn records(&self) -> &[TransactionRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl From<Vec<TransactionRecord>> for Ledger {
    fn from(records: Vec<TransactionRecord>) -> Self {
        Self { records }
    }
}
