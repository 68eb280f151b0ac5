//! The Transaction Store: an in-memory batch of historical transactions.
//!
//! RULE: The store is append-only. Transactions are never edited in place,
//! and ingestion order is preserved so date ties resolve deterministically.
//! Every mutation bumps `version`, which invalidates derived features.

mod ledger;

pub use ledger::TxnLedger;

use crate::types::Transaction;
use chrono::NaiveDateTime;

#[derive(Debug, Clone, Default)]
pub struct TransactionStore {
    txns:    Vec<Transaction>,
    version: u64,
}

impl TransactionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_transactions(txns: Vec<Transaction>) -> Self {
        Self { txns, version: 0 }
    }

    /// Append a batch in ingestion order.
    pub fn extend<I: IntoIterator<Item = Transaction>>(&mut self, txns: I) {
        let before = self.txns.len();
        self.txns.extend(txns);
        if self.txns.len() != before {
            self.version += 1;
        }
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn len(&self) -> usize {
        self.txns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.txns.is_empty()
    }

    /// All transactions in ingestion order.
    pub fn transactions(&self) -> &[Transaction] {
        &self.txns
    }

    pub fn chargeback_count(&self) -> usize {
        self.txns.iter().filter(|t| t.has_chargeback).count()
    }

    /// Earliest and latest dates across the whole store.
    pub fn date_range(&self) -> Option<(NaiveDateTime, NaiveDateTime)> {
        let first = self.txns.first()?.date;
        Some(self.txns.iter().fold((first, first), |(lo, hi), t| {
            (lo.min(t.date), hi.max(t.date))
        }))
    }

}
