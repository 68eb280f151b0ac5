//! CSV ingestion for the historical dataset.
//!
//! Expected header:
//!   transaction_id,merchant_id,user_id,card_number,transaction_date,
//!   transaction_amount,device_id,has_cbk
//!
//! Only user_id, transaction_date, transaction_amount and has_cbk feed the
//! engine; transaction_id is kept for error messages, other columns are ignored.
//!
//! Rows are validated here, not in the engine. A single bad row rejects
//! the whole file so the engine never sees a partial batch.

use crate::{
    error::{GuardError, GuardResult},
    store::TransactionStore,
    types::{parse_date, Transaction, UserId},
};
use serde::Deserialize;
use std::io::Read;
use std::path::Path;

#[derive(Debug, Deserialize)]
struct CsvRow {
    #[serde(default)]
    transaction_id: Option<i64>,
    user_id: UserId,
    transaction_date: String,
    transaction_amount: f64,
    has_cbk: String,
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim() {
        "True" | "true" | "TRUE" | "1" => Some(true),
        "False" | "false" | "FALSE" | "0" => Some(false),
        _ => None,
    }
}

impl CsvRow {
    fn into_transaction(self, line: u64) -> GuardResult<Transaction> {
        let id = self.transaction_id;
        let malformed = |reason: String| GuardError::MalformedRow {
            line,
            reason: match id {
                Some(id) => format!("transaction {id}: {reason}"),
                None => reason,
            },
        };

        let date = parse_date(&self.transaction_date)
            .ok_or_else(|| malformed(format!("unparseable date '{}'", self.transaction_date)))?;
        let has_chargeback = parse_flag(&self.has_cbk)
            .ok_or_else(|| malformed(format!("unrecognised has_cbk '{}'", self.has_cbk)))?;
        if !self.transaction_amount.is_finite() || self.transaction_amount < 0.0 {
            return Err(malformed(format!("invalid amount {}", self.transaction_amount)));
        }
        Ok(Transaction::new(self.user_id, self.transaction_amount, date, has_chargeback))
    }
}

/// Parse transactions from any CSV reader, ingestion order preserved.
pub fn read_transactions<R: Read>(reader: R) -> GuardResult<Vec<Transaction>> {
    let mut rdr = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);
    let mut txns = Vec::new();
    for (idx, record) in rdr.deserialize::<CsvRow>().enumerate() {
        // Header is line 1.
        let line = idx as u64 + 2;
        txns.push(record?.into_transaction(line)?);
    }
    Ok(txns)
}

/// Load a CSV file into a fresh store.
pub fn load_csv(path: impl AsRef<Path>) -> GuardResult<TransactionStore> {
    let path = path.as_ref();
    let file = std::fs::File::open(path)?;
    let txns = read_transactions(file)?;
    log::info!("ingest: loaded {} transactions from {}", txns.len(), path.display());
    Ok(TransactionStore::from_transactions(txns))
}
