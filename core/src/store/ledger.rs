//! SQLite copy of the historical dataset.
//!
//! RULE: Only this file talks to the database.
//! Rows are read back in insertion order so a reloaded store
//! resolves date ties exactly like the batch it was written from.

use super::TransactionStore;
use crate::{
    error::{GuardError, GuardResult},
    types::{parse_date, Transaction, DATE_FORMAT},
};
use rusqlite::{params, Connection};

pub struct TxnLedger {
    conn: Connection,
}

impl TxnLedger {
    /// Open (or create) the ledger database at `path`.
    pub fn open(path: &str) -> GuardResult<Self> {
        let conn = Connection::open(path)?;
        conn.execute_batch("PRAGMA journal_mode=WAL;")?;
        Ok(Self { conn })
    }

    /// Open an in-memory database (used in tests).
    pub fn in_memory() -> GuardResult<Self> {
        let conn = Connection::open_in_memory()?;
        Ok(Self { conn })
    }

    /// Apply all schema migrations in order.
    pub fn migrate(&self) -> GuardResult<()> {
        self.conn
            .execute_batch(include_str!("../../../migrations/001_transactions.sql"))?;
        Ok(())
    }

    /// Insert a batch inside one SQL transaction. Returns rows written.
    pub fn insert_transactions(&mut self, txns: &[Transaction]) -> GuardResult<usize> {
        let tx = self.conn.transaction()?;
        {
            let mut stmt = tx.prepare(
                "INSERT INTO txn (user_id, amount, txn_date, has_chargeback)
                 VALUES (?1, ?2, ?3, ?4)",
            )?;
            for t in txns {
                stmt.execute(params![
                    t.user_id,
                    t.amount,
                    t.date.format(DATE_FORMAT).to_string(),
                    t.has_chargeback as i32,
                ])?;
            }
        }
        tx.commit()?;
        log::info!("ledger: wrote {} transactions", txns.len());
        Ok(txns.len())
    }

    pub fn count(&self) -> GuardResult<i64> {
        let n: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM txn", [], |row| row.get(0))?;
        Ok(n)
    }

    /// Rebuild an in-memory store from every row, insertion order.
    pub fn load_store(&self) -> GuardResult<TransactionStore> {
        let mut stmt = self.conn.prepare(
            "SELECT id, user_id, amount, txn_date, has_chargeback
             FROM txn ORDER BY id ASC",
        )?;
        let rows = stmt
            .query_map([], |row| {
                Ok((
                    row.get::<_, i64>(0)?,
                    row.get::<_, i64>(1)?,
                    row.get::<_, f64>(2)?,
                    row.get::<_, String>(3)?,
                    row.get::<_, i32>(4)? != 0,
                ))
            })?
            .collect::<Result<Vec<_>, _>>()?;

        let mut txns = Vec::with_capacity(rows.len());
        for (id, user_id, amount, raw_date, has_chargeback) in rows {
            let date = parse_date(&raw_date).ok_or_else(|| GuardError::MalformedRow {
                line:   id as u64,
                reason: format!("unparseable txn_date '{raw_date}'"),
            })?;
            txns.push(Transaction::new(user_id, amount, date, has_chargeback));
        }
        log::info!("ledger: loaded {} transactions", txns.len());
        Ok(TransactionStore::from_transactions(txns))
    }
}
