//! Synthetic transaction histories for demos and property tests.
//!
//! Shape: per user, a run of purchases spaced minutes to days apart with
//! Pareto-distributed amounts and a configurable chargeback rate. Same seed
//! and parameters always yield the same batch.

use crate::{
    rng::SeededRng,
    types::{round2, Transaction, UserId},
};
use chrono::{Duration, NaiveDate, NaiveDateTime};

#[derive(Debug, Clone)]
pub struct SyntheticHistory {
    pub users:           u64,
    /// Inclusive bounds on rows per user.
    pub min_txns:        u64,
    pub max_txns:        u64,
    pub chargeback_rate: f64,
    pub start:           NaiveDateTime,
    /// Upper bound on the gap between consecutive rows, in minutes.
    pub max_gap_minutes: u64,
}

impl Default for SyntheticHistory {
    fn default() -> Self {
        Self {
            users:           50,
            min_txns:        1,
            max_txns:        12,
            chargeback_rate: 0.12,
            start:           NaiveDate::from_ymd_opt(2019, 11, 1)
                .and_then(|d| d.and_hms_opt(0, 0, 0))
                .unwrap_or_default(),
            max_gap_minutes: 3 * 24 * 60,
        }
    }
}

impl SyntheticHistory {
    /// Generate the batch. Users are interleaved by date, as a real feed is.
    pub fn generate(&self, seed: u64) -> Vec<Transaction> {
        let mut txns = Vec::new();
        for index in 0..self.users {
            let user_id = (index + 1) as UserId;
            let mut rng = SeededRng::for_stream(seed, index);
            let count = rng.range_inclusive(self.min_txns, self.max_txns.max(self.min_txns));
            let mut at = self.start + Duration::minutes(rng.range_inclusive(0, 24 * 60 - 1) as i64);
            let spender = rng.pareto(20.0, 2.0).min(2_000.0);
            for _ in 0..count {
                let amount = round2((spender * rng.pareto(1.0, 2.5)).min(10_000.0));
                let has_chargeback = rng.flag(self.chargeback_rate);
                txns.push(Transaction::new(user_id, amount, at, has_chargeback));
                let gap = rng.range_inclusive(1, self.max_gap_minutes.max(1));
                at += Duration::minutes(gap as i64);
            }
        }
        // Stable: within one instant, lower user ids come first.
        txns.sort_by_key(|t| t.date);
        log::debug!("sample: generated {} transactions for {} users", txns.len(), self.users);
        txns
    }
}
