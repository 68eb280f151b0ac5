//! Shared primitive types used across the engine.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// A user identifier. Not unique per transaction.
pub type UserId = i64;

/// Date format used when a timestamp is written back out (ledger, JSON).
pub const DATE_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.f";

/// One historical payment. Immutable once ingested.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Transaction {
    pub user_id:        UserId,
    pub amount:         f64,
    pub date:           NaiveDateTime,
    pub has_chargeback: bool,
}

impl Transaction {
    pub fn new(user_id: UserId, amount: f64, date: NaiveDateTime, has_chargeback: bool) -> Self {
        Self { user_id, amount, date, has_chargeback }
    }
}

/// Round to two decimal places, the precision every reported figure uses.
/// Exact halves go to the even cent: 10.125 → 10.12, 10.375 → 10.38.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round_ties_even() / 100.0
}

/// Parse a timestamp in either `T`- or space-separated ISO form,
/// with or without fractional seconds.
pub fn parse_date(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
}
