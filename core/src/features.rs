//! Feature Engine: per-user behavioural aggregates.
//!
//! Derivation is a pure function of the store:
//!   1. Partition by user_id (ingestion order kept inside a partition).
//!   2. Stable-sort each partition by date, so ties keep ingestion order.
//!   3. Baseline = mean/max amount over the user's non-chargeback rows,
//!      rounded to 2dp, or 0 when every row is a chargeback.
//!   4. One forward pass carrying the chargeback count, the over-baseline
//!      count, the current over-baseline streak and a 3-row date lookback.
//!
//! Nothing is updated incrementally. A changed store means a new FeatureSet.

use crate::{
    store::TransactionStore,
    types::{round2, Transaction, UserId},
};
use serde::Serialize;
use std::collections::{BTreeMap, VecDeque};

/// How many rows back the timing feature looks.
pub const GAP_LOOKBACK: usize = 3;

/// Spending baseline from a user's non-chargeback history.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Baseline {
    pub mean_amount: f64,
    pub max_amount:  f64,
}

impl Baseline {
    fn from_history(rows: &[Transaction]) -> Self {
        let (count, sum, max) = rows
            .iter()
            .filter(|t| !t.has_chargeback)
            .fold((0usize, 0.0f64, f64::MIN), |(n, sum, max), t| {
                (n + 1, sum + t.amount, max.max(t.amount))
            });
        if count == 0 {
            return Self { mean_amount: 0.0, max_amount: 0.0 };
        }
        Self {
            mean_amount: round2(sum / count as f64),
            max_amount:  round2(max),
        }
    }
}

/// One historical transaction annotated with its running features.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FeatureRow {
    pub txn:                Transaction,
    /// Chargebacks up to and including this row.
    pub fraud_score:        u32,
    pub over_baseline:      bool,
    /// Over-baseline rows up to and including this row.
    pub mean_score:         u32,
    pub out_average_streak: u32,
    /// Minutes since the row GAP_LOOKBACK positions earlier.
    pub time_gap_3:         Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UserFeatures {
    pub user_id:  UserId,
    pub baseline: Baseline,
    /// Date ordered.
    pub rows:     Vec<FeatureRow>,
}

impl UserFeatures {
    fn derive(user_id: UserId, mut history: Vec<Transaction>) -> Self {
        // sort_by_key is stable: equal dates keep ingestion order.
        history.sort_by_key(|t| t.date);
        let baseline = Baseline::from_history(&history);

        let mut fraud_score = 0u32;
        let mut mean_score = 0u32;
        let mut streak = 0u32;
        let mut lookback: VecDeque<chrono::NaiveDateTime> = VecDeque::with_capacity(GAP_LOOKBACK);

        let rows = history
            .into_iter()
            .map(|txn| {
                let over_baseline = txn.amount > baseline.mean_amount;
                if txn.has_chargeback {
                    fraud_score += 1;
                }
                if over_baseline {
                    mean_score += 1;
                    streak += 1;
                } else {
                    streak = 0;
                }

                let time_gap_3 = if lookback.len() == GAP_LOOKBACK {
                    lookback.pop_front().map(|earlier| minutes_between(earlier, txn.date))
                } else {
                    None
                };
                lookback.push_back(txn.date);

                FeatureRow {
                    txn,
                    fraud_score,
                    over_baseline,
                    mean_score,
                    out_average_streak: streak,
                    time_gap_3,
                }
            })
            .collect();

        Self { user_id, baseline, rows }
    }

    /// Number of historical rows (`n` in the decision rules).
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// The most recent row by date.
    pub fn last(&self) -> Option<&FeatureRow> {
        self.rows.last()
    }
}

fn minutes_between(earlier: chrono::NaiveDateTime, later: chrono::NaiveDateTime) -> f64 {
    let delta = later - earlier;
    match delta.num_microseconds() {
        Some(us) => us as f64 / 60_000_000.0,
        None => delta.num_seconds() as f64 / 60.0,
    }
}

/// Features for every user in one store snapshot.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeatureSet {
    /// Store version this set was derived from.
    pub store_version: u64,
    users:             BTreeMap<UserId, UserFeatures>,
}

impl FeatureSet {
    pub fn derive(store: &TransactionStore) -> Self {
        let mut partitions: BTreeMap<UserId, Vec<Transaction>> = BTreeMap::new();
        for txn in store.transactions() {
            partitions.entry(txn.user_id).or_default().push(*txn);
        }

        let users: BTreeMap<UserId, UserFeatures> = partitions
            .into_iter()
            .map(|(user_id, history)| (user_id, UserFeatures::derive(user_id, history)))
            .collect();

        log::debug!(
            "features: derived {} users from {} transactions (store v{})",
            users.len(),
            store.len(),
            store.version()
        );

        Self { store_version: store.version(), users }
    }

    pub fn user(&self, user_id: UserId) -> Option<&UserFeatures> {
        self.users.get(&user_id)
    }

    pub fn users(&self) -> impl Iterator<Item = &UserFeatures> {
        self.users.values()
    }
}
