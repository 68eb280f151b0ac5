//! Read-only reporting queries: per-user fraud score and the global KPI.

use crate::{
    error::{GuardError, GuardResult},
    features::UserFeatures,
    store::TransactionStore,
    types::{round2, UserId},
};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UserFraudScore {
    pub user_id:     UserId,
    /// Chargebacks as a percentage of the user's history, 2dp.
    pub percentage:  f64,
    pub sample_size: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FraudKpi {
    /// Chargebacks as a percentage of every stored transaction, 2dp.
    pub percentage:   f64,
    /// Whole days between the earliest and latest transaction.
    pub day_span:     i64,
    pub chargebacks:  usize,
    pub transactions: usize,
}

pub fn user_fraud_score(user: &UserFeatures) -> GuardResult<UserFraudScore> {
    let last = user
        .last()
        .ok_or(GuardError::UserNotFound { user_id: user.user_id })?;
    let n = user.len();
    Ok(UserFraudScore {
        user_id:     user.user_id,
        percentage:  round2((last.fraud_score as f64 / n as f64) * 100.0),
        sample_size: n,
    })
}

pub fn global_kpi(store: &TransactionStore) -> GuardResult<FraudKpi> {
    let (first, last) = store.date_range().ok_or(GuardError::EmptyStore)?;
    let chargebacks = store.chargeback_count();
    let transactions = store.len();
    Ok(FraudKpi {
        percentage: round2((chargebacks as f64 / transactions as f64) * 100.0),
        day_span: (last - first).num_days(),
        chargebacks,
        transactions,
    })
}
