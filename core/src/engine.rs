//! FraudGuard: the facade the runner talks to.
//!
//! Owns one TransactionStore and the rule thresholds. Features are derived
//! lazily on first use and reused by every query against the same store
//! snapshot; `append` drops them so the next query re-derives in full.

use crate::{
    config::RuleConfig,
    decision::{self, Verdict},
    error::{GuardError, GuardResult},
    features::{Baseline, FeatureRow, FeatureSet, UserFeatures},
    reporting::{self, FraudKpi, UserFraudScore},
    store::TransactionStore,
    types::{Transaction, UserId},
};
use serde::Serialize;
use std::cell::OnceCell;

/// Baseline plus the latest running features for one user.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UserProfile {
    pub user_id:     UserId,
    pub history_len: usize,
    pub baseline:    Baseline,
    pub latest:      FeatureRow,
}

pub struct FraudGuard {
    store:    TransactionStore,
    rules:    RuleConfig,
    features: OnceCell<FeatureSet>,
}

impl FraudGuard {
    pub fn new(store: TransactionStore, rules: RuleConfig) -> Self {
        Self { store, rules, features: OnceCell::new() }
    }

    /// Default rules over the given transactions.
    pub fn with_transactions(txns: Vec<Transaction>) -> Self {
        Self::new(TransactionStore::from_transactions(txns), RuleConfig::default())
    }

    pub fn store(&self) -> &TransactionStore {
        &self.store
    }

    /// Add historical transactions. Derived features are discarded.
    pub fn append<I: IntoIterator<Item = Transaction>>(&mut self, txns: I) {
        let before = self.store.version();
        self.store.extend(txns);
        if self.store.version() != before {
            self.features = OnceCell::new();
            log::debug!("engine: store now v{}, features invalidated", self.store.version());
        }
    }

    /// Features for the current snapshot, derived on first use.
    pub fn features(&self) -> &FeatureSet {
        self.features.get_or_init(|| FeatureSet::derive(&self.store))
    }

    fn user(&self, user_id: UserId) -> GuardResult<&UserFeatures> {
        self.features()
            .user(user_id)
            .filter(|u| !u.is_empty())
            .ok_or(GuardError::UserNotFound { user_id })
    }

    /// Accept or deny a candidate transaction. The candidate is not stored.
    pub fn evaluate(&self, user_id: UserId, amount: f64) -> GuardResult<Verdict> {
        decision::evaluate(self.user(user_id)?, amount, &self.rules)
    }

    pub fn user_fraud_score(&self, user_id: UserId) -> GuardResult<UserFraudScore> {
        reporting::user_fraud_score(self.user(user_id)?)
    }

    pub fn global_kpi(&self) -> GuardResult<FraudKpi> {
        reporting::global_kpi(&self.store)
    }

    pub fn user_profile(&self, user_id: UserId) -> GuardResult<UserProfile> {
        let user = self.user(user_id)?;
        let latest = *user.last().ok_or(GuardError::UserNotFound { user_id })?;
        Ok(UserProfile {
            user_id,
            history_len: user.len(),
            baseline: user.baseline,
            latest,
        })
    }
}
