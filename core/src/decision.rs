//! Decision Engine: ordered threshold rules over a user's features.
//!
//! RULE ORDER (fixed; later matches overwrite earlier ones):
//!   1. Fraud history:   last fraud_score > limit          → DenyHighFraudHistory
//!   2. High volume (n >= high_volume_min_rows):
//!        over-baseline share >= pct                       → DenyRepeatedSuspiciousAmount
//!        otherwise rule 1's result (or Approve) stands.
//!   3. Low volume (n < high_volume_min_rows), first match wins and always
//!      replaces rule 1's result:
//!        streak >= streak_limit                           → DenyStreakAboveBaseline
//!        time_gap_3 <= min_gap_minutes                    → DenyTooFrequent
//!        amount ratio >= spike_ratio_pct                  → DenyAmountSpike
//!        else                                             → Approve
//!
//! The low-volume chain never runs for high-volume users.

use crate::{
    config::RuleConfig,
    error::{GuardError, GuardResult},
    features::UserFeatures,
    types::UserId,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    Approve,
    DenyHighFraudHistory,
    DenyRepeatedSuspiciousAmount,
    DenyStreakAboveBaseline,
    DenyTooFrequent,
    DenyAmountSpike,
}

impl Outcome {
    /// Canonical, user-facing reason.
    pub fn reason(self) -> &'static str {
        match self {
            Outcome::Approve => "Transaction approved.",
            Outcome::DenyHighFraudHistory => {
                "Transaction denied due to high frauds detected for this user."
            }
            Outcome::DenyRepeatedSuspiciousAmount => {
                "Transaction denied due to suspicious amount in a row."
            }
            Outcome::DenyStreakAboveBaseline => {
                "Transaction denied due to past suspicious transactions above average spending for this user."
            }
            Outcome::DenyTooFrequent => "Transaction denied due to too many transactions in a row.",
            Outcome::DenyAmountSpike => {
                "Transaction denied due to suspicious amount in this transaction."
            }
        }
    }
}

/// The figures the rules were applied to, kept for explanation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RuleInputs {
    pub history_len:        usize,
    pub fraud_score:        u32,
    pub mean_score_pct:     f64,
    pub out_average_streak: u32,
    pub time_gap_3:         Option<f64>,
    pub mean_amount:        f64,
    /// None when the baseline is zero.
    pub amount_ratio_pct:   Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Verdict {
    pub user_id: UserId,
    pub amount:  f64,
    pub outcome: Outcome,
    pub reason:  String,
    pub inputs:  RuleInputs,
}

impl RuleInputs {
    fn gather(user: &UserFeatures, candidate_amount: f64) -> Option<Self> {
        let last = user.last()?;
        let n = user.len();
        let mean_score_pct = if n > 0 {
            (last.mean_score as f64 / n as f64) * 100.0
        } else {
            0.0
        };
        let mean_amount = user.baseline.mean_amount;
        let amount_ratio_pct = if mean_amount != 0.0 {
            Some((candidate_amount / mean_amount) * 100.0)
        } else {
            None
        };
        Some(Self {
            history_len: n,
            fraud_score: last.fraud_score,
            mean_score_pct,
            out_average_streak: last.out_average_streak,
            time_gap_3: last.time_gap_3,
            mean_amount,
            amount_ratio_pct,
        })
    }
}

/// Run the rule list. Pure: nothing is appended to the history.
pub fn evaluate(
    user: &UserFeatures,
    candidate_amount: f64,
    rules: &RuleConfig,
) -> GuardResult<Verdict> {
    let inputs = RuleInputs::gather(user, candidate_amount)
        .ok_or(GuardError::UserNotFound { user_id: user.user_id })?;

    let mut outcome = Outcome::Approve;

    if inputs.fraud_score > rules.fraud_history_limit {
        outcome = Outcome::DenyHighFraudHistory;
    }

    if inputs.history_len >= rules.high_volume_min_rows {
        if inputs.mean_score_pct >= rules.repeated_over_baseline_pct {
            outcome = Outcome::DenyRepeatedSuspiciousAmount;
        }
    } else if inputs.out_average_streak >= rules.streak_limit {
        outcome = Outcome::DenyStreakAboveBaseline;
    } else if inputs.time_gap_3.is_some_and(|gap| gap <= rules.min_gap_minutes) {
        outcome = Outcome::DenyTooFrequent;
    } else if is_spike(&inputs, candidate_amount, rules) {
        outcome = Outcome::DenyAmountSpike;
    } else {
        outcome = Outcome::Approve;
    }

    log::debug!(
        "decision: user={} amount={candidate_amount} n={} fraud={} over_pct={:.2} streak={} gap={:?} ratio={:?} -> {outcome:?}",
        user.user_id,
        inputs.history_len,
        inputs.fraud_score,
        inputs.mean_score_pct,
        inputs.out_average_streak,
        inputs.time_gap_3,
        inputs.amount_ratio_pct,
    );

    Ok(Verdict {
        user_id: user.user_id,
        amount: candidate_amount,
        outcome,
        reason: outcome.reason().to_string(),
        inputs,
    })
}

fn is_spike(inputs: &RuleInputs, candidate_amount: f64, rules: &RuleConfig) -> bool {
    match inputs.amount_ratio_pct {
        Some(ratio) => ratio >= rules.spike_ratio_pct,
        None => rules.zero_baseline_is_spike && candidate_amount > 0.0,
    }
}

/// Opt-in checks for callers that want `InvalidInput` before evaluating.
/// The engine itself accepts any amount.
pub fn validate_candidate(user_id: UserId, amount: f64) -> GuardResult<()> {
    if user_id <= 0 {
        return Err(GuardError::InvalidInput {
            reason: format!("user id must be positive, got {user_id}"),
        });
    }
    if !amount.is_finite() || amount < 0.0 {
        return Err(GuardError::InvalidInput {
            reason: format!("amount must be a non-negative number, got {amount}"),
        });
    }
    Ok(())
}
