//! Feature Engine laws, checked across many synthetic histories.

use fraudguard_core::{
    features::{FeatureSet, GAP_LOOKBACK},
    sample::SyntheticHistory,
    store::TransactionStore,
    types::round2,
};

const SEEDS: std::ops::Range<u64> = 1..25;

fn synthetic_store(seed: u64) -> TransactionStore {
    let params = SyntheticHistory { users: 30, max_gap_minutes: 90, ..SyntheticHistory::default() };
    TransactionStore::from_transactions(params.generate(seed))
}

#[test]
fn streak_extends_or_resets() {
    for seed in SEEDS {
        let features = FeatureSet::derive(&synthetic_store(seed));
        for user in features.users() {
            let first = &user.rows[0];
            assert_eq!(first.out_average_streak, first.over_baseline as u32);
            for pair in user.rows.windows(2) {
                let expected = if pair[1].over_baseline { pair[0].out_average_streak + 1 } else { 0 };
                assert_eq!(
                    pair[1].out_average_streak, expected,
                    "seed {seed} user {}: streak law broken",
                    user.user_id
                );
            }
        }
    }
}

#[test]
fn cumulative_scores_never_decrease() {
    for seed in SEEDS {
        let features = FeatureSet::derive(&synthetic_store(seed));
        for user in features.users() {
            for pair in user.rows.windows(2) {
                assert!(pair[1].fraud_score >= pair[0].fraud_score, "seed {seed}: fraud_score decreased");
                assert!(pair[1].mean_score >= pair[0].mean_score, "seed {seed}: mean_score decreased");
                assert!(pair[0].txn.date <= pair[1].txn.date, "seed {seed}: rows out of date order");
            }
            let last = user.last().expect("non-empty user");
            let chargebacks = user.rows.iter().filter(|r| r.txn.has_chargeback).count() as u32;
            let over = user.rows.iter().filter(|r| r.over_baseline).count() as u32;
            assert_eq!(last.fraud_score, chargebacks);
            assert_eq!(last.mean_score, over);
        }
    }
}

#[test]
fn baseline_uses_only_clean_rows() {
    for seed in SEEDS {
        let features = FeatureSet::derive(&synthetic_store(seed));
        for user in features.users() {
            let clean: Vec<f64> = user
                .rows
                .iter()
                .filter(|r| !r.txn.has_chargeback)
                .map(|r| r.txn.amount)
                .collect();
            let expected_mean = if clean.is_empty() {
                0.0
            } else {
                round2(clean.iter().sum::<f64>() / clean.len() as f64)
            };
            let expected_max = clean.iter().cloned().fold(0.0, f64::max);
            assert_eq!(user.baseline.mean_amount, expected_mean, "seed {seed} user {}", user.user_id);
            assert_eq!(user.baseline.max_amount, round2(expected_max));
        }
    }
}

#[test]
fn flipping_a_chargeback_flag_moves_the_baseline() {
    let store = synthetic_store(3);
    let features = FeatureSet::derive(&store);
    let user = features
        .users()
        .find(|u| {
            let clean: Vec<f64> = u.rows.iter().filter(|r| !r.txn.has_chargeback).map(|r| r.txn.amount).collect();
            clean.len() >= 2 && clean.iter().any(|a| *a != clean[0])
        })
        .expect("seed 3 has a user with two distinct clean amounts");

    // Mark the user's largest clean row as a chargeback.
    let target = user
        .rows
        .iter()
        .filter(|r| !r.txn.has_chargeback)
        .max_by(|a, b| a.txn.amount.total_cmp(&b.txn.amount))
        .map(|r| r.txn)
        .expect("clean row");
    let flipped: Vec<_> = store
        .transactions()
        .iter()
        .map(|t| {
            let mut t = *t;
            if t == target {
                t.has_chargeback = true;
            }
            t
        })
        .collect();

    let after = FeatureSet::derive(&TransactionStore::from_transactions(flipped));
    let after_user = after.user(user.user_id).expect("user still present");
    let remaining: Vec<f64> = after_user.rows.iter().filter(|r| !r.txn.has_chargeback).map(|r| r.txn.amount).collect();

    assert!(after_user.baseline.mean_amount <= user.baseline.mean_amount);
    assert_eq!(
        after_user.baseline.mean_amount,
        round2(remaining.iter().sum::<f64>() / remaining.len() as f64)
    );
    assert_eq!(after_user.last().unwrap().fraud_score, user.last().unwrap().fraud_score + 1);
}

#[test]
fn time_gap_only_after_lookback_rows() {
    for seed in SEEDS {
        let features = FeatureSet::derive(&synthetic_store(seed));
        for user in features.users() {
            for (i, row) in user.rows.iter().enumerate() {
                if i < GAP_LOOKBACK {
                    assert!(row.time_gap_3.is_none());
                } else {
                    let earlier = user.rows[i - GAP_LOOKBACK].txn.date;
                    let expected = (row.txn.date - earlier).num_seconds() as f64 / 60.0;
                    let gap = row.time_gap_3.expect("gap defined");
                    assert!((gap - expected).abs() < 1e-9, "seed {seed}: gap {gap} vs {expected}");
                }
            }
        }
    }
}

#[test]
fn derivation_is_idempotent() {
    let store = synthetic_store(11);
    assert_eq!(FeatureSet::derive(&store), FeatureSet::derive(&store));
}
