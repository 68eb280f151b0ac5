//! Fraud score and KPI queries.

use chrono::{Duration, NaiveDate, NaiveDateTime};
use fraudguard_core::{types::Transaction, FraudGuard, GuardError};

fn day(offset: i64) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2019, 11, 1)
        .and_then(|d| d.and_hms_opt(9, 30, 0))
        .expect("valid start")
        + Duration::days(offset)
}

/// 10 transactions, 2 chargebacks, first and last exactly 30 days apart.
fn kpi_batch() -> Vec<Transaction> {
    let offsets = [0, 3, 5, 9, 12, 15, 20, 22, 27, 30];
    offsets
        .iter()
        .enumerate()
        .map(|(i, &d)| Transaction::new((i % 3) as i64 + 1, 25.0 * (i + 1) as f64, day(d), i == 2 || i == 7))
        .collect()
}

#[test]
fn kpi_matches_known_batch() {
    let guard = FraudGuard::with_transactions(kpi_batch());
    let kpi = guard.global_kpi().unwrap();
    assert_eq!(kpi.percentage, 20.00);
    assert_eq!(kpi.day_span, 30);
    assert_eq!(kpi.chargebacks, 2);
    assert_eq!(kpi.transactions, 10);
}

#[test]
fn kpi_day_span_counts_whole_days() {
    let mut txns = kpi_batch();
    // 30 days and 23 hours is still 30 whole days.
    txns.push(Transaction::new(1, 10.0, day(30) + Duration::hours(23), false));
    let kpi = FraudGuard::with_transactions(txns).global_kpi().unwrap();
    assert_eq!(kpi.day_span, 30);
    assert_eq!(kpi.percentage, 18.18);
}

#[test]
fn kpi_on_empty_store_is_an_error() {
    let guard = FraudGuard::with_transactions(Vec::new());
    assert!(matches!(guard.global_kpi(), Err(GuardError::EmptyStore)));
}

#[test]
fn user_fraud_score_is_share_of_history() {
    let txns = vec![
        Transaction::new(42, 10.0, day(0), false),
        Transaction::new(42, 15.0, day(1), true),
        Transaction::new(42, 12.0, day(2), false),
        Transaction::new(43, 99.0, day(2), true),
    ];
    let guard = FraudGuard::with_transactions(txns);

    let score = guard.user_fraud_score(42).unwrap();
    assert_eq!(score.percentage, 33.33);
    assert_eq!(score.sample_size, 3);

    let other = guard.user_fraud_score(43).unwrap();
    assert_eq!(other.percentage, 100.0);
    assert_eq!(other.sample_size, 1);
}

#[test]
fn user_fraud_score_for_unknown_user_fails() {
    let guard = FraudGuard::with_transactions(kpi_batch());
    assert!(matches!(
        guard.user_fraud_score(999_999),
        Err(GuardError::UserNotFound { user_id: 999_999 })
    ));
}

#[test]
fn profile_reports_baseline_and_latest_row() {
    let txns = vec![
        Transaction::new(5, 40.0, day(0), false),
        Transaction::new(5, 80.0, day(1), false),
        Transaction::new(5, 500.0, day(2), true),
    ];
    let profile = FraudGuard::with_transactions(txns).user_profile(5).unwrap();
    assert_eq!(profile.history_len, 3);
    assert_eq!(profile.baseline.mean_amount, 60.0);
    assert_eq!(profile.baseline.max_amount, 80.0);
    assert_eq!(profile.latest.txn.amount, 500.0);
    assert_eq!(profile.latest.fraud_score, 1);
    assert_eq!(profile.latest.out_average_streak, 2);
    assert_eq!(profile.latest.mean_score, 2);
}
