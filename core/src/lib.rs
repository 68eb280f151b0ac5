//! FraudGuard: rule-based fraud scoring over per-user transaction history.
//!
//! Data flow:
//!   TransactionStore → FeatureSet (pure, full re-derivation)
//!                    → decision::evaluate / reporting queries
//!
//! `engine::FraudGuard` wires the pieces together for callers.

pub mod config;
pub mod decision;
pub mod engine;
pub mod error;
pub mod features;
pub mod ingest;
pub mod reporting;
pub mod rng;
pub mod sample;
pub mod store;
pub mod types;

pub use engine::FraudGuard;
pub use error::{GuardError, GuardResult};
