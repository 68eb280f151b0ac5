use crate::types::UserId;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum GuardError {
    #[error("User id {user_id} not found")]
    UserNotFound { user_id: UserId },

    #[error("Transaction store is empty")]
    EmptyStore,

    #[error("Invalid input: {reason}")]
    InvalidInput { reason: String },

    #[error("Malformed row at line {line}: {reason}")]
    MalformedRow { line: u64, reason: String },

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type GuardResult<T> = Result<T, GuardError>;
