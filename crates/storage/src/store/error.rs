#![forbid(unsafe_code)]

use tally_core::{CategoryIdError, CounterNameError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("io: {0}")]
    Io(#[from] std::io::Error),
    #[error("sqlite: {0}")]
    Sql(#[from] rusqlite::Error),
    #[error("context json: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid input: {0}")]
    InvalidInput(&'static str),
    #[error("invalid counter name: {0}")]
    InvalidName(#[from] CounterNameError),
    #[error("invalid category id: {0}")]
    InvalidCategory(#[from] CategoryIdError),
    #[error("category enumeration failed: {0}")]
    Enumeration(String),
    #[error("unknown counter")]
    UnknownCounter,
    #[error("counter already exists")]
    CounterAlreadyExists,
}

impl StoreError {
    /// Stable machine-readable code for callers that branch on failure kind.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Io(_) => "IO",
            Self::Sql(_) => "STORE_ERROR",
            Self::Json(_) => "INVALID_CONTEXT",
            Self::InvalidInput(message) if message.starts_with("RESET_REQUIRED") => {
                "RESET_REQUIRED"
            }
            Self::InvalidInput(_) => "INVALID_INPUT",
            Self::InvalidName(_) => "INVALID_NAME",
            Self::InvalidCategory(_) => "INVALID_CATEGORY",
            Self::Enumeration(_) => "ENUMERATION_FAILED",
            Self::UnknownCounter => "UNKNOWN_COUNTER",
            Self::CounterAlreadyExists => "ALREADY_EXISTS",
        }
    }
}
