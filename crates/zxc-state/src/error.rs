//! State error types

use thiserror::Error;

/// Errors raised while loading or preparing ledger state
#[derive(Debug, Error)]
pub enum StateError {
    /// Reading a genesis file failed
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Malformed genesis or environment JSON
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    /// Account already present in the state
    #[error("account already exists: {0}")]
    AccountExists(zxc_primitives::Address),

    /// Structurally valid but semantically wrong input
    #[error("invalid state: {0}")]
    Invalid(String),
}

/// Result type for state operations
pub type StateResult<T> = Result<T, StateError>;
