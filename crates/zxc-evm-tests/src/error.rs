//! Error types for fixture runs

use thiserror::Error;

/// Fixture error type
#[derive(Error, Debug)]
pub enum TestError {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON parsing error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Hex decoding error
    #[error("Hex error: {0}")]
    Hex(String),

    /// Fixture parsing error
    #[error("Parse error: {0}")]
    Parse(String),

    /// Execution could not be set up
    #[error("Execution error: {0}")]
    Execution(String),

    /// Assertion failed
    #[error("Assertion failed: {0}")]
    Assertion(String),

    /// Fixture uses something the runner does not model
    #[error("Unsupported: {0}")]
    Unsupported(String),
}

impl From<hex::FromHexError> for TestError {
    fn from(e: hex::FromHexError) -> Self {
        TestError::Hex(e.to_string())
    }
}

/// Fixture result type
pub type TestResult<T> = Result<T, TestError>;
