//! CLI error types

use thiserror::Error;

/// CLI error type
#[derive(Debug, Error)]
pub enum CliError {
    /// Invalid hex string
    #[error("Invalid hex: {0}")]
    InvalidHex(String),

    /// Invalid address format
    #[error("Invalid address: {0}")]
    InvalidAddress(String),

    /// Invalid numeric argument
    #[error("Invalid number: {0}")]
    InvalidNumber(String),

    /// Config error
    #[error("Config error: {0}")]
    Config(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Decode `0x`-prefixed or bare hex; whitespace is ignored
pub fn parse_hex(s: &str) -> Result<Vec<u8>, CliError> {
    let s = s.trim();
    let s = s.strip_prefix("0x").unwrap_or(s);
    let cleaned: String = s.chars().filter(|c| !c.is_whitespace()).collect();
    hex::decode(&cleaned).map_err(|e| CliError::InvalidHex(format!("{cleaned:?}: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_hex_prefix_and_spaces() {
        assert_eq!(parse_hex("0x60 01").unwrap(), vec![0x60, 0x01]);
        assert_eq!(parse_hex("6001").unwrap(), vec![0x60, 0x01]);
        assert!(parse_hex("").unwrap().is_empty());
    }

    #[test]
    fn test_parse_hex_rejects_odd_length() {
        let err = parse_hex("0x600").unwrap_err();
        assert!(matches!(err, CliError::InvalidHex(_)));
        assert!(err.to_string().starts_with("Invalid hex"));
    }
}
