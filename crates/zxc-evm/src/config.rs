//! Interpreter configuration

use crate::error::ConfigError;
use crate::gas::cost::MAX_CALL_DEPTH;
use crate::revision::Revision;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Interpreter configuration, loadable from JSON or TOML
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VmConfig {
    /// Active protocol revision
    #[serde(default)]
    pub revision: Revision,
    /// Depth at which nested calls and creates fail
    #[serde(default = "default_max_call_depth")]
    pub max_call_depth: i32,
    /// Enable the 0xC0..0xD6 ledger opcodes
    #[serde(default = "default_ledger_extensions")]
    pub ledger_extensions: bool,
    /// Emit a trace event per executed instruction
    #[serde(default)]
    pub trace_steps: bool,
}

fn default_max_call_depth() -> i32 {
    MAX_CALL_DEPTH
}

fn default_ledger_extensions() -> bool {
    true
}

impl Default for VmConfig {
    fn default() -> Self {
        Self {
            revision: Revision::default(),
            max_call_depth: default_max_call_depth(),
            ledger_extensions: default_ledger_extensions(),
            trace_steps: false,
        }
    }
}

impl VmConfig {
    /// Default configuration for a revision
    pub fn for_revision(revision: Revision) -> Self {
        Self {
            revision,
            ..Self::default()
        }
    }

    /// Parse from a JSON string
    pub fn from_json_str(s: &str) -> Result<Self, ConfigError> {
        let config: VmConfig = serde_json::from_str(s)?;
        config.validate()
    }

    /// Parse from a TOML string
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        let config: VmConfig = toml::from_str(s)?;
        config.validate()
    }

    /// Load from a file; `.toml` files are read as TOML, anything else as JSON
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        match path.extension().and_then(|e| e.to_str()) {
            Some("toml") => Self::from_toml_str(&content),
            _ => Self::from_json_str(&content),
        }
    }

    fn validate(self) -> Result<Self, ConfigError> {
        if self.max_call_depth < 0 {
            return Err(ConfigError::Invalid(format!(
                "max_call_depth must be non-negative, got {}",
                self.max_call_depth
            )));
        }
        Ok(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_config_default() {
        let config = VmConfig::default();
        assert_eq!(config.revision, Revision::Istanbul);
        assert_eq!(config.max_call_depth, 1024);
        assert!(config.ledger_extensions);
        assert!(!config.trace_steps);
    }

    #[test]
    fn test_config_json_partial() {
        let config = VmConfig::from_json_str(r#"{"revision": "byzantium"}"#).unwrap();
        assert_eq!(config.revision, Revision::Byzantium);
        assert_eq!(config.max_call_depth, 1024);
        assert!(config.ledger_extensions);
    }

    #[test]
    fn test_config_toml() {
        let toml = r#"
            revision = "frontier"
            max_call_depth = 8
            ledger_extensions = false
            trace_steps = true
        "#;
        let config = VmConfig::from_toml_str(toml).unwrap();
        assert_eq!(config.revision, Revision::Frontier);
        assert_eq!(config.max_call_depth, 8);
        assert!(!config.ledger_extensions);
        assert!(config.trace_steps);
    }

    #[test]
    fn test_config_rejects_unknown_revision() {
        assert!(matches!(
            VmConfig::from_json_str(r#"{"revision": "london"}"#),
            Err(ConfigError::Json(_))
        ));
    }

    #[test]
    fn test_config_rejects_negative_depth() {
        assert!(matches!(
            VmConfig::from_json_str(r#"{"max_call_depth": -1}"#),
            Err(ConfigError::Invalid(_))
        ));
    }

    #[test]
    fn test_config_from_file() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(file, "revision = \"petersburg\"").unwrap();
        let config = VmConfig::from_file(file.path()).unwrap();
        assert_eq!(config.revision, Revision::Petersburg);

        let mut json = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        writeln!(json, "{{\"trace_steps\": true}}").unwrap();
        let config = VmConfig::from_file(json.path()).unwrap();
        assert!(config.trace_steps);
    }

    #[test]
    fn test_config_missing_file() {
        assert!(matches!(
            VmConfig::from_file("/nonexistent/zxc-vm.toml"),
            Err(ConfigError::Io(_))
        ));
    }
}
