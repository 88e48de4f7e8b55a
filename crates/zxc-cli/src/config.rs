//! CLI configuration file
//!
//! A TOML file with an optional `[vm]` table (a [`VmConfig`]) and an optional
//! `[env]` table (an [`EnvInfo`]). Command-line flags override file values.

use crate::error::CliError;
use serde::{Deserialize, Serialize};
use std::path::Path;
use zxc_evm::VmConfig;
use zxc_state::EnvInfo;

/// CLI configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Interpreter settings
    pub vm: VmConfig,
    /// Block environment of the reference host
    pub env: EnvInfo,
}

impl Config {
    /// Load from a TOML file
    pub fn from_file(path: &Path) -> Result<Self, CliError> {
        let content = std::fs::read_to_string(path)?;
        Self::parse(&content).map_err(|e| CliError::Config(format!("{}: {}", path.display(), e)))
    }

    /// Parse from a TOML string
    pub fn from_toml_str(s: &str) -> Result<Self, CliError> {
        Self::parse(s).map_err(CliError::Config)
    }

    fn parse(s: &str) -> Result<Self, String> {
        let config: Config = toml::from_str(s).map_err(|e| e.to_string())?;
        if config.vm.max_call_depth < 0 {
            return Err(format!(
                "max_call_depth must be non-negative, got {}",
                config.vm.max_call_depth
            ));
        }
        Ok(config)
    }

    /// Load `path` when given, defaults otherwise
    pub fn load(path: Option<&Path>) -> Result<Self, CliError> {
        match path {
            Some(path) => Self::from_file(path),
            None => Ok(Self::default()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use primitive_types::U256;
    use std::io::Write;
    use zxc_evm::Revision;

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert_eq!(config.vm.revision, Revision::Istanbul);
        assert_eq!(config.vm.max_call_depth, 1024);
        assert_eq!(config.env.drops_per_byte, 1000);
    }

    #[test]
    fn test_config_deserialize() {
        let toml = r#"
            [vm]
            revision = "byzantium"
            ledger_extensions = false

            [env]
            number = 42
            drops_per_byte = 10
        "#;
        let config = Config::from_toml_str(toml).unwrap();
        assert_eq!(config.vm.revision, Revision::Byzantium);
        assert!(!config.vm.ledger_extensions);
        assert_eq!(config.vm.max_call_depth, 1024);
        assert_eq!(config.env.number, 42);
        assert_eq!(config.env.drops_per_byte, 10);
        assert_eq!(config.env.chain_id, U256::one());
    }

    #[test]
    fn test_config_rejects_unknown_revision() {
        let err = Config::from_toml_str("[vm]\nrevision = \"london\"\n").unwrap_err();
        assert!(matches!(err, CliError::Config(_)));
    }

    #[test]
    fn test_config_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[vm]\nrevision = \"frontier\"").unwrap();

        let config = Config::load(Some(file.path())).unwrap();
        assert_eq!(config.vm.revision, Revision::Frontier);
        assert_eq!(Config::load(None).unwrap(), Config::default());
    }

    #[test]
    fn test_config_missing_file() {
        let err = Config::from_file(Path::new("/nonexistent/zxcvm.toml")).unwrap_err();
        assert!(matches!(err, CliError::Io(_)));
    }
}
