//! Fixture JSON types
//!
//! Numbers are hex strings (`"0x0186a0"`), byte strings are `0x`-prefixed hex
//! and addresses are 20-byte hex.

use primitive_types::U256;
use serde::{Deserialize, Deserializer};
use std::collections::BTreeMap;
use zxc_evm::{Revision, StatusCode};

fn strip(s: &str) -> &str {
    s.strip_prefix("0x").unwrap_or(s)
}

/// Hex-encoded bytes
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HexBytes(pub Vec<u8>);

impl<'de> Deserialize<'de> for HexBytes {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s: String = Deserialize::deserialize(deserializer)?;
        // Fixtures may space out opcodes for readability
        let s: String = strip(&s).chars().filter(|c| !c.is_whitespace()).collect();
        hex::decode(&s).map(HexBytes).map_err(serde::de::Error::custom)
    }
}

/// Hex-encoded 256-bit word
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord)]
pub struct HexU256(pub U256);

impl<'de> Deserialize<'de> for HexU256 {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s: String = Deserialize::deserialize(deserializer)?;
        let s = strip(&s);
        if s.is_empty() {
            return Ok(HexU256(U256::zero()));
        }
        U256::from_str_radix(s, 16)
            .map(HexU256)
            .map_err(serde::de::Error::custom)
    }
}

/// Hex-encoded signed 64-bit integer (gas and block values)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HexI64(pub i64);

impl<'de> Deserialize<'de> for HexI64 {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s: String = Deserialize::deserialize(deserializer)?;
        let s = strip(&s);
        if s.is_empty() {
            return Ok(HexI64(0));
        }
        i64::from_str_radix(s, 16)
            .map(HexI64)
            .map_err(serde::de::Error::custom)
    }
}

/// Hex-encoded address (20 bytes)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct HexAddress(pub [u8; 20]);

impl<'de> Deserialize<'de> for HexAddress {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s: String = Deserialize::deserialize(deserializer)?;
        let bytes = hex::decode(strip(&s)).map_err(serde::de::Error::custom)?;
        if bytes.len() != 20 {
            return Err(serde::de::Error::custom(format!(
                "invalid address length: {}",
                bytes.len()
            )));
        }
        let mut result = [0u8; 20];
        result.copy_from_slice(&bytes);
        Ok(HexAddress(result))
    }
}

// =============================================================================
// Fixture Types
// =============================================================================

/// Fixture file: test name to case
pub type FixtureFile = BTreeMap<String, FixtureCase>;

/// Single fixture case
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FixtureCase {
    /// Revision to run under; the runner default when absent
    pub revision: Option<Revision>,
    /// Run with the ledger opcodes enabled (default true)
    #[serde(default = "default_true")]
    pub ledger_extensions: bool,
    /// Block environment
    #[serde(default)]
    pub env: FixtureEnv,
    /// Execution parameters
    pub exec: FixtureExec,
    /// Expected status code
    pub status: Option<StatusCode>,
    /// Expected gas remaining
    pub gas: Option<HexI64>,
    /// Expected output
    pub out: Option<HexBytes>,
    /// Expected number of logs
    pub log_count: Option<usize>,
    /// Expected refund counter
    pub refund: Option<u64>,
    /// Pre-execution state
    #[serde(default)]
    pub pre: BTreeMap<HexAddress, FixtureAccount>,
    /// Post-execution state of the listed accounts
    pub post: Option<BTreeMap<HexAddress, FixtureAccount>>,
}

fn default_true() -> bool {
    true
}

/// Fixture block environment
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FixtureEnv {
    /// Current coinbase
    pub current_coinbase: HexAddress,
    /// Current difficulty
    pub current_difficulty: HexU256,
    /// Current gas limit
    pub current_gas_limit: HexI64,
    /// Current ledger sequence
    pub current_number: HexI64,
    /// Current timestamp
    pub current_timestamp: HexI64,
    /// Chain id
    pub chain_id: Option<HexU256>,
    /// Block hashes by number
    pub block_hashes: BTreeMap<String, HexU256>,
}

/// Fixture execution parameters
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FixtureExec {
    /// Address of the executing account
    pub address: HexAddress,
    /// Caller address
    pub caller: HexAddress,
    /// Code to execute
    pub code: HexBytes,
    /// Input data
    #[serde(default)]
    pub data: HexBytes,
    /// Gas provided
    pub gas: HexI64,
    /// Gas price in drops per byte
    #[serde(default)]
    pub gas_price: HexI64,
    /// Origin address
    pub origin: HexAddress,
    /// Value transferred
    #[serde(default)]
    pub value: HexU256,
}

/// Account state in `pre` or `post`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct FixtureAccount {
    /// Balance
    pub balance: HexU256,
    /// Nonce
    pub nonce: HexI64,
    /// Code
    pub code: HexBytes,
    /// Storage slots
    pub storage: BTreeMap<HexU256, HexU256>,
}
