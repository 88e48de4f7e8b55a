//! Account model and genesis loading

use crate::error::{StateError, StateResult};
use primitive_types::U256;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use zxc_crypto::{keccak256, KECCAK_EMPTY};
use zxc_primitives::{Address, H256};

/// Ledger account as seen by contracts
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    /// Balance in drops
    #[serde(default)]
    pub balance: U256,
    /// Number of contracts created by this account (plus one once it is a contract)
    #[serde(default)]
    pub nonce: u64,
    /// Contract code, empty for plain accounts
    #[serde(default, with = "hex_bytes")]
    pub code: Vec<u8>,
    /// Contract storage; zero values are never stored
    #[serde(default, with = "word_map")]
    pub storage: BTreeMap<H256, H256>,
}

impl Account {
    /// Plain account holding `balance`
    pub fn with_balance(balance: U256) -> Self {
        Self {
            balance,
            ..Self::default()
        }
    }

    /// Contract account with `code`
    pub fn with_code(code: Vec<u8>) -> Self {
        Self {
            code,
            ..Self::default()
        }
    }

    /// Keccak of the code; the empty-input hash for plain accounts
    pub fn code_hash(&self) -> H256 {
        if self.code.is_empty() {
            KECCAK_EMPTY
        } else {
            keccak256(&self.code)
        }
    }

    /// No balance, nonce or code
    pub fn is_empty(&self) -> bool {
        self.balance.is_zero() && self.nonce == 0 && self.code.is_empty()
    }

    /// Storage value, zero when unset
    pub fn storage_value(&self, key: &H256) -> H256 {
        self.storage.get(key).copied().unwrap_or_default()
    }

    /// Write a slot, removing it when `value` is zero
    pub fn set_storage_value(&mut self, key: H256, value: H256) {
        if value.is_zero() {
            self.storage.remove(&key);
        } else {
            self.storage.insert(key, value);
        }
    }
}

/// Initial accounts keyed by address
pub type Genesis = BTreeMap<Address, Account>;

/// Parse a genesis allocation from JSON
pub fn genesis_from_json_str(s: &str) -> StateResult<Genesis> {
    Ok(serde_json::from_str(s)?)
}

/// Load a genesis allocation from a JSON file
pub fn genesis_from_file(path: impl AsRef<Path>) -> StateResult<Genesis> {
    let content = std::fs::read_to_string(path.as_ref())?;
    genesis_from_json_str(&content).map_err(|e| match e {
        StateError::Json(err) => StateError::Invalid(format!(
            "{}: {}",
            path.as_ref().display(),
            err
        )),
        other => other,
    })
}

/// `0x`-prefixed hex for byte vectors
pub mod hex_bytes {
    use serde::{Deserialize, Deserializer, Serializer};

    /// Serialize as `0x…`
    pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&format!("0x{}", hex::encode(bytes)))
    }

    /// Deserialize from hex, with or without the `0x` prefix
    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let s = String::deserialize(deserializer)?;
        let s = s.strip_prefix("0x").unwrap_or(&s);
        hex::decode(s).map_err(serde::de::Error::custom)
    }
}

/// Storage maps written with short hex words (`"0x01": "0x2a"`)
mod word_map {
    use primitive_types::U256;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::collections::BTreeMap;
    use zxc_primitives::H256;

    pub fn serialize<S: Serializer>(
        map: &BTreeMap<H256, H256>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        let words: BTreeMap<U256, U256> = map.iter().map(|(k, v)| (k.to_word(), v.to_word())).collect();
        words.serialize(serializer)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<BTreeMap<H256, H256>, D::Error> {
        let words = BTreeMap::<U256, U256>::deserialize(deserializer)?;
        Ok(words
            .into_iter()
            .filter(|(_, v)| !v.is_zero())
            .map(|(k, v)| (H256::from_word(&k), H256::from_word(&v)))
            .collect())
    }
}
