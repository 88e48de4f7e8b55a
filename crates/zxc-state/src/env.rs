//! Block environment for the reference host

use primitive_types::U256;
use serde::{Deserialize, Serialize};
use zxc_evm::TxContext;
use zxc_primitives::Address;

/// Block-level values exposed to contracts.
///
/// The ledger prices contract gas in drops per byte; that rate is what
/// GASPRICE reports.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnvInfo {
    /// Block beneficiary
    pub coinbase: Address,
    /// Ledger sequence number
    pub number: i64,
    /// Close time in seconds
    pub timestamp: i64,
    /// Gas limit reported by GASLIMIT
    pub gas_limit: i64,
    /// Value reported by DIFFICULTY
    pub difficulty: U256,
    /// Value reported by CHAINID
    pub chain_id: U256,
    /// Fee rate in drops per byte
    pub drops_per_byte: u64,
}

impl Default for EnvInfo {
    fn default() -> Self {
        Self {
            coinbase: Address::ZERO,
            number: 0,
            timestamp: 0,
            gas_limit: 10_000_000,
            difficulty: U256::zero(),
            chain_id: U256::one(),
            drops_per_byte: 1000,
        }
    }
}

impl EnvInfo {
    /// Context seen by a transaction sent from `origin`
    pub fn tx_context(&self, origin: Address) -> TxContext {
        TxContext {
            gas_price: U256::from(self.drops_per_byte),
            origin,
            coinbase: self.coinbase,
            number: self.number,
            timestamp: self.timestamp,
            gas_limit: self.gas_limit,
            difficulty: self.difficulty,
            chain_id: self.chain_id,
        }
    }
}
