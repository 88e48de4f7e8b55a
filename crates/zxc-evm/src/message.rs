//! Messages, transaction context and storage status

use primitive_types::U256;
use serde::{Deserialize, Serialize};
use zxc_primitives::{Address, H256};

/// Kind of a message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CallKind {
    /// CALL, and STATICCALL together with the static flag
    Call,
    /// CALLCODE: callee code runs against the caller's storage
    CallCode,
    /// DELEGATECALL: callee code runs with the caller's sender and value
    DelegateCall,
    /// CREATE
    Create,
    /// CREATE2
    Create2,
}

impl CallKind {
    /// Whether this kind creates an account
    pub fn is_create(self) -> bool {
        matches!(self, CallKind::Create | CallKind::Create2)
    }
}

/// Input to one frame
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    /// Kind
    pub kind: CallKind,
    /// Static flag; only valid with [`CallKind::Call`]
    pub is_static: bool,
    /// Call depth, 0 for the top-level frame
    pub depth: i32,
    /// Gas available to the frame
    pub gas: i64,
    /// Account whose storage and balance the frame acts on
    pub destination: Address,
    /// Caller
    pub sender: Address,
    /// Account whose code runs (differs from `destination` for CALLCODE and DELEGATECALL)
    pub code_address: Address,
    /// Call data, or init code for creates
    pub input: Vec<u8>,
    /// Value transferred (or apparent value for DELEGATECALL)
    pub value: U256,
    /// CREATE2 salt
    pub create2_salt: H256,
}

impl Message {
    /// Top-level CALL to `destination`
    pub fn call(sender: Address, destination: Address, gas: i64) -> Self {
        Self {
            kind: CallKind::Call,
            is_static: false,
            depth: 0,
            gas,
            destination,
            sender,
            code_address: destination,
            input: Vec::new(),
            value: U256::zero(),
            create2_salt: H256::ZERO,
        }
    }

    /// Top-level CREATE from `sender`
    pub fn create(sender: Address, init_code: Vec<u8>, gas: i64) -> Self {
        Self {
            kind: CallKind::Create,
            is_static: false,
            depth: 0,
            gas,
            destination: Address::ZERO,
            sender,
            code_address: Address::ZERO,
            input: init_code,
            value: U256::zero(),
            create2_salt: H256::ZERO,
        }
    }

    /// Set the call data
    pub fn with_input(mut self, input: Vec<u8>) -> Self {
        self.input = input;
        self
    }

    /// Set the transferred value
    pub fn with_value(mut self, value: U256) -> Self {
        self.value = value;
        self
    }

    /// Set the call depth
    pub fn with_depth(mut self, depth: i32) -> Self {
        self.depth = depth;
        self
    }

    /// Mark as static
    pub fn into_static(mut self) -> Self {
        self.is_static = true;
        self
    }

    /// Static flag set on a kind other than CALL
    pub fn has_invalid_flags(&self) -> bool {
        self.is_static && self.kind != CallKind::Call
    }
}

/// Transaction and block context, fetched lazily by the interpreter
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TxContext {
    /// Gas price
    pub gas_price: U256,
    /// Transaction origin
    pub origin: Address,
    /// Block beneficiary
    pub coinbase: Address,
    /// Block number
    pub number: i64,
    /// Block timestamp
    pub timestamp: i64,
    /// Block gas limit
    pub gas_limit: i64,
    /// Block difficulty
    pub difficulty: U256,
    /// Chain id
    pub chain_id: U256,
}

/// Effect of a storage write, reported by the host
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StorageStatus {
    /// Zero to non-zero
    Added,
    /// Non-zero to a different non-zero value
    Modified,
    /// Non-zero to zero
    Deleted,
    /// Same value written back
    Unchanged,
    /// Slot already changed earlier in the same transaction
    ModifiedAgain,
}
