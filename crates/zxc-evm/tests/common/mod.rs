//! Shared test host

#![allow(dead_code)]

use std::collections::HashMap;
use zxc_evm::{
    Address, ExecutionResult, Host, LedgerExtension, Log, Message, Revision, StorageStatus,
    TxContext, Vm, VmConfig, H256, U256,
};

pub const OWN: Address = Address::from_bytes([0x10; 20]);
pub const CALLER: Address = Address::from_bytes([0x20; 20]);
pub const TARGET: Address = Address::from_bytes([0xAA; 20]);

/// Records every host interaction; nested calls return a scripted result.
#[derive(Default)]
pub struct MockHost {
    pub storage: HashMap<(Address, H256), H256>,
    pub balances: HashMap<Address, U256>,
    pub code: HashMap<Address, Vec<u8>>,
    pub logs: Vec<Log>,
    pub refund: u64,
    pub selfdestructs: Vec<(Address, Address)>,
    pub calls: Vec<Message>,
    pub call_result: Option<ExecutionResult>,
    pub tx: TxContext,
    pub block_hashes: HashMap<i64, H256>,
}

impl LedgerExtension for MockHost {}

impl Host for MockHost {
    fn account_exists(&self, address: &Address) -> bool {
        self.balances.contains_key(address) || self.code.contains_key(address)
    }

    fn get_storage(&self, address: &Address, key: &H256) -> H256 {
        self.storage.get(&(*address, *key)).copied().unwrap_or_default()
    }

    fn set_storage(&mut self, address: &Address, key: &H256, value: &H256) -> StorageStatus {
        let current = self.get_storage(address, key);
        self.storage.insert((*address, *key), *value);
        if current == *value {
            StorageStatus::Unchanged
        } else if current.is_zero() {
            StorageStatus::Added
        } else if value.is_zero() {
            StorageStatus::Deleted
        } else {
            StorageStatus::Modified
        }
    }

    fn get_balance(&self, address: &Address) -> U256 {
        self.balances.get(address).copied().unwrap_or_default()
    }

    fn get_code_size(&self, address: &Address) -> usize {
        self.code.get(address).map(|c| c.len()).unwrap_or(0)
    }

    fn get_code_hash(&self, address: &Address) -> H256 {
        match self.code.get(address) {
            Some(code) => zxc_crypto::keccak256(code),
            None => H256::ZERO,
        }
    }

    fn copy_code(&self, address: &Address, offset: usize, buffer: &mut [u8]) -> usize {
        let code = self.code.get(address).map(|c| c.as_slice()).unwrap_or(&[]);
        let src = code.get(offset..).unwrap_or(&[]);
        let n = src.len().min(buffer.len());
        buffer[..n].copy_from_slice(&src[..n]);
        n
    }

    fn selfdestruct(&mut self, address: &Address, beneficiary: &Address) {
        self.selfdestructs.push((*address, *beneficiary));
    }

    fn call(&mut self, message: &Message) -> ExecutionResult {
        self.calls.push(message.clone());
        match &self.call_result {
            Some(result) => result.clone(),
            None => ExecutionResult::success(message.gas, Vec::new()),
        }
    }

    fn get_tx_context(&self) -> TxContext {
        self.tx.clone()
    }

    fn get_block_hash(&self, number: i64) -> H256 {
        self.block_hashes.get(&number).copied().unwrap_or_default()
    }

    fn emit_log(&mut self, address: &Address, data: &[u8], topics: &[H256]) {
        self.logs.push(Log {
            address: *address,
            topics: topics.to_vec(),
            data: data.to_vec(),
        });
    }

    fn add_refund(&mut self, amount: u64) {
        self.refund += amount;
    }
}

/// Decode spaced hex into bytecode
pub fn code(hex_str: &str) -> Vec<u8> {
    hex::decode(hex_str.replace(' ', "")).unwrap()
}

/// Append `MSTORE` of the stack top at 0 and `RETURN` of 32 bytes
pub fn return_top(prefix: &str) -> Vec<u8> {
    code(&format!("{prefix} 6000 52 6020 6000 f3"))
}

/// Top-level message from CALLER to OWN
pub fn message(gas: i64) -> Message {
    Message::call(CALLER, OWN, gas)
}

pub fn run_with(host: &mut MockHost, config: VmConfig, msg: &Message, bytecode: &[u8]) -> ExecutionResult {
    Vm::new(config).execute(host, msg, bytecode)
}

pub fn run(revision: Revision, gas: i64, bytecode: &[u8]) -> (ExecutionResult, MockHost) {
    let mut host = MockHost::default();
    let result = run_with(&mut host, VmConfig::for_revision(revision), &message(gas), bytecode);
    (result, host)
}

pub fn word_bytes(value: U256) -> Vec<u8> {
    H256::from_word(&value).as_bytes().to_vec()
}
