//! In-memory reference host
//!
//! Executes nested calls and creates against a journaled account map. Each
//! frame runs on a snapshot of the whole world state (accounts, logs,
//! sub-state and tables) that is discarded when the frame fails or reverts.

use crate::account::{Account, Genesis};
use crate::env::EnvInfo;
use crate::error::{StateError, StateResult};
use crate::table::{word_index, QuerySet, TableError, TableStore};
use primitive_types::U256;
use std::collections::{BTreeMap, HashMap};
use tracing::{debug, warn};
use zxc_crypto::{create2_address, create_address};
use zxc_evm::gas::{self, cost};
use zxc_evm::{
    CallKind, ExecutionResult, Host, LedgerExtension, Log, Message, Revision, StatusCode,
    StorageStatus, SubState, TxContext, Vm, VmConfig,
};
use zxc_primitives::{Address, H256};

/// Native stack reserved for each nested frame of a transaction
const FRAME_STACK_BYTES: usize = 256 * 1024;

/// Smallest stack given to a transaction thread
const MIN_TRANSACTION_STACK: usize = 16 * 1024 * 1024;

/// Everything a failed frame rolls back
#[derive(Debug, Clone, Default)]
struct WorldState {
    accounts: BTreeMap<Address, Account>,
    logs: Vec<Log>,
    substate: SubState,
    tables: TableStore,
}

/// Result of a top-level transaction
#[derive(Debug, Clone)]
pub struct TransactionOutcome {
    /// Result of the outermost frame
    pub result: ExecutionResult,
    /// Logs of all frames that were not rolled back
    pub logs: Vec<Log>,
    /// Self-destructs (already applied) and the refund counter
    pub substate: SubState,
}

/// Reference [`Host`] backed by in-memory state
#[derive(Debug)]
pub struct MemoryHost {
    vm: Vm,
    env: EnvInfo,
    origin: Address,
    state: WorldState,
    snapshots: Vec<WorldState>,
    /// Slot values at the start of the transaction, recorded on first write
    originals: HashMap<(Address, H256), H256>,
    block_hashes: BTreeMap<i64, H256>,
    queries: QuerySet,
}

impl Default for MemoryHost {
    fn default() -> Self {
        Self::new(VmConfig::default())
    }
}

impl MemoryHost {
    /// Empty state executing with `config`
    pub fn new(config: VmConfig) -> Self {
        Self {
            vm: Vm::new(config),
            env: EnvInfo::default(),
            origin: Address::ZERO,
            state: WorldState::default(),
            snapshots: Vec::new(),
            originals: HashMap::new(),
            block_hashes: BTreeMap::new(),
            queries: QuerySet::default(),
        }
    }

    /// State seeded from a genesis allocation
    pub fn with_genesis(config: VmConfig, genesis: Genesis) -> Self {
        let mut host = Self::new(config);
        host.state.accounts = genesis;
        host
    }

    /// Interpreter configuration
    pub fn config(&self) -> &VmConfig {
        self.vm.config()
    }

    fn revision(&self) -> Revision {
        self.vm.config().revision
    }

    /// Block environment
    pub fn env(&self) -> &EnvInfo {
        &self.env
    }

    /// Replace the block environment
    pub fn set_env(&mut self, env: EnvInfo) {
        self.env = env;
    }

    /// Hash reported by BLOCKHASH for `number`
    pub fn set_block_hash(&mut self, number: i64, hash: H256) {
        self.block_hashes.insert(number, hash);
    }

    // ==================== Accounts ====================

    /// Add a new account, failing if the address is taken
    pub fn insert_account(&mut self, address: Address, account: Account) -> StateResult<()> {
        if self.state.accounts.contains_key(&address) {
            return Err(StateError::AccountExists(address));
        }
        self.state.accounts.insert(address, account);
        Ok(())
    }

    /// Add or replace an account
    pub fn set_account(&mut self, address: Address, account: Account) {
        self.state.accounts.insert(address, account);
    }

    /// Install `code` at `address`, keeping any balance
    pub fn deploy(&mut self, address: Address, code: Vec<u8>) {
        self.state.accounts.entry(address).or_default().code = code;
    }

    /// Account at `address`
    pub fn account(&self, address: &Address) -> Option<&Account> {
        self.state.accounts.get(address)
    }

    /// All accounts in address order
    pub fn accounts(&self) -> impl Iterator<Item = (&Address, &Account)> {
        self.state.accounts.iter()
    }

    /// Balance, zero for unknown accounts
    pub fn balance(&self, address: &Address) -> U256 {
        self.account(address).map(|a| a.balance).unwrap_or_default()
    }

    /// Nonce, zero for unknown accounts
    pub fn nonce(&self, address: &Address) -> u64 {
        self.account(address).map(|a| a.nonce).unwrap_or(0)
    }

    /// Code, empty for unknown accounts
    pub fn code(&self, address: &Address) -> &[u8] {
        self.account(address).map(|a| a.code.as_slice()).unwrap_or(&[])
    }

    /// Storage slot, zero when unset
    pub fn storage(&self, address: &Address, key: &H256) -> H256 {
        self.account(address)
            .map(|a| a.storage_value(key))
            .unwrap_or_default()
    }

    /// Logs recorded in the current transaction
    pub fn logs(&self) -> &[Log] {
        &self.state.logs
    }

    /// Sub-state accumulated in the current transaction
    pub fn substate(&self) -> &SubState {
        &self.state.substate
    }

    /// Ledger tables
    pub fn tables(&self) -> &TableStore {
        &self.state.tables
    }

    /// Move `value` between accounts; false when the sender cannot cover it
    fn transfer(&mut self, from: &Address, to: &Address, value: U256) -> bool {
        if value.is_zero() {
            return true;
        }
        if self.balance(from) < value {
            return false;
        }
        let sender = self.state.accounts.entry(*from).or_default();
        sender.balance -= value;
        let receiver = self.state.accounts.entry(*to).or_default();
        receiver.balance = receiver.balance.saturating_add(value);
        true
    }

    // ==================== Journal ====================

    /// Record the current state; returns an id for revert or commit
    pub fn snapshot(&mut self) -> usize {
        self.snapshots.push(self.state.clone());
        self.snapshots.len() - 1
    }

    /// Restore the state recorded by `id`, dropping later snapshots
    pub fn revert_to_snapshot(&mut self, id: usize) {
        self.snapshots.truncate(id + 1);
        if let Some(state) = self.snapshots.pop() {
            debug!(snapshot = id, "revert to snapshot");
            self.state = state;
        }
    }

    /// Keep the current state and forget snapshot `id` and later ones
    pub fn commit_snapshot(&mut self, id: usize) {
        self.snapshots.truncate(id);
    }

    /// Delete self-destructed accounts and take the sub-state
    pub fn finalize(&mut self) -> SubState {
        let substate = std::mem::take(&mut self.state.substate);
        for address in &substate.selfdestructs {
            self.state.accounts.remove(address);
        }
        substate
    }

    // ==================== Execution ====================

    /// Run a top-level message: clears per-transaction state, executes,
    /// applies self-destructs and returns the result with its logs and
    /// sub-state.
    pub fn execute_transaction(&mut self, message: &Message) -> TransactionOutcome {
        self.begin_transaction(message.sender);
        let result = self.on_transaction_stack(|host| Host::call(host, message));
        self.end_transaction(result)
    }

    /// Run `code` as the outermost frame of `message` without moving value
    /// or looking up the destination's code.
    pub fn execute_code(&mut self, message: &Message, code: &[u8]) -> TransactionOutcome {
        self.begin_transaction(message.sender);
        let result = self.on_transaction_stack(|host| {
            let snapshot = host.snapshot();
            let vm = host.vm.clone();
            let result = vm.execute(host, message, code);
            if result.status_code == StatusCode::Success {
                host.commit_snapshot(snapshot);
            } else {
                host.revert_to_snapshot(snapshot);
            }
            result
        });
        self.end_transaction(result)
    }

    /// Run `f` on a thread whose stack holds `max_call_depth` nested frames.
    ///
    /// Nested calls recurse through [`Host::call`], so the caller's own
    /// thread is not assumed to have room for a full-depth chain.
    fn on_transaction_stack<F>(&mut self, f: F) -> ExecutionResult
    where
        F: FnOnce(&mut Self) -> ExecutionResult + Send,
    {
        let frames = usize::try_from(self.config().max_call_depth).unwrap_or(0);
        let stack_size = frames
            .saturating_add(1)
            .saturating_mul(FRAME_STACK_BYTES)
            .max(MIN_TRANSACTION_STACK);

        std::thread::scope(|scope| {
            let spawned = std::thread::Builder::new()
                .name("zxc-transaction".to_string())
                .stack_size(stack_size)
                .spawn_scoped(scope, move || f(self));
            match spawned {
                Ok(handle) => handle.join().unwrap_or_else(|_| {
                    warn!("transaction thread panicked");
                    ExecutionResult::failure(StatusCode::InternalError)
                }),
                Err(e) => {
                    warn!(error = %e, "failed to spawn transaction thread");
                    ExecutionResult::failure(StatusCode::InternalError)
                }
            }
        })
    }

    fn begin_transaction(&mut self, origin: Address) {
        self.origin = origin;
        self.originals.clear();
        self.state.logs.clear();
        self.state.substate.clear();
    }

    fn end_transaction(&mut self, result: ExecutionResult) -> TransactionOutcome {
        if self.state.tables.in_transaction() {
            debug!("table transaction left open, rolling back");
            self.state.tables.abort();
        }
        self.queries.clear();

        let logs = std::mem::take(&mut self.state.logs);
        let substate = self.finalize();
        TransactionOutcome {
            result,
            logs,
            substate,
        }
    }

    fn call_frame(&mut self, message: &Message) -> ExecutionResult {
        debug!(
            kind = ?message.kind,
            depth = message.depth,
            to = %message.destination,
            code = %message.code_address,
            gas = message.gas,
            "dispatch call"
        );
        let snapshot = self.snapshot();

        if matches!(message.kind, CallKind::Call | CallKind::CallCode)
            && !self.transfer(&message.sender, &message.destination, message.value)
        {
            self.revert_to_snapshot(snapshot);
            return ExecutionResult::failure(StatusCode::Failure);
        }

        let code = self.code(&message.code_address).to_vec();
        if code.is_empty() {
            self.commit_snapshot(snapshot);
            return ExecutionResult::success(message.gas, Vec::new());
        }

        let vm = self.vm.clone();
        let result = vm.execute(self, message, &code);
        if result.status_code == StatusCode::Success {
            self.commit_snapshot(snapshot);
        } else {
            self.revert_to_snapshot(snapshot);
        }
        result
    }

    fn create_frame(&mut self, message: &Message) -> ExecutionResult {
        let revision = self.revision();
        let sender = message.sender;
        let nonce = self.nonce(&sender);
        let address = match message.kind {
            CallKind::Create2 => create2_address(&sender, &message.create2_salt, &message.input),
            _ => create_address(&sender, nonce),
        };
        debug!(
            kind = ?message.kind,
            depth = message.depth,
            %sender,
            %address,
            gas = message.gas,
            "create contract"
        );

        let Some(next_nonce) = nonce.checked_add(1) else {
            return ExecutionResult::failure(StatusCode::Failure);
        };
        self.state.accounts.entry(sender).or_default().nonce = next_nonce;

        if self
            .account(&address)
            .is_some_and(|a| a.nonce != 0 || !a.code.is_empty())
        {
            debug!(%address, "create collision");
            return ExecutionResult::failure(StatusCode::Failure);
        }

        let snapshot = self.snapshot();
        if !self.transfer(&sender, &address, message.value) {
            self.revert_to_snapshot(snapshot);
            return ExecutionResult::failure(StatusCode::Failure);
        }
        let account = self.state.accounts.entry(address).or_default();
        if revision >= Revision::SpuriousDragon {
            account.nonce = 1;
        }

        let frame = Message {
            kind: message.kind,
            is_static: false,
            destination: address,
            code_address: address,
            input: Vec::new(),
            ..message.clone()
        };
        let vm = self.vm.clone();
        let result = vm.execute(self, &frame, &message.input);
        if result.status_code != StatusCode::Success {
            self.revert_to_snapshot(snapshot);
            return result;
        }

        let code = result.output;
        if revision >= Revision::SpuriousDragon && code.len() > cost::MAX_CODE_SIZE {
            debug!(%address, size = code.len(), "contract code too large");
            self.revert_to_snapshot(snapshot);
            return ExecutionResult::failure(StatusCode::OutOfGas);
        }

        let deposit = gas::code_deposit_cost(code.len()).unwrap_or(i64::MAX);
        if result.gas_left < deposit {
            if revision >= Revision::Homestead {
                self.revert_to_snapshot(snapshot);
                return ExecutionResult::failure(StatusCode::OutOfGas);
            }
            // Frontier keeps the account without code
            self.commit_snapshot(snapshot);
            return ExecutionResult::success(result.gas_left, Vec::new()).with_create_address(address);
        }

        self.deploy(address, code);
        self.commit_snapshot(snapshot);
        ExecutionResult::success(result.gas_left - deposit, Vec::new()).with_create_address(address)
    }
}

fn table_status<T>(result: Result<T, TableError>) -> i64 {
    match result {
        Ok(_) => 0,
        Err(e) => {
            debug!(error = %e, "table operation failed");
            1
        }
    }
}

/// Copy `value` into `out`, returning bytes written
fn write_value(value: Option<Vec<u8>>, out: &mut [u8]) -> usize {
    let Some(value) = value else { return 0 };
    let n = value.len().min(out.len());
    out[..n].copy_from_slice(&value[..n]);
    n
}

impl Host for MemoryHost {
    fn account_exists(&self, address: &Address) -> bool {
        self.state.accounts.contains_key(address)
    }

    fn get_storage(&self, address: &Address, key: &H256) -> H256 {
        self.storage(address, key)
    }

    fn set_storage(&mut self, address: &Address, key: &H256, value: &H256) -> StorageStatus {
        let current = self.storage(address, key);
        let original = *self.originals.entry((*address, *key)).or_insert(current);
        if current == *value {
            return StorageStatus::Unchanged;
        }

        let revision = self.revision();
        let net_metering = revision == Revision::Constantinople || revision >= Revision::Istanbul;
        // Clearing a non-zero slot always earns the refund, dirty or not
        let status = if value.is_zero() {
            StorageStatus::Deleted
        } else if net_metering && original != current {
            StorageStatus::ModifiedAgain
        } else if current.is_zero() {
            StorageStatus::Added
        } else {
            StorageStatus::Modified
        };

        self.state
            .accounts
            .entry(*address)
            .or_default()
            .set_storage_value(*key, *value);
        status
    }

    fn get_balance(&self, address: &Address) -> U256 {
        self.balance(address)
    }

    fn get_code_size(&self, address: &Address) -> usize {
        self.code(address).len()
    }

    fn get_code_hash(&self, address: &Address) -> H256 {
        self.account(address).map(Account::code_hash).unwrap_or_default()
    }

    fn copy_code(&self, address: &Address, offset: usize, buffer: &mut [u8]) -> usize {
        let src = self.code(address).get(offset..).unwrap_or(&[]);
        let n = src.len().min(buffer.len());
        buffer[..n].copy_from_slice(&src[..n]);
        n
    }

    fn selfdestruct(&mut self, address: &Address, beneficiary: &Address) {
        let balance = self.balance(address);
        self.transfer(address, beneficiary, balance);
        self.state.substate.selfdestructs.insert(*address);
    }

    fn call(&mut self, message: &Message) -> ExecutionResult {
        if message.depth > self.config().max_call_depth {
            debug!(depth = message.depth, "message beyond call depth limit");
            return ExecutionResult::failure(StatusCode::CallDepthExceeded);
        }
        if message.kind.is_create() {
            self.create_frame(message)
        } else {
            self.call_frame(message)
        }
    }

    fn get_tx_context(&self) -> TxContext {
        self.env.tx_context(self.origin)
    }

    fn get_block_hash(&self, number: i64) -> H256 {
        self.block_hashes.get(&number).copied().unwrap_or_default()
    }

    fn emit_log(&mut self, address: &Address, data: &[u8], topics: &[H256]) {
        self.state.logs.push(Log {
            address: *address,
            topics: topics.to_vec(),
            data: data.to_vec(),
        });
    }

    fn add_refund(&mut self, amount: u64) {
        let refunds = &mut self.state.substate.refunds;
        *refunds = refunds.saturating_add(amount);
    }
}

impl LedgerExtension for MemoryHost {
    fn table_create(&mut self, owner: &Address, name: &[u8], raw: &[u8]) -> i64 {
        table_status(self.state.tables.create(owner, name, raw))
    }

    fn table_rename(&mut self, owner: &Address, name: &[u8], raw: &[u8]) -> i64 {
        table_status(self.state.tables.rename(owner, name, raw))
    }

    fn table_insert(&mut self, owner: &Address, name: &[u8], raw: &[u8]) -> i64 {
        table_status(self.state.tables.insert(owner, name, raw))
    }

    fn table_delete(&mut self, owner: &Address, name: &[u8], raw: &[u8]) -> i64 {
        table_status(self.state.tables.delete(owner, name, raw))
    }

    fn table_drop(&mut self, owner: &Address, name: &[u8]) -> i64 {
        table_status(self.state.tables.drop_table(owner, name))
    }

    fn table_update(&mut self, owner: &Address, name: &[u8], values: &[u8], condition: &[u8]) -> i64 {
        table_status(self.state.tables.update(owner, name, values, condition))
    }

    fn table_grant(&mut self, owner: &Address, grantee: &Address, name: &[u8], raw: &[u8]) -> i64 {
        table_status(self.state.tables.grant(owner, grantee, name, raw))
    }

    fn table_get_handle(&mut self, owner: &Address, name: &[u8], raw: &[u8]) -> U256 {
        match self.state.tables.select(owner, name, raw) {
            Ok(query) => self.queries.open(query),
            Err(e) => {
                debug!(error = %e, "select failed");
                U256::zero()
            }
        }
    }

    fn table_get_lines(&self, handle: &U256) -> U256 {
        self.queries
            .get(handle)
            .map(|q| U256::from(q.rows.len()))
            .unwrap_or_default()
    }

    fn table_get_columns(&self, handle: &U256) -> U256 {
        self.queries
            .get(handle)
            .map(|q| U256::from(q.columns.len()))
            .unwrap_or_default()
    }

    fn get_column_by_name(&self, handle: &U256, row: &U256, column: &[u8], out: &mut [u8]) -> usize {
        let value = self.queries.get(handle).and_then(|q| {
            let column = std::str::from_utf8(column).ok()?;
            q.value(word_index(row), column)
        });
        write_value(value, out)
    }

    fn get_column_by_index(&self, handle: &U256, row: &U256, column: &U256, out: &mut [u8]) -> usize {
        let value = self
            .queries
            .get(handle)
            .and_then(|q| q.value_at(word_index(row), word_index(column)));
        write_value(value, out)
    }

    fn get_column_len_by_name(&self, handle: &U256, row: &U256, column: &[u8]) -> U256 {
        self.queries
            .get(handle)
            .and_then(|q| q.value(word_index(row), std::str::from_utf8(column).ok()?))
            .map(|v| U256::from(v.len()))
            .unwrap_or_default()
    }

    fn get_column_len_by_index(&self, handle: &U256, row: &U256, column: &U256) -> U256 {
        self.queries
            .get(handle)
            .and_then(|q| q.value_at(word_index(row), word_index(column)))
            .map(|v| U256::from(v.len()))
            .unwrap_or_default()
    }

    fn db_trans_begin(&mut self) {
        self.state.tables.begin();
    }

    fn db_trans_submit(&mut self) -> i64 {
        table_status(self.state.tables.submit())
    }

    fn release_resource(&mut self) {
        self.queries.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALICE: Address = Address::from_bytes([0xA1; 20]);
    const BOB: Address = Address::from_bytes([0xB0; 20]);

    fn word(n: u64) -> H256 {
        H256::from_word(&U256::from(n))
    }

    // ==================== Journal ====================

    #[test]
    fn test_snapshot_revert_and_commit() {
        let mut host = MemoryHost::default();
        host.set_account(ALICE, Account::with_balance(U256::from(10u64)));

        let outer = host.snapshot();
        assert!(host.transfer(&ALICE, &BOB, U256::from(4u64)));
        let inner = host.snapshot();
        assert!(host.transfer(&ALICE, &BOB, U256::from(1u64)));
        host.revert_to_snapshot(inner);
        assert_eq!(host.balance(&BOB), U256::from(4u64));

        host.commit_snapshot(outer);
        assert!(host.snapshots.is_empty());
        assert_eq!(host.balance(&ALICE), U256::from(6u64));
    }

    #[test]
    fn test_transfer_requires_balance() {
        let mut host = MemoryHost::default();
        assert!(!host.transfer(&ALICE, &BOB, U256::one()));
        assert!(!host.account_exists(&BOB));
        assert!(host.transfer(&ALICE, &BOB, U256::zero()));
        assert!(!host.account_exists(&BOB));
    }

    #[test]
    fn test_insert_account_twice() {
        let mut host = MemoryHost::default();
        host.insert_account(ALICE, Account::default()).unwrap();
        assert!(matches!(
            host.insert_account(ALICE, Account::default()),
            Err(StateError::AccountExists(_))
        ));
    }

    // ==================== Storage status ====================

    #[test]
    fn test_storage_status_transitions() {
        let mut host = MemoryHost::new(VmConfig::for_revision(Revision::Byzantium));
        assert_eq!(host.set_storage(&ALICE, &word(1), &word(5)), StorageStatus::Added);
        assert_eq!(host.set_storage(&ALICE, &word(1), &word(5)), StorageStatus::Unchanged);
        assert_eq!(host.set_storage(&ALICE, &word(1), &word(6)), StorageStatus::Modified);
        assert_eq!(host.set_storage(&ALICE, &word(1), &H256::ZERO), StorageStatus::Deleted);
        assert!(host.account(&ALICE).unwrap().storage.is_empty());
    }

    #[test]
    fn test_modified_again_under_net_metering() {
        let mut host = MemoryHost::new(VmConfig::for_revision(Revision::Istanbul));
        assert_eq!(host.set_storage(&ALICE, &word(1), &word(5)), StorageStatus::Added);
        assert_eq!(host.set_storage(&ALICE, &word(1), &word(6)), StorageStatus::ModifiedAgain);
        assert_eq!(host.set_storage(&ALICE, &word(1), &H256::ZERO), StorageStatus::Deleted);
        assert_eq!(host.set_storage(&ALICE, &word(1), &word(7)), StorageStatus::Added);

        let mut host = MemoryHost::new(VmConfig::for_revision(Revision::Petersburg));
        host.set_storage(&ALICE, &word(1), &word(5));
        assert_eq!(host.set_storage(&ALICE, &word(1), &word(6)), StorageStatus::Modified);
    }

    // ==================== Sub-state ====================

    #[test]
    fn test_selfdestruct_moves_balance_and_finalizes() {
        let mut host = MemoryHost::default();
        host.set_account(ALICE, Account::with_balance(U256::from(9u64)));
        host.selfdestruct(&ALICE, &BOB);
        host.add_refund(24_000);
        assert_eq!(host.balance(&BOB), U256::from(9u64));
        assert!(host.account_exists(&ALICE));

        let substate = host.finalize();
        assert!(substate.selfdestructs.contains(&ALICE));
        assert_eq!(substate.refunds, 24_000);
        assert!(!host.account_exists(&ALICE));
        assert!(host.substate().is_empty());
    }

    #[test]
    fn test_tx_context_from_env() {
        let mut host = MemoryHost::default();
        host.set_env(EnvInfo {
            number: 12,
            ..EnvInfo::default()
        });
        host.set_block_hash(11, word(0xabc));
        host.origin = ALICE;
        let ctx = host.get_tx_context();
        assert_eq!(ctx.number, 12);
        assert_eq!(ctx.origin, ALICE);
        assert_eq!(ctx.gas_price, U256::from(1000u64));
        assert_eq!(host.get_block_hash(11), word(0xabc));
        assert_eq!(host.get_block_hash(10), H256::ZERO);
    }

    // ==================== Tables ====================

    #[test]
    fn test_table_status_and_handles() {
        let mut host = MemoryHost::default();
        assert_eq!(host.table_create(&ALICE, b"t", br#"["k","v"]"#), 0);
        assert_eq!(host.table_create(&ALICE, b"t", br#"["k"]"#), 1);
        assert_eq!(host.table_insert(&ALICE, b"t", br#"{"k":"a","v":"hello"}"#), 0);

        let handle = host.table_get_handle(&ALICE, b"t", b"");
        assert_eq!(host.table_get_lines(&handle), U256::one());
        assert_eq!(host.table_get_columns(&handle), U256::from(2u64));

        let mut out = [0u8; 3];
        assert_eq!(host.get_column_by_name(&handle, &U256::zero(), b"v", &mut out), 3);
        assert_eq!(&out, b"hel");
        assert_eq!(
            host.get_column_len_by_index(&handle, &U256::zero(), &U256::one()),
            U256::from(5u64)
        );

        assert_eq!(host.table_get_handle(&ALICE, b"missing", b""), U256::zero());
        host.release_resource();
        assert_eq!(host.table_get_lines(&handle), U256::zero());
    }

    #[test]
    fn test_message_beyond_depth_limit() {
        let mut host = MemoryHost::new(VmConfig {
            max_call_depth: 2,
            ..VmConfig::default()
        });
        host.deploy(BOB, vec![0x00]);

        let too_deep = Message::call(ALICE, BOB, 1_000).with_depth(3);
        let result = host.call(&too_deep);
        assert_eq!(result.status_code, StatusCode::CallDepthExceeded);
        assert_eq!(result.gas_left, 0);

        let at_limit = Message::call(ALICE, BOB, 1_000).with_depth(2);
        assert_eq!(host.call(&at_limit).status_code, StatusCode::Success);
    }

    #[test]
    fn test_unsupported_token_ops() {
        let host = MemoryHost::default();
        assert_eq!(host.trust_limit(&ALICE, b"USD", 0, &BOB), zxc_evm::EXT_UNSUPPORTED);
    }
}
