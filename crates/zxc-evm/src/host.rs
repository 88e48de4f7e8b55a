//! Host interface
//!
//! The ledger implements [`Host`]; the interpreter borrows it mutably for the
//! lifetime of a frame and reaches all account state, logs and nested calls
//! through it.

use crate::message::{Message, StorageStatus, TxContext};
use crate::result::ExecutionResult;
use primitive_types::U256;
use zxc_primitives::{Address, H256};

/// Status returned by ledger extension defaults
pub const EXT_UNSUPPORTED: i64 = -1;

/// Account state and environment access required by the interpreter
pub trait Host: LedgerExtension {
    /// Whether the account exists
    fn account_exists(&self, address: &Address) -> bool;

    /// Read a storage slot
    fn get_storage(&self, address: &Address, key: &H256) -> H256;

    /// Write a storage slot and report the transition
    fn set_storage(&mut self, address: &Address, key: &H256, value: &H256) -> StorageStatus;

    /// Account balance
    fn get_balance(&self, address: &Address) -> U256;

    /// Size of the account's code
    fn get_code_size(&self, address: &Address) -> usize;

    /// Keccak-256 of the account's code, zero for a non-existent account
    fn get_code_hash(&self, address: &Address) -> H256;

    /// Copy code starting at `offset` into `buffer`, returning the number of bytes copied
    fn copy_code(&self, address: &Address, offset: usize, buffer: &mut [u8]) -> usize;

    /// Schedule `address` for deletion, crediting its balance to `beneficiary`
    fn selfdestruct(&mut self, address: &Address, beneficiary: &Address);

    /// Run a nested call or create
    fn call(&mut self, message: &Message) -> ExecutionResult;

    /// Transaction and block context
    fn get_tx_context(&self) -> TxContext;

    /// Hash of a past block
    fn get_block_hash(&self, number: i64) -> H256;

    /// Record a log entry
    fn emit_log(&mut self, address: &Address, data: &[u8], topics: &[H256]);

    /// Credit the transaction refund counter
    fn add_refund(&mut self, amount: u64);
}

/// Ledger operations behind the 0xC0..0xD6 opcodes.
///
/// Every method has a default that reports [`EXT_UNSUPPORTED`] or a zero
/// handle, so a host only overrides what it backs. Status results use 0 for
/// success. Names and raw payloads are passed as the bytes read from memory.
#[allow(unused_variables)]
pub trait LedgerExtension {
    /// Create a table
    fn table_create(&mut self, owner: &Address, name: &[u8], raw: &[u8]) -> i64 {
        EXT_UNSUPPORTED
    }

    /// Rename a table; `raw` holds the new name
    fn table_rename(&mut self, owner: &Address, name: &[u8], raw: &[u8]) -> i64 {
        EXT_UNSUPPORTED
    }

    /// Insert rows
    fn table_insert(&mut self, owner: &Address, name: &[u8], raw: &[u8]) -> i64 {
        EXT_UNSUPPORTED
    }

    /// Delete rows matching `raw`
    fn table_delete(&mut self, owner: &Address, name: &[u8], raw: &[u8]) -> i64 {
        EXT_UNSUPPORTED
    }

    /// Drop a table
    fn table_drop(&mut self, owner: &Address, name: &[u8]) -> i64 {
        EXT_UNSUPPORTED
    }

    /// Update rows matching `condition` with `values`
    fn table_update(&mut self, owner: &Address, name: &[u8], values: &[u8], condition: &[u8]) -> i64 {
        EXT_UNSUPPORTED
    }

    /// Grant `grantee` the permissions in `raw`
    fn table_grant(&mut self, owner: &Address, grantee: &Address, name: &[u8], raw: &[u8]) -> i64 {
        EXT_UNSUPPORTED
    }

    /// Run a query and return a result handle, zero on failure
    fn table_get_handle(&mut self, owner: &Address, name: &[u8], raw: &[u8]) -> U256 {
        U256::zero()
    }

    /// Row count of a result
    fn table_get_lines(&self, handle: &U256) -> U256 {
        U256::zero()
    }

    /// Column count of a result
    fn table_get_columns(&self, handle: &U256) -> U256 {
        U256::zero()
    }

    /// Copy a field selected by column name into `out`, returning the bytes written
    fn get_column_by_name(&self, handle: &U256, row: &U256, column: &[u8], out: &mut [u8]) -> usize {
        0
    }

    /// Copy a field selected by column index into `out`, returning the bytes written
    fn get_column_by_index(&self, handle: &U256, row: &U256, column: &U256, out: &mut [u8]) -> usize {
        0
    }

    /// Length of a field selected by column name
    fn get_column_len_by_name(&self, handle: &U256, row: &U256, column: &[u8]) -> U256 {
        U256::zero()
    }

    /// Length of a field selected by column index
    fn get_column_len_by_index(&self, handle: &U256, row: &U256, column: &U256) -> U256 {
        U256::zero()
    }

    /// Open a table transaction
    fn db_trans_begin(&mut self) {}

    /// Commit the open table transaction
    fn db_trans_submit(&mut self) -> i64 {
        EXT_UNSUPPORTED
    }

    /// Release query handles held by the current frame
    fn release_resource(&mut self) {}

    /// Set or clear an account flag
    fn account_set(&mut self, account: &Address, flag: u32, set: bool) -> i64 {
        EXT_UNSUPPORTED
    }

    /// Configure issuer transfer fees
    fn transfer_fee_set(&mut self, account: &Address, rate: &[u8], min: &[u8], max: &[u8]) -> i64 {
        EXT_UNSUPPORTED
    }

    /// Create or modify a trust line
    fn trust_set(&mut self, account: &Address, value: &[u8], currency: &[u8], gateway: &Address) -> i64 {
        EXT_UNSUPPORTED
    }

    /// Trust line limit scaled by `10^power`
    fn trust_limit(&self, account: &Address, currency: &[u8], power: u64, gateway: &Address) -> i64 {
        EXT_UNSUPPORTED
    }

    /// Gateway balance scaled by `10^power`
    fn gateway_balance(&self, account: &Address, currency: &[u8], power: u64, gateway: &Address) -> i64 {
        EXT_UNSUPPORTED
    }

    /// Issued-currency payment
    #[allow(clippy::too_many_arguments)]
    fn pay(
        &mut self,
        account: &Address,
        receiver: &Address,
        value: &[u8],
        send_max: &[u8],
        currency: &[u8],
        gateway: &Address,
    ) -> i64 {
        EXT_UNSUPPORTED
    }
}
