//! Ledger extension opcodes (0xC0..0xD6)
//!
//! Table and token operations forwarded to [`LedgerExtension`]. Operands are
//! popped top first; names and payloads are read from memory as raw bytes.
//!
//! [`LedgerExtension`]: crate::host::LedgerExtension

use crate::error::{Fault, VmResult};
use crate::gas;
use crate::host::Host;
use crate::interpreter::{Control, Interpreter};
use crate::opcode::Opcode;
use crate::word;
use primitive_types::U256;

/// 1 when the host status is 0, else 0
fn ok_word(status: i64) -> U256 {
    if status == 0 {
        U256::one()
    } else {
        U256::zero()
    }
}

/// Opcodes that change ledger state and are rejected in static frames
fn is_mutating(op: Opcode) -> bool {
    matches!(
        op,
        Opcode::CREATETABLE
            | Opcode::DROPTABLE
            | Opcode::RENAMETABLE
            | Opcode::INSERTSQL
            | Opcode::DELETESQL
            | Opcode::UPDATESQL
            | Opcode::GRANTSQL
            | Opcode::TRANSBEGIN
            | Opcode::TRANSCOMMIT
            | Opcode::ACCOUNTSET
            | Opcode::TRANSFERFEESET
            | Opcode::TRUSTSET
            | Opcode::PAY
    )
}

impl<'a, H: Host + ?Sized> Interpreter<'a, H> {
    /// Read a table payload and charge for its size
    fn read_payload(&mut self, offset: &U256, size: &U256) -> VmResult<Vec<u8>> {
        let data = self.read_region(offset, size)?;
        self.consume_gas(gas::sql_data_cost(data.len() as u64).ok_or(Fault::OutOfGas)?)?;
        Ok(data)
    }

    fn pop_region(&mut self) -> VmResult<Vec<u8>> {
        let [offset, size] = self.stack.pop_n::<2>()?;
        self.read_region(&offset, &size)
    }

    fn pop_payload(&mut self) -> VmResult<Vec<u8>> {
        let [offset, size] = self.stack.pop_n::<2>()?;
        self.read_payload(&offset, &size)
    }

    pub(crate) fn op_extension(&mut self, op: Opcode) -> VmResult<Control> {
        if is_mutating(op) {
            self.require_non_static()?;
        }

        match op {
            Opcode::CREATETABLE
            | Opcode::RENAMETABLE
            | Opcode::INSERTSQL
            | Opcode::DELETESQL
            | Opcode::SELECTSQL => {
                let owner = self.pop_address()?;
                let name = self.pop_region()?;
                let raw = self.pop_payload()?;
                if op == Opcode::SELECTSQL {
                    let handle = self.host.table_get_handle(&owner, &name, &raw);
                    return self.push_word(handle);
                }
                let status = match op {
                    Opcode::CREATETABLE => self.host.table_create(&owner, &name, &raw),
                    Opcode::RENAMETABLE => self.host.table_rename(&owner, &name, &raw),
                    Opcode::INSERTSQL => self.host.table_insert(&owner, &name, &raw),
                    _ => self.host.table_delete(&owner, &name, &raw),
                };
                self.push_word(ok_word(status))
            }
            Opcode::DROPTABLE => {
                let owner = self.pop_address()?;
                let name = self.pop_region()?;
                let status = self.host.table_drop(&owner, &name);
                self.push_word(ok_word(status))
            }
            Opcode::UPDATESQL => {
                let owner = self.pop_address()?;
                let name = self.pop_region()?;
                let values = self.pop_payload()?;
                let condition = self.pop_payload()?;
                let status = self.host.table_update(&owner, &name, &values, &condition);
                self.push_word(ok_word(status))
            }
            Opcode::GRANTSQL => {
                let owner = self.pop_address()?;
                let grantee = self.pop_address()?;
                let name = self.pop_region()?;
                let raw = self.pop_payload()?;
                let status = self.host.table_grant(&owner, &grantee, &name, &raw);
                self.push_word(ok_word(status))
            }
            Opcode::TRANSBEGIN => {
                self.host.db_trans_begin();
                Ok(Control::Next)
            }
            Opcode::TRANSCOMMIT => {
                let status = self.host.db_trans_submit();
                self.push_word(ok_word(status))
            }
            Opcode::GETROWSIZE => {
                let handle = self.stack.pop()?;
                let rows = self.host.table_get_lines(&handle);
                self.push_word(rows)
            }
            Opcode::GETCOLSIZE => {
                let handle = self.stack.pop()?;
                let columns = self.host.table_get_columns(&handle);
                self.push_word(columns)
            }
            Opcode::GETVALUEBYKEY => {
                let [handle, row] = self.stack.pop_n::<2>()?;
                let column = self.pop_region()?;
                let [out_offset, out_size] = self.stack.pop_n::<2>()?;
                let (out_offset, out_size) = self.expand_memory(&out_offset, &out_size)?;
                let out = self.memory.slice_mut(out_offset, out_size);
                let written = self.host.get_column_by_name(&handle, &row, &column, out).min(out_size);
                self.push_word(U256::from(written))
            }
            Opcode::GETVALUEBYINDEX => {
                let [handle, row, column, out_offset, out_size] = self.stack.pop_n::<5>()?;
                let (out_offset, out_size) = self.expand_memory(&out_offset, &out_size)?;
                let out = self.memory.slice_mut(out_offset, out_size);
                let written = self.host.get_column_by_index(&handle, &row, &column, out).min(out_size);
                self.push_word(U256::from(written))
            }
            Opcode::EXITFUNC => {
                self.host.release_resource();
                Ok(Control::Next)
            }
            Opcode::GETLENBYKEY => {
                let [handle, row] = self.stack.pop_n::<2>()?;
                let column = self.pop_region()?;
                let len = self.host.get_column_len_by_name(&handle, &row, &column);
                self.push_word(len)
            }
            Opcode::GETLENBYINDEX => {
                let [handle, row, column] = self.stack.pop_n::<3>()?;
                let len = self.host.get_column_len_by_index(&handle, &row, &column);
                self.push_word(len)
            }
            Opcode::ACCOUNTSET => {
                let account = self.pop_address()?;
                let [flag, set] = self.stack.pop_n::<2>()?;
                let status = self.host.account_set(&account, flag.low_u32(), !set.is_zero());
                self.push_word(ok_word(status))
            }
            Opcode::TRANSFERFEESET => {
                let account = self.pop_address()?;
                let rate = self.pop_region()?;
                let min = self.pop_region()?;
                let max = self.pop_region()?;
                let status = self.host.transfer_fee_set(&account, &rate, &min, &max);
                self.push_word(ok_word(status))
            }
            Opcode::TRUSTSET => {
                let account = self.pop_address()?;
                let value = self.pop_region()?;
                let currency = self.pop_region()?;
                let gateway = self.pop_address()?;
                let status = self.host.trust_set(&account, &value, &currency, &gateway);
                self.push_word(ok_word(status))
            }
            Opcode::TRUSTLIMIT | Opcode::GATEWAYBALANCE => {
                let account = self.pop_address()?;
                let currency = self.pop_region()?;
                let power = self.stack.pop()?;
                let power = word::to_u64(&power).unwrap_or(u64::MAX);
                let gateway = self.pop_address()?;
                let amount = if op == Opcode::TRUSTLIMIT {
                    self.host.trust_limit(&account, &currency, power, &gateway)
                } else {
                    self.host.gateway_balance(&account, &currency, power, &gateway)
                };
                self.push_word(word::from_i64(amount))
            }
            Opcode::PAY => {
                let account = self.pop_address()?;
                let receiver = self.pop_address()?;
                let value = self.pop_region()?;
                let send_max = self.pop_region()?;
                let currency = self.pop_region()?;
                let gateway = self.pop_address()?;
                let status = self
                    .host
                    .pay(&account, &receiver, &value, &send_max, &currency, &gateway);
                self.push_word(ok_word(status))
            }
            _ => Err(Fault::BadInstruction(op.0)),
        }
    }
}
