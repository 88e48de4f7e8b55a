//! CALL / CREATE family dispatch

use crate::error::{Fault, VmResult};
use crate::gas::{self, cost};
use crate::host::Host;
use crate::interpreter::{Control, Interpreter};
use crate::message::{CallKind, Message};
use crate::opcode::Opcode;
use crate::revision::Revision;
use crate::word;
use primitive_types::U256;
use tracing::trace;
use zxc_primitives::{Address, H256};

impl<'a, H: Host + ?Sized> Interpreter<'a, H> {
    /// CALL, CALLCODE, DELEGATECALL and STATICCALL
    pub(crate) fn op_call(&mut self, op: Opcode) -> VmResult<Control> {
        let has_value = matches!(op, Opcode::CALL | Opcode::CALLCODE);

        let requested = self.stack.pop()?;
        let target = self.pop_address()?;
        let value = if has_value { self.stack.pop()? } else { U256::zero() };
        let [in_offset, in_size, out_offset, out_size] = self.stack.pop_n::<4>()?;

        if op == Opcode::CALL && !value.is_zero() {
            self.require_non_static()?;
        }

        let revision = self.revision();
        let transfers_value = has_value && !value.is_zero();

        let mut extra = 0;
        if op == Opcode::CALL
            && (transfers_value || revision < Revision::SpuriousDragon)
            && !self.host.account_exists(&target)
        {
            extra += cost::NEW_ACCOUNT;
        }
        if transfers_value {
            extra += cost::CALL_VALUE;
        }
        self.consume_gas(extra)?;

        let (in_offset, in_size) = self.expand_memory(&in_offset, &in_size)?;
        let (out_offset, out_size) = self.expand_memory(&out_offset, &out_size)?;

        let mut gas = match word::to_i63(&requested) {
            Some(g) => g,
            None if revision >= Revision::TangerineWhistle => i64::MAX,
            None => return Err(Fault::OutOfGas),
        };
        if revision >= Revision::TangerineWhistle {
            gas = gas.min(gas::all_but_one_64th(self.gas_left));
        }
        self.consume_gas(gas)?;
        if transfers_value {
            gas += cost::CALL_STIPEND;
        }

        let own = self.message.destination;
        if self.message.depth >= self.config.max_call_depth
            || (transfers_value && self.host.get_balance(&own) < value)
        {
            trace!(depth = self.message.depth, "call skipped: depth or balance");
            self.return_data.clear();
            self.gas_left += gas;
            self.stack.push(U256::zero())?;
            return Ok(Control::Next);
        }

        let (kind, destination, sender, value) = match op {
            Opcode::CALLCODE => (CallKind::CallCode, own, own, value),
            Opcode::DELEGATECALL => (
                CallKind::DelegateCall,
                own,
                self.message.sender,
                self.message.value,
            ),
            _ => (CallKind::Call, target, own, value),
        };

        let message = Message {
            kind,
            is_static: self.message.is_static || op == Opcode::STATICCALL,
            depth: self.message.depth + 1,
            gas,
            destination,
            sender,
            code_address: target,
            input: self.memory.slice(in_offset, in_size).to_vec(),
            value,
            create2_salt: H256::ZERO,
        };

        let result = self.host.call(&message);

        let copied = result.output.len().min(out_size);
        self.memory
            .slice_mut(out_offset, copied)
            .copy_from_slice(&result.output[..copied]);
        self.gas_left += result.gas_left;
        self.return_data = result.output;
        self.stack.push(bool_word(result.status_code.is_success()))?;
        Ok(Control::Next)
    }

    /// CREATE and CREATE2
    pub(crate) fn op_create(&mut self, op: Opcode) -> VmResult<Control> {
        self.require_non_static()?;

        let [value, offset, size] = self.stack.pop_n::<3>()?;
        let salt = if op == Opcode::CREATE2 {
            self.stack.pop()?
        } else {
            U256::zero()
        };

        let (offset, size) = self.expand_memory(&offset, &size)?;
        if op == Opcode::CREATE2 {
            self.consume_gas(gas::create2_word_cost(size as u64).ok_or(Fault::OutOfGas)?)?;
        }

        self.return_data.clear();

        let own = self.message.destination;
        if self.message.depth >= self.config.max_call_depth || self.host.get_balance(&own) < value {
            trace!(depth = self.message.depth, "create skipped: depth or balance");
            self.stack.push(U256::zero())?;
            return Ok(Control::Next);
        }

        let mut gas = self.gas_left;
        if self.revision() >= Revision::TangerineWhistle {
            gas = gas::all_but_one_64th(gas);
        }
        self.consume_gas(gas)?;

        let message = Message {
            kind: if op == Opcode::CREATE2 {
                CallKind::Create2
            } else {
                CallKind::Create
            },
            is_static: false,
            depth: self.message.depth + 1,
            gas,
            destination: Address::ZERO,
            sender: own,
            code_address: Address::ZERO,
            input: self.memory.slice(offset, size).to_vec(),
            value,
            create2_salt: H256::from_word(&salt),
        };

        let result = self.host.call(&message);
        self.gas_left += result.gas_left;

        if result.is_success() {
            let created = result
                .create_address
                .ok_or_else(|| Fault::Internal("create succeeded without an address".to_string()))?;
            self.stack.push(created.to_word())?;
        } else {
            self.return_data = result.output;
            self.stack.push(U256::zero())?;
        }
        Ok(Control::Next)
    }
}

fn bool_word(b: bool) -> U256 {
    if b {
        U256::one()
    } else {
        U256::zero()
    }
}
