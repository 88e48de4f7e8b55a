//! Bytecode interpreter

use crate::config::VmConfig;
use crate::error::{Fault, VmResult};
use crate::gas::{self, cost};
use crate::host::Host;
use crate::memory::Memory;
use crate::message::{Message, StorageStatus, TxContext};
use crate::metrics::{self, MetricsTable};
use crate::opcode::Opcode;
use crate::result::{ExecutionResult, StatusCode};
use crate::revision::Revision;
use crate::stack::Stack;
use crate::word;
use primitive_types::U256;
use tracing::{debug, trace, warn};
use zxc_crypto::keccak256;
use zxc_primitives::{Address, H256};

/// Interpreter entry point, holding the configuration shared by all frames
#[derive(Debug, Clone, Default)]
pub struct Vm {
    config: VmConfig,
}

impl Vm {
    /// Create an interpreter with the given configuration
    pub fn new(config: VmConfig) -> Self {
        Self { config }
    }

    /// Active configuration
    pub fn config(&self) -> &VmConfig {
        &self.config
    }

    /// Execute `code` for `message` against `host`.
    ///
    /// Never panics on malformed input: every fault becomes a status code in
    /// the returned result.
    pub fn execute<H: Host + ?Sized>(&self, host: &mut H, message: &Message, code: &[u8]) -> ExecutionResult {
        debug!(
            kind = ?message.kind,
            depth = message.depth,
            gas = message.gas,
            is_static = message.is_static,
            code_len = code.len(),
            "frame entry"
        );

        if message.has_invalid_flags() {
            warn!(kind = ?message.kind, "static flag on a non-call message");
            return ExecutionResult::failure(StatusCode::InternalError);
        }

        let result = Interpreter::new(host, message, code, &self.config).run();

        debug!(
            depth = message.depth,
            status = %result.status_code,
            gas_left = result.gas_left,
            output_len = result.output.len(),
            "frame exit"
        );
        result
    }
}

/// Execute with the default configuration for `revision`
pub fn execute<H: Host + ?Sized>(
    host: &mut H,
    revision: Revision,
    message: &Message,
    code: &[u8],
) -> ExecutionResult {
    Vm::new(VmConfig::for_revision(revision)).execute(host, message, code)
}

/// Valid jump destinations: JUMPDEST bytes that are not PUSH data
#[derive(Debug, Clone)]
pub struct JumpTable(Vec<bool>);

impl JumpTable {
    /// Analyze bytecode
    pub fn analyze(code: &[u8]) -> Self {
        let mut valid = vec![false; code.len()];
        let mut i = 0;
        while i < code.len() {
            let op = Opcode(code[i]);
            if op == Opcode::JUMPDEST {
                valid[i] = true;
            } else if let Some(n) = op.push_size() {
                i += n;
            }
            i += 1;
        }
        JumpTable(valid)
    }

    /// Whether `dest` is a valid jump target
    pub fn is_valid(&self, dest: usize) -> bool {
        self.0.get(dest).copied().unwrap_or(false)
    }
}

/// What the loop does after an instruction
#[derive(Debug)]
pub(crate) enum Control {
    /// Advance past the opcode byte
    Next,
    /// PC already set by a jump
    Jumped,
    /// Frame finished
    Halt(Halt),
}

/// Normal frame termination
#[derive(Debug)]
pub(crate) enum Halt {
    Stop,
    Return(Vec<u8>),
    Revert(Vec<u8>),
}

/// One call frame
pub(crate) struct Interpreter<'a, H: Host + ?Sized> {
    pub(crate) host: &'a mut H,
    pub(crate) message: &'a Message,
    pub(crate) config: &'a VmConfig,
    code: &'a [u8],
    jump_table: JumpTable,
    metrics: &'static MetricsTable,
    pc: usize,
    pub(crate) gas_left: i64,
    pub(crate) stack: Stack,
    pub(crate) memory: Memory,
    pub(crate) return_data: Vec<u8>,
    tx_context: Option<TxContext>,
}

impl<'a, H: Host + ?Sized> Interpreter<'a, H> {
    fn new(host: &'a mut H, message: &'a Message, code: &'a [u8], config: &'a VmConfig) -> Self {
        Self {
            host,
            message,
            config,
            code,
            jump_table: JumpTable::analyze(code),
            metrics: metrics::table(config.revision, config.ledger_extensions),
            pc: 0,
            gas_left: message.gas,
            stack: Stack::new(),
            memory: Memory::new(),
            return_data: Vec::new(),
            tx_context: None,
        }
    }

    /// Run until the frame halts or faults
    fn run(mut self) -> ExecutionResult {
        loop {
            match self.step() {
                Ok(Control::Next) => self.pc += 1,
                Ok(Control::Jumped) => {}
                Ok(Control::Halt(Halt::Stop)) => {
                    return ExecutionResult::success(self.gas_left, Vec::new());
                }
                Ok(Control::Halt(Halt::Return(output))) => {
                    return ExecutionResult::success(self.gas_left, output);
                }
                Ok(Control::Halt(Halt::Revert(output))) => {
                    return ExecutionResult::revert(self.gas_left, output);
                }
                Err(fault) => {
                    if let Fault::Internal(reason) = &fault {
                        warn!(pc = self.pc, %reason, "internal error");
                    } else {
                        debug!(pc = self.pc, %fault, "frame fault");
                    }
                    return ExecutionResult::failure(fault.status_code());
                }
            }
        }
    }

    fn step(&mut self) -> VmResult<Control> {
        let byte = self.code.get(self.pc).copied().unwrap_or(0);
        let op = Opcode(byte);

        let metrics = match self.metrics[byte as usize] {
            Some(m) => m,
            None if op == Opcode::INVALID => return Err(Fault::InvalidInstruction),
            None => return Err(Fault::BadInstruction(byte)),
        };

        self.stack
            .require(metrics.stack_height_required, metrics.stack_height_change)?;

        if self.config.trace_steps {
            trace!(
                pc = self.pc,
                op = %op,
                gas_left = self.gas_left,
                stack = self.stack.len(),
                top = ?self.stack.peek(0).ok(),
                memory = self.memory.size(),
                "step"
            );
        }

        self.consume_gas(metrics.gas_cost)?;
        self.execute(op)
    }

    // ==================== Helpers ====================

    pub(crate) fn revision(&self) -> Revision {
        self.config.revision
    }

    pub(crate) fn consume_gas(&mut self, amount: i64) -> VmResult<()> {
        if self.gas_left < amount {
            return Err(Fault::OutOfGas);
        }
        self.gas_left -= amount;
        Ok(())
    }

    /// Charge and grow memory to cover `offset..offset + size`.
    ///
    /// Returns the region as native offsets. A zero size never grows memory
    /// and yields `(0, 0)` whatever the offset.
    pub(crate) fn expand_memory(&mut self, offset: &U256, size: &U256) -> VmResult<(usize, usize)> {
        if size.is_zero() {
            return Ok((0, 0));
        }
        let offset = word::to_i63(offset).ok_or(Fault::OutOfGas)? as u64;
        let size = word::to_i63(size).ok_or(Fault::OutOfGas)? as u64;
        let end = offset + size;

        let new_words = gas::num_words(end);
        let current_words = self.memory.words();
        if new_words > current_words {
            let cost = gas::memory_expansion_cost(current_words, new_words).ok_or(Fault::OutOfGas)?;
            self.consume_gas(cost)?;
            let end = usize::try_from(end).map_err(|_| Fault::OutOfGas)?;
            self.memory.grow(end);
        }
        Ok((offset as usize, size as usize))
    }

    /// Expand memory for a region and copy it out
    pub(crate) fn read_region(&mut self, offset: &U256, size: &U256) -> VmResult<Vec<u8>> {
        let (offset, size) = self.expand_memory(offset, size)?;
        Ok(self.memory.slice(offset, size).to_vec())
    }

    pub(crate) fn require_non_static(&self) -> VmResult<()> {
        if self.message.is_static {
            return Err(Fault::StaticModeViolation);
        }
        Ok(())
    }

    pub(crate) fn pop_address(&mut self) -> VmResult<Address> {
        Ok(Address::from_word(&self.stack.pop()?))
    }

    fn tx_context(&mut self) -> &TxContext {
        if self.tx_context.is_none() {
            self.tx_context = Some(self.host.get_tx_context());
        }
        self.tx_context.get_or_insert_with(TxContext::default)
    }

    fn binary(&mut self, f: fn(U256, U256) -> U256) -> VmResult<Control> {
        let [a, b] = self.stack.pop_n::<2>()?;
        self.stack.push(f(a, b))?;
        Ok(Control::Next)
    }

    fn ternary(&mut self, f: fn(U256, U256, U256) -> U256) -> VmResult<Control> {
        let [a, b, c] = self.stack.pop_n::<3>()?;
        self.stack.push(f(a, b, c))?;
        Ok(Control::Next)
    }

    pub(crate) fn push_word(&mut self, value: U256) -> VmResult<Control> {
        self.stack.push(value)?;
        Ok(Control::Next)
    }

    /// Copy opcode body: charge per word, then copy from `source` zero-padded
    fn copy_to_memory(&mut self, source: Source, mem_offset: U256, src_offset: U256, size: U256) -> VmResult<()> {
        let (dest, len) = self.expand_memory(&mem_offset, &size)?;
        self.consume_gas(gas::copy_cost(len as u64).ok_or(Fault::OutOfGas)?)?;
        let src_offset = word::to_u64(&src_offset)
            .and_then(|o| usize::try_from(o).ok())
            .unwrap_or(usize::MAX);
        let data = match source {
            Source::Input => &self.message.input[..],
            Source::Code => self.code,
        };
        self.memory.copy_padded(dest, data, src_offset, len);
        Ok(())
    }

    fn jump(&mut self, dest: U256) -> VmResult<Control> {
        let target = word::to_u64(&dest).unwrap_or(u64::MAX);
        match usize::try_from(target) {
            Ok(pc) if self.jump_table.is_valid(pc) => {
                self.pc = pc;
                Ok(Control::Jumped)
            }
            _ => Err(Fault::BadJumpDestination(target)),
        }
    }

    // ==================== Dispatch ====================

    fn execute(&mut self, op: Opcode) -> VmResult<Control> {
        match op {
            Opcode::STOP => Ok(Control::Halt(Halt::Stop)),

            // Arithmetic
            Opcode::ADD => self.binary(word::add),
            Opcode::MUL => self.binary(word::mul),
            Opcode::SUB => self.binary(word::sub),
            Opcode::DIV => self.binary(word::div),
            Opcode::SDIV => self.binary(word::sdiv),
            Opcode::MOD => self.binary(word::rem),
            Opcode::SMOD => self.binary(word::smod),
            Opcode::ADDMOD => self.ternary(word::addmod),
            Opcode::MULMOD => self.ternary(word::mulmod),
            Opcode::EXP => {
                let [base, exponent] = self.stack.pop_n::<2>()?;
                self.consume_gas(gas::exp_cost(&exponent, self.revision()))?;
                self.push_word(word::exp(base, exponent))
            }
            Opcode::SIGNEXTEND => self.binary(word::signextend),

            // Comparison & bitwise
            Opcode::LT => self.binary(word::lt),
            Opcode::GT => self.binary(word::gt),
            Opcode::SLT => self.binary(word::slt),
            Opcode::SGT => self.binary(word::sgt),
            Opcode::EQ => self.binary(word::eq),
            Opcode::ISZERO => {
                let a = self.stack.pop()?;
                self.push_word(word::iszero(a))
            }
            Opcode::AND => self.binary(|a, b| a & b),
            Opcode::OR => self.binary(|a, b| a | b),
            Opcode::XOR => self.binary(|a, b| a ^ b),
            Opcode::NOT => {
                let a = self.stack.pop()?;
                self.push_word(!a)
            }
            Opcode::BYTE => self.binary(word::byte),
            Opcode::SHL => self.binary(word::shl),
            Opcode::SHR => self.binary(word::shr),
            Opcode::SAR => self.binary(word::sar),

            Opcode::SHA3 => {
                let [offset, size] = self.stack.pop_n::<2>()?;
                let (offset, size) = self.expand_memory(&offset, &size)?;
                self.consume_gas(gas::sha3_word_cost(size as u64).ok_or(Fault::OutOfGas)?)?;
                let hash = keccak256(self.memory.slice(offset, size));
                self.push_word(hash.to_word())
            }

            // Environment
            Opcode::ADDRESS => self.push_word(self.message.destination.to_word()),
            Opcode::BALANCE => {
                let address = self.pop_address()?;
                let balance = self.host.get_balance(&address);
                self.push_word(balance)
            }
            Opcode::ORIGIN => {
                let origin = self.tx_context().origin;
                self.push_word(origin.to_word())
            }
            Opcode::CALLER => self.push_word(self.message.sender.to_word()),
            Opcode::CALLVALUE => self.push_word(self.message.value),
            Opcode::CALLDATALOAD => {
                let offset = self.stack.pop()?;
                self.push_word(load_padded(&self.message.input, &offset))
            }
            Opcode::CALLDATASIZE => self.push_word(U256::from(self.message.input.len())),
            Opcode::CALLDATACOPY => {
                let [mem_offset, data_offset, size] = self.stack.pop_n::<3>()?;
                self.copy_to_memory(Source::Input, mem_offset, data_offset, size)?;
                Ok(Control::Next)
            }
            Opcode::CODESIZE => self.push_word(U256::from(self.code.len())),
            Opcode::CODECOPY => {
                let [mem_offset, code_offset, size] = self.stack.pop_n::<3>()?;
                self.copy_to_memory(Source::Code, mem_offset, code_offset, size)?;
                Ok(Control::Next)
            }
            Opcode::GASPRICE => {
                let price = self.tx_context().gas_price;
                self.push_word(price)
            }
            Opcode::EXTCODESIZE => {
                let address = self.pop_address()?;
                let size = self.host.get_code_size(&address);
                self.push_word(U256::from(size))
            }
            Opcode::EXTCODECOPY => {
                let address = self.pop_address()?;
                let [mem_offset, code_offset, size] = self.stack.pop_n::<3>()?;
                let (dest, len) = self.expand_memory(&mem_offset, &size)?;
                self.consume_gas(gas::copy_cost(len as u64).ok_or(Fault::OutOfGas)?)?;
                if len > 0 {
                    let code_offset = word::to_u64(&code_offset)
                        .and_then(|o| usize::try_from(o).ok())
                        .unwrap_or(usize::MAX);
                    let buffer = self.memory.slice_mut(dest, len);
                    let copied = self.host.copy_code(&address, code_offset, buffer).min(len);
                    buffer[copied..].fill(0);
                }
                Ok(Control::Next)
            }
            Opcode::RETURNDATASIZE => self.push_word(U256::from(self.return_data.len())),
            Opcode::RETURNDATACOPY => {
                let [mem_offset, data_offset, size] = self.stack.pop_n::<3>()?;
                let (end, overflow) = data_offset.overflowing_add(size);
                if overflow || end > U256::from(self.return_data.len()) {
                    return Err(Fault::BufferOverrun);
                }
                let (dest, len) = self.expand_memory(&mem_offset, &size)?;
                self.consume_gas(gas::copy_cost(len as u64).ok_or(Fault::OutOfGas)?)?;
                if len > 0 {
                    let start = data_offset.low_u64() as usize;
                    self.memory
                        .slice_mut(dest, len)
                        .copy_from_slice(&self.return_data[start..start + len]);
                }
                Ok(Control::Next)
            }
            Opcode::EXTCODEHASH => {
                let address = self.pop_address()?;
                let hash = self.host.get_code_hash(&address);
                self.push_word(hash.to_word())
            }

            // Block
            Opcode::BLOCKHASH => {
                let number = self.stack.pop()?;
                let current = self.tx_context().number;
                let lowest = current.max(256) - 256;
                let hash = match word::to_i63(&number) {
                    Some(n) if n < current && n >= lowest => self.host.get_block_hash(n),
                    _ => H256::ZERO,
                };
                self.push_word(hash.to_word())
            }
            Opcode::COINBASE => {
                let coinbase = self.tx_context().coinbase;
                self.push_word(coinbase.to_word())
            }
            Opcode::TIMESTAMP => {
                let timestamp = self.tx_context().timestamp;
                self.push_word(word::from_i64(timestamp))
            }
            Opcode::NUMBER => {
                let number = self.tx_context().number;
                self.push_word(word::from_i64(number))
            }
            Opcode::DIFFICULTY => {
                let difficulty = self.tx_context().difficulty;
                self.push_word(difficulty)
            }
            Opcode::GASLIMIT => {
                let gas_limit = self.tx_context().gas_limit;
                self.push_word(word::from_i64(gas_limit))
            }
            Opcode::CHAINID => {
                let chain_id = self.tx_context().chain_id;
                self.push_word(chain_id)
            }
            Opcode::SELFBALANCE => {
                let balance = self.host.get_balance(&self.message.destination);
                self.push_word(balance)
            }

            // Stack, memory, storage and flow
            Opcode::POP => {
                self.stack.pop()?;
                Ok(Control::Next)
            }
            Opcode::MLOAD => {
                let offset = self.stack.pop()?;
                let (offset, _) = self.expand_memory(&offset, &U256::from(32u64))?;
                self.push_word(self.memory.load_word(offset))
            }
            Opcode::MSTORE => {
                let [offset, value] = self.stack.pop_n::<2>()?;
                let (offset, _) = self.expand_memory(&offset, &U256::from(32u64))?;
                self.memory.store_word(offset, &value);
                Ok(Control::Next)
            }
            Opcode::MSTORE8 => {
                let [offset, value] = self.stack.pop_n::<2>()?;
                let (offset, _) = self.expand_memory(&offset, &U256::one())?;
                self.memory.store_byte(offset, value.byte(0));
                Ok(Control::Next)
            }
            Opcode::SLOAD => {
                let key = self.stack.pop()?;
                let value = self
                    .host
                    .get_storage(&self.message.destination, &H256::from_word(&key));
                self.push_word(value.to_word())
            }
            Opcode::SSTORE => self.op_sstore(),
            Opcode::JUMP => {
                let dest = self.stack.pop()?;
                self.jump(dest)
            }
            Opcode::JUMPI => {
                let [dest, condition] = self.stack.pop_n::<2>()?;
                if condition.is_zero() {
                    Ok(Control::Next)
                } else {
                    self.jump(dest)
                }
            }
            Opcode::PC => self.push_word(U256::from(self.pc)),
            Opcode::MSIZE => self.push_word(U256::from(self.memory.size())),
            Opcode::GAS => self.push_word(word::from_i64(self.gas_left)),
            Opcode::JUMPDEST => Ok(Control::Next),

            // Termination
            Opcode::RETURN | Opcode::REVERT => {
                let [offset, size] = self.stack.pop_n::<2>()?;
                let (offset, size) = self.expand_memory(&offset, &size)?;
                let output = self.memory.take_region(offset, size);
                if op == Opcode::RETURN {
                    Ok(Control::Halt(Halt::Return(output)))
                } else {
                    Ok(Control::Halt(Halt::Revert(output)))
                }
            }
            Opcode::SELFDESTRUCT => self.op_selfdestruct(),

            // Calls and creates
            Opcode::CALL | Opcode::CALLCODE | Opcode::DELEGATECALL | Opcode::STATICCALL => self.op_call(op),
            Opcode::CREATE | Opcode::CREATE2 => self.op_create(op),

            _ => {
                if let Some(n) = op.push_size() {
                    let value = self.read_immediate(n);
                    self.stack.push(value)?;
                    self.pc += n;
                    Ok(Control::Next)
                } else if let Some(n) = op.dup_position() {
                    self.stack.dup(n)?;
                    Ok(Control::Next)
                } else if let Some(n) = op.swap_position() {
                    self.stack.swap(n)?;
                    Ok(Control::Next)
                } else if let Some(n) = op.log_topics() {
                    self.op_log(n)
                } else if op.is_extension() {
                    self.op_extension(op)
                } else {
                    Err(Fault::BadInstruction(op.0))
                }
            }
        }
    }

    /// PUSH immediate, zero-padded past the end of code
    fn read_immediate(&self, n: usize) -> U256 {
        let mut buf = [0u8; 32];
        let start = (self.pc + 1).min(self.code.len());
        let end = (self.pc + 1 + n).min(self.code.len());
        let bytes = &self.code[start..end];
        buf[32 - n..32 - n + bytes.len()].copy_from_slice(bytes);
        U256::from_big_endian(&buf)
    }

    fn op_sstore(&mut self) -> VmResult<Control> {
        self.require_non_static()?;
        let revision = self.revision();
        if revision >= Revision::Istanbul && self.gas_left <= cost::SSTORE_SENTRY {
            return Err(Fault::OutOfGas);
        }

        let [key, value] = self.stack.pop_n::<2>()?;
        let status = self.host.set_storage(
            &self.message.destination,
            &H256::from_word(&key),
            &H256::from_word(&value),
        );

        let charge = match status {
            StorageStatus::Added => cost::SSTORE_SET,
            StorageStatus::Modified | StorageStatus::Deleted => cost::SSTORE_RESET,
            StorageStatus::Unchanged | StorageStatus::ModifiedAgain => {
                if revision == Revision::Constantinople || revision >= Revision::Istanbul {
                    self.metrics[Opcode::SLOAD.0 as usize]
                        .map(|m| m.gas_cost)
                        .unwrap_or(cost::SLOAD_ISTANBUL)
                } else {
                    cost::SSTORE_RESET
                }
            }
        };
        self.consume_gas(charge)?;

        if status == StorageStatus::Deleted {
            self.host.add_refund(cost::SSTORE_REFUND);
        }
        Ok(Control::Next)
    }

    fn op_log(&mut self, topic_count: usize) -> VmResult<Control> {
        self.require_non_static()?;
        let [offset, size] = self.stack.pop_n::<2>()?;
        let mut topics = Vec::with_capacity(topic_count);
        for _ in 0..topic_count {
            topics.push(H256::from_word(&self.stack.pop()?));
        }
        let (offset, size) = self.expand_memory(&offset, &size)?;
        self.consume_gas(gas::log_data_cost(size as u64).ok_or(Fault::OutOfGas)?)?;
        let data = self.memory.slice(offset, size);
        self.host.emit_log(&self.message.destination, data, &topics);
        Ok(Control::Next)
    }

    fn op_selfdestruct(&mut self) -> VmResult<Control> {
        self.require_non_static()?;
        let beneficiary = self.pop_address()?;
        let revision = self.revision();
        if revision >= Revision::TangerineWhistle {
            let charges_new_account = revision == Revision::TangerineWhistle
                || !self.host.get_balance(&self.message.destination).is_zero();
            if charges_new_account && !self.host.account_exists(&beneficiary) {
                self.consume_gas(cost::NEW_ACCOUNT)?;
            }
        }
        self.host.selfdestruct(&self.message.destination, &beneficiary);
        Ok(Control::Halt(Halt::Stop))
    }
}

#[derive(Clone, Copy)]
enum Source {
    Input,
    Code,
}

/// 32-byte big-endian read from `data`, zero-padded past its end
fn load_padded(data: &[u8], offset: &U256) -> U256 {
    let offset = match word::to_u64(offset).and_then(|o| usize::try_from(o).ok()) {
        Some(o) if o < data.len() => o,
        _ => return U256::zero(),
    };
    let mut buf = [0u8; 32];
    let end = (offset + 32).min(data.len());
    buf[..end - offset].copy_from_slice(&data[offset..end]);
    U256::from_big_endian(&buf)
}
