//! # zxc-evm
//!
//! Bytecode interpreter for the ZXC ledger's contract runtime.
//!
//! This crate provides:
//! - Revision-gated opcode metrics and gas schedule
//! - Per-frame stack and memory
//! - The [`Host`] trait through which the ledger supplies state
//! - CALL/CREATE dispatch with the 63/64 gas rule
//! - Ledger table and token opcodes (0xC0..0xD6)
//!
//! ```ignore
//! let vm = Vm::new(VmConfig::default());
//! let result = vm.execute(&mut host, &message, &code);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

mod calls;
pub mod config;
pub mod error;
mod extension;
pub mod gas;
pub mod host;
pub mod interpreter;
pub mod memory;
pub mod message;
pub mod metrics;
pub mod opcode;
pub mod result;
pub mod revision;
pub mod stack;
pub mod word;

pub use config::VmConfig;
pub use error::{ConfigError, Fault, VmResult};
pub use host::{Host, LedgerExtension, EXT_UNSUPPORTED};
pub use interpreter::{execute, JumpTable, Vm};
pub use message::{CallKind, Message, StorageStatus, TxContext};
pub use metrics::InstructionMetrics;
pub use opcode::{disassemble, Instruction, Opcode};
pub use result::{ExecutionResult, Log, StatusCode, SubState};
pub use revision::{Revision, UnknownRevision};

pub use primitive_types::U256;
pub use zxc_primitives::{Address, H256};
