//! Execution results, logs and accumulated sub-state

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use zxc_primitives::{Address, H256};

/// Outcome of executing one frame
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusCode {
    /// Finished with STOP, RETURN or SELFDESTRUCT
    Success,
    /// Generic failure, e.g. a create collision in the host
    Failure,
    /// Finished with REVERT
    Revert,
    /// Out of gas
    OutOfGas,
    /// The designated INVALID instruction (0xFE)
    InvalidInstruction,
    /// Byte not defined for the active revision
    UndefinedInstruction,
    /// Stack overflow
    StackOverflow,
    /// Stack underflow
    StackUnderflow,
    /// Jump to a non-JUMPDEST
    BadJumpDestination,
    /// Read past the end of return data
    InvalidMemoryAccess,
    /// Message deeper than the configured call depth limit.
    ///
    /// Only hosts report this, for a message handed to them directly. Inside
    /// the interpreter a call at the limit pushes 0 and the frame continues.
    CallDepthExceeded,
    /// State modification inside a static frame
    StaticModeViolation,
    /// Interpreter or host inconsistency
    InternalError,
}

impl StatusCode {
    /// Success or Revert; every other status consumes all gas
    pub fn keeps_gas(self) -> bool {
        matches!(self, StatusCode::Success | StatusCode::Revert)
    }

    /// Whether the frame completed without rollback
    pub fn is_success(self) -> bool {
        self == StatusCode::Success
    }

    /// Stable snake_case name
    pub fn as_str(self) -> &'static str {
        match self {
            StatusCode::Success => "success",
            StatusCode::Failure => "failure",
            StatusCode::Revert => "revert",
            StatusCode::OutOfGas => "out_of_gas",
            StatusCode::InvalidInstruction => "invalid_instruction",
            StatusCode::UndefinedInstruction => "undefined_instruction",
            StatusCode::StackOverflow => "stack_overflow",
            StatusCode::StackUnderflow => "stack_underflow",
            StatusCode::BadJumpDestination => "bad_jump_destination",
            StatusCode::InvalidMemoryAccess => "invalid_memory_access",
            StatusCode::CallDepthExceeded => "call_depth_exceeded",
            StatusCode::StaticModeViolation => "static_mode_violation",
            StatusCode::InternalError => "internal_error",
        }
    }
}

impl fmt::Display for StatusCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of executing a message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionResult {
    /// Status code
    pub status_code: StatusCode,
    /// Gas remaining, zero for every status other than Success and Revert
    pub gas_left: i64,
    /// Return or revert data
    pub output: Vec<u8>,
    /// Address of the created account (CREATE/CREATE2 success only)
    pub create_address: Option<Address>,
}

impl ExecutionResult {
    /// Successful result
    pub fn success(gas_left: i64, output: Vec<u8>) -> Self {
        Self {
            status_code: StatusCode::Success,
            gas_left,
            output,
            create_address: None,
        }
    }

    /// Reverted result, remaining gas is returned to the caller
    pub fn revert(gas_left: i64, output: Vec<u8>) -> Self {
        Self {
            status_code: StatusCode::Revert,
            gas_left,
            output,
            create_address: None,
        }
    }

    /// Failed result with the given status; consumes all gas
    pub fn failure(status_code: StatusCode) -> Self {
        Self {
            status_code,
            gas_left: 0,
            output: Vec::new(),
            create_address: None,
        }
    }

    /// Attach the created address
    pub fn with_create_address(mut self, address: Address) -> Self {
        self.create_address = Some(address);
        self
    }

    /// Whether the status is Success
    pub fn is_success(&self) -> bool {
        self.status_code.is_success()
    }

    /// Gas used out of `gas_limit`
    pub fn gas_used(&self, gas_limit: i64) -> i64 {
        gas_limit - self.gas_left
    }
}

/// Log entry emitted by LOG opcodes
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Log {
    /// Contract address that emitted the log
    pub address: Address,
    /// Log topics (0-4)
    pub topics: Vec<H256>,
    /// Log data
    pub data: Vec<u8>,
}

/// Self-destructs and refunds accumulated over a transaction.
///
/// Merged from a successful sub-call into its parent; cleared only at the
/// top-level transaction boundary.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SubState {
    /// Accounts scheduled for deletion
    pub selfdestructs: BTreeSet<Address>,
    /// Refund counter
    pub refunds: u64,
}

impl SubState {
    /// Create an empty sub-state
    pub fn new() -> Self {
        Self::default()
    }

    /// Union of self-destructs, sum of refunds
    pub fn merge(&mut self, other: &SubState) {
        self.selfdestructs.extend(other.selfdestructs.iter().copied());
        self.refunds = self.refunds.saturating_add(other.refunds);
    }

    /// Reset to empty
    pub fn clear(&mut self) {
        self.selfdestructs.clear();
        self.refunds = 0;
    }

    /// Whether nothing has been recorded
    pub fn is_empty(&self) -> bool {
        self.selfdestructs.is_empty() && self.refunds == 0
    }
}
