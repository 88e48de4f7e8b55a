//! Interpreter faults and configuration errors

use crate::result::StatusCode;
use crate::revision::UnknownRevision;
use thiserror::Error;

/// Terminal fault raised inside a frame.
///
/// Faults never cross the host boundary: the frame loop maps each one to a
/// [`StatusCode`] and returns an `ExecutionResult` with zero gas left.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum Fault {
    /// Byte not defined for the active revision
    #[error("undefined instruction: 0x{0:02x}")]
    BadInstruction(u8),

    /// The designated INVALID instruction
    #[error("invalid instruction")]
    InvalidInstruction,

    /// Jump to a non-JUMPDEST
    #[error("bad jump destination: {0}")]
    BadJumpDestination(u64),

    /// Stack overflow
    #[error("stack overflow (max 1024)")]
    StackOverflow,

    /// Stack underflow
    #[error("stack underflow")]
    StackUnderflow,

    /// Out of gas
    #[error("out of gas")]
    OutOfGas,

    /// State modification in a static frame
    #[error("state modification in static context")]
    StaticModeViolation,

    /// Read past the end of return data
    #[error("return data out of bounds")]
    BufferOverrun,

    /// Inconsistent state, e.g. a host that reports success without an address
    #[error("internal error: {0}")]
    Internal(String),
}

impl Fault {
    /// Status code reported for this fault
    pub fn status_code(&self) -> StatusCode {
        match self {
            Fault::BadInstruction(_) => StatusCode::UndefinedInstruction,
            Fault::InvalidInstruction => StatusCode::InvalidInstruction,
            Fault::BadJumpDestination(_) => StatusCode::BadJumpDestination,
            Fault::StackOverflow => StatusCode::StackOverflow,
            Fault::StackUnderflow => StatusCode::StackUnderflow,
            Fault::OutOfGas => StatusCode::OutOfGas,
            Fault::StaticModeViolation => StatusCode::StaticModeViolation,
            Fault::BufferOverrun => StatusCode::InvalidMemoryAccess,
            Fault::Internal(_) => StatusCode::InternalError,
        }
    }
}

/// Result type for interpreter operations
pub type VmResult<T> = Result<T, Fault>;

/// Configuration loading error
#[derive(Debug, Error)]
pub enum ConfigError {
    /// I/O error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML error
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Unknown revision name
    #[error(transparent)]
    UnknownRevision(#[from] UnknownRevision),

    /// Value out of range
    #[error("invalid configuration: {0}")]
    Invalid(String),
}
