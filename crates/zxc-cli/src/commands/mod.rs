//! Subcommand implementations

pub mod disasm;
pub mod exec;
pub mod fixtures;

use crate::error::CliError;
use primitive_types::U256;
use zxc_primitives::Address;

/// Parse a 20-byte hex address
pub fn parse_address(s: &str) -> Result<Address, CliError> {
    Address::from_hex(s.trim()).map_err(|e| CliError::InvalidAddress(format!("{s:?}: {e}")))
}

/// Parse a decimal or `0x`-prefixed hex amount
pub fn parse_u256(s: &str) -> Result<U256, CliError> {
    let s = s.trim();
    let parsed = match s.strip_prefix("0x") {
        Some(digits) => U256::from_str_radix(digits, 16).map_err(|e| e.to_string()),
        None => U256::from_dec_str(s).map_err(|e| format!("{e:?}")),
    };
    parsed.map_err(|e| CliError::InvalidNumber(format!("{s:?}: {e}")))
}
