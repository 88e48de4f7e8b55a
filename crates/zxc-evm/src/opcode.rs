//! Opcode definitions and a small disassembler

use std::fmt;

/// Single-byte instruction identifier.
///
/// Any byte is representable; whether it is a defined instruction depends on
/// the active revision, see [`crate::metrics`].
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Opcode(pub u8);

#[allow(missing_docs)]
impl Opcode {
    // Stop and Arithmetic
    pub const STOP: Opcode = Opcode(0x00);
    pub const ADD: Opcode = Opcode(0x01);
    pub const MUL: Opcode = Opcode(0x02);
    pub const SUB: Opcode = Opcode(0x03);
    pub const DIV: Opcode = Opcode(0x04);
    pub const SDIV: Opcode = Opcode(0x05);
    pub const MOD: Opcode = Opcode(0x06);
    pub const SMOD: Opcode = Opcode(0x07);
    pub const ADDMOD: Opcode = Opcode(0x08);
    pub const MULMOD: Opcode = Opcode(0x09);
    pub const EXP: Opcode = Opcode(0x0A);
    pub const SIGNEXTEND: Opcode = Opcode(0x0B);

    // Comparison & Bitwise Logic
    pub const LT: Opcode = Opcode(0x10);
    pub const GT: Opcode = Opcode(0x11);
    pub const SLT: Opcode = Opcode(0x12);
    pub const SGT: Opcode = Opcode(0x13);
    pub const EQ: Opcode = Opcode(0x14);
    pub const ISZERO: Opcode = Opcode(0x15);
    pub const AND: Opcode = Opcode(0x16);
    pub const OR: Opcode = Opcode(0x17);
    pub const XOR: Opcode = Opcode(0x18);
    pub const NOT: Opcode = Opcode(0x19);
    pub const BYTE: Opcode = Opcode(0x1A);
    pub const SHL: Opcode = Opcode(0x1B);
    pub const SHR: Opcode = Opcode(0x1C);
    pub const SAR: Opcode = Opcode(0x1D);

    pub const SHA3: Opcode = Opcode(0x20);

    // Environmental Information
    pub const ADDRESS: Opcode = Opcode(0x30);
    pub const BALANCE: Opcode = Opcode(0x31);
    pub const ORIGIN: Opcode = Opcode(0x32);
    pub const CALLER: Opcode = Opcode(0x33);
    pub const CALLVALUE: Opcode = Opcode(0x34);
    pub const CALLDATALOAD: Opcode = Opcode(0x35);
    pub const CALLDATASIZE: Opcode = Opcode(0x36);
    pub const CALLDATACOPY: Opcode = Opcode(0x37);
    pub const CODESIZE: Opcode = Opcode(0x38);
    pub const CODECOPY: Opcode = Opcode(0x39);
    pub const GASPRICE: Opcode = Opcode(0x3A);
    pub const EXTCODESIZE: Opcode = Opcode(0x3B);
    pub const EXTCODECOPY: Opcode = Opcode(0x3C);
    pub const RETURNDATASIZE: Opcode = Opcode(0x3D);
    pub const RETURNDATACOPY: Opcode = Opcode(0x3E);
    pub const EXTCODEHASH: Opcode = Opcode(0x3F);

    // Block Information
    pub const BLOCKHASH: Opcode = Opcode(0x40);
    pub const COINBASE: Opcode = Opcode(0x41);
    pub const TIMESTAMP: Opcode = Opcode(0x42);
    pub const NUMBER: Opcode = Opcode(0x43);
    pub const DIFFICULTY: Opcode = Opcode(0x44);
    pub const GASLIMIT: Opcode = Opcode(0x45);
    pub const CHAINID: Opcode = Opcode(0x46);
    pub const SELFBALANCE: Opcode = Opcode(0x47);

    // Stack, Memory, Storage and Flow Operations
    pub const POP: Opcode = Opcode(0x50);
    pub const MLOAD: Opcode = Opcode(0x51);
    pub const MSTORE: Opcode = Opcode(0x52);
    pub const MSTORE8: Opcode = Opcode(0x53);
    pub const SLOAD: Opcode = Opcode(0x54);
    pub const SSTORE: Opcode = Opcode(0x55);
    pub const JUMP: Opcode = Opcode(0x56);
    pub const JUMPI: Opcode = Opcode(0x57);
    pub const PC: Opcode = Opcode(0x58);
    pub const MSIZE: Opcode = Opcode(0x59);
    pub const GAS: Opcode = Opcode(0x5A);
    pub const JUMPDEST: Opcode = Opcode(0x5B);

    pub const PUSH1: Opcode = Opcode(0x60);
    pub const PUSH2: Opcode = Opcode(0x61);
    pub const PUSH4: Opcode = Opcode(0x63);
    pub const PUSH20: Opcode = Opcode(0x73);
    pub const PUSH32: Opcode = Opcode(0x7F);
    pub const DUP1: Opcode = Opcode(0x80);
    pub const DUP16: Opcode = Opcode(0x8F);
    pub const SWAP1: Opcode = Opcode(0x90);
    pub const SWAP16: Opcode = Opcode(0x9F);

    pub const LOG0: Opcode = Opcode(0xA0);
    pub const LOG1: Opcode = Opcode(0xA1);
    pub const LOG2: Opcode = Opcode(0xA2);
    pub const LOG3: Opcode = Opcode(0xA3);
    pub const LOG4: Opcode = Opcode(0xA4);

    // Ledger extensions
    pub const CREATETABLE: Opcode = Opcode(0xC0);
    pub const DROPTABLE: Opcode = Opcode(0xC1);
    pub const RENAMETABLE: Opcode = Opcode(0xC2);
    pub const INSERTSQL: Opcode = Opcode(0xC3);
    pub const DELETESQL: Opcode = Opcode(0xC4);
    pub const UPDATESQL: Opcode = Opcode(0xC5);
    pub const SELECTSQL: Opcode = Opcode(0xC6);
    pub const GRANTSQL: Opcode = Opcode(0xC7);
    pub const TRANSBEGIN: Opcode = Opcode(0xC8);
    pub const TRANSCOMMIT: Opcode = Opcode(0xC9);
    pub const GETROWSIZE: Opcode = Opcode(0xCA);
    pub const GETCOLSIZE: Opcode = Opcode(0xCB);
    pub const GETVALUEBYKEY: Opcode = Opcode(0xCC);
    pub const GETVALUEBYINDEX: Opcode = Opcode(0xCD);
    pub const EXITFUNC: Opcode = Opcode(0xCE);
    pub const GETLENBYKEY: Opcode = Opcode(0xCF);
    pub const GETLENBYINDEX: Opcode = Opcode(0xD0);
    pub const ACCOUNTSET: Opcode = Opcode(0xD1);
    pub const TRANSFERFEESET: Opcode = Opcode(0xD2);
    pub const TRUSTSET: Opcode = Opcode(0xD3);
    pub const TRUSTLIMIT: Opcode = Opcode(0xD4);
    pub const GATEWAYBALANCE: Opcode = Opcode(0xD5);
    pub const PAY: Opcode = Opcode(0xD6);

    // System Operations
    pub const CREATE: Opcode = Opcode(0xF0);
    pub const CALL: Opcode = Opcode(0xF1);
    pub const CALLCODE: Opcode = Opcode(0xF2);
    pub const RETURN: Opcode = Opcode(0xF3);
    pub const DELEGATECALL: Opcode = Opcode(0xF4);
    pub const CREATE2: Opcode = Opcode(0xF5);
    pub const STATICCALL: Opcode = Opcode(0xFA);
    pub const REVERT: Opcode = Opcode(0xFD);
    pub const INVALID: Opcode = Opcode(0xFE);
    pub const SELFDESTRUCT: Opcode = Opcode(0xFF);
}

/// First and last byte of the ledger extension range
pub const EXTENSION_RANGE: std::ops::RangeInclusive<u8> = 0xC0..=0xD6;

const PUSH_NAMES: [&str; 32] = [
    "PUSH1", "PUSH2", "PUSH3", "PUSH4", "PUSH5", "PUSH6", "PUSH7", "PUSH8", "PUSH9", "PUSH10",
    "PUSH11", "PUSH12", "PUSH13", "PUSH14", "PUSH15", "PUSH16", "PUSH17", "PUSH18", "PUSH19",
    "PUSH20", "PUSH21", "PUSH22", "PUSH23", "PUSH24", "PUSH25", "PUSH26", "PUSH27", "PUSH28",
    "PUSH29", "PUSH30", "PUSH31", "PUSH32",
];

const DUP_NAMES: [&str; 16] = [
    "DUP1", "DUP2", "DUP3", "DUP4", "DUP5", "DUP6", "DUP7", "DUP8", "DUP9", "DUP10", "DUP11",
    "DUP12", "DUP13", "DUP14", "DUP15", "DUP16",
];

const SWAP_NAMES: [&str; 16] = [
    "SWAP1", "SWAP2", "SWAP3", "SWAP4", "SWAP5", "SWAP6", "SWAP7", "SWAP8", "SWAP9", "SWAP10",
    "SWAP11", "SWAP12", "SWAP13", "SWAP14", "SWAP15", "SWAP16",
];

const LOG_NAMES: [&str; 5] = ["LOG0", "LOG1", "LOG2", "LOG3", "LOG4"];

const EXTENSION_NAMES: [&str; 23] = [
    "CREATETABLE",
    "DROPTABLE",
    "RENAMETABLE",
    "INSERTSQL",
    "DELETESQL",
    "UPDATESQL",
    "SELECTSQL",
    "GRANTSQL",
    "TRANSBEGIN",
    "TRANSCOMMIT",
    "GETROWSIZE",
    "GETCOLSIZE",
    "GETVALUEBYKEY",
    "GETVALUEBYINDEX",
    "EXITFUNC",
    "GETLENBYKEY",
    "GETLENBYINDEX",
    "ACCOUNTSET",
    "TRANSFERFEESET",
    "TRUSTSET",
    "TRUSTLIMIT",
    "GATEWAYBALANCE",
    "PAY",
];

impl Opcode {
    /// Raw byte
    pub const fn as_u8(self) -> u8 {
        self.0
    }

    /// Number of immediate bytes for PUSH1..PUSH32
    pub fn push_size(self) -> Option<usize> {
        if (0x60..=0x7F).contains(&self.0) {
            Some((self.0 - 0x5F) as usize)
        } else {
            None
        }
    }

    /// Stack position for DUP1..DUP16 (1 = top)
    pub fn dup_position(self) -> Option<usize> {
        if (0x80..=0x8F).contains(&self.0) {
            Some((self.0 - 0x7F) as usize)
        } else {
            None
        }
    }

    /// Stack position for SWAP1..SWAP16 (1 = second item)
    pub fn swap_position(self) -> Option<usize> {
        if (0x90..=0x9F).contains(&self.0) {
            Some((self.0 - 0x8F) as usize)
        } else {
            None
        }
    }

    /// Topic count for LOG0..LOG4
    pub fn log_topics(self) -> Option<usize> {
        if (0xA0..=0xA4).contains(&self.0) {
            Some((self.0 - 0xA0) as usize)
        } else {
            None
        }
    }

    /// Whether this byte lies in the ledger extension range
    pub fn is_extension(self) -> bool {
        EXTENSION_RANGE.contains(&self.0)
    }

    /// Mnemonic, if the byte is assigned to any instruction in any revision
    pub fn name(self) -> Option<&'static str> {
        if let Some(n) = self.push_size() {
            return Some(PUSH_NAMES[n - 1]);
        }
        if let Some(n) = self.dup_position() {
            return Some(DUP_NAMES[n - 1]);
        }
        if let Some(n) = self.swap_position() {
            return Some(SWAP_NAMES[n - 1]);
        }
        if let Some(n) = self.log_topics() {
            return Some(LOG_NAMES[n]);
        }
        if self.is_extension() {
            return Some(EXTENSION_NAMES[(self.0 - 0xC0) as usize]);
        }
        let name = match self {
            Opcode::STOP => "STOP",
            Opcode::ADD => "ADD",
            Opcode::MUL => "MUL",
            Opcode::SUB => "SUB",
            Opcode::DIV => "DIV",
            Opcode::SDIV => "SDIV",
            Opcode::MOD => "MOD",
            Opcode::SMOD => "SMOD",
            Opcode::ADDMOD => "ADDMOD",
            Opcode::MULMOD => "MULMOD",
            Opcode::EXP => "EXP",
            Opcode::SIGNEXTEND => "SIGNEXTEND",
            Opcode::LT => "LT",
            Opcode::GT => "GT",
            Opcode::SLT => "SLT",
            Opcode::SGT => "SGT",
            Opcode::EQ => "EQ",
            Opcode::ISZERO => "ISZERO",
            Opcode::AND => "AND",
            Opcode::OR => "OR",
            Opcode::XOR => "XOR",
            Opcode::NOT => "NOT",
            Opcode::BYTE => "BYTE",
            Opcode::SHL => "SHL",
            Opcode::SHR => "SHR",
            Opcode::SAR => "SAR",
            Opcode::SHA3 => "SHA3",
            Opcode::ADDRESS => "ADDRESS",
            Opcode::BALANCE => "BALANCE",
            Opcode::ORIGIN => "ORIGIN",
            Opcode::CALLER => "CALLER",
            Opcode::CALLVALUE => "CALLVALUE",
            Opcode::CALLDATALOAD => "CALLDATALOAD",
            Opcode::CALLDATASIZE => "CALLDATASIZE",
            Opcode::CALLDATACOPY => "CALLDATACOPY",
            Opcode::CODESIZE => "CODESIZE",
            Opcode::CODECOPY => "CODECOPY",
            Opcode::GASPRICE => "GASPRICE",
            Opcode::EXTCODESIZE => "EXTCODESIZE",
            Opcode::EXTCODECOPY => "EXTCODECOPY",
            Opcode::RETURNDATASIZE => "RETURNDATASIZE",
            Opcode::RETURNDATACOPY => "RETURNDATACOPY",
            Opcode::EXTCODEHASH => "EXTCODEHASH",
            Opcode::BLOCKHASH => "BLOCKHASH",
            Opcode::COINBASE => "COINBASE",
            Opcode::TIMESTAMP => "TIMESTAMP",
            Opcode::NUMBER => "NUMBER",
            Opcode::DIFFICULTY => "DIFFICULTY",
            Opcode::GASLIMIT => "GASLIMIT",
            Opcode::CHAINID => "CHAINID",
            Opcode::SELFBALANCE => "SELFBALANCE",
            Opcode::POP => "POP",
            Opcode::MLOAD => "MLOAD",
            Opcode::MSTORE => "MSTORE",
            Opcode::MSTORE8 => "MSTORE8",
            Opcode::SLOAD => "SLOAD",
            Opcode::SSTORE => "SSTORE",
            Opcode::JUMP => "JUMP",
            Opcode::JUMPI => "JUMPI",
            Opcode::PC => "PC",
            Opcode::MSIZE => "MSIZE",
            Opcode::GAS => "GAS",
            Opcode::JUMPDEST => "JUMPDEST",
            Opcode::CREATE => "CREATE",
            Opcode::CALL => "CALL",
            Opcode::CALLCODE => "CALLCODE",
            Opcode::RETURN => "RETURN",
            Opcode::DELEGATECALL => "DELEGATECALL",
            Opcode::CREATE2 => "CREATE2",
            Opcode::STATICCALL => "STATICCALL",
            Opcode::REVERT => "REVERT",
            Opcode::INVALID => "INVALID",
            Opcode::SELFDESTRUCT => "SELFDESTRUCT",
            _ => return None,
        };
        Some(name)
    }
}

impl From<u8> for Opcode {
    fn from(byte: u8) -> Self {
        Opcode(byte)
    }
}

impl fmt::Debug for Opcode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.name() {
            Some(name) => f.write_str(name),
            None => write!(f, "Opcode(0x{:02x})", self.0),
        }
    }
}

impl fmt::Display for Opcode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.name() {
            Some(name) => f.write_str(name),
            None => write!(f, "UNKNOWN(0x{:02x})", self.0),
        }
    }
}

/// One decoded instruction
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Instruction {
    /// Offset of the opcode byte
    pub pc: usize,
    /// The opcode
    pub opcode: Opcode,
    /// PUSH immediate, zero-padded if the code ends early
    pub immediate: Vec<u8>,
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04x}: {}", self.pc, self.opcode)?;
        if !self.immediate.is_empty() {
            write!(f, " 0x")?;
            for b in &self.immediate {
                write!(f, "{:02x}", b)?;
            }
        }
        Ok(())
    }
}

/// Decode bytecode into a flat instruction listing, skipping PUSH data.
pub fn disassemble(code: &[u8]) -> Vec<Instruction> {
    let mut out = Vec::new();
    let mut pc = 0;
    while pc < code.len() {
        let opcode = Opcode(code[pc]);
        let mut immediate = Vec::new();
        if let Some(n) = opcode.push_size() {
            immediate = vec![0u8; n];
            let start = pc + 1;
            let end = (start + n).min(code.len());
            if start < end {
                immediate[..end - start].copy_from_slice(&code[start..end]);
            }
            out.push(Instruction { pc, opcode, immediate });
            pc += 1 + n;
            continue;
        }
        out.push(Instruction { pc, opcode, immediate });
        pc += 1;
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_size() {
        assert_eq!(Opcode::PUSH1.push_size(), Some(1));
        assert_eq!(Opcode::PUSH32.push_size(), Some(32));
        assert_eq!(Opcode::ADD.push_size(), None);
        assert_eq!(Opcode::DUP1.push_size(), None);
    }

    #[test]
    fn test_dup_swap_positions() {
        assert_eq!(Opcode::DUP1.dup_position(), Some(1));
        assert_eq!(Opcode::DUP16.dup_position(), Some(16));
        assert_eq!(Opcode::SWAP1.swap_position(), Some(1));
        assert_eq!(Opcode::SWAP16.swap_position(), Some(16));
        assert_eq!(Opcode::PUSH1.swap_position(), None);
    }

    #[test]
    fn test_log_topics() {
        assert_eq!(Opcode::LOG0.log_topics(), Some(0));
        assert_eq!(Opcode::LOG4.log_topics(), Some(4));
        assert_eq!(Opcode(0xA5).log_topics(), None);
    }

    #[test]
    fn test_names() {
        assert_eq!(Opcode::ADD.name(), Some("ADD"));
        assert_eq!(Opcode(0x62).name(), Some("PUSH3"));
        assert_eq!(Opcode(0x8A).name(), Some("DUP11"));
        assert_eq!(Opcode::PAY.name(), Some("PAY"));
        assert_eq!(Opcode::CREATETABLE.name(), Some("CREATETABLE"));
        assert_eq!(Opcode(0x0C).name(), None);
        assert_eq!(Opcode(0xD7).name(), None);
    }

    #[test]
    fn test_display_unknown() {
        assert_eq!(Opcode(0xEF).to_string(), "UNKNOWN(0xef)");
        assert_eq!(Opcode::SSTORE.to_string(), "SSTORE");
    }

    #[test]
    fn test_extension_range() {
        assert!(Opcode::CREATETABLE.is_extension());
        assert!(Opcode::PAY.is_extension());
        assert!(!Opcode(0xD7).is_extension());
        assert!(!Opcode::LOG4.is_extension());
    }

    // ==================== Disassembler ====================

    #[test]
    fn test_disassemble_skips_push_data() {
        // PUSH1 0x5b JUMPDEST
        let listing = disassemble(&[0x60, 0x5B, 0x5B]);
        assert_eq!(listing.len(), 2);
        assert_eq!(listing[0].opcode, Opcode::PUSH1);
        assert_eq!(listing[0].immediate, vec![0x5B]);
        assert_eq!(listing[1].pc, 2);
        assert_eq!(listing[1].opcode, Opcode::JUMPDEST);
    }

    #[test]
    fn test_disassemble_truncated_push() {
        let listing = disassemble(&[0x61, 0xAA]);
        assert_eq!(listing.len(), 1);
        assert_eq!(listing[0].immediate, vec![0xAA, 0x00]);
        assert_eq!(listing[0].to_string(), "0000: PUSH2 0xaa00");
    }
}
