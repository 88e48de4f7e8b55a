//! Per-revision instruction metrics
//!
//! Each defined opcode has a base gas cost, the stack depth it needs and the
//! net change it makes to the stack. Bytes with no entry are undefined for the
//! revision. Tables are built once per (revision, extensions) pair.

use crate::gas::cost;
use crate::opcode::Opcode;
use crate::revision::Revision;
use std::sync::OnceLock;

/// Static properties of one instruction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InstructionMetrics {
    /// Base gas charged before the instruction runs
    pub gas_cost: i64,
    /// Minimum stack height
    pub stack_height_required: usize,
    /// Net stack height change
    pub stack_height_change: isize,
}

/// Metrics for all 256 bytes under one revision
pub type MetricsTable = [Option<InstructionMetrics>; 256];

const fn m(gas_cost: i64, stack_height_required: usize, stack_height_change: isize) -> Option<InstructionMetrics> {
    Some(InstructionMetrics {
        gas_cost,
        stack_height_required,
        stack_height_change,
    })
}

fn set(table: &mut MetricsTable, op: Opcode, gas: i64, required: usize, change: isize) {
    table[op.0 as usize] = m(gas, required, change);
}

fn set_gas(table: &mut MetricsTable, op: Opcode, gas: i64) {
    if let Some(entry) = table[op.0 as usize].as_mut() {
        entry.gas_cost = gas;
    }
}

fn frontier() -> MetricsTable {
    let mut t: MetricsTable = [None; 256];

    set(&mut t, Opcode::STOP, cost::ZERO, 0, 0);
    set(&mut t, Opcode::ADD, cost::VERYLOW, 2, -1);
    set(&mut t, Opcode::MUL, cost::LOW, 2, -1);
    set(&mut t, Opcode::SUB, cost::VERYLOW, 2, -1);
    set(&mut t, Opcode::DIV, cost::LOW, 2, -1);
    set(&mut t, Opcode::SDIV, cost::LOW, 2, -1);
    set(&mut t, Opcode::MOD, cost::LOW, 2, -1);
    set(&mut t, Opcode::SMOD, cost::LOW, 2, -1);
    set(&mut t, Opcode::ADDMOD, cost::MID, 3, -2);
    set(&mut t, Opcode::MULMOD, cost::MID, 3, -2);
    set(&mut t, Opcode::EXP, cost::EXP, 2, -1);
    set(&mut t, Opcode::SIGNEXTEND, cost::LOW, 2, -1);

    set(&mut t, Opcode::LT, cost::VERYLOW, 2, -1);
    set(&mut t, Opcode::GT, cost::VERYLOW, 2, -1);
    set(&mut t, Opcode::SLT, cost::VERYLOW, 2, -1);
    set(&mut t, Opcode::SGT, cost::VERYLOW, 2, -1);
    set(&mut t, Opcode::EQ, cost::VERYLOW, 2, -1);
    set(&mut t, Opcode::ISZERO, cost::VERYLOW, 1, 0);
    set(&mut t, Opcode::AND, cost::VERYLOW, 2, -1);
    set(&mut t, Opcode::OR, cost::VERYLOW, 2, -1);
    set(&mut t, Opcode::XOR, cost::VERYLOW, 2, -1);
    set(&mut t, Opcode::NOT, cost::VERYLOW, 1, 0);
    set(&mut t, Opcode::BYTE, cost::VERYLOW, 2, -1);

    set(&mut t, Opcode::SHA3, cost::SHA3, 2, -1);

    set(&mut t, Opcode::ADDRESS, cost::BASE, 0, 1);
    set(&mut t, Opcode::BALANCE, cost::BALANCE_FRONTIER, 1, 0);
    set(&mut t, Opcode::ORIGIN, cost::BASE, 0, 1);
    set(&mut t, Opcode::CALLER, cost::BASE, 0, 1);
    set(&mut t, Opcode::CALLVALUE, cost::BASE, 0, 1);
    set(&mut t, Opcode::CALLDATALOAD, cost::VERYLOW, 1, 0);
    set(&mut t, Opcode::CALLDATASIZE, cost::BASE, 0, 1);
    set(&mut t, Opcode::CALLDATACOPY, cost::VERYLOW, 3, -3);
    set(&mut t, Opcode::CODESIZE, cost::BASE, 0, 1);
    set(&mut t, Opcode::CODECOPY, cost::VERYLOW, 3, -3);
    set(&mut t, Opcode::GASPRICE, cost::BASE, 0, 1);
    set(&mut t, Opcode::EXTCODESIZE, cost::EXT, 1, 0);
    set(&mut t, Opcode::EXTCODECOPY, cost::EXT, 4, -4);

    set(&mut t, Opcode::BLOCKHASH, cost::EXT, 1, 0);
    set(&mut t, Opcode::COINBASE, cost::BASE, 0, 1);
    set(&mut t, Opcode::TIMESTAMP, cost::BASE, 0, 1);
    set(&mut t, Opcode::NUMBER, cost::BASE, 0, 1);
    set(&mut t, Opcode::DIFFICULTY, cost::BASE, 0, 1);
    set(&mut t, Opcode::GASLIMIT, cost::BASE, 0, 1);

    set(&mut t, Opcode::POP, cost::BASE, 1, -1);
    set(&mut t, Opcode::MLOAD, cost::VERYLOW, 1, 0);
    set(&mut t, Opcode::MSTORE, cost::VERYLOW, 2, -2);
    set(&mut t, Opcode::MSTORE8, cost::VERYLOW, 2, -2);
    set(&mut t, Opcode::SLOAD, cost::SLOAD_FRONTIER, 1, 0);
    set(&mut t, Opcode::SSTORE, cost::ZERO, 2, -2);
    set(&mut t, Opcode::JUMP, cost::MID, 1, -1);
    set(&mut t, Opcode::JUMPI, cost::HIGH, 2, -2);
    set(&mut t, Opcode::PC, cost::BASE, 0, 1);
    set(&mut t, Opcode::MSIZE, cost::BASE, 0, 1);
    set(&mut t, Opcode::GAS, cost::BASE, 0, 1);
    set(&mut t, Opcode::JUMPDEST, cost::JUMPDEST, 0, 0);

    for op in 0x60..=0x7Fu8 {
        set(&mut t, Opcode(op), cost::VERYLOW, 0, 1);
    }
    for (i, op) in (0x80..=0x8Fu8).enumerate() {
        set(&mut t, Opcode(op), cost::VERYLOW, i + 1, 1);
    }
    for (i, op) in (0x90..=0x9Fu8).enumerate() {
        set(&mut t, Opcode(op), cost::VERYLOW, i + 2, 0);
    }
    for (n, op) in (0xA0..=0xA4u8).enumerate() {
        let gas = cost::LOG + cost::LOG_TOPIC * n as i64;
        set(&mut t, Opcode(op), gas, n + 2, -(n as isize) - 2);
    }

    set(&mut t, Opcode::CREATE, cost::CREATE, 3, -2);
    set(&mut t, Opcode::CALL, cost::CALL_FRONTIER, 7, -6);
    set(&mut t, Opcode::CALLCODE, cost::CALL_FRONTIER, 7, -6);
    set(&mut t, Opcode::RETURN, cost::ZERO, 2, -2);
    set(&mut t, Opcode::SELFDESTRUCT, cost::ZERO, 1, -1);

    t
}

fn homestead() -> MetricsTable {
    let mut t = frontier();
    set(&mut t, Opcode::DELEGATECALL, cost::CALL_FRONTIER, 6, -5);
    t
}

fn tangerine_whistle() -> MetricsTable {
    let mut t = homestead();
    set_gas(&mut t, Opcode::BALANCE, cost::BALANCE_TANGERINE);
    set_gas(&mut t, Opcode::EXTCODESIZE, cost::EXTCODE_TANGERINE);
    set_gas(&mut t, Opcode::EXTCODECOPY, cost::EXTCODE_TANGERINE);
    set_gas(&mut t, Opcode::SLOAD, cost::SLOAD_TANGERINE);
    set_gas(&mut t, Opcode::CALL, cost::CALL_TANGERINE);
    set_gas(&mut t, Opcode::CALLCODE, cost::CALL_TANGERINE);
    set_gas(&mut t, Opcode::DELEGATECALL, cost::CALL_TANGERINE);
    set_gas(&mut t, Opcode::SELFDESTRUCT, cost::SELFDESTRUCT_TANGERINE);
    t
}

fn spurious_dragon() -> MetricsTable {
    // Only the EXP byte cost changes, and that is dynamic.
    tangerine_whistle()
}

fn byzantium() -> MetricsTable {
    let mut t = spurious_dragon();
    set(&mut t, Opcode::RETURNDATASIZE, cost::BASE, 0, 1);
    set(&mut t, Opcode::RETURNDATACOPY, cost::VERYLOW, 3, -3);
    set(&mut t, Opcode::STATICCALL, cost::CALL_TANGERINE, 6, -5);
    set(&mut t, Opcode::REVERT, cost::ZERO, 2, -2);
    t
}

fn constantinople() -> MetricsTable {
    let mut t = byzantium();
    set(&mut t, Opcode::SHL, cost::VERYLOW, 2, -1);
    set(&mut t, Opcode::SHR, cost::VERYLOW, 2, -1);
    set(&mut t, Opcode::SAR, cost::VERYLOW, 2, -1);
    set(&mut t, Opcode::EXTCODEHASH, cost::EXTCODEHASH, 1, 0);
    set(&mut t, Opcode::CREATE2, cost::CREATE, 4, -3);
    t
}

fn petersburg() -> MetricsTable {
    constantinople()
}

fn istanbul() -> MetricsTable {
    let mut t = petersburg();
    set_gas(&mut t, Opcode::BALANCE, cost::BALANCE_ISTANBUL);
    set_gas(&mut t, Opcode::EXTCODEHASH, cost::EXTCODEHASH_ISTANBUL);
    set_gas(&mut t, Opcode::SLOAD, cost::SLOAD_ISTANBUL);
    set(&mut t, Opcode::CHAINID, cost::BASE, 0, 1);
    set(&mut t, Opcode::SELFBALANCE, cost::SELFBALANCE, 0, 1);
    t
}

fn add_extensions(t: &mut MetricsTable) {
    set(t, Opcode::CREATETABLE, cost::SQL, 5, -4);
    set(t, Opcode::DROPTABLE, cost::SQL, 3, -2);
    set(t, Opcode::RENAMETABLE, cost::SQL, 5, -4);
    set(t, Opcode::INSERTSQL, cost::SQL, 5, -4);
    set(t, Opcode::DELETESQL, cost::SQL, 5, -4);
    set(t, Opcode::UPDATESQL, cost::SQL, 7, -6);
    set(t, Opcode::SELECTSQL, cost::SQL, 5, -4);
    set(t, Opcode::GRANTSQL, cost::SQL, 6, -5);
    set(t, Opcode::TRANSBEGIN, cost::SQL, 0, 0);
    set(t, Opcode::TRANSCOMMIT, cost::SQL, 0, 1);
    set(t, Opcode::GETROWSIZE, cost::SQL, 1, 0);
    set(t, Opcode::GETCOLSIZE, cost::SQL, 1, 0);
    set(t, Opcode::GETVALUEBYKEY, cost::SQL, 6, -5);
    set(t, Opcode::GETVALUEBYINDEX, cost::SQL, 5, -4);
    set(t, Opcode::EXITFUNC, cost::SQL, 0, 0);
    set(t, Opcode::GETLENBYKEY, cost::SQL, 4, -3);
    set(t, Opcode::GETLENBYINDEX, cost::SQL, 3, -2);
    set(t, Opcode::ACCOUNTSET, cost::TOKEN, 3, -2);
    set(t, Opcode::TRANSFERFEESET, cost::TOKEN, 7, -6);
    set(t, Opcode::TRUSTSET, cost::TOKEN, 6, -5);
    set(t, Opcode::TRUSTLIMIT, cost::TOKEN, 5, -4);
    set(t, Opcode::GATEWAYBALANCE, cost::TOKEN, 5, -4);
    set(t, Opcode::PAY, cost::TOKEN, 9, -8);
}

fn build(revision: Revision, extensions: bool) -> MetricsTable {
    let mut t = match revision {
        Revision::Frontier => frontier(),
        Revision::Homestead => homestead(),
        Revision::TangerineWhistle => tangerine_whistle(),
        Revision::SpuriousDragon => spurious_dragon(),
        Revision::Byzantium => byzantium(),
        Revision::Constantinople => constantinople(),
        Revision::Petersburg => petersburg(),
        Revision::Istanbul => istanbul(),
    };
    if extensions {
        add_extensions(&mut t);
    }
    t
}

static TABLES: OnceLock<Vec<MetricsTable>> = OnceLock::new();

/// Metrics table for a revision, with or without the ledger extension opcodes
pub fn table(revision: Revision, extensions: bool) -> &'static MetricsTable {
    let tables = TABLES.get_or_init(|| {
        Revision::ALL
            .iter()
            .flat_map(|&rev| [build(rev, false), build(rev, true)])
            .collect()
    });
    &tables[revision.index() * 2 + usize::from(extensions)]
}

/// Metrics of one opcode, `None` when undefined for the revision
pub fn metrics(revision: Revision, extensions: bool, opcode: Opcode) -> Option<InstructionMetrics> {
    table(revision, extensions)[opcode.0 as usize]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gas(rev: Revision, op: Opcode) -> Option<i64> {
        metrics(rev, false, op).map(|m| m.gas_cost)
    }

    // ==================== Revision gating ====================

    #[test]
    fn test_delegatecall_from_homestead() {
        assert!(metrics(Revision::Frontier, false, Opcode::DELEGATECALL).is_none());
        assert_eq!(gas(Revision::Homestead, Opcode::DELEGATECALL), Some(40));
        assert_eq!(gas(Revision::TangerineWhistle, Opcode::DELEGATECALL), Some(700));
    }

    #[test]
    fn test_byzantium_opcodes() {
        for op in [Opcode::STATICCALL, Opcode::REVERT, Opcode::RETURNDATASIZE, Opcode::RETURNDATACOPY] {
            assert!(metrics(Revision::SpuriousDragon, false, op).is_none(), "{op}");
            assert!(metrics(Revision::Byzantium, false, op).is_some(), "{op}");
        }
    }

    #[test]
    fn test_constantinople_opcodes() {
        for op in [Opcode::SHL, Opcode::SHR, Opcode::SAR, Opcode::CREATE2, Opcode::EXTCODEHASH] {
            assert!(metrics(Revision::Byzantium, false, op).is_none(), "{op}");
            assert!(metrics(Revision::Constantinople, false, op).is_some(), "{op}");
        }
    }

    #[test]
    fn test_istanbul_opcodes() {
        assert!(metrics(Revision::Petersburg, false, Opcode::CHAINID).is_none());
        assert_eq!(gas(Revision::Istanbul, Opcode::CHAINID), Some(2));
        assert_eq!(gas(Revision::Istanbul, Opcode::SELFBALANCE), Some(5));
    }

    #[test]
    fn test_invalid_has_no_entry() {
        for rev in Revision::ALL {
            assert!(metrics(rev, true, Opcode::INVALID).is_none());
        }
    }

    // ==================== Repricing ====================

    #[test]
    fn test_sload_repricing() {
        assert_eq!(gas(Revision::Frontier, Opcode::SLOAD), Some(50));
        assert_eq!(gas(Revision::TangerineWhistle, Opcode::SLOAD), Some(200));
        assert_eq!(gas(Revision::Petersburg, Opcode::SLOAD), Some(200));
        assert_eq!(gas(Revision::Istanbul, Opcode::SLOAD), Some(800));
    }

    #[test]
    fn test_balance_repricing() {
        assert_eq!(gas(Revision::Homestead, Opcode::BALANCE), Some(20));
        assert_eq!(gas(Revision::TangerineWhistle, Opcode::BALANCE), Some(400));
        assert_eq!(gas(Revision::Istanbul, Opcode::BALANCE), Some(700));
        assert_eq!(gas(Revision::Constantinople, Opcode::EXTCODEHASH), Some(400));
        assert_eq!(gas(Revision::Istanbul, Opcode::EXTCODEHASH), Some(700));
    }

    #[test]
    fn test_call_and_selfdestruct_repricing() {
        assert_eq!(gas(Revision::Homestead, Opcode::CALL), Some(40));
        assert_eq!(gas(Revision::TangerineWhistle, Opcode::CALL), Some(700));
        assert_eq!(gas(Revision::Homestead, Opcode::SELFDESTRUCT), Some(0));
        assert_eq!(gas(Revision::TangerineWhistle, Opcode::SELFDESTRUCT), Some(5000));
        assert_eq!(gas(Revision::Frontier, Opcode::EXTCODECOPY), Some(20));
        assert_eq!(gas(Revision::TangerineWhistle, Opcode::EXTCODECOPY), Some(700));
    }

    #[test]
    fn test_later_revision_keeps_opcodes() {
        for pair in Revision::ALL.windows(2) {
            let older = table(pair[0], false);
            let newer = table(pair[1], false);
            for byte in 0..256 {
                if older[byte].is_some() {
                    assert!(newer[byte].is_some(), "0x{byte:02x} dropped in {}", pair[1]);
                }
            }
        }
    }

    // ==================== Stack metrics ====================

    #[test]
    fn test_dup_swap_log_stack() {
        let dup16 = metrics(Revision::Istanbul, false, Opcode::DUP16).unwrap();
        assert_eq!((dup16.stack_height_required, dup16.stack_height_change), (16, 1));
        let swap16 = metrics(Revision::Istanbul, false, Opcode::SWAP16).unwrap();
        assert_eq!((swap16.stack_height_required, swap16.stack_height_change), (17, 0));
        let log4 = metrics(Revision::Istanbul, false, Opcode::LOG4).unwrap();
        assert_eq!(log4.gas_cost, 375 * 5);
        assert_eq!((log4.stack_height_required, log4.stack_height_change), (6, -6));
        assert_eq!(gas(Revision::Istanbul, Opcode::DUP1), Some(3));
        assert_eq!(gas(Revision::Istanbul, Opcode::SWAP1), Some(3));
    }

    // ==================== Extensions ====================

    #[test]
    fn test_extensions_toggle() {
        assert!(metrics(Revision::Istanbul, false, Opcode::PAY).is_none());
        let pay = metrics(Revision::Istanbul, true, Opcode::PAY).unwrap();
        assert_eq!(pay.gas_cost, 100);
        assert_eq!((pay.stack_height_required, pay.stack_height_change), (9, -8));
        let commit = metrics(Revision::Frontier, true, Opcode::TRANSCOMMIT).unwrap();
        assert_eq!(commit.stack_height_change, 1);
        assert!(metrics(Revision::Istanbul, true, Opcode(0xD7)).is_none());
    }
}
