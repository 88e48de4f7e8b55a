//! Gas schedule and dynamic cost calculations
//!
//! All arithmetic here is checked: a result that does not fit in `i64`
//! comes back as `None` and the caller turns it into an out-of-gas fault.

use crate::revision::Revision;
use primitive_types::U256;

/// Gas costs for ZXC-VM operations
pub mod cost {
    /// Zero tier
    pub const ZERO: i64 = 0;
    /// Base tier
    pub const BASE: i64 = 2;
    /// Very low tier
    pub const VERYLOW: i64 = 3;
    /// Low tier
    pub const LOW: i64 = 5;
    /// Mid tier
    pub const MID: i64 = 8;
    /// High tier
    pub const HIGH: i64 = 10;
    /// Ext tier (Frontier account access)
    pub const EXT: i64 = 20;

    /// Jump dest gas
    pub const JUMPDEST: i64 = 1;
    /// Exp base gas
    pub const EXP: i64 = 10;
    /// Exp byte gas before Spurious Dragon
    pub const EXP_BYTE_FRONTIER: i64 = 10;
    /// Exp byte gas from Spurious Dragon on
    pub const EXP_BYTE: i64 = 50;
    /// SHA3 base gas
    pub const SHA3: i64 = 30;
    /// SHA3 word gas
    pub const SHA3_WORD: i64 = 6;

    /// Balance gas before Tangerine Whistle
    pub const BALANCE_FRONTIER: i64 = 20;
    /// Balance gas from Tangerine Whistle on
    pub const BALANCE_TANGERINE: i64 = 400;
    /// Balance gas from Istanbul on
    pub const BALANCE_ISTANBUL: i64 = 700;
    /// Ext code size/copy base from Tangerine Whistle on
    pub const EXTCODE_TANGERINE: i64 = 700;
    /// Ext code hash gas (Constantinople)
    pub const EXTCODEHASH: i64 = 400;
    /// Ext code hash gas from Istanbul on
    pub const EXTCODEHASH_ISTANBUL: i64 = 700;

    /// Sload gas before Tangerine Whistle
    pub const SLOAD_FRONTIER: i64 = 50;
    /// Sload gas from Tangerine Whistle on
    pub const SLOAD_TANGERINE: i64 = 200;
    /// Sload gas from Istanbul on
    pub const SLOAD_ISTANBUL: i64 = 800;
    /// Sstore set gas
    pub const SSTORE_SET: i64 = 20000;
    /// Sstore reset gas
    pub const SSTORE_RESET: i64 = 5000;
    /// Sstore clear refund
    pub const SSTORE_REFUND: u64 = 15000;
    /// Minimum gas left for SSTORE from Istanbul on
    pub const SSTORE_SENTRY: i64 = 2300;
    /// Self balance gas
    pub const SELFBALANCE: i64 = 5;

    /// Log gas
    pub const LOG: i64 = 375;
    /// Log data gas (per byte)
    pub const LOG_DATA: i64 = 8;
    /// Log topic gas
    pub const LOG_TOPIC: i64 = 375;

    /// Create gas
    pub const CREATE: i64 = 32000;
    /// Create data gas (per byte of deployed code)
    pub const CREATE_DATA: i64 = 200;
    /// CREATE2 hashing gas (per word of init code)
    pub const CREATE2_WORD: i64 = 6;

    /// Call gas before Tangerine Whistle
    pub const CALL_FRONTIER: i64 = 40;
    /// Call gas from Tangerine Whistle on
    pub const CALL_TANGERINE: i64 = 700;
    /// Call value transfer gas
    pub const CALL_VALUE: i64 = 9000;
    /// Call stipend
    pub const CALL_STIPEND: i64 = 2300;
    /// New account gas
    pub const NEW_ACCOUNT: i64 = 25000;

    /// Selfdestruct gas from Tangerine Whistle on
    pub const SELFDESTRUCT_TANGERINE: i64 = 5000;

    /// Memory gas (per word)
    pub const MEMORY: i64 = 3;
    /// Quadratic memory divisor
    pub const QUAD_COEFF_DIV: u128 = 512;
    /// Copy gas (per word)
    pub const COPY: i64 = 3;

    /// Ledger table operation base gas
    pub const SQL: i64 = 100;
    /// Ledger table payload gas (per word)
    pub const SQL_DATA: i64 = 100;
    /// Ledger token operation gas
    pub const TOKEN: i64 = 100;

    /// Maximum stack size
    pub const MAX_STACK_SIZE: usize = 1024;
    /// Maximum call depth
    pub const MAX_CALL_DEPTH: i32 = 1024;
    /// Maximum deployed code size from Spurious Dragon on
    pub const MAX_CODE_SIZE: usize = 24576;
}

/// Number of 32-byte words covering `size` bytes
pub fn num_words(size: u64) -> u64 {
    size / 32 + u64::from(size % 32 != 0)
}

/// Total cost of a memory of `words` words: `3w + w²/512`
pub fn memory_cost(words: u64) -> Option<i64> {
    let w = u128::from(words);
    let total = w * cost::MEMORY as u128 + w * w / cost::QUAD_COEFF_DIV;
    i64::try_from(total).ok()
}

/// Cost of growing memory from `current_words` to `new_words`
pub fn memory_expansion_cost(current_words: u64, new_words: u64) -> Option<i64> {
    if new_words <= current_words {
        return Some(0);
    }
    Some(memory_cost(new_words)? - memory_cost(current_words)?)
}

/// Per-word cost scaled by the word count of `size` bytes
fn per_word(size: u64, unit: i64) -> Option<i64> {
    i64::try_from(num_words(size)).ok()?.checked_mul(unit)
}

/// Copy cost for CALLDATACOPY, CODECOPY, EXTCODECOPY and RETURNDATACOPY
pub fn copy_cost(size: u64) -> Option<i64> {
    per_word(size, cost::COPY)
}

/// Hashing cost for SHA3 on top of its base
pub fn sha3_word_cost(size: u64) -> Option<i64> {
    per_word(size, cost::SHA3_WORD)
}

/// Hashing cost for CREATE2 init code
pub fn create2_word_cost(size: u64) -> Option<i64> {
    per_word(size, cost::CREATE2_WORD)
}

/// Payload cost for ledger table operations
pub fn sql_data_cost(size: u64) -> Option<i64> {
    per_word(size, cost::SQL_DATA)
}

/// Data cost for LOGn on top of the base and topic cost held in the metrics table
pub fn log_data_cost(size: u64) -> Option<i64> {
    i64::try_from(size).ok()?.checked_mul(cost::LOG_DATA)
}

/// Dynamic EXP cost: per significant byte of the exponent
pub fn exp_cost(exponent: &U256, revision: Revision) -> i64 {
    let per_byte = if revision >= Revision::SpuriousDragon {
        cost::EXP_BYTE
    } else {
        cost::EXP_BYTE_FRONTIER
    };
    crate::word::significant_bytes(exponent) as i64 * per_byte
}

/// Gas left after withholding one 64th (Tangerine Whistle call/create rule)
pub fn all_but_one_64th(gas: i64) -> i64 {
    gas - gas / 64
}

/// Code deposit cost for a created contract
pub fn code_deposit_cost(code_len: usize) -> Option<i64> {
    i64::try_from(code_len).ok()?.checked_mul(cost::CREATE_DATA)
}
