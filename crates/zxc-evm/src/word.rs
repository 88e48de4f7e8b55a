//! 256-bit word arithmetic
//!
//! Unsigned operations wrap modulo 2^256. Signed operations treat the same
//! bits as two's complement.

use primitive_types::{U256, U512};

fn is_negative(x: &U256) -> bool {
    x.bit(255)
}

fn negate(x: U256) -> U256 {
    (!x).overflowing_add(U256::one()).0
}

fn abs(x: U256) -> U256 {
    if is_negative(&x) {
        negate(x)
    } else {
        x
    }
}

fn bool_word(b: bool) -> U256 {
    if b {
        U256::one()
    } else {
        U256::zero()
    }
}

fn low_u256(x: U512) -> U256 {
    let mut buf = [0u8; 64];
    x.to_big_endian(&mut buf);
    U256::from_big_endian(&buf[32..])
}

/// Wrapping addition
pub fn add(a: U256, b: U256) -> U256 {
    a.overflowing_add(b).0
}

/// Wrapping subtraction
pub fn sub(a: U256, b: U256) -> U256 {
    a.overflowing_sub(b).0
}

/// Wrapping multiplication
pub fn mul(a: U256, b: U256) -> U256 {
    a.overflowing_mul(b).0
}

/// Unsigned division, zero divisor yields zero
pub fn div(a: U256, b: U256) -> U256 {
    if b.is_zero() {
        U256::zero()
    } else {
        a / b
    }
}

/// Unsigned remainder, zero divisor yields zero
pub fn rem(a: U256, b: U256) -> U256 {
    if b.is_zero() {
        U256::zero()
    } else {
        a % b
    }
}

/// Signed division truncating toward zero; `MIN / -1` wraps to `MIN`.
pub fn sdiv(a: U256, b: U256) -> U256 {
    if b.is_zero() {
        return U256::zero();
    }
    let negative = is_negative(&a) != is_negative(&b);
    let q = abs(a) / abs(b);
    if negative {
        negate(q)
    } else {
        q
    }
}

/// Signed remainder, sign follows the dividend
pub fn smod(a: U256, b: U256) -> U256 {
    if b.is_zero() {
        return U256::zero();
    }
    let r = abs(a) % abs(b);
    if is_negative(&a) {
        negate(r)
    } else {
        r
    }
}

/// `(a + b) % n` without intermediate overflow
pub fn addmod(a: U256, b: U256, n: U256) -> U256 {
    if n.is_zero() {
        return U256::zero();
    }
    let sum = U512::from(a) + U512::from(b);
    low_u256(sum % U512::from(n))
}

/// `(a * b) % n` without intermediate overflow
pub fn mulmod(a: U256, b: U256, n: U256) -> U256 {
    if n.is_zero() {
        return U256::zero();
    }
    let product = a.full_mul(b);
    low_u256(product % U512::from(n))
}

/// Wrapping exponentiation
pub fn exp(base: U256, exponent: U256) -> U256 {
    base.overflowing_pow(exponent).0
}

/// Extend the sign bit of byte `b` (0 = least significant) through the word
pub fn signextend(b: U256, x: U256) -> U256 {
    if b >= U256::from(31u64) {
        return x;
    }
    let bit = b.low_u64() as usize * 8 + 7;
    let mask = (U256::one() << bit) - U256::one();
    if x.bit(bit) {
        x | !mask
    } else {
        x & mask
    }
}

/// Byte `i` of `x`, counting from the most significant end
pub fn byte(i: U256, x: U256) -> U256 {
    if i >= U256::from(32u64) {
        return U256::zero();
    }
    U256::from(x.byte(31 - i.low_u64() as usize))
}

/// Logical shift left
pub fn shl(shift: U256, value: U256) -> U256 {
    if shift >= U256::from(256u64) {
        U256::zero()
    } else {
        value << shift.low_u64() as usize
    }
}

/// Logical shift right
pub fn shr(shift: U256, value: U256) -> U256 {
    if shift >= U256::from(256u64) {
        U256::zero()
    } else {
        value >> shift.low_u64() as usize
    }
}

/// Arithmetic shift right
pub fn sar(shift: U256, value: U256) -> U256 {
    let negative = is_negative(&value);
    if shift >= U256::from(256u64) {
        return if negative { U256::MAX } else { U256::zero() };
    }
    let n = shift.low_u64() as usize;
    if n == 0 {
        return value;
    }
    let shifted = value >> n;
    if negative {
        shifted | !(U256::MAX >> n)
    } else {
        shifted
    }
}

/// Unsigned less-than as a word
pub fn lt(a: U256, b: U256) -> U256 {
    bool_word(a < b)
}

/// Unsigned greater-than as a word
pub fn gt(a: U256, b: U256) -> U256 {
    bool_word(a > b)
}

/// Signed less-than as a word
pub fn slt(a: U256, b: U256) -> U256 {
    let (na, nb) = (is_negative(&a), is_negative(&b));
    bool_word(if na == nb { a < b } else { na })
}

/// Signed greater-than as a word
pub fn sgt(a: U256, b: U256) -> U256 {
    slt(b, a)
}

/// Equality as a word
pub fn eq(a: U256, b: U256) -> U256 {
    bool_word(a == b)
}

/// Zero test as a word
pub fn iszero(a: U256) -> U256 {
    bool_word(a.is_zero())
}

/// Number of bytes needed to hold `x`
pub fn significant_bytes(x: &U256) -> usize {
    (x.bits() + 7) / 8
}

/// Value as `u64` if it fits
pub fn to_u64(x: &U256) -> Option<u64> {
    if x.bits() <= 64 {
        Some(x.low_u64())
    } else {
        None
    }
}

/// Value as a non-negative `i64` if it fits in 63 bits
pub fn to_i63(x: &U256) -> Option<i64> {
    if x.bits() <= 63 {
        Some(x.low_u64() as i64)
    } else {
        None
    }
}

/// Sign-extend an `i64` into a word
pub fn from_i64(v: i64) -> U256 {
    if v >= 0 {
        U256::from(v as u64)
    } else {
        !U256::from(!(v as u64))
    }
}
