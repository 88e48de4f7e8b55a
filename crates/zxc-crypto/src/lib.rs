//! # zxc-crypto
//!
//! Hashing primitives for the ZXC contract runtime.

#![warn(missing_docs)]
#![warn(clippy::all)]

mod address;
mod hash;

pub use address::{create2_address, create_address};
pub use hash::{keccak256, KECCAK_EMPTY};
