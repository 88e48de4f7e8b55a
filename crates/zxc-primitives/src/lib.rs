//! # zxc-primitives
//!
//! Primitive types shared by the ZXC contract runtime.
//!
//! - [`Address`]: 160-bit account address
//! - [`H256`]: 256-bit hash / storage word
//! - [`U256`]: 256-bit unsigned integer (re-exported from `primitive-types`)

#![warn(missing_docs)]
#![warn(clippy::all)]

mod address;
mod error;
mod hash;

pub use address::{Address, AddressError};
pub use error::PrimitiveError;
pub use hash::{HashError, H256};

// Re-export primitive-types for U256
pub use primitive_types::U256;
