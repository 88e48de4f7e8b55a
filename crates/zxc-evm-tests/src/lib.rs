//! # zxc-evm-tests
//!
//! JSON fixture runner for the ZXC interpreter.
//!
//! This crate provides:
//! - JSON parsing for the fixture format (`env`, `exec`, `pre`, `post`, ...)
//! - A case runner executing each fixture against a fresh `MemoryHost`
//! - Directory walking and result aggregation
//!
//! ## Fixture Format
//!
//! A file maps case names to cases. `exec.code` runs as the outermost frame
//! at `exec.address`; `status`, `gas`, `out`, `logCount`, `refund` and `post`
//! are checked when present. A case stating none of them must fail.

#![warn(missing_docs)]
#![warn(clippy::all)]

mod error;
mod runner;
mod types;

pub use error::{TestError, TestResult};
pub use runner::{TestRunner, TestStats};
pub use types::*;
pub use vm_test::{VmTestResults, VmTestRunner};
