//! # zxc-state
//!
//! In-memory ledger state for the ZXC contract runtime.
//!
//! This crate provides:
//! - Accounts with balance, nonce, code and storage, loadable from genesis JSON
//! - [`MemoryHost`], a journaled [`zxc_evm::Host`] that runs nested calls and creates
//! - Ledger tables with transactional begin/submit
//! - Block environment ([`EnvInfo`]) feeding the transaction context

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod account;
pub mod env;
pub mod error;
pub mod host;
pub mod table;

pub use account::{genesis_from_file, genesis_from_json_str, Account, Genesis};
pub use env::EnvInfo;
pub use error::{StateError, StateResult};
pub use host::{MemoryHost, TransactionOutcome};
pub use table::{Query, QuerySet, Row, Table, TableError, TableStore};
