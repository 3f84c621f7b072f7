//! Clubhouse Backend Library
//!
//! Club ledger (members, games, drink debts, cash register) with multi-target
//! persistence, exposed to the binary and to integration tests.

pub mod api;
pub mod auth;
pub mod autosave;
pub mod backup;
pub mod config;
pub mod error;
pub mod ledger;
pub mod middleware;
pub mod store;

pub use config::AppConfig;
pub use error::{LedgerError, Result};
pub use ledger::{LedgerDocument, SharedLedger};
pub use store::{PersistenceStore, SaveReport, StorageTarget};
