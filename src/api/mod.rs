//! HTTP API
//! Mission: Thin JSON routes over the ledger; every mutation schedules a save

pub mod backup;
pub mod cash;
pub mod drinks;
pub mod error;
pub mod games;
pub mod members;
pub mod routes;

pub use error::ApiError;
pub use routes::build_router;

use crate::error::Result;
use crate::ledger::{LedgerDocument, SharedLedger};
use crate::store::PersistenceStore;
use axum::Json;
use serde_json::{json, Value};
use std::sync::Arc;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub ledger: SharedLedger,
    pub store: Arc<PersistenceStore>,
}

impl AppState {
    pub fn new(ledger: SharedLedger, store: Arc<PersistenceStore>) -> Self {
        Self { ledger, store }
    }

    pub fn read<T>(&self, f: impl FnOnce(&LedgerDocument) -> T) -> T {
        f(&*self.ledger.read())
    }

    /// Run a mutation under the write lock. On success a background save is
    /// scheduled and the caller does not wait for it.
    pub fn mutate<T>(&self, f: impl FnOnce(&mut LedgerDocument) -> Result<T>) -> Result<T> {
        let out = f(&mut *self.ledger.write())?;
        self.schedule_save();
        Ok(out)
    }

    fn schedule_save(&self) {
        let store = Arc::clone(&self.store);
        let ledger = Arc::clone(&self.ledger);
        tokio::spawn(async move {
            store.save_latest(&ledger).await;
        });
    }
}

pub(crate) fn ack(message: &str) -> Json<Value> {
    Json(json!({ "message": message }))
}
