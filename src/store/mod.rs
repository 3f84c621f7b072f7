//! Persistence Store
//! Mission: Never lose the ledger, even when the primary disk or a remote is down
//!
//! Storage targets are ranked. `save` offers the document to every target and
//! records one outcome per target; `load` adopts the first target that returns
//! a parseable document. Neither call returns an error: failures are logged
//! per target and surface only through [`SaveReport`] / [`LoadOutcome`].

pub mod gist;
pub mod jsonbin;
pub mod local;

pub use gist::GistTarget;
pub use jsonbin::JsonBinTarget;
pub use local::LocalFileTarget;

use crate::error::LedgerError;
use crate::ledger::{LedgerDocument, SharedLedger};
use anyhow::Result;
use async_trait::async_trait;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

/// One persistence destination.
#[async_trait]
pub trait StorageTarget: Send + Sync {
    fn name(&self) -> &'static str;

    async fn save(&self, doc: &LedgerDocument) -> Result<()>;

    /// `Ok(None)` means the target holds no document yet.
    async fn load(&self) -> Result<Option<LedgerDocument>>;
}

#[derive(Debug, Clone, PartialEq)]
pub struct TargetOutcome {
    pub target: &'static str,
    pub result: std::result::Result<(), String>,
}

/// Per-target results of one save.
#[derive(Debug, Clone, Default)]
pub struct SaveReport {
    pub outcomes: Vec<TargetOutcome>,
}

impl SaveReport {
    /// At least one target accepted the write.
    pub fn is_persisted(&self) -> bool {
        self.outcomes.iter().any(|o| o.result.is_ok())
    }

    pub fn accepted(&self) -> Vec<&'static str> {
        self.outcomes
            .iter()
            .filter(|o| o.result.is_ok())
            .map(|o| o.target)
            .collect()
    }

    pub fn into_result(self) -> std::result::Result<Self, LedgerError> {
        if self.is_persisted() {
            return Ok(self);
        }

        let reasons = if self.outcomes.is_empty() {
            "no storage targets configured".to_string()
        } else {
            self.outcomes
                .iter()
                .filter_map(|o| o.result.as_ref().err().map(|e| format!("{}: {}", o.target, e)))
                .collect::<Vec<_>>()
                .join("; ")
        };
        Err(LedgerError::PersistenceUnavailable(reasons))
    }
}

#[derive(Debug, Clone)]
pub struct LoadOutcome {
    pub document: LedgerDocument,
    /// Target that supplied the document; `None` when seed data was used.
    pub source: Option<&'static str>,
}

pub struct PersistenceStore {
    targets: Vec<Box<dyn StorageTarget>>,
    // Serialises saves so backup rotation never interleaves.
    save_lock: Mutex<()>,
}

impl PersistenceStore {
    /// Targets are tried in the given order.
    pub fn new(targets: Vec<Box<dyn StorageTarget>>) -> Self {
        Self {
            targets,
            save_lock: Mutex::new(()),
        }
    }

    pub fn target_names(&self) -> Vec<&'static str> {
        self.targets.iter().map(|t| t.name()).collect()
    }

    pub async fn save(&self, doc: &LedgerDocument) -> SaveReport {
        let _guard = self.save_lock.lock().await;
        self.write_all(doc).await
    }

    /// Clone the live document only once the save lock is held, so the last
    /// save to finish always carries the newest state.
    pub async fn save_latest(&self, ledger: &SharedLedger) -> SaveReport {
        let _guard = self.save_lock.lock().await;
        let snapshot = ledger.read().clone();
        self.write_all(&snapshot).await
    }

    async fn write_all(&self, doc: &LedgerDocument) -> SaveReport {
        let mut report = SaveReport::default();

        for target in &self.targets {
            let result = match target.save(doc).await {
                Ok(()) => {
                    debug!(storage = target.name(), "ledger saved");
                    Ok(())
                }
                Err(e) => {
                    warn!(storage = target.name(), error = %format!("{e:#}"), "save failed");
                    Err(format!("{e:#}"))
                }
            };
            report.outcomes.push(TargetOutcome {
                target: target.name(),
                result,
            });
        }

        if report.is_persisted() {
            info!(targets = ?report.accepted(), "💾 ledger persisted");
        } else {
            warn!(
                attempted = report.outcomes.len(),
                "⚠️ ledger not persisted: every storage target failed"
            );
        }

        report
    }

    pub async fn load(&self) -> LoadOutcome {
        for target in &self.targets {
            match target.load().await {
                Ok(Some(document)) => {
                    info!(
                        storage = target.name(),
                        members = document.members.len(),
                        games = document.games.len(),
                        "📂 ledger loaded"
                    );
                    return LoadOutcome {
                        document,
                        source: Some(target.name()),
                    };
                }
                Ok(None) => debug!(storage = target.name(), "no stored ledger"),
                Err(e) => {
                    warn!(storage = target.name(), error = %format!("{e:#}"), "load failed, trying next target")
                }
            }
        }

        info!("No stored ledger found, starting from seed data");
        LoadOutcome {
            document: LedgerDocument::seeded(),
            source: None,
        }
    }
}


#[cfg(test)]
mod tests {
    use super::testing::MemoryTarget;
    use super::*;

    fn doc_with_member(name: &str) -> LedgerDocument {
        let mut doc = LedgerDocument::empty();
        doc.add_member(name).unwrap();
        doc
    }

    #[tokio::test]
    async fn test_save_tries_every_target() {
        let mut first = MemoryTarget::new("first");
        first.fail_save = true;
        let second = MemoryTarget::new("second");
        let third = MemoryTarget::new("third");

        let store = PersistenceStore::new(vec![
            Box::new(first.clone()),
            Box::new(second.clone()),
            Box::new(third.clone()),
        ]);
        let report = store.save(&LedgerDocument::seeded()).await;

        assert!(report.is_persisted());
        assert_eq!(report.outcomes.len(), 3);
        assert!(report.outcomes[0].result.is_err());
        assert_eq!(report.accepted(), vec!["second", "third"]);
        assert_eq!(second.save_count(), 1);
        assert_eq!(third.save_count(), 1);
    }

    #[tokio::test]
    async fn test_save_with_all_targets_down() {
        let mut a = MemoryTarget::new("a");
        a.fail_save = true;
        let store = PersistenceStore::new(vec![Box::new(a)]);

        let report = store.save(&LedgerDocument::seeded()).await;
        assert!(!report.is_persisted());
        assert!(matches!(
            report.into_result(),
            Err(LedgerError::PersistenceUnavailable(msg)) if msg.contains("a is down")
        ));

        let empty = PersistenceStore::new(Vec::new());
        assert!(empty.save(&LedgerDocument::seeded()).await.into_result().is_err());
    }

    #[tokio::test]
    async fn test_save_latest_reads_document_under_lock() {
        let target = MemoryTarget::new("memory");
        let store = PersistenceStore::new(vec![Box::new(target.clone())]);
        let live = crate::ledger::shared(LedgerDocument::seeded());

        live.write().add_member("First").unwrap();
        let pending = store.save_latest(&live);
        live.write().add_member("Second").unwrap();

        assert!(pending.await.is_persisted());
        let stored = target.stored.lock().clone().unwrap();
        assert_eq!(stored.members.last().unwrap().name, "Second");
    }

    #[tokio::test]
    async fn test_load_prefers_first_target() {
        let local = MemoryTarget::holding("local", doc_with_member("Local"));
        let remote = MemoryTarget::holding("remote", doc_with_member("Remote"));
        let store = PersistenceStore::new(vec![Box::new(local), Box::new(remote)]);

        let outcome = store.load().await;
        assert_eq!(outcome.source, Some("local"));
        assert_eq!(outcome.document.members[0].name, "Local");
    }

    #[tokio::test]
    async fn test_load_skips_malformed_and_empty_targets() {
        let mut broken = MemoryTarget::holding("local", doc_with_member("Broken"));
        broken.fail_load = true;
        let empty = MemoryTarget::new("blob");
        let gist = MemoryTarget::holding("gist", doc_with_member("Gist"));

        let store =
            PersistenceStore::new(vec![Box::new(broken), Box::new(empty), Box::new(gist)]);
        let outcome = store.load().await;

        assert_eq!(outcome.source, Some("gist"));
        assert_eq!(outcome.document.members[0].name, "Gist");
    }

    #[tokio::test]
    async fn test_load_falls_back_to_seed() {
        let store = PersistenceStore::new(vec![Box::new(MemoryTarget::new("local"))]);
        let outcome = store.load().await;

        assert_eq!(outcome.source, None);
        assert_eq!(outcome.document, LedgerDocument::seeded());
        assert_eq!(outcome.document.members.len(), 2);
        assert_eq!(outcome.document.cash.balance, 0.0);
    }
}
