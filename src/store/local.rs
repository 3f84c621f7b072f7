//! Local JSON file target
//!
//! The document lives at `<dir>/db.json`. Before every overwrite the previous
//! file is copied to `db-backup-<timestamp>.json`; only the newest
//! `retention` backups are kept. Timestamps are fixed-width UTC so the
//! lexicographic order of file names equals their chronological order.

use super::StorageTarget;
use crate::ledger::LedgerDocument;
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use parking_lot::Mutex;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info, warn};

pub const DOCUMENT_FILE: &str = "db.json";
const BACKUP_PREFIX: &str = "db-backup-";
const BACKUP_SUFFIX: &str = ".json";

#[derive(Clone)]
pub struct LocalFileTarget {
    dir: PathBuf,
    retention: usize,
    last_stamp: Arc<Mutex<Option<DateTime<Utc>>>>,
}

impl LocalFileTarget {
    pub fn new(dir: impl Into<PathBuf>, retention: usize) -> Self {
        Self {
            dir: dir.into(),
            retention,
            last_stamp: Arc::new(Mutex::new(None)),
        }
    }

    /// Strictly increasing backup timestamp, even for saves within one microsecond.
    fn next_stamp(&self) -> String {
        let mut last = self.last_stamp.lock();
        let mut now = Utc::now();
        if let Some(prev) = *last {
            if now <= prev {
                now = prev + Duration::microseconds(1);
            }
        }
        *last = Some(now);
        now.format("%Y%m%dT%H%M%S%.6fZ").to_string()
    }

    pub fn document_path(&self) -> PathBuf {
        self.dir.join(DOCUMENT_FILE)
    }

    /// Backup files, oldest first.
    pub fn backups(&self) -> Result<Vec<PathBuf>> {
        if !self.dir.exists() {
            return Ok(Vec::new());
        }

        let mut backups: Vec<PathBuf> = fs::read_dir(&self.dir)
            .with_context(|| format!("Failed to list {}", self.dir.display()))?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|p| is_backup_file(p))
            .collect();
        backups.sort();
        Ok(backups)
    }

    fn backup_current(&self) -> Result<Option<PathBuf>> {
        let current = self.document_path();
        if !current.exists() {
            return Ok(None);
        }

        let backup = self
            .dir
            .join(format!("{BACKUP_PREFIX}{}{BACKUP_SUFFIX}", self.next_stamp()));

        fs::copy(&current, &backup)
            .with_context(|| format!("Failed to back up {}", current.display()))?;
        Ok(Some(backup))
    }

    fn prune_backups(&self) -> Result<usize> {
        let backups = self.backups()?;
        let excess = backups.len().saturating_sub(self.retention);

        for old in &backups[..excess] {
            fs::remove_file(old)
                .with_context(|| format!("Failed to remove backup {}", old.display()))?;
            debug!(path = %old.display(), "old backup removed");
        }
        Ok(excess)
    }

    fn write_document(&self, doc: &LedgerDocument) -> Result<()> {
        fs::create_dir_all(&self.dir)
            .with_context(|| format!("Failed to create {}", self.dir.display()))?;

        if let Some(backup) = self.backup_current()? {
            debug!(path = %backup.display(), "previous ledger backed up");
        }
        match self.prune_backups() {
            Ok(0) => {}
            Ok(pruned) => {
                info!(pruned, retention = self.retention, "🧹 pruned old ledger backups")
            }
            Err(e) => {
                warn!(error = %format!("{e:#}"), "backup pruning failed, writing ledger anyway")
            }
        }

        let json = serde_json::to_string_pretty(doc).context("Failed to serialize ledger")?;
        let path = self.document_path();
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, json).with_context(|| format!("Failed to write {}", tmp.display()))?;
        fs::rename(&tmp, &path)
            .with_context(|| format!("Failed to move ledger into {}", path.display()))?;
        Ok(())
    }

    fn read_document(&self) -> Result<Option<LedgerDocument>> {
        let path = self.document_path();
        if !path.exists() {
            return Ok(None);
        }

        let raw =
            fs::read_to_string(&path).with_context(|| format!("Failed to read {}", path.display()))?;
        let doc = serde_json::from_str(&raw)
            .with_context(|| format!("Malformed ledger in {}", path.display()))?;
        Ok(Some(doc))
    }
}

fn is_backup_file(path: &Path) -> bool {
    path.file_name()
        .and_then(|n| n.to_str())
        .map(|n| n.starts_with(BACKUP_PREFIX) && n.ends_with(BACKUP_SUFFIX))
        .unwrap_or(false)
}

#[async_trait]
impl StorageTarget for LocalFileTarget {
    fn name(&self) -> &'static str {
        "local"
    }

    async fn save(&self, doc: &LedgerDocument) -> Result<()> {
        let target = self.clone();
        let doc = doc.clone();
        tokio::task::spawn_blocking(move || target.write_document(&doc))
            .await
            .context("Local save task failed")?
    }

    async fn load(&self) -> Result<Option<LedgerDocument>> {
        let target = self.clone();
        tokio::task::spawn_blocking(move || target.read_document())
            .await
            .context("Local load task failed")?
    }
}
