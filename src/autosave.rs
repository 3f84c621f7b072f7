//! Auto-save Scheduler
//! Mission: Bound data loss to one interval, and flush once more on shutdown

use crate::error::Result;
use crate::ledger::SharedLedger;
use crate::store::{PersistenceStore, SaveReport};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::{debug, info};

pub struct AutoSaveScheduler {
    ledger: SharedLedger,
    store: Arc<PersistenceStore>,
    period: Duration,
    shutting_down: AtomicBool,
}

/// Running timer; dropping it does not stop the task, call [`AutoSaveHandle::shutdown`].
pub struct AutoSaveHandle {
    scheduler: Arc<AutoSaveScheduler>,
    task: JoinHandle<()>,
}

impl AutoSaveScheduler {
    pub fn new(ledger: SharedLedger, store: Arc<PersistenceStore>, period: Duration) -> Arc<Self> {
        Arc::new(Self {
            ledger,
            store,
            period,
            shutting_down: AtomicBool::new(false),
        })
    }

    /// Start the repeating timer. The first save happens one period from now.
    pub fn start(self: &Arc<Self>) -> AutoSaveHandle {
        let scheduler = Arc::clone(self);
        let period = self.period;
        info!(period_secs = period.as_secs(), "⏱️ Auto-save scheduled");

        let task = tokio::spawn(async move {
            let mut ticker = interval_at(Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                scheduler.tick().await;
            }
        });

        AutoSaveHandle {
            scheduler: Arc::clone(self),
            task,
        }
    }

    pub fn is_shutting_down(&self) -> bool {
        self.shutting_down.load(Ordering::SeqCst)
    }

    /// One periodic save. Returns `None` when skipped because shutdown began.
    pub async fn tick(&self) -> Option<SaveReport> {
        if self.is_shutting_down() {
            debug!("auto-save skipped, shutdown in progress");
            return None;
        }

        Some(self.store.save_latest(&self.ledger).await)
    }

    async fn final_save(&self) -> SaveReport {
        self.shutting_down.store(true, Ordering::SeqCst);
        self.store.save_latest(&self.ledger).await
    }
}

impl AutoSaveHandle {
    /// Cancel the timer and perform the final save. Fails with
    /// `PersistenceUnavailable` when no target accepted it.
    pub async fn shutdown(self) -> Result<SaveReport> {
        info!("🛑 Auto-save stopping, writing final snapshot");
        self.scheduler.shutting_down.store(true, Ordering::SeqCst);
        self.task.abort();
        let _ = self.task.await;

        self.scheduler.final_save().await.into_result()
    }
}
