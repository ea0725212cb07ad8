//! Debounced write-through of a user's filter to the preference store.
//!
//! Each change restarts the quiet period; only the last filter seen when the period
//! elapses is written. A save already in flight is never cancelled, so the store
//! sees last-write-wins ordering.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::dsa::filter::Filter;
use crate::preferences::store::PreferenceStore;

pub const DEFAULT_QUIET_PERIOD: Duration = Duration::from_millis(1000);

#[derive(Debug, Clone, Default, Serialize)]
pub struct SyncStatus {
    /// A change is waiting for the quiet period to elapse.
    pub pending: bool,
    pub last_saved_at: Option<DateTime<Utc>>,
    /// User-facing message from the most recent failed save, cleared by the next success.
    pub last_error: Option<String>,
}

/// Handle to one user's debounce task. Dropping it flushes any pending change in the
/// background; `close` flushes and waits for the write.
pub struct FilterSync {
    tx: mpsc::UnboundedSender<Filter>,
    status: watch::Receiver<SyncStatus>,
    task: JoinHandle<()>,
}

impl FilterSync {
    pub fn spawn(store: Arc<dyn PreferenceStore>, user_id: String, quiet_period: Duration) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        let (status_tx, status_rx) = watch::channel(SyncStatus::default());
        let task = tokio::spawn(run_debounce(rx, status_tx, store, user_id, quiet_period));
        Self {
            tx,
            status: status_rx,
            task,
        }
    }

    pub fn schedule(&self, filter: Filter) {
        if self.tx.send(filter).is_err() {
            warn!("Filter sync task has stopped; change will not be persisted");
        }
    }

    pub fn status(&self) -> SyncStatus {
        self.status.borrow().clone()
    }

    /// Stops the task, writing any pending change first.
    pub async fn close(self) {
        let Self { tx, task, .. } = self;
        drop(tx);
        if let Err(e) = task.await {
            warn!("Filter sync task ended abnormally: {e}");
        }
    }
}

async fn run_debounce(
    mut rx: mpsc::UnboundedReceiver<Filter>,
    status: watch::Sender<SyncStatus>,
    store: Arc<dyn PreferenceStore>,
    user_id: String,
    quiet_period: Duration,
) {
    let mut pending: Option<Filter> = None;

    loop {
        let Some(filter) = pending.take() else {
            match rx.recv().await {
                Some(next) => {
                    pending = Some(next);
                    status.send_modify(|s| s.pending = true);
                    continue;
                }
                None => break,
            }
        };

        tokio::select! {
            next = rx.recv() => match next {
                Some(newer) => pending = Some(newer),
                None => {
                    persist(store.as_ref(), &user_id, &filter, &status).await;
                    break;
                }
            },
            _ = tokio::time::sleep(quiet_period) => {
                persist(store.as_ref(), &user_id, &filter, &status).await;
            }
        }
    }

    debug!("Filter sync for user {user_id} stopped");
}

async fn persist(
    store: &dyn PreferenceStore,
    user_id: &str,
    filter: &Filter,
    status: &watch::Sender<SyncStatus>,
) {
    match store.save_filters(user_id, filter).await {
        Ok(()) => {
            debug!("Saved filters for user {user_id}");
            status.send_modify(|s| {
                s.pending = false;
                s.last_saved_at = Some(Utc::now());
                s.last_error = None;
            });
        }
        Err(e) => {
            warn!("Failed to save filters for user {user_id}: {e}");
            status.send_modify(|s| {
                s.pending = false;
                s.last_error = Some(e.user_message());
            });
        }
    }
}
