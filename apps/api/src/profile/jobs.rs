//! Background upload jobs with simulated progress.
//!
//! Extraction time is dominated by the AI call, which reports no progress of its own.
//! While the work runs, progress advances by `PROGRESS_STEP` every `PROGRESS_TICK` and
//! holds at `PROGRESS_CAP`; it reaches 100 only when the work has succeeded.

use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tokio::sync::{watch, RwLock};
use tokio::time::Instant;
use tracing::{info, warn};
use uuid::Uuid;

use crate::errors::AppError;
use crate::profile::models::Profile;

pub const PROGRESS_STEP: u8 = 10;
pub const PROGRESS_TICK: Duration = Duration::from_millis(200);
pub const PROGRESS_CAP: u8 = 90;
/// Finished jobs older than this are dropped from the registry.
const JOB_RETENTION: Duration = Duration::from_secs(30 * 60);

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum UploadStatus {
    Processing { progress: u8 },
    Completed { progress: u8, profile: Box<Profile> },
    Failed { progress: u8, error: String },
}

impl UploadStatus {
    pub fn progress(&self) -> u8 {
        match self {
            Self::Processing { progress }
            | Self::Completed { progress, .. }
            | Self::Failed { progress, .. } => *progress,
        }
    }

    pub fn is_finished(&self) -> bool {
        !matches!(self, Self::Processing { .. })
    }
}

/// Drives `work` to completion while publishing simulated progress on `status`.
pub async fn with_simulated_progress<F, T>(work: F, status: &watch::Sender<UploadStatus>) -> T
where
    F: Future<Output = T>,
{
    tokio::pin!(work);
    let mut ticker = tokio::time::interval_at(Instant::now() + PROGRESS_TICK, PROGRESS_TICK);
    let mut progress = 0u8;

    loop {
        tokio::select! {
            biased;
            out = &mut work => return out,
            _ = ticker.tick() => {
                progress = progress.saturating_add(PROGRESS_STEP).min(PROGRESS_CAP);
                status.send_replace(UploadStatus::Processing { progress });
            }
        }
    }
}

struct JobEntry {
    started_at: Instant,
    status: watch::Receiver<UploadStatus>,
}

/// Registry of upload jobs, shared through `AppState`.
#[derive(Clone, Default)]
pub struct UploadJobs {
    jobs: Arc<RwLock<HashMap<Uuid, JobEntry>>>,
}

impl UploadJobs {
    /// Spawns `work` as a tracked job and returns its id immediately.
    pub async fn start<F>(&self, work: F) -> Uuid
    where
        F: Future<Output = Result<Profile, AppError>> + Send + 'static,
    {
        let id = Uuid::new_v4();
        let (tx, rx) = watch::channel(UploadStatus::Processing { progress: 0 });

        {
            let mut jobs = self.jobs.write().await;
            prune_finished(&mut jobs);
            jobs.insert(
                id,
                JobEntry {
                    started_at: Instant::now(),
                    status: rx,
                },
            );
        }

        tokio::spawn(async move {
            match with_simulated_progress(work, &tx).await {
                Ok(profile) => {
                    info!("Upload {id} completed for user {}", profile.user_id);
                    tx.send_replace(UploadStatus::Completed {
                        progress: 100,
                        profile: Box::new(profile),
                    });
                }
                Err(e) => {
                    warn!("Upload {id} failed: {e}");
                    let progress = tx.borrow().progress();
                    tx.send_replace(UploadStatus::Failed {
                        progress,
                        error: e.user_message(),
                    });
                }
            }
        });

        id
    }

    pub async fn status(&self, id: &Uuid) -> Option<UploadStatus> {
        self.jobs
            .read()
            .await
            .get(id)
            .map(|entry| entry.status.borrow().clone())
    }
}

fn prune_finished(jobs: &mut HashMap<Uuid, JobEntry>) {
    jobs.retain(|_, entry| {
        entry.started_at.elapsed() < JOB_RETENTION || !entry.status.borrow().is_finished()
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use tokio::time::sleep;

    #[tokio::test(start_paused = true)]
    async fn test_progress_advances_in_steps() {
        let (tx, rx) = watch::channel(UploadStatus::Processing { progress: 0 });
        let handle = tokio::spawn(async move {
            with_simulated_progress(sleep(Duration::from_secs(10)), &tx).await
        });

        sleep(Duration::from_millis(450)).await;
        assert_eq!(rx.borrow().progress(), 20);

        handle.abort();
    }

    #[tokio::test(start_paused = true)]
    async fn test_progress_caps_at_ninety_while_pending() {
        let (tx, rx) = watch::channel(UploadStatus::Processing { progress: 0 });
        let handle = tokio::spawn(async move {
            with_simulated_progress(sleep(Duration::from_secs(10)), &tx).await
        });

        sleep(Duration::from_secs(5)).await;
        assert_eq!(rx.borrow().progress(), PROGRESS_CAP);
        assert!(!rx.borrow().is_finished());

        handle.abort();
    }

    #[tokio::test(start_paused = true)]
    async fn test_completed_job_reports_hundred() {
        let jobs = UploadJobs::default();
        let id = jobs
            .start(async {
                sleep(Duration::from_millis(700)).await;
                Ok(Profile::empty("u1", Utc::now()))
            })
            .await;

        assert!(matches!(
            jobs.status(&id).await,
            Some(UploadStatus::Processing { .. })
        ));

        sleep(Duration::from_secs(1)).await;
        match jobs.status(&id).await {
            Some(UploadStatus::Completed { progress, profile }) => {
                assert_eq!(progress, 100);
                assert_eq!(profile.user_id, "u1");
            }
            other => panic!("expected completed, got {other:?}"),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_job_reports_user_message() {
        let jobs = UploadJobs::default();
        let id = jobs
            .start(async {
                sleep(Duration::from_millis(500)).await;
                Err(AppError::UnprocessableEntity(
                    "Could not extract text from the uploaded file".to_string(),
                ))
            })
            .await;

        sleep(Duration::from_secs(1)).await;
        match jobs.status(&id).await {
            Some(UploadStatus::Failed { progress, error }) => {
                assert!(progress < 100);
                assert!(error.contains("Could not extract text"));
            }
            other => panic!("expected failed, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_unknown_job_is_none() {
        let jobs = UploadJobs::default();
        assert!(jobs.status(&Uuid::new_v4()).await.is_none());
    }
}
