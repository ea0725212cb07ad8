use std::sync::Arc;

use aws_sdk_s3::Client as S3Client;
use sqlx::PgPool;

use crate::config::Config;
use crate::dsa::models::Catalog;
use crate::dsa::session::SessionRegistry;
use crate::llm_client::LlmClient;
use crate::profile::jobs::UploadJobs;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    pub s3: S3Client,
    pub llm: LlmClient,
    pub config: Config,
    /// Read-only DSA catalog, loaded once at startup.
    pub catalog: Arc<Catalog>,
    /// Per-user filter/favorites sessions with debounced persistence.
    pub sessions: SessionRegistry,
    pub uploads: UploadJobs,
}
