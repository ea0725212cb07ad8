use std::collections::HashSet;

use async_trait::async_trait;
use sqlx::types::Json;
use sqlx::PgPool;

use crate::dsa::filter::Filter;
use crate::errors::AppError;

/// Persistence collaborator for per-user DSA sheet preferences.
///
/// Carried in `AppState` as `Arc<dyn PreferenceStore>` so sessions and tests can
/// swap the backend without touching handler code.
#[async_trait]
pub trait PreferenceStore: Send + Sync {
    /// `None` when the user has never saved a filter.
    async fn get_filters(&self, user_id: &str) -> Result<Option<Filter>, AppError>;
    async fn save_filters(&self, user_id: &str, filter: &Filter) -> Result<(), AppError>;

    async fn get_favorites(&self, user_id: &str) -> Result<HashSet<String>, AppError>;
    async fn add_favorite(&self, user_id: &str, item_id: &str) -> Result<(), AppError>;
    async fn remove_favorite(&self, user_id: &str, item_id: &str) -> Result<(), AppError>;

    async fn get_completed_problems(&self, user_id: &str) -> Result<HashSet<String>, AppError>;
    async fn set_problem_completed(
        &self,
        user_id: &str,
        problem_id: &str,
        completed: bool,
    ) -> Result<(), AppError>;
}

/// PostgreSQL-backed store. Filters are one JSONB document per user.
pub struct PgPreferenceStore {
    pool: PgPool,
}

impl PgPreferenceStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PreferenceStore for PgPreferenceStore {
    async fn get_filters(&self, user_id: &str) -> Result<Option<Filter>, AppError> {
        let row: Option<Json<Filter>> =
            sqlx::query_scalar("SELECT filters FROM dsa_filters WHERE user_id = $1")
                .bind(user_id)
                .fetch_optional(&self.pool)
                .await?;
        Ok(row.map(|Json(filter)| filter))
    }

    async fn save_filters(&self, user_id: &str, filter: &Filter) -> Result<(), AppError> {
        sqlx::query(
            r#"
            INSERT INTO dsa_filters (user_id, filters, updated_at)
            VALUES ($1, $2, NOW())
            ON CONFLICT (user_id)
            DO UPDATE SET filters = EXCLUDED.filters, updated_at = NOW()
            "#,
        )
        .bind(user_id)
        .bind(Json(filter))
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn get_favorites(&self, user_id: &str) -> Result<HashSet<String>, AppError> {
        let ids: Vec<String> =
            sqlx::query_scalar("SELECT item_id FROM dsa_favorites WHERE user_id = $1")
                .bind(user_id)
                .fetch_all(&self.pool)
                .await?;
        Ok(ids.into_iter().collect())
    }

    async fn add_favorite(&self, user_id: &str, item_id: &str) -> Result<(), AppError> {
        sqlx::query(
            "INSERT INTO dsa_favorites (user_id, item_id) VALUES ($1, $2) ON CONFLICT DO NOTHING",
        )
        .bind(user_id)
        .bind(item_id)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn remove_favorite(&self, user_id: &str, item_id: &str) -> Result<(), AppError> {
        sqlx::query("DELETE FROM dsa_favorites WHERE user_id = $1 AND item_id = $2")
            .bind(user_id)
            .bind(item_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn get_completed_problems(&self, user_id: &str) -> Result<HashSet<String>, AppError> {
        let ids: Vec<String> =
            sqlx::query_scalar("SELECT problem_id FROM dsa_progress WHERE user_id = $1")
                .bind(user_id)
                .fetch_all(&self.pool)
                .await?;
        Ok(ids.into_iter().collect())
    }

    async fn set_problem_completed(
        &self,
        user_id: &str,
        problem_id: &str,
        completed: bool,
    ) -> Result<(), AppError> {
        let query = if completed {
            "INSERT INTO dsa_progress (user_id, problem_id) VALUES ($1, $2) ON CONFLICT DO NOTHING"
        } else {
            "DELETE FROM dsa_progress WHERE user_id = $1 AND problem_id = $2"
        };
        sqlx::query(query)
            .bind(user_id)
            .bind(problem_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}
