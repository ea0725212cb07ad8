use chrono::{DateTime, Utc};
use serde_json::Value;
use sqlx::types::Json;
use sqlx::PgPool;
use tracing::info;

use crate::errors::AppError;
use crate::models::profile::ProfileRow;
use crate::profile::completeness::completion_percentage;
use crate::profile::models::Profile;

/// Keys a client may not overwrite through a profile update.
const PROTECTED_KEYS: &[&str] = &[
    "user_id",
    "created_at",
    "updated_at",
    "completion_percentage",
];

pub async fn get_profile(pool: &PgPool, user_id: &str) -> Result<Option<Profile>, AppError> {
    let row: Option<ProfileRow> = sqlx::query_as("SELECT * FROM profiles WHERE user_id = $1")
        .bind(user_id)
        .fetch_optional(pool)
        .await?;

    Ok(row.map(|row| {
        let mut profile = row.document.0;
        profile.user_id = row.user_id;
        profile.completion_percentage = row.completion_percentage.max(0) as u32;
        profile.created_at = row.created_at;
        profile.updated_at = row.updated_at;
        profile
    }))
}

/// Inserts or replaces the user's profile document. `created_at` is kept from the first insert.
pub async fn upsert_profile(pool: &PgPool, profile: &Profile) -> Result<(), AppError> {
    sqlx::query(
        r#"
        INSERT INTO profiles (user_id, document, completion_percentage, created_at, updated_at)
        VALUES ($1, $2, $3, $4, $5)
        ON CONFLICT (user_id)
        DO UPDATE SET document = EXCLUDED.document,
                      completion_percentage = EXCLUDED.completion_percentage,
                      updated_at = EXCLUDED.updated_at
        "#,
    )
    .bind(&profile.user_id)
    .bind(Json(profile))
    .bind(profile.completion_percentage as i32)
    .bind(profile.created_at)
    .bind(profile.updated_at)
    .execute(pool)
    .await?;

    info!(
        "Stored profile for user {} ({}% complete)",
        profile.user_id, profile.completion_percentage
    );
    Ok(())
}

/// Merges the top-level fields of `patch` into `profile`, then recomputes completion.
pub fn apply_patch(profile: &Profile, patch: &Value, now: DateTime<Utc>) -> Result<Profile, AppError> {
    let patch = patch
        .as_object()
        .ok_or_else(|| AppError::Validation("Profile update must be a JSON object".to_string()))?;

    let mut document = serde_json::to_value(profile).map_err(|e| AppError::Internal(e.into()))?;
    if let Some(fields) = document.as_object_mut() {
        for (key, value) in patch {
            if PROTECTED_KEYS.contains(&key.as_str()) {
                continue;
            }
            fields.insert(key.clone(), value.clone());
        }
    }

    let mut updated: Profile = serde_json::from_value(document)
        .map_err(|e| AppError::Validation(format!("Invalid profile update: {e}")))?;
    updated.completion_percentage = completion_percentage(&updated);
    updated.updated_at = now;
    Ok(updated)
}
