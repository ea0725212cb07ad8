use axum::{
    extract::{Multipart, Path, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;
use serde::Serialize;
use serde_json::Value;
use uuid::Uuid;

use crate::errors::AppError;
use crate::profile::form::ResumeForm;
use crate::profile::jobs::UploadStatus;
use crate::profile::models::Profile;
use crate::profile::pipeline::{run_profile_extraction, PipelineContext, ValidatedUpload};
use crate::profile::store::{apply_patch, get_profile, upsert_profile};
use crate::profile::upload::validate_upload;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct UploadAccepted {
    pub upload_id: Uuid,
    pub status: UploadStatus,
}

/// POST /api/v1/profile/extract
///
/// Validates the upload synchronously, then runs extraction as a background job.
/// Poll `GET /api/v1/profile/uploads/:upload_id` for progress and the result.
pub async fn handle_extract_profile(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<(StatusCode, Json<UploadAccepted>), AppError> {
    let mut form = ResumeForm::read(multipart).await?;
    let user_id = form
        .field("user_id")
        .ok_or_else(|| AppError::Validation("user_id is required".to_string()))?
        .to_string();
    let file = form.take_file()?;

    let kind = validate_upload(&file.content_type, file.bytes.len())?;

    let ctx = PipelineContext {
        db: state.db.clone(),
        s3: state.s3.clone(),
        s3_bucket: state.config.s3_bucket.clone(),
        llm: state.llm.clone(),
    };
    let upload = ValidatedUpload {
        user_id,
        filename: file.filename,
        kind,
        bytes: file.bytes,
    };
    let upload_id = state
        .uploads
        .start(run_profile_extraction(ctx, upload))
        .await;

    Ok((
        StatusCode::ACCEPTED,
        Json(UploadAccepted {
            upload_id,
            status: UploadStatus::Processing { progress: 0 },
        }),
    ))
}

/// GET /api/v1/profile/uploads/:upload_id
pub async fn handle_upload_status(
    State(state): State<AppState>,
    Path(upload_id): Path<Uuid>,
) -> Result<Json<UploadStatus>, AppError> {
    state
        .uploads
        .status(&upload_id)
        .await
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("Upload {upload_id} not found")))
}

/// GET /api/v1/profile/:user_id
///
/// A user with no stored profile gets an empty one rather than a 404.
pub async fn handle_get_profile(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Json<Profile>, AppError> {
    let profile = get_profile(&state.db, &user_id)
        .await?
        .unwrap_or_else(|| Profile::empty(&user_id, Utc::now()));
    Ok(Json(profile))
}

/// PUT /api/v1/profile/:user_id
pub async fn handle_update_profile(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    Json(patch): Json<Value>,
) -> Result<Json<Profile>, AppError> {
    let now = Utc::now();
    let current = get_profile(&state.db, &user_id)
        .await?
        .unwrap_or_else(|| Profile::empty(&user_id, now));

    let updated = apply_patch(&current, &patch, now)?;
    upsert_profile(&state.db, &updated).await?;
    Ok(Json(updated))
}
