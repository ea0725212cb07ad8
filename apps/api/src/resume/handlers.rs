use axum::{
    extract::{Multipart, Query, State},
    Form, Json,
};
use serde::{Deserialize, Serialize};

use crate::errors::AppError;
use crate::models::profile::ResumeAnalysisRow;
use crate::profile::form::ResumeForm;
use crate::resume::analyzer::{analyze_resume, list_analyses, AnalysisRequest};
use crate::resume::models::AnalysisResult;
use crate::resume::suggestions::suggestions_for;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct AnalyzeResponse {
    pub success: bool,
    pub data: AnalysisResult,
    pub message: String,
}

#[derive(Debug, Deserialize)]
pub struct QuickSuggestionsRequest {
    pub job_role: String,
}

#[derive(Debug, Serialize)]
pub struct QuickSuggestionsResponse {
    pub job_role: String,
    pub suggestions: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct HistoryQuery {
    pub user_id: String,
}

/// POST /api/v1/resume/analyze
///
/// Multipart fields: `resume` (file), `job_role`, optional `job_description`
/// and `user_id`. The analysis is stored only when `user_id` is given.
pub async fn handle_analyze(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<AnalyzeResponse>, AppError> {
    let mut form = ResumeForm::read(multipart).await?;
    let job_role = form
        .field("job_role")
        .ok_or_else(|| AppError::Validation("job_role is required".to_string()))?
        .to_string();
    let job_description = form.field("job_description").unwrap_or_default().to_string();
    let user_id = form.field("user_id").map(str::to_string);
    let file = form.take_file()?;

    let data = analyze_resume(
        &state.db,
        &state.llm,
        AnalysisRequest {
            filename: file.filename,
            bytes: file.bytes,
            job_role,
            job_description,
            user_id,
        },
    )
    .await?;

    Ok(Json(AnalyzeResponse {
        success: true,
        data,
        message: "Resume analyzed successfully".to_string(),
    }))
}

/// POST /api/v1/resume/quick-suggestions
pub async fn handle_quick_suggestions(
    Form(req): Form<QuickSuggestionsRequest>,
) -> Json<QuickSuggestionsResponse> {
    let suggestions = suggestions_for(&req.job_role)
        .iter()
        .map(|s| s.to_string())
        .collect();
    Json(QuickSuggestionsResponse {
        job_role: req.job_role,
        suggestions,
    })
}

/// GET /api/v1/resume/analyses
pub async fn handle_list_analyses(
    State(state): State<AppState>,
    Query(params): Query<HistoryQuery>,
) -> Result<Json<Vec<ResumeAnalysisRow>>, AppError> {
    let rows = list_analyses(&state.db, &params.user_id).await?;
    Ok(Json(rows))
}
