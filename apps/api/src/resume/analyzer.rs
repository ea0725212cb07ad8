//! Resume analysis for a target job role.
//!
//! Unlike profile extraction this runs inline: the caller waits for both AI calls
//! (structured extraction and the role analysis), which are issued concurrently.

use bytes::Bytes;
use chrono::Utc;
use sqlx::PgPool;
use tracing::{info, warn};
use uuid::Uuid;

use crate::errors::AppError;
use crate::llm_client::prompts::json_system_prompt;
use crate::llm_client::{CompletionOptions, LlmClient};
use crate::models::profile::ResumeAnalysisRow;
use crate::profile::pipeline::parse_profile;
use crate::profile::text::extract_text;
use crate::profile::upload::{ResumeKind, MAX_UPLOAD_BYTES};
use crate::resume::models::{AnalysisResult, ResumeAnalysis};
use crate::resume::prompts::{ANALYZER_ROLE, ANALYZE_PROMPT};

/// Characters of resume text echoed back in the response.
pub const EXCERPT_CHARS: usize = 1000;
const MAX_PROMPT_CHARS: usize = 24_000;

pub struct AnalysisRequest {
    pub filename: String,
    pub bytes: Bytes,
    pub job_role: String,
    pub job_description: String,
    pub user_id: Option<String>,
}

/// Only PDF and DOCX are analyzed; the decision is made from the file name.
pub fn kind_from_filename(filename: &str) -> Option<ResumeKind> {
    let lower = filename.to_ascii_lowercase();
    if lower.ends_with(".pdf") {
        Some(ResumeKind::Pdf)
    } else if lower.ends_with(".docx") {
        Some(ResumeKind::Docx)
    } else {
        None
    }
}

pub async fn analyze_resume(
    db: &PgPool,
    llm: &LlmClient,
    req: AnalysisRequest,
) -> Result<AnalysisResult, AppError> {
    let kind = kind_from_filename(&req.filename).ok_or_else(|| {
        AppError::UnsupportedMediaType(
            "Unsupported file format. Please upload PDF or DOCX".to_string(),
        )
    })?;
    if req.bytes.len() > MAX_UPLOAD_BYTES {
        return Err(AppError::PayloadTooLarge(format!(
            "File is too large ({} bytes). The maximum size is 5 MB.",
            req.bytes.len()
        )));
    }

    let text = extract_text(kind, req.bytes.clone()).await?;
    info!(
        "Analyzing '{}' for role '{}' ({} chars)",
        req.filename,
        req.job_role,
        text.chars().count()
    );

    let (extracted_data, analysis) = tokio::try_join!(
        parse_profile(&text, llm),
        run_analysis(&text, &req.job_role, &req.job_description, llm),
    )?;

    let result = AnalysisResult {
        filename: req.filename,
        file_size: req.bytes.len(),
        upload_date: Utc::now(),
        job_role: req.job_role,
        job_description: req.job_description,
        extracted_text: excerpt(&text, EXCERPT_CHARS),
        extracted_data,
        analysis,
        user_id: req.user_id,
    };

    record_analysis(db, &result).await;
    Ok(result)
}

/// Saving is best-effort: a finished analysis is returned even when it cannot be stored.
async fn record_analysis(db: &PgPool, result: &AnalysisResult) -> bool {
    let Some(user_id) = &result.user_id else {
        return false;
    };
    match store_analysis(db, user_id, result).await {
        Ok(()) => true,
        Err(e) => {
            warn!("Could not store resume analysis for user {user_id}: {e}");
            false
        }
    }
}

async fn run_analysis(
    resume_text: &str,
    job_role: &str,
    job_description: &str,
    llm: &LlmClient,
) -> Result<ResumeAnalysis, AppError> {
    let prompt = build_analysis_prompt(resume_text, job_role, job_description);
    llm.call_json::<ResumeAnalysis>(
        &prompt,
        &json_system_prompt(ANALYZER_ROLE),
        CompletionOptions::ANALYSIS,
    )
    .await
    .map_err(|e| AppError::Llm(format!("Resume analysis failed: {e}")))
}

fn build_analysis_prompt(resume_text: &str, job_role: &str, job_description: &str) -> String {
    let description = if job_description.trim().is_empty() {
        String::new()
    } else {
        format!("Job Description: {}", job_description.trim())
    };
    let resume_text: String = resume_text.chars().take(MAX_PROMPT_CHARS).collect();
    ANALYZE_PROMPT
        .replace("{job_role}", job_role)
        .replace("{job_description}", &description)
        .replace("{resume_text}", &resume_text)
}

/// The first `max` characters, with "..." appended when anything was cut.
pub fn excerpt(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((cut, _)) => format!("{}...", &text[..cut]),
        None => text.to_string(),
    }
}

async fn store_analysis(db: &PgPool, user_id: &str, result: &AnalysisResult) -> Result<(), AppError> {
    let document = serde_json::to_value(result).map_err(|e| AppError::Internal(e.into()))?;
    sqlx::query(
        r#"
        INSERT INTO resume_analyses (id, user_id, job_role, filename, result)
        VALUES ($1, $2, $3, $4, $5)
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(user_id)
    .bind(&result.job_role)
    .bind(&result.filename)
    .bind(document)
    .execute(db)
    .await?;

    info!("Stored resume analysis for user {user_id}");
    Ok(())
}

/// Past analyses for a user, newest first.
pub async fn list_analyses(db: &PgPool, user_id: &str) -> Result<Vec<ResumeAnalysisRow>, AppError> {
    let rows = sqlx::query_as(
        "SELECT * FROM resume_analyses WHERE user_id = $1 ORDER BY created_at DESC",
    )
    .bind(user_id)
    .fetch_all(db)
    .await?;
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profile::models::ParsedProfile;
    use sqlx::postgres::PgPoolOptions;
    use std::time::Duration;

    fn finished_result(user_id: Option<&str>) -> AnalysisResult {
        AnalysisResult {
            filename: "cv.pdf".to_string(),
            file_size: 1024,
            upload_date: Utc::now(),
            job_role: "Backend Developer".to_string(),
            job_description: String::new(),
            extracted_text: "Jane Doe".to_string(),
            extracted_data: ParsedProfile::default(),
            analysis: ResumeAnalysis::default(),
            user_id: user_id.map(str::to_string),
        }
    }

    #[tokio::test]
    async fn test_failed_save_does_not_fail_the_analysis() {
        // Nothing listens on port 1, so every acquire fails fast.
        let db = PgPoolOptions::new()
            .acquire_timeout(Duration::from_millis(200))
            .connect_lazy("postgres://studymate@127.0.0.1:1/studymate")
            .unwrap();

        assert!(!record_analysis(&db, &finished_result(Some("u1"))).await);
        assert!(!record_analysis(&db, &finished_result(None)).await);
    }

    #[test]
    fn test_kind_from_filename() {
        assert_eq!(kind_from_filename("cv.PDF"), Some(ResumeKind::Pdf));
        assert_eq!(kind_from_filename("cv.docx"), Some(ResumeKind::Docx));
        assert_eq!(kind_from_filename("cv.doc"), None);
        assert_eq!(kind_from_filename("cv.png"), None);
    }

    #[test]
    fn test_excerpt_truncates_with_ellipsis() {
        let long = "a".repeat(1500);
        let cut = excerpt(&long, EXCERPT_CHARS);
        assert_eq!(cut.len(), EXCERPT_CHARS + 3);
        assert!(cut.ends_with("..."));

        assert_eq!(excerpt("short", EXCERPT_CHARS), "short");
        assert_eq!(excerpt(&"b".repeat(1000), EXCERPT_CHARS).len(), 1000);
    }

    #[test]
    fn test_analysis_prompt_omits_blank_description() {
        let prompt = build_analysis_prompt("Jane Doe", "Backend Developer", "  ");
        assert!(prompt.contains("for a Backend Developer position"));
        assert!(!prompt.contains("Job Description:"));
        assert!(prompt.contains("Jane Doe"));

        let prompt = build_analysis_prompt("Jane Doe", "Backend Developer", "Rust, Postgres");
        assert!(prompt.contains("Job Description: Rust, Postgres"));
    }
}
