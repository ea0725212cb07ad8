//! Profile extraction pipeline: archive → extract text → AI parse → build → store.
//!
//! Uploads reaching this module have already passed `validate_upload`.

use aws_sdk_s3::primitives::ByteStream;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use tracing::{info, warn};
use uuid::Uuid;

use crate::errors::AppError;
use crate::llm_client::prompts::{json_system_prompt, EXPLICIT_ONLY_INSTRUCTION};
use crate::llm_client::{CompletionOptions, LlmClient};
use crate::profile::completeness::{completion_percentage, missing_sections};
use crate::profile::models::{ParsedProfile, Profile, ResumeSnapshot};
use crate::profile::prompts::{PROFILE_EXTRACT_PROMPT, PROFILE_EXTRACT_ROLE};
use crate::profile::store::{get_profile, upsert_profile};
use crate::profile::text::extract_text;
use crate::profile::upload::ResumeKind;

/// Resume text beyond this many characters is not sent to the model.
const MAX_PROMPT_CHARS: usize = 24_000;

/// Everything the pipeline needs, cloned out of `AppState` so it can run in a spawned job.
#[derive(Clone)]
pub struct PipelineContext {
    pub db: PgPool,
    pub s3: aws_sdk_s3::Client,
    pub s3_bucket: String,
    pub llm: LlmClient,
}

pub struct ValidatedUpload {
    pub user_id: String,
    pub filename: String,
    pub kind: ResumeKind,
    pub bytes: Bytes,
}

pub async fn run_profile_extraction(
    ctx: PipelineContext,
    upload: ValidatedUpload,
) -> Result<Profile, AppError> {
    let upload_id = Uuid::new_v4();
    info!(
        "Extracting profile for user {} from '{}' ({} bytes)",
        upload.user_id,
        upload.filename,
        upload.bytes.len()
    );

    // Archiving the original is best-effort; the profile is still useful without it.
    let storage_key = match archive_upload(&ctx.s3, &ctx.s3_bucket, &upload, upload_id).await {
        Ok(key) => Some(key),
        Err(e) => {
            warn!("Could not archive upload for user {}: {e}", upload.user_id);
            None
        }
    };

    let text = extract_text(upload.kind, upload.bytes.clone()).await?;
    let parsed = parse_profile(&text, &ctx.llm).await?;

    let existing = get_profile(&ctx.db, &upload.user_id).await?;
    let profile = build_profile(
        &upload.user_id,
        parsed,
        ResumeMeta {
            filename: upload.filename,
            extracted_text: text,
            storage_key,
        },
        existing.map(|p| p.created_at),
        Utc::now(),
    );

    upsert_profile(&ctx.db, &profile).await?;
    Ok(profile)
}

pub async fn parse_profile(resume_text: &str, llm: &LlmClient) -> Result<ParsedProfile, AppError> {
    let prompt = PROFILE_EXTRACT_PROMPT
        .replace("{explicit_only}", EXPLICIT_ONLY_INSTRUCTION)
        .replace("{resume_text}", &truncate_chars(resume_text, MAX_PROMPT_CHARS));
    llm.call_json::<ParsedProfile>(
        &prompt,
        &json_system_prompt(PROFILE_EXTRACT_ROLE),
        CompletionOptions::EXTRACTION,
    )
    .await
    .map_err(|e| AppError::Llm(format!("Profile extraction failed: {e}")))
}

pub struct ResumeMeta {
    pub filename: String,
    pub extracted_text: String,
    pub storage_key: Option<String>,
}

/// Assembles the stored profile from the AI output. When the model offers no
/// recommendations, the missing profile sections are suggested instead.
pub fn build_profile(
    user_id: &str,
    parsed: ParsedProfile,
    meta: ResumeMeta,
    created_at: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
) -> Profile {
    let ParsedProfile {
        personal_info,
        education,
        experience,
        projects,
        skills,
        certifications,
        achievements,
        languages,
        interests,
        summary,
        analysis,
        skill_gaps,
        recommendations,
    } = parsed;

    let mut profile = Profile {
        user_id: user_id.to_string(),
        personal_info,
        education,
        experience,
        projects,
        skills,
        certifications,
        achievements,
        languages,
        interests,
        summary,
        resume: None,
        completion_percentage: 0,
        created_at: created_at.unwrap_or(now),
        updated_at: now,
    };
    profile.completion_percentage = completion_percentage(&profile);

    let recommendations = if recommendations.is_empty() {
        missing_sections(&profile)
    } else {
        recommendations
    };
    let ai_analysis = if analysis.trim().is_empty() {
        "Resume successfully processed and data extracted".to_string()
    } else {
        analysis
    };

    profile.resume = Some(ResumeSnapshot {
        filename: meta.filename,
        upload_date: now,
        extracted_text: meta.extracted_text,
        ai_analysis,
        skill_gaps,
        recommendations,
        storage_key: meta.storage_key,
    });
    profile
}

async fn archive_upload(
    s3: &aws_sdk_s3::Client,
    bucket: &str,
    upload: &ValidatedUpload,
    upload_id: Uuid,
) -> Result<String, AppError> {
    let key = format!(
        "resumes/{}/{}.{}",
        upload.user_id,
        upload_id,
        upload.kind.extension()
    );
    s3.put_object()
        .bucket(bucket)
        .key(&key)
        .body(ByteStream::from(upload.bytes.clone()))
        .content_type(upload.kind.mime())
        .send()
        .await
        .map_err(|e| AppError::Storage(format!("S3 upload failed: {e}")))?;

    info!("Archived resume to s3://{bucket}/{key}");
    Ok(key)
}

fn truncate_chars(text: &str, max: usize) -> String {
    text.chars().take(max).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profile::models::{Experience, PersonalInfo};

    fn meta() -> ResumeMeta {
        ResumeMeta {
            filename: "jane.pdf".to_string(),
            extracted_text: "Jane Doe".to_string(),
            storage_key: None,
        }
    }

    #[test]
    fn test_build_profile_keeps_created_at_and_computes_completion() {
        let created = Utc::now() - chrono::Duration::days(10);
        let now = Utc::now();
        let parsed = ParsedProfile {
            personal_info: PersonalInfo {
                full_name: Some("Jane Doe".to_string()),
                ..Default::default()
            },
            experience: vec![Experience::default()],
            recommendations: vec!["Quantify impact".to_string()],
            ..Default::default()
        };

        let profile = build_profile("u1", parsed, meta(), Some(created), now);
        assert_eq!(profile.created_at, created);
        assert_eq!(profile.updated_at, now);
        assert_eq!(profile.completion_percentage, 28);
        let resume = profile.resume.unwrap();
        assert_eq!(resume.filename, "jane.pdf");
        assert_eq!(resume.recommendations, vec!["Quantify impact"]);
    }

    #[test]
    fn test_build_profile_falls_back_to_missing_sections() {
        let now = Utc::now();
        let profile = build_profile("u1", ParsedProfile::default(), meta(), None, now);
        assert_eq!(profile.created_at, now);
        let resume = profile.resume.unwrap();
        assert_eq!(resume.recommendations.len(), 10);
        assert!(!resume.ai_analysis.is_empty());
    }

    #[test]
    fn test_truncate_chars_is_char_safe() {
        assert_eq!(truncate_chars("héllo", 2), "hé");
    }
}
