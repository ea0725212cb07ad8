use serde::{Deserialize, Deserializer, Serialize};

use crate::profile::models::{null_as_default, ParsedProfile};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SectionScore {
    #[serde(deserialize_with = "score")]
    pub score: u8,
    #[serde(deserialize_with = "null_as_default")]
    pub feedback: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SectionsAnalysis {
    pub summary: SectionScore,
    pub experience: SectionScore,
    pub skills: SectionScore,
    pub education: SectionScore,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DimensionScore {
    #[serde(deserialize_with = "score")]
    pub score: u8,
    #[serde(deserialize_with = "null_as_default")]
    pub details: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeepAnalysis {
    pub content_quality: DimensionScore,
    pub format_assessment: DimensionScore,
    pub impact_metrics: DimensionScore,
    pub industry_alignment: DimensionScore,
}

/// AI assessment of a resume against one job role.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResumeAnalysis {
    #[serde(deserialize_with = "score")]
    pub overall_score: u8,
    #[serde(deserialize_with = "score")]
    pub job_match_score: u8,
    #[serde(deserialize_with = "score")]
    pub ats_score: u8,
    #[serde(deserialize_with = "null_as_default")]
    pub strengths: Vec<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub weaknesses: Vec<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub skill_gaps: Vec<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub recommendations: Vec<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub keywords_found: Vec<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub missing_keywords: Vec<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub sections_analysis: SectionsAnalysis,
    #[serde(deserialize_with = "null_as_default")]
    pub improvement_priority: Vec<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub role_specific_advice: Vec<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub deep_analysis: DeepAnalysis,
}

#[derive(Debug, Clone, Serialize)]
pub struct AnalysisResult {
    pub filename: String,
    pub file_size: usize,
    pub upload_date: chrono::DateTime<chrono::Utc>,
    pub job_role: String,
    pub job_description: String,
    /// First `EXCERPT_CHARS` characters of the resume text.
    pub extracted_text: String,
    pub extracted_data: ParsedProfile,
    pub analysis: ResumeAnalysis,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
}

/// Scores arrive as integers, floats or numeric strings; clamp them to 0 – 100.
fn score<'de, D>(deserializer: D) -> Result<u8, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    let raw = match value {
        Some(serde_json::Value::Number(n)) => n.as_f64().unwrap_or_default(),
        Some(serde_json::Value::String(s)) => s.trim().trim_end_matches('%').parse().unwrap_or_default(),
        _ => 0.0,
    };
    Ok(raw.round().clamp(0.0, 100.0) as u8)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_analysis_accepts_loose_scores() {
        let raw = r#"{
            "overall_score": 78.6,
            "job_match_score": "65%",
            "ats_score": 140,
            "strengths": ["Clear structure"],
            "weaknesses": null,
            "sections_analysis": {"summary": {"score": 70, "feedback": "Too generic"}},
            "deep_analysis": null
        }"#;
        let analysis: ResumeAnalysis = serde_json::from_str(raw).unwrap();
        assert_eq!(analysis.overall_score, 79);
        assert_eq!(analysis.job_match_score, 65);
        assert_eq!(analysis.ats_score, 100);
        assert!(analysis.weaknesses.is_empty());
        assert_eq!(analysis.sections_analysis.summary.feedback, "Too generic");
        assert_eq!(analysis.sections_analysis.skills.score, 0);
        assert_eq!(analysis.deep_analysis, DeepAnalysis::default());
    }

    #[test]
    fn test_negative_score_clamped_to_zero() {
        let section: SectionScore = serde_json::from_str(r#"{"score": -5}"#).unwrap();
        assert_eq!(section.score, 0);
    }
}
