use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PersonalInfo {
    pub full_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub location: Option<String>,
    pub linkedin: Option<String>,
    pub github: Option<String>,
    pub portfolio: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Education {
    pub institution: Option<String>,
    pub degree: Option<String>,
    pub field: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub start_year: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub end_year: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub grade: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Experience {
    pub company: Option<String>,
    pub position: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub start_date: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub end_date: Option<String>,
    pub current: Option<bool>,
    pub description: Option<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub technologies: Vec<String>,
    pub location: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Project {
    pub title: Option<String>,
    pub description: Option<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub technologies: Vec<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub start_date: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub end_date: Option<String>,
    pub github_url: Option<String>,
    pub live_url: Option<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub highlights: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Skill {
    pub name: String,
    /// Beginner | Intermediate | Advanced | Expert
    pub level: Option<String>,
    /// Technical | Soft | Language | Framework | Tool
    pub category: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Certification {
    pub name: Option<String>,
    pub issuer: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub issue_date: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub expiry_date: Option<String>,
    pub credential_id: Option<String>,
    pub credential_url: Option<String>,
}

/// Structured fields the AI service returns for one resume.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParsedProfile {
    #[serde(deserialize_with = "null_as_default")]
    pub personal_info: PersonalInfo,
    #[serde(deserialize_with = "null_as_default")]
    pub education: Vec<Education>,
    #[serde(deserialize_with = "null_as_default")]
    pub experience: Vec<Experience>,
    #[serde(deserialize_with = "null_as_default")]
    pub projects: Vec<Project>,
    #[serde(deserialize_with = "null_as_default")]
    pub skills: Vec<Skill>,
    #[serde(deserialize_with = "null_as_default")]
    pub certifications: Vec<Certification>,
    #[serde(deserialize_with = "null_as_default")]
    pub achievements: Vec<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub languages: Vec<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub interests: Vec<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub summary: String,
    #[serde(deserialize_with = "null_as_default")]
    pub analysis: String,
    #[serde(deserialize_with = "null_as_default")]
    pub skill_gaps: Vec<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub recommendations: Vec<String>,
}

/// What the UI shows about the most recent upload. Produced entirely by the AI service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResumeSnapshot {
    pub filename: String,
    pub upload_date: DateTime<Utc>,
    pub extracted_text: String,
    pub ai_analysis: String,
    pub skill_gaps: Vec<String>,
    pub recommendations: Vec<String>,
    /// Object-storage key of the archived original, when archiving succeeded.
    pub storage_key: Option<String>,
}

/// A user's profile document as stored and served.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    pub user_id: String,
    #[serde(default)]
    pub personal_info: PersonalInfo,
    #[serde(default)]
    pub education: Vec<Education>,
    #[serde(default)]
    pub experience: Vec<Experience>,
    #[serde(default)]
    pub projects: Vec<Project>,
    #[serde(default)]
    pub skills: Vec<Skill>,
    #[serde(default)]
    pub certifications: Vec<Certification>,
    #[serde(default)]
    pub achievements: Vec<String>,
    #[serde(default)]
    pub languages: Vec<String>,
    #[serde(default)]
    pub interests: Vec<String>,
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub resume: Option<ResumeSnapshot>,
    #[serde(default)]
    pub completion_percentage: u32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Profile {
    /// The structure returned for a user who has never uploaded a resume.
    pub fn empty(user_id: &str, now: DateTime<Utc>) -> Self {
        Self {
            user_id: user_id.to_string(),
            personal_info: PersonalInfo::default(),
            education: Vec::new(),
            experience: Vec::new(),
            projects: Vec::new(),
            skills: Vec::new(),
            certifications: Vec::new(),
            achievements: Vec::new(),
            languages: Vec::new(),
            interests: Vec::new(),
            summary: String::new(),
            resume: None,
            completion_percentage: 0,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Models sometimes emit `null` for lists and objects; treat it as empty.
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Accepts strings, numbers and booleans ("2019" or 2019); blanks become `None`.
fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::String(s)) if !s.trim().is_empty() => Some(s),
        Some(serde_json::Value::Number(n)) => Some(n.to_string()),
        Some(serde_json::Value::Bool(b)) => Some(b.to_string()),
        _ => None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parsed_profile_tolerates_nulls_and_numbers() {
        let raw = r#"{
            "personal_info": {"full_name": "Jane Doe", "email": null},
            "education": [{"institution": "IIT", "start_year": 2019, "end_year": "2023", "grade": 8.7}],
            "experience": [{"company": "Acme", "technologies": null}],
            "projects": null,
            "skills": [{"name": "Rust", "level": "Advanced"}],
            "summary": null,
            "skill_gaps": ["Kubernetes"]
        }"#;
        let parsed: ParsedProfile = serde_json::from_str(raw).unwrap();
        assert_eq!(parsed.personal_info.full_name.as_deref(), Some("Jane Doe"));
        assert_eq!(parsed.education[0].start_year.as_deref(), Some("2019"));
        assert_eq!(parsed.education[0].grade.as_deref(), Some("8.7"));
        assert!(parsed.experience[0].technologies.is_empty());
        assert!(parsed.projects.is_empty());
        assert_eq!(parsed.summary, "");
        assert_eq!(parsed.skill_gaps, vec!["Kubernetes"]);
    }

    #[test]
    fn test_blank_dates_become_none() {
        let exp: Experience = serde_json::from_str(r#"{"start_date": "  "}"#).unwrap();
        assert_eq!(exp.start_date, None);
    }
}
