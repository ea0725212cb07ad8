// Resume analysis LLM prompt templates.

pub const ANALYZER_ROLE: &str = "\
You are an expert resume analyzer and career consultant with deep knowledge of \
industry standards, ATS systems, and hiring practices. Give detailed, actionable feedback.";

/// Placeholders: `{job_role}`, `{job_description}`, `{resume_text}`.
pub const ANALYZE_PROMPT: &str = r#"Analyze the following resume for a {job_role} position.
{job_description}

RESUME TEXT:
{resume_text}

OUTPUT SCHEMA (return exactly this structure):
{
  "overall_score": 0-100,
  "job_match_score": 0-100,
  "ats_score": 0-100,
  "strengths": ["4-6 specific strengths"],
  "weaknesses": ["4-6 areas for improvement"],
  "skill_gaps": ["skills the role needs that the resume lacks"],
  "recommendations": ["5-8 actionable recommendations"],
  "keywords_found": ["relevant keywords present in the resume"],
  "missing_keywords": ["important keywords that are missing"],
  "sections_analysis": {
    "summary":    {"score": 0-100, "feedback": "string"},
    "experience": {"score": 0-100, "feedback": "string"},
    "skills":     {"score": 0-100, "feedback": "string"},
    "education":  {"score": 0-100, "feedback": "string"}
  },
  "improvement_priority": ["top 3 priorities, most important first"],
  "role_specific_advice": ["advice specific to the job role"],
  "deep_analysis": {
    "content_quality":    {"score": 0-100, "details": "string"},
    "format_assessment":  {"score": 0-100, "details": "string"},
    "impact_metrics":     {"score": 0-100, "details": "string"},
    "industry_alignment": {"score": 0-100, "details": "string"}
  }
}

Scores must be realistic and grounded in the actual resume content."#;
