// Profile extraction LLM prompt templates.

pub const PROFILE_EXTRACT_ROLE: &str = "\
You are a helpful assistant that extracts structured data from resumes \
and gives brief, honest career feedback.";

pub const PROFILE_EXTRACT_PROMPT: &str = r#"Extract the following information from this resume and return it as a valid JSON object.

OUTPUT SCHEMA (return exactly this structure):
{
  "personal_info": {
    "full_name": "string", "email": "string", "phone": "string", "location": "string",
    "linkedin": "url", "github": "url", "portfolio": "url"
  },
  "education": [
    {"institution": "string", "degree": "string", "field": "string",
     "start_year": "string", "end_year": "string", "grade": "string"}
  ],
  "experience": [
    {"company": "string", "position": "string", "start_date": "string", "end_date": "string",
     "current": false, "description": "string", "technologies": ["string"], "location": "string"}
  ],
  "projects": [
    {"title": "string", "description": "string", "technologies": ["string"],
     "start_date": "string", "end_date": "string", "github_url": "url", "live_url": "url",
     "highlights": ["string"]}
  ],
  "skills": [
    {"name": "string", "level": "Beginner|Intermediate|Advanced|Expert",
     "category": "Technical|Soft|Language|Framework|Tool"}
  ],
  "certifications": [
    {"name": "string", "issuer": "string", "issue_date": "string", "expiry_date": "string",
     "credential_id": "string", "credential_url": "url"}
  ],
  "achievements": ["string"],
  "languages": ["string"],
  "interests": ["string"],
  "summary": "professional summary or objective",
  "analysis": "two or three sentences assessing the resume overall",
  "skill_gaps": ["skills a reviewer would expect but the resume lacks"],
  "recommendations": ["concrete, actionable improvements"]
}

{explicit_only}

RESUME TEXT:
{resume_text}"#;
