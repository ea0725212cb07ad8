use crate::profile::models::Profile;

/// Points awarded per filled profile field; sums to 100.
const FIELD_WEIGHTS: &[(&str, u32)] = &[
    ("full_name", 8),
    ("email", 6),
    ("phone", 3),
    ("location", 3),
    ("summary", 10),
    ("education", 15),
    ("experience", 20),
    ("projects", 15),
    ("skills", 15),
    ("certifications", 5),
];

fn filled(value: &Option<String>) -> bool {
    value.as_deref().is_some_and(|v| !v.trim().is_empty())
}

fn is_filled(profile: &Profile, field: &str) -> bool {
    let info = &profile.personal_info;
    match field {
        "full_name" => filled(&info.full_name),
        "email" => filled(&info.email),
        "phone" => filled(&info.phone),
        "location" => filled(&info.location),
        "summary" => !profile.summary.trim().is_empty(),
        "education" => !profile.education.is_empty(),
        "experience" => !profile.experience.is_empty(),
        "projects" => !profile.projects.is_empty(),
        "skills" => !profile.skills.is_empty(),
        "certifications" => !profile.certifications.is_empty(),
        _ => false,
    }
}

/// Percentage (0 – 100) of weighted profile fields that are filled in.
pub fn completion_percentage(profile: &Profile) -> u32 {
    FIELD_WEIGHTS
        .iter()
        .filter(|(field, _)| is_filled(profile, field))
        .map(|(_, weight)| weight)
        .sum::<u32>()
        .min(100)
}

/// Human-readable prompts for the sections still missing, in weight order.
pub fn missing_sections(profile: &Profile) -> Vec<String> {
    let mut missing: Vec<(&str, u32)> = FIELD_WEIGHTS
        .iter()
        .copied()
        .filter(|(field, _)| !is_filled(profile, field))
        .collect();
    missing.sort_by(|a, b| b.1.cmp(&a.1));
    missing
        .into_iter()
        .map(|(field, _)| format!("Add your {}", field.replace('_', " ")))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profile::models::{Experience, Skill};
    use chrono::Utc;

    #[test]
    fn test_weights_sum_to_100() {
        let total: u32 = FIELD_WEIGHTS.iter().map(|(_, w)| w).sum();
        assert_eq!(total, 100);
    }

    #[test]
    fn test_empty_profile_is_zero() {
        let profile = Profile::empty("u1", Utc::now());
        assert_eq!(completion_percentage(&profile), 0);
        assert_eq!(missing_sections(&profile)[0], "Add your experience");
    }

    #[test]
    fn test_partial_profile() {
        let mut profile = Profile::empty("u1", Utc::now());
        profile.personal_info.full_name = Some("Jane Doe".to_string());
        profile.personal_info.email = Some("   ".to_string());
        profile.experience.push(Experience::default());
        profile.skills.push(Skill {
            name: "Rust".to_string(),
            ..Default::default()
        });
        // 8 + 20 + 15
        assert_eq!(completion_percentage(&profile), 43);
        assert!(missing_sections(&profile).contains(&"Add your email".to_string()));
    }
}
