/// Quick, static suggestions per job role. Roles are matched case-insensitively.
const ROLE_SUGGESTIONS: &[(&str, &[&str])] = &[
    (
        "Frontend Developer",
        &[
            "Strong React and TypeScript experience",
            "Modern CSS frameworks (Tailwind, Styled Components)",
            "State management (Redux, Zustand)",
            "Testing experience (Jest, React Testing Library)",
            "Performance optimization skills",
        ],
    ),
    (
        "Backend Developer",
        &[
            "API design and development",
            "Database optimization",
            "Microservices architecture",
            "Security best practices",
            "Cloud deployment experience",
        ],
    ),
    (
        "Full Stack Developer",
        &[
            "End-to-end application development",
            "Database design and optimization",
            "DevOps and deployment",
            "API integration",
            "Performance monitoring",
        ],
    ),
    (
        "Data Scientist",
        &[
            "Machine learning algorithms",
            "Statistical analysis",
            "Data visualization",
            "Python/R programming",
            "Big data technologies",
        ],
    ),
    (
        "DevOps Engineer",
        &[
            "CI/CD pipeline development",
            "Container orchestration",
            "Infrastructure as Code",
            "Monitoring and logging",
            "Cloud platforms expertise",
        ],
    ),
];

const GENERIC_SUGGESTIONS: &[&str] = &[
    "Industry-specific technical skills",
    "Relevant certifications",
    "Project management experience",
    "Problem-solving abilities",
    "Communication skills",
];

pub fn suggestions_for(job_role: &str) -> &'static [&'static str] {
    let role = job_role.trim();
    ROLE_SUGGESTIONS
        .iter()
        .find(|(name, _)| name.eq_ignore_ascii_case(role))
        .map(|(_, list)| *list)
        .unwrap_or(GENERIC_SUGGESTIONS)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_role() {
        let list = suggestions_for("DevOps Engineer");
        assert_eq!(list[0], "CI/CD pipeline development");
        assert_eq!(suggestions_for("  devops engineer "), list);
    }

    #[test]
    fn test_unknown_role_gets_generic_list() {
        assert_eq!(suggestions_for("Astronaut"), GENERIC_SUGGESTIONS);
    }
}
