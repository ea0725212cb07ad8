// Cross-cutting prompt fragments.
// Each service that needs LLM calls defines its own prompts.rs alongside it.

/// Appended to every system prompt that expects a JSON reply.
pub const JSON_ONLY_INSTRUCTION: &str = "\
    You MUST respond with valid JSON only. \
    Do NOT include any text outside the JSON object. \
    Do NOT include explanations or apologies.";

/// Instruction against inventing resume content.
pub const EXPLICIT_ONLY_INSTRUCTION: &str = "\
    Extract only information that is explicitly present in the resume. \
    Use null or an empty array for anything that is missing. Never guess.";

/// Joins a role description with the shared JSON instruction.
pub fn json_system_prompt(role: &str) -> String {
    format!("{role} {JSON_ONLY_INSTRUCTION}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_json_system_prompt_includes_instruction() {
        let prompt = json_system_prompt("You extract resumes.");
        assert!(prompt.starts_with("You extract resumes."));
        assert!(prompt.contains("valid JSON only"));
    }
}
