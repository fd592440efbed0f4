// All LLM prompt constants for the matching module.
// Reuses cross-cutting fragments from llm_client::prompts.

use crate::llm_client::prompts::JSON_ONLY_SYSTEM;

/// Recruiter persona for compatibility scoring.
pub const MATCH_PERSONA: &str = "You are an expert technical recruiter and career advisor. \
    You assess how well a job seeker and a job opening fit each other.";

/// System prompt for compatibility scoring: the persona plus the JSON-only rules.
pub fn match_system() -> String {
    format!("{MATCH_PERSONA} {JSON_ONLY_SYSTEM}")
}

/// Compatibility prompt template.
/// Replace: {evidence_instruction}, {profile_label}, {profile_json}, {record_label}, {record_json}
pub const MATCH_PROMPT_TEMPLATE: &str = r#"{evidence_instruction}

{profile_label}:
{profile_json}

{record_label}:
{record_json}

Assess the compatibility between the two. Return a JSON object with this EXACT schema (no extra fields):
{
  "compatibility_score": 0.82,
  "skill_match_percentage": 75.0,
  "experience_fit": "Good fit — 3 years against a 2-4 year requirement",
  "salary_alignment": "Expectation sits inside the posted range",
  "growth_potential": "Clear path toward senior data science work",
  "explanation": "Two to three sentences explaining the score",
  "recommendations": ["Highlight production ML experience", "Brush up on statistics"]
}

HARD RULES:
1. `compatibility_score` is a number between 0.0 and 1.0
2. `skill_match_percentage` is a number between 0.0 and 100.0
3. `explanation` must not be empty
4. `recommendations` is a list of short, actionable strings (may be empty)
5. Judge skills case-insensitively and do not count a skill twice"#;
