// Shared prompt constants.
// Each service that needs LLM calls defines its own prompts.rs alongside it.
// This file contains cross-cutting prompt fragments.

/// System prompt fragment that enforces JSON-only output.
pub const JSON_ONLY_SYSTEM: &str = "You are a precise, structured assistant. \
    You MUST respond with valid JSON only. \
    Do NOT include any text outside the JSON object. \
    Do NOT use markdown code fences. \
    Do NOT include explanations or apologies.";

/// Instruction that keeps assessments tied to the supplied fields.
pub const EVIDENCE_INSTRUCTION: &str = "\
    CRITICAL: Base every judgement on the fields provided below. \
    Do NOT assume skills, experience, or salary details that are not stated. \
    If a field is missing, say so in the relevant assessment instead of guessing.";
