//! Compatibility Scoring: pluggable, trait-based scorer for a (profile, record) pair.
//!
//! Primary: `ModelScorer` (structured prompt → language model → parsed assessment).
//! Fallback: `HeuristicScorer` (pure-Rust skill overlap, deterministic, fully testable).
//!
//! Scoring never fails from the caller's point of view: any model problem is
//! absorbed here and answered with the heuristic result.

use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;
use thiserror::Error;
use tracing::warn;

use crate::limiter::CallLimiter;
use crate::llm_client::prompts::EVIDENCE_INSTRUCTION;
use crate::llm_client::{strip_json_fences, LanguageModel, LlmError};
use crate::matching::prompts::{match_system, MATCH_PROMPT_TEMPLATE};
use crate::models::{EnhancedRecord, MatchResult, Profile, ScoreSource};

/// One initial attempt plus one retry before falling back.
const MAX_MODEL_ATTEMPTS: u32 = 2;

const NOT_ASSESSED: &str = "Not assessed (heuristic scoring)";

// ────────────────────────────────────────────────────────────────────────────
// Trait definition
// ────────────────────────────────────────────────────────────────────────────

/// The scorer trait. Implement this to swap backends without touching the
/// pipeline or handler code. Carried in the pipeline as `Arc<dyn CompatibilityScorer>`.
#[async_trait]
pub trait CompatibilityScorer: Send + Sync {
    async fn score(&self, profile: &Profile, record: &EnhancedRecord) -> MatchResult;

    /// Short label for logs.
    fn backend(&self) -> &'static str;
}

/// Why the primary path could not produce a result. Never escapes
/// `CompatibilityScorer::score`, which answers with the heuristic instead.
#[derive(Debug, Error)]
pub enum ScoringFailure {
    #[error("model call failed: {0}")]
    Model(#[from] LlmError),

    #[error("malformed model response: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("model response out of contract: {0}")]
    Schema(String),
}

// ────────────────────────────────────────────────────────────────────────────
// HeuristicScorer
// ────────────────────────────────────────────────────────────────────────────

/// Skill-overlap scorer. No I/O.
pub struct HeuristicScorer;

#[async_trait]
impl CompatibilityScorer for HeuristicScorer {
    async fn score(&self, profile: &Profile, record: &EnhancedRecord) -> MatchResult {
        heuristic_score(profile, record)
    }

    fn backend(&self) -> &'static str {
        "heuristic"
    }
}

/// Deterministic fallback.
///
/// overlap = |lower(record.skills) ∩ lower(profile.skills)|
/// skill_match_percentage = 100 × overlap / |lower(record.skills)|, 0 when the record lists none
/// compatibility_score = min(skill_match_percentage / 100, 1.0)
pub fn heuristic_score(profile: &Profile, record: &EnhancedRecord) -> MatchResult {
    let profile_skills: HashSet<String> = profile
        .skills()
        .iter()
        .map(|s| s.trim().to_lowercase())
        .filter(|s| !s.is_empty())
        .collect();

    // Unique required skills in record order, first spelling kept.
    let mut seen = HashSet::new();
    let required: Vec<&str> = record
        .skills
        .iter()
        .map(|s| s.trim())
        .filter(|s| !s.is_empty() && seen.insert(s.to_lowercase()))
        .collect();

    let (matched, missing): (Vec<&str>, Vec<&str>) = required
        .iter()
        .copied()
        .partition(|s| profile_skills.contains(&s.to_lowercase()));

    let overlap = matched.len();
    let skill_match_percentage = if required.is_empty() {
        0.0
    } else {
        100.0 * overlap as f64 / required.len() as f64
    };
    let compatibility_score = (skill_match_percentage / 100.0).min(1.0);

    MatchResult {
        compatibility_score,
        skill_match_percentage,
        experience_fit: NOT_ASSESSED.to_string(),
        salary_alignment: NOT_ASSESSED.to_string(),
        growth_potential: NOT_ASSESSED.to_string(),
        explanation: format!(
            "Heuristic skill-overlap score: {overlap} of {} required skills matched.",
            required.len()
        ),
        recommendations: build_recommendations(skill_match_percentage, &missing),
        source: ScoreSource::FallbackHeuristic,
    }
}

fn build_recommendations(percentage: f64, missing: &[&str]) -> Vec<String> {
    let mut out = Vec::new();
    if !missing.is_empty() {
        out.push(format!("Close skill gaps: {}.", missing.join(", ")));
    }
    if percentage >= 80.0 {
        out.push("Strong skill overlap. Worth pursuing.".to_string());
    } else if percentage >= 50.0 {
        out.push("Partial skill overlap. Emphasise transferable experience.".to_string());
    }
    out
}

// ────────────────────────────────────────────────────────────────────────────
// ModelScorer
// ────────────────────────────────────────────────────────────────────────────

/// Scores through a language model, retrying once, then falls back to the heuristic.
pub struct ModelScorer {
    model: Arc<dyn LanguageModel>,
    limiter: CallLimiter,
}

impl ModelScorer {
    pub fn new(model: Arc<dyn LanguageModel>, limiter: CallLimiter) -> Self {
        Self { model, limiter }
    }

    /// A single primary-path attempt.
    pub async fn try_score(
        &self,
        profile: &Profile,
        record: &EnhancedRecord,
    ) -> Result<MatchResult, ScoringFailure> {
        let prompt = build_match_prompt(profile, record)?;

        let text = {
            let _permit = self.limiter.acquire().await.ok_or(LlmError::LimiterClosed)?;
            self.model.complete(&match_system(), &prompt).await?
        };

        parse_assessment(&text)
    }
}

#[async_trait]
impl CompatibilityScorer for ModelScorer {
    async fn score(&self, profile: &Profile, record: &EnhancedRecord) -> MatchResult {
        for attempt in 0..MAX_MODEL_ATTEMPTS {
            match self.try_score(profile, record).await {
                Ok(result) => return result,
                Err(e) => warn!(
                    "Model scoring attempt {}/{} failed for '{}': {}",
                    attempt + 1,
                    MAX_MODEL_ATTEMPTS,
                    record.title,
                    e
                ),
            }
        }

        warn!(
            "Falling back to heuristic scoring for '{}' at '{}'",
            record.title, record.company_or_name
        );
        heuristic_score(profile, record)
    }

    fn backend(&self) -> &'static str {
        "model"
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Prompt + response contract
// ────────────────────────────────────────────────────────────────────────────

/// Structured response the model is asked to return.
#[derive(Debug, Deserialize)]
struct ModelAssessment {
    compatibility_score: f64,
    skill_match_percentage: f64,
    experience_fit: String,
    salary_alignment: String,
    growth_potential: String,
    explanation: String,
    #[serde(default)]
    recommendations: Vec<String>,
}

/// Decodes and checks a model response. Fences are tolerated; anything off
/// contract is a `ScoringFailure`.
pub fn parse_assessment(text: &str) -> Result<MatchResult, ScoringFailure> {
    let assessment: ModelAssessment = serde_json::from_str(strip_json_fences(text))?;

    if !(0.0..=1.0).contains(&assessment.compatibility_score) {
        return Err(ScoringFailure::Schema(format!(
            "compatibility_score {} outside 0.0–1.0",
            assessment.compatibility_score
        )));
    }
    if !(0.0..=100.0).contains(&assessment.skill_match_percentage) {
        return Err(ScoringFailure::Schema(format!(
            "skill_match_percentage {} outside 0–100",
            assessment.skill_match_percentage
        )));
    }
    let explanation = assessment.explanation.trim();
    if explanation.is_empty() {
        return Err(ScoringFailure::Schema("explanation is empty".to_string()));
    }

    Ok(MatchResult {
        compatibility_score: assessment.compatibility_score,
        skill_match_percentage: assessment.skill_match_percentage,
        experience_fit: assessment.experience_fit,
        salary_alignment: assessment.salary_alignment,
        growth_potential: assessment.growth_potential,
        explanation: explanation.to_string(),
        recommendations: assessment
            .recommendations
            .into_iter()
            .map(|r| r.trim().to_string())
            .filter(|r| !r.is_empty())
            .collect(),
        source: ScoreSource::ModelScored,
    })
}

/// Fills the compatibility template with the profile and record fields.
pub fn build_match_prompt(
    profile: &Profile,
    record: &EnhancedRecord,
) -> Result<String, ScoringFailure> {
    let (profile_label, record_label, profile_json) = match profile {
        Profile::Seeker(s) => (
            "JOB SEEKER",
            "JOB POSTING",
            serde_json::json!({
                "skills": s.skills,
                "experience": profile.experience_summary(),
                "education": s.education_level,
                "location": s.location,
                "salary_expectations": s.salary_range,
                "preferred_job_types": s.preferred_job_types,
                "career_goals": s.career_goals,
            }),
        ),
        Profile::Posting(p) => (
            "JOB POSTING",
            "CANDIDATE",
            serde_json::json!({
                "title": p.title,
                "company": p.company,
                "required_skills": p.skills,
                "experience_required": p.experience_required,
                "education": p.education_level,
                "location": p.location,
                "salary_range": p.salary_range,
                "job_type": p.job_type,
                "description": p.description,
            }),
        ),
    };

    let record_json = serde_json::json!({
        "title": record.title,
        "company_or_name": record.company_or_name,
        "location": record.location,
        "skills": record.skills,
        "experience": record.experience,
        "description": record.description,
    });

    Ok(MATCH_PROMPT_TEMPLATE
        .replace("{evidence_instruction}", EVIDENCE_INSTRUCTION)
        .replace("{profile_label}", profile_label)
        .replace("{profile_json}", &serde_json::to_string_pretty(&profile_json)?)
        .replace("{record_label}", record_label)
        .replace("{record_json}", &serde_json::to_string_pretty(&record_json)?))
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::SeekerProfile;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Mutex;

    const VALID_RESPONSE: &str = r#"{
        "compatibility_score": 0.85,
        "skill_match_percentage": 80.0,
        "experience_fit": "Good fit",
        "salary_alignment": "Within range",
        "growth_potential": "High",
        "explanation": "Strong technical skills match",
        "recommendations": ["Consider applying immediately"]
    }"#;

    /// Replays canned responses in order; repeats the last one when exhausted.
    struct ScriptedModel {
        responses: Mutex<Vec<Result<String, ()>>>,
        calls: AtomicU32,
    }

    impl ScriptedModel {
        fn new(responses: Vec<Result<&str, ()>>) -> Arc<Self> {
            let mut responses: Vec<Result<String, ()>> = responses
                .into_iter()
                .map(|r| r.map(str::to_string))
                .collect();
            responses.reverse();
            Arc::new(Self {
                responses: Mutex::new(responses),
                calls: AtomicU32::new(0),
            })
        }
    }

    #[async_trait]
    impl LanguageModel for ScriptedModel {
        async fn complete(&self, _system: &str, _prompt: &str) -> Result<String, LlmError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let mut responses = self.responses.lock().unwrap();
            let next = if responses.len() > 1 {
                responses.pop().unwrap()
            } else {
                responses.last().cloned().unwrap()
            };
            next.map_err(|_| LlmError::Api {
                status: 503,
                message: "overloaded".to_string(),
            })
        }
    }

    fn seeker(skills: &[&str]) -> Profile {
        Profile::Seeker(SeekerProfile {
            skills: skills.iter().map(|s| s.to_string()).collect(),
            experience_years: 3,
            education_level: Some("Bachelor's".to_string()),
            location: Some("Remote".to_string()),
            salary_range: Some("$80,000 - $120,000".to_string()),
            preferred_job_types: vec!["Full-time".to_string()],
            career_goals: None,
        })
    }

    fn record(skills: &[&str]) -> EnhancedRecord {
        EnhancedRecord {
            title: "Data Scientist".to_string(),
            company_or_name: "TechCorp".to_string(),
            location: "Remote".to_string(),
            skills: skills.iter().map(|s| s.to_string()).collect(),
            experience: "2-4 years".to_string(),
            description: "Build ML models".to_string(),
            url: String::new(),
        }
    }

    fn scorer(model: Arc<ScriptedModel>) -> ModelScorer {
        ModelScorer::new(model, CallLimiter::new(10))
    }

    // ── heuristic ──────────────────────────────────────────────────────────

    #[test]
    fn test_heuristic_half_overlap() {
        let result = heuristic_score(&seeker(&["Python", "SQL"]), &record(&["Python", "Statistics"]));
        assert_eq!(result.skill_match_percentage, 50.0);
        assert_eq!(result.compatibility_score, 0.5);
        assert_eq!(result.source, ScoreSource::FallbackHeuristic);
        assert!(result.explanation.contains("1 of 2"));
    }

    #[test]
    fn test_heuristic_empty_profile_skills() {
        let result = heuristic_score(&seeker(&[]), &record(&["Python", "Statistics"]));
        assert_eq!(result.skill_match_percentage, 0.0);
        assert_eq!(result.compatibility_score, 0.0);
    }

    #[test]
    fn test_heuristic_record_without_required_skills() {
        let result = heuristic_score(&seeker(&["Python"]), &record(&[]));
        assert_eq!(result.skill_match_percentage, 0.0);
        assert_eq!(result.compatibility_score, 0.0);
        assert!(!result.explanation.is_empty());
    }

    #[test]
    fn test_heuristic_is_case_insensitive() {
        let result = heuristic_score(&seeker(&["python", "STATISTICS"]), &record(&["Python", "Statistics"]));
        assert_eq!(result.skill_match_percentage, 100.0);
        assert_eq!(result.compatibility_score, 1.0);
    }

    #[test]
    fn test_heuristic_duplicate_record_skills_counted_once() {
        let result = heuristic_score(&seeker(&["Python"]), &record(&["Python", "python", "SQL"]));
        assert_eq!(result.skill_match_percentage, 50.0);
    }

    #[test]
    fn test_heuristic_is_pure() {
        let profile = seeker(&["Python", "SQL", "Spark"]);
        let rec = record(&["Python", "Statistics", "Spark", "Airflow"]);
        assert_eq!(heuristic_score(&profile, &rec), heuristic_score(&profile, &rec));
    }

    #[test]
    fn test_heuristic_recommendations_list_missing_skills() {
        let result = heuristic_score(&seeker(&["Python"]), &record(&["Python", "Statistics", "SQL"]));
        assert!(result.recommendations[0].contains("Statistics, SQL"));
    }

    // ── parser ─────────────────────────────────────────────────────────────

    #[test]
    fn test_parse_valid_assessment() {
        let result = parse_assessment(VALID_RESPONSE).unwrap();
        assert_eq!(result.compatibility_score, 0.85);
        assert_eq!(result.skill_match_percentage, 80.0);
        assert_eq!(result.source, ScoreSource::ModelScored);
        assert_eq!(result.recommendations.len(), 1);
    }

    #[test]
    fn test_parse_fenced_assessment() {
        let fenced = format!("```json\n{VALID_RESPONSE}\n```");
        assert!(parse_assessment(&fenced).is_ok());
    }

    #[test]
    fn test_parse_rejects_malformed_json() {
        assert!(matches!(
            parse_assessment("{\"compatibility_score\": 0.85,"),
            Err(ScoringFailure::Malformed(_))
        ));
    }

    #[test]
    fn test_parse_rejects_missing_fields() {
        // Shape returned by a partial model reply
        let partial = r#"{"compatibility_score": 0.85, "explanation": "Great match!"}"#;
        assert!(matches!(parse_assessment(partial), Err(ScoringFailure::Malformed(_))));
    }

    #[test]
    fn test_parse_rejects_out_of_range_scores() {
        let high = VALID_RESPONSE.replace("0.85", "1.5");
        assert!(matches!(parse_assessment(&high), Err(ScoringFailure::Schema(_))));

        let pct = VALID_RESPONSE.replace("80.0", "150.0");
        assert!(matches!(parse_assessment(&pct), Err(ScoringFailure::Schema(_))));
    }

    #[test]
    fn test_parse_rejects_blank_explanation() {
        let blank = VALID_RESPONSE.replace("Strong technical skills match", "  ");
        assert!(matches!(parse_assessment(&blank), Err(ScoringFailure::Schema(_))));
    }

    #[test]
    fn test_prompt_embeds_profile_and_record_fields() {
        let prompt = build_match_prompt(&seeker(&["Python"]), &record(&["Statistics"])).unwrap();
        assert!(prompt.contains("JOB SEEKER"));
        assert!(prompt.contains("\"salary_expectations\": \"$80,000 - $120,000\""));
        assert!(prompt.contains("\"Statistics\""));
        assert!(prompt.contains("Build ML models"));
        assert!(!prompt.contains("{record_json}"));
    }

    // ── model scorer ───────────────────────────────────────────────────────

    #[tokio::test]
    async fn test_model_scorer_uses_model_result() {
        let model = ScriptedModel::new(vec![Ok(VALID_RESPONSE)]);
        let result = scorer(model.clone())
            .score(&seeker(&["Python"]), &record(&["Python"]))
            .await;
        assert_eq!(result.source, ScoreSource::ModelScored);
        assert_eq!(model.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_model_scorer_retries_once_then_succeeds() {
        let model = ScriptedModel::new(vec![Err(()), Ok(VALID_RESPONSE)]);
        let result = scorer(model.clone())
            .score(&seeker(&["Python"]), &record(&["Python"]))
            .await;
        assert_eq!(result.source, ScoreSource::ModelScored);
        assert_eq!(model.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_malformed_response_falls_back() {
        let model = ScriptedModel::new(vec![Ok("not json at all")]);
        let result = scorer(model.clone())
            .score(&seeker(&["Python", "SQL"]), &record(&["Python", "Statistics"]))
            .await;
        assert_eq!(result.source, ScoreSource::FallbackHeuristic);
        assert_eq!(result.skill_match_percentage, 50.0);
        assert_eq!(model.calls.load(Ordering::SeqCst), MAX_MODEL_ATTEMPTS);
    }

    #[tokio::test]
    async fn test_model_errors_fall_back_without_panicking() {
        let model = ScriptedModel::new(vec![Err(())]);
        let result = scorer(model.clone())
            .score(&seeker(&[]), &record(&["Python"]))
            .await;
        assert_eq!(result.source, ScoreSource::FallbackHeuristic);
        assert_eq!(result.compatibility_score, 0.0);
        assert_eq!(model.calls.load(Ordering::SeqCst), MAX_MODEL_ATTEMPTS);
    }

    #[tokio::test]
    async fn test_model_scorer_releases_limiter_permits() {
        let limiter = CallLimiter::new(1);
        let model = ScriptedModel::new(vec![Err(())]);
        let scorer = ModelScorer::new(model, limiter.clone());
        let _ = scorer.score(&seeker(&["Python"]), &record(&["Python"])).await;
        assert_eq!(limiter.available(), 1);
    }
}
