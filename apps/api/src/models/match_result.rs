use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::profile::ProfileKind;
use crate::models::record::EnhancedRecord;

/// Which scoring path produced a result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoreSource {
    ModelScored,
    FallbackHeuristic,
}

/// Compatibility assessment of one (profile, record) pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchResult {
    pub compatibility_score: f64,      // 0.0 – 1.0
    pub skill_match_percentage: f64,   // 0.0 – 100.0
    pub experience_fit: String,
    pub salary_alignment: String,
    pub growth_potential: String,
    pub explanation: String,
    pub recommendations: Vec<String>,
    pub source: ScoreSource,
}

/// One entry of the final ranked output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedMatch {
    pub rank: usize, // 1-based
    pub record: EnhancedRecord,
    pub result: MatchResult,
}

/// Aggregate output of a single pipeline run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchOutcome {
    pub request_id: Uuid,
    pub kind: ProfileKind,
    pub query: String,
    pub matches: Vec<RankedMatch>,
    /// Records left after enhancement, before any top-N cut.
    pub total_candidates: usize,
    /// Set when the output was produced without full search or model participation.
    pub degraded: bool,
    pub degraded_reason: Option<String>,
    pub fallback_count: usize,
    pub generated_at: DateTime<Utc>,
}
