//! Axum route handlers for the Matching API.

use axum::{extract::State, Json};
use serde::Deserialize;
use serde_json::{Map, Value};

use crate::errors::AppError;
use crate::matching::pipeline::MatchOptions;
use crate::matching::validation::parse_kind;
use crate::models::MatchOutcome;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct MatchRequest {
    pub kind: String,
    pub profile: Map<String, Value>,
    #[serde(default)]
    pub options: MatchOptions,
}

/// POST /api/v1/match
///
/// Validates the profile, searches for counterparts, scores and ranks them.
/// 400 on a bad profile, 503 when the search provider stays unavailable.
pub async fn handle_match(
    State(state): State<AppState>,
    Json(request): Json<MatchRequest>,
) -> Result<Json<MatchOutcome>, AppError> {
    let kind = parse_kind(&request.kind)?;

    let outcome = state
        .pipeline
        .run_match(&request.profile, kind, &request.options)
        .await?;

    Ok(Json(outcome))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_match_request_options_optional() {
        let request: MatchRequest = serde_json::from_value(json!({
            "kind": "seeker",
            "profile": {"skills": ["Python"], "experience_years": 3}
        }))
        .unwrap();
        assert_eq!(request.kind, "seeker");
        assert!(request.options.top_n.is_none());
    }

    #[test]
    fn test_match_request_profile_must_be_object() {
        let result: Result<MatchRequest, _> = serde_json::from_value(json!({
            "kind": "seeker",
            "profile": ["Python"]
        }));
        assert!(result.is_err());
    }
}
