//! Match pipeline: orchestrates one matching request end to end.
//!
//! Flow: validate_profile → build_query → search (retry/backoff) →
//!       enhance_results → score each record → rank_matches.
//!
//! Stages run in order; records within the scoring stage are scored
//! concurrently, bounded by the shared `CallLimiter`.

use std::sync::Arc;

use chrono::Utc;
use futures::future::join_all;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{info, warn};
use uuid::Uuid;

use crate::config::{Config, MatchSettings};
use crate::errors::{MatchError, ValidationError};
use crate::limiter::CallLimiter;
use crate::llm_client::LlmClient;
use crate::matching::enhancer::enhance_results;
use crate::matching::formatter::rank_matches;
use crate::matching::scoring::{CompatibilityScorer, HeuristicScorer, ModelScorer};
use crate::matching::validation::validate_profile;
use crate::models::{EnhancedRecord, MatchOutcome, MatchResult, Profile, ProfileKind, ScoreSource};
use crate::search::{build_query, SearchAdapter, SearchError, TavilyClient};

/// Per-request knobs. Unset values fall back to `MatchSettings`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchOptions {
    /// Upper bound on records requested from the search provider. Must be at
    /// least 1 when set.
    pub max_results: Option<usize>,
    /// Total search attempts before giving up.
    pub max_retries: Option<u32>,
    /// Keep only the best N matches. `None` keeps all.
    pub top_n: Option<usize>,
    /// Return an empty, degraded outcome instead of an error when search is unavailable.
    pub allow_degraded: bool,
}

/// The matching service. Cheap to clone; holds no per-request state.
#[derive(Clone)]
pub struct MatchPipeline {
    search: SearchAdapter,
    scorer: Arc<dyn CompatibilityScorer>,
    settings: MatchSettings,
}

impl MatchPipeline {
    pub fn new(
        search: SearchAdapter,
        scorer: Arc<dyn CompatibilityScorer>,
        settings: MatchSettings,
    ) -> Self {
        Self {
            search,
            scorer,
            settings,
        }
    }

    /// Wires the production providers. Without a model key every record is
    /// scored by the heuristic.
    pub fn from_config(config: &Config) -> Self {
        let settings = config.matching.clone();
        let limiter = CallLimiter::new(settings.max_concurrent_calls);

        let provider = Arc::new(TavilyClient::new(
            config.search_endpoint.clone(),
            config.search_api_key.clone(),
        ));
        let search = SearchAdapter::new(provider, limiter.clone(), settings.search_backoff_base);

        let scorer: Arc<dyn CompatibilityScorer> = match &config.anthropic_api_key {
            Some(key) => {
                let llm = LlmClient::new(
                    key.clone(),
                    settings.model_temperature,
                    settings.model_max_tokens,
                );
                Arc::new(ModelScorer::new(Arc::new(llm), limiter))
            }
            None => {
                warn!("ANTHROPIC_API_KEY not set; scoring with the skill-overlap heuristic only");
                Arc::new(HeuristicScorer)
            }
        };

        Self::new(search, scorer, settings)
    }

    pub fn scorer_backend(&self) -> &'static str {
        self.scorer.backend()
    }

    /// Closes the shared call limiter. Calls already in flight finish; every
    /// later search or model call fails fast instead of queueing.
    pub fn shutdown(&self) {
        self.search.limiter().close();
    }

    /// Validates `profile_data`, searches, enhances, scores and ranks.
    pub async fn run_match(
        &self,
        profile_data: &Map<String, Value>,
        kind: ProfileKind,
        options: &MatchOptions,
    ) -> Result<MatchOutcome, MatchError> {
        let profile = validate_profile(profile_data, kind)?;
        self.run_profile(&profile, options).await
    }

    /// Same as `run_match` for an already-validated profile.
    pub async fn run_profile(
        &self,
        profile: &Profile,
        options: &MatchOptions,
    ) -> Result<MatchOutcome, MatchError> {
        if options.max_results == Some(0) {
            return Err(ValidationError::new("max_results", "must be at least 1").into());
        }

        let request_id = Uuid::new_v4();
        let kind = profile.kind();
        // Configured default is clamped; an explicit caller value is validated above.
        let max_results = options
            .max_results
            .unwrap_or(self.settings.default_max_results)
            .max(1);
        let max_retries = options
            .max_retries
            .unwrap_or(self.settings.search_max_retries);

        // Step 1: Search
        let query = build_query(profile);
        info!("[{request_id}] Searching for {kind} matches: {query}");

        let raw = match self
            .search
            .search_query(&query, max_results, max_retries)
            .await
        {
            Ok(raw) => raw,
            Err(e @ SearchError::Unavailable { .. }) if options.allow_degraded => {
                warn!("[{request_id}] {e}; returning degraded empty result");
                return Ok(MatchOutcome {
                    request_id,
                    kind,
                    query,
                    matches: Vec::new(),
                    total_candidates: 0,
                    degraded: true,
                    degraded_reason: Some(e.to_string()),
                    fallback_count: 0,
                    generated_at: Utc::now(),
                });
            }
            Err(e) => return Err(e.into()),
        };

        // Step 2: Enhance
        let records = enhance_results(raw);
        info!("[{request_id}] {} records after enhancement", records.len());

        // Step 3: Score
        let results = join_all(records.iter().map(|r| self.scorer.score(profile, r))).await;
        let scored: Vec<(EnhancedRecord, MatchResult)> = records.into_iter().zip(results).collect();

        let fallback_count = scored
            .iter()
            .filter(|(_, r)| r.source == ScoreSource::FallbackHeuristic)
            .count();
        let degraded_reason = (fallback_count > 0).then(|| {
            format!(
                "{fallback_count} of {} records scored with the fallback heuristic",
                scored.len()
            )
        });

        // Step 4: Rank
        let matches = rank_matches(&scored, options.top_n);

        info!(
            "[{request_id}] Returning {} of {} matches ({} via fallback, scorer={})",
            matches.len(),
            scored.len(),
            fallback_count,
            self.scorer.backend()
        );

        Ok(MatchOutcome {
            request_id,
            kind,
            query,
            matches,
            total_candidates: scored.len(),
            degraded: degraded_reason.is_some(),
            degraded_reason,
            fallback_count,
            generated_at: Utc::now(),
        })
    }
}
