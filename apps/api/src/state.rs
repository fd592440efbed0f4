use crate::config::Config;
use crate::matching::MatchPipeline;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// Matching service. Holds the search adapter, the scorer and the shared call limiter.
    pub pipeline: MatchPipeline,
    pub config: Config,
}
