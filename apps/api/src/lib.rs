//! Job/candidate compatibility matching.
//!
//! A request flows through validation, external search, record enhancement,
//! model-backed scoring with a deterministic fallback, and ranking.

pub mod config;
pub mod errors;
pub mod limiter;
pub mod llm_client;
pub mod matching;
pub mod models;
pub mod routes;
pub mod search;
pub mod state;

pub use errors::{AppError, MatchError, ValidationError};
pub use matching::{MatchOptions, MatchPipeline};
pub use models::{EnhancedRecord, MatchOutcome, MatchResult, Profile, ProfileKind, ScoreSource};
