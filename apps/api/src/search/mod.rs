//! External search adapter: turns a profile into a provider query and runs
//! it with bounded retry and exponential backoff.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;
use tracing::{info, warn};

use crate::limiter::CallLimiter;
use crate::models::{Profile, SearchResult};

pub mod query;
pub mod tavily;

pub use query::build_query;
pub use tavily::TavilyClient;

#[derive(Debug, Error)]
pub enum SearchError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("provider error (status {status}): {message}")]
    Provider { status: u16, message: String },

    #[error("search call limiter closed")]
    LimiterClosed,

    #[error("search unavailable after {attempts} attempts: {last_error}")]
    Unavailable { attempts: u32, last_error: String },
}

/// Boundary to the external search provider. Results come back in the
/// provider's relevance order.
#[async_trait]
pub trait SearchProvider: Send + Sync {
    async fn search(&self, query: &str, max_results: usize)
        -> Result<Vec<SearchResult>, SearchError>;
}

/// Runs provider queries with retry. Holds a limiter permit only while a
/// provider call is in flight, never across a backoff sleep.
#[derive(Clone)]
pub struct SearchAdapter {
    provider: Arc<dyn SearchProvider>,
    limiter: CallLimiter,
    backoff_base: Duration,
}

impl SearchAdapter {
    pub fn new(
        provider: Arc<dyn SearchProvider>,
        limiter: CallLimiter,
        backoff_base: Duration,
    ) -> Self {
        Self {
            provider,
            limiter,
            backoff_base,
        }
    }

    pub fn limiter(&self) -> &CallLimiter {
        &self.limiter
    }

    /// Searches for records matching `profile`.
    ///
    /// Makes at most `max_retries` attempts (at least one). Between attempts
    /// waits `base * 2^attempt`. Exhaustion yields `SearchError::Unavailable`.
    pub async fn search(
        &self,
        profile: &Profile,
        max_results: usize,
        max_retries: u32,
    ) -> Result<Vec<SearchResult>, SearchError> {
        let query = build_query(profile);
        self.search_query(&query, max_results, max_retries).await
    }

    pub async fn search_query(
        &self,
        query: &str,
        max_results: usize,
        max_retries: u32,
    ) -> Result<Vec<SearchResult>, SearchError> {
        let attempts = max_retries.max(1);
        let mut last_error: Option<SearchError> = None;

        for attempt in 0..attempts {
            let outcome = {
                let _permit = self.limiter.acquire().await.ok_or(SearchError::LimiterClosed)?;
                self.provider.search(query, max_results).await
            };

            match outcome {
                Ok(mut results) => {
                    results.truncate(max_results);
                    info!(
                        "Search returned {} results on attempt {}",
                        results.len(),
                        attempt + 1
                    );
                    return Ok(results);
                }
                Err(e) => {
                    warn!("Search attempt {}/{} failed: {}", attempt + 1, attempts, e);
                    last_error = Some(e);
                }
            }

            if attempt + 1 < attempts {
                let delay = backoff_delay(self.backoff_base, attempt);
                warn!("Retrying search after {}ms...", delay.as_millis());
                tokio::time::sleep(delay).await;
            }
        }

        Err(SearchError::Unavailable {
            attempts,
            last_error: last_error
                .map(|e| e.to_string())
                .unwrap_or_else(|| "no attempt made".to_string()),
        })
    }
}

/// `base * 2^attempt`, attempt 0-indexed.
pub fn backoff_delay(base: Duration, attempt: u32) -> Duration {
    base.saturating_mul(1u32 << attempt.min(16))
}
