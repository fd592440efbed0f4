use std::time::Duration;

use anyhow::{Context, Result};

const DEFAULT_SEARCH_ENDPOINT: &str = "https://api.tavily.com/search";

/// Application configuration loaded from environment variables.
/// Fails at startup if required variables are missing.
#[derive(Debug, Clone)]
pub struct Config {
    pub search_api_key: String,
    pub search_endpoint: String,
    /// When absent the service scores with the skill-overlap heuristic only.
    pub anthropic_api_key: Option<String>,
    pub port: u16,
    pub rust_log: String,
    pub matching: MatchSettings,
}

/// Matching tunables, handed to each component at construction.
#[derive(Debug, Clone, PartialEq)]
pub struct MatchSettings {
    pub model_temperature: f32,
    pub model_max_tokens: u32,
    pub search_max_retries: u32,
    pub search_backoff_base: Duration,
    pub max_concurrent_calls: usize,
    pub default_max_results: usize,
}

impl Default for MatchSettings {
    fn default() -> Self {
        Self {
            model_temperature: 0.1,
            model_max_tokens: 1024,
            search_max_retries: 3,
            search_backoff_base: Duration::from_secs(1),
            max_concurrent_calls: 10,
            default_max_results: 10,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let defaults = MatchSettings::default();

        Ok(Config {
            search_api_key: require_env("SEARCH_API_KEY")?,
            search_endpoint: std::env::var("SEARCH_ENDPOINT")
                .unwrap_or_else(|_| DEFAULT_SEARCH_ENDPOINT.to_string()),
            anthropic_api_key: std::env::var("ANTHROPIC_API_KEY")
                .ok()
                .filter(|k| !k.trim().is_empty()),
            port: parse_env("PORT", 8080)?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
            matching: MatchSettings {
                model_temperature: parse_env("MODEL_TEMPERATURE", defaults.model_temperature)?,
                model_max_tokens: parse_env("MODEL_MAX_TOKENS", defaults.model_max_tokens)?,
                search_max_retries: parse_env("SEARCH_MAX_RETRIES", defaults.search_max_retries)?,
                search_backoff_base: Duration::from_millis(parse_env(
                    "SEARCH_BACKOFF_BASE_MS",
                    defaults.search_backoff_base.as_millis() as u64,
                )?),
                max_concurrent_calls: parse_env(
                    "MAX_CONCURRENT_CALLS",
                    defaults.max_concurrent_calls,
                )?,
                default_max_results: parse_env(
                    "DEFAULT_MAX_RESULTS",
                    defaults.default_max_results,
                )?,
            },
        })
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

fn parse_env<T>(key: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("Environment variable '{key}' has an invalid value: {raw}")),
        Err(_) => Ok(default),
    }
}
