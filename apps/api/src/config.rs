use std::str::FromStr;
use std::time::Duration;

use anyhow::{Context, Result};

use crate::anonymization::pseudonym::PseudonymStrategy;

/// Default Hugging Face inference endpoint for the uncased BERT NER model.
const DEFAULT_NER_ENDPOINT: &str =
    "https://api-inference.huggingface.co/models/dslim/bert-base-NER-uncased";

/// Application configuration loaded from environment variables.
/// Startup fails if required variables are missing or malformed.
#[derive(Debug, Clone)]
pub struct Config {
    pub anthropic_api_key: String,
    pub ner_api_token: String,
    pub ner_endpoint: String,
    pub ner_min_score: f32,
    pub pseudonym_strategy: PseudonymStrategy,
    /// Relevance gate on the 1..=10 scale.
    pub relevance_threshold: u8,
    /// Unset means clarifications are unbounded.
    pub max_clarifications: Option<u32>,
    pub external_call_timeout: Duration,
    pub cv_fit_threshold: u8,
    /// Sessions older than this are evicted by the background sweeper.
    pub session_ttl: Duration,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let relevance_threshold: u8 = parse_env("RELEVANCE_THRESHOLD", 6)?;
        anyhow::ensure!(
            (1..=10).contains(&relevance_threshold),
            "RELEVANCE_THRESHOLD must be between 1 and 10"
        );
        let cv_fit_threshold: u8 = parse_env("CV_FIT_THRESHOLD", 5)?;
        anyhow::ensure!(
            (1..=10).contains(&cv_fit_threshold),
            "CV_FIT_THRESHOLD must be between 1 and 10"
        );

        let session_ttl_secs: u64 = parse_env("SESSION_TTL_SECS", 4 * 60 * 60)?;
        anyhow::ensure!(session_ttl_secs > 0, "SESSION_TTL_SECS must be positive");
        let session_ttl = Duration::from_secs(session_ttl_secs);

        Ok(Config {
            anthropic_api_key: require_env("ANTHROPIC_API_KEY")?,
            ner_api_token: require_env("NER_API_TOKEN")?,
            ner_endpoint: std::env::var("NER_ENDPOINT")
                .unwrap_or_else(|_| DEFAULT_NER_ENDPOINT.to_string()),
            ner_min_score: parse_env("NER_MIN_SCORE", 0.5)?,
            pseudonym_strategy: parse_env("PSEUDONYM_STRATEGY", PseudonymStrategy::Pool)?,
            relevance_threshold,
            max_clarifications: parse_optional_env("MAX_CLARIFICATIONS")?,
            external_call_timeout: Duration::from_secs(parse_env(
                "EXTERNAL_CALL_TIMEOUT_SECS",
                30,
            )?),
            cv_fit_threshold,
            session_ttl,
            port: parse_env("PORT", 8080)?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        })
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

fn parse_env<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    Ok(parse_optional_env(key)?.unwrap_or(default))
}

fn parse_optional_env<T>(key: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match std::env::var(key) {
        Ok(raw) if !raw.trim().is_empty() => parse_value(key, &raw).map(Some),
        _ => Ok(None),
    }
}

fn parse_value<T>(key: &str, raw: &str) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    raw.trim()
        .parse::<T>()
        .map_err(|e| anyhow::anyhow!("{e}"))
        .with_context(|| format!("Environment variable '{key}' has an invalid value '{raw}'"))
}
