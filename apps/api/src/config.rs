use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};

use crate::llm_client::DEFAULT_BASE_URL;

/// Application configuration loaded from environment variables.
/// Everything has a default; a missing `GEMINI_API_KEY` only disables the remote paths.
#[derive(Debug, Clone)]
pub struct Config {
    pub gemini_api_key: Option<String>,
    pub gemini_base_url: String,
    pub redis_url: Option<String>,
    pub session_data_dir: PathBuf,
    pub port: u16,
    pub rust_log: String,
    pub scoring_seed: Option<u64>,
    pub remote_max_retries: u32,
    pub remote_retry_base: Duration,
    pub question_batch_size: usize,
    pub question_min_yield: usize,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            gemini_api_key: optional_env("GEMINI_API_KEY"),
            gemini_base_url: optional_env("GEMINI_BASE_URL")
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            redis_url: optional_env("REDIS_URL"),
            session_data_dir: optional_env("SESSION_DATA_DIR")
                .unwrap_or_else(|| "./data/sessions".to_string())
                .into(),
            port: parse_env("PORT", 8080).context("PORT must be a valid port number")?,
            rust_log: optional_env("RUST_LOG").unwrap_or_else(|| "info".to_string()),
            scoring_seed: optional_env("SCORING_SEED")
                .map(|v| v.parse::<u64>())
                .transpose()
                .context("SCORING_SEED must be an unsigned integer")?,
            remote_max_retries: parse_env("REMOTE_MAX_RETRIES", 3)
                .context("REMOTE_MAX_RETRIES must be an unsigned integer")?,
            remote_retry_base: Duration::from_millis(
                parse_env("REMOTE_RETRY_BASE_MS", 1000)
                    .context("REMOTE_RETRY_BASE_MS must be a number of milliseconds")?,
            ),
            question_batch_size: parse_env("QUESTION_BATCH_SIZE", 25)
                .context("QUESTION_BATCH_SIZE must be an unsigned integer")?,
            question_min_yield: parse_env("QUESTION_MIN_YIELD", 20)
                .context("QUESTION_MIN_YIELD must be an unsigned integer")?,
        })
    }
}

/// Unset and blank are treated the same.
fn optional_env(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn parse_env<T>(key: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match optional_env(key) {
        Some(raw) => Ok(raw.parse::<T>()?),
        None => Ok(default),
    }
}
