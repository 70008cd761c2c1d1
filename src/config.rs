use anyhow::{Context, Result};

/// Application configuration loaded from environment variables.
///
/// The API credential is resolved here and injected into the LLM client at
/// construction — nothing reads the environment at call time.
#[derive(Debug, Clone)]
pub struct Config {
    pub anthropic_api_key: String,
    /// Total enhancement attempts before falling back to empty skills.
    pub max_retries: u32,
    /// Fixed delay between enhancement attempts, in seconds.
    pub retry_delay_secs: u64,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            anthropic_api_key: require_env("ANTHROPIC_API_KEY")?,
            max_retries: std::env::var("ENHANCE_MAX_RETRIES")
                .unwrap_or_else(|_| "3".to_string())
                .parse::<u32>()
                .context("ENHANCE_MAX_RETRIES must be a positive integer")?,
            retry_delay_secs: std::env::var("ENHANCE_RETRY_DELAY_SECS")
                .unwrap_or_else(|_| "2".to_string())
                .parse::<u64>()
                .context("ENHANCE_RETRY_DELAY_SECS must be a non-negative integer")?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        })
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}
