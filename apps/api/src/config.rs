use anyhow::{Context, Result};

/// Application configuration loaded from environment variables.
/// Fails at startup if required variables are missing.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub anthropic_api_key: String,
    pub port: u16,
    pub rust_log: String,
    /// OpenAI-compatible embeddings endpoint. When unset the offline hashing embedder is used.
    pub embedding_api_url: Option<String>,
    pub embedding_api_key: Option<String>,
    pub embedding_model: String,
    pub embedding_dim: usize,
    pub llm_timeout_secs: u64,
    pub llm_max_retries: u32,
    /// Periodic index rebuild interval. `None` means refresh only on explicit request.
    pub index_refresh_secs: Option<u64>,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            database_url: require_env("DATABASE_URL")?,
            anthropic_api_key: require_env("ANTHROPIC_API_KEY")?,
            port: parse_env("PORT", 8080)?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
            embedding_api_url: optional_env("EMBEDDING_API_URL"),
            embedding_api_key: optional_env("EMBEDDING_API_KEY"),
            embedding_model: std::env::var("EMBEDDING_MODEL")
                .unwrap_or_else(|_| "all-MiniLM-L6-v2".to_string()),
            embedding_dim: parse_env("EMBEDDING_DIM", 384)?,
            llm_timeout_secs: parse_env("LLM_TIMEOUT_SECS", 120)?,
            llm_max_retries: parse_env("LLM_MAX_RETRIES", 3)?,
            index_refresh_secs: optional_env("INDEX_REFRESH_SECS")
                .map(|v| {
                    v.parse::<u64>()
                        .context("INDEX_REFRESH_SECS must be a whole number of seconds")
                })
                .transpose()?,
        })
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

fn optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn parse_env<T: std::str::FromStr>(key: &str, default: T) -> Result<T> {
    match optional_env(key) {
        Some(raw) => raw
            .parse::<T>()
            .map_err(|_| anyhow::anyhow!("{key} has an invalid value: '{raw}'")),
        None => Ok(default),
    }
}
