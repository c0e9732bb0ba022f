use std::time::Duration;

use anyhow::{Context, Result};

use crate::acquisition::competitors::DEFAULT_COMPETITOR_DELAY;

/// Application configuration loaded from environment variables.
/// Startup fails if required variables are missing or malformed.
#[derive(Debug, Clone)]
pub struct Config {
    pub openai_api_key: String,
    pub openai_base_url: String,
    pub port: u16,
    pub rust_log: String,
    /// Pause between consecutive competitor page fetches.
    pub competitor_delay: Duration,
    pub verify_llm_on_startup: bool,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            openai_api_key: require_env("OPENAI_API_KEY")?,
            openai_base_url: std::env::var("OPENAI_BASE_URL")
                .unwrap_or_else(|_| crate::llm_client::DEFAULT_BASE_URL.to_string()),
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
            competitor_delay: match std::env::var("COMPETITOR_DELAY_MS") {
                Ok(ms) => Duration::from_millis(
                    ms.parse::<u64>()
                        .context("COMPETITOR_DELAY_MS must be a whole number of milliseconds")?,
                ),
                Err(_) => DEFAULT_COMPETITOR_DELAY,
            },
            verify_llm_on_startup: parse_flag(
                "VERIFY_LLM_ON_STARTUP",
                std::env::var("VERIFY_LLM_ON_STARTUP").ok().as_deref(),
                true,
            )?,
        })
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

fn parse_flag(key: &str, raw: Option<&str>, default: bool) -> Result<bool> {
    match raw.map(|v| v.trim().to_ascii_lowercase()) {
        None => Ok(default),
        Some(v) if v.is_empty() => Ok(default),
        Some(v) => match v.as_str() {
            "1" | "true" | "yes" | "on" => Ok(true),
            "0" | "false" | "no" | "off" => Ok(false),
            other => anyhow::bail!("{key} must be a boolean, got '{other}'"),
        },
    }
}
