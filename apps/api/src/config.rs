use std::path::PathBuf;

use anyhow::{Context, Result};

use crate::content::fetcher::DEFAULT_READER_BASE_URL;
use crate::llm_client::LlmConfig;

/// Application configuration loaded from environment variables.
///
/// `GEMINI_API_KEY` is optional here: a missing key does not stop the server,
/// it surfaces as a configuration error on the first generate/refine call.
#[derive(Debug, Clone)]
pub struct Config {
    pub llm: LlmConfig,
    pub persona_dir: PathBuf,
    pub reader_base_url: String,
    pub use_reader_mode: bool,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            llm: LlmConfig::new(optional_env("GEMINI_API_KEY")),
            persona_dir: optional_env("PERSONA_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("personas")),
            reader_base_url: optional_env("READER_BASE_URL")
                .unwrap_or_else(|| DEFAULT_READER_BASE_URL.to_string()),
            use_reader_mode: match optional_env("USE_READER_MODE") {
                Some(raw) => parse_flag(&raw)
                    .with_context(|| format!("USE_READER_MODE must be a boolean, got '{raw}'"))?,
                None => true,
            },
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        })
    }
}

/// Reads an env var, treating unset and blank values the same way.
fn optional_env(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
