use std::time::Duration;

use anyhow::{Context, Result};

use crate::llm_client::InferenceConfig;

/// Model requested from the provider when `INFERENCE_MODEL` is not set.
pub const DEFAULT_MODEL: &str = "meta-llama/Llama-3.3-70B-Instruct-Turbo";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_SOURCE_TAG: &str = "deepqueryv1.5";

/// Application configuration loaded from environment variables.
///
/// The provider URL and key are read leniently here; `InferenceClient::new`
/// rejects them when blank so a misconfigured service fails at startup.
#[derive(Debug, Clone)]
pub struct Config {
    /// PostgreSQL connection string. `None` runs on the in-memory store.
    pub database_url: Option<String>,
    pub inference_api_url: String,
    pub inference_api_key: String,
    pub inference_model: String,
    pub inference_timeout_secs: u64,
    /// Bearer token required on `/jdgen/` routes. `None` disables the check.
    pub api_token: Option<String>,
    /// Reported back to callers as `source` on every generated JD.
    pub source_tag: String,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            database_url: optional_env("DATABASE_URL"),
            inference_api_url: optional_env("INFERENCE_API_URL").unwrap_or_default(),
            inference_api_key: optional_env("INFERENCE_API_KEY").unwrap_or_default(),
            inference_model: optional_env("INFERENCE_MODEL")
                .unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            inference_timeout_secs: match optional_env("INFERENCE_TIMEOUT_SECS") {
                Some(raw) => raw
                    .parse::<u64>()
                    .context("INFERENCE_TIMEOUT_SECS must be a whole number of seconds")?,
                None => DEFAULT_TIMEOUT_SECS,
            },
            api_token: optional_env("JDGEN_API_TOKEN"),
            source_tag: optional_env("JDGEN_SOURCE_TAG")
                .unwrap_or_else(|| DEFAULT_SOURCE_TAG.to_string()),
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        })
    }

    /// The slice of configuration the inference client is constructed from.
    pub fn inference(&self) -> InferenceConfig {
        InferenceConfig {
            api_url: self.inference_api_url.clone(),
            api_key: self.inference_api_key.clone(),
            model: self.inference_model.clone(),
            timeout: Duration::from_secs(self.inference_timeout_secs),
        }
    }
}

/// Reads an env var, treating unset and blank the same.
fn optional_env(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
