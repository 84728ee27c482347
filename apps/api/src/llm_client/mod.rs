//! Inference client, the single point of entry for all provider calls.
//!
//! No other module may talk to the inference provider directly. The endpoint is
//! any OpenAI-compatible chat-completion URL; whatever JSON shape comes back is
//! flattened to plain text by the extractors in [`extract`].

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, warn};

pub mod extract;

/// Upper bound on the provider body echoed back in a `Provider` error.
pub const MAX_ERROR_BODY_CHARS: usize = 1000;

#[derive(Debug, Error)]
pub enum InferenceError {
    #[error("Inference provider not configured: {0}")]
    Configuration(String),

    #[error("Transport error calling inference provider: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Inference provider returned status {status}: {body}")]
    Provider { status: u16, body: String },

    #[error("Inference provider returned a non-JSON body: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Everything the client needs to reach the provider. Built once from
/// [`crate::config::Config`] and handed to [`InferenceClient::new`].
#[derive(Debug, Clone)]
pub struct InferenceConfig {
    /// Full chat-completion endpoint URL.
    pub api_url: String,
    pub api_key: String,
    pub model: String,
    pub timeout: Duration,
}

/// Text-completion seam used by the orchestrator.
#[async_trait]
pub trait Inference: Send + Sync {
    async fn complete(
        &self,
        prompt: &str,
        max_tokens: u32,
        temperature: f32,
        system_prompt: Option<&str>,
    ) -> Result<String, InferenceError>;
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    max_tokens: u32,
    temperature: f32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

/// Chat-completion client. One attempt per call, bounded by the configured timeout.
#[derive(Clone)]
pub struct InferenceClient {
    client: Client,
    api_url: String,
    api_key: String,
    model: String,
}

impl InferenceClient {
    pub fn new(config: InferenceConfig) -> Result<Self, InferenceError> {
        if config.api_url.trim().is_empty() {
            return Err(InferenceError::Configuration(
                "INFERENCE_API_URL is not set".to_string(),
            ));
        }
        if config.api_key.trim().is_empty() {
            return Err(InferenceError::Configuration(
                "INFERENCE_API_KEY is not set".to_string(),
            ));
        }

        let client = Client::builder().timeout(config.timeout).build()?;

        Ok(Self {
            client,
            api_url: config.api_url,
            api_key: config.api_key,
            model: config.model,
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}

#[async_trait]
impl Inference for InferenceClient {
    async fn complete(
        &self,
        prompt: &str,
        max_tokens: u32,
        temperature: f32,
        system_prompt: Option<&str>,
    ) -> Result<String, InferenceError> {
        let mut messages = Vec::with_capacity(2);
        if let Some(system) = system_prompt {
            messages.push(ChatMessage {
                role: "system",
                content: system,
            });
        }
        messages.push(ChatMessage {
            role: "user",
            content: prompt,
        });

        let request_body = ChatRequest {
            model: &self.model,
            messages,
            max_tokens,
            temperature,
        };

        let response = self
            .client
            .post(&self.api_url)
            .bearer_auth(&self.api_key)
            .json(&request_body)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            warn!("Inference provider returned {status}");
            return Err(InferenceError::Provider {
                status: status.as_u16(),
                body: truncate_chars(&body, MAX_ERROR_BODY_CHARS),
            });
        }

        let data: serde_json::Value = serde_json::from_str(&body)?;
        let text = extract::extract_text(&data);

        debug!(
            "Inference call succeeded: max_tokens={max_tokens}, output_chars={}",
            text.chars().count()
        );

        Ok(text)
    }
}

/// Cuts `text` to at most `max` characters without splitting a code point.
fn truncate_chars(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((idx, _)) => text[..idx].to_string(),
        None => text.to_string(),
    }
}
