//! JD Generation: orchestrates one generation request end to end.
//!
//! Flow: validate → persist (pending) → build prompt → inference call →
//!       persist (complete | failed) → bump usage counter → respond.
//!
//! A record moves out of `pending` exactly once. Retries by the caller create
//! a fresh record.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{info, warn};
use uuid::Uuid;

use crate::errors::AppError;
use crate::generation::prompts::build_prompt;
use crate::llm_client::Inference;
use crate::models::generation::NewGeneration;
use crate::storage::GenerationStore;

pub const DEFAULT_WORD_COUNT: u32 = 300;
pub const MIN_WORD_COUNT: u32 = 50;
pub const DEFAULT_TONE: &str = "Professional";
pub const DEFAULT_LANGUAGE: &str = "English";

const MAX_TONE_CHARS: usize = 64;
const MAX_TITLE_CHARS: usize = 256;
const MAX_LANGUAGE_CHARS: usize = 64;

/// Hard ceiling on requested completion tokens.
pub const MAX_COMPLETION_TOKENS: u32 = 4096;
/// Sampling temperature used for every generation.
pub const GENERATION_TEMPERATURE: f32 = 0.2;

/// User-facing summary attached to every generation failure.
pub const GENERATION_FAILED_DETAIL: &str = "Failed to generate JD";

// ────────────────────────────────────────────────────────────────────────────
// Data models
// ────────────────────────────────────────────────────────────────────────────

/// Request body for `POST /jdgen/`. Everything is optional at the serde layer
/// so that missing or out-of-range fields surface as validation errors.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct GenerateJdRequest {
    pub payload: Option<Value>,
    pub word_count: Option<i64>,
    pub tone: Option<String>,
    pub title: Option<String>,
    pub language: Option<String>,
}

/// A request that passed validation, with defaults applied.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedJdRequest {
    pub payload: Value,
    pub word_count: u32,
    pub tone: String,
    pub title: String,
    pub language: String,
}

/// Successful response body for `POST /jdgen/`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerateJdResponse {
    pub jd_text: String,
    pub word_count: u32,
    pub generated_at: DateTime<Utc>,
    pub source: String,
    pub request_id: Uuid,
}

impl GenerateJdRequest {
    /// Checks the request and fills in defaults. Has no side effects.
    pub fn validate(self) -> Result<ValidatedJdRequest, AppError> {
        let payload = match self.payload {
            Some(Value::Null) | None => {
                return Err(AppError::Validation("payload is required".to_string()))
            }
            Some(payload) => payload,
        };

        let word_count = match self.word_count {
            None => DEFAULT_WORD_COUNT,
            Some(n) if n < i64::from(MIN_WORD_COUNT) => {
                return Err(AppError::Validation(format!(
                    "word_count must be at least {MIN_WORD_COUNT}, got {n}"
                )))
            }
            Some(n) => u32::try_from(n)
                .ok()
                .filter(|n| i32::try_from(*n).is_ok())
                .ok_or_else(|| {
                    AppError::Validation(format!("word_count is too large, got {n}"))
                })?,
        };

        let tone = non_blank("tone", self.tone, DEFAULT_TONE, MAX_TONE_CHARS)?;
        let language = non_blank("language", self.language, DEFAULT_LANGUAGE, MAX_LANGUAGE_CHARS)?;

        let title = self.title.unwrap_or_default().trim().to_string();
        if title.chars().count() > MAX_TITLE_CHARS {
            return Err(AppError::Validation(format!(
                "title must be at most {MAX_TITLE_CHARS} characters"
            )));
        }

        Ok(ValidatedJdRequest {
            payload,
            word_count,
            tone,
            title,
            language,
        })
    }
}

/// Defaulted, trimmed, non-blank, length-limited string field.
fn non_blank(
    field: &str,
    value: Option<String>,
    default: &str,
    max_chars: usize,
) -> Result<String, AppError> {
    let value = match value {
        None => return Ok(default.to_string()),
        Some(v) => v.trim().to_string(),
    };
    if value.is_empty() {
        return Err(AppError::Validation(format!("{field} may not be blank")));
    }
    if value.chars().count() > max_chars {
        return Err(AppError::Validation(format!(
            "{field} must be at most {max_chars} characters"
        )));
    }
    Ok(value)
}

/// Completion budget for a target word count: ~1.5 tokens per word plus
/// headroom, capped at [`MAX_COMPLETION_TOKENS`].
pub fn max_tokens_for(word_count: u32) -> u32 {
    let estimate = u64::from(word_count) * 3 / 2 + 100;
    estimate.min(u64::from(MAX_COMPLETION_TOKENS)) as u32
}

// ────────────────────────────────────────────────────────────────────────────
// Generation pipeline
// ────────────────────────────────────────────────────────────────────────────

/// Runs one generation request and records its outcome.
///
/// Steps:
/// 1. validate (no side effects on failure)
/// 2. INSERT record (status='pending')
/// 3. build_prompt()
/// 4. max_tokens_for()
/// 5. inference.complete() at temperature 0.2
/// 6. success: record → 'complete', usage counter +1
/// 7. failure: record → 'failed' with the error text; counter untouched
pub async fn generate_jd(
    store: &dyn GenerationStore,
    inference: &dyn Inference,
    source_tag: &str,
    request: GenerateJdRequest,
) -> Result<GenerateJdResponse, AppError> {
    // Step 1: Validate
    let request = request.validate()?;

    // Step 2: Persist pending record
    let record = store
        .create_pending(NewGeneration {
            input: request.payload.clone(),
            word_count: request.word_count,
            tone: request.tone.clone(),
            title: request.title.clone(),
            language: request.language.clone(),
        })
        .await?;
    info!(
        "Generation {} started: word_count={}, tone={}, language={}",
        record.id, request.word_count, request.tone, request.language
    );

    // Steps 3-5: Prompt + inference
    let prompt = build_prompt(
        &request.payload,
        request.word_count,
        &request.tone,
        &request.title,
        &request.language,
    );
    let max_tokens = max_tokens_for(request.word_count);

    let generated_text = match inference
        .complete(&prompt, max_tokens, GENERATION_TEMPERATURE, None)
        .await
    {
        Ok(text) => text,
        Err(e) => {
            let error = e.to_string();
            warn!("Generation {} failed: {error}", record.id);
            // Step 7: Record the failure before reporting it
            store.mark_failed(record.id, &error).await?;
            return Err(AppError::Generation {
                detail: GENERATION_FAILED_DETAIL.to_string(),
                error,
            });
        }
    };

    // Step 6: Record success and count it
    store.mark_complete(record.id, &generated_text).await?;
    let usage = store.increment_usage().await?;

    info!(
        "Generation {} complete: {} chars, total successful generations={}",
        record.id,
        generated_text.chars().count(),
        usage.request_count
    );

    Ok(GenerateJdResponse {
        jd_text: generated_text,
        word_count: request.word_count,
        generated_at: Utc::now(),
        source: source_tag.to_string(),
        request_id: record.id,
    })
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
