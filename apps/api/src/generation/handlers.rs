//! Axum route handlers for the JD Generation API.

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    Json,
};
use uuid::Uuid;

use crate::auth::Authenticated;
use crate::errors::AppError;
use crate::generation::generator::{generate_jd, GenerateJdRequest, GenerateJdResponse};
use crate::models::generation::GenerationRow;
use crate::state::AppState;

/// POST /jdgen/
///
/// Generates a job description from a free-form JSON `payload`.
/// Malformed bodies are reported as validation errors (400), not 422.
pub async fn handle_generate_jd(
    State(state): State<AppState>,
    _auth: Authenticated,
    body: Result<Json<GenerateJdRequest>, JsonRejection>,
) -> Result<Json<GenerateJdResponse>, AppError> {
    let Json(request) = body.map_err(|e| AppError::Validation(e.body_text()))?;

    let response = generate_jd(
        state.store.as_ref(),
        state.inference.as_ref(),
        &state.config.source_tag,
        request,
    )
    .await?;

    Ok(Json(response))
}

/// GET /jdgen/:id
///
/// Returns the stored generation record, whatever its status.
pub async fn handle_get_generation(
    State(state): State<AppState>,
    _auth: Authenticated,
    Path(id): Path<Uuid>,
) -> Result<Json<GenerationRow>, AppError> {
    let row = state
        .store
        .get_generation(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Generation request {id} not found")))?;

    Ok(Json(row))
}
