use axum::{extract::State, Json};

use crate::errors::AppError;
use crate::models::usage::UsageRecord;
use crate::state::AppState;

/// GET /usage/
///
/// Total number of successful generations. 404 until the first one lands.
pub async fn handle_get_usage(
    State(state): State<AppState>,
) -> Result<Json<UsageRecord>, AppError> {
    let usage = state
        .store
        .usage()
        .await?
        .ok_or_else(|| AppError::NotFound("Usage record not found".to_string()))?;

    Ok(Json(usage))
}
