//! Bearer-token gate for the generation routes.

use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
};

use crate::errors::AppError;
use crate::state::AppState;

/// Extractor that admits a request only when it carries the configured API token
/// as `Authorization: Bearer <token>` (or `Token <token>`).
///
/// With no token configured every request is admitted.
pub struct Authenticated;

#[async_trait]
impl FromRequestParts<AppState> for Authenticated {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let Some(expected) = state.config.api_token.as_deref() else {
            return Ok(Authenticated);
        };

        let presented = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .and_then(bearer_token);

        match presented {
            Some(token) if token == expected => Ok(Authenticated),
            _ => Err(AppError::Unauthorized),
        }
    }
}

/// Pulls the credential out of an `Authorization` header value.
fn bearer_token(header: &str) -> Option<&str> {
    let (scheme, token) = header.trim().split_once(' ')?;
    if scheme.eq_ignore_ascii_case("bearer") || scheme.eq_ignore_ascii_case("token") {
        Some(token.trim()).filter(|t| !t.is_empty())
    } else {
        None
    }
}
