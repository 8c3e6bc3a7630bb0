//! Shared-secret header authentication

use super::{ApiError, AppState, API_KEY_HEADER};
use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};

/// Middleware: require the configured API key in the `x-api-key` header
pub async fn require_api_key(
    State(state): State<AppState>,
    req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let provided = req
        .headers()
        .get(API_KEY_HEADER)
        .and_then(|v| v.to_str().ok())
        .ok_or(ApiError::Unauthorized)?;

    if !constant_time_eq(provided.as_bytes(), state.api_key.as_bytes()) {
        log::warn!("Rejected request to {} with invalid API key", req.uri().path());
        return Err(ApiError::Unauthorized);
    }

    Ok(next.run(req).await)
}

/// Compare two secrets without short-circuiting on the first differing
/// byte. Only the length leaks.
pub fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }

    let mut diff = 0u8;
    for (x, y) in a.iter().zip(b) {
        diff |= x ^ y;
    }
    diff == 0
}
