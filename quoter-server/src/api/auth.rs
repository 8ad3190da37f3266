//! Access-key checks
//!
//! v2 routes carry the key in a header and are guarded by
//! [`access_key_middleware`]. v1 routes carry it as a form field next to
//! the rest of the payload and call [`check_form_key`] from the handler.

use axum::{
    extract::{Request, State},
    http::HeaderMap,
    middleware::Next,
    response::Response,
};
use quoter_common::api::verify_access_key;
use tracing::warn;

use crate::error::{ApiError, ApiResult};
use crate::AppState;

pub const ACCESS_KEY_HEADER: &str = "X-Access-Key";
pub const ACCESS_KEY_HEADER_SHORT: &str = "Access-Key";

/// Key from `X-Access-Key`, falling back to `Access-Key`
pub fn header_key(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(ACCESS_KEY_HEADER)
        .or_else(|| headers.get(ACCESS_KEY_HEADER_SHORT))
        .and_then(|v| v.to_str().ok())
}

/// Missing key → 401, wrong key → 403
pub fn check_header_key(state: &AppState, headers: &HeaderMap) -> ApiResult<()> {
    let key = header_key(headers)
        .ok_or_else(|| ApiError::Unauthorized("Access key required".to_string()))?;

    if !verify_access_key(key, state.access_key_sha256.as_deref()) {
        warn!("Rejected access key");
        return Err(ApiError::Forbidden("Invalid access key".to_string()));
    }
    Ok(())
}

/// Missing key → 400, wrong key → 401
pub fn check_form_key(state: &AppState, key: Option<&str>) -> ApiResult<()> {
    let key = key.ok_or_else(|| ApiError::BadRequest("Missing form field: key".to_string()))?;

    if !verify_access_key(key, state.access_key_sha256.as_deref()) {
        warn!("Rejected access key");
        return Err(ApiError::Unauthorized("Invalid access key".to_string()));
    }
    Ok(())
}

pub async fn access_key_middleware(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    check_header_key(&state, request.headers())?;
    Ok(next.run(request).await)
}
