//! HTTP API handlers for quoter-server

pub mod attachments;
pub mod auth;
pub mod health;
pub mod music;
pub mod params;
pub mod quotes;
pub mod quotes_v2;
pub mod stories;
pub mod web;

pub use attachments::attachment_routes;
pub use auth::access_key_middleware;
pub use health::health_routes;
pub use music::music_routes;
pub use quotes::quote_routes;
pub use quotes_v2::quote_v2_routes;
pub use stories::story_routes;
pub use web::web_routes;

use crate::error::{ApiError, ApiResult};

/// Parse an integer parameter, 400 on failure
pub(crate) fn parse_int(raw: &str, name: &str) -> ApiResult<i64> {
    raw.trim()
        .parse()
        .map_err(|_| ApiError::BadRequest(format!("{} must be an integer, got '{}'", name, raw)))
}

pub(crate) fn required(value: Option<String>, name: &str) -> ApiResult<String> {
    value.ok_or_else(|| ApiError::BadRequest(format!("Missing field: {}", name)))
}

/// Map an extractor rejection to a 400
pub(crate) fn rejected<E: std::fmt::Display>(err: E) -> ApiError {
    ApiError::BadRequest(err.to_string())
}
