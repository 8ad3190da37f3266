//! Attachments API (`/v2/attachments`)
//!
//! Raw binary blobs keyed by an HMAC of their content. Every route
//! requires the access key header.

use axum::{
    body::Bytes,
    extract::{DefaultBodyLimit, Path, State},
    http::{header, HeaderMap, HeaderValue, StatusCode},
    middleware,
    response::{IntoResponse, Response},
    routing::{get, put, MethodRouter},
    Router,
};
use quoter_common::api::attachment_id;
use quoter_common::db::AttachmentBlob;
use quoter_common::time::now_millis;
use tracing::info;

use super::auth::access_key_middleware;
use crate::db::attachments;
use crate::error::{ApiError, ApiResult};
use crate::AppState;

pub const ATTACHMENT_ID_HEADER: &str = "A-ID";
pub const ATTACHMENT_TYPE_HEADER: &str = "A-Content-Type";

/// Upload size cap
pub const MAX_ATTACHMENT_BYTES: usize = 32 * 1024 * 1024;

pub fn attachment_routes(state: AppState) -> Router<AppState> {
    Router::new().route("/", upload_route(state.clone())).route(
        "/:id",
        get(download)
            .delete(remove)
            .layer(middleware::from_fn_with_state(state, access_key_middleware)),
    )
}

/// Upload endpoint, also mounted at the trailing-slash path
pub fn upload_route(state: AppState) -> MethodRouter<AppState> {
    put(upload)
        .layer(DefaultBodyLimit::max(MAX_ATTACHMENT_BYTES))
        .layer(middleware::from_fn_with_state(state, access_key_middleware))
}

/// PUT /v2/attachments/
///
/// Stores the body under a fresh id and answers 202 with the id in `A-ID`.
pub async fn upload(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> ApiResult<Response> {
    let content_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| ApiError::BadRequest("Content-Type header required".to_string()))?
        .to_string();

    let id = attachment_id(&body, now_millis())?;
    let blob = AttachmentBlob {
        id: id.clone(),
        content_type,
        data: body.to_vec(),
    };
    attachments::put(&state.db, &blob).await?;
    info!(
        "Stored attachment {} ({} bytes, {})",
        id,
        blob.data.len(),
        blob.content_type
    );

    let id_header = HeaderValue::from_str(&id).map_err(|e| ApiError::Internal(e.to_string()))?;
    Ok((StatusCode::ACCEPTED, [(ATTACHMENT_ID_HEADER, id_header)]).into_response())
}

/// GET /v2/attachments/:id
pub async fn download(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Response> {
    let blob = attachments::get(&state.db, &id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Attachment {}", id)))?;

    // Stored types come from client headers and may not be valid header values
    let stored_type = HeaderValue::from_str(&blob.content_type)
        .unwrap_or_else(|_| HeaderValue::from_static("application/octet-stream"));

    Ok((
        [
            (
                header::CONTENT_TYPE.as_str(),
                HeaderValue::from_static("application/octet-stream"),
            ),
            (ATTACHMENT_TYPE_HEADER, stored_type),
        ],
        blob.data,
    )
        .into_response())
}

/// DELETE /v2/attachments/:id
pub async fn remove(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<()> {
    if !attachments::delete(&state.db, &id).await? {
        return Err(ApiError::NotFound(format!("Attachment {}", id)));
    }
    info!("Deleted attachment {}", id);
    Ok(())
}
