//! Music library browser (`/music`)

use axum::{
    extract::{Path, State},
    routing::get,
    Json, Router,
};
use serde_json::Value;

use crate::error::{ApiError, ApiResult};
use crate::music::MusicContext;
use crate::AppState;

pub fn music_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(get_root))
        .route("/*path", get(search))
}

fn context(state: &AppState) -> ApiResult<&MusicContext> {
    state.music.as_deref().ok_or(ApiError::Teapot)
}

/// GET /music
pub async fn get_root(State(state): State<AppState>) -> ApiResult<Json<Value>> {
    Ok(Json(context(&state)?.to_json()))
}

/// GET /music/*path
pub async fn search(
    State(state): State<AppState>,
    Path(path): Path<String>,
) -> ApiResult<Json<Vec<Value>>> {
    let nodes = context(&state)?.search(&path);
    Ok(Json(nodes.into_iter().map(|n| n.to_json()).collect()))
}
