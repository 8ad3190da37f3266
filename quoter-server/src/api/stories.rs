//! Story pointers (`/ith`)

use axum::{
    extract::{rejection::FormRejection, Path, State},
    routing::{get, post},
    Form, Json, Router,
};
use quoter_common::db::StoryPointer;
use serde::Deserialize;

use super::{parse_int, rejected, required};
use crate::db::stories;
use crate::error::{ApiError, ApiResult};
use crate::AppState;

pub fn story_routes() -> Router<AppState> {
    Router::new()
        .route("/login/:username", get(login))
        .route("/set", post(set_story))
}

/// GET /ith/login/:username
pub async fn login(
    State(state): State<AppState>,
    Path(username): Path<String>,
) -> ApiResult<Json<StoryPointer>> {
    Ok(Json(stories::login(&state.db, &username).await?))
}

#[derive(Debug, Deserialize)]
pub struct SetStoryForm {
    pub username: Option<String>,
    #[serde(rename = "storyId")]
    pub story_id: Option<String>,
}

/// POST /ith/set
pub async fn set_story(
    State(state): State<AppState>,
    form: Result<Form<SetStoryForm>, FormRejection>,
) -> ApiResult<()> {
    let Form(form) = form.map_err(rejected)?;
    let username = required(form.username, "username")?;
    let story_id = parse_int(&required(form.story_id, "storyId")?, "storyId")?;

    if !stories::set_story(&state.db, &username, story_id).await? {
        return Err(ApiError::NotFound(format!("User {}", username)));
    }
    Ok(())
}
