//! v2 quote API (`/v2/quote`)
//!
//! Every route except `PUT repo` names a resolver with the `resolver`
//! parameter. Write routes sit behind the access-key middleware.

use axum::{
    extract::{Path, State},
    middleware,
    routing::{get, post, put, MethodRouter},
    Json, Router,
};
use quoter_common::db::{split_list, DisplayType, QuoteV2};
use quoter_common::time::now_millis;
use std::sync::Arc;
use tracing::info;

use super::attachments::attachment_routes;
use super::auth::access_key_middleware;
use super::params::Params;
use super::parse_int;
use crate::db::attachments;
use crate::db::quotes_v2::NewQuote;
use crate::error::{ApiError, ApiResult};
use crate::resolvers::{AttachmentResult, Resolver, SearchableResolver, WritableResolver};
use crate::AppState;

pub fn quote_v2_routes(state: AppState) -> Router<AppState> {
    let writes = Router::new()
        .route("/", put(add))
        .route("/attach", put(attach))
        .route("/edit", post(edit))
        .route("/fix_ids", post(fix_ids))
        .route("/repo", put(create_repo))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            access_key_middleware,
        ));

    let reads = Router::new()
        .route("/random", get(random_one))
        .route("/random/:count", get(random_count))
        .route("/all", get(get_all))
        .route("/total", get(get_total))
        .route("/search", get(search))
        .route("/:id", get(get_by_id))
        .route("/:from/:to", get(get_range));

    Router::new()
        .merge(writes)
        .merge(reads)
        .nest("/attachments", attachment_routes(state))
}

/// `PUT /v2/quote/` with the trailing slash
pub fn add_route(state: AppState) -> MethodRouter<AppState> {
    put(add).layer(middleware::from_fn_with_state(state, access_key_middleware))
}

async fn resolve(state: &AppState, params: &Params) -> ApiResult<Arc<dyn Resolver>> {
    let name = params.resolver()?;
    Ok(state.resolvers.resolve(&name).await?)
}

fn writable(resolver: &dyn Resolver) -> ApiResult<&dyn WritableResolver> {
    resolver
        .as_writable()
        .ok_or_else(|| ApiError::BadRequest(format!("Resolver {} is read-only", resolver.name())))
}

fn searchable(resolver: &dyn Resolver) -> ApiResult<&dyn SearchableResolver> {
    resolver.as_searchable().ok_or_else(|| {
        ApiError::BadRequest(format!("Resolver {} does not support search", resolver.name()))
    })
}

/// PUT /v2/quote
pub async fn add(State(state): State<AppState>, params: Params) -> ApiResult<()> {
    let resolver = resolve(&state, &params).await?;
    let target = writable(resolver.as_ref())?;

    let dtype = match params.text("dtype") {
        Some(dtype) => dtype.parse::<DisplayType>()?,
        None => DisplayType::Text,
    };
    let quote = NewQuote {
        adder: params.required_text("adder")?,
        authors: params.required_text("authors")?,
        dtype,
        content: params.required_text("content")?,
        attachments: params
            .text("attachments")
            .map(|a| split_list(&a))
            .unwrap_or_default(),
        date: now_millis(),
    };

    target.add(quote).await?;
    Ok(())
}

/// PUT /v2/quote/attach
pub async fn attach(State(state): State<AppState>, params: Params) -> ApiResult<()> {
    let resolver = resolve(&state, &params).await?;
    let target = writable(resolver.as_ref())?;
    let id = params.required_int("id")?;
    let attachment = params.required_text("attachment")?;

    if !target.exists(id).await? {
        return Err(ApiError::NotFound(format!("Quote {}", id)));
    }
    if !attachments::exists(&state.db, &attachment).await? {
        return Err(ApiError::Gone(format!("Attachment {}", attachment)));
    }

    match target.attach(id, &attachment).await? {
        AttachmentResult::Attached => {
            info!("Attached {} to quote {} in {}", attachment, id, resolver.name());
            Ok(())
        }
        AttachmentResult::AlreadyAttached => Err(ApiError::Conflict(format!(
            "Attachment {} already on quote {}",
            attachment, id
        ))),
        AttachmentResult::Error => Err(ApiError::NotFound(format!("Quote {}", id))),
    }
}

/// GET /v2/quote/:id
pub async fn get_by_id(
    State(state): State<AppState>,
    Path(id): Path<String>,
    params: Params,
) -> ApiResult<Json<QuoteV2>> {
    let id = parse_int(&id, "id")?;
    let resolver = resolve(&state, &params).await?;
    Ok(Json(resolver.by_id(id).await?))
}

/// GET /v2/quote/:from/:to
pub async fn get_range(
    State(state): State<AppState>,
    Path((from, to)): Path<(String, String)>,
    params: Params,
) -> ApiResult<Json<Vec<QuoteV2>>> {
    let from = parse_int(&from, "from")?;
    let to = parse_int(&to, "to")?;
    if from > to {
        return Err(ApiError::BadRequest(format!("Empty range {}..{}", from, to)));
    }
    let resolver = resolve(&state, &params).await?;
    Ok(Json(resolver.range(from, to).await?))
}

/// GET /v2/quote/random
pub async fn random_one(
    State(state): State<AppState>,
    params: Params,
) -> ApiResult<Json<Vec<QuoteV2>>> {
    let resolver = resolve(&state, &params).await?;
    Ok(Json(resolver.random(1).await?))
}

/// GET /v2/quote/random/:count
pub async fn random_count(
    State(state): State<AppState>,
    Path(count): Path<String>,
    params: Params,
) -> ApiResult<Json<Vec<QuoteV2>>> {
    let count = usize::try_from(parse_int(&count, "count")?)
        .map_err(|_| ApiError::BadRequest("count must not be negative".to_string()))?;
    let resolver = resolve(&state, &params).await?;
    Ok(Json(resolver.random(count).await?))
}

/// GET /v2/quote/all
pub async fn get_all(
    State(state): State<AppState>,
    params: Params,
) -> ApiResult<Json<Vec<QuoteV2>>> {
    let resolver = resolve(&state, &params).await?;
    Ok(Json(resolver.all().await?))
}

/// GET /v2/quote/total
pub async fn get_total(State(state): State<AppState>, params: Params) -> ApiResult<Json<i64>> {
    let resolver = resolve(&state, &params).await?;
    Ok(Json(resolver.total().await?))
}

/// GET /v2/quote/search
pub async fn search(
    State(state): State<AppState>,
    params: Params,
) -> ApiResult<Json<Vec<QuoteV2>>> {
    let resolver = resolve(&state, &params).await?;
    let target = searchable(resolver.as_ref())?;

    let adder = params.text("adder");
    let authors = params
        .text("authors")
        .map(|a| split_list(&a))
        .unwrap_or_default();
    let content = params.text("content");

    let quotes = target
        .search(adder.as_deref(), &authors, content.as_deref())
        .await?;
    Ok(Json(quotes))
}

/// POST /v2/quote/edit
pub async fn edit(State(state): State<AppState>, params: Params) -> ApiResult<()> {
    let resolver = resolve(&state, &params).await?;
    let target = writable(resolver.as_ref())?;
    let id = params.required_int("id")?;
    let edited_by = params.required_text("edited_by")?;
    let new_content = params.required_text("new_content")?;

    if !target.edit(id, &edited_by, now_millis(), &new_content).await? {
        return Err(ApiError::NotFound(format!("Quote {}", id)));
    }
    info!("Quote {} in {} edited by {}", id, resolver.name(), edited_by);
    Ok(())
}

/// POST /v2/quote/fix_ids
pub async fn fix_ids(State(state): State<AppState>, params: Params) -> ApiResult<()> {
    let resolver = resolve(&state, &params).await?;
    writable(resolver.as_ref())?.fix_ids().await?;
    Ok(())
}

/// PUT /v2/quote/repo
///
/// Creates `quoter_<name>` if it doesn't exist yet.
pub async fn create_repo(State(state): State<AppState>, params: Params) -> ApiResult<()> {
    let name = params.required_text("name")?;
    state
        .repos
        .get_or_create(&name, true)
        .await?
        .ok_or_else(|| ApiError::Internal(format!("Repository {} was not created", name)))?;
    Ok(())
}
