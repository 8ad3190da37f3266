//! v1 quote API (`/quote`)
//!
//! Reads the legacy `quoter` table. Writes take an urlencoded form with
//! the access key in the `key` field.

use axum::{
    extract::{rejection::FormRejection, Path, Query, State},
    routing::{get, post},
    Form, Json, Router,
};
use quoter_common::db::Quote;
use quoter_common::time::now_millis;
use serde::Deserialize;
use tracing::info;

use super::auth::check_form_key;
use super::{parse_int, rejected, required};
use crate::db::quotes::{self, QuoteSearch};
use crate::error::{ApiError, ApiResult};
use crate::resolvers::sample_without_replacement;
use crate::AppState;

pub fn quote_routes() -> Router<AppState> {
    Router::new()
        .route("/pos/:pos", get(get_by_pos))
        .route("/random", get(random_one))
        .route("/random/:count", get(random_count))
        .route("/range/:from/:to", get(get_range))
        .route("/total", get(get_total))
        .route("/all", get(get_all))
        .route("/search", get(search))
        .route("/add", post(add))
        .route("/edit", post(edit))
}

/// GET /quote/pos/:pos
pub async fn get_by_pos(
    State(state): State<AppState>,
    Path(pos): Path<String>,
) -> ApiResult<Json<Quote>> {
    let pos = parse_int(&pos, "pos")?;
    let quote = quotes::get_by_id(&state.db, pos)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Quote {}", pos)))?;
    Ok(Json(quote))
}

/// GET /quote/random
pub async fn random_one(State(state): State<AppState>) -> ApiResult<Json<Vec<Quote>>> {
    random_quotes(&state, 1).await.map(Json)
}

/// GET /quote/random/:count
///
/// Negative counts are taken by absolute value; anything unparseable means 1.
pub async fn random_count(
    State(state): State<AppState>,
    Path(count): Path<String>,
) -> ApiResult<Json<Vec<Quote>>> {
    let count = count.trim().parse::<i64>().unwrap_or(1).unsigned_abs();
    let count = usize::try_from(count).unwrap_or(usize::MAX);
    random_quotes(&state, count).await.map(Json)
}

async fn random_quotes(state: &AppState, count: usize) -> ApiResult<Vec<Quote>> {
    let ids = quotes::all_ids(&state.db).await?;
    let sample = sample_without_replacement(&ids, count);
    Ok(quotes::by_ids(&state.db, &sample).await?)
}

/// GET /quote/range/:from/:to
///
/// Unparseable bounds are a 404 here, not a 400.
pub async fn get_range(
    State(state): State<AppState>,
    Path((from, to)): Path<(String, String)>,
) -> ApiResult<Json<Vec<Quote>>> {
    let (Ok(from), Ok(to)) = (from.parse::<i64>(), to.parse::<i64>()) else {
        return Err(ApiError::NotFound("Range bounds must be integers".to_string()));
    };
    Ok(Json(quotes::range(&state.db, from, to).await?))
}

/// GET /quote/total
pub async fn get_total(State(state): State<AppState>) -> ApiResult<Json<i64>> {
    Ok(Json(quotes::total(&state.db).await?))
}

/// GET /quote/all
pub async fn get_all(State(state): State<AppState>) -> ApiResult<Json<Vec<Quote>>> {
    Ok(Json(quotes::all(&state.db).await?))
}

#[derive(Debug, Default, Deserialize)]
pub struct SearchParams {
    pub ids: Option<String>,
    pub adders: Option<String>,
    pub authors: Option<String>,
    pub editors: Option<String>,
    pub edited: Option<String>,
    pub text: Option<String>,
}

impl SearchParams {
    fn into_filters(self) -> QuoteSearch {
        fn comma_list(raw: Option<String>) -> Vec<String> {
            raw.map(|s| s.split(',').map(str::to_string).collect())
                .unwrap_or_default()
        }

        QuoteSearch {
            ids: self
                .ids
                .map(|s| s.split(',').filter_map(|id| id.trim().parse().ok()).collect())
                .unwrap_or_default(),
            adders: comma_list(self.adders),
            authors: comma_list(self.authors),
            editors: comma_list(self.editors),
            // Anything but "true" reads as false
            edited: self.edited.map(|e| e.eq_ignore_ascii_case("true")),
            text: self.text,
        }
    }
}

/// GET /quote/search
pub async fn search(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> ApiResult<Json<Vec<Quote>>> {
    let filters = params.into_filters();
    Ok(Json(quotes::search(&state.db, &filters).await?))
}

#[derive(Debug, Deserialize)]
pub struct AddForm {
    pub key: Option<String>,
    pub adder: Option<String>,
    pub author: Option<String>,
    pub quote: Option<String>,
}

/// POST /quote/add
pub async fn add(
    State(state): State<AppState>,
    form: Result<Form<AddForm>, FormRejection>,
) -> ApiResult<()> {
    let Form(form) = form.map_err(rejected)?;
    let key = required(form.key, "key")?;
    let adder = required(form.adder, "adder")?;
    let author = required(form.author, "author")?;
    let text = required(form.quote, "quote")?;

    check_form_key(&state, Some(&key))?;

    let id = quotes::add(&state.db, &adder, &author, &text).await?;
    info!("Added v1 quote {} (adder: {})", id, adder);
    Ok(())
}

#[derive(Debug, Deserialize)]
pub struct EditForm {
    pub key: Option<String>,
    pub id: Option<String>,
    pub edited_by: Option<String>,
    pub new_text: Option<String>,
}

/// POST /quote/edit
pub async fn edit(
    State(state): State<AppState>,
    form: Result<Form<EditForm>, FormRejection>,
) -> ApiResult<()> {
    let Form(form) = form.map_err(rejected)?;
    let key = required(form.key, "key")?;
    let id = parse_int(&required(form.id, "id")?, "id")?;
    let edited_by = required(form.edited_by, "edited_by")?;
    let new_text = required(form.new_text, "new_text")?;

    check_form_key(&state, Some(&key))?;

    if !quotes::edit(&state.db, id, &edited_by, now_millis(), &new_text).await? {
        return Err(ApiError::NotFound(format!("Quote {}", id)));
    }
    info!("Quote {} edited by {}", id, edited_by);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_search_params_parsing() {
        let params = SearchParams {
            ids: Some("1,x,3, 4".to_string()),
            adders: Some("alice,bob".to_string()),
            edited: Some("TRUE".to_string()),
            ..Default::default()
        };
        let filters = params.into_filters();
        assert_eq!(filters.ids, vec![1, 3, 4]);
        assert_eq!(filters.adders, vec!["alice", "bob"]);
        assert!(filters.authors.is_empty());
        assert_eq!(filters.edited, Some(true));
        assert!(filters.text.is_none());
    }

    #[test]
    fn test_edited_false_for_other_values() {
        let params = SearchParams {
            edited: Some("nope".to_string()),
            ..Default::default()
        };
        assert_eq!(params.into_filters().edited, Some(false));
    }
}
