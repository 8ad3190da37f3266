//! HTML quote view (`/bakend/webend/web/quote/:pos`)

use axum::{
    extract::{Path, State},
    response::Html,
    routing::get,
    Router,
};
use quoter_common::db::Quote;

use crate::db::quotes;
use crate::error::{ApiError, ApiResult};
use crate::AppState;

pub fn web_routes() -> Router<AppState> {
    Router::new().route("/quote/:pos", get(quote_page))
}

/// GET /quote/:pos
///
/// Unparseable positions are a 404, same as a missing quote.
pub async fn quote_page(
    State(state): State<AppState>,
    Path(pos): Path<String>,
) -> ApiResult<Html<String>> {
    let not_found = || ApiError::NotFound(format!("Quote {}", pos));
    let id: i64 = pos.parse().map_err(|_| not_found())?;
    let quote = quotes::get_by_id(&state.db, id)
        .await?
        .ok_or_else(not_found)?;

    Ok(Html(render_quote_page(id, &quote)))
}

pub fn render_quote_page(pos: i64, quote: &Quote) -> String {
    format!(
        r#"<!DOCTYPE html>
<html>
<head>
<title>Quote #{pos}</title>
<link rel="stylesheet" href="/static/styles.css" type="text/css">
</head>
<body>
<div class="quotes">
<div class="quote">
<div class="quote-header">
<div class="quote-id">{id}</div>
<div class="quote-author">{author}</div>
</div>
<div class="quote-text">{text}</div>
</div>
</div>
</body>
</html>
"#,
        pos = pos,
        id = quote.id,
        author = escape_html(&quote.author),
        text = escape_html(&quote.quote),
    )
}

pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
