//! Legacy (v1) quote queries over the `quoter` table

use quoter_common::db::Quote;
use quoter_common::Result;
use sqlx::{QueryBuilder, Sqlite, SqlitePool};

use super::{like_pattern, MAX_IN_LIST};

const SELECT_QUOTE: &str =
    "SELECT id, adder, author, quote, edited_by, edited_at FROM quoter";

/// Filters for `GET /quote/search`; empty lists and `None` are ignored
#[derive(Debug, Clone, Default)]
pub struct QuoteSearch {
    pub ids: Vec<i64>,
    pub adders: Vec<String>,
    pub authors: Vec<String>,
    pub editors: Vec<String>,
    pub edited: Option<bool>,
    pub text: Option<String>,
}

impl QuoteSearch {
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
            && self.adders.is_empty()
            && self.authors.is_empty()
            && self.editors.is_empty()
            && self.edited.is_none()
            && self.text.as_deref().map_or(true, str::is_empty)
    }
}

pub async fn get_by_id(pool: &SqlitePool, id: i64) -> Result<Option<Quote>> {
    let row = sqlx::query(&format!("{} WHERE id = ?", SELECT_QUOTE))
        .bind(id)
        .fetch_optional(pool)
        .await?;

    Ok(row.as_ref().map(Quote::from_row).transpose()?)
}

pub async fn total(pool: &SqlitePool) -> Result<i64> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM quoter")
        .fetch_one(pool)
        .await?;
    Ok(count)
}

/// Every id in ascending order
pub async fn all_ids(pool: &SqlitePool) -> Result<Vec<i64>> {
    let ids: Vec<i64> = sqlx::query_scalar("SELECT id FROM quoter ORDER BY id")
        .fetch_all(pool)
        .await?;
    Ok(ids)
}

/// Quotes whose id is in `ids`, ascending by id; unknown ids are skipped
pub async fn by_ids(pool: &SqlitePool, ids: &[i64]) -> Result<Vec<Quote>> {
    let mut quotes = Vec::with_capacity(ids.len());

    for chunk in ids.chunks(MAX_IN_LIST) {
        let mut builder: QueryBuilder<Sqlite> = QueryBuilder::new(SELECT_QUOTE);
        builder.push(" WHERE id IN (");
        let mut separated = builder.separated(", ");
        for id in chunk {
            separated.push_bind(*id);
        }
        separated.push_unseparated(")");

        let rows = builder.build().fetch_all(pool).await?;
        for row in &rows {
            quotes.push(Quote::from_row(row)?);
        }
    }

    quotes.sort_by_key(|q| q.id);
    Ok(quotes)
}

/// Quotes with `from <= id <= to`
pub async fn range(pool: &SqlitePool, from: i64, to: i64) -> Result<Vec<Quote>> {
    let rows = sqlx::query(&format!(
        "{} WHERE id >= ? AND id <= ? ORDER BY id",
        SELECT_QUOTE
    ))
    .bind(from)
    .bind(to)
    .fetch_all(pool)
    .await?;

    Ok(rows.iter().map(Quote::from_row).collect::<std::result::Result<_, sqlx::Error>>()?)
}

pub async fn all(pool: &SqlitePool) -> Result<Vec<Quote>> {
    let rows = sqlx::query(&format!("{} ORDER BY id", SELECT_QUOTE))
        .fetch_all(pool)
        .await?;

    Ok(rows.iter().map(Quote::from_row).collect::<std::result::Result<_, sqlx::Error>>()?)
}

/// Insert a quote, returning its id
pub async fn add(pool: &SqlitePool, adder: &str, author: &str, quote: &str) -> Result<i64> {
    let result = sqlx::query("INSERT INTO quoter (adder, author, quote) VALUES (?, ?, ?)")
        .bind(adder)
        .bind(author)
        .bind(quote)
        .execute(pool)
        .await?;

    Ok(result.last_insert_rowid())
}

/// Replace a quote's text and record the editor; `false` if no such quote
pub async fn edit(
    pool: &SqlitePool,
    id: i64,
    edited_by: &str,
    edited_at: i64,
    new_text: &str,
) -> Result<bool> {
    let result = sqlx::query(
        "UPDATE quoter SET edited_by = ?, quote = ?, edited_at = ? WHERE id = ?",
    )
    .bind(edited_by)
    .bind(new_text)
    .bind(edited_at)
    .bind(id)
    .execute(pool)
    .await?;

    Ok(result.rows_affected() != 0)
}

/// All quotes matching every supplied filter
pub async fn search(pool: &SqlitePool, filters: &QuoteSearch) -> Result<Vec<Quote>> {
    if filters.is_empty() {
        return Ok(Vec::new());
    }

    let mut builder: QueryBuilder<Sqlite> = QueryBuilder::new(SELECT_QUOTE);
    builder.push(" WHERE 1 = 1");

    if !filters.ids.is_empty() {
        builder.push(" AND id IN (");
        let mut separated = builder.separated(", ");
        for id in &filters.ids {
            separated.push_bind(*id);
        }
        separated.push_unseparated(")");
    }
    push_in_list(&mut builder, "author", &filters.authors);
    push_in_list(&mut builder, "adder", &filters.adders);
    push_in_list(&mut builder, "edited_by", &filters.editors);

    if let Some(text) = filters.text.as_deref().filter(|t| !t.is_empty()) {
        builder.push(" AND quote LIKE ");
        builder.push_bind(like_pattern(text));
        builder.push(" ESCAPE '\\'");
    }

    match filters.edited {
        Some(true) => {
            builder.push(" AND edited_by IS NOT NULL");
        }
        Some(false) => {
            builder.push(" AND edited_by IS NULL");
        }
        None => {}
    }

    builder.push(" ORDER BY id");

    let rows = builder.build().fetch_all(pool).await?;
    Ok(rows.iter().map(Quote::from_row).collect::<std::result::Result<_, sqlx::Error>>()?)
}

fn push_in_list(builder: &mut QueryBuilder<'_, Sqlite>, column: &str, values: &[String]) {
    if values.is_empty() {
        return;
    }

    builder.push(format!(" AND {} IN (", column));
    let mut separated = builder.separated(", ");
    for value in values {
        separated.push_bind(value.clone());
    }
    separated.push_unseparated(")");
}
