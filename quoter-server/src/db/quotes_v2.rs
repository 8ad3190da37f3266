//! v2 quote queries
//!
//! Every function takes the table name of a repository. Callers obtain it
//! from `quoter_common::db::quote_repo_table`, which only yields
//! `quoter_[a-z0-9]+`, so interpolating it into SQL is safe.

use quoter_common::db::{join_list, DisplayType, QuoteV2};
use quoter_common::Result;
use sqlx::{QueryBuilder, Sqlite, SqlitePool};
use tracing::debug;

use super::{like_pattern, MAX_IN_LIST};

const COLUMNS: &str = "id, adder, authors, date, dtype, content, edited_by, edited_at, \
                       previous_content, attachments, is_old";

/// Fields of a quote being added
#[derive(Debug, Clone)]
pub struct NewQuote {
    pub adder: String,
    /// `;`-separated, stored as given
    pub authors: String,
    pub dtype: DisplayType,
    pub content: String,
    pub attachments: Vec<String>,
    /// Creation time, Unix epoch milliseconds
    pub date: i64,
}

pub async fn total(pool: &SqlitePool, table: &str) -> Result<i64> {
    let count: i64 = sqlx::query_scalar(&format!("SELECT COUNT(*) FROM {}", table))
        .fetch_one(pool)
        .await?;
    Ok(count)
}

/// Every id in ascending order
pub async fn all_ids(pool: &SqlitePool, table: &str) -> Result<Vec<i64>> {
    let ids: Vec<i64> = sqlx::query_scalar(&format!("SELECT id FROM {} ORDER BY id", table))
        .fetch_all(pool)
        .await?;
    Ok(ids)
}

pub async fn exists(pool: &SqlitePool, table: &str, id: i64) -> Result<bool> {
    let found: Option<i64> = sqlx::query_scalar(&format!("SELECT id FROM {} WHERE id = ?", table))
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(found.is_some())
}

pub async fn get_by_id(pool: &SqlitePool, table: &str, id: i64) -> Result<Option<QuoteV2>> {
    let row = sqlx::query(&format!("SELECT {} FROM {} WHERE id = ?", COLUMNS, table))
        .bind(id)
        .fetch_optional(pool)
        .await?;

    Ok(row.as_ref().map(QuoteV2::from_row).transpose()?)
}

/// Quotes whose id is in `ids`, ascending by id; unknown ids are skipped
pub async fn by_ids(pool: &SqlitePool, table: &str, ids: &[i64]) -> Result<Vec<QuoteV2>> {
    let mut quotes = Vec::with_capacity(ids.len());

    for chunk in ids.chunks(MAX_IN_LIST) {
        let mut builder: QueryBuilder<Sqlite> =
            QueryBuilder::new(format!("SELECT {} FROM {} WHERE id IN (", COLUMNS, table));
        let mut separated = builder.separated(", ");
        for id in chunk {
            separated.push_bind(*id);
        }
        separated.push_unseparated(")");

        let rows = builder.build().fetch_all(pool).await?;
        for row in &rows {
            quotes.push(QuoteV2::from_row(row)?);
        }
    }

    quotes.sort_by_key(|q| q.id);
    Ok(quotes)
}

/// Quotes with `from <= id <= to`
pub async fn range(pool: &SqlitePool, table: &str, from: i64, to: i64) -> Result<Vec<QuoteV2>> {
    let rows = sqlx::query(&format!(
        "SELECT {} FROM {} WHERE id >= ? AND id <= ? ORDER BY id",
        COLUMNS, table
    ))
    .bind(from)
    .bind(to)
    .fetch_all(pool)
    .await?;

    Ok(rows.iter().map(QuoteV2::from_row).collect::<std::result::Result<_, sqlx::Error>>()?)
}

pub async fn all(pool: &SqlitePool, table: &str) -> Result<Vec<QuoteV2>> {
    let rows = sqlx::query(&format!("SELECT {} FROM {} ORDER BY id", COLUMNS, table))
        .fetch_all(pool)
        .await?;

    Ok(rows.iter().map(QuoteV2::from_row).collect::<std::result::Result<_, sqlx::Error>>()?)
}

/// Insert a quote, returning its id
pub async fn add(pool: &SqlitePool, table: &str, quote: &NewQuote) -> Result<i64> {
    let result = sqlx::query(&format!(
        "INSERT INTO {} (adder, authors, date, dtype, content, attachments) VALUES (?, ?, ?, ?, ?, ?)",
        table
    ))
    .bind(&quote.adder)
    .bind(&quote.authors)
    .bind(quote.date)
    .bind(quote.dtype.as_str())
    .bind(&quote.content)
    .bind(join_list(&quote.attachments))
    .execute(pool)
    .await?;

    Ok(result.last_insert_rowid())
}

/// Append `attachment` to a quote's list unless it is already there
///
/// Check and append run as one statement. Returns `false` when no row
/// changed: either the quote doesn't exist or the id is already listed.
pub async fn append_attachment(
    pool: &SqlitePool,
    table: &str,
    id: i64,
    attachment: &str,
) -> Result<bool> {
    let result = sqlx::query(&format!(
        "UPDATE {} SET attachments = CASE WHEN attachments = '' THEN ?1 \
         ELSE attachments || ';' || ?1 END \
         WHERE id = ?2 AND instr(';' || attachments || ';', ';' || ?1 || ';') = 0",
        table
    ))
    .bind(attachment)
    .bind(id)
    .execute(pool)
    .await?;

    Ok(result.rows_affected() != 0)
}

/// Replace a quote's content, keeping the old text in `previous_content`
///
/// Returns `false` if the quote doesn't exist.
pub async fn edit(
    pool: &SqlitePool,
    table: &str,
    id: i64,
    edited_by: &str,
    edited_at: i64,
    new_content: &str,
) -> Result<bool> {
    let result = sqlx::query(&format!(
        "UPDATE {} SET previous_content = content, content = ?, edited_by = ?, edited_at = ? \
         WHERE id = ?",
        table
    ))
    .bind(new_content)
    .bind(edited_by)
    .bind(edited_at)
    .bind(id)
    .execute(pool)
    .await?;

    Ok(result.rows_affected() != 0)
}

/// Renumber ids to `1..=n` keeping their order and reset the sequence
///
/// Rows are moved in ascending order, so a row's new id is never taken by
/// a row still waiting to move. Returns the number of rows renumbered.
pub async fn fix_ids(pool: &SqlitePool, table: &str) -> Result<usize> {
    let mut tx = pool.begin().await?;

    // Write before reading so the transaction takes the write lock up front
    sqlx::query(&format!(
        "UPDATE sqlite_sequence SET seq = (SELECT COUNT(*) FROM {}) WHERE name = ?",
        table
    ))
    .bind(table)
    .execute(&mut *tx)
    .await?;

    let ids: Vec<i64> = sqlx::query_scalar(&format!("SELECT id FROM {} ORDER BY id", table))
        .fetch_all(&mut *tx)
        .await?;

    let mut moved = 0;
    for (index, id) in ids.iter().enumerate() {
        let new_id = index as i64 + 1;
        if new_id != *id {
            sqlx::query(&format!("UPDATE {} SET id = ? WHERE id = ?", table))
                .bind(new_id)
                .bind(*id)
                .execute(&mut *tx)
                .await?;
            moved += 1;
        }
    }

    tx.commit().await?;

    debug!("Renumbered {} of {} rows in {}", moved, ids.len(), table);
    Ok(moved)
}

/// Substring search; filters combine with AND
///
/// Every author in `authors` must appear in the stored author list.
pub async fn search(
    pool: &SqlitePool,
    table: &str,
    adder: Option<&str>,
    authors: &[String],
    content: Option<&str>,
) -> Result<Vec<QuoteV2>> {
    let mut builder: QueryBuilder<Sqlite> =
        QueryBuilder::new(format!("SELECT {} FROM {} WHERE 1 = 1", COLUMNS, table));

    if let Some(adder) = adder {
        builder.push(" AND adder LIKE ");
        builder.push_bind(like_pattern(adder));
        builder.push(" ESCAPE '\\'");
    }

    for author in authors {
        builder.push(" AND authors LIKE ");
        builder.push_bind(like_pattern(author));
        builder.push(" ESCAPE '\\'");
    }

    if let Some(content) = content {
        builder.push(" AND content LIKE ");
        builder.push_bind(like_pattern(content));
        builder.push(" ESCAPE '\\'");
    }

    builder.push(" ORDER BY id");

    let rows = builder.build().fetch_all(pool).await?;
    Ok(rows.iter().map(QuoteV2::from_row).collect::<std::result::Result<_, sqlx::Error>>()?)
}
