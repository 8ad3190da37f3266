//! v2 quote repositories
//!
//! Each repository is its own table named `quoter_<name>`. Names are
//! interpolated into SQL, so they are restricted to `[a-z0-9]+`.

use sqlx::SqlitePool;

use crate::{Error, Result};

/// Repository served by the bare `uadaf` resolver
pub const DEFAULT_REPO: &str = "v2";

/// Table name prefix shared by every v2 repository
pub const REPO_TABLE_PREFIX: &str = "quoter_";

/// Check a repository name: lowercase ASCII letters and digits only
pub fn validate_repo_name(name: &str) -> Result<()> {
    if name.is_empty()
        || !name
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit())
    {
        return Err(Error::InvalidInput(format!(
            "Invalid repository name '{}': only lowercase letters and digits are allowed",
            name
        )));
    }
    Ok(())
}

/// Table name backing a repository
pub fn quote_repo_table(name: &str) -> Result<String> {
    validate_repo_name(name)?;
    Ok(format!("{}{}", REPO_TABLE_PREFIX, name))
}

/// Whether the repository's table exists
pub async fn quote_repo_exists(pool: &SqlitePool, name: &str) -> Result<bool> {
    let table = quote_repo_table(name)?;
    let count: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = ?",
    )
    .bind(&table)
    .fetch_one(pool)
    .await?;
    Ok(count > 0)
}

/// Create the repository's table if it doesn't exist
pub async fn create_quote_repo_table(pool: &SqlitePool, name: &str) -> Result<()> {
    let table = quote_repo_table(name)?;
    let sql = format!(
        r#"
        CREATE TABLE IF NOT EXISTS {table} (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            adder TEXT NOT NULL,
            authors TEXT NOT NULL,
            date INTEGER NOT NULL DEFAULT (CAST(strftime('%s', 'now') AS INTEGER) * 1000),
            dtype TEXT NOT NULL DEFAULT 'text',
            content TEXT NOT NULL,
            edited_by TEXT,
            edited_at INTEGER,
            previous_content TEXT,
            attachments TEXT NOT NULL DEFAULT '',
            is_old INTEGER NOT NULL DEFAULT 0
        )
        "#
    );
    sqlx::query(&sql).execute(pool).await?;
    Ok(())
}
