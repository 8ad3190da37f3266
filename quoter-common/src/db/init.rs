//! Database initialization
//!
//! Creates the database file on first run and idempotently creates every
//! table the backend serves from.

use crate::db::repos::{create_quote_repo_table, DEFAULT_REPO};
use crate::Result;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::path::Path;
use std::time::Duration;
use tracing::info;

/// Initialize database connection and create tables if needed
pub async fn init_database(db_path: &Path) -> Result<SqlitePool> {
    let newly_created = !db_path.exists();

    // Create parent directory if it doesn't exist
    if let Some(parent) = db_path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    // Applied to every pooled connection
    let options = SqliteConnectOptions::new()
        .filename(db_path)
        .create_if_missing(true)
        .foreign_keys(true)
        .journal_mode(SqliteJournalMode::Wal)
        .busy_timeout(Duration::from_secs(5));

    let pool = SqlitePoolOptions::new()
        .max_connections(10)
        .connect_with(options)
        .await?;

    if newly_created {
        info!("Initialized new database: {}", db_path.display());
    } else {
        info!("Opened existing database: {}", db_path.display());
    }

    create_schema(&pool).await?;

    Ok(pool)
}

/// Create all tables (idempotent)
pub async fn create_schema(pool: &SqlitePool) -> Result<()> {
    create_quoter_table(pool).await?;
    create_users_table(pool).await?;
    create_attachments_table(pool).await?;
    create_quote_repo_table(pool, DEFAULT_REPO).await?;
    Ok(())
}

/// Legacy v1 quotes
async fn create_quoter_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS quoter (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            adder TEXT NOT NULL,
            author TEXT NOT NULL,
            quote TEXT NOT NULL,
            edited_by TEXT,
            edited_at INTEGER
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

/// Story pointers, one row per user
async fn create_users_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS users (
            user TEXT PRIMARY KEY,
            story INTEGER NOT NULL,
            rate INTEGER NOT NULL DEFAULT 0
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

async fn create_attachments_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS attachments (
            id TEXT PRIMARY KEY,
            type TEXT NOT NULL,
            data BLOB NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}
