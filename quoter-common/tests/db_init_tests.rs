//! Tests for database initialization and v2 repository tables

use quoter_common::db::{create_quote_repo_table, init_database, quote_repo_exists};
use quoter_common::Error;
use tempfile::TempDir;

#[tokio::test]
async fn test_database_creation_when_missing() {
    let dir = TempDir::new().unwrap();
    let db_path = dir.path().join("nested").join("quoter.db");

    let result = init_database(&db_path).await;

    assert!(result.is_ok(), "Database initialization failed: {:?}", result.err());
    assert!(db_path.exists(), "Database file was not created");
}

#[tokio::test]
async fn test_database_opens_existing() {
    let dir = TempDir::new().unwrap();
    let db_path = dir.path().join("quoter.db");

    let pool1 = init_database(&db_path).await.unwrap();
    sqlx::query("INSERT INTO quoter (adder, author, quote) VALUES ('a', 'b', 'c')")
        .execute(&pool1)
        .await
        .unwrap();
    pool1.close().await;

    // Second open must keep existing rows
    let pool2 = init_database(&db_path).await.unwrap();
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM quoter")
        .fetch_one(&pool2)
        .await
        .unwrap();
    assert_eq!(count, 1);
}

#[tokio::test]
async fn test_all_tables_created() {
    let dir = TempDir::new().unwrap();
    let pool = init_database(&dir.path().join("quoter.db")).await.unwrap();

    let tables: Vec<String> = sqlx::query_scalar(
        "SELECT name FROM sqlite_master WHERE type = 'table' AND name NOT LIKE 'sqlite_%' ORDER BY name",
    )
    .fetch_all(&pool)
    .await
    .unwrap();

    for expected in ["attachments", "quoter", "quoter_v2", "users"] {
        assert!(
            tables.iter().any(|t| t == expected),
            "Missing table {}; have {:?}",
            expected,
            tables
        );
    }
}

#[tokio::test]
async fn test_repo_tables() {
    let dir = TempDir::new().unwrap();
    let pool = init_database(&dir.path().join("quoter.db")).await.unwrap();

    assert!(quote_repo_exists(&pool, "v2").await.unwrap());
    assert!(!quote_repo_exists(&pool, "archive").await.unwrap());

    create_quote_repo_table(&pool, "archive").await.unwrap();
    assert!(quote_repo_exists(&pool, "archive").await.unwrap());

    // Idempotent
    create_quote_repo_table(&pool, "archive").await.unwrap();

    let err = create_quote_repo_table(&pool, "Archive").await.unwrap_err();
    assert!(matches!(err, Error::InvalidInput(_)));
}

#[tokio::test]
async fn test_v2_defaults_applied() {
    let dir = TempDir::new().unwrap();
    let pool = init_database(&dir.path().join("quoter.db")).await.unwrap();

    sqlx::query("INSERT INTO quoter_v2 (adder, authors, content) VALUES ('a', 'b', 'c')")
        .execute(&pool)
        .await
        .unwrap();

    let (dtype, attachments, is_old, date): (String, String, bool, i64) =
        sqlx::query_as("SELECT dtype, attachments, is_old, date FROM quoter_v2")
            .fetch_one(&pool)
            .await
            .unwrap();

    assert_eq!(dtype, "text");
    assert_eq!(attachments, "");
    assert!(!is_old);
    assert!(date > 0);
}
