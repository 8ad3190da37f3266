//! Attachment blob storage

use quoter_common::db::AttachmentBlob;
use quoter_common::Result;
use sqlx::{Row, SqlitePool};

pub async fn put(pool: &SqlitePool, blob: &AttachmentBlob) -> Result<()> {
    sqlx::query("INSERT INTO attachments (id, type, data) VALUES (?, ?, ?)")
        .bind(&blob.id)
        .bind(&blob.content_type)
        .bind(&blob.data)
        .execute(pool)
        .await?;

    Ok(())
}

pub async fn get(pool: &SqlitePool, id: &str) -> Result<Option<AttachmentBlob>> {
    let row = sqlx::query("SELECT id, type, data FROM attachments WHERE id = ?")
        .bind(id)
        .fetch_optional(pool)
        .await?;

    match row {
        Some(row) => Ok(Some(AttachmentBlob {
            id: row.try_get("id")?,
            content_type: row.try_get("type")?,
            data: row.try_get("data")?,
        })),
        None => Ok(None),
    }
}

pub async fn exists(pool: &SqlitePool, id: &str) -> Result<bool> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM attachments WHERE id = ?")
        .bind(id)
        .fetch_one(pool)
        .await?;
    Ok(count > 0)
}

/// Delete an attachment; `false` if it didn't exist
pub async fn delete(pool: &SqlitePool, id: &str) -> Result<bool> {
    let result = sqlx::query("DELETE FROM attachments WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() != 0)
}
