//! Per-user story pointers (`users` table)

use quoter_common::db::StoryPointer;
use quoter_common::Result;
use sqlx::SqlitePool;
use tracing::info;

/// Story a new user starts on
pub const INITIAL_STORY: i64 = 1;

/// Look up a user's story pointer, registering unknown users at story 1
pub async fn login(pool: &SqlitePool, username: &str) -> Result<StoryPointer> {
    let story: Option<i64> = sqlx::query_scalar("SELECT story FROM users WHERE user = ?")
        .bind(username)
        .fetch_optional(pool)
        .await?;

    let story_id = match story {
        Some(story) => story,
        None => {
            // Concurrent first logins race on the primary key; the loser's row is ignored
            sqlx::query("INSERT OR IGNORE INTO users (user, story) VALUES (?, ?)")
                .bind(username)
                .bind(INITIAL_STORY)
                .execute(pool)
                .await?;
            info!("Registered story pointer for {}", username);
            INITIAL_STORY
        }
    };

    Ok(StoryPointer {
        username: username.to_string(),
        story_id,
    })
}

/// Move a user's story pointer; `false` if the user is unknown
pub async fn set_story(pool: &SqlitePool, username: &str, story_id: i64) -> Result<bool> {
    let result = sqlx::query("UPDATE users SET story = ? WHERE user = ?")
        .bind(story_id)
        .bind(username)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() != 0)
}
