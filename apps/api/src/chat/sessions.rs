use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::chat::{ChatMessageRow, ChatRole, ChatSessionRow};

/// Default display name for a session opened at `now`.
pub fn session_name(now: DateTime<Utc>) -> String {
    format!("Chat {}", now.format("%Y-%m-%d %H:%M:%S"))
}

pub async fn create_session(pool: &PgPool, user_id: Uuid) -> Result<ChatSessionRow, sqlx::Error> {
    sqlx::query_as::<_, ChatSessionRow>(
        "INSERT INTO chat_sessions (user_id, session_name) VALUES ($1, $2) RETURNING *",
    )
    .bind(user_id)
    .bind(session_name(Utc::now()))
    .fetch_one(pool)
    .await
}

pub async fn find_session(
    pool: &PgPool,
    user_id: Uuid,
    session_id: Uuid,
) -> Result<Option<ChatSessionRow>, sqlx::Error> {
    sqlx::query_as::<_, ChatSessionRow>(
        "SELECT * FROM chat_sessions WHERE id = $1 AND user_id = $2",
    )
    .bind(session_id)
    .bind(user_id)
    .fetch_optional(pool)
    .await
}

pub async fn list_messages(
    pool: &PgPool,
    session_id: Uuid,
) -> Result<Vec<ChatMessageRow>, sqlx::Error> {
    sqlx::query_as::<_, ChatMessageRow>(
        "SELECT * FROM chat_messages WHERE session_id = $1 ORDER BY created_at ASC",
    )
    .bind(session_id)
    .fetch_all(pool)
    .await
}

/// Appends a message and bumps the session's `updated_at`.
pub async fn save_message(
    pool: &PgPool,
    session_id: Uuid,
    role: ChatRole,
    content: &str,
) -> Result<ChatMessageRow, sqlx::Error> {
    let mut tx = pool.begin().await?;

    let row = sqlx::query_as::<_, ChatMessageRow>(
        "INSERT INTO chat_messages (session_id, role, content) VALUES ($1, $2, $3) RETURNING *",
    )
    .bind(session_id)
    .bind(role.as_str())
    .bind(content)
    .fetch_one(&mut *tx)
    .await?;

    sqlx::query("UPDATE chat_sessions SET updated_at = NOW() WHERE id = $1")
        .bind(session_id)
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;
    Ok(row)
}
