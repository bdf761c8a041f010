use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::auth::Session;
use crate::chat::prompts::assistant_prompt;
use crate::chat::sessions;
use crate::errors::AppError;
use crate::models::chat::{ChatMessageRow, ChatRole, ChatSessionRow};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct SendMessageRequest {
    /// Omit to open a new session with this message.
    pub session_id: Option<Uuid>,
    pub content: String,
}

#[derive(Debug, Serialize)]
pub struct SendMessageResponse {
    pub session_id: Uuid,
    pub user_message: ChatMessageRow,
    pub reply: ChatMessageRow,
}

/// POST /api/v1/chat/sessions
pub async fn handle_create_session(
    State(state): State<AppState>,
    session: Session,
) -> Result<(StatusCode, Json<ChatSessionRow>), AppError> {
    let chat = sessions::create_session(&state.db, session.user_id).await?;
    info!("Opened chat session {} for user {}", chat.id, session.user_id);
    Ok((StatusCode::CREATED, Json(chat)))
}

/// GET /api/v1/chat/sessions/:id/messages
pub async fn handle_list_messages(
    State(state): State<AppState>,
    session: Session,
    Path(session_id): Path<Uuid>,
) -> Result<Json<Vec<ChatMessageRow>>, AppError> {
    sessions::find_session(&state.db, session.user_id, session_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Chat session {session_id} not found")))?;
    let messages = sessions::list_messages(&state.db, session_id).await?;
    Ok(Json(messages))
}

/// POST /api/v1/chat/messages
///
/// Persists the user's message, asks the model, and persists the reply.
/// The user's message stays stored even if inference fails.
pub async fn handle_send_message(
    State(state): State<AppState>,
    session: Session,
    Json(req): Json<SendMessageRequest>,
) -> Result<Json<SendMessageResponse>, AppError> {
    let content = req.content.trim();
    if content.is_empty() {
        return Err(AppError::Validation("Message cannot be empty".to_string()));
    }

    let session_id = match req.session_id {
        Some(id) => {
            sessions::find_session(&state.db, session.user_id, id)
                .await?
                .ok_or_else(|| AppError::NotFound(format!("Chat session {id} not found")))?
                .id
        }
        None => sessions::create_session(&state.db, session.user_id).await?.id,
    };

    let user_message =
        sessions::save_message(&state.db, session_id, ChatRole::User, content).await?;

    let generated = state.inference.generate(&assistant_prompt(content)).await?;
    let reply =
        sessions::save_message(&state.db, session_id, ChatRole::Assistant, &generated).await?;

    Ok(Json(SendMessageResponse {
        session_id,
        user_message,
        reply,
    }))
}
