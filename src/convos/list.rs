use axum::{Json, debug_handler, extract::{Path, State}, http::StatusCode, response::{IntoResponse, Response}};
use serde::Serialize;
use sqlx::SqlitePool;
use tokio::sync::broadcast;
use tower_sessions::Session;
use uuid::Uuid;

use crate::{AppResult, session};

use super::status::advance_incoming;
use super::{ConvoEvent, Message, MessageStatus, is_participant};

#[derive(Debug, Serialize)]
pub struct Conversation {
    pub id: String,
    pub created_at: i64,
    pub updated_at: i64,
    pub participants: Vec<Participant>,
    pub messages: Vec<Message>,
    pub last_message: Option<Message>,
}

#[derive(Debug, Serialize)]
pub struct Participant {
    pub user_id: String,
    pub profile: Option<ParticipantProfile>,
}

#[derive(Debug, Serialize)]
pub struct ParticipantProfile {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub avatar_url: Option<String>,
}

#[debug_handler(state = crate::AppState)]
pub(crate) async fn conversations(
    State(db_pool): State<SqlitePool>,
    State(tx): State<broadcast::Sender<ConvoEvent>>,
    session: Session,
) -> AppResult<Response> {
    let Some(user_id) = session::current_user(&session).await? else {
        return Ok(session::unauthorized());
    };

    Ok(Json(list_conversations(&db_pool, &tx, &user_id).await?).into_response())
}

#[debug_handler(state = crate::AppState)]
pub(crate) async fn conversation(
    Path(conversation_id): Path<Uuid>,
    State(db_pool): State<SqlitePool>,
    State(tx): State<broadcast::Sender<ConvoEvent>>,
    session: Session,
) -> AppResult<Response> {
    let Some(user_id) = session::current_user(&session).await? else {
        return Ok(session::unauthorized());
    };

    match get_conversation(&db_pool, &tx, &conversation_id.to_string(), &user_id).await? {
        Some(conv) => Ok(Json(conv).into_response()),
        None => Ok((StatusCode::NOT_FOUND, "no such conversation").into_response()),
    }
}

/// Every conversation the user participates in, sorted by last-message time
/// descending (conversation creation time when it has no messages yet).
/// Fetching the list counts as the client receiving the incoming messages,
/// so those advance to `delivered`.
pub async fn list_conversations(
    db_pool: &SqlitePool,
    tx: &broadcast::Sender<ConvoEvent>,
    user_id: &str,
) -> AppResult<Vec<Conversation>> {
    let heads: Vec<(String, i64, i64)> = sqlx::query_as(
        "SELECT c.id, c.created_at, c.updated_at \
         FROM conversations c \
         JOIN conversation_participants cp ON cp.conversation_id = c.id \
         WHERE cp.user_id=?",
    )
    .bind(user_id)
    .fetch_all(db_pool)
    .await?;

    let mut out = Vec::with_capacity(heads.len());
    for (id, created_at, updated_at) in heads {
        advance_incoming(db_pool, tx, &id, user_id, MessageStatus::Delivered).await?;
        out.push(assemble(db_pool, id, created_at, updated_at).await?);
    }

    out.sort_by_key(|c| {
        std::cmp::Reverse(c.last_message.as_ref().map_or(c.created_at, |m| m.created_at))
    });

    Ok(out)
}

/// One conversation with participants and ascending messages, or None when
/// the user isn't in it. Opening the thread means the incoming messages
/// were read.
pub async fn get_conversation(
    db_pool: &SqlitePool,
    tx: &broadcast::Sender<ConvoEvent>,
    conversation_id: &str,
    user_id: &str,
) -> AppResult<Option<Conversation>> {
    if !is_participant(db_pool, conversation_id, user_id).await? {
        return Ok(None);
    }

    let Some((id, created_at, updated_at)) = sqlx::query_as::<_, (String, i64, i64)>(
        "SELECT id, created_at, updated_at FROM conversations WHERE id=?",
    )
    .bind(conversation_id)
    .fetch_optional(db_pool)
    .await?
    else {
        return Ok(None);
    };

    advance_incoming(db_pool, tx, &id, user_id, MessageStatus::Read).await?;
    Ok(Some(assemble(db_pool, id, created_at, updated_at).await?))
}

async fn assemble(
    db_pool: &SqlitePool,
    id: String,
    created_at: i64,
    updated_at: i64,
) -> AppResult<Conversation> {
    let participants = sqlx::query_as::<_, (String, Option<String>, Option<String>, Option<String>, Option<String>)>(
        "SELECT cp.user_id, p.user_id, p.first_name, p.last_name, p.avatar_url \
         FROM conversation_participants cp \
         LEFT JOIN profiles p ON p.user_id = cp.user_id \
         WHERE cp.conversation_id=?",
    )
    .bind(&id)
    .fetch_all(db_pool)
    .await?
    .into_iter()
    .map(|(user_id, profile_key, first_name, last_name, avatar_url)| Participant {
        user_id,
        profile: profile_key.map(|_| ParticipantProfile {
            first_name,
            last_name,
            avatar_url,
        }),
    })
    .collect();

    let messages: Vec<Message> = sqlx::query_as::<_, (String, String, String, String, String, i64, i64)>(
        "SELECT id, conversation_id, sender_id, content, status, created_at, updated_at \
         FROM messages WHERE conversation_id=? \
         ORDER BY created_at ASC, id ASC",
    )
    .bind(&id)
    .fetch_all(db_pool)
    .await?
    .into_iter()
    .map(|(id, conversation_id, sender_id, content, status, created_at, updated_at)| Message {
        id,
        conversation_id,
        sender_id,
        content,
        status: MessageStatus::parse(&status),
        created_at,
        updated_at,
    })
    .collect();

    let last_message = messages.last().cloned();

    Ok(Conversation {
        id,
        created_at,
        updated_at,
        participants,
        messages,
        last_message,
    })
}
