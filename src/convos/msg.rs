use axum::{Json, debug_handler, extract::{Path, State}, http::StatusCode, response::{IntoResponse, Response}};
use serde::Deserialize;
use sqlx::SqlitePool;
use tokio::sync::broadcast;
use tower_sessions::Session;
use uuid::Uuid;

use crate::{AppResult, db, session};

use super::{ConvoEvent, Message, MessageStatus, is_participant};

#[derive(Deserialize)]
pub(crate) struct SendMessageBody {
    content: String,
}

#[debug_handler(state = crate::AppState)]
pub(crate) async fn send(
    Path(conversation_id): Path<Uuid>,
    State(db_pool): State<SqlitePool>,
    State(tx): State<broadcast::Sender<ConvoEvent>>,
    session: Session,
    Json(SendMessageBody { content }): Json<SendMessageBody>,
) -> AppResult<Response> {
    let Some(user_id) = session::current_user(&session).await? else {
        return Ok(session::unauthorized());
    };

    let conversation_id = conversation_id.to_string();
    if !is_participant(&db_pool, &conversation_id, &user_id).await? {
        return Ok((StatusCode::FORBIDDEN, "not a participant").into_response());
    }

    let message = send_message(&db_pool, &tx, &conversation_id, &user_id, content).await?;
    Ok((StatusCode::CREATED, Json(message)).into_response())
}

/// Persists the message as `sent` and bumps the conversation's recency to
/// the message's creation time, atomically, then broadcasts it.
pub async fn send_message(
    db_pool: &SqlitePool,
    tx: &broadcast::Sender<ConvoEvent>,
    conversation_id: &str,
    sender_id: &str,
    content: String,
) -> AppResult<Message> {
    let id = Uuid::now_v7().to_string();
    let now = db::now_ms();

    let mut txn = db_pool.begin().await?;
    sqlx::query(
        "INSERT INTO messages (id,conversation_id,sender_id,content,status,created_at,updated_at) \
         VALUES (?,?,?,?,?,?,?)",
    )
    .bind(&id)
    .bind(conversation_id)
    .bind(sender_id)
    .bind(&content)
    .bind(MessageStatus::Sent.as_str())
    .bind(now)
    .bind(now)
    .execute(&mut *txn)
    .await?;

    sqlx::query("UPDATE conversations SET updated_at=? WHERE id=?")
        .bind(now)
        .bind(conversation_id)
        .execute(&mut *txn)
        .await?;
    txn.commit().await?;

    let message = Message {
        id,
        conversation_id: conversation_id.to_owned(),
        sender_id: sender_id.to_owned(),
        content,
        status: MessageStatus::Sent,
        created_at: now,
        updated_at: now,
    };

    let _ = tx.send(ConvoEvent::Message {
        conversation_id: conversation_id.to_owned(),
        message: message.clone(),
    });

    Ok(message)
}
