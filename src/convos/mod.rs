mod list;
mod msg;
mod new;
mod status;
mod ws;

use axum::{Router, routing::{get, post}};
use serde::Serialize;
use sqlx::SqlitePool;

use crate::AppState;

pub use list::{Conversation, Participant, ParticipantProfile, get_conversation, list_conversations};
pub use msg::send_message;
pub use new::find_or_create_conversation;
pub use status::MessageStatus;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list::conversations).post(new::new_conversation))
        .route("/{id}", get(list::conversation))
        .route("/{id}/msg", post(msg::send))
        .route("/{id}/ws", get(ws::convo_ws))
}

#[derive(Debug, Clone, Serialize)]
pub struct Message {
    pub id: String,
    pub conversation_id: String,
    pub sender_id: String,
    pub content: String,
    pub status: MessageStatus,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Pushed to websocket subscribers so the sender's client learns about new
/// messages and delivery/read progress without polling.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ConvoEvent {
    Message {
        conversation_id: String,
        message: Message,
    },
    Status {
        conversation_id: String,
        message_id: String,
        status: MessageStatus,
    },
}

impl ConvoEvent {
    pub fn conversation_id(&self) -> &str {
        match self {
            ConvoEvent::Message { conversation_id, .. } => conversation_id,
            ConvoEvent::Status { conversation_id, .. } => conversation_id,
        }
    }
}

pub(crate) async fn is_participant(
    db_pool: &SqlitePool,
    conversation_id: &str,
    user_id: &str,
) -> Result<bool, sqlx::Error> {
    Ok(sqlx::query_as::<_, (i64,)>(
        "SELECT 1 FROM conversation_participants WHERE conversation_id=? AND user_id=?",
    )
    .bind(conversation_id)
    .bind(user_id)
    .fetch_optional(db_pool)
    .await?
    .is_some())
}
