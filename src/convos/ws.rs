use axum::{debug_handler, extract::{Path, State, WebSocketUpgrade}, http::StatusCode, response::{IntoResponse, Response}};
use futures_util::{SinkExt, StreamExt};
use sqlx::SqlitePool;
use tokio::sync::broadcast;
use tower_sessions::Session;
use uuid::Uuid;

use crate::{AppResult, session};

use super::{ConvoEvent, is_participant};

// Subscribe-only: messages go over POST, this socket just streams the
// conversation's events back out as JSON frames.
#[debug_handler(state = crate::AppState)]
pub(crate) async fn convo_ws(
    Path(conversation_id): Path<Uuid>,
    State(db_pool): State<SqlitePool>,
    State(tx): State<broadcast::Sender<ConvoEvent>>,
    session: Session,
    ws: WebSocketUpgrade,
) -> AppResult<Response> {
    let Some(user_id) = session::current_user(&session).await? else {
        return Ok(session::unauthorized());
    };

    let conversation_id = conversation_id.to_string();
    if !is_participant(&db_pool, &conversation_id, &user_id).await? {
        return Ok((StatusCode::FORBIDDEN, "not a participant").into_response());
    }

    Ok(ws
        .on_upgrade(async move |stream| {
            let mut rx = tx.subscribe();
            let (mut sender, mut receiver) = stream.split();

            loop {
                tokio::select! {
                    event = rx.recv() => match event {
                        Ok(event) if event.conversation_id() == conversation_id => {
                            let Ok(frame) = serde_json::to_string(&event) else {
                                continue;
                            };
                            if sender.send(frame.into()).await.is_err() {
                                break;
                            }
                        }
                        Ok(_) => {}
                        Err(broadcast::error::RecvError::Lagged(skipped)) => {
                            tracing::warn!("ws subscriber lagged, skipped {skipped} events");
                        }
                        Err(broadcast::error::RecvError::Closed) => break,
                    },
                    incoming = receiver.next() => match incoming {
                        Some(Ok(_)) => {}
                        _ => break,
                    },
                }
            }
        })
        .into_response())
}
