use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use tokio::sync::broadcast;

use crate::db;

use super::ConvoEvent;

/// Delivery state of a message. Transitions only move forward:
/// sending → sent → delivered → read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageStatus {
    Sending,
    Sent,
    Delivered,
    Read,
}

impl MessageStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            MessageStatus::Sending => "sending",
            MessageStatus::Sent => "sent",
            MessageStatus::Delivered => "delivered",
            MessageStatus::Read => "read",
        }
    }

    pub fn parse(s: &str) -> MessageStatus {
        match s {
            "sending" => MessageStatus::Sending,
            "delivered" => MessageStatus::Delivered,
            "read" => MessageStatus::Read,
            _ => MessageStatus::Sent,
        }
    }

    // States strictly before self, as a SQL IN-list. The update guard lives
    // in the statement itself so a replay can never move a status backwards.
    fn earlier_sql(self) -> &'static str {
        match self {
            MessageStatus::Sending => "''",
            MessageStatus::Sent => "'sending'",
            MessageStatus::Delivered => "'sending','sent'",
            MessageStatus::Read => "'sending','sent','delivered'",
        }
    }
}

/// Advances every message the reader did NOT send to `to`, skipping any
/// already at or past it, and broadcasts one status event per change.
/// The reader fetching the list means delivered; opening the thread means
/// read.
pub(crate) async fn advance_incoming(
    db_pool: &SqlitePool,
    tx: &broadcast::Sender<ConvoEvent>,
    conversation_id: &str,
    reader_id: &str,
    to: MessageStatus,
) -> Result<(), sqlx::Error> {
    let sql = format!(
        "UPDATE messages SET status='{}', updated_at=? \
         WHERE conversation_id=? AND sender_id<>? AND status IN ({}) \
         RETURNING id",
        to.as_str(),
        to.earlier_sql(),
    );

    let changed: Vec<(String,)> = sqlx::query_as(&sql)
        .bind(db::now_ms())
        .bind(conversation_id)
        .bind(reader_id)
        .fetch_all(db_pool)
        .await?;

    for (message_id,) in changed {
        let _ = tx.send(ConvoEvent::Status {
            conversation_id: conversation_id.to_owned(),
            message_id,
            status: to,
        });
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::MessageStatus;

    #[test]
    fn statuses_order_forward() {
        assert!(MessageStatus::Sending < MessageStatus::Sent);
        assert!(MessageStatus::Sent < MessageStatus::Delivered);
        assert!(MessageStatus::Delivered < MessageStatus::Read);
    }

    #[test]
    fn parse_round_trips() {
        for status in [
            MessageStatus::Sending,
            MessageStatus::Sent,
            MessageStatus::Delivered,
            MessageStatus::Read,
        ] {
            assert_eq!(MessageStatus::parse(status.as_str()), status);
        }
    }
}
