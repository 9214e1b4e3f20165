use axum::{Json, debug_handler, extract::State, response::{IntoResponse, Response}};
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use tower_sessions::Session;
use uuid::Uuid;

use crate::{AppResult, db, session};

#[derive(Deserialize)]
pub(crate) struct NewConversationBody {
    other_user_id: String,
}

#[derive(Serialize)]
pub(crate) struct NewConversationResponse {
    conversation_id: String,
}

#[debug_handler]
pub(crate) async fn new_conversation(
    State(db_pool): State<SqlitePool>,
    session: Session,
    Json(NewConversationBody { other_user_id }): Json<NewConversationBody>,
) -> AppResult<Response> {
    let Some(user_id) = session::current_user(&session).await? else {
        return Ok(session::unauthorized());
    };

    let conversation_id = find_or_create_conversation(&db_pool, &user_id, &other_user_id).await?;
    Ok(Json(NewConversationResponse { conversation_id }).into_response())
}

/// Returns the two-party conversation for the pair, creating it on first
/// use. The conversation row and both participant rows go in one
/// transaction; losing the insert race on the canonical pair just means the
/// other side created it first, so the existing row is fetched instead.
pub async fn find_or_create_conversation(
    db_pool: &SqlitePool,
    user_id: &str,
    other_user_id: &str,
) -> AppResult<String> {
    let (lo, hi) = db::canonical_pair(user_id, other_user_id);

    if let Some(id) = lookup(db_pool, lo, hi).await? {
        return Ok(id);
    }

    let id = Uuid::now_v7().to_string();
    let now = db::now_ms();

    let mut tx = db_pool.begin().await?;
    let inserted = sqlx::query(
        "INSERT INTO conversations (id,user_lo,user_hi,created_at,updated_at) VALUES (?,?,?,?,?)",
    )
    .bind(&id)
    .bind(lo)
    .bind(hi)
    .bind(now)
    .bind(now)
    .execute(&mut *tx)
    .await;

    match inserted {
        Ok(_) => {}
        Err(sqlx::Error::Database(e)) if e.is_unique_violation() => {
            tx.rollback().await?;
            return match lookup(db_pool, lo, hi).await? {
                Some(existing) => Ok(existing),
                None => Err(anyhow::anyhow!("conversation for pair vanished after conflict").into()),
            };
        }
        Err(e) => return Err(e.into()),
    }

    for participant in [lo, hi] {
        sqlx::query("INSERT INTO conversation_participants (conversation_id,user_id) VALUES (?,?)")
            .bind(&id)
            .bind(participant)
            .execute(&mut *tx)
            .await?;
    }
    tx.commit().await?;

    tracing::debug!("created conversation {id} for {lo} and {hi}");
    Ok(id)
}

async fn lookup(db_pool: &SqlitePool, lo: &str, hi: &str) -> Result<Option<String>, sqlx::Error> {
    Ok(sqlx::query_as::<_, (String,)>(
        "SELECT id FROM conversations WHERE user_lo=? AND user_hi=?",
    )
    .bind(lo)
    .bind(hi)
    .fetch_optional(db_pool)
    .await?
    .map(|(id,)| id))
}
