use axum::{Json, debug_handler, extract::State, response::{IntoResponse, Response}};
use serde::Serialize;
use sqlx::SqlitePool;
use tower_sessions::Session;

use crate::{AppResult, session};

#[derive(Debug, Serialize)]
pub struct MatchEntry {
    pub user1_id: String,
    pub user2_id: String,
    pub matched_at: i64,
    pub matched_user: MatchedUser,
}

#[derive(Debug, Serialize)]
pub struct MatchedUser {
    pub user_id: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub avatar_url: Option<String>,
}

#[debug_handler]
pub(crate) async fn matches(
    State(db_pool): State<SqlitePool>,
    session: Session,
) -> AppResult<Response> {
    let Some(user_id) = session::current_user(&session).await? else {
        return Ok(session::unauthorized());
    };

    Ok(Json(list_matches(&db_pool, &user_id).await?).into_response())
}

/// The user's matches, newest first, each joined with the counterpart's
/// profile summary.
pub async fn list_matches(db_pool: &SqlitePool, user_id: &str) -> AppResult<Vec<MatchEntry>> {
    type Row = (String, String, i64, String, Option<String>, Option<String>, Option<String>);

    let rows: Vec<Row> = sqlx::query_as(
        "SELECT m.user1_id, m.user2_id, m.matched_at, \
                p.user_id, p.first_name, p.last_name, p.avatar_url \
         FROM matches m \
         JOIN profiles p \
           ON p.user_id = CASE WHEN m.user1_id=? THEN m.user2_id ELSE m.user1_id END \
         WHERE m.user1_id=? OR m.user2_id=? \
         ORDER BY m.matched_at DESC",
    )
    .bind(user_id)
    .bind(user_id)
    .bind(user_id)
    .fetch_all(db_pool)
    .await?;

    Ok(rows
        .into_iter()
        .map(|(user1_id, user2_id, matched_at, other_id, first_name, last_name, avatar_url)| {
            MatchEntry {
                user1_id,
                user2_id,
                matched_at,
                matched_user: MatchedUser {
                    user_id: other_id,
                    first_name,
                    last_name,
                    avatar_url,
                },
            }
        })
        .collect())
}
