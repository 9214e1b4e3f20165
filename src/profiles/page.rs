use axum::{Json, debug_handler, extract::{Path, State}, http::StatusCode, response::{IntoResponse, Response}};
use sqlx::SqlitePool;
use tower_sessions::Session;

use crate::{AppResult, session};

use super::fetch_profile;

#[debug_handler]
pub(crate) async fn profile(
    Path(user_id): Path<String>,
    State(db_pool): State<SqlitePool>,
    session: Session,
) -> AppResult<Response> {
    if session::current_user(&session).await?.is_none() {
        return Ok(session::unauthorized());
    }

    match fetch_profile(&db_pool, &user_id).await? {
        Some(profile) => Ok(Json(profile).into_response()),
        None => Ok((StatusCode::NOT_FOUND, "no such profile").into_response()),
    }
}
