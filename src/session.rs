use axum::{http::StatusCode, response::{IntoResponse, Response}};
use tower_sessions::Session;

use crate::AppResult;

pub const USER_ID: &str = "user_id";

pub async fn current_user(session: &Session) -> AppResult<Option<String>> {
    Ok(session.get::<String>(USER_ID).await?)
}

pub fn unauthorized() -> Response {
    (StatusCode::UNAUTHORIZED, "not signed in").into_response()
}
