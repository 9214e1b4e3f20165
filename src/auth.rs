use axum::{Json, Router, debug_handler, response::IntoResponse, routing::post};
use serde::Deserialize;
use tower_sessions::Session;

use crate::{AppResult, AppState, session::USER_ID};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/login", post(login))
        .route("/logout", post(logout))
}

#[derive(Deserialize)]
pub(crate) struct LoginBody {
    user_id: String,
}

// Identity normally comes from the hosted auth provider fronting this
// service; this endpoint stands in for it so sessions can be driven locally.
#[debug_handler]
pub(crate) async fn login(
    session: Session,
    Json(LoginBody { user_id }): Json<LoginBody>,
) -> AppResult<impl IntoResponse> {
    session.insert(USER_ID, user_id.clone()).await?;
    tracing::info!("welcome u/{user_id}");
    Ok(())
}

#[debug_handler]
pub(crate) async fn logout(session: Session) -> AppResult<impl IntoResponse> {
    session.clear().await;
    Ok(())
}
