mod engine;

use axum::{Router, routing::post};

use crate::AppState;

pub use engine::{SwipeOutcome, swipe};

pub fn router() -> Router<AppState> {
    Router::new().route("/{user_id}", post(engine::swipe_handler))
}
