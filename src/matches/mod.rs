mod list;

use axum::{Router, routing::get};

use crate::AppState;

pub use list::{MatchEntry, MatchedUser, list_matches};

pub fn router() -> Router<AppState> {
    Router::new().route("/", get(list::matches))
}
