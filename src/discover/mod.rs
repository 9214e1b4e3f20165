mod feed;
mod samples;

use axum::{Router, routing::get};

use crate::AppState;

pub use feed::{Feed, FeedSource, candidates};
pub use samples::{SampleStore, is_sample, sample_profiles};

pub fn router() -> Router<AppState> {
    Router::new().route("/", get(feed::feed))
}
