use axum::{Json, debug_handler, extract::State, response::{IntoResponse, Response}};
use serde::Serialize;
use sqlx::SqlitePool;
use tower_sessions::Session;

use crate::{AppResult, session};
use crate::profiles::{COLS, Profile, ProfileRow};

use super::samples::{SampleStore, sample_profiles};

#[derive(Debug, Serialize)]
pub struct Feed {
    pub source: FeedSource,
    pub profiles: Vec<Profile>,
}

/// Labels whether the feed came from the profiles table or from the fixed
/// fallback set, so sample data is never mistaken for live data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FeedSource {
    Live,
    Sample,
}

#[debug_handler(state = crate::AppState)]
pub(crate) async fn feed(
    State(db_pool): State<SqlitePool>,
    State(samples): State<SampleStore>,
    session: Session,
) -> AppResult<Response> {
    let Some(user_id) = session::current_user(&session).await? else {
        return Ok(session::unauthorized());
    };

    Ok(Json(candidates(&db_pool, &samples, &user_id).await).into_response())
}

/// Everyone the user hasn't swiped yet, minus the user. An empty table or a
/// failed read both degrade to the sample set.
pub async fn candidates(db_pool: &SqlitePool, samples: &SampleStore, user_id: &str) -> Feed {
    match live_candidates(db_pool, user_id).await {
        Ok(profiles) if !profiles.is_empty() => Feed {
            source: FeedSource::Live,
            profiles,
        },
        Ok(_) => sample_feed(samples, user_id),
        Err(e) => {
            tracing::warn!("discovery query failed, serving samples: {e:#}");
            sample_feed(samples, user_id)
        }
    }
}

async fn live_candidates(db_pool: &SqlitePool, user_id: &str) -> Result<Vec<Profile>, sqlx::Error> {
    let rows = sqlx::query_as::<_, ProfileRow>(&format!(
        "SELECT {COLS} FROM profiles \
         WHERE user_id<>? \
           AND user_id NOT IN (SELECT swiped_id FROM user_swipes WHERE swiper_id=?)",
    ))
    .bind(user_id)
    .bind(user_id)
    .fetch_all(db_pool)
    .await?;

    Ok(rows.into_iter().map(Profile::from).collect())
}

fn sample_feed(samples: &SampleStore, user_id: &str) -> Feed {
    let dismissed = samples.dismissed(user_id);
    Feed {
        source: FeedSource::Sample,
        profiles: sample_profiles()
            .into_iter()
            .filter(|p| !dismissed.contains(&p.user_id))
            .collect(),
    }
}
