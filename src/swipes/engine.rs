use axum::{Json, debug_handler, extract::{Path, State}, response::{IntoResponse, Response}};
use rand::Rng;
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use tower_sessions::Session;

use crate::discover::{SampleStore, is_sample};
use crate::{AppResult, db, session};

#[derive(Debug, Clone, Copy)]
pub struct SwipeOutcome {
    pub matched: bool,
}

#[derive(Deserialize)]
pub(crate) struct SwipeBody {
    is_like: bool,
}

#[derive(Serialize)]
pub(crate) struct SwipeResponse {
    #[serde(rename = "match")]
    matched: bool,
    error: Option<String>,
}

// The swipe endpoint never 500s; failures are logged and folded into the
// result shape so the client can keep swiping.
#[debug_handler(state = crate::AppState)]
pub(crate) async fn swipe_handler(
    Path(swiped_id): Path<String>,
    State(db_pool): State<SqlitePool>,
    State(samples): State<SampleStore>,
    session: Session,
    Json(SwipeBody { is_like }): Json<SwipeBody>,
) -> AppResult<Response> {
    let Some(swiper_id) = session::current_user(&session).await? else {
        return Ok(session::unauthorized());
    };

    let response = match swipe(&db_pool, &samples, &swiper_id, &swiped_id, is_like).await {
        Ok(outcome) => SwipeResponse {
            matched: outcome.matched,
            error: None,
        },
        Err(e) => {
            tracing::error!("swipe on {swiped_id} failed: {:#}", e.0);
            SwipeResponse {
                matched: false,
                error: Some(e.0.to_string()),
            }
        }
    };

    Ok(Json(response).into_response())
}

/// Records a swipe and, on a mutual like, creates the match row with the
/// pair in canonical order. Both inserts run in one transaction and are
/// idempotent on their pair keys, so repeated or racing calls converge
/// instead of duplicating rows.
pub async fn swipe(
    db_pool: &SqlitePool,
    samples: &SampleStore,
    swiper_id: &str,
    swiped_id: &str,
    is_like: bool,
) -> AppResult<SwipeOutcome> {
    if is_sample(swiped_id) {
        return Ok(swipe_sample(samples, swiper_id, swiped_id, is_like));
    }

    let mut tx = db_pool.begin().await?;

    sqlx::query(
        "INSERT INTO user_swipes (swiper_id,swiped_id,is_like,created_at) VALUES (?,?,?,?) \
         ON CONFLICT (swiper_id,swiped_id) DO NOTHING",
    )
    .bind(swiper_id)
    .bind(swiped_id)
    .bind(is_like)
    .bind(db::now_ms())
    .execute(&mut *tx)
    .await?;

    // The first decision for a pair is the one that sticks; a repeat swipe
    // must judge the match on the stored row, not on this call's flag.
    let (stored_like,): (bool,) = sqlx::query_as(
        "SELECT is_like FROM user_swipes WHERE swiper_id=? AND swiped_id=?",
    )
    .bind(swiper_id)
    .bind(swiped_id)
    .fetch_one(&mut *tx)
    .await?;

    let mut matched = false;
    if stored_like {
        let reciprocal = sqlx::query_as::<_, (i64,)>(
            "SELECT 1 FROM user_swipes WHERE swiper_id=? AND swiped_id=? AND is_like=1",
        )
        .bind(swiped_id)
        .bind(swiper_id)
        .fetch_optional(&mut *tx)
        .await?;

        if reciprocal.is_some() {
            let (lo, hi) = db::canonical_pair(swiper_id, swiped_id);
            sqlx::query(
                "INSERT INTO matches (user1_id,user2_id,matched_at) VALUES (?,?,?) \
                 ON CONFLICT (user1_id,user2_id) DO NOTHING",
            )
            .bind(lo)
            .bind(hi)
            .bind(db::now_ms())
            .execute(&mut *tx)
            .await?;
            matched = true;
        }
    }

    tx.commit().await?;
    Ok(SwipeOutcome { matched })
}

// Sample profiles never touch the shared store: the dismissal is kept
// locally and a like "matches" with fixed 30% odds as a demo affordance.
fn swipe_sample(
    samples: &SampleStore,
    swiper_id: &str,
    swiped_id: &str,
    is_like: bool,
) -> SwipeOutcome {
    samples.dismiss(swiper_id, swiped_id);

    SwipeOutcome {
        matched: is_like && rand::rng().random_bool(0.3),
    }
}
