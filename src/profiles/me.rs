use axum::{Json, debug_handler, extract::State, http::StatusCode, response::{IntoResponse, Response}};
use serde::Deserialize;
use sqlx::SqlitePool;
use tower_sessions::Session;

use crate::{AppResult, db, session};

use super::fetch_profile;

#[derive(Debug, Deserialize)]
pub(crate) struct NewProfile {
    first_name: Option<String>,
    last_name: Option<String>,
    age: Option<i64>,
    location: Option<String>,
    bio: Option<String>,
    avatar_url: Option<String>,
    #[serde(default)]
    interests: Vec<String>,
}

#[debug_handler]
pub(crate) async fn create(
    State(db_pool): State<SqlitePool>,
    session: Session,
    Json(new): Json<NewProfile>,
) -> AppResult<Response> {
    let Some(user_id) = session::current_user(&session).await? else {
        return Ok(session::unauthorized());
    };

    let now = db::now_ms();
    let result = sqlx::query(
        "INSERT INTO profiles (user_id,first_name,last_name,age,location,bio,avatar_url,interests,created_at,updated_at) \
         VALUES (?,?,?,?,?,?,?,?,?,?)",
    )
    .bind(&user_id)
    .bind(&new.first_name)
    .bind(&new.last_name)
    .bind(new.age)
    .bind(&new.location)
    .bind(&new.bio)
    .bind(&new.avatar_url)
    .bind(serde_json::to_string(&new.interests)?)
    .bind(now)
    .bind(now)
    .execute(&db_pool)
    .await;

    match result {
        Ok(_) => {}
        Err(sqlx::Error::Database(e)) if e.is_unique_violation() => {
            return Ok((StatusCode::CONFLICT, "profile already exists").into_response());
        }
        Err(e) => return Err(e.into()),
    }

    let profile = fetch_profile(&db_pool, &user_id).await?;
    Ok((StatusCode::CREATED, Json(profile)).into_response())
}

#[debug_handler]
pub(crate) async fn show(
    State(db_pool): State<SqlitePool>,
    session: Session,
) -> AppResult<Response> {
    let Some(user_id) = session::current_user(&session).await? else {
        return Ok(session::unauthorized());
    };

    match fetch_profile(&db_pool, &user_id).await? {
        Some(profile) => Ok(Json(profile).into_response()),
        None => Ok((StatusCode::NOT_FOUND, "no profile yet").into_response()),
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct ProfileUpdate {
    first_name: Option<String>,
    last_name: Option<String>,
    age: Option<i64>,
    location: Option<String>,
    bio: Option<String>,
    avatar_url: Option<String>,
    interests: Option<Vec<String>>,
}

// Only provided fields change; the row key comes from the session, so a
// user can never update anyone else's profile.
#[debug_handler]
pub(crate) async fn update(
    State(db_pool): State<SqlitePool>,
    session: Session,
    Json(update): Json<ProfileUpdate>,
) -> AppResult<Response> {
    let Some(user_id) = session::current_user(&session).await? else {
        return Ok(session::unauthorized());
    };

    let interests = match &update.interests {
        Some(tags) => Some(serde_json::to_string(tags)?),
        None => None,
    };

    let result = sqlx::query(
        "UPDATE profiles SET \
            first_name=COALESCE(?,first_name), \
            last_name=COALESCE(?,last_name), \
            age=COALESCE(?,age), \
            location=COALESCE(?,location), \
            bio=COALESCE(?,bio), \
            avatar_url=COALESCE(?,avatar_url), \
            interests=COALESCE(?,interests), \
            updated_at=? \
         WHERE user_id=?",
    )
    .bind(&update.first_name)
    .bind(&update.last_name)
    .bind(update.age)
    .bind(&update.location)
    .bind(&update.bio)
    .bind(&update.avatar_url)
    .bind(interests)
    .bind(db::now_ms())
    .bind(&user_id)
    .execute(&db_pool)
    .await?;

    if result.rows_affected() == 0 {
        return Ok((StatusCode::NOT_FOUND, "no profile yet").into_response());
    }

    let profile = fetch_profile(&db_pool, &user_id).await?;
    Ok(Json(profile).into_response())
}
