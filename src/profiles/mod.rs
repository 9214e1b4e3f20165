mod me;
mod page;

use axum::{Router, routing::{get, post}};
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;

use crate::{AppResult, AppState};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(me::create))
        .route("/me", get(me::show).put(me::update))
        .route("/{user_id}", get(page::profile))
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Profile {
    pub user_id: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub age: Option<i64>,
    pub location: Option<String>,
    pub bio: Option<String>,
    pub avatar_url: Option<String>,
    pub interests: Vec<String>,
    pub created_at: i64,
    pub updated_at: i64,
}

pub(crate) const COLS: &str =
    "user_id,first_name,last_name,age,location,bio,avatar_url,interests,created_at,updated_at";

// interests lives in the row as a JSON array string.
#[derive(Debug, sqlx::FromRow)]
pub(crate) struct ProfileRow {
    pub user_id: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub age: Option<i64>,
    pub location: Option<String>,
    pub bio: Option<String>,
    pub avatar_url: Option<String>,
    pub interests: String,
    pub created_at: i64,
    pub updated_at: i64,
}

impl From<ProfileRow> for Profile {
    fn from(row: ProfileRow) -> Self {
        Profile {
            user_id: row.user_id,
            first_name: row.first_name,
            last_name: row.last_name,
            age: row.age,
            location: row.location,
            bio: row.bio,
            avatar_url: row.avatar_url,
            interests: serde_json::from_str(&row.interests).unwrap_or_default(),
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

pub async fn fetch_profile(db_pool: &SqlitePool, user_id: &str) -> AppResult<Option<Profile>> {
    let row = sqlx::query_as::<_, ProfileRow>(
        &format!("SELECT {COLS} FROM profiles WHERE user_id=?"),
    )
    .bind(user_id)
    .fetch_optional(db_pool)
    .await?;

    Ok(row.map(Profile::from))
}
