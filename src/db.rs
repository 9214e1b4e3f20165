use sqlx::{SqlitePool, sqlite::SqlitePoolOptions};
use time::OffsetDateTime;

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS profiles (
    user_id TEXT PRIMARY KEY,
    first_name TEXT,
    last_name TEXT,
    age INTEGER,
    location TEXT,
    bio TEXT,
    avatar_url TEXT,
    interests TEXT NOT NULL DEFAULT '[]',
    created_at INTEGER NOT NULL,
    updated_at INTEGER NOT NULL
);

CREATE TABLE IF NOT EXISTS user_swipes (
    swiper_id TEXT NOT NULL,
    swiped_id TEXT NOT NULL,
    is_like INTEGER NOT NULL,
    created_at INTEGER NOT NULL,
    PRIMARY KEY (swiper_id, swiped_id)
);

CREATE TABLE IF NOT EXISTS matches (
    user1_id TEXT NOT NULL,
    user2_id TEXT NOT NULL,
    matched_at INTEGER NOT NULL,
    PRIMARY KEY (user1_id, user2_id),
    CHECK (user1_id < user2_id)
);

CREATE TABLE IF NOT EXISTS conversations (
    id TEXT PRIMARY KEY,
    user_lo TEXT NOT NULL,
    user_hi TEXT NOT NULL,
    created_at INTEGER NOT NULL,
    updated_at INTEGER NOT NULL,
    UNIQUE (user_lo, user_hi)
);

CREATE TABLE IF NOT EXISTS conversation_participants (
    conversation_id TEXT NOT NULL,
    user_id TEXT NOT NULL,
    PRIMARY KEY (conversation_id, user_id)
);

CREATE TABLE IF NOT EXISTS messages (
    id TEXT PRIMARY KEY,
    conversation_id TEXT NOT NULL,
    sender_id TEXT NOT NULL,
    content TEXT NOT NULL,
    status TEXT NOT NULL DEFAULT 'sent',
    created_at INTEGER NOT NULL,
    updated_at INTEGER NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_messages_convo ON messages (conversation_id, created_at);
CREATE INDEX IF NOT EXISTS idx_swipes_swiped ON user_swipes (swiped_id, swiper_id);
";

pub async fn connect(url: &str) -> Result<SqlitePool, sqlx::Error> {
    let pool = SqlitePoolOptions::new()
        .max_connections(16)
        .connect(url)
        .await?;
    init(&pool).await?;
    Ok(pool)
}

pub async fn init(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    sqlx::raw_sql(SCHEMA).execute(pool).await?;
    Ok(())
}

/// Milliseconds since the Unix epoch. All row timestamps use this.
pub fn now_ms() -> i64 {
    (OffsetDateTime::now_utc().unix_timestamp_nanos() / 1_000_000) as i64
}

/// Orders a two-user relation with the smaller id first, so the pair is
/// unique regardless of which side acted.
pub fn canonical_pair<'a>(a: &'a str, b: &'a str) -> (&'a str, &'a str) {
    if a <= b { (a, b) } else { (b, a) }
}

#[cfg(test)]
mod tests {
    use super::canonical_pair;

    #[test]
    fn pair_order_is_symmetric() {
        assert_eq!(canonical_pair("u1", "u2"), ("u1", "u2"));
        assert_eq!(canonical_pair("u2", "u1"), ("u1", "u2"));
    }
}
