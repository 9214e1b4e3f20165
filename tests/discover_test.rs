use kindled::discover::{FeedSource, SampleStore, candidates, sample_profiles};
use kindled::{db, swipes};
use sqlx::SqlitePool;
use sqlx::sqlite::SqlitePoolOptions;
use tempfile::NamedTempFile;

#[tokio::test]
async fn feed_excludes_self_and_already_swiped() {
    let pool = test_pool().await;
    let (samples, _guard) = test_samples();
    add_profile(&pool, "alice").await;
    add_profile(&pool, "bob").await;
    add_profile(&pool, "carol").await;

    swipes::swipe(&pool, &samples, "alice", "bob", false)
        .await
        .expect("swipe failed");

    let feed = candidates(&pool, &samples, "alice").await;
    assert_eq!(feed.source, FeedSource::Live);

    let ids: Vec<&str> = feed.profiles.iter().map(|p| p.user_id.as_str()).collect();
    assert_eq!(ids, vec!["carol"]);
}

#[tokio::test]
async fn fully_swiped_feed_falls_back_to_samples() {
    let pool = test_pool().await;
    let (samples, _guard) = test_samples();
    add_profile(&pool, "alice").await;
    add_profile(&pool, "bob").await;

    swipes::swipe(&pool, &samples, "alice", "bob", true)
        .await
        .expect("swipe failed");

    let feed = candidates(&pool, &samples, "alice").await;
    assert_eq!(feed.source, FeedSource::Sample);
    assert_eq!(feed.profiles.len(), sample_profiles().len());
}

#[tokio::test]
async fn dismissed_samples_stay_out_of_the_fallback() {
    let pool = test_pool().await;
    let (samples, _guard) = test_samples();
    add_profile(&pool, "alice").await;

    let dismissed_id = sample_profiles()[1].user_id.clone();
    swipes::swipe(&pool, &samples, "alice", &dismissed_id, false)
        .await
        .expect("sample swipe failed");

    let feed = candidates(&pool, &samples, "alice").await;
    assert_eq!(feed.source, FeedSource::Sample);
    assert!(feed.profiles.iter().all(|p| p.user_id != dismissed_id));
    assert_eq!(feed.profiles.len(), sample_profiles().len() - 1);
}

#[tokio::test]
async fn dismissals_are_scoped_per_user() {
    let pool = test_pool().await;
    let (samples, _guard) = test_samples();

    let dismissed_id = sample_profiles()[0].user_id.clone();
    samples.dismiss("alice", &dismissed_id);

    let for_alice = candidates(&pool, &samples, "alice").await;
    let for_bob = candidates(&pool, &samples, "bob").await;

    assert!(for_alice.profiles.iter().all(|p| p.user_id != dismissed_id));
    assert!(for_bob.profiles.iter().any(|p| p.user_id == dismissed_id));
}

#[tokio::test]
async fn dismissals_survive_a_store_reload() {
    let temp_file = NamedTempFile::new().expect("Failed to create temp file");
    let dismissed_id = sample_profiles()[2].user_id.clone();

    {
        let samples = SampleStore::open(temp_file.path().to_path_buf());
        samples.dismiss("alice", &dismissed_id);
    }

    let reopened = SampleStore::open(temp_file.path().to_path_buf());
    assert!(reopened.dismissed("alice").contains(&dismissed_id));
}

async fn test_pool() -> SqlitePool {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .expect("Failed to open in-memory database");
    db::init(&pool).await.expect("Failed to create schema");
    pool
}

fn test_samples() -> (SampleStore, NamedTempFile) {
    let temp_file = NamedTempFile::new().expect("Failed to create temp file");
    (SampleStore::open(temp_file.path().to_path_buf()), temp_file)
}

async fn add_profile(pool: &SqlitePool, user_id: &str) {
    let now = db::now_ms();
    sqlx::query(
        "INSERT INTO profiles (user_id,interests,created_at,updated_at) VALUES (?,'[]',?,?)",
    )
    .bind(user_id)
    .bind(now)
    .bind(now)
    .execute(pool)
    .await
    .expect("Failed to insert profile");
}
