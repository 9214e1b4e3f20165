use kindled::discover::{SampleStore, sample_profiles};
use kindled::matches::list_matches;
use kindled::{db, swipes};
use sqlx::SqlitePool;
use sqlx::sqlite::SqlitePoolOptions;
use tempfile::NamedTempFile;

#[tokio::test]
async fn like_without_reciprocal_is_not_a_match() {
    let pool = test_pool().await;
    let (samples, _guard) = test_samples();
    add_profile(&pool, "alice", "Alice").await;
    add_profile(&pool, "bob", "Bob").await;

    let outcome = swipes::swipe(&pool, &samples, "alice", "bob", true)
        .await
        .expect("swipe failed");
    assert!(!outcome.matched);

    assert_eq!(match_rows(&pool).await, Vec::<(String, String)>::new());
}

#[tokio::test]
async fn mutual_like_creates_single_canonical_match() {
    let pool = test_pool().await;
    let (samples, _guard) = test_samples();
    add_profile(&pool, "alice", "Alice").await;
    add_profile(&pool, "bob", "Bob").await;

    let first = swipes::swipe(&pool, &samples, "alice", "bob", true)
        .await
        .expect("first swipe failed");
    assert!(!first.matched);

    let second = swipes::swipe(&pool, &samples, "bob", "alice", true)
        .await
        .expect("second swipe failed");
    assert!(second.matched);

    assert_eq!(
        match_rows(&pool).await,
        vec![("alice".to_owned(), "bob".to_owned())]
    );
}

#[tokio::test]
async fn match_is_canonical_regardless_of_like_order() {
    let pool = test_pool().await;
    let (samples, _guard) = test_samples();
    add_profile(&pool, "alice", "Alice").await;
    add_profile(&pool, "bob", "Bob").await;

    // The higher id likes first this time.
    swipes::swipe(&pool, &samples, "bob", "alice", true)
        .await
        .expect("first swipe failed");
    let outcome = swipes::swipe(&pool, &samples, "alice", "bob", true)
        .await
        .expect("second swipe failed");
    assert!(outcome.matched);

    assert_eq!(
        match_rows(&pool).await,
        vec![("alice".to_owned(), "bob".to_owned())]
    );
}

#[tokio::test]
async fn repeated_swipe_converges_without_duplicate_match() {
    let pool = test_pool().await;
    let (samples, _guard) = test_samples();
    add_profile(&pool, "alice", "Alice").await;
    add_profile(&pool, "bob", "Bob").await;

    swipes::swipe(&pool, &samples, "alice", "bob", true)
        .await
        .expect("swipe failed");
    swipes::swipe(&pool, &samples, "bob", "alice", true)
        .await
        .expect("swipe failed");
    let again = swipes::swipe(&pool, &samples, "alice", "bob", true)
        .await
        .expect("repeat swipe failed");

    assert!(again.matched);
    assert_eq!(match_rows(&pool).await.len(), 1);

    let swipe_count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM user_swipes")
        .fetch_one(&pool)
        .await
        .expect("count failed");
    assert_eq!(swipe_count.0, 2);
}

#[tokio::test]
async fn pass_never_matches_even_when_liked_back() {
    let pool = test_pool().await;
    let (samples, _guard) = test_samples();
    add_profile(&pool, "alice", "Alice").await;
    add_profile(&pool, "bob", "Bob").await;

    swipes::swipe(&pool, &samples, "alice", "bob", false)
        .await
        .expect("pass failed");
    let outcome = swipes::swipe(&pool, &samples, "bob", "alice", true)
        .await
        .expect("like failed");

    assert!(!outcome.matched);
    assert!(match_rows(&pool).await.is_empty());
}

#[tokio::test]
async fn first_decision_sticks_on_repeat_swipes() {
    let pool = test_pool().await;
    let (samples, _guard) = test_samples();
    add_profile(&pool, "alice", "Alice").await;
    add_profile(&pool, "bob", "Bob").await;

    swipes::swipe(&pool, &samples, "alice", "bob", false)
        .await
        .expect("pass failed");
    swipes::swipe(&pool, &samples, "bob", "alice", true)
        .await
        .expect("like failed");

    // Alice's stored decision is a pass, so liking again changes nothing.
    let retry = swipes::swipe(&pool, &samples, "alice", "bob", true)
        .await
        .expect("repeat swipe failed");

    assert!(!retry.matched);
    assert!(match_rows(&pool).await.is_empty());
}

#[tokio::test]
async fn sample_swipe_writes_nothing_to_the_store() {
    let pool = test_pool().await;
    let (samples, _guard) = test_samples();
    let sample_id = sample_profiles()[0].user_id.clone();

    swipes::swipe(&pool, &samples, "alice", &sample_id, true)
        .await
        .expect("sample swipe failed");

    let swipe_count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM user_swipes")
        .fetch_one(&pool)
        .await
        .expect("count failed");
    assert_eq!(swipe_count.0, 0);
    assert!(samples.dismissed("alice").contains(&sample_id));
}

#[tokio::test]
async fn matches_list_carries_the_counterpart_profile() {
    let pool = test_pool().await;
    let (samples, _guard) = test_samples();
    add_profile(&pool, "alice", "Alice").await;
    add_profile(&pool, "bob", "Bob").await;

    swipes::swipe(&pool, &samples, "alice", "bob", true)
        .await
        .expect("swipe failed");
    swipes::swipe(&pool, &samples, "bob", "alice", true)
        .await
        .expect("swipe failed");

    let for_alice = list_matches(&pool, "alice").await.expect("list failed");
    assert_eq!(for_alice.len(), 1);
    assert_eq!(for_alice[0].matched_user.user_id, "bob");
    assert_eq!(for_alice[0].matched_user.first_name.as_deref(), Some("Bob"));

    let for_bob = list_matches(&pool, "bob").await.expect("list failed");
    assert_eq!(for_bob.len(), 1);
    assert_eq!(for_bob[0].matched_user.user_id, "alice");
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

async fn add_profile(pool: &SqlitePool, user_id: &str, first_name: &str) {
    let now = db::now_ms();
    sqlx::query(
        "INSERT INTO profiles (user_id,first_name,interests,created_at,updated_at) VALUES (?,?,'[]',?,?)",
    )
    .bind(user_id)
    .bind(first_name)
    .bind(now)
    .bind(now)
    .execute(pool)
    .await
    .expect("Failed to insert profile");
}

async fn match_rows(pool: &SqlitePool) -> Vec<(String, String)> {
    sqlx::query_as("SELECT user1_id, user2_id FROM matches ORDER BY user1_id")
        .fetch_all(pool)
        .await
        .expect("Failed to read matches")
}
