use axum::Router;
use kindled::{AppState, auth, convos, db, discover, matches, profiles, swipes};
use tokio::sync::broadcast;
use tower_http::cors::CorsLayer;
use tower_sessions::{Expiry, MemoryStore, SessionManagerLayer, cookie::SameSite};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    dotenv::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let session_store = MemoryStore::default();
    let session_layer = SessionManagerLayer::new(session_store)
        .with_secure(false)
        .with_same_site(SameSite::Lax)
        .with_expiry(Expiry::OnInactivity(time::Duration::minutes(30)));

    let db_url = dotenv::var("DATABASE_URL").unwrap_or_else(|_| "sqlite://kindled.db".to_owned());
    let db_pool = db::connect(&db_url).await.unwrap();

    let dismissals_path =
        dotenv::var("SAMPLE_DISMISSALS").unwrap_or_else(|_| "dismissed_samples.json".to_owned());

    let app_state = AppState {
        db_pool,
        samples: discover::SampleStore::open(dismissals_path),
        tx: broadcast::channel(64).0,
    };

    let app = Router::new()
        .merge(auth::router())
        .nest("/p", profiles::router())
        .nest("/d", discover::router())
        .nest("/s", swipes::router())
        .nest("/m", matches::router())
        .nest("/c", convos::router())
        .with_state(app_state)
        .layer(session_layer)
        .layer(CorsLayer::permissive());

    let addr = dotenv::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:8080".to_owned());
    let listener = tokio::net::TcpListener::bind(&addr).await.unwrap();
    tracing::info!("listening on {addr}");
    axum::serve(listener, app).await.unwrap();
}
