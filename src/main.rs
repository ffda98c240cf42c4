use std::sync::Arc;

use axum::{Router, routing::get};
use parlor::config::Config;
use parlor::hub::{self, Hub};
use parlor::{AppState, index, res};
use tower_sessions::{Expiry, MemoryStore, SessionManagerLayer, cookie::SameSite};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    dotenv::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = Config::from_env();

    let session_store = MemoryStore::default();
    let session_layer = SessionManagerLayer::new(session_store)
        .with_secure(false)
        .with_same_site(SameSite::Lax)
        .with_expiry(Expiry::OnInactivity(time::Duration::hours(2)));

    let hub = Arc::new(Hub::new(&config.rooms, config.history_capacity));
    let addr = config.bind_addr();
    let cors = config.cors_layer();
    let app_state = AppState { config, hub };

    let app = Router::new()
        .route("/", get(index::index))
        .route("/chat.js", get(res::chat_js))
        .merge(hub::router())
        .with_state(app_state)
        .layer(session_layer)
        .layer(cors);

    tracing::info!(%addr, "listening");
    let listener = tokio::net::TcpListener::bind(&addr).await.unwrap();
    axum::serve(listener, app).await.unwrap();
}
