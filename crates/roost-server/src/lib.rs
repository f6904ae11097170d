//! HTTP service exposing the posting session.
//!
//! Endpoints:
//!   GET  /health
//!   POST /tweet       (multipart: content + optional image)
//!   POST /cli/tweet   (JSON: {content, imagePath})

pub mod routes;

use axum::routing::{get, post};
use axum::Router;
use roost_browser::Poster;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::Mutex;

/// One posting session shared across all requests. The mutex serializes
/// requests against the single browser page.
pub type SharedPoster = Arc<Mutex<Box<dyn Poster>>>;

pub struct AppState {
    pub poster: SharedPoster,
    pub upload_dir: PathBuf,
    pub started_at: Instant,
}

impl AppState {
    pub fn new(poster: Box<dyn Poster>, upload_dir: PathBuf) -> std::io::Result<Arc<Self>> {
        std::fs::create_dir_all(&upload_dir)?;
        Ok(Arc::new(Self {
            poster: Arc::new(Mutex::new(poster)),
            upload_dir,
            started_at: Instant::now(),
        }))
    }
}

pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(routes::health))
        .route("/tweet", post(routes::post_tweet))
        .route("/cli/tweet", post(routes::post_cli_tweet))
        .with_state(state)
}

/// Run the service until ctrl-c, then release the browser session
pub async fn serve(addr: SocketAddr, state: Arc<AppState>) -> std::io::Result<()> {
    let router = build_router(state.clone());

    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("Server listening on http://{}", addr);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Shutting down, releasing browser session");
    state.poster.lock().await.cleanup().await;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to install ctrl-c handler: {}", e);
    }
}
