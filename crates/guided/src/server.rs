//! HTTP server for guided.

use crate::routes;
use crate::sessions::SessionStore;
use anyhow::Result;
use axum::Router;
use guide_core::GuideSystem;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::RwLock;
use tower_http::trace::TraceLayer;
use tracing::info;

/// Application state shared across handlers
pub struct AppState {
    pub guide: RwLock<GuideSystem>,
    pub sessions: RwLock<SessionStore>,
    pub start_time: Instant,
}

impl AppState {
    pub fn new(guide: GuideSystem) -> Self {
        Self {
            guide: RwLock::new(guide),
            sessions: RwLock::new(SessionStore::default()),
            start_time: Instant::now(),
        }
    }
}

/// Assemble the full route tree
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .merge(routes::chat_routes())
        .merge(routes::translate_routes())
        .merge(routes::recommendation_routes())
        .merge(routes::debug_routes())
        .merge(routes::status_routes())
        .merge(routes::history_routes())
        .merge(routes::reload_routes())
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}

/// Run the HTTP server
pub async fn run(state: AppState, bind_addr: &str) -> Result<()> {
    let app = router(Arc::new(state));

    let listener = tokio::net::TcpListener::bind(bind_addr).await?;
    info!("Listening on http://{}", bind_addr);

    axum::serve(listener, app).await?;
    Ok(())
}
