//! HTTP query surface over the source clients.

pub mod error;
pub mod routes;

use std::sync::Arc;

use axum::Router;
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::config::SourceUrls;
use crate::fetch::Fetcher;
use crate::sources::Sources;

/// Shared by every handler.
#[derive(Clone)]
pub struct AppState {
    pub sources: Arc<Sources>,
}

impl AppState {
    pub fn new(fetcher: Fetcher, urls: &SourceUrls) -> Self {
        Self {
            sources: Arc::new(Sources::new(fetcher, urls)),
        }
    }
}

/// The routed application with CORS and request tracing.
pub fn create_app(state: AppState) -> Router {
    routes::create_router()
        .with_state(state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

pub async fn run_server(addr: &str, app: Router) -> std::io::Result<()> {
    let listener = TcpListener::bind(addr).await?;
    info!(addr = %listener.local_addr()?, "Infinite API listening");
    axum::serve(listener, app).await
}
