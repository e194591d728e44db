//! API server setup and configuration

use axum::Router;
use std::{net::SocketAddr, sync::Arc, time::Duration};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use crate::{
    error::Result,
    middleware::RateLimitLayer,
    routes,
    state::{now_ms, AppState},
};

/// API server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Server host address
    pub host: String,
    /// Server port
    pub port: u16,
    /// Enable CORS
    pub enable_cors: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3000,
            enable_cors: true,
        }
    }
}

/// API Server
pub struct Server {
    config: ServerConfig,
    state: Arc<AppState>,
    app: Router,
}

impl Server {
    /// Create a new API server
    pub fn new(config: ServerConfig, state: Arc<AppState>) -> Self {
        let app = Self::build_app(state.clone(), &config);
        Self { config, state, app }
    }

    /// Build the application router
    fn build_app(state: Arc<AppState>, config: &ServerConfig) -> Router {
        let mut app = routes::create_router(state);

        // Add CORS if enabled
        if config.enable_cors {
            let cors = CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any);
            app = app.layer(cors);
        }

        // Request tracing and rate limiting
        app = app.layer(TraceLayer::new_for_http());
        app = app.layer(RateLimitLayer::default());

        app
    }

    /// Start the server and the proposal expiry sweep.
    pub async fn start(self) -> Result<()> {
        spawn_expiry_sweep(self.state.clone());

        let addr: SocketAddr = format!("{}:{}", self.config.host, self.config.port)
            .parse()
            .expect("Invalid socket address");

        info!("Glyphnet API server starting on http://{}", addr);
        info!("Health check: http://{}/health", addr);
        info!("Glyph catalog: http://{}/glyphs", addr);
        info!("Live stream: ws://{}/stream", addr);

        let listener = tokio::net::TcpListener::bind(addr)
            .await
            .expect("Failed to bind address");

        axum::serve(listener, self.app).await.expect("Server error");

        Ok(())
    }

    /// Get router for testing
    pub fn router(self) -> Router {
        self.app
    }
}

/// Background proposal sweep. Missing a tick is harmless — the sweep is
/// idempotent and the next one catches up.
fn spawn_expiry_sweep(state: Arc<AppState>) {
    tokio::spawn(async move {
        let mut interval =
            tokio::time::interval(Duration::from_millis(state.cfg.sweep_interval_ms));
        loop {
            interval.tick().await;
            match state.governance.expire_sweep(now_ms()).await {
                Ok(0) => {}
                Ok(n) => info!(transitions = n, "proposal sweep"),
                Err(e) => warn!("proposal sweep failed: {}", e),
            }
        }
    });
}
