//! Glyphnet API Server Binary

use std::sync::Arc;

use glyphnet_api::{telemetry, AppState, Server, ServerConfig};
use glyphnet_knowledge::config::CoreConfig;
use glyphnet_knowledge::db::Database;
use glyphnet_knowledge::identity::{AcceptAllVerifier, NoAttestor};
use tracing::{error, info};

#[tokio::main]
async fn main() {
    // Initialize structured logging (reads RUST_LOG and LOG_FORMAT env vars)
    telemetry::init();

    info!("Starting Glyphnet API Server");

    // Load configuration
    let cfg = match CoreConfig::from_env() {
        Ok(cfg) => cfg,
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    // Open the embedded database
    let db = match Database::new(&cfg).await {
        Ok(db) => db,
        Err(e) => {
            error!("Failed to open database: {}", e);
            std::process::exit(1);
        }
    };

    // Run migrations
    if let Err(e) = db.migrate().await {
        error!("Failed to run migrations: {}", e);
        std::process::exit(1);
    }

    // Assemble the service. Wallet verification and on-chain attestation
    // collaborators default to the permissive local stand-ins.
    let admin_token = std::env::var("ADMIN_TOKEN").ok();
    if admin_token.is_none() {
        info!("ADMIN_TOKEN not set; admin endpoints are disabled");
    }
    let state = match AppState::new(
        cfg,
        db,
        Arc::new(AcceptAllVerifier),
        Arc::new(NoAttestor),
        admin_token,
    )
    .await
    {
        Ok(state) => state,
        Err(e) => {
            error!("Failed to build application state: {}", e);
            std::process::exit(1);
        }
    };

    // Create server configuration
    let config = ServerConfig {
        host: std::env::var("API_HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
        port: std::env::var("API_PORT")
            .ok()
            .and_then(|p| p.parse().ok())
            .unwrap_or(3000),
        enable_cors: true,
    };

    // Create and start server
    let server = Server::new(config, state);

    if let Err(e) = server.start().await {
        error!("Server error: {}", e);
        std::process::exit(1);
    }
}
