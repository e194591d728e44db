//! Glyphnet API Server
//!
//! The HTTP/WebSocket ingress: encode, decode, send, the knowledge views,
//! governance endpoints, agent registration, and the live broadcast stream.

pub mod error;
pub mod middleware;
pub mod models;
pub mod relay;
pub mod routes;
pub mod server;
pub mod state;
pub mod stream;
pub mod telemetry;

pub use error::{ApiError, Result};
pub use server::{Server, ServerConfig};
pub use state::AppState;
