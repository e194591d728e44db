//! Glyphnet Rust SDK
//!
//! Typed async client for the Glyphnet HTTP API, for backend services that
//! speak glyphs.

pub mod client;
pub mod error;
pub mod types;

pub use client::GlyphnetClient;
pub use error::{Result, SdkError};
