//! HTTP server layer
//!
//! Axum router with request tracing, permissive CORS for the browser
//! client, JSON error responses, and graceful shutdown.

pub mod error;
pub mod routes;
pub mod server;

pub use error::ApiError;
pub use server::{run_server, AppState, ServerConfig};
