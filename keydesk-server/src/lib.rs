//! keydesk-server: HTTP registry for event key collection
//!
//! Tracks attendees through registered -> key ready -> key collected and
//! exposes the queue state over HTTP/JSON. All lifecycle logic lives in
//! query predicates over a single SQLite table; there is no state machine
//! object and no background sweep.

pub mod db;
pub mod http;
pub mod models;

pub use http::error::ApiError;
pub use http::server::{run_server, AppState, ServerConfig};
