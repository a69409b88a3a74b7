//! Axum server setup
//!
//! Router assembly, shared state, and process lifecycle: open the
//! database, migrate and seed, bind, serve, shut down gracefully on
//! Ctrl+C or SIGTERM.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use axum::Router;
use sqlx::SqlitePool;
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use super::routes;
use crate::db::{migrations, pool};

/// Server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address to bind to
    pub bind_addr: SocketAddr,

    /// Path to the SQLite database backing the registry
    pub db_path: PathBuf,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 3030)),
            db_path: PathBuf::from("attendees.db"),
        }
    }
}

/// Shared application state
pub struct AppState {
    pub pool: SqlitePool,
}

/// Build the application router with all routes
pub fn build_router(state: AppState) -> Router {
    // The registry fronts a separately-served browser client.
    let cors = CorsLayer::permissive();

    Router::new()
        .merge(routes::health::router())
        .merge(routes::attendees::router())
        .merge(routes::queue::router())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(Arc::new(state))
}

/// Run the HTTP server.
///
/// # Example
///
/// ```ignore
/// let config = ServerConfig::default();
/// run_server(config).await?;
/// ```
pub async fn run_server(config: ServerConfig) -> Result<()> {
    let pool = pool::connect(&config.db_path)
        .await
        .with_context(|| format!("failed to open database at {}", config.db_path.display()))?;

    migrations::run(&pool).await?;
    migrations::seed_if_empty(&pool).await?;

    let app = build_router(AppState { pool });

    let listener = TcpListener::bind(config.bind_addr).await?;
    tracing::info!("registry listening on {}", config.bind_addr);
    tracing::info!("database: {}", config.db_path.display());

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("server shutdown complete");
    Ok(())
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, starting shutdown");
        }
        _ = terminate => {
            tracing::info!("Received SIGTERM, starting shutdown");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use serde_json::{json, Value};
    use tower::ServiceExt;

    async fn test_app() -> Router {
        let pool = pool::connect_in_memory().await.expect("pool");
        migrations::run(&pool).await.expect("migrations");
        build_router(AppState { pool })
    }

    async fn request(
        app: &Router,
        method: &str,
        uri: &str,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let builder = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(json) => builder
                .header("content-type", "application/json")
                .body(Body::from(json.to_string()))
                .expect("request"),
            None => builder.body(Body::empty()).expect("request"),
        };

        let response = app.clone().oneshot(request).await.expect("response");
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body");
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).expect("json body")
        };
        (status, value)
    }

    #[tokio::test]
    async fn health_endpoint_responds() {
        let app = test_app().await;

        let (status, body) = request(&app, "GET", "/health", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
    }

    #[tokio::test]
    async fn create_then_fetch_attendee() {
        let app = test_app().await;

        let (status, body) = request(
            &app,
            "POST",
            "/api/attendees",
            Some(json!({ "name": "Ada", "queue_number": 1 })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body, json!({ "message": "Attendee added" }));

        let (status, body) = request(&app, "GET", "/api/attendees/1", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["name"], "Ada");
        assert_eq!(body["queue_number"], 1);
        assert_eq!(body["key_ready"], false);
        assert_eq!(body["key_collected"], false);
        assert_eq!(body["ready_timestamp"], Value::Null);

        let (status, body) = request(&app, "GET", "/api/attendees", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body.as_array().expect("array").len(), 1);
    }

    #[tokio::test]
    async fn unknown_attendee_is_404() {
        let app = test_app().await;

        let (status, body) = request(&app, "GET", "/api/attendees/42", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body, json!({ "error": "Attendee not found" }));
    }

    #[tokio::test]
    async fn create_without_required_fields_is_400() {
        let app = test_app().await;

        let (status, body) = request(
            &app,
            "POST",
            "/api/attendees",
            Some(json!({ "name": "Ada" })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, json!({ "error": "Name and queue_number required" }));
    }

    #[tokio::test]
    async fn create_with_empty_name_is_400() {
        let app = test_app().await;

        let (status, body) = request(
            &app,
            "POST",
            "/api/attendees",
            Some(json!({ "name": "", "queue_number": 1 })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, json!({ "error": "name cannot be empty" }));
    }

    #[tokio::test]
    async fn create_duplicate_queue_number_is_400() {
        let app = test_app().await;

        request(
            &app,
            "POST",
            "/api/attendees",
            Some(json!({ "name": "Ada", "queue_number": 1 })),
        )
        .await;
        let (status, body) = request(
            &app,
            "POST",
            "/api/attendees",
            Some(json!({ "name": "Grace", "queue_number": 1 })),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, json!({ "error": "queue number 1 is already taken" }));
    }

    #[tokio::test]
    async fn update_toggles_key_ready_and_timestamp() {
        let app = test_app().await;

        request(
            &app,
            "POST",
            "/api/attendees",
            Some(json!({ "name": "Ada", "queue_number": 1 })),
        )
        .await;

        let (status, body) = request(
            &app,
            "PUT",
            "/api/attendees/1",
            Some(json!({ "key_ready": true })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({ "message": "Attendee updated" }));

        let (_, body) = request(&app, "GET", "/api/attendees/1", None).await;
        assert_eq!(body["key_ready"], true);
        assert!(body["ready_timestamp"].is_string());

        request(
            &app,
            "PUT",
            "/api/attendees/1",
            Some(json!({ "key_ready": false })),
        )
        .await;
        let (_, body) = request(&app, "GET", "/api/attendees/1", None).await;
        assert_eq!(body["key_ready"], false);
        assert_eq!(body["ready_timestamp"], Value::Null);
    }

    #[tokio::test]
    async fn update_without_fields_is_400() {
        let app = test_app().await;

        request(
            &app,
            "POST",
            "/api/attendees",
            Some(json!({ "name": "Ada", "queue_number": 1 })),
        )
        .await;
        let (status, body) = request(&app, "PUT", "/api/attendees/1", Some(json!({}))).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, json!({ "error": "No valid fields to update" }));
    }

    #[tokio::test]
    async fn update_unknown_attendee_is_404() {
        let app = test_app().await;

        let (status, body) = request(
            &app,
            "PUT",
            "/api/attendees/42",
            Some(json!({ "key_ready": true })),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body, json!({ "error": "Attendee not found" }));
    }

    #[tokio::test]
    async fn ready_and_missed_snapshots() {
        let app = test_app().await;

        let (status, body) = request(&app, "GET", "/api/ready", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({ "ready_number": null }));

        let (status, body) = request(&app, "GET", "/api/missed", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({ "missed_numbers": [] }));

        request(
            &app,
            "POST",
            "/api/attendees",
            Some(json!({ "name": "Ada", "queue_number": 7 })),
        )
        .await;
        request(
            &app,
            "PUT",
            "/api/attendees/7",
            Some(json!({ "key_ready": true })),
        )
        .await;

        let (_, body) = request(&app, "GET", "/api/ready", None).await;
        assert_eq!(body, json!({ "ready_number": 7 }));

        // Freshly readied, so nothing has aged past the missed window.
        let (_, body) = request(&app, "GET", "/api/missed", None).await;
        assert_eq!(body, json!({ "missed_numbers": [] }));

        request(
            &app,
            "PUT",
            "/api/attendees/7",
            Some(json!({ "key_collected": true })),
        )
        .await;
        let (_, body) = request(&app, "GET", "/api/ready", None).await;
        assert_eq!(body, json!({ "ready_number": null }));
    }
}
