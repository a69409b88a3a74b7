//! API error types with IntoResponse
//!
//! Every failure renders as `{"error": <text>}`. Missed lookups return a
//! fixed 404 message; storage failures keep their raw error text behind a
//! 400, with conflicts not distinguished on the wire.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

use crate::db::repos::DbError;
use crate::models::ValidationError;

/// API error type with automatic HTTP status mapping
#[derive(Debug)]
pub enum ApiError {
    /// Validation failed (400)
    Validation(ValidationError),

    /// Required field(s) missing from the request (400)
    InvalidInput { message: &'static str },

    /// No attendee for the given queue number (404)
    NotFound,

    /// Queue number collision (400, surfaced as a storage error)
    Conflict { message: String },

    /// Storage failure (400, logged)
    Database(DbError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            Self::Validation(e) => (StatusCode::BAD_REQUEST, e.to_string()),
            Self::InvalidInput { message } => (StatusCode::BAD_REQUEST, (*message).to_string()),
            Self::NotFound => (StatusCode::NOT_FOUND, "Attendee not found".to_string()),
            Self::Conflict { message } => (StatusCode::BAD_REQUEST, message.clone()),
            Self::Database(e) => {
                tracing::error!("database error: {}", e);
                (StatusCode::BAD_REQUEST, e.to_string())
            }
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}

impl From<ValidationError> for ApiError {
    fn from(e: ValidationError) -> Self {
        Self::Validation(e)
    }
}

impl From<DbError> for ApiError {
    fn from(e: DbError) -> Self {
        match e {
            DbError::NotFound { .. } => Self::NotFound,
            conflict @ DbError::Conflict { .. } => Self::Conflict {
                message: conflict.to_string(),
            },
            other => Self::Database(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body");
        serde_json::from_slice(&bytes).expect("json body")
    }

    #[tokio::test]
    async fn not_found_is_404_with_fixed_message() {
        let response = ApiError::NotFound.into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let body = body_json(response).await;
        assert_eq!(body, json!({ "error": "Attendee not found" }));
    }

    #[tokio::test]
    async fn invalid_input_is_400() {
        let err = ApiError::InvalidInput {
            message: "Name and queue_number required",
        };
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn conflict_renders_as_400_storage_error() {
        let err = ApiError::from(DbError::Conflict { queue_number: 9 });
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let body = body_json(response).await;
        assert_eq!(body, json!({ "error": "queue number 9 is already taken" }));
    }
}
