//! Pickup queue snapshots

use std::sync::Arc;

use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};
use chrono::Utc;
use serde::Serialize;

use crate::db::repos::AttendeeRepo;
use crate::http::error::ApiError;
use crate::http::server::AppState;

/// Next ready queue number, or null when nobody is waiting
#[derive(Serialize)]
pub struct ReadyResponse {
    pub ready_number: Option<i64>,
}

/// Queue numbers whose keys have waited past the missed window
#[derive(Serialize)]
pub struct MissedResponse {
    pub missed_numbers: Vec<i64>,
}

/// GET /api/ready - FIFO head of the ready-but-uncollected set
async fn get_ready(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ReadyResponse>, ApiError> {
    let ready_number = AttendeeRepo::new(&state.pool).next_ready().await?;
    Ok(Json(ReadyResponse { ready_number }))
}

/// GET /api/missed - overdue pickups, computed fresh per call
async fn get_missed(
    State(state): State<Arc<AppState>>,
) -> Result<Json<MissedResponse>, ApiError> {
    let missed_numbers = AttendeeRepo::new(&state.pool).missed(Utc::now()).await?;
    Ok(Json(MissedResponse { missed_numbers }))
}

/// Queue routes
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/ready", get(get_ready))
        .route("/api/missed", get(get_missed))
}
