//! Attendee endpoints

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::db::repos::{Attendee, AttendeeRepo, AttendeeUpdate};
use crate::http::error::ApiError;
use crate::http::server::AppState;
use crate::models::AttendeeName;

/// Create attendee request
#[derive(Deserialize)]
pub struct CreateAttendeeRequest {
    pub name: Option<String>,
    pub queue_number: Option<i64>,
}

/// Partial update request; absent fields are left untouched
#[derive(Deserialize)]
pub struct UpdateAttendeeRequest {
    pub name: Option<String>,
    pub queue_number: Option<i64>,
    pub key_ready: Option<bool>,
    pub key_collected: Option<bool>,
}

/// Attendee response
#[derive(Serialize)]
pub struct AttendeeResponse {
    pub id: i64,
    pub name: String,
    pub queue_number: i64,
    pub key_ready: bool,
    pub key_collected: bool,
    pub ready_timestamp: Option<String>,
}

impl From<Attendee> for AttendeeResponse {
    fn from(a: Attendee) -> Self {
        Self {
            id: a.id,
            name: a.name,
            queue_number: a.queue_number,
            key_ready: a.key_ready,
            key_collected: a.key_collected,
            ready_timestamp: a.ready_timestamp.map(|t| t.to_rfc3339()),
        }
    }
}

/// Confirmation message response
#[derive(Serialize)]
pub struct MessageResponse {
    pub message: &'static str,
}

/// GET /api/attendees - list all attendees
async fn list_attendees(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<AttendeeResponse>>, ApiError> {
    let attendees = AttendeeRepo::new(&state.pool).list().await?;

    Ok(Json(
        attendees.into_iter().map(AttendeeResponse::from).collect(),
    ))
}

/// GET /api/attendees/{queue_number} - get a single attendee
async fn get_attendee(
    State(state): State<Arc<AppState>>,
    Path(queue_number): Path<i64>,
) -> Result<Json<AttendeeResponse>, ApiError> {
    let attendee = AttendeeRepo::new(&state.pool).get(queue_number).await?;
    Ok(Json(AttendeeResponse::from(attendee)))
}

/// POST /api/attendees - register a new attendee
async fn create_attendee(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateAttendeeRequest>,
) -> Result<(StatusCode, Json<MessageResponse>), ApiError> {
    let (name, queue_number) = match (req.name, req.queue_number) {
        (Some(name), Some(number)) => (name, number),
        _ => {
            return Err(ApiError::InvalidInput {
                message: "Name and queue_number required",
            })
        }
    };
    let name = AttendeeName::new(&name)?;

    AttendeeRepo::new(&state.pool)
        .create(&name, queue_number)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(MessageResponse {
            message: "Attendee added",
        }),
    ))
}

/// PUT /api/attendees/{queue_number} - apply a partial update
async fn update_attendee(
    State(state): State<Arc<AppState>>,
    Path(queue_number): Path<i64>,
    Json(req): Json<UpdateAttendeeRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    let fields = AttendeeUpdate {
        name: req.name,
        queue_number: req.queue_number,
        key_ready: req.key_ready,
        key_collected: req.key_collected,
    };
    if fields.is_empty() {
        return Err(ApiError::InvalidInput {
            message: "No valid fields to update",
        });
    }

    AttendeeRepo::new(&state.pool)
        .update(queue_number, &fields, Utc::now())
        .await?;

    Ok(Json(MessageResponse {
        message: "Attendee updated",
    }))
}

/// Attendee routes
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/attendees", get(list_attendees).post(create_attendee))
        .route(
            "/api/attendees/{queue_number}",
            get(get_attendee).put(update_attendee),
        )
}
