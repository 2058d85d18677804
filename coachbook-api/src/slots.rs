use axum::{
    extract::{Path, State},
    routing::{get, post},
    Json, Router,
};
use chrono::{NaiveDate, NaiveTime};
use coachbook_domain::lock::LockHandle;
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::error::AppError;
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/v1/slots/request", post(request_slot))
        .route("/v1/slots/release", post(release_slot))
        .route(
            "/v1/slots/{date}/{time}/availability",
            get(slot_availability),
        )
}

#[derive(Debug, Deserialize)]
struct RequestSlotBody {
    date: NaiveDate,
    time: NaiveTime,
    session_id: String,
    parent_id: Option<i64>,
}

#[derive(Debug, Serialize)]
struct RequestSlotResponse {
    lock: LockHandle,
}

async fn request_slot(
    State(state): State<AppState>,
    Json(body): Json<RequestSlotBody>,
) -> Result<Json<RequestSlotResponse>, AppError> {
    let lock = state
        .service
        .request_slot(body.date, body.time, &body.session_id, body.parent_id)
        .await?;
    Ok(Json(RequestSlotResponse { lock }))
}

#[derive(Debug, Deserialize)]
struct ReleaseSlotBody {
    date: NaiveDate,
    time: NaiveTime,
    session_id: String,
}

async fn release_slot(
    State(state): State<AppState>,
    Json(body): Json<ReleaseSlotBody>,
) -> Result<Json<serde_json::Value>, AppError> {
    state
        .service
        .release_slot(body.date, body.time, &body.session_id)
        .await?;
    Ok(Json(json!({ "released": true })))
}

async fn slot_availability(
    State(state): State<AppState>,
    Path((date, time)): Path<(NaiveDate, String)>,
) -> Result<Json<serde_json::Value>, AppError> {
    let time = parse_time(&time)?;
    let available = state.service.is_slot_free(date, time).await?;
    Ok(Json(json!({ "available": available })))
}

/// Accepts both `10:00` and `10:00:00` path segments.
fn parse_time(raw: &str) -> Result<NaiveTime, AppError> {
    NaiveTime::parse_from_str(raw, "%H:%M:%S")
        .or_else(|_| NaiveTime::parse_from_str(raw, "%H:%M"))
        .map_err(|_| AppError::BadRequest(format!("invalid time: {raw}")))
}
