use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{patch, post},
    Json, Router,
};
use coachbook_domain::booking::{Booking, BookingDraft};
use coachbook_domain::lock::LockHandle;
use coachbook_domain::status::{AttendanceStatus, BookingCategory, PaymentStatus};
use coachbook_pipeline::StatusChangeResult;
use coachbook_status::synchronizer::{StatusChange, SyncOptions};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::AppError;
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/v1/bookings", post(create_booking))
        .route(
            "/v1/bookings/{id}/status",
            patch(apply_status_change).get(describe_status),
        )
}

#[derive(Debug, Deserialize)]
struct CreateBookingRequest {
    lock: LockHandle,
    parent_id: Option<i64>,
    /// Reservation fee in minor currency units.
    amount: i64,
}

async fn create_booking(
    State(state): State<AppState>,
    Json(req): Json<CreateBookingRequest>,
) -> Result<(StatusCode, Json<Booking>), AppError> {
    let draft = BookingDraft {
        slot: req.lock.key,
        parent_id: req.parent_id,
        amount: req.amount,
    };
    let booking = state
        .service
        .create_booking_for_lock(&req.lock, &draft)
        .await?;
    Ok((StatusCode::CREATED, Json(booking)))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "lowercase")]
enum StatusFieldDto {
    Payment,
    Attendance,
}

#[derive(Debug, Deserialize)]
struct ApplyStatusRequest {
    field: StatusFieldDto,
    value: String,
    #[serde(default)]
    assume_paid: bool,
}

async fn apply_status_change(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<ApplyStatusRequest>,
) -> Result<Json<StatusChangeResult>, AppError> {
    let change = match req.field {
        StatusFieldDto::Payment => {
            let status: PaymentStatus = req
                .value
                .parse()
                .map_err(|e: coachbook_domain::StatusParseError| AppError::BadRequest(e.to_string()))?;
            StatusChange::Payment(status)
        }
        StatusFieldDto::Attendance => {
            let status: AttendanceStatus = req
                .value
                .parse()
                .map_err(|e: coachbook_domain::StatusParseError| AppError::BadRequest(e.to_string()))?;
            StatusChange::Attendance(status)
        }
    };

    let result = state
        .service
        .apply_status_change(
            id,
            change,
            SyncOptions {
                assume_paid: req.assume_paid,
            },
        )
        .await?;
    Ok(Json(result))
}

#[derive(Debug, Serialize)]
struct DescribeStatusResponse {
    booking_id: Uuid,
    category: BookingCategory,
    description: String,
    warnings: Vec<String>,
}

async fn describe_status(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<DescribeStatusResponse>, AppError> {
    let booking = state.service.get_booking(id).await?;
    let summary = state.service.describe_status(&booking);
    Ok(Json(DescribeStatusResponse {
        booking_id: booking.id,
        category: summary.category,
        description: summary.description,
        warnings: summary.warnings,
    }))
}
