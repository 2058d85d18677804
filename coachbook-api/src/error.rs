use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use coachbook_core::error::BookingError;
use serde_json::json;

#[derive(Debug)]
pub enum AppError {
    Booking(BookingError),
    BadRequest(String),
    Internal(anyhow::Error),
}

impl From<BookingError> for AppError {
    fn from(err: BookingError) -> Self {
        Self::Booking(err)
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal(err)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            AppError::Booking(err) => booking_error_response(err),
            AppError::BadRequest(msg) => {
                (StatusCode::BAD_REQUEST, Json(json!({ "error": msg }))).into_response()
            }
            AppError::Internal(err) => {
                tracing::error!("Internal Server Error: {}", err);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({ "error": "Internal Server Error" })),
                )
                    .into_response()
            }
        }
    }
}

fn booking_error_response(err: BookingError) -> Response {
    match &err {
        // Slot contention surfaces immediately as "pick another time".
        BookingError::SlotBusy { expires_at } => (
            StatusCode::CONFLICT,
            Json(json!({
                "error": err.to_string(),
                "expires_at": expires_at,
            })),
        )
            .into_response(),
        BookingError::LockExpired => {
            (StatusCode::GONE, Json(json!({ "error": err.to_string() }))).into_response()
        }
        BookingError::Validation(_) => (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(json!({ "error": err.to_string() })),
        )
            .into_response(),
        BookingError::TerminalState(_) | BookingError::StaleWrite => (
            StatusCode::CONFLICT,
            Json(json!({ "error": err.to_string() })),
        )
            .into_response(),
        BookingError::NotFound(_) => (
            StatusCode::NOT_FOUND,
            Json(json!({ "error": err.to_string() })),
        )
            .into_response(),
        BookingError::Store(msg) => {
            tracing::error!("storage error: {}", msg);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": "Internal Server Error" })),
            )
                .into_response()
        }
    }
}
