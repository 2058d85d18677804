use axum::{extract::State, routing::post, Json, Router};
use chrono::Utc;
use coachbook_domain::events::PaymentEvent;
use coachbook_domain::status::PaymentStatus;
use coachbook_pipeline::StatusChangeResult;
use serde::Deserialize;
use uuid::Uuid;

use crate::error::AppError;
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new().route("/v1/webhooks/payments", post(handle_payment_webhook))
}

#[derive(Debug, Deserialize)]
pub struct PaymentWebhook {
    pub booking_id: Uuid,
    pub status: PaymentStatus,
    /// Processor-side reference (checkout session / transaction id).
    pub reference: Option<String>,
}

/// POST /v1/webhooks/payments
/// Receives payment status updates from the payment processor. Only the
/// delivered status value matters here; signature verification and
/// transport concerns live at the gateway in front of this service.
async fn handle_payment_webhook(
    State(state): State<AppState>,
    Json(payload): Json<PaymentWebhook>,
) -> Result<Json<StatusChangeResult>, AppError> {
    tracing::info!(
        booking = %payload.booking_id,
        status = %payload.status,
        "received payment webhook"
    );

    let event = PaymentEvent {
        booking_id: payload.booking_id,
        status: payload.status,
        reference: payload.reference,
        received_at: Utc::now(),
    };

    let result = state.service.handle_payment_event(&event).await?;
    Ok(Json(result))
}
