use crate::status::PaymentStatus;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Asynchronous payment-status event delivered by the payment processor.
/// Only the terminal status value matters here; transport details stay in
/// the webhook layer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentEvent {
    pub booking_id: Uuid,
    pub status: PaymentStatus,
    /// Processor-side reference (checkout session / transaction id).
    pub reference: Option<String>,
    pub received_at: DateTime<Utc>,
}
