use crate::lock::SlotKey;
use crate::status::{AttendanceStatus, PaymentStatus};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The booking aggregate.
///
/// The lifecycle label is never stored here; it is recomputed from the two
/// status fields at read time. `updated_at` is monotonically increasing and
/// doubles as the optimistic-concurrency token for status writes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Booking {
    pub id: Uuid,
    pub slot: SlotKey,
    pub payment_status: PaymentStatus,
    pub attendance_status: AttendanceStatus,
    /// Session that reserved the slot for this booking; cleared once the
    /// booking is finalized and the lock released.
    pub lock_session_id: Option<String>,
    pub parent_id: Option<i64>,
    /// Reservation fee in minor currency units.
    pub amount: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Booking {
    /// A booking always starts life as `(unpaid, pending)`, the instant a
    /// slot lock is converted into a booking.
    pub fn from_draft(id: Uuid, draft: &BookingDraft, session_id: &str, now: DateTime<Utc>) -> Self {
        Self {
            id,
            slot: draft.slot,
            payment_status: PaymentStatus::Unpaid,
            attendance_status: AttendanceStatus::Pending,
            lock_session_id: Some(session_id.to_string()),
            parent_id: draft.parent_id,
            amount: draft.amount,
            created_at: now,
            updated_at: now,
        }
    }

    /// Applies synchronized statuses, keeping `updated_at` strictly
    /// increasing even when the clock has not advanced.
    pub fn apply_statuses(
        &mut self,
        payment: PaymentStatus,
        attendance: AttendanceStatus,
        now: DateTime<Utc>,
    ) {
        self.payment_status = payment;
        self.attendance_status = attendance;
        self.updated_at = if now > self.updated_at {
            now
        } else {
            self.updated_at + chrono::Duration::milliseconds(1)
        };
    }

    pub fn clear_lock(&mut self) {
        self.lock_session_id = None;
    }
}

/// Caller-supplied fields for booking creation; everything else is derived.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookingDraft {
    pub slot: SlotKey,
    pub parent_id: Option<i64>,
    /// Reservation fee in minor currency units.
    pub amount: i64,
}
