use crate::error::BookingError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use coachbook_domain::booking::Booking;
use coachbook_domain::status::{AttendanceStatus, PaymentStatus};
use uuid::Uuid;

/// Repository seam for booking persistence.
///
/// Each call is assumed atomic on its own but calls are not transactional
/// across each other; the pipeline treats every step as independently
/// retriable. Status writes are optimistic: `expected_updated_at` must
/// match the stored token or the write fails with `StaleWrite`.
#[async_trait]
pub trait BookingStore: Send + Sync {
    async fn create_booking(&self, booking: Booking) -> Result<Booking, BookingError>;

    async fn get_booking(&self, id: Uuid) -> Result<Option<Booking>, BookingError>;

    async fn update_booking_status(
        &self,
        id: Uuid,
        payment: Option<PaymentStatus>,
        attendance: Option<AttendanceStatus>,
        expected_updated_at: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> Result<Booking, BookingError>;

    /// Clears the lock reference once a booking is finalized.
    async fn clear_lock_session(&self, id: Uuid) -> Result<(), BookingError>;

    /// Bookings still in `(unpaid, pending)` created before `cutoff`,
    /// candidates for the abandoned-booking reaper.
    async fn list_stale_pending(
        &self,
        cutoff: DateTime<Utc>,
    ) -> Result<Vec<Booking>, BookingError>;
}
