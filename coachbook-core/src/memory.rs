use crate::error::BookingError;
use crate::repository::BookingStore;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use coachbook_domain::booking::Booking;
use coachbook_domain::status::{AttendanceStatus, PaymentStatus};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::Mutex;
use uuid::Uuid;

/// In-memory booking store used by tests and local runs.
///
/// Enforces the same optimistic-concurrency contract a real backend would:
/// a status write against a stale `updated_at` is rejected.
#[derive(Default)]
pub struct MemoryBookingStore {
    bookings: Mutex<HashMap<Uuid, Booking>>,
    fail_creates: AtomicBool,
}

impl MemoryBookingStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes the next `create_booking` calls fail, to exercise the
    /// release-lock-on-storage-failure path.
    pub fn fail_creates(&self, fail: bool) {
        self.fail_creates.store(fail, Ordering::SeqCst);
    }
}

#[async_trait]
impl BookingStore for MemoryBookingStore {
    async fn create_booking(&self, booking: Booking) -> Result<Booking, BookingError> {
        if self.fail_creates.load(Ordering::SeqCst) {
            return Err(BookingError::Store("simulated create failure".into()));
        }

        let mut bookings = self.bookings.lock().await;
        if bookings.contains_key(&booking.id) {
            return Err(BookingError::Store(format!(
                "booking {} already exists",
                booking.id
            )));
        }
        bookings.insert(booking.id, booking.clone());
        Ok(booking)
    }

    async fn get_booking(&self, id: Uuid) -> Result<Option<Booking>, BookingError> {
        Ok(self.bookings.lock().await.get(&id).cloned())
    }

    async fn update_booking_status(
        &self,
        id: Uuid,
        payment: Option<PaymentStatus>,
        attendance: Option<AttendanceStatus>,
        expected_updated_at: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> Result<Booking, BookingError> {
        let mut bookings = self.bookings.lock().await;
        let booking = bookings.get_mut(&id).ok_or(BookingError::NotFound(id))?;

        if booking.updated_at != expected_updated_at {
            return Err(BookingError::StaleWrite);
        }

        let next_payment = payment.unwrap_or(booking.payment_status);
        let next_attendance = attendance.unwrap_or(booking.attendance_status);
        booking.apply_statuses(next_payment, next_attendance, now);

        Ok(booking.clone())
    }

    async fn clear_lock_session(&self, id: Uuid) -> Result<(), BookingError> {
        let mut bookings = self.bookings.lock().await;
        let booking = bookings.get_mut(&id).ok_or(BookingError::NotFound(id))?;
        booking.clear_lock();
        Ok(())
    }

    async fn list_stale_pending(
        &self,
        cutoff: DateTime<Utc>,
    ) -> Result<Vec<Booking>, BookingError> {
        let bookings = self.bookings.lock().await;
        Ok(bookings
            .values()
            .filter(|b| {
                b.payment_status == PaymentStatus::Unpaid
                    && b.attendance_status == AttendanceStatus::Pending
                    && b.created_at < cutoff
            })
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use coachbook_domain::booking::BookingDraft;
    use coachbook_domain::lock::SlotKey;
    use chrono::{NaiveDate, NaiveTime};

    fn draft() -> BookingDraft {
        BookingDraft {
            slot: SlotKey::new(
                NaiveDate::from_ymd_opt(2025, 8, 1).unwrap(),
                NaiveTime::from_hms_opt(10, 0, 0).unwrap(),
            ),
            parent_id: Some(7),
            amount: 4000,
        }
    }

    #[tokio::test]
    async fn test_stale_write_rejected() {
        let store = MemoryBookingStore::new();
        let t0 = Utc.with_ymd_and_hms(2025, 8, 1, 9, 0, 0).unwrap();
        let booking = Booking::from_draft(Uuid::new_v4(), &draft(), "sess-a", t0);
        let id = booking.id;
        store.create_booking(booking).await.unwrap();

        let t1 = t0 + chrono::Duration::seconds(5);
        let updated = store
            .update_booking_status(id, Some(PaymentStatus::ReservationPending), None, t0, t1)
            .await
            .unwrap();
        assert_eq!(updated.payment_status, PaymentStatus::ReservationPending);

        // A write based on the original read must be rejected.
        let err = store
            .update_booking_status(id, Some(PaymentStatus::ReservationPaid), None, t0, t1)
            .await
            .unwrap_err();
        assert!(matches!(err, BookingError::StaleWrite));

        // Retrying with the fresh token succeeds.
        store
            .update_booking_status(
                id,
                Some(PaymentStatus::ReservationPaid),
                Some(AttendanceStatus::Confirmed),
                updated.updated_at,
                t1,
            )
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_list_stale_pending_filters() {
        let store = MemoryBookingStore::new();
        let t0 = Utc.with_ymd_and_hms(2025, 8, 1, 9, 0, 0).unwrap();

        let stale = Booking::from_draft(Uuid::new_v4(), &draft(), "sess-a", t0);
        let stale_id = stale.id;
        store.create_booking(stale).await.unwrap();

        let mut paid = Booking::from_draft(Uuid::new_v4(), &draft(), "sess-b", t0);
        paid.apply_statuses(
            PaymentStatus::ReservationPaid,
            AttendanceStatus::Confirmed,
            t0,
        );
        store.create_booking(paid).await.unwrap();

        let found = store
            .list_stale_pending(t0 + chrono::Duration::hours(1))
            .await
            .unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id, stale_id);
    }
}
