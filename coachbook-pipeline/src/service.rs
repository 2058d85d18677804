use crate::policy::{AbandonedPolicy, PipelinePolicy};
use chrono::{NaiveDate, NaiveTime};
use coachbook_core::clock::Clock;
use coachbook_core::error::BookingError;
use coachbook_core::repository::BookingStore;
use coachbook_domain::booking::{Booking, BookingDraft};
use coachbook_domain::events::PaymentEvent;
use coachbook_domain::lock::{LockHandle, SlotKey};
use coachbook_domain::status::{AttendanceStatus, BookingCategory};
use coachbook_lock::SlotLockStore;
use coachbook_status::synchronizer::{
    combination_warnings, synchronize, StatusChange, StatusPair, SyncOptions,
};
use coachbook_status::{describe, resolve};
use serde::Serialize;
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

/// Outcome of a status mutation: the updated booking plus the warnings
/// the synchronizer attached to it.
#[derive(Debug, Clone, Serialize)]
pub struct StatusChangeResult {
    pub booking: Booking,
    pub category: BookingCategory,
    pub warnings: Vec<String>,
}

/// Read-side view of a booking's derived state.
#[derive(Debug, Clone, Serialize)]
pub struct StatusSummary {
    pub category: BookingCategory,
    pub description: String,
    pub warnings: Vec<String>,
}

/// Orchestrates the checkout state machine:
/// `SlotRequested -> LockHeld -> BookingCreated -> (PaymentSettled | Abandoned)`.
///
/// Collaborators are injected; nothing here touches ambient state, so the
/// whole pipeline runs deterministically under a manual clock and
/// in-memory stores.
pub struct BookingService {
    locks: Arc<dyn SlotLockStore>,
    store: Arc<dyn BookingStore>,
    clock: Arc<dyn Clock>,
    policy: PipelinePolicy,
}

impl BookingService {
    pub fn new(
        locks: Arc<dyn SlotLockStore>,
        store: Arc<dyn BookingStore>,
        clock: Arc<dyn Clock>,
        policy: PipelinePolicy,
    ) -> Self {
        Self {
            locks,
            store,
            clock,
            policy,
        }
    }

    /// `SlotRequested -> LockHeld`. A busy slot surfaces immediately as
    /// `SlotBusy`; the caller re-polls availability, there is no retry
    /// loop here.
    pub async fn request_slot(
        &self,
        date: NaiveDate,
        time: NaiveTime,
        session_id: &str,
        parent_id: Option<i64>,
    ) -> Result<LockHandle, BookingError> {
        let key = SlotKey::new(date, time);
        let handle = self
            .locks
            .acquire(key, session_id, parent_id, self.policy.lock_ttl)
            .await?;
        info!(slot = %key, session = session_id, "slot reserved for checkout");
        Ok(handle)
    }

    /// Explicit release by the owning session (checkout abandoned by the
    /// user before a booking existed).
    pub async fn release_slot(
        &self,
        date: NaiveDate,
        time: NaiveTime,
        session_id: &str,
    ) -> Result<(), BookingError> {
        let handle = LockHandle {
            key: SlotKey::new(date, time),
            session_id: session_id.to_string(),
            expires_at: self.clock.now(),
        };
        self.locks.release(&handle).await
    }

    pub async fn is_slot_free(&self, date: NaiveDate, time: NaiveTime) -> Result<bool, BookingError> {
        self.locks.is_free(SlotKey::new(date, time)).await
    }

    /// `LockHeld -> BookingCreated`. Revalidates the lock (atomically, by
    /// renewing it) so a lapsed reservation fails with `LockExpired`
    /// instead of silently double-booking. On storage failure the lock is
    /// released immediately so the slot does not appear falsely reserved.
    pub async fn create_booking_for_lock(
        &self,
        handle: &LockHandle,
        draft: &BookingDraft,
    ) -> Result<Booking, BookingError> {
        if draft.slot != handle.key {
            return Err(BookingError::Validation(format!(
                "draft slot {} does not match locked slot {}",
                draft.slot, handle.key
            )));
        }

        // Renewing proves the lock is still live and ours, and keeps it
        // held while storage does its work.
        let handle = self.locks.renew(handle, self.policy.lock_ttl).await?;

        let now = self.clock.now();
        let booking = Booking::from_draft(Uuid::new_v4(), draft, &handle.session_id, now);

        match self.store.create_booking(booking).await {
            Ok(created) => {
                info!(booking = %created.id, slot = %created.slot, "booking created");
                Ok(created)
            }
            Err(e) => {
                warn!(slot = %handle.key, error = %e, "storage failed; releasing slot lock");
                if let Err(release_err) = self.locks.release(&handle).await {
                    warn!(slot = %handle.key, error = %release_err, "failed to release lock after storage error");
                }
                Err(e)
            }
        }
    }

    /// Applies one status change through the synchronizer with optimistic
    /// concurrency. When the booking settles or reaches a terminal
    /// category, its slot lock is released and the lock reference cleared.
    pub async fn apply_status_change(
        &self,
        booking_id: Uuid,
        change: StatusChange,
        options: SyncOptions,
    ) -> Result<StatusChangeResult, BookingError> {
        let booking = self
            .store
            .get_booking(booking_id)
            .await?
            .ok_or(BookingError::NotFound(booking_id))?;

        let current = StatusPair::new(booking.payment_status, booking.attendance_status);
        let outcome = synchronize(current, change, options)?;

        let updated = self
            .store
            .update_booking_status(
                booking_id,
                Some(outcome.payment),
                Some(outcome.attendance),
                booking.updated_at,
                self.clock.now(),
            )
            .await?;

        for warning in &outcome.warnings {
            warn!(booking = %booking_id, "{}", warning);
        }

        let updated = if outcome.category.is_terminal() || outcome.payment.is_settled() {
            self.finalize_slot(updated).await?
        } else {
            updated
        };

        Ok(StatusChangeResult {
            booking: updated,
            category: outcome.category,
            warnings: outcome.warnings,
        })
    }

    /// Webhook entry point: the payment processor reported a status.
    pub async fn handle_payment_event(
        &self,
        event: &PaymentEvent,
    ) -> Result<StatusChangeResult, BookingError> {
        info!(booking = %event.booking_id, status = %event.status, "payment event received");
        self.apply_status_change(
            event.booking_id,
            StatusChange::Payment(event.status),
            SyncOptions::default(),
        )
        .await
    }

    pub async fn get_booking(&self, booking_id: Uuid) -> Result<Booking, BookingError> {
        self.store
            .get_booking(booking_id)
            .await?
            .ok_or(BookingError::NotFound(booking_id))
    }

    /// Recomputes the derived state; the category is never read from
    /// storage.
    pub fn describe_status(&self, booking: &Booking) -> StatusSummary {
        let pair = StatusPair::new(booking.payment_status, booking.attendance_status);
        let category = resolve(pair.payment, pair.attendance);
        StatusSummary {
            category,
            description: describe(category, pair.payment, pair.attendance),
            warnings: combination_warnings(pair),
        }
    }

    /// Purges expired lock entries. Liveness never depends on this.
    pub async fn sweep_locks(&self) -> Result<usize, BookingError> {
        self.locks.sweep_expired().await
    }

    /// `BookingCreated -> Abandoned` housekeeping. Under `LeavePending`
    /// this does nothing; under `CancelAfter`, bookings still in
    /// `(unpaid, pending)` whose slot lock has lapsed and whose grace
    /// period has passed are cancelled through the normal synchronizer
    /// path.
    pub async fn reap_abandoned(&self) -> Result<usize, BookingError> {
        let grace = match self.policy.abandoned {
            AbandonedPolicy::LeavePending => return Ok(0),
            AbandonedPolicy::CancelAfter(grace) => grace,
        };

        let cutoff = self.clock.now()
            - chrono::Duration::milliseconds(grace.as_millis() as i64)
            - chrono::Duration::milliseconds(self.policy.lock_ttl.as_millis() as i64);

        let mut reaped = 0;
        for booking in self.store.list_stale_pending(cutoff).await? {
            if !self.locks.is_free(booking.slot).await? {
                // Still inside an active checkout; leave it alone.
                continue;
            }
            match self
                .apply_status_change(
                    booking.id,
                    StatusChange::Attendance(AttendanceStatus::Cancelled),
                    SyncOptions::default(),
                )
                .await
            {
                Ok(_) => {
                    info!(booking = %booking.id, "abandoned booking cancelled");
                    reaped += 1;
                }
                Err(BookingError::StaleWrite) | Err(BookingError::TerminalState(_)) => {
                    // Someone got to it first; that is the desired end state.
                }
                Err(e) => return Err(e),
            }
        }
        Ok(reaped)
    }

    async fn finalize_slot(&self, booking: Booking) -> Result<Booking, BookingError> {
        let Some(session_id) = booking.lock_session_id.clone() else {
            return Ok(booking);
        };

        let handle = LockHandle {
            key: booking.slot,
            session_id,
            expires_at: self.clock.now(),
        };
        self.locks.release(&handle).await?;
        self.store.clear_lock_session(booking.id).await?;
        info!(booking = %booking.id, slot = %booking.slot, "slot lock finalized");

        self.store
            .get_booking(booking.id)
            .await?
            .ok_or(BookingError::NotFound(booking.id))
    }
}
