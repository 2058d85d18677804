use chrono::{DateTime, Utc};
use coachbook_domain::status::BookingCategory;
use uuid::Uuid;

/// Error taxonomy of the booking core.
///
/// Concurrency and validation errors carry decisions the caller must act
/// on; they are always returned, never logged and swallowed.
#[derive(Debug, thiserror::Error)]
pub enum BookingError {
    /// Another live lock holds the slot. Recoverable: pick another slot
    /// or retry once the blocking lock expires.
    #[error("slot is locked by another session until {expires_at}")]
    SlotBusy { expires_at: DateTime<Utc> },

    /// The caller's reservation lapsed (or was reclaimed) before the
    /// pipeline step completed. Recoverable by re-requesting the slot.
    #[error("slot lock expired or is no longer owned by this session")]
    LockExpired,

    /// Proposed status combination is inconsistent. Surfaced with the
    /// specific rule violated, never silently corrected.
    #[error("invalid status combination: {0}")]
    Validation(String),

    /// Mutation attempted on a completed/cancelled/failed booking.
    /// Always fatal to the request; the booking is left untouched.
    #[error("booking is {0} and can no longer be modified")]
    TerminalState(BookingCategory),

    /// Optimistic-concurrency mismatch. Recoverable: re-fetch and retry.
    #[error("booking was updated concurrently; re-fetch and retry")]
    StaleWrite,

    #[error("booking not found: {0}")]
    NotFound(Uuid),

    #[error("storage error: {0}")]
    Store(String),
}
