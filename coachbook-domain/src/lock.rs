use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A unique coaching opportunity: one coach, one date, one start time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SlotKey {
    pub date: NaiveDate,
    pub time: NaiveTime,
}

impl SlotKey {
    pub fn new(date: NaiveDate, time: NaiveTime) -> Self {
        Self { date, time }
    }

    /// Canonical `{date}_{time}` form used as the lock-map / Redis key.
    pub fn storage_key(&self) -> String {
        format!("{}_{}", self.date, self.time.format("%H:%M"))
    }
}

impl fmt::Display for SlotKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.date, self.time.format("%H:%M"))
    }
}

/// A time-bounded claim on a slot during checkout. Not a booking.
///
/// At most one live (non-expired) lock may exist per slot at any instant.
/// Liveness is evaluated lazily: `now > expires_at` is the sole test.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SlotLock {
    pub key: SlotKey,
    /// Identifies the holding checkout session, not a person.
    pub session_id: String,
    pub parent_id: Option<i64>,
    pub acquired_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl SlotLock {
    pub fn is_live(&self, now: DateTime<Utc>) -> bool {
        now <= self.expires_at
    }

    pub fn owned_by(&self, session_id: &str) -> bool {
        self.session_id == session_id
    }

    pub fn handle(&self) -> LockHandle {
        LockHandle {
            key: self.key,
            session_id: self.session_id.clone(),
            expires_at: self.expires_at,
        }
    }
}

/// Caller-facing proof of acquisition, passed back for renew/release and
/// into booking creation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LockHandle {
    pub key: SlotKey,
    pub session_id: String,
    pub expires_at: DateTime<Utc>,
}
