pub mod memory;
pub mod redis_repo;

pub use memory::MemoryLockStore;
pub use redis_repo::RedisLockStore;

use async_trait::async_trait;
use coachbook_core::error::BookingError;
use coachbook_domain::lock::{LockHandle, SlotKey};
use std::time::Duration;

/// Concurrency-safe registry of active reservation locks, keyed by slot.
///
/// `acquire` is linearizable per slot key: two concurrent callers for the
/// same slot can never both receive a live handle. Implementations must
/// make the acquire step a single atomic operation against their backing
/// store, not a read-then-write pair.
#[async_trait]
pub trait SlotLockStore: Send + Sync {
    /// Atomic compare-and-set on the slot key. Fails with `SlotBusy` if a
    /// live lock for a different session exists; idempotently renews if
    /// the live lock already belongs to `session_id`.
    async fn acquire(
        &self,
        key: SlotKey,
        session_id: &str,
        parent_id: Option<i64>,
        ttl: Duration,
    ) -> Result<LockHandle, BookingError>;

    /// Extends the lock's expiry. Fails with `LockExpired` if the lock
    /// already lapsed or was reclaimed by another session.
    async fn renew(&self, handle: &LockHandle, ttl: Duration) -> Result<LockHandle, BookingError>;

    /// Removes the lock if the caller owns it; no-op if already gone.
    async fn release(&self, handle: &LockHandle) -> Result<(), BookingError>;

    /// True when no live lock exists for the slot. Expiry is evaluated
    /// lazily at read time.
    async fn is_free(&self, key: SlotKey) -> Result<bool, BookingError>;

    /// Purges stale entries to bound store size; returns how many were
    /// removed. Liveness never depends on this running.
    async fn sweep_expired(&self) -> Result<usize, BookingError>;
}
