use crate::SlotLockStore;
use async_trait::async_trait;
use coachbook_core::clock::Clock;
use coachbook_core::error::BookingError;
use coachbook_domain::lock::{LockHandle, SlotKey, SlotLock};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::debug;

/// Single-process lock store: one mutex over the lock map, so every
/// operation is one critical section and per-key linearizability follows.
/// Time comes from the injected clock; unit tests drive it manually.
pub struct MemoryLockStore {
    clock: Arc<dyn Clock>,
    locks: Mutex<HashMap<SlotKey, SlotLock>>,
}

impl MemoryLockStore {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            clock,
            locks: Mutex::new(HashMap::new()),
        }
    }
}

#[async_trait]
impl SlotLockStore for MemoryLockStore {
    async fn acquire(
        &self,
        key: SlotKey,
        session_id: &str,
        parent_id: Option<i64>,
        ttl: Duration,
    ) -> Result<LockHandle, BookingError> {
        let now = self.clock.now();
        let mut locks = self.locks.lock().await;

        if let Some(existing) = locks.get(&key) {
            if existing.is_live(now) && !existing.owned_by(session_id) {
                return Err(BookingError::SlotBusy {
                    expires_at: existing.expires_at,
                });
            }
        }

        // Fresh acquisition, reclaim of an expired lock, or idempotent
        // renewal by the owning session.
        let lock = SlotLock {
            key,
            session_id: session_id.to_string(),
            parent_id,
            acquired_at: now,
            expires_at: now + chrono::Duration::milliseconds(ttl.as_millis() as i64),
        };
        let handle = lock.handle();
        locks.insert(key, lock);
        debug!(slot = %key, session = session_id, "slot lock acquired");
        Ok(handle)
    }

    async fn renew(&self, handle: &LockHandle, ttl: Duration) -> Result<LockHandle, BookingError> {
        let now = self.clock.now();
        let mut locks = self.locks.lock().await;

        match locks.get_mut(&handle.key) {
            Some(lock) if lock.owned_by(&handle.session_id) && lock.is_live(now) => {
                lock.expires_at = now + chrono::Duration::milliseconds(ttl.as_millis() as i64);
                Ok(lock.handle())
            }
            _ => Err(BookingError::LockExpired),
        }
    }

    async fn release(&self, handle: &LockHandle) -> Result<(), BookingError> {
        let mut locks = self.locks.lock().await;
        if let Some(lock) = locks.get(&handle.key) {
            if lock.owned_by(&handle.session_id) {
                locks.remove(&handle.key);
                debug!(slot = %handle.key, session = %handle.session_id, "slot lock released");
            }
        }
        Ok(())
    }

    async fn is_free(&self, key: SlotKey) -> Result<bool, BookingError> {
        let now = self.clock.now();
        let locks = self.locks.lock().await;
        Ok(locks.get(&key).map_or(true, |lock| !lock.is_live(now)))
    }

    async fn sweep_expired(&self) -> Result<usize, BookingError> {
        let now = self.clock.now();
        let mut locks = self.locks.lock().await;
        let before = locks.len();
        locks.retain(|_, lock| lock.is_live(now));
        Ok(before - locks.len())
    }
}
