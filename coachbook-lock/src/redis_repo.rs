use crate::SlotLockStore;
use async_trait::async_trait;
use chrono::Utc;
use coachbook_core::error::BookingError;
use coachbook_domain::lock::{LockHandle, SlotKey};
use redis::Script;
use std::time::Duration;
use tracing::debug;

/// Redis-backed lock store for deployments where independent processes
/// share one lock space.
///
/// Acquire-or-renew, renew, and release each run as a single Lua script,
/// so the ownership check and the write happen in one atomic round trip.
/// Redis evicts expired keys itself; the TTL on the key is the lock TTL.
pub struct RedisLockStore {
    client: redis::Client,
    acquire_script: Script,
    renew_script: Script,
    release_script: Script,
}

impl RedisLockStore {
    pub fn new(connection_string: &str) -> Result<Self, redis::RedisError> {
        let client = redis::Client::open(connection_string)?;
        Ok(Self {
            client,
            // Returns -1 on success (fresh set or same-session renewal),
            // otherwise the blocking lock's remaining TTL in millis.
            acquire_script: Script::new(
                r#"
                local owner = redis.call('GET', KEYS[1])
                if owner == false then
                    redis.call('SET', KEYS[1], ARGV[1], 'PX', ARGV[2])
                    return -1
                end
                if owner == ARGV[1] then
                    redis.call('PEXPIRE', KEYS[1], ARGV[2])
                    return -1
                end
                return redis.call('PTTL', KEYS[1])
                "#,
            ),
            renew_script: Script::new(
                r#"
                if redis.call('GET', KEYS[1]) == ARGV[1] then
                    redis.call('PEXPIRE', KEYS[1], ARGV[2])
                    return 1
                end
                return 0
                "#,
            ),
            release_script: Script::new(
                r#"
                if redis.call('GET', KEYS[1]) == ARGV[1] then
                    return redis.call('DEL', KEYS[1])
                end
                return 0
                "#,
            ),
        })
    }

    fn redis_key(key: &SlotKey) -> String {
        format!("slotlock:{}", key.storage_key())
    }
}

fn store_err(e: redis::RedisError) -> BookingError {
    BookingError::Store(e.to_string())
}

#[async_trait]
impl SlotLockStore for RedisLockStore {
    async fn acquire(
        &self,
        key: SlotKey,
        session_id: &str,
        _parent_id: Option<i64>,
        ttl: Duration,
    ) -> Result<LockHandle, BookingError> {
        let mut con = self
            .client
            .get_async_connection()
            .await
            .map_err(store_err)?;
        let ttl_ms = ttl.as_millis() as i64;

        let result: i64 = self
            .acquire_script
            .key(Self::redis_key(&key))
            .arg(session_id)
            .arg(ttl_ms)
            .invoke_async(&mut con)
            .await
            .map_err(store_err)?;

        if result == -1 {
            debug!(slot = %key, session = session_id, "slot lock acquired");
            Ok(LockHandle {
                key,
                session_id: session_id.to_string(),
                expires_at: Utc::now() + chrono::Duration::milliseconds(ttl_ms),
            })
        } else {
            Err(BookingError::SlotBusy {
                expires_at: Utc::now() + chrono::Duration::milliseconds(result.max(0)),
            })
        }
    }

    async fn renew(&self, handle: &LockHandle, ttl: Duration) -> Result<LockHandle, BookingError> {
        let mut con = self
            .client
            .get_async_connection()
            .await
            .map_err(store_err)?;
        let ttl_ms = ttl.as_millis() as i64;

        let renewed: i64 = self
            .renew_script
            .key(Self::redis_key(&handle.key))
            .arg(&handle.session_id)
            .arg(ttl_ms)
            .invoke_async(&mut con)
            .await
            .map_err(store_err)?;

        if renewed == 1 {
            Ok(LockHandle {
                key: handle.key,
                session_id: handle.session_id.clone(),
                expires_at: Utc::now() + chrono::Duration::milliseconds(ttl_ms),
            })
        } else {
            Err(BookingError::LockExpired)
        }
    }

    async fn release(&self, handle: &LockHandle) -> Result<(), BookingError> {
        let mut con = self
            .client
            .get_async_connection()
            .await
            .map_err(store_err)?;

        let _: i64 = self
            .release_script
            .key(Self::redis_key(&handle.key))
            .arg(&handle.session_id)
            .invoke_async(&mut con)
            .await
            .map_err(store_err)?;
        Ok(())
    }

    async fn is_free(&self, key: SlotKey) -> Result<bool, BookingError> {
        let mut con = self
            .client
            .get_async_connection()
            .await
            .map_err(store_err)?;
        let exists: bool = redis::cmd("EXISTS")
            .arg(Self::redis_key(&key))
            .query_async(&mut con)
            .await
            .map_err(store_err)?;
        Ok(!exists)
    }

    async fn sweep_expired(&self) -> Result<usize, BookingError> {
        // Redis expires lock keys on its own; nothing to purge here.
        Ok(0)
    }
}
