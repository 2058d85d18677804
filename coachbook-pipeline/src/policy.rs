use std::time::Duration;

/// What to do with a booking whose slot lock lapsed with no payment event.
///
/// Observed production behavior leaves the booking pending (the slot is
/// rebookable either way, and duplicates resolve at confirmation time),
/// so that is the default; operators can opt into cancellation after a
/// grace period instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AbandonedPolicy {
    LeavePending,
    CancelAfter(Duration),
}

#[derive(Debug, Clone, Copy)]
pub struct PipelinePolicy {
    /// TTL granted on acquire and on the renewal during booking creation.
    pub lock_ttl: Duration,
    pub abandoned: AbandonedPolicy,
}

impl Default for PipelinePolicy {
    fn default() -> Self {
        Self {
            lock_ttl: Duration::from_secs(600),
            abandoned: AbandonedPolicy::LeavePending,
        }
    }
}
