use coachbook_pipeline::BookingService;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info};

/// Background housekeeping: purges expired slot locks so the store stays
/// bounded, and runs the abandoned-booking reaper when that policy is
/// enabled. Correctness never depends on this loop; expiry is evaluated
/// lazily on every read.
pub async fn start_sweep_worker(service: Arc<BookingService>, interval: Duration) {
    info!("sweep worker started, interval {:?}", interval);

    loop {
        tokio::time::sleep(interval).await;

        match service.sweep_locks().await {
            Ok(0) => {}
            Ok(removed) => info!("swept {} expired slot locks", removed),
            Err(e) => error!("lock sweep failed: {}", e),
        }

        match service.reap_abandoned().await {
            Ok(0) => {}
            Ok(reaped) => info!("cancelled {} abandoned bookings", reaped),
            Err(e) => error!("abandoned-booking reap failed: {}", e),
        }
    }
}
