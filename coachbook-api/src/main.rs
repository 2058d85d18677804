use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use coachbook_api::{app, app_config::Config, AppState};
use coachbook_core::clock::SystemClock;
use coachbook_core::memory::MemoryBookingStore;
use coachbook_lock::{MemoryLockStore, RedisLockStore, SlotLockStore};
use coachbook_pipeline::BookingService;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "coachbook_api=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::load().expect("Failed to load config");
    tracing::info!("Starting Coachbook API on port {}", config.server.port);

    let clock = Arc::new(SystemClock);

    let locks: Arc<dyn SlotLockStore> = match &config.redis.url {
        Some(url) => {
            let store = RedisLockStore::new(url).expect("Failed to create Redis lock store");
            tracing::info!("Using Redis lock store");
            Arc::new(store)
        }
        None => {
            tracing::info!("No Redis configured; using in-memory lock store");
            Arc::new(MemoryLockStore::new(clock.clone()))
        }
    };

    // Booking persistence is an external collaborator behind the
    // BookingStore trait; the in-memory store backs local runs.
    let store = Arc::new(MemoryBookingStore::new());

    let service = Arc::new(BookingService::new(
        locks,
        store,
        clock,
        config.business_rules.pipeline_policy(),
    ));

    let sweep_interval = Duration::from_secs(config.business_rules.sweep_interval_seconds);
    tokio::spawn(coachbook_api::worker::start_sweep_worker(
        service.clone(),
        sweep_interval,
    ));

    let app_state = AppState { service };

    let app = app(app_state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server.port));
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await.unwrap();
    axum::serve(listener, app.into_make_service()).await.unwrap();
}
