use crate::application::{Engine, EngineSettings};
use crate::config::Config;
use crate::domain::ports::{
    booking_repository::BookingRepository, distributed_lock::DistributedLock,
    kennel_repository::KennelRepository, time_service::TimeService,
};
use crate::infrastructure::http::middleware::AppState;
use crate::infrastructure::memory::{InMemoryDistributedLock, InMemoryStore};
use crate::infrastructure::persistence::distributed_lock::DatabaseDistributedLock;
use crate::infrastructure::persistence::Database;
use crate::infrastructure::runtime::tokio::TokioTimeService;
use std::sync::Arc;

/// Engine over the in-process store; state is lost on restart.
pub fn build_memory_engine(settings: EngineSettings, time_service: Arc<dyn TimeService>) -> Engine {
    let store = Arc::new(InMemoryStore::new());
    let kennel_repo: Arc<dyn KennelRepository> = store.clone();
    let booking_repo: Arc<dyn BookingRepository> = store;
    let lock: Arc<dyn DistributedLock> = Arc::new(InMemoryDistributedLock::new());
    Engine::new(kennel_repo, booking_repo, lock, time_service, settings)
}

/// Engine over SQLite. Migrations must already have been applied.
pub fn build_database_engine(
    db: Database,
    settings: EngineSettings,
    time_service: Arc<dyn TimeService>,
) -> Engine {
    let kennel_repo: Arc<dyn KennelRepository> = Arc::new(db.clone());
    let booking_repo: Arc<dyn BookingRepository> = Arc::new(db.clone());
    let lock: Arc<dyn DistributedLock> = Arc::new(DatabaseDistributedLock::new(db));
    Engine::new(kennel_repo, booking_repo, lock, time_service, settings)
}

/// Wires the engine selected by `DATABASE_URL` and wraps it for the router.
pub async fn build_app_state(config: &Config) -> Result<AppState, sqlx::Error> {
    let settings = config.engine_settings();
    let time_service: Arc<dyn TimeService> = Arc::new(TokioTimeService::new());

    let engine = if config.uses_memory_store() {
        tracing::info!("Using in-memory store");
        build_memory_engine(settings, time_service)
    } else {
        let db = Database::connect(&config.database_url).await?;
        tracing::info!("Database connection established");

        db.run_migrations().await?;
        tracing::info!("Database migrations applied");

        build_database_engine(db, settings, time_service)
    };

    tracing::info!(
        "Engine ready (overlap policy: {:?}, lock ttl: {}s, lock retries: {})",
        settings.overlap_policy,
        settings.lock_ttl_seconds,
        settings.lock_retry_attempts
    );
    Ok(AppState::new(engine))
}
