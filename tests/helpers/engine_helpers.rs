use async_trait::async_trait;
use chrono::NaiveDate;
use kennelbook::application::{Engine, EngineSettings};
use kennelbook::bootstrap::{build_database_engine, build_memory_engine};
use kennelbook::domain::entities::{
    Booking, BookingStatus, CreateBookingRequest, CreateKennelRequest, Kennel,
};
use kennelbook::domain::ports::time_service::TimeService;
use kennelbook::domain::services::OverlapPolicy;
use kennelbook::infrastructure::persistence::Database;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

/// Clock pinned to one calendar day; sleeps are real so lock retries still back off.
pub struct FixedTimeService {
    pub today: NaiveDate,
}

#[async_trait]
impl TimeService for FixedTimeService {
    fn today(&self) -> NaiveDate {
        self.today
    }

    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

pub fn d(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").expect("valid test date")
}

pub fn fixed_clock(today: &str) -> Arc<dyn TimeService> {
    Arc::new(FixedTimeService { today: d(today) })
}

/// In-memory engine whose "today" is 2024-01-01.
pub fn setup_memory_engine() -> Engine {
    build_memory_engine(EngineSettings::default(), fixed_clock("2024-01-01"))
}

pub fn setup_memory_engine_at(today: &str) -> Engine {
    build_memory_engine(EngineSettings::default(), fixed_clock(today))
}

pub fn setup_turnover_engine() -> Engine {
    let settings = EngineSettings {
        overlap_policy: OverlapPolicy::SameDayTurnover,
        ..EngineSettings::default()
    };
    build_memory_engine(settings, fixed_clock("2024-01-01"))
}

pub async fn setup_test_db() -> Database {
    let db = Database::connect("sqlite::memory:")
        .await
        .expect("Failed to connect to test database");
    db.run_migrations()
        .await
        .expect("Failed to run migrations");
    db
}

/// SQLite-backed engine over a fresh in-memory database.
pub async fn setup_sqlite_engine() -> Engine {
    let db = setup_test_db().await;
    build_database_engine(db, EngineSettings::default(), fixed_clock("2024-01-01"))
}

/// SQLite-backed engine over a database file, so the pool holds several
/// connections and locks are contended across them.
pub async fn setup_sqlite_file_engine(path: &Path, settings: EngineSettings) -> Engine {
    let url = format!("sqlite://{}?mode=rwc", path.display());
    let db = Database::connect(&url)
        .await
        .expect("Failed to connect to test database file");
    db.run_migrations()
        .await
        .expect("Failed to run migrations");
    build_database_engine(db, settings, fixed_clock("2024-01-01"))
}

pub async fn create_test_kennel(engine: &Engine, name: &str, capacity: u32) -> Kennel {
    engine
        .catalog
        .create_kennel(CreateKennelRequest {
            name: name.to_string(),
            capacity,
            building: None,
            floor: None,
        })
        .await
        .expect("Failed to create kennel")
}

pub async fn create_located_kennel(
    engine: &Engine,
    name: &str,
    capacity: u32,
    building: &str,
    floor: &str,
) -> Kennel {
    engine
        .catalog
        .create_kennel(CreateKennelRequest {
            name: name.to_string(),
            capacity,
            building: Some(building.to_string()),
            floor: Some(floor.to_string()),
        })
        .await
        .expect("Failed to create kennel")
}

pub async fn create_test_booking(engine: &Engine, pet_name: &str) -> Booking {
    engine
        .bookings
        .create_booking(CreateBookingRequest {
            pet_name: pet_name.to_string(),
            owner_name: format!("{}'s owner", pet_name),
            status: Some(BookingStatus::Confirmed),
        })
        .await
        .expect("Failed to create booking")
}

/// Occupied count of one kennel on one day, read through the range report.
pub async fn occupied_on(engine: &Engine, kennel_id: &str, day: &str) -> u32 {
    let report = engine
        .occupancy(d(day), d(day))
        .await
        .expect("Failed to read occupancy");
    report
        .kennels
        .iter()
        .find(|k| k.kennel_id == kennel_id)
        .map(|k| k.occupied)
        .unwrap_or(0)
}
