use crate::domain::errors::EngineError;
use chrono::NaiveDate;
use log::LevelFilter;
use sqlx::{
    sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous},
    ConnectOptions, SqlitePool,
};
use std::str::FromStr;
use std::time::Duration;

pub mod bookings;
pub mod distributed_lock;
pub mod kennels;

/// SQLite-backed store for kennels, bookings, segments and lock leases.
#[derive(Clone)]
pub struct Database {
    pub(crate) pool: SqlitePool,
}

impl Database {
    pub async fn connect(database_url: &str) -> Result<Self, sqlx::Error> {
        let in_memory = database_url.contains(":memory:");

        let mut connect_options = SqliteConnectOptions::from_str(database_url)?
            .create_if_missing(true)
            .foreign_keys(true)
            .busy_timeout(Duration::from_secs(5))
            .synchronous(SqliteSynchronous::Normal);
        if !in_memory {
            connect_options = connect_options.journal_mode(SqliteJournalMode::Wal);
        }
        connect_options = connect_options
            .log_statements(LevelFilter::Debug)
            .log_slow_statements(LevelFilter::Warn, Duration::from_secs(1));

        // An in-memory database lives as long as its single connection.
        let pool_options = if in_memory {
            SqlitePoolOptions::new()
                .max_connections(1)
                .min_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
        } else {
            SqlitePoolOptions::new().max_connections(10).min_connections(1)
        };

        let pool = pool_options.connect_with(connect_options).await?;
        tracing::info!("Connected to SQLite database (in_memory={})", in_memory);

        Ok(Self { pool })
    }

    pub async fn run_migrations(&self) -> Result<(), sqlx::Error> {
        sqlx::migrate!("migrations/sqlite").run(&self.pool).await?;
        Ok(())
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

impl From<sqlx::Error> for EngineError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => EngineError::NotFound("Resource not found".to_string()),
            sqlx::Error::Database(db_err) => {
                let message = db_err.message();
                if message.contains("UNIQUE") {
                    EngineError::Conflict(format!("Duplicate record: {}", message))
                } else if message.contains("FOREIGN KEY") {
                    EngineError::Guard(format!("Record is still referenced: {}", message))
                } else {
                    EngineError::Internal(format!("Database error: {}", message))
                }
            }
            other => EngineError::Internal(format!("Database error: {}", other)),
        }
    }
}

const DATE_FORMAT: &str = "%Y-%m-%d";

pub(crate) fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

pub(crate) fn parse_date(value: &str) -> Result<NaiveDate, EngineError> {
    NaiveDate::parse_from_str(value, DATE_FORMAT)
        .map_err(|e| EngineError::Internal(format!("Stored date '{}' is invalid: {}", value, e)))
}
