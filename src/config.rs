use crate::application::EngineSettings;
use crate::domain::services::OverlapPolicy;
use std::env;

/// Selects the in-process store instead of SQLite.
pub const MEMORY_DATABASE_URL: &str = "memory";

#[derive(Clone, Debug)]
pub struct Config {
    pub database_url: String,
    pub server_host: String,
    pub server_port: u16,
    pub same_day_turnover: bool,
    pub lock_ttl_seconds: u64,
    pub lock_retry_attempts: u32,
    pub otel_exporter_endpoint: Option<String>,
    pub service_name: String,
    pub metrics_port: u16,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if it exists
        dotenvy::dotenv().ok();

        let database_url = env::var("DATABASE_URL")
            .unwrap_or_else(|_| "sqlite://kennelbook.db?mode=rwc".to_string());

        let server_host = env::var("SERVER_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());

        let server_port = env::var("SERVER_PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse()
            .map_err(|_| ConfigError::InvalidPort)?;

        let same_day_turnover = match env::var("SAME_DAY_TURNOVER") {
            Ok(value) => parse_flag(&value).ok_or(ConfigError::InvalidFlag {
                name: "SAME_DAY_TURNOVER",
                value,
            })?,
            Err(_) => false,
        };

        let lock_ttl_seconds = env::var("LOCK_TTL_SECONDS")
            .unwrap_or_else(|_| "30".to_string())
            .parse()
            .unwrap_or(30);

        let lock_retry_attempts = env::var("LOCK_RETRY_ATTEMPTS")
            .unwrap_or_else(|_| "5".to_string())
            .parse()
            .unwrap_or(5);

        let otel_exporter_endpoint = env::var("OTEL_EXPORTER_OTLP_ENDPOINT").ok();

        let service_name = env::var("SERVICE_NAME").unwrap_or_else(|_| "kennelbook".to_string());

        let metrics_port = env::var("METRICS_PORT")
            .unwrap_or_else(|_| "9000".to_string())
            .parse()
            .unwrap_or(9000);

        Ok(Config {
            database_url,
            server_host,
            server_port,
            same_day_turnover,
            lock_ttl_seconds,
            lock_retry_attempts,
            otel_exporter_endpoint,
            service_name,
            metrics_port,
        })
    }

    pub fn server_address(&self) -> String {
        format!("{}:{}", self.server_host, self.server_port)
    }

    pub fn uses_memory_store(&self) -> bool {
        self.database_url == MEMORY_DATABASE_URL
    }

    pub fn engine_settings(&self) -> EngineSettings {
        EngineSettings {
            overlap_policy: OverlapPolicy::from_turnover_flag(self.same_day_turnover),
            lock_ttl_seconds: self.lock_ttl_seconds,
            lock_retry_attempts: self.lock_retry_attempts,
        }
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" | "" => Some(false),
        _ => None,
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid port number")]
    InvalidPort,

    #[error("Invalid value '{value}' for {name}, expected true or false")]
    InvalidFlag { name: &'static str, value: String },
}
