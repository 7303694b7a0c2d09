use crate::domain::errors::{EngineError, EngineResult};
use crate::domain::ports::distributed_lock::DistributedLock;
use crate::infrastructure::persistence::Database;
use async_trait::async_trait;
use chrono::{SecondsFormat, Utc};

/// Lease table lock shared by every process using the same database file.
#[derive(Clone)]
pub struct DatabaseDistributedLock {
    db: Database,
}

impl DatabaseDistributedLock {
    pub fn new(db: Database) -> Self {
        Self { db }
    }
}

#[async_trait]
impl DistributedLock for DatabaseDistributedLock {
    async fn acquire(&self, key: &str, owner: &str, ttl_seconds: u64) -> EngineResult<bool> {
        let now = Utc::now();
        let expires_at = now + chrono::Duration::seconds(ttl_seconds as i64);

        // An existing row is only taken over once its lease has expired.
        // Fixed-width UTC timestamps compare correctly as strings.
        let query = r#"
            INSERT INTO distributed_locks (key, owner, expires_at, created_at)
            VALUES (?, ?, ?, ?)
            ON CONFLICT(key) DO UPDATE SET
                owner = excluded.owner,
                expires_at = excluded.expires_at,
                created_at = excluded.created_at
            WHERE distributed_locks.expires_at < ?
        "#;

        let result = sqlx::query(query)
            .bind(key)
            .bind(owner)
            .bind(expires_at.to_rfc3339_opts(SecondsFormat::Micros, true))
            .bind(now.to_rfc3339_opts(SecondsFormat::Micros, true))
            .bind(now.to_rfc3339_opts(SecondsFormat::Micros, true))
            .execute(&self.db.pool)
            .await
            .map_err(|e| EngineError::Internal(format!("Failed to acquire lock {}: {}", key, e)))?;

        Ok(result.rows_affected() > 0)
    }

    async fn release(&self, key: &str, owner: &str) -> EngineResult<()> {
        sqlx::query("DELETE FROM distributed_locks WHERE key = ? AND owner = ?")
            .bind(key)
            .bind(owner)
            .execute(&self.db.pool)
            .await
            .map_err(|e| EngineError::Internal(format!("Failed to release lock {}: {}", key, e)))?;
        Ok(())
    }
}
