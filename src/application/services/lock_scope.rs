use crate::domain::errors::{EngineError, EngineResult};
use crate::domain::ports::{distributed_lock::DistributedLock, time_service::TimeService};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

const RETRY_DELAYS_MS: [u64; 5] = [10, 25, 50, 100, 200];

pub fn kennel_key(kennel_id: &str) -> String {
    format!("kennel:{}", kennel_id)
}

pub fn booking_key(booking_id: &str) -> String {
    format!("booking:{}", booking_id)
}

/// Serializes mutations touching the same kennels or bookings.
///
/// Keys are taken in sorted order so two commands sharing keys can never
/// wait on each other in a cycle. Every key acquired is released after the
/// guarded future completes, whether it succeeded or not.
#[derive(Clone)]
pub struct LockScope {
    lock: Arc<dyn DistributedLock>,
    time_service: Arc<dyn TimeService>,
    ttl_seconds: u64,
    retry_attempts: u32,
}

impl LockScope {
    pub fn new(
        lock: Arc<dyn DistributedLock>,
        time_service: Arc<dyn TimeService>,
        ttl_seconds: u64,
        retry_attempts: u32,
    ) -> Self {
        Self {
            lock,
            time_service,
            ttl_seconds,
            retry_attempts,
        }
    }

    pub async fn run<T, F, Fut>(&self, keys: Vec<String>, f: F) -> EngineResult<T>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = EngineResult<T>>,
    {
        let mut keys = keys;
        keys.sort();
        keys.dedup();
        let owner = uuid::Uuid::new_v4().to_string();

        let mut held: Vec<&str> = Vec::with_capacity(keys.len());
        for key in &keys {
            if let Err(e) = self.acquire_with_retry(key, &owner).await {
                self.release_all(&held, &owner).await;
                return Err(e);
            }
            held.push(key.as_str());
        }

        let result = f().await;
        self.release_all(&held, &owner).await;
        result
    }

    async fn acquire_with_retry(&self, key: &str, owner: &str) -> EngineResult<()> {
        for attempt in 0..=self.retry_attempts {
            if self.lock.acquire(key, owner, self.ttl_seconds).await? {
                return Ok(());
            }
            if attempt == self.retry_attempts {
                break;
            }
            metrics::counter!("kennelbook_lock_contention_total").increment(1);
            let delay_ms = RETRY_DELAYS_MS[(attempt as usize).min(RETRY_DELAYS_MS.len() - 1)];
            tracing::debug!(
                "Lock {} busy on attempt {}, retrying in {}ms",
                key,
                attempt + 1,
                delay_ms
            );
            self.time_service
                .sleep(Duration::from_millis(delay_ms))
                .await;
        }

        tracing::warn!("Gave up acquiring lock {}", key);
        Err(EngineError::Conflict(format!(
            "{} is being modified by another request; re-fetch and retry",
            key
        )))
    }

    async fn release_all(&self, keys: &[&str], owner: &str) {
        for key in keys.iter().rev() {
            if let Err(e) = self.lock.release(key, owner).await {
                tracing::error!("Failed to release lock {}: {}", key, e);
            }
        }
    }
}
