use crate::domain::errors::EngineResult;
use crate::domain::ports::distributed_lock::DistributedLock;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;

struct Lease {
    owner: String,
    expires_at: Instant,
}

/// Process-local lock with the same TTL and owner semantics as the
/// database-backed one.
#[derive(Clone, Default)]
pub struct InMemoryDistributedLock {
    leases: Arc<Mutex<HashMap<String, Lease>>>,
}

impl InMemoryDistributedLock {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl DistributedLock for InMemoryDistributedLock {
    async fn acquire(&self, key: &str, owner: &str, ttl_seconds: u64) -> EngineResult<bool> {
        let now = Instant::now();
        let mut leases = self.leases.lock().await;
        if let Some(lease) = leases.get(key) {
            if lease.expires_at > now && lease.owner != owner {
                return Ok(false);
            }
        }
        leases.insert(
            key.to_string(),
            Lease {
                owner: owner.to_string(),
                expires_at: now + Duration::from_secs(ttl_seconds),
            },
        );
        Ok(true)
    }

    async fn release(&self, key: &str, owner: &str) -> EngineResult<()> {
        let mut leases = self.leases.lock().await;
        if leases.get(key).map(|l| l.owner == owner).unwrap_or(false) {
            leases.remove(key);
        }
        Ok(())
    }
}
