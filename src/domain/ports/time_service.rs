use async_trait::async_trait;
use chrono::NaiveDate;
use std::time::Duration;

#[async_trait]
pub trait TimeService: Send + Sync {
    /// Facility-local calendar date used to tell past stays from current ones.
    fn today(&self) -> NaiveDate;

    async fn sleep(&self, duration: Duration);
}
