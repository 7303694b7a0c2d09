use crate::domain::ports::time_service::TimeService;
use async_trait::async_trait;
use chrono::NaiveDate;
use std::time::Duration;

/// Wall-clock time on the Tokio runtime. "Today" is the host's local date.
#[derive(Clone, Default)]
pub struct TokioTimeService;

impl TokioTimeService {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl TimeService for TokioTimeService {
    fn today(&self) -> NaiveDate {
        chrono::Local::now().date_naive()
    }

    async fn sleep(&self, duration: Duration) {
        ::tokio::time::sleep(duration).await;
    }
}
