use crate::domain::entities::{DateRange, LocationGroup, OccupancyReport, OccupancySnapshot};
use crate::domain::errors::{EngineError, EngineResult};
use crate::domain::ports::{
    booking_repository::BookingRepository, kennel_repository::KennelRepository,
};
use crate::domain::services::{group_by_location, OccupancyCalculator};
use chrono::NaiveDate;
use std::sync::Arc;

/// Longest range a single occupancy query may cover.
pub const MAX_QUERY_DAYS: i64 = 366;

/// Read-only occupancy views over live catalog and segment state.
#[derive(Clone)]
pub struct OccupancyService {
    kennel_repo: Arc<dyn KennelRepository>,
    booking_repo: Arc<dyn BookingRepository>,
    calculator: OccupancyCalculator,
}

impl OccupancyService {
    pub fn new(
        kennel_repo: Arc<dyn KennelRepository>,
        booking_repo: Arc<dyn BookingRepository>,
        calculator: OccupancyCalculator,
    ) -> Self {
        Self {
            kennel_repo,
            booking_repo,
            calculator,
        }
    }

    /// Per-kennel peak occupancy over the range plus facility totals.
    pub async fn report(&self, start: NaiveDate, end: NaiveDate) -> EngineResult<OccupancyReport> {
        let range = query_range(start, end)?;
        let kennels = self.kennel_repo.list_kennels().await?;
        let segments = self.booking_repo.segments_in_range(range).await?;
        Ok(self.calculator.report(&kennels, &segments, range))
    }

    /// One snapshot per kennel per day; the heatmap grid.
    pub async fn daily(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> EngineResult<Vec<OccupancySnapshot>> {
        let range = query_range(start, end)?;
        let kennels = self.kennel_repo.list_kennels().await?;
        let segments = self.booking_repo.segments_in_range(range).await?;
        Ok(self.calculator.occupancy(&kennels, &segments, range))
    }

    /// Kennels grouped by building and floor with occupancy on `date`.
    pub async fn locations(&self, date: NaiveDate) -> EngineResult<Vec<LocationGroup>> {
        let kennels = self.kennel_repo.list_kennels().await?;
        let segments = self
            .booking_repo
            .segments_in_range(DateRange::single(date))
            .await?;
        let occupied = self.calculator.occupied_by_kennel(&segments, date);
        Ok(group_by_location(&kennels, &occupied))
    }
}

fn query_range(start: NaiveDate, end: NaiveDate) -> EngineResult<DateRange> {
    let range = DateRange::new(start, end)?;
    if range.num_days() > MAX_QUERY_DAYS {
        return Err(EngineError::Validation(format!(
            "Occupancy queries may span at most {} days, got {}",
            MAX_QUERY_DAYS,
            range.num_days()
        )));
    }
    Ok(range)
}
