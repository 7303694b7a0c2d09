use crate::application::services::{
    AssignmentService, BookingService, CatalogService, LockScope, OccupancyService,
    ReassignmentService,
};
use crate::domain::entities::{
    AssignKennelRequest, Booking, CascadeStrategy, Kennel, KennelRemoval, OccupancyReport,
    ReassignKennelRequest, Segment,
};
use crate::domain::errors::EngineResult;
use crate::domain::ports::{
    booking_repository::BookingRepository, distributed_lock::DistributedLock,
    kennel_repository::KennelRepository, time_service::TimeService,
};
use crate::domain::services::{ConflictDetector, OccupancyCalculator, OverlapPolicy};
use chrono::NaiveDate;
use std::sync::Arc;

#[derive(Debug, Clone, Copy)]
pub struct EngineSettings {
    pub overlap_policy: OverlapPolicy,
    pub lock_ttl_seconds: u64,
    pub lock_retry_attempts: u32,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            overlap_policy: OverlapPolicy::Inclusive,
            lock_ttl_seconds: 30,
            lock_retry_attempts: 5,
        }
    }
}

/// Command/query handle over the scheduling engine.
///
/// Callers hold one of these (it is cheap to clone) instead of reaching into
/// repositories. Commands return the records they changed so callers can
/// merge them into their own views.
#[derive(Clone)]
pub struct Engine {
    pub catalog: CatalogService,
    pub bookings: BookingService,
    pub assignments: AssignmentService,
    pub reassignments: ReassignmentService,
    pub occupancy: OccupancyService,
    settings: EngineSettings,
}

impl Engine {
    pub fn new(
        kennel_repo: Arc<dyn KennelRepository>,
        booking_repo: Arc<dyn BookingRepository>,
        lock: Arc<dyn DistributedLock>,
        time_service: Arc<dyn TimeService>,
        settings: EngineSettings,
    ) -> Self {
        let lock_scope = LockScope::new(
            lock,
            time_service.clone(),
            settings.lock_ttl_seconds,
            settings.lock_retry_attempts,
        );
        let detector = ConflictDetector::new(settings.overlap_policy);

        Self {
            catalog: CatalogService::new(
                kennel_repo.clone(),
                booking_repo.clone(),
                time_service,
                lock_scope.clone(),
                detector,
            ),
            bookings: BookingService::new(booking_repo.clone(), lock_scope.clone()),
            assignments: AssignmentService::new(
                kennel_repo.clone(),
                booking_repo.clone(),
                lock_scope.clone(),
                detector,
            ),
            reassignments: ReassignmentService::new(
                kennel_repo.clone(),
                booking_repo.clone(),
                lock_scope,
                detector,
            ),
            occupancy: OccupancyService::new(
                kennel_repo,
                booking_repo,
                OccupancyCalculator::new(settings.overlap_policy),
            ),
            settings,
        }
    }

    pub fn settings(&self) -> EngineSettings {
        self.settings
    }

    pub async fn list_kennels(&self) -> EngineResult<Vec<Kennel>> {
        self.catalog.list_kennels().await
    }

    pub async fn list_bookings(&self) -> EngineResult<Vec<Booking>> {
        self.bookings.list_bookings().await
    }

    pub async fn occupancy(&self, start: NaiveDate, end: NaiveDate) -> EngineResult<OccupancyReport> {
        self.occupancy.report(start, end).await
    }

    pub async fn assign_kennel(
        &self,
        booking_id: &str,
        kennel_id: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> EngineResult<Segment> {
        self.assignments
            .assign(
                booking_id,
                AssignKennelRequest {
                    kennel_id: kennel_id.to_string(),
                    start_date: start,
                    end_date: end,
                    operation_id: None,
                },
            )
            .await
    }

    pub async fn reassign_kennel(
        &self,
        segment_id: &str,
        kennel_id: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> EngineResult<Segment> {
        self.reassignments
            .move_segment(
                segment_id,
                ReassignKennelRequest {
                    kennel_id: kennel_id.to_string(),
                    start_date: start,
                    end_date: end,
                    expected_version: None,
                },
            )
            .await
    }

    pub async fn set_kennel_active(&self, kennel_id: &str, is_active: bool) -> EngineResult<Kennel> {
        self.catalog.set_active(kennel_id, is_active).await
    }

    pub async fn delete_kennel(
        &self,
        kennel_id: &str,
        strategy: CascadeStrategy,
    ) -> EngineResult<KennelRemoval> {
        self.catalog.delete_kennel(kennel_id, strategy).await
    }
}
