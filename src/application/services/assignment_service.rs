use crate::application::services::lock_scope::{booking_key, kennel_key, LockScope};
use crate::application::services::placement::{
    ensure_capacity, ensure_no_self_overlap, load_target_kennel,
};
use crate::domain::entities::{AssignKennelRequest, DateRange, Segment};
use crate::domain::errors::{EngineError, EngineResult};
use crate::domain::ports::{
    booking_repository::BookingRepository, kennel_repository::KennelRepository,
};
use crate::domain::services::ConflictDetector;
use std::sync::Arc;

/// Places an unassigned (part of a) booking into a kennel.
#[derive(Clone)]
pub struct AssignmentService {
    kennel_repo: Arc<dyn KennelRepository>,
    booking_repo: Arc<dyn BookingRepository>,
    lock_scope: LockScope,
    detector: ConflictDetector,
}

impl AssignmentService {
    pub fn new(
        kennel_repo: Arc<dyn KennelRepository>,
        booking_repo: Arc<dyn BookingRepository>,
        lock_scope: LockScope,
        detector: ConflictDetector,
    ) -> Self {
        Self {
            kennel_repo,
            booking_repo,
            lock_scope,
            detector,
        }
    }

    /// Creates a segment for `booking_id` on `request.kennel_id`.
    ///
    /// Validation and commit run under the booking and kennel locks against
    /// live state. A repeated `operation_id` returns the segment created by
    /// the first call instead of creating another one.
    pub async fn assign(
        &self,
        booking_id: &str,
        request: AssignKennelRequest,
    ) -> EngineResult<Segment> {
        let keys = vec![booking_key(booking_id), kennel_key(&request.kennel_id)];
        self.lock_scope
            .run(keys, || self.assign_locked(booking_id, request))
            .await
    }

    async fn assign_locked(
        &self,
        booking_id: &str,
        request: AssignKennelRequest,
    ) -> EngineResult<Segment> {
        // 1. Idempotent replay
        if let Some(operation_id) = request.operation_id.as_deref() {
            if let Some(existing) = self
                .booking_repo
                .find_segment_by_operation(operation_id)
                .await?
            {
                if existing.booking_id != booking_id {
                    return Err(EngineError::Conflict(format!(
                        "Operation {} was already used for booking {}",
                        operation_id, existing.booking_id
                    )));
                }
                tracing::info!(
                    "Assignment operation {} already applied as segment {} (idempotent request)",
                    operation_id,
                    existing.id
                );
                return Ok(existing);
            }
        }

        // 2. Both ends must exist
        let booking = self
            .booking_repo
            .get_booking(booking_id)
            .await?
            .ok_or_else(|| EngineError::NotFound(format!("Booking {} not found", booking_id)))?;
        let kennel = load_target_kennel(self.kennel_repo.as_ref(), &request.kennel_id).await?;

        // 3. Input and booking self-consistency
        let range = DateRange::new(request.start_date, request.end_date)?;
        if !booking.status.holds_capacity() {
            return Err(EngineError::Validation(format!(
                "Booking {} is {} and cannot be assigned a kennel",
                booking.id, booking.status
            )));
        }
        ensure_no_self_overlap(
            self.detector.policy(),
            &booking.segments,
            &kennel.id,
            range,
            None,
        )?;

        // 4. Capacity against live state
        let on_kennel = self
            .booking_repo
            .segments_for_kennel(&kennel.id, Some(range))
            .await?;
        ensure_capacity(&self.detector, &kennel, &on_kennel, range, None)?;

        // 5. Commit
        let segment = Segment::new(&booking, kennel.id.clone(), range, request.operation_id);
        self.booking_repo.insert_segment(&segment).await?;

        metrics::counter!("kennelbook_assignments_total").increment(1);
        tracing::info!(
            "Assigned booking {} to kennel {} for {} (segment {})",
            booking.id,
            kennel.id,
            range,
            segment.id
        );

        Ok(segment)
    }
}
