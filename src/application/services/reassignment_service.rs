use crate::application::services::lock_scope::{booking_key, kennel_key, LockScope};
use crate::application::services::placement::{
    ensure_capacity, ensure_no_self_overlap, load_target_kennel,
};
use crate::domain::entities::{DateRange, ReassignKennelRequest, Segment};
use crate::domain::errors::{EngineError, EngineResult};
use crate::domain::ports::{
    booking_repository::{BookingRepository, PlacementChange},
    kennel_repository::KennelRepository,
};
use crate::domain::services::ConflictDetector;
use std::sync::Arc;

/// Moves an existing segment to another kennel and/or date range.
#[derive(Clone)]
pub struct ReassignmentService {
    kennel_repo: Arc<dyn KennelRepository>,
    booking_repo: Arc<dyn BookingRepository>,
    lock_scope: LockScope,
    detector: ConflictDetector,
}

impl ReassignmentService {
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

    /// On any error the segment is left exactly as it was. Moving a segment
    /// to where it already is succeeds without a write.
    pub async fn move_segment(
        &self,
        segment_id: &str,
        request: ReassignKennelRequest,
    ) -> EngineResult<Segment> {
        let current = self.require_segment(segment_id).await?;
        let keys = vec![
            booking_key(&current.booking_id),
            kennel_key(&current.kennel_id),
            kennel_key(&request.kennel_id),
        ];
        self.lock_scope
            .run(keys, || self.move_locked(current, request))
            .await
    }

    async fn require_segment(&self, segment_id: &str) -> EngineResult<Segment> {
        self.booking_repo
            .get_segment(segment_id)
            .await?
            .ok_or_else(|| EngineError::NotFound(format!("Segment {} not found", segment_id)))
    }

    async fn move_locked(
        &self,
        observed: Segment,
        request: ReassignKennelRequest,
    ) -> EngineResult<Segment> {
        // Re-read under the locks; the kennel lock we hold must still be the
        // segment's kennel.
        let segment = self.require_segment(&observed.id).await?;
        if segment.kennel_id != observed.kennel_id {
            return Err(EngineError::Conflict(format!(
                "Segment {} was moved by another request; re-fetch and retry",
                segment.id
            )));
        }

        if segment.kennel_id == request.kennel_id
            && segment.start_date == request.start_date
            && segment.end_date == request.end_date
        {
            tracing::debug!("Segment {} already in place (idempotent request)", segment.id);
            return Ok(segment);
        }

        if let Some(expected) = request.expected_version {
            if expected != segment.version {
                return Err(EngineError::Conflict(format!(
                    "Segment {} is at version {}, not {}; re-fetch and retry",
                    segment.id, segment.version, expected
                )));
            }
        }

        let range = DateRange::new(request.start_date, request.end_date)?;
        let target = load_target_kennel(self.kennel_repo.as_ref(), &request.kennel_id).await?;

        if !segment.is_active() {
            return Err(EngineError::Validation(format!(
                "Segment {} belongs to a {} booking and cannot be moved",
                segment.id, segment.booking_status
            )));
        }

        let booking = self
            .booking_repo
            .get_booking(&segment.booking_id)
            .await?
            .ok_or_else(|| {
                EngineError::Internal(format!("Booking {} disappeared", segment.booking_id))
            })?;
        ensure_no_self_overlap(
            self.detector.policy(),
            &booking.segments,
            &target.id,
            range,
            Some(&segment.id),
        )?;

        let on_target = self
            .booking_repo
            .segments_for_kennel(&target.id, Some(range))
            .await?;
        ensure_capacity(&self.detector, &target, &on_target, range, Some(&segment.id))?;

        let change = PlacementChange {
            segment_id: segment.id.clone(),
            kennel_id: target.id.clone(),
            range,
            expected_version: segment.version,
        };
        let moved = self
            .booking_repo
            .apply_placements(std::slice::from_ref(&change))
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| EngineError::Internal("Placement returned no segment".to_string()))?;

        metrics::counter!("kennelbook_reassignments_total").increment(1);
        tracing::info!(
            "Moved segment {} from kennel {} {} to kennel {} {}",
            moved.id,
            segment.kennel_id,
            segment.range(),
            moved.kennel_id,
            moved.range()
        );

        Ok(moved)
    }
}
