//! Checks shared by every command that places a segment on a kennel.

use crate::domain::entities::{DateRange, Kennel, Segment};
use crate::domain::errors::{EngineError, EngineResult};
use crate::domain::ports::kennel_repository::KennelRepository;
use crate::domain::services::{ConflictDetector, OverlapPolicy};

/// Loads a kennel that is about to receive a placement.
///
/// Unknown and archived kennels are `NotFoundError`; kennels in maintenance
/// are `InactiveResourceError`.
pub(crate) async fn load_target_kennel(
    kennel_repo: &dyn KennelRepository,
    kennel_id: &str,
) -> EngineResult<Kennel> {
    let kennel = kennel_repo
        .get_kennel(kennel_id)
        .await?
        .filter(|k| !k.is_archived())
        .ok_or_else(|| EngineError::NotFound(format!("Kennel {} not found", kennel_id)))?;

    if !kennel.is_active {
        return Err(EngineError::InactiveResource(format!(
            "Kennel {} is in maintenance and cannot take new placements",
            kennel.id
        )));
    }
    Ok(kennel)
}

/// A booking occupies exactly one kennel at any instant: reject a placement
/// that overlaps one of its other segments on a different kennel.
pub(crate) fn ensure_no_self_overlap(
    policy: OverlapPolicy,
    booking_segments: &[Segment],
    kennel_id: &str,
    range: DateRange,
    exclude_segment_id: Option<&str>,
) -> EngineResult<()> {
    let clash = booking_segments.iter().find(|s| {
        exclude_segment_id != Some(s.id.as_str())
            && s.kennel_id != kennel_id
            && policy.conflicts(s.range(), range)
    });

    match clash {
        Some(s) => Err(EngineError::Validation(format!(
            "Booking {} is already in kennel {} during {}",
            s.booking_id,
            s.kennel_id,
            s.range()
        ))),
        None => Ok(()),
    }
}

pub(crate) fn ensure_capacity(
    detector: &ConflictDetector,
    kennel: &Kennel,
    segments: &[Segment],
    range: DateRange,
    exclude_segment_id: Option<&str>,
) -> EngineResult<()> {
    match detector.first_conflict(kennel, segments, range, exclude_segment_id) {
        Some(conflict) => {
            metrics::counter!("kennelbook_capacity_rejections_total").increment(1);
            tracing::info!(
                "Rejected placement on kennel {} for {}: {}/{} occupied on {}",
                kennel.id,
                range,
                conflict.occupied,
                conflict.capacity,
                conflict.date
            );
            Err(EngineError::CapacityExceeded(format!(
                "Kennel {} is full on {} ({} of {} places taken)",
                kennel.id, conflict.date, conflict.occupied, conflict.capacity
            )))
        }
        None => Ok(()),
    }
}
