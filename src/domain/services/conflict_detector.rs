use chrono::NaiveDate;

use super::overlap::OverlapPolicy;
use crate::domain::entities::{DateRange, Kennel, Segment};

/// First day on which one more occupant would not fit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CapacityConflict {
    pub date: NaiveDate,
    pub occupied: u32,
    pub capacity: u32,
}

/// Decides whether a proposed placement would oversell a kennel.
///
/// Pure: it only looks at the kennel and the segments it is handed. Only
/// active segments on the kennel count, and `exclude_segment_id` lets a
/// segment that is itself moving be checked without colliding with its own
/// prior placement.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConflictDetector {
    policy: OverlapPolicy,
}

impl ConflictDetector {
    pub fn new(policy: OverlapPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> OverlapPolicy {
        self.policy
    }

    pub fn would_exceed_capacity(
        &self,
        kennel: &Kennel,
        segments: &[Segment],
        range: DateRange,
        exclude_segment_id: Option<&str>,
    ) -> bool {
        self.first_conflict(kennel, segments, range, exclude_segment_id)
            .is_some()
    }

    /// Sweeps occupancy change points clipped to the proposed days and
    /// returns the earliest day where `count + 1 > capacity`.
    pub fn first_conflict(
        &self,
        kennel: &Kennel,
        segments: &[Segment],
        range: DateRange,
        exclude_segment_id: Option<&str>,
    ) -> Option<CapacityConflict> {
        let window = self.policy.occupied_days(range);
        let events = self.change_points(kennel, segments, window, exclude_segment_id);

        let capacity = kennel.capacity;
        if capacity == 0 {
            return Some(CapacityConflict {
                date: window.start,
                occupied: 0,
                capacity,
            });
        }

        let mut count: i64 = 0;
        let mut i = 0;
        while i < events.len() {
            let date = events[i].0;
            while i < events.len() && events[i].0 == date {
                count += events[i].1;
                i += 1;
            }
            if date <= window.end && count + 1 > i64::from(capacity) {
                return Some(CapacityConflict {
                    date,
                    occupied: count as u32,
                    capacity,
                });
            }
        }
        None
    }

    /// Highest single-day occupancy within `range`, ignoring `exclude_segment_id`.
    pub fn peak_occupancy(
        &self,
        kennel: &Kennel,
        segments: &[Segment],
        range: DateRange,
        exclude_segment_id: Option<&str>,
    ) -> u32 {
        let events = self.change_points(kennel, segments, range, exclude_segment_id);
        let mut count: i64 = 0;
        let mut peak: i64 = 0;
        let mut i = 0;
        while i < events.len() {
            let date = events[i].0;
            while i < events.len() && events[i].0 == date {
                count += events[i].1;
                i += 1;
            }
            peak = peak.max(count);
        }
        peak as u32
    }

    /// `(+1 at first occupied day, -1 the day after the last)` for every
    /// counted segment, clipped to `window` and sorted by date.
    fn change_points(
        &self,
        kennel: &Kennel,
        segments: &[Segment],
        window: DateRange,
        exclude_segment_id: Option<&str>,
    ) -> Vec<(NaiveDate, i64)> {
        let mut events = Vec::new();
        for segment in segments {
            if segment.kennel_id != kennel.id
                || !segment.is_active()
                || exclude_segment_id == Some(segment.id.as_str())
            {
                continue;
            }
            let held = self.policy.occupied_days(segment.range());
            if !held.overlaps(&window) {
                continue;
            }
            let first = held.start.max(window.start);
            let last = held.end.min(window.end);
            events.push((first, 1));
            if let Some(after) = last.succ_opt() {
                events.push((after, -1));
            }
        }
        events.sort();
        events
    }
}
