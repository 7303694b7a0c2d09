use chrono::NaiveDate;
use std::collections::HashMap;

use super::aggregation::summarize;
use super::overlap::OverlapPolicy;
use crate::domain::entities::{
    utilization_percent, DateRange, HeatmapBucket, Kennel, KennelOccupancy, OccupancyReport,
    OccupancySnapshot, Segment,
};

/// Derives per-kennel, per-day occupancy from segments. Read-only.
#[derive(Debug, Clone, Copy, Default)]
pub struct OccupancyCalculator {
    policy: OverlapPolicy,
}

impl OccupancyCalculator {
    pub fn new(policy: OverlapPolicy) -> Self {
        Self { policy }
    }

    /// One snapshot per kennel per day in `range`, kennels in the order given.
    pub fn occupancy(
        &self,
        kennels: &[Kennel],
        segments: &[Segment],
        range: DateRange,
    ) -> Vec<OccupancySnapshot> {
        let by_kennel = group_active(segments);
        let mut snapshots = Vec::with_capacity(kennels.len() * range.num_days() as usize);
        for kennel in kennels {
            let own = by_kennel.get(kennel.id.as_str()).map(Vec::as_slice).unwrap_or(&[]);
            let counts = self.daily_counts(own, range);
            for (date, occupied) in range.days().zip(counts) {
                snapshots.push(OccupancySnapshot::new(
                    kennel.id.clone(),
                    date,
                    kennel.capacity,
                    occupied,
                ));
            }
        }
        snapshots
    }

    /// Active segments of `kennel_id` holding a place on `day`.
    pub fn occupied_on(&self, kennel_id: &str, segments: &[Segment], day: NaiveDate) -> u32 {
        segments
            .iter()
            .filter(|s| s.kennel_id == kennel_id && s.is_active())
            .filter(|s| self.policy.occupies(s.range(), day))
            .count() as u32
    }

    /// Occupied count per kennel id on `day`, for every kennel with at least
    /// one occupant.
    pub fn occupied_by_kennel(&self, segments: &[Segment], day: NaiveDate) -> HashMap<String, u32> {
        let mut counts = HashMap::new();
        for segment in segments {
            if segment.is_active() && self.policy.occupies(segment.range(), day) {
                *counts.entry(segment.kennel_id.clone()).or_insert(0) += 1;
            }
        }
        counts
    }

    /// Range report: each kennel's peak daily occupancy in `range`, the
    /// active segments holding a place in it, and facility totals.
    pub fn report(
        &self,
        kennels: &[Kennel],
        segments: &[Segment],
        range: DateRange,
    ) -> OccupancyReport {
        let by_kennel = group_active(segments);
        let entries: Vec<KennelOccupancy> = kennels
            .iter()
            .map(|kennel| {
                let own = by_kennel.get(kennel.id.as_str()).map(Vec::as_slice).unwrap_or(&[]);
                let occupied = self.daily_counts(own, range).into_iter().max().unwrap_or(0);
                let mut active_segments: Vec<Segment> = own
                    .iter()
                    .filter(|s| self.policy.occupied_days(s.range()).overlaps(&range))
                    .map(|s| (*s).clone())
                    .collect();
                active_segments.sort_by(|a, b| {
                    (a.start_date, a.id.as_str()).cmp(&(b.start_date, b.id.as_str()))
                });
                KennelOccupancy {
                    kennel_id: kennel.id.clone(),
                    capacity: kennel.capacity,
                    occupied,
                    available: kennel.capacity.saturating_sub(occupied),
                    utilization_percent: utilization_percent(
                        occupied.into(),
                        kennel.capacity.into(),
                    ),
                    bucket: HeatmapBucket::classify(occupied.into(), kennel.capacity.into()),
                    active_segments,
                }
            })
            .collect();

        let summary = summarize(entries.iter().map(|e| (e.capacity, e.occupied)));
        OccupancyReport {
            range_start: range.start,
            range_end: range.end,
            kennels: entries,
            summary,
        }
    }

    /// Occupied count for each day of `range` via a difference array.
    fn daily_counts(&self, segments: &[&Segment], range: DateRange) -> Vec<u32> {
        let days = range.num_days() as usize;
        let mut delta = vec![0i64; days + 1];
        for segment in segments {
            let held = self.policy.occupied_days(segment.range());
            if !held.overlaps(&range) {
                continue;
            }
            let first = (held.start.max(range.start) - range.start).num_days() as usize;
            let last = (held.end.min(range.end) - range.start).num_days() as usize;
            delta[first] += 1;
            delta[last + 1] -= 1;
        }
        let mut running = 0i64;
        delta
            .into_iter()
            .take(days)
            .map(|d| {
                running += d;
                running as u32
            })
            .collect()
    }
}

fn group_active(segments: &[Segment]) -> HashMap<&str, Vec<&Segment>> {
    let mut by_kennel: HashMap<&str, Vec<&Segment>> = HashMap::new();
    for segment in segments.iter().filter(|s| s.is_active()) {
        by_kennel.entry(segment.kennel_id.as_str()).or_default().push(segment);
    }
    by_kennel
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::{Booking, BookingStatus};

    fn d(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn range(a: &str, b: &str) -> DateRange {
        DateRange::new(d(a), d(b)).unwrap()
    }

    fn seg(kennel: &Kennel, status: BookingStatus, a: &str, b: &str) -> Segment {
        let booking = Booking::new("Rex".into(), "Sam".into(), status);
        Segment::new(&booking, kennel.id.clone(), range(a, b), None)
    }

    #[test]
    fn checkout_day_counts_as_occupied() {
        let k = Kennel::new("A".into(), 2, None, None);
        let segments = vec![seg(&k, BookingStatus::Confirmed, "2024-01-01", "2024-01-03")];
        let calc = OccupancyCalculator::default();
        let snaps = calc.occupancy(&[k.clone()], &segments, range("2024-01-01", "2024-01-04"));
        let occupied: Vec<u32> = snaps.iter().map(|s| s.occupied).collect();
        assert_eq!(occupied, vec![1, 1, 1, 0]);
        assert_eq!(snaps[1].utilization_percent, 50);
        assert_eq!(snaps[1].bucket, HeatmapBucket::Medium);
        assert_eq!(snaps[3].bucket, HeatmapBucket::Empty);
    }

    #[test]
    fn over_capacity_is_surfaced_not_hidden() {
        let k = Kennel::new("A".into(), 1, None, None);
        let segments = vec![
            seg(&k, BookingStatus::Confirmed, "2024-01-02", "2024-01-02"),
            seg(&k, BookingStatus::CheckedIn, "2024-01-02", "2024-01-02"),
        ];
        let calc = OccupancyCalculator::default();
        let snaps = calc.occupancy(&[k], &segments, range("2024-01-02", "2024-01-02"));
        assert_eq!(snaps[0].occupied, 2);
        assert_eq!(snaps[0].available, 0);
        assert_eq!(snaps[0].utilization_percent, 200);
    }

    #[test]
    fn report_uses_peak_and_lists_overlapping_segments() {
        let a = Kennel::new("A".into(), 2, None, None);
        let b = Kennel::new("B".into(), 4, None, None);
        let segments = vec![
            seg(&a, BookingStatus::Confirmed, "2024-01-01", "2024-01-03"),
            seg(&a, BookingStatus::Confirmed, "2024-01-03", "2024-01-04"),
            seg(&a, BookingStatus::CheckedOut, "2024-01-01", "2024-01-04"),
            seg(&b, BookingStatus::Pending, "2024-01-10", "2024-01-12"),
        ];
        let calc = OccupancyCalculator::default();
        let report = calc.report(&[a.clone(), b.clone()], &segments, range("2024-01-01", "2024-01-05"));

        assert_eq!(report.kennels[0].occupied, 2);
        assert_eq!(report.kennels[0].active_segments.len(), 2);
        assert_eq!(report.kennels[0].bucket, HeatmapBucket::Full);
        assert_eq!(report.kennels[1].occupied, 0);
        assert!(report.kennels[1].active_segments.is_empty());

        assert_eq!(report.summary.total_capacity, 6);
        assert_eq!(report.summary.total_occupied, 2);
        assert_eq!(report.summary.total_available, 4);
        assert_eq!(report.summary.overall_utilization_percent, 33);
    }

    #[test]
    fn occupied_by_kennel_skips_inactive() {
        let a = Kennel::new("A".into(), 2, None, None);
        let segments = vec![
            seg(&a, BookingStatus::Confirmed, "2024-01-01", "2024-01-03"),
            seg(&a, BookingStatus::Cancelled, "2024-01-01", "2024-01-03"),
        ];
        let calc = OccupancyCalculator::default();
        let counts = calc.occupied_by_kennel(&segments, d("2024-01-02"));
        assert_eq!(counts.get(&a.id), Some(&1));
        assert_eq!(calc.occupied_on(&a.id, &segments, d("2024-01-04")), 0);
    }
}
