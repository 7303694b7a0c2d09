use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::booking::Segment;

/// Discrete utilization tier for at-a-glance display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HeatmapBucket {
    Empty,
    Low,
    Medium,
    High,
    Full,
}

impl HeatmapBucket {
    /// Thresholds are half-open so every percentage maps to one bucket:
    /// `0` empty, `(0, 50)` low, `[50, 80)` medium, `[80, 100)` high,
    /// `>= 100` full.
    pub fn from_percent(percent: u32) -> Self {
        match percent {
            0 => HeatmapBucket::Empty,
            1..=49 => HeatmapBucket::Low,
            50..=79 => HeatmapBucket::Medium,
            80..=99 => HeatmapBucket::High,
            _ => HeatmapBucket::Full,
        }
    }

    /// Bucket for `occupied` of `capacity`. Rounding never moves a load
    /// across the empty or full edge: any occupant is at least `Low`, and
    /// `Full` needs every place taken.
    pub fn classify(occupied: u64, capacity: u64) -> Self {
        match Self::from_percent(utilization_percent(occupied, capacity)) {
            HeatmapBucket::Empty if occupied > 0 => HeatmapBucket::Low,
            HeatmapBucket::Full if occupied < capacity => HeatmapBucket::High,
            bucket => bucket,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            HeatmapBucket::Empty => "empty",
            HeatmapBucket::Low => "low",
            HeatmapBucket::Medium => "medium",
            HeatmapBucket::High => "high",
            HeatmapBucket::Full => "full",
        }
    }
}

/// `round(occupied / capacity * 100)`, uncapped so over-capacity shows up
/// as an anomaly. Takes `u64` so rolled-up totals fit.
pub fn utilization_percent(occupied: u64, capacity: u64) -> u32 {
    if capacity == 0 {
        return 0;
    }
    (occupied as f64 / capacity as f64 * 100.0).round() as u32
}

/// Occupancy of one kennel on one day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OccupancySnapshot {
    pub kennel_id: String,
    pub date: NaiveDate,
    pub capacity: u32,
    pub occupied: u32,
    pub available: u32,
    pub utilization_percent: u32,
    pub bucket: HeatmapBucket,
}

impl OccupancySnapshot {
    pub fn new(kennel_id: String, date: NaiveDate, capacity: u32, occupied: u32) -> Self {
        Self {
            kennel_id,
            date,
            capacity,
            occupied,
            available: capacity.saturating_sub(occupied),
            utilization_percent: utilization_percent(occupied.into(), capacity.into()),
            bucket: HeatmapBucket::classify(occupied.into(), capacity.into()),
        }
    }
}

/// Per-kennel entry of a range report. `occupied` is the peak daily
/// occupancy within the range.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct KennelOccupancy {
    pub kennel_id: String,
    pub capacity: u32,
    pub occupied: u32,
    pub available: u32,
    pub utilization_percent: u32,
    pub bucket: HeatmapBucket,
    pub active_segments: Vec<Segment>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OccupancySummary {
    pub total_capacity: u64,
    pub total_occupied: u64,
    pub total_available: u64,
    pub overall_utilization_percent: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OccupancyReport {
    pub range_start: NaiveDate,
    pub range_end: NaiveDate,
    pub kennels: Vec<KennelOccupancy>,
    pub summary: OccupancySummary,
}

/// Kennels sharing a `(building, floor)` with rolled-up totals.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LocationGroup {
    pub building: String,
    pub floor: String,
    pub kennel_ids: Vec<String>,
    pub capacity: u64,
    pub occupied: u64,
    pub available: u64,
    pub utilization_percent: u32,
    pub bucket: HeatmapBucket,
}
