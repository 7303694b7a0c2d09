//! Per-kennel index of segments sorted by start date.
//!
//! Each kennel keeps its segments in a vector ordered by `(start_date, id)`
//! together with the longest span seen so far. A range query binary-searches
//! both ends of the candidate window, so it costs `O(log n + k)` where `k` is
//! the number of segments starting inside `[query.start - max_span, query.end]`.

use std::collections::HashMap;

use crate::domain::entities::{DateRange, Segment};

#[derive(Debug, Clone, Default)]
struct KennelSegments {
    segments: Vec<Segment>,
    /// Longest `end - start` in days ever inserted. Not shrunk on removal;
    /// a stale larger value only widens the search window.
    max_span_days: i64,
}

impl KennelSegments {
    fn position(&self, segment: &Segment) -> usize {
        self.segments.partition_point(|s| {
            (s.start_date, s.id.as_str()) < (segment.start_date, segment.id.as_str())
        })
    }

    fn insert(&mut self, segment: Segment) {
        let span = (segment.end_date - segment.start_date).num_days();
        self.max_span_days = self.max_span_days.max(span);
        let at = self.position(&segment);
        self.segments.insert(at, segment);
    }

    fn remove(&mut self, segment_id: &str) -> Option<Segment> {
        let at = self.segments.iter().position(|s| s.id == segment_id)?;
        Some(self.segments.remove(at))
    }

    fn overlapping(&self, range: DateRange) -> impl Iterator<Item = &Segment> {
        let earliest_start = range
            .start
            .checked_sub_signed(chrono::Duration::days(self.max_span_days))
            .unwrap_or(chrono::NaiveDate::MIN);
        let lo = self
            .segments
            .partition_point(|s| s.start_date < earliest_start);
        let hi = self.segments.partition_point(|s| s.start_date <= range.end);
        self.segments[lo..hi.max(lo)]
            .iter()
            .filter(move |s| s.end_date >= range.start)
    }
}

#[derive(Debug, Clone, Default)]
pub struct SegmentIndex {
    by_kennel: HashMap<String, KennelSegments>,
    kennel_of: HashMap<String, String>,
}

impl SegmentIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_segments(segments: impl IntoIterator<Item = Segment>) -> Self {
        let mut index = Self::new();
        for segment in segments {
            index.insert(segment);
        }
        index
    }

    pub fn len(&self) -> usize {
        self.kennel_of.len()
    }

    pub fn is_empty(&self) -> bool {
        self.kennel_of.is_empty()
    }

    /// Inserts a segment, replacing any previous entry with the same id.
    pub fn insert(&mut self, segment: Segment) {
        self.remove(&segment.id);
        self.kennel_of
            .insert(segment.id.clone(), segment.kennel_id.clone());
        self.by_kennel
            .entry(segment.kennel_id.clone())
            .or_default()
            .insert(segment);
    }

    pub fn remove(&mut self, segment_id: &str) -> Option<Segment> {
        let kennel_id = self.kennel_of.remove(segment_id)?;
        self.by_kennel.get_mut(&kennel_id)?.remove(segment_id)
    }

    pub fn get(&self, segment_id: &str) -> Option<&Segment> {
        let kennel_id = self.kennel_of.get(segment_id)?;
        self.by_kennel
            .get(kennel_id)?
            .segments
            .iter()
            .find(|s| s.id == segment_id)
    }

    /// Applies `f` to a segment in place. Callers must not change its kennel
    /// or dates through this; use `insert` for placement changes.
    pub fn update_in_place(&mut self, segment_id: &str, f: impl FnOnce(&mut Segment)) -> bool {
        let Some(kennel_id) = self.kennel_of.get(segment_id) else {
            return false;
        };
        let Some(entry) = self.by_kennel.get_mut(kennel_id) else {
            return false;
        };
        match entry.segments.iter_mut().find(|s| s.id == segment_id) {
            Some(segment) => {
                f(segment);
                true
            }
            None => false,
        }
    }

    /// All segments of a kennel, ordered by start date.
    pub fn for_kennel(&self, kennel_id: &str) -> &[Segment] {
        self.by_kennel
            .get(kennel_id)
            .map(|k| k.segments.as_slice())
            .unwrap_or(&[])
    }

    /// Segments of a kennel whose stored range intersects `range`
    /// (inclusive on both ends), ordered by start date.
    pub fn overlapping(&self, kennel_id: &str, range: DateRange) -> Vec<&Segment> {
        match self.by_kennel.get(kennel_id) {
            Some(entry) => entry.overlapping(range).collect(),
            None => Vec::new(),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &Segment> {
        self.by_kennel.values().flat_map(|k| k.segments.iter())
    }
}
