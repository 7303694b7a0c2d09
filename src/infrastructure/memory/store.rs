use crate::domain::entities::{Booking, BookingStatus, DateRange, Kennel, Segment};
use crate::domain::errors::{EngineError, EngineResult};
use crate::domain::ports::booking_repository::{BookingRepository, PlacementChange};
use crate::domain::ports::kennel_repository::KennelRepository;
use crate::domain::services::SegmentIndex;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

#[derive(Default)]
struct StoreState {
    kennels: HashMap<String, Kennel>,
    /// Bookings without their segments; those live in `index`.
    bookings: HashMap<String, Booking>,
    index: SegmentIndex,
    segments_by_booking: HashMap<String, Vec<String>>,
    operations: HashMap<String, String>,
}

impl StoreState {
    fn assemble(&self, booking: &Booking) -> Booking {
        let mut assembled = booking.clone();
        assembled.segments = self
            .segments_by_booking
            .get(&booking.id)
            .map(|ids| {
                ids.iter()
                    .filter_map(|id| self.index.get(id).cloned())
                    .collect()
            })
            .unwrap_or_default();
        assembled
            .segments
            .sort_by(|a, b| (a.start_date, a.id.as_str()).cmp(&(b.start_date, b.id.as_str())));
        assembled
    }

    fn remove_segment(&mut self, segment_id: &str) -> Option<Segment> {
        let segment = self.index.remove(segment_id)?;
        if let Some(ids) = self.segments_by_booking.get_mut(&segment.booking_id) {
            ids.retain(|id| id != segment_id);
        }
        if let Some(op) = &segment.operation_id {
            self.operations.remove(op);
        }
        Some(segment)
    }
}

/// In-process kennel and booking store backed by a per-kennel segment index.
///
/// Every method takes the state lock once, so each call is a single atomic
/// commit as seen by other callers.
#[derive(Clone, Default)]
pub struct InMemoryStore {
    state: Arc<RwLock<StoreState>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl KennelRepository for InMemoryStore {
    async fn create_kennel(&self, kennel: &Kennel) -> EngineResult<()> {
        let mut state = self.state.write().await;
        if state.kennels.contains_key(&kennel.id) {
            return Err(EngineError::Conflict(format!(
                "Kennel {} already exists",
                kennel.id
            )));
        }
        state.kennels.insert(kennel.id.clone(), kennel.clone());
        Ok(())
    }

    async fn get_kennel(&self, id: &str) -> EngineResult<Option<Kennel>> {
        Ok(self.state.read().await.kennels.get(id).cloned())
    }

    async fn list_kennels(&self) -> EngineResult<Vec<Kennel>> {
        let state = self.state.read().await;
        let mut kennels: Vec<Kennel> = state
            .kennels
            .values()
            .filter(|k| !k.is_archived())
            .cloned()
            .collect();
        kennels.sort_by(|a, b| {
            (&a.building, &a.floor, &a.name, &a.id).cmp(&(&b.building, &b.floor, &b.name, &b.id))
        });
        Ok(kennels)
    }

    async fn update_kennel(&self, kennel: &Kennel) -> EngineResult<()> {
        let mut state = self.state.write().await;
        match state.kennels.get_mut(&kennel.id) {
            Some(existing) => {
                *existing = kennel.clone();
                Ok(())
            }
            None => Err(EngineError::NotFound(format!("Kennel {} not found", kennel.id))),
        }
    }

    async fn delete_kennel(&self, id: &str) -> EngineResult<()> {
        let mut state = self.state.write().await;
        if !state.index.for_kennel(id).is_empty() {
            return Err(EngineError::Guard(format!(
                "Kennel {} is still referenced by segments",
                id
            )));
        }
        state
            .kennels
            .remove(id)
            .map(|_| ())
            .ok_or_else(|| EngineError::NotFound(format!("Kennel {} not found", id)))
    }
}

#[async_trait]
impl BookingRepository for InMemoryStore {
    async fn create_booking(&self, booking: &Booking) -> EngineResult<()> {
        let mut state = self.state.write().await;
        if state.bookings.contains_key(&booking.id) {
            return Err(EngineError::Conflict(format!(
                "Booking {} already exists",
                booking.id
            )));
        }
        let mut stored = booking.clone();
        stored.segments.clear();
        state.bookings.insert(stored.id.clone(), stored);
        Ok(())
    }

    async fn get_booking(&self, id: &str) -> EngineResult<Option<Booking>> {
        let state = self.state.read().await;
        Ok(state.bookings.get(id).map(|b| state.assemble(b)))
    }

    async fn list_bookings(&self) -> EngineResult<Vec<Booking>> {
        let state = self.state.read().await;
        let mut bookings: Vec<Booking> = state.bookings.values().map(|b| state.assemble(b)).collect();
        bookings.sort_by(|a, b| (&a.created_at, &a.id).cmp(&(&b.created_at, &b.id)));
        Ok(bookings)
    }

    async fn update_booking_status(&self, id: &str, status: BookingStatus) -> EngineResult<()> {
        let mut state = self.state.write().await;
        let now = chrono::Utc::now().to_rfc3339();
        let booking = state
            .bookings
            .get_mut(id)
            .ok_or_else(|| EngineError::NotFound(format!("Booking {} not found", id)))?;
        booking.status = status;
        booking.updated_at = now;

        let segment_ids = state.segments_by_booking.get(id).cloned().unwrap_or_default();
        for segment_id in segment_ids {
            state
                .index
                .update_in_place(&segment_id, |s| s.booking_status = status);
        }
        Ok(())
    }

    async fn cancel_booking(&self, id: &str) -> EngineResult<Vec<Segment>> {
        let mut state = self.state.write().await;
        let now = chrono::Utc::now().to_rfc3339();
        let booking = state
            .bookings
            .get_mut(id)
            .ok_or_else(|| EngineError::NotFound(format!("Booking {} not found", id)))?;
        booking.status = BookingStatus::Cancelled;
        booking.updated_at = now;

        let segment_ids = state.segments_by_booking.remove(id).unwrap_or_default();
        let mut removed = Vec::with_capacity(segment_ids.len());
        for segment_id in segment_ids {
            if let Some(segment) = state.remove_segment(&segment_id) {
                removed.push(segment);
            }
        }
        Ok(removed)
    }

    async fn get_segment(&self, id: &str) -> EngineResult<Option<Segment>> {
        Ok(self.state.read().await.index.get(id).cloned())
    }

    async fn find_segment_by_operation(&self, operation_id: &str) -> EngineResult<Option<Segment>> {
        let state = self.state.read().await;
        Ok(state
            .operations
            .get(operation_id)
            .and_then(|id| state.index.get(id))
            .cloned())
    }

    async fn segments_for_kennel(
        &self,
        kennel_id: &str,
        range: Option<DateRange>,
    ) -> EngineResult<Vec<Segment>> {
        let state = self.state.read().await;
        Ok(match range {
            Some(range) => state
                .index
                .overlapping(kennel_id, range)
                .into_iter()
                .cloned()
                .collect(),
            None => state.index.for_kennel(kennel_id).to_vec(),
        })
    }

    async fn segments_in_range(&self, range: DateRange) -> EngineResult<Vec<Segment>> {
        let state = self.state.read().await;
        let mut segments = Vec::new();
        for kennel_id in state.kennels.keys() {
            segments.extend(state.index.overlapping(kennel_id, range).into_iter().cloned());
        }
        Ok(segments)
    }

    async fn insert_segment(&self, segment: &Segment) -> EngineResult<()> {
        let mut state = self.state.write().await;
        let status = state
            .bookings
            .get(&segment.booking_id)
            .map(|b| b.status)
            .ok_or_else(|| {
                EngineError::NotFound(format!("Booking {} not found", segment.booking_id))
            })?;
        if !state.kennels.contains_key(&segment.kennel_id) {
            return Err(EngineError::NotFound(format!(
                "Kennel {} not found",
                segment.kennel_id
            )));
        }
        if state.index.get(&segment.id).is_some() {
            return Err(EngineError::Conflict(format!(
                "Segment {} already exists",
                segment.id
            )));
        }
        if let Some(op) = &segment.operation_id {
            if state.operations.contains_key(op) {
                return Err(EngineError::Conflict(format!(
                    "Operation {} was already applied",
                    op
                )));
            }
            state.operations.insert(op.clone(), segment.id.clone());
        }

        let mut stored = segment.clone();
        stored.booking_status = status;
        state
            .segments_by_booking
            .entry(stored.booking_id.clone())
            .or_default()
            .push(stored.id.clone());
        state.index.insert(stored);
        Ok(())
    }

    async fn apply_placements(&self, changes: &[PlacementChange]) -> EngineResult<Vec<Segment>> {
        let mut state = self.state.write().await;

        // Validate everything before touching anything.
        let mut updated = Vec::with_capacity(changes.len());
        for change in changes {
            let current = state.index.get(&change.segment_id).ok_or_else(|| {
                EngineError::NotFound(format!("Segment {} not found", change.segment_id))
            })?;
            if current.version != change.expected_version {
                return Err(EngineError::Conflict(format!(
                    "Segment {} changed concurrently (version {} != {})",
                    current.id, current.version, change.expected_version
                )));
            }
            if !state.kennels.contains_key(&change.kennel_id) {
                return Err(EngineError::NotFound(format!(
                    "Kennel {} not found",
                    change.kennel_id
                )));
            }
            let mut next = current.clone();
            next.kennel_id = change.kennel_id.clone();
            next.start_date = change.range.start;
            next.end_date = change.range.end;
            next.version += 1;
            next.updated_at = chrono::Utc::now().to_rfc3339();
            updated.push(next);
        }

        for segment in &updated {
            state.index.insert(segment.clone());
        }
        Ok(updated)
    }

    async fn delete_segment(&self, id: &str) -> EngineResult<()> {
        let mut state = self.state.write().await;
        state
            .remove_segment(id)
            .map(|_| ())
            .ok_or_else(|| EngineError::NotFound(format!("Segment {} not found", id)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn d(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    async fn seeded() -> (InMemoryStore, Kennel, Booking, Segment) {
        let store = InMemoryStore::new();
        let kennel = Kennel::new("A".into(), 2, None, None);
        store.create_kennel(&kennel).await.unwrap();
        let booking = Booking::new("Rex".into(), "Sam".into(), BookingStatus::Confirmed);
        store.create_booking(&booking).await.unwrap();
        let range = DateRange::new(d("2024-01-01"), d("2024-01-03")).unwrap();
        let segment = Segment::new(&booking, kennel.id.clone(), range, Some("op-1".into()));
        store.insert_segment(&segment).await.unwrap();
        (store, kennel, booking, segment)
    }

    #[tokio::test]
    async fn booking_reads_include_segments_with_current_status() {
        let (store, _kennel, booking, segment) = seeded().await;
        store
            .update_booking_status(&booking.id, BookingStatus::CheckedIn)
            .await
            .unwrap();

        let loaded = store.get_booking(&booking.id).await.unwrap().unwrap();
        assert_eq!(loaded.segments.len(), 1);
        assert_eq!(loaded.segments[0].id, segment.id);
        assert_eq!(loaded.segments[0].booking_status, BookingStatus::CheckedIn);
    }

    #[tokio::test]
    async fn stale_version_rejects_the_whole_batch() {
        let (store, kennel, _booking, segment) = seeded().await;
        let range = DateRange::new(d("2024-02-01"), d("2024-02-02")).unwrap();
        let change = PlacementChange {
            segment_id: segment.id.clone(),
            kennel_id: kennel.id.clone(),
            range,
            expected_version: segment.version + 1,
        };
        let err = store.apply_placements(&[change]).await.unwrap_err();
        assert!(matches!(err, EngineError::Conflict(_)));

        let unchanged = store.get_segment(&segment.id).await.unwrap().unwrap();
        assert_eq!(unchanged.range(), segment.range());
        assert_eq!(unchanged.version, 1);
    }

    #[tokio::test]
    async fn cancel_releases_segments_and_operation_ids() {
        let (store, kennel, booking, segment) = seeded().await;
        let removed = store.cancel_booking(&booking.id).await.unwrap();
        assert_eq!(removed.len(), 1);
        assert!(store.get_segment(&segment.id).await.unwrap().is_none());
        assert!(store.find_segment_by_operation("op-1").await.unwrap().is_none());
        assert!(store.segments_for_kennel(&kennel.id, None).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn referenced_kennel_cannot_be_hard_deleted() {
        let (store, kennel, _booking, _segment) = seeded().await;
        let err = store.delete_kennel(&kennel.id).await.unwrap_err();
        assert!(matches!(err, EngineError::Guard(_)));
    }
}
