use crate::domain::entities::{Booking, BookingStatus, DateRange, Segment};
use crate::domain::errors::EngineResult;

/// New placement for an existing segment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlacementChange {
    pub segment_id: String,
    pub kennel_id: String,
    pub range: DateRange,
    /// Version the caller validated against; the store refuses the change
    /// with `ConflictError` if the segment has moved since.
    pub expected_version: i64,
}

/// Storage for bookings and their segments.
///
/// Segments returned by any method carry the current status of their
/// booking in `booking_status`.
#[async_trait::async_trait]
pub trait BookingRepository: Send + Sync {
    async fn create_booking(&self, booking: &Booking) -> EngineResult<()>;

    /// Booking with its segments ordered by start date.
    async fn get_booking(&self, id: &str) -> EngineResult<Option<Booking>>;

    async fn list_bookings(&self) -> EngineResult<Vec<Booking>>;

    async fn update_booking_status(&self, id: &str, status: BookingStatus) -> EngineResult<()>;

    /// Marks the booking cancelled and removes its segments in one commit.
    /// Returns the removed segments.
    async fn cancel_booking(&self, id: &str) -> EngineResult<Vec<Segment>>;

    async fn get_segment(&self, id: &str) -> EngineResult<Option<Segment>>;

    async fn find_segment_by_operation(&self, operation_id: &str) -> EngineResult<Option<Segment>>;

    /// Segments on `kennel_id` whose stored range intersects `range`, or all
    /// of the kennel's segments when `range` is `None`. Every booking status
    /// is included.
    async fn segments_for_kennel(
        &self,
        kennel_id: &str,
        range: Option<DateRange>,
    ) -> EngineResult<Vec<Segment>>;

    /// Segments on any kennel whose stored range intersects `range`.
    async fn segments_in_range(&self, range: DateRange) -> EngineResult<Vec<Segment>>;

    async fn insert_segment(&self, segment: &Segment) -> EngineResult<()>;

    /// Applies all changes or none, bumping each segment's version.
    async fn apply_placements(&self, changes: &[PlacementChange]) -> EngineResult<Vec<Segment>>;

    async fn delete_segment(&self, id: &str) -> EngineResult<()>;
}
