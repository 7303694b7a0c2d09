use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::domain::errors::{EngineError, EngineResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BookingStatus {
    Pending,
    Confirmed,
    CheckedIn,
    CheckedOut,
    Cancelled,
}

impl BookingStatus {
    /// Segments of cancelled or checked-out bookings no longer hold capacity.
    pub fn holds_capacity(&self) -> bool {
        !matches!(self, BookingStatus::Cancelled | BookingStatus::CheckedOut)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            BookingStatus::Pending => "PENDING",
            BookingStatus::Confirmed => "CONFIRMED",
            BookingStatus::CheckedIn => "CHECKED_IN",
            BookingStatus::CheckedOut => "CHECKED_OUT",
            BookingStatus::Cancelled => "CANCELLED",
        }
    }
}

impl fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for BookingStatus {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "PENDING" => Ok(BookingStatus::Pending),
            "CONFIRMED" => Ok(BookingStatus::Confirmed),
            "CHECKED_IN" => Ok(BookingStatus::CheckedIn),
            "CHECKED_OUT" => Ok(BookingStatus::CheckedOut),
            "CANCELLED" => Ok(BookingStatus::Cancelled),
            other => Err(EngineError::Validation(format!(
                "Unknown booking status: {}",
                other
            ))),
        }
    }
}

/// Inclusive calendar-date range. A single-day stay has `start == end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> EngineResult<Self> {
        if start > end {
            return Err(EngineError::Validation(format!(
                "Start date {} is after end date {}",
                start, end
            )));
        }
        Ok(Self { start, end })
    }

    pub fn single(day: NaiveDate) -> Self {
        Self {
            start: day,
            end: day,
        }
    }

    pub fn contains(&self, day: NaiveDate) -> bool {
        self.start <= day && day <= self.end
    }

    pub fn overlaps(&self, other: &DateRange) -> bool {
        self.start <= other.end && other.start <= self.end
    }

    /// Number of calendar days covered, counting both ends.
    pub fn num_days(&self) -> i64 {
        (self.end - self.start).num_days() + 1
    }

    pub fn days(&self) -> impl Iterator<Item = NaiveDate> {
        let end = self.end;
        self.start.iter_days().take_while(move |d| *d <= end)
    }
}

impl fmt::Display for DateRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..={}", self.start, self.end)
    }
}

/// One booking's placement in one kennel for one contiguous date range.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Segment {
    pub id: String,
    pub booking_id: String,
    pub kennel_id: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    /// Status of the owning booking, denormalized by the store on read.
    pub booking_status: BookingStatus,
    pub pet_name: String,
    pub owner_name: String,
    /// Incremented on every move; used for optimistic concurrency.
    pub version: i64,
    /// Caller-supplied idempotency key of the `assign` that created it.
    pub operation_id: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl Segment {
    pub fn new(
        booking: &Booking,
        kennel_id: String,
        range: DateRange,
        operation_id: Option<String>,
    ) -> Self {
        let now = chrono::Utc::now().to_rfc3339();
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            booking_id: booking.id.clone(),
            kennel_id,
            start_date: range.start,
            end_date: range.end,
            booking_status: booking.status,
            pet_name: booking.pet_name.clone(),
            owner_name: booking.owner_name.clone(),
            version: 1,
            operation_id,
            created_at: now.clone(),
            updated_at: now,
        }
    }

    pub fn range(&self) -> DateRange {
        DateRange {
            start: self.start_date,
            end: self.end_date,
        }
    }

    pub fn is_active(&self) -> bool {
        self.booking_status.holds_capacity()
    }

    /// Whether the segment is in place with exactly this kennel and range.
    pub fn is_placed_at(&self, kennel_id: &str, range: &DateRange) -> bool {
        self.kennel_id == kennel_id && self.range() == *range
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Booking {
    pub id: String,
    pub status: BookingStatus,
    pub pet_name: String,
    pub owner_name: String,
    /// Ordered by start date.
    pub segments: Vec<Segment>,
    pub created_at: String,
    pub updated_at: String,
}

impl Booking {
    pub fn new(pet_name: String, owner_name: String, status: BookingStatus) -> Self {
        let now = chrono::Utc::now().to_rfc3339();
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            status,
            pet_name,
            owner_name,
            segments: Vec::new(),
            created_at: now.clone(),
            updated_at: now,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateBookingRequest {
    pub pet_name: String,
    pub owner_name: String,
    pub status: Option<BookingStatus>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateBookingStatusRequest {
    pub status: BookingStatus,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignKennelRequest {
    pub kennel_id: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub operation_id: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReassignKennelRequest {
    pub kennel_id: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub expected_version: Option<i64>,
}
