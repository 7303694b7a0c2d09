use crate::domain::entities::{Booking, BookingStatus, DateRange, Segment};
use crate::domain::errors::{EngineError, EngineResult};
use crate::domain::ports::booking_repository::{BookingRepository, PlacementChange};
use crate::infrastructure::persistence::{format_date, parse_date, Database};
use async_trait::async_trait;
use sqlx::{sqlite::SqliteRow, Row};
use std::collections::HashMap;

const BOOKING_COLUMNS: &str = "id, status, pet_name, owner_name, created_at, updated_at";

/// Segment columns joined with the owning booking's status and names.
const SEGMENT_SELECT: &str = "SELECT s.id, s.booking_id, s.kennel_id, s.start_date, s.end_date,
            s.version, s.operation_id, s.created_at, s.updated_at,
            b.status AS booking_status, b.pet_name, b.owner_name
     FROM segments s
     JOIN bookings b ON b.id = s.booking_id";

fn booking_from_row(row: &SqliteRow) -> EngineResult<Booking> {
    let status: String = row.try_get("status")?;
    Ok(Booking {
        id: row.try_get("id")?,
        status: status.parse()?,
        pet_name: row.try_get("pet_name")?,
        owner_name: row.try_get("owner_name")?,
        segments: Vec::new(),
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

fn segment_from_row(row: &SqliteRow) -> EngineResult<Segment> {
    let status: String = row.try_get("booking_status")?;
    let start_date: String = row.try_get("start_date")?;
    let end_date: String = row.try_get("end_date")?;
    Ok(Segment {
        id: row.try_get("id")?,
        booking_id: row.try_get("booking_id")?,
        kennel_id: row.try_get("kennel_id")?,
        start_date: parse_date(&start_date)?,
        end_date: parse_date(&end_date)?,
        booking_status: status.parse()?,
        pet_name: row.try_get("pet_name")?,
        owner_name: row.try_get("owner_name")?,
        version: row.try_get("version")?,
        operation_id: row.try_get("operation_id")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

impl Database {
    async fn segments_of_booking(&self, booking_id: &str) -> EngineResult<Vec<Segment>> {
        let rows = sqlx::query(&format!(
            "{} WHERE s.booking_id = ? ORDER BY s.start_date, s.id",
            SEGMENT_SELECT
        ))
        .bind(booking_id)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(segment_from_row).collect()
    }
}

#[async_trait]
impl BookingRepository for Database {
    async fn create_booking(&self, booking: &Booking) -> EngineResult<()> {
        sqlx::query(
            "INSERT INTO bookings (id, status, pet_name, owner_name, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(&booking.id)
        .bind(booking.status.as_str())
        .bind(&booking.pet_name)
        .bind(&booking.owner_name)
        .bind(&booking.created_at)
        .bind(&booking.updated_at)
        .execute(&self.pool)
        .await?;

        tracing::debug!("Booking row inserted: id={}", booking.id);
        Ok(())
    }

    async fn get_booking(&self, id: &str) -> EngineResult<Option<Booking>> {
        let row = sqlx::query(&format!("SELECT {} FROM bookings WHERE id = ?", BOOKING_COLUMNS))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        match row {
            Some(row) => {
                let mut booking = booking_from_row(&row)?;
                booking.segments = self.segments_of_booking(id).await?;
                Ok(Some(booking))
            }
            None => Ok(None),
        }
    }

    async fn list_bookings(&self) -> EngineResult<Vec<Booking>> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM bookings ORDER BY created_at, id",
            BOOKING_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await?;
        let segment_rows = sqlx::query(&format!("{} ORDER BY s.start_date, s.id", SEGMENT_SELECT))
            .fetch_all(&self.pool)
            .await?;

        let mut by_booking: HashMap<String, Vec<Segment>> = HashMap::new();
        for row in &segment_rows {
            let segment = segment_from_row(row)?;
            by_booking
                .entry(segment.booking_id.clone())
                .or_default()
                .push(segment);
        }

        rows.iter()
            .map(|row| -> EngineResult<Booking> {
                let mut booking = booking_from_row(row)?;
                booking.segments = by_booking.remove(&booking.id).unwrap_or_default();
                Ok(booking)
            })
            .collect()
    }

    async fn update_booking_status(&self, id: &str, status: BookingStatus) -> EngineResult<()> {
        let result = sqlx::query("UPDATE bookings SET status = ?, updated_at = ? WHERE id = ?")
            .bind(status.as_str())
            .bind(chrono::Utc::now().to_rfc3339())
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(EngineError::NotFound(format!("Booking {} not found", id)));
        }
        Ok(())
    }

    async fn cancel_booking(&self, id: &str) -> EngineResult<Vec<Segment>> {
        let mut tx = self.pool.begin().await?;

        let result = sqlx::query("UPDATE bookings SET status = ?, updated_at = ? WHERE id = ?")
            .bind(BookingStatus::Cancelled.as_str())
            .bind(chrono::Utc::now().to_rfc3339())
            .bind(id)
            .execute(&mut *tx)
            .await?;
        if result.rows_affected() == 0 {
            return Err(EngineError::NotFound(format!("Booking {} not found", id)));
        }

        let rows = sqlx::query(&format!(
            "{} WHERE s.booking_id = ? ORDER BY s.start_date, s.id",
            SEGMENT_SELECT
        ))
        .bind(id)
        .fetch_all(&mut *tx)
        .await?;
        let removed = rows
            .iter()
            .map(segment_from_row)
            .collect::<EngineResult<Vec<Segment>>>()?;

        sqlx::query("DELETE FROM segments WHERE booking_id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(removed)
    }

    async fn get_segment(&self, id: &str) -> EngineResult<Option<Segment>> {
        let row = sqlx::query(&format!("{} WHERE s.id = ?", SEGMENT_SELECT))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(segment_from_row).transpose()
    }

    async fn find_segment_by_operation(&self, operation_id: &str) -> EngineResult<Option<Segment>> {
        let row = sqlx::query(&format!("{} WHERE s.operation_id = ?", SEGMENT_SELECT))
            .bind(operation_id)
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(segment_from_row).transpose()
    }

    async fn segments_for_kennel(
        &self,
        kennel_id: &str,
        range: Option<DateRange>,
    ) -> EngineResult<Vec<Segment>> {
        let rows = match range {
            Some(range) => {
                sqlx::query(&format!(
                    "{} WHERE s.kennel_id = ? AND s.start_date <= ? AND s.end_date >= ?
                     ORDER BY s.start_date, s.id",
                    SEGMENT_SELECT
                ))
                .bind(kennel_id)
                .bind(format_date(range.end))
                .bind(format_date(range.start))
                .fetch_all(&self.pool)
                .await?
            }
            None => {
                sqlx::query(&format!(
                    "{} WHERE s.kennel_id = ? ORDER BY s.start_date, s.id",
                    SEGMENT_SELECT
                ))
                .bind(kennel_id)
                .fetch_all(&self.pool)
                .await?
            }
        };

        rows.iter().map(segment_from_row).collect()
    }

    async fn segments_in_range(&self, range: DateRange) -> EngineResult<Vec<Segment>> {
        let rows = sqlx::query(&format!(
            "{} WHERE s.start_date <= ? AND s.end_date >= ?
             ORDER BY s.kennel_id, s.start_date, s.id",
            SEGMENT_SELECT
        ))
        .bind(format_date(range.end))
        .bind(format_date(range.start))
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(segment_from_row).collect()
    }

    async fn insert_segment(&self, segment: &Segment) -> EngineResult<()> {
        let booking_exists: Option<String> = sqlx::query_scalar("SELECT id FROM bookings WHERE id = ?")
            .bind(&segment.booking_id)
            .fetch_optional(&self.pool)
            .await?;
        if booking_exists.is_none() {
            return Err(EngineError::NotFound(format!(
                "Booking {} not found",
                segment.booking_id
            )));
        }
        let kennel_exists: Option<String> = sqlx::query_scalar("SELECT id FROM kennels WHERE id = ?")
            .bind(&segment.kennel_id)
            .fetch_optional(&self.pool)
            .await?;
        if kennel_exists.is_none() {
            return Err(EngineError::NotFound(format!(
                "Kennel {} not found",
                segment.kennel_id
            )));
        }

        sqlx::query(
            "INSERT INTO segments (id, booking_id, kennel_id, start_date, end_date, version, operation_id, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&segment.id)
        .bind(&segment.booking_id)
        .bind(&segment.kennel_id)
        .bind(format_date(segment.start_date))
        .bind(format_date(segment.end_date))
        .bind(segment.version)
        .bind(&segment.operation_id)
        .bind(&segment.created_at)
        .bind(&segment.updated_at)
        .execute(&self.pool)
        .await?;

        tracing::debug!(
            "Segment row inserted: id={}, kennel={}, range={}",
            segment.id,
            segment.kennel_id,
            segment.range()
        );
        Ok(())
    }

    async fn apply_placements(&self, changes: &[PlacementChange]) -> EngineResult<Vec<Segment>> {
        let mut tx = self.pool.begin().await?;
        let now = chrono::Utc::now().to_rfc3339();

        for change in changes {
            let kennel_exists: Option<String> =
                sqlx::query_scalar("SELECT id FROM kennels WHERE id = ?")
                    .bind(&change.kennel_id)
                    .fetch_optional(&mut *tx)
                    .await?;
            if kennel_exists.is_none() {
                return Err(EngineError::NotFound(format!(
                    "Kennel {} not found",
                    change.kennel_id
                )));
            }

            let result = sqlx::query(
                "UPDATE segments
                 SET kennel_id = ?, start_date = ?, end_date = ?, version = version + 1, updated_at = ?
                 WHERE id = ? AND version = ?",
            )
            .bind(&change.kennel_id)
            .bind(format_date(change.range.start))
            .bind(format_date(change.range.end))
            .bind(&now)
            .bind(&change.segment_id)
            .bind(change.expected_version)
            .execute(&mut *tx)
            .await?;

            if result.rows_affected() == 0 {
                let current: Option<i64> =
                    sqlx::query_scalar("SELECT version FROM segments WHERE id = ?")
                        .bind(&change.segment_id)
                        .fetch_optional(&mut *tx)
                        .await?;
                // Dropping the transaction rolls back earlier changes.
                return Err(match current {
                    Some(version) => EngineError::Conflict(format!(
                        "Segment {} changed concurrently (version {} != {})",
                        change.segment_id, version, change.expected_version
                    )),
                    None => {
                        EngineError::NotFound(format!("Segment {} not found", change.segment_id))
                    }
                });
            }
        }

        tx.commit().await?;

        let mut updated = Vec::with_capacity(changes.len());
        for change in changes {
            let segment = self.get_segment(&change.segment_id).await?.ok_or_else(|| {
                EngineError::NotFound(format!("Segment {} not found", change.segment_id))
            })?;
            updated.push(segment);
        }
        Ok(updated)
    }

    async fn delete_segment(&self, id: &str) -> EngineResult<()> {
        let result = sqlx::query("DELETE FROM segments WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(EngineError::NotFound(format!("Segment {} not found", id)));
        }
        Ok(())
    }
}
