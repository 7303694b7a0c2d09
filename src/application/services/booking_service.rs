use crate::application::services::lock_scope::{booking_key, kennel_key, LockScope};
use crate::domain::entities::{Booking, BookingStatus, CreateBookingRequest, Segment};
use crate::domain::errors::{EngineError, EngineResult};
use crate::domain::ports::booking_repository::BookingRepository;
use crate::domain::services::validate_transition;
use std::sync::Arc;

/// Bookings and the lifecycle of their segments outside of placement.
#[derive(Clone)]
pub struct BookingService {
    booking_repo: Arc<dyn BookingRepository>,
    lock_scope: LockScope,
}

impl BookingService {
    pub fn new(booking_repo: Arc<dyn BookingRepository>, lock_scope: LockScope) -> Self {
        Self {
            booking_repo,
            lock_scope,
        }
    }

    pub async fn create_booking(&self, request: CreateBookingRequest) -> EngineResult<Booking> {
        let pet_name = request.pet_name.trim().to_string();
        if pet_name.is_empty() {
            return Err(EngineError::Validation("Pet name is required".to_string()));
        }
        let owner_name = request.owner_name.trim().to_string();
        if owner_name.is_empty() {
            return Err(EngineError::Validation("Owner name is required".to_string()));
        }

        let status = request.status.unwrap_or(BookingStatus::Pending);
        if !status.holds_capacity() {
            return Err(EngineError::Validation(format!(
                "A booking cannot be created as {}",
                status
            )));
        }

        let booking = Booking::new(pet_name, owner_name, status);
        self.booking_repo.create_booking(&booking).await?;
        tracing::info!("Created booking {} ({})", booking.id, booking.status);
        Ok(booking)
    }

    pub async fn list_bookings(&self) -> EngineResult<Vec<Booking>> {
        self.booking_repo.list_bookings().await
    }

    pub async fn get_booking(&self, id: &str) -> EngineResult<Booking> {
        self.booking_repo
            .get_booking(id)
            .await?
            .ok_or_else(|| EngineError::NotFound(format!("Booking {} not found", id)))
    }

    /// Moves a booking through its lifecycle. Cancelling also removes its
    /// segments; checking out keeps them as history.
    pub async fn update_status(&self, id: &str, status: BookingStatus) -> EngineResult<Booking> {
        self.lock_scope
            .run(vec![booking_key(id)], || async {
                let booking = self.get_booking(id).await?;
                validate_transition(booking.status, status)?;
                if booking.status == status {
                    return Ok(booking);
                }

                if status == BookingStatus::Cancelled {
                    let removed = self.booking_repo.cancel_booking(id).await?;
                    tracing::info!(
                        "Cancelled booking {} and released {} segments",
                        id,
                        removed.len()
                    );
                } else {
                    self.booking_repo.update_booking_status(id, status).await?;
                    tracing::info!(
                        "Booking {} status changed from {} to {}",
                        id,
                        booking.status,
                        status
                    );
                }

                self.get_booking(id).await
            })
            .await
    }

    /// Removes one segment from its booking.
    pub async fn unassign_segment(&self, segment_id: &str) -> EngineResult<Segment> {
        let segment = self
            .booking_repo
            .get_segment(segment_id)
            .await?
            .ok_or_else(|| EngineError::NotFound(format!("Segment {} not found", segment_id)))?;

        let keys = vec![booking_key(&segment.booking_id), kennel_key(&segment.kennel_id)];
        self.lock_scope
            .run(keys, || async {
                let current = self
                    .booking_repo
                    .get_segment(segment_id)
                    .await?
                    .ok_or_else(|| {
                        EngineError::NotFound(format!("Segment {} not found", segment_id))
                    })?;
                self.booking_repo.delete_segment(segment_id).await?;
                tracing::info!(
                    "Unassigned segment {} of booking {} from kennel {}",
                    current.id,
                    current.booking_id,
                    current.kennel_id
                );
                Ok(current)
            })
            .await
    }
}
