use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    Json,
};

use crate::domain::entities::{
    AssignKennelRequest, Booking, CreateBookingRequest, Segment, UpdateBookingStatusRequest,
};
use crate::infrastructure::http::middleware::{ApiResult, AppState};

// GET /api/bookings - List bookings with their segments
pub async fn list_bookings(State(state): State<AppState>) -> ApiResult<Json<Vec<Booking>>> {
    let bookings = state.engine.list_bookings().await?;
    Ok(Json(bookings))
}

// POST /api/bookings - Create a booking
pub async fn create_booking(
    State(state): State<AppState>,
    payload: Result<Json<CreateBookingRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<Booking>)> {
    let Json(req) = payload?;
    let booking = state.engine.bookings.create_booking(req).await?;
    Ok((StatusCode::CREATED, Json(booking)))
}

// GET /api/bookings/:id - Get a booking
pub async fn get_booking(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Booking>> {
    let booking = state.engine.bookings.get_booking(&id).await?;
    Ok(Json(booking))
}

// PATCH /api/bookings/:id/status - Move a booking through its lifecycle
pub async fn update_booking_status(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<UpdateBookingStatusRequest>, JsonRejection>,
) -> ApiResult<Json<Booking>> {
    let Json(req) = payload?;
    let booking = state.engine.bookings.update_status(&id, req.status).await?;
    Ok(Json(booking))
}

// POST /api/bookings/:id/segments - Assign a kennel for a date range
pub async fn assign_kennel(
    State(state): State<AppState>,
    Path(booking_id): Path<String>,
    payload: Result<Json<AssignKennelRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<Segment>)> {
    let Json(req) = payload?;
    let segment = state.engine.assignments.assign(&booking_id, req).await?;
    Ok((StatusCode::CREATED, Json(segment)))
}
