use axum::{
    extract::{rejection::JsonRejection, Path, State},
    Json,
};

use crate::domain::entities::{ReassignKennelRequest, Segment};
use crate::infrastructure::http::middleware::{ApiResult, AppState};

// PUT /api/segments/:id - Move a segment to another kennel or date range
pub async fn reassign_segment(
    State(state): State<AppState>,
    Path(segment_id): Path<String>,
    payload: Result<Json<ReassignKennelRequest>, JsonRejection>,
) -> ApiResult<Json<Segment>> {
    let Json(req) = payload?;
    let segment = state
        .engine
        .reassignments
        .move_segment(&segment_id, req)
        .await?;
    Ok(Json(segment))
}

// DELETE /api/segments/:id - Remove a segment from its booking
pub async fn unassign_segment(
    State(state): State<AppState>,
    Path(segment_id): Path<String>,
) -> ApiResult<Json<Segment>> {
    let segment = state.engine.bookings.unassign_segment(&segment_id).await?;
    Ok(Json(segment))
}
