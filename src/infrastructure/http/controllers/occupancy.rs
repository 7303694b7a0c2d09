use axum::{
    extract::{rejection::QueryRejection, Query, State},
    Json,
};
use chrono::NaiveDate;
use serde::Deserialize;

use crate::domain::entities::{LocationGroup, OccupancyReport, OccupancySnapshot};
use crate::infrastructure::http::middleware::{ApiResult, AppState};

#[derive(Debug, Deserialize)]
pub struct RangeQuery {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

#[derive(Debug, Deserialize)]
pub struct DateQuery {
    pub date: NaiveDate,
}

// GET /api/occupancy?start=&end= - Per-kennel report with facility summary
pub async fn occupancy_report(
    State(state): State<AppState>,
    query: Result<Query<RangeQuery>, QueryRejection>,
) -> ApiResult<Json<OccupancyReport>> {
    let Query(range) = query?;
    let report = state.engine.occupancy(range.start, range.end).await?;
    Ok(Json(report))
}

// GET /api/occupancy/daily?start=&end= - Heatmap cells, one per kennel per day
pub async fn daily_occupancy(
    State(state): State<AppState>,
    query: Result<Query<RangeQuery>, QueryRejection>,
) -> ApiResult<Json<Vec<OccupancySnapshot>>> {
    let Query(range) = query?;
    let snapshots = state.engine.occupancy.daily(range.start, range.end).await?;
    Ok(Json(snapshots))
}

// GET /api/occupancy/locations?date= - Occupancy grouped by building and floor
pub async fn location_occupancy(
    State(state): State<AppState>,
    query: Result<Query<DateQuery>, QueryRejection>,
) -> ApiResult<Json<Vec<LocationGroup>>> {
    let Query(q) = query?;
    let groups = state.engine.occupancy.locations(q.date).await?;
    Ok(Json(groups))
}
