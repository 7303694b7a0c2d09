use axum::{
    extract::{rejection::JsonRejection, rejection::QueryRejection, Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;

use crate::domain::entities::{
    CascadeStrategy, CreateKennelRequest, Kennel, KennelRemoval, SetKennelActiveRequest,
    UpdateKennelRequest,
};
use crate::infrastructure::http::middleware::{ApiError, ApiResult, AppState};

// GET /api/kennels - List non-archived kennels
pub async fn list_kennels(State(state): State<AppState>) -> ApiResult<Json<Vec<Kennel>>> {
    let kennels = state.engine.list_kennels().await?;
    Ok(Json(kennels))
}

// POST /api/kennels - Create a kennel
pub async fn create_kennel(
    State(state): State<AppState>,
    payload: Result<Json<CreateKennelRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<Kennel>)> {
    let Json(req) = payload?;
    let kennel = state.engine.catalog.create_kennel(req).await?;
    Ok((StatusCode::CREATED, Json(kennel)))
}

// GET /api/kennels/:id - Get a kennel, archived ones included
pub async fn get_kennel(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Kennel>> {
    let kennel = state.engine.catalog.get_kennel(&id).await?;
    Ok(Json(kennel))
}

// PATCH /api/kennels/:id - Update name, capacity or location
pub async fn update_kennel(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<UpdateKennelRequest>, JsonRejection>,
) -> ApiResult<Json<Kennel>> {
    let Json(req) = payload?;
    let kennel = state.engine.catalog.update_kennel(&id, req).await?;
    Ok(Json(kennel))
}

// PUT /api/kennels/:id/active - Toggle maintenance
pub async fn set_kennel_active(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<SetKennelActiveRequest>, JsonRejection>,
) -> ApiResult<Json<Kennel>> {
    let Json(req) = payload?;
    let kennel = state.engine.set_kennel_active(&id, req.is_active).await?;
    Ok(Json(kennel))
}

#[derive(Debug, Deserialize)]
pub struct DeleteKennelQuery {
    pub strategy: Option<String>,
    pub target: Option<String>,
}

impl DeleteKennelQuery {
    fn into_strategy(self) -> ApiResult<CascadeStrategy> {
        match self.strategy.as_deref().unwrap_or("reject") {
            "reject" => Ok(CascadeStrategy::Reject),
            "keep_historical" => Ok(CascadeStrategy::KeepHistorical),
            "reassign" => match self.target {
                Some(target) if !target.trim().is_empty() => Ok(CascadeStrategy::Reassign {
                    target_kennel_id: target,
                }),
                _ => Err(ApiError::bad_request(
                    "The reassign strategy requires a target kennel",
                )),
            },
            other => Err(ApiError::bad_request(format!(
                "Unknown cascade strategy: {}",
                other
            ))),
        }
    }
}

// DELETE /api/kennels/:id?strategy=reject|keep_historical|reassign&target=
pub async fn delete_kennel(
    State(state): State<AppState>,
    Path(id): Path<String>,
    query: Result<Query<DeleteKennelQuery>, QueryRejection>,
) -> ApiResult<Json<KennelRemoval>> {
    let Query(query) = query?;
    let strategy = query.into_strategy()?;
    let removal = state.engine.delete_kennel(&id, strategy).await?;
    Ok(Json(removal))
}
