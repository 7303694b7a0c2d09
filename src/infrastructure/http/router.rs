use crate::infrastructure::http::controllers::{bookings, kennels, occupancy, segments};
use crate::infrastructure::http::middleware::AppState;
use axum::{
    routing::{get, patch, post, put},
    Json, Router,
};
use serde_json::{json, Value};
use tower_http::{cors::CorsLayer, limit::RequestBodyLimitLayer, trace::TraceLayer};

const MAX_BODY_BYTES: usize = 64 * 1024;

pub fn build_router(state: AppState) -> Router {
    let api = Router::new()
        .route(
            "/api/kennels",
            get(kennels::list_kennels).post(kennels::create_kennel),
        )
        .route(
            "/api/kennels/:id",
            get(kennels::get_kennel)
                .patch(kennels::update_kennel)
                .delete(kennels::delete_kennel),
        )
        .route("/api/kennels/:id/active", put(kennels::set_kennel_active))
        .route(
            "/api/bookings",
            get(bookings::list_bookings).post(bookings::create_booking),
        )
        .route("/api/bookings/:id", get(bookings::get_booking))
        .route(
            "/api/bookings/:id/status",
            patch(bookings::update_booking_status),
        )
        .route("/api/bookings/:id/segments", post(bookings::assign_kennel))
        .route(
            "/api/segments/:id",
            put(segments::reassign_segment).delete(segments::unassign_segment),
        )
        .route("/api/occupancy", get(occupancy::occupancy_report))
        .route("/api/occupancy/daily", get(occupancy::daily_occupancy))
        .route(
            "/api/occupancy/locations",
            get(occupancy::location_occupancy),
        );

    Router::new()
        .route("/health", get(health_handler))
        .merge(api)
        .layer(RequestBodyLimitLayer::new(MAX_BODY_BYTES))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health_handler() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}
