/// HTTP surface: routing, JSON shapes and error-kind to status mapping.
mod helpers;

use axum::{
    body::Body,
    http::{Method, Request, StatusCode},
    Router,
};
use helpers::*;
use kennelbook::infrastructure::http::middleware::AppState;
use kennelbook::infrastructure::http::router::build_router;
use serde_json::{json, Value};
use tower::ServiceExt;

fn app() -> Router {
    build_router(AppState::new(setup_memory_engine()))
}

async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    let body = match body {
        Some(json) => {
            builder = builder.header("content-type", "application/json");
            Body::from(json.to_string())
        }
        None => Body::empty(),
    };
    let response = app
        .clone()
        .oneshot(builder.body(body).unwrap())
        .await
        .unwrap();

    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

async fn create_kennel(app: &Router, name: &str, capacity: u32) -> String {
    let (status, body) = send(
        app,
        Method::POST,
        "/api/kennels",
        Some(json!({ "name": name, "capacity": capacity, "building": "North" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    body["id"].as_str().unwrap().to_string()
}

async fn create_booking(app: &Router, pet: &str) -> String {
    let (status, body) = send(
        app,
        Method::POST,
        "/api/bookings",
        Some(json!({ "petName": pet, "ownerName": "Dana", "status": "CONFIRMED" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    body["id"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn test_health() {
    let (status, body) = send(&app(), Method::GET, "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn test_kennel_crud_over_http() {
    let app = app();
    let id = create_kennel(&app, "Run 1", 2).await;

    let (status, body) = send(&app, Method::GET, &format!("/api/kennels/{}", id), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "Run 1");
    assert_eq!(body["building"], "North");
    assert_eq!(body["floor"], "Main Floor");
    assert_eq!(body["isActive"], true);

    let (status, body) = send(
        &app,
        Method::PATCH,
        &format!("/api/kennels/{}", id),
        Some(json!({ "capacity": 4 })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["capacity"], 4);

    let (status, body) = send(
        &app,
        Method::PUT,
        &format!("/api/kennels/{}/active", id),
        Some(json!({ "isActive": false })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["isActive"], false);

    let (status, body) = send(&app, Method::GET, "/api/kennels", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 1);

    let (status, body) = send(&app, Method::DELETE, &format!("/api/kennels/{}", id), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["outcome"], "deleted");

    let (status, body) = send(&app, Method::GET, &format!("/api/kennels/{}", id), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["errorKind"], "NotFoundError");
}

#[tokio::test]
async fn test_assign_move_and_capacity_errors_over_http() {
    let app = app();
    let kennel_a = create_kennel(&app, "A", 1).await;
    let kennel_b = create_kennel(&app, "B", 1).await;
    let rex = create_booking(&app, "Rex").await;
    let bella = create_booking(&app, "Bella").await;

    let (status, segment) = send(
        &app,
        Method::POST,
        &format!("/api/bookings/{}/segments", rex),
        Some(json!({
            "kennelId": kennel_a,
            "startDate": "2024-01-01",
            "endDate": "2024-01-03",
            "operationId": "drag-1"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(segment["version"], 1);
    assert_eq!(segment["bookingStatus"], "CONFIRMED");
    let segment_id = segment["id"].as_str().unwrap().to_string();

    let (status, body) = send(
        &app,
        Method::POST,
        &format!("/api/bookings/{}/segments", bella),
        Some(json!({
            "kennelId": kennel_a,
            "startDate": "2024-01-03",
            "endDate": "2024-01-04"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["errorKind"], "CapacityExceededError");
    assert!(body["message"].as_str().unwrap().contains("full"));

    let (status, moved) = send(
        &app,
        Method::PUT,
        &format!("/api/segments/{}", segment_id),
        Some(json!({
            "kennelId": kennel_b,
            "startDate": "2024-01-01",
            "endDate": "2024-01-03",
            "expectedVersion": 1
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(moved["kennelId"], kennel_b.as_str());
    assert_eq!(moved["version"], 2);

    let (status, report) = send(
        &app,
        Method::GET,
        "/api/occupancy?start=2024-01-02&end=2024-01-02",
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(report["summary"]["totalCapacity"], 2);
    assert_eq!(report["summary"]["totalOccupied"], 1);

    let (status, cells) = send(
        &app,
        Method::GET,
        "/api/occupancy/daily?start=2024-01-01&end=2024-01-03",
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(cells.as_array().unwrap().len(), 6);

    let (status, groups) = send(
        &app,
        Method::GET,
        "/api/occupancy/locations?date=2024-01-02",
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(groups[0]["building"], "North");
    assert_eq!(groups[0]["bucket"], "medium");

    let (status, _) = send(&app, Method::DELETE, &format!("/api/segments/{}", segment_id), None).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_inactive_kennel_maps_to_unprocessable() {
    let app = app();
    let kennel = create_kennel(&app, "A", 1).await;
    let rex = create_booking(&app, "Rex").await;
    send(
        &app,
        Method::PUT,
        &format!("/api/kennels/{}/active", kennel),
        Some(json!({ "isActive": false })),
    )
    .await;

    let (status, body) = send(
        &app,
        Method::POST,
        &format!("/api/bookings/{}/segments", rex),
        Some(json!({ "kennelId": kennel, "startDate": "2024-01-01", "endDate": "2024-01-01" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["errorKind"], "InactiveResourceError");
}

#[tokio::test]
async fn test_booking_status_over_http() {
    let app = app();
    let rex = create_booking(&app, "Rex").await;

    let (status, body) = send(
        &app,
        Method::PATCH,
        &format!("/api/bookings/{}/status", rex),
        Some(json!({ "status": "CHECKED_IN" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "CHECKED_IN");

    let (status, body) = send(
        &app,
        Method::PATCH,
        &format!("/api/bookings/{}/status", rex),
        Some(json!({ "status": "PENDING" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["errorKind"], "ValidationError");

    let (status, body) = send(&app, Method::GET, "/api/bookings", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_malformed_input_is_validation_error() {
    let app = app();

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/kennels",
        Some(json!({ "name": "No capacity" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["errorKind"], "ValidationError");

    let (status, body) = send(&app, Method::GET, "/api/occupancy?start=2024-01-01", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["errorKind"], "ValidationError");

    let (status, body) = send(
        &app,
        Method::GET,
        "/api/occupancy?start=2024-01-05&end=2024-01-01",
        None,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["errorKind"], "ValidationError");
}

#[tokio::test]
async fn test_delete_with_cascade_query() {
    let app = app();
    let closing = create_kennel(&app, "Closing", 1).await;
    let target = create_kennel(&app, "Target", 1).await;
    let rex = create_booking(&app, "Rex").await;
    send(
        &app,
        Method::POST,
        &format!("/api/bookings/{}/segments", rex),
        Some(json!({ "kennelId": closing, "startDate": "2024-03-01", "endDate": "2024-03-02" })),
    )
    .await;

    let (status, body) = send(&app, Method::DELETE, &format!("/api/kennels/{}", closing), None).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["errorKind"], "GuardError");

    let (status, _) = send(
        &app,
        Method::DELETE,
        &format!("/api/kennels/{}?strategy=reassign", closing),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = send(
        &app,
        Method::DELETE,
        &format!("/api/kennels/{}?strategy=reassign&target={}", closing, target),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["outcome"], "deleted");

    let (_, booking) = send(&app, Method::GET, &format!("/api/bookings/{}", rex), None).await;
    assert_eq!(booking["segments"][0]["kennelId"], target.as_str());
}
