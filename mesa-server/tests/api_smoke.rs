//! API smoke tests against the in-memory document backend
//!
//! Drives the real router end to end: create tables, book, patch, cancel,
//! and read the occupancy report.

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use chrono::{Duration, Local};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use tower::ServiceExt;

use mesa_server::db::surreal::SurrealStore;
use mesa_server::{Config, ReservationStore, ServerState};

async fn test_app() -> Router {
    let store = ReservationStore::Surreal(SurrealStore::connect_memory().await.unwrap());
    let state = ServerState::new(Config::with_overrides("/tmp/mesa-test", 0), store);
    mesa_server::api::router(state)
}

async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let request = match body {
        Some(json_body) => Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json_body.to_string()))
            .unwrap(),
        None => Request::builder()
            .method(method)
            .uri(uri)
            .body(Body::empty())
            .unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

async fn create_table(app: &Router, table_number: &str, capacity: i32) -> String {
    let (status, body) = send(
        app,
        "POST",
        "/api/v1/tables",
        Some(json!({ "table_number": table_number, "capacity": capacity })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    body["table_id"].as_str().unwrap().to_string()
}

fn reservation_payload(table_id: &str, phone: &str, date: &str) -> Value {
    json!({
        "table_id": table_id,
        "number_of_people": 2,
        "reservation_date": date,
        "reservation_time": "19:00:00",
        "last_name": "Silva",
        "first_name": "Ana",
        "phone": phone,
    })
}

async fn book(app: &Router, payload: Value) -> Value {
    let (status, body) = send(app, "POST", "/api/v1/reservations", Some(payload)).await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    body
}

#[tokio::test]
async fn health_reports_backend() {
    let app = test_app().await;
    let (status, body) = send(&app, "GET", "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["backend"], "surreal");
}

#[tokio::test]
async fn creating_a_table_twice_conflicts() {
    let app = test_app().await;
    let first = create_table(&app, "T1", 4).await;
    assert!(!first.is_empty());

    let (status, body) = send(
        &app,
        "POST",
        "/api/v1/tables",
        Some(json!({ "table_number": "T1", "capacity": 6 })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "conflict");

    let (status, body) = send(&app, "GET", "/api/v1/tables", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["tables"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn table_creation_validates_payload() {
    let app = test_app().await;

    let (status, body) = send(&app, "POST", "/api/v1/tables", Some(json!({}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body["message"],
        "Missing required fields: table_number, capacity"
    );

    let (status, _) = send(
        &app,
        "POST",
        "/api/v1/tables",
        Some(json!({ "table_number": "T9", "capacity": 0 })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn booking_requires_an_existing_table() {
    let app = test_app().await;
    let (status, body) = send(
        &app,
        "POST",
        "/api/v1/reservations",
        Some(reservation_payload("restaurant_table:missing", "0990000001", "2025-06-01")),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "validation_error");
}

#[tokio::test]
async fn booking_lists_missing_fields() {
    let app = test_app().await;
    let (status, body) = send(
        &app,
        "POST",
        "/api/v1/reservations",
        Some(json!({ "number_of_people": 2 })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let message = body["message"].as_str().unwrap();
    assert!(message.starts_with("Missing required fields:"), "{message}");
    assert!(message.contains("table_id"), "{message}");
    assert!(message.contains("phone"), "{message}");
}

#[tokio::test]
async fn same_phone_reuses_one_customer() {
    let app = test_app().await;
    let table_id = create_table(&app, "T1", 4).await;

    let first = book(&app, reservation_payload(&table_id, "0991234567", "2025-06-01")).await;
    let mut second_payload = reservation_payload(&table_id, "0991234567", "2025-06-02");
    second_payload["last_name"] = json!("Costa");
    let second = book(&app, second_payload).await;

    assert_eq!(first["customer_id"], second["customer_id"]);
    assert_ne!(first["reservation_id"], second["reservation_id"]);
}

#[tokio::test]
async fn modifying_a_reservation_touches_only_named_fields() {
    let app = test_app().await;
    let table_id = create_table(&app, "T1", 4).await;
    let created = book(&app, reservation_payload(&table_id, "0991234567", "2025-06-01")).await;
    let id = created["reservation_id"].as_str().unwrap();

    let (status, body) = send(
        &app,
        "PUT",
        &format!("/api/v1/reservations/{id}"),
        Some(json!({ "reservation_time": "21:30:00" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    let updated = &body["reservation"];
    assert_eq!(updated["reservation_time"], "21:30:00");
    assert_eq!(updated["number_of_people"], 2);
    assert_eq!(updated["reservation_date"], "2025-06-01");
    assert_eq!(updated["status"], "active");

    // Stored record agrees with the patch response
    let (status, fetched) = send(&app, "GET", &format!("/api/v1/reservations/{id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched["reservation_time"], "21:30:00");
    assert_eq!(fetched["last_name"], Value::Null); // customers live in their own records

    // An empty patch is a client error
    let (status, _) = send(
        &app,
        "PUT",
        &format!("/api/v1/reservations/{id}"),
        Some(json!({})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    // Unknown ids are 404
    let (status, _) = send(
        &app,
        "PUT",
        "/api/v1/reservations/reservation:missing",
        Some(json!({ "comment": "window seat" })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn cancellation_is_single_shot_and_clears_occupancy() {
    let app = test_app().await;
    let table_id = create_table(&app, "T1", 8).await;

    let today = Local::now().date_naive();
    let date = (today + Duration::days(1)).format("%Y-%m-%d").to_string();
    let created = book(&app, reservation_payload(&table_id, "0991234567", &date)).await;
    let id = created["reservation_id"].as_str().unwrap();

    let (status, before) = send(&app, "GET", "/api/v1/occupancy_next_7_days", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(before["total_people"], 2);

    let (status, body) = send(&app, "DELETE", &format!("/api/v1/reservations/{id}"), None).await;
    assert_eq!(status, StatusCode::OK, "{body}");

    let (status, after) = send(&app, "GET", "/api/v1/occupancy_next_7_days", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(after["total_people"], 0);

    let (status, _) = send(&app, "DELETE", &format!("/api/v1/reservations/{id}"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn occupancy_reports_zero_seeded_days() {
    let app = test_app().await;
    let table_id = create_table(&app, "T1", 8).await;

    let today = Local::now().date_naive();
    let busy_day = (today + Duration::days(2)).format("%Y-%m-%d").to_string();

    let mut first = reservation_payload(&table_id, "0990000001", &busy_day);
    first["number_of_people"] = json!(3);
    book(&app, first).await;
    let mut second = reservation_payload(&table_id, "0990000002", &busy_day);
    second["number_of_people"] = json!(5);
    book(&app, second).await;

    let (status, body) = send(&app, "GET", "/api/v1/occupancy_next_7_days", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total_people"], 8);

    let by_day = body["occupancy_by_day"].as_object().unwrap();
    assert_eq!(by_day.len(), 7);
    assert_eq!(by_day[&busy_day], 8);
    let quiet_day = (today + Duration::days(3)).format("%Y-%m-%d").to_string();
    assert_eq!(by_day[&quiet_day], 0);
}
