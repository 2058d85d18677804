use std::sync::Arc;
use std::time::Duration;

use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use axum::Router;
use chrono::{TimeZone, Utc};
use coachbook_api::{app, AppState};
use coachbook_core::clock::ManualClock;
use coachbook_core::memory::MemoryBookingStore;
use coachbook_lock::MemoryLockStore;
use coachbook_pipeline::{BookingService, PipelinePolicy};
use serde_json::{json, Value};
use tower::ServiceExt;

fn test_app() -> (Router, Arc<ManualClock>) {
    let clock = Arc::new(ManualClock::new(
        Utc.with_ymd_and_hms(2025, 6, 1, 9, 0, 0).unwrap(),
    ));
    let locks = Arc::new(MemoryLockStore::new(clock.clone()));
    let store = Arc::new(MemoryBookingStore::new());
    let service = Arc::new(BookingService::new(
        locks,
        store,
        clock.clone(),
        PipelinePolicy {
            lock_ttl: Duration::from_secs(600),
            ..PipelinePolicy::default()
        },
    ));
    let state = AppState { service };
    (app(state), clock)
}

async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let request = match body {
        Some(body) => Request::builder()
            .method(method)
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => Request::builder()
            .method(method)
            .uri(uri)
            .body(Body::empty())
            .unwrap(),
    };
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::String(
            String::from_utf8_lossy(&bytes).into_owned(),
        ))
    };
    (status, json)
}

async fn request_slot(app: &Router, session_id: &str) -> (StatusCode, Value) {
    send(
        app,
        "POST",
        "/v1/slots/request",
        Some(json!({
            "date": "2025-06-15",
            "time": "10:00:00",
            "session_id": session_id,
            "parent_id": 42,
        })),
    )
    .await
}

#[tokio::test]
async fn health_check() {
    let (app, _clock) = test_app();
    let (status, _) = send(&app, "GET", "/health", None).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn second_session_gets_conflict_while_slot_is_locked() {
    let (app, _clock) = test_app();

    let (status, body) = request_slot(&app, "session-a").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["lock"]["session_id"], "session-a");

    let (status, body) = request_slot(&app, "session-b").await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert!(body["expires_at"].is_string());
}

#[tokio::test]
async fn same_session_reacquire_is_idempotent() {
    let (app, _clock) = test_app();

    let (status, _) = request_slot(&app, "session-a").await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = request_slot(&app, "session-a").await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn expired_lock_can_be_reacquired_by_another_session() {
    let (app, clock) = test_app();

    let (status, _) = request_slot(&app, "session-a").await;
    assert_eq!(status, StatusCode::OK);

    clock.advance(chrono::Duration::seconds(601));

    let (status, body) = request_slot(&app, "session-b").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["lock"]["session_id"], "session-b");
}

#[tokio::test]
async fn availability_reflects_lock_state() {
    let (app, _clock) = test_app();

    let (status, body) = send(&app, "GET", "/v1/slots/2025-06-15/10:00/availability", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["available"], true);

    request_slot(&app, "session-a").await;

    let (status, body) = send(&app, "GET", "/v1/slots/2025-06-15/10:00/availability", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["available"], false);

    let (status, body) = send(
        &app,
        "POST",
        "/v1/slots/release",
        Some(json!({
            "date": "2025-06-15",
            "time": "10:00:00",
            "session_id": "session-a",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["released"], true);

    let (_, body) = send(&app, "GET", "/v1/slots/2025-06-15/10:00/availability", None).await;
    assert_eq!(body["available"], true);
}

#[tokio::test]
async fn booking_created_under_lock_starts_unpaid_pending() {
    let (app, _clock) = test_app();

    let (_, slot) = request_slot(&app, "session-a").await;

    let (status, booking) = send(
        &app,
        "POST",
        "/v1/bookings",
        Some(json!({
            "lock": slot["lock"],
            "parent_id": 42,
            "amount": 2500,
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(booking["payment_status"], "unpaid");
    assert_eq!(booking["attendance_status"], "pending");
    assert_eq!(booking["lock_session_id"], "session-a");
}

#[tokio::test]
async fn booking_with_lapsed_lock_is_gone() {
    let (app, clock) = test_app();

    let (_, slot) = request_slot(&app, "session-a").await;
    clock.advance(chrono::Duration::seconds(601));

    let (status, _) = send(
        &app,
        "POST",
        "/v1/bookings",
        Some(json!({
            "lock": slot["lock"],
            "parent_id": 42,
            "amount": 2500,
        })),
    )
    .await;
    assert_eq!(status, StatusCode::GONE);
}

async fn create_booking(app: &Router) -> Value {
    let (_, slot) = request_slot(app, "session-a").await;
    let (status, booking) = send(
        app,
        "POST",
        "/v1/bookings",
        Some(json!({
            "lock": slot["lock"],
            "parent_id": 42,
            "amount": 2500,
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    booking
}

#[tokio::test]
async fn payment_webhook_confirms_booking_and_frees_slot() {
    let (app, _clock) = test_app();
    let booking = create_booking(&app).await;
    let id = booking["id"].as_str().unwrap();

    let (status, result) = send(
        &app,
        "POST",
        "/v1/webhooks/payments",
        Some(json!({
            "booking_id": id,
            "status": "reservation-paid",
            "reference": "cs_test_123",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    // Settling the reservation fee auto-confirms attendance, which in
    // turn drives the derived category.
    assert_eq!(result["category"], "confirmed");
    assert_eq!(result["booking"]["attendance_status"], "confirmed");
    assert_eq!(result["booking"]["payment_status"], "reservation-paid");

    // The slot lock is released once money has moved.
    let (_, body) = send(&app, "GET", "/v1/slots/2025-06-15/10:00/availability", None).await;
    assert_eq!(body["available"], true);
}

#[tokio::test]
async fn unpaid_completion_is_rejected_without_assume_paid() {
    let (app, _clock) = test_app();
    let booking = create_booking(&app).await;
    let id = booking["id"].as_str().unwrap();

    let (status, _) = send(
        &app,
        "PATCH",
        &format!("/v1/bookings/{id}/status"),
        Some(json!({
            "field": "attendance",
            "value": "completed",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    let (status, result) = send(
        &app,
        "PATCH",
        &format!("/v1/bookings/{id}/status"),
        Some(json!({
            "field": "attendance",
            "value": "completed",
            "assume_paid": true,
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(result["category"], "completed");
    assert_eq!(result["booking"]["payment_status"], "session-paid");
}

#[tokio::test]
async fn terminal_booking_rejects_further_changes() {
    let (app, _clock) = test_app();
    let booking = create_booking(&app).await;
    let id = booking["id"].as_str().unwrap();

    let (status, result) = send(
        &app,
        "PATCH",
        &format!("/v1/bookings/{id}/status"),
        Some(json!({
            "field": "attendance",
            "value": "cancelled",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(result["category"], "cancelled");

    let (status, _) = send(
        &app,
        "PATCH",
        &format!("/v1/bookings/{id}/status"),
        Some(json!({
            "field": "payment",
            "value": "paid",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn status_view_reports_derived_category_and_description() {
    let (app, _clock) = test_app();
    let booking = create_booking(&app).await;
    let id = booking["id"].as_str().unwrap();

    let (status, _) = send(
        &app,
        "POST",
        "/v1/webhooks/payments",
        Some(json!({
            "booking_id": id,
            "status": "reservation-paid",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, view) = send(&app, "GET", &format!("/v1/bookings/{id}/status"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(view["category"], "confirmed");
    assert_eq!(view["booking_id"], id);
    assert!(view["description"].is_string());
}

#[tokio::test]
async fn unknown_status_value_is_bad_request() {
    let (app, _clock) = test_app();
    let booking = create_booking(&app).await;
    let id = booking["id"].as_str().unwrap();

    let (status, _) = send(
        &app,
        "PATCH",
        &format!("/v1/bookings/{id}/status"),
        Some(json!({
            "field": "payment",
            "value": "definitely-not-a-status",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn unknown_booking_is_not_found() {
    let (app, _clock) = test_app();
    let (status, _) = send(
        &app,
        "GET",
        "/v1/bookings/00000000-0000-0000-0000-000000000000/status",
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
