use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use chrono::{Duration, TimeZone, Utc};
use serde_json::{json, Value};
use showtime_api::{app, AppState};
use showtime_booking::ReservationEngine;
use showtime_core::ManualClock;
use showtime_store::{MemoryReservationStore, MemoryVenueCatalog};
use std::sync::Arc;
use tower::ServiceExt;

const THEATRE: &str = "6f1c2a52-1c1e-4c39-9d2a-0b8f2f6f0a01";
const SCREEN: &str = "6f1c2a52-1c1e-4c39-9d2a-0b8f2f6f0a02";
const MOVIE: &str = "6f1c2a52-1c1e-4c39-9d2a-0b8f2f6f0a03";
const SHOW: &str = "6f1c2a52-1c1e-4c39-9d2a-0b8f2f6f0a04";
const LATE_SHOW: &str = "6f1c2a52-1c1e-4c39-9d2a-0b8f2f6f0a05";

/// Router over the demo catalog shipped in `config/seed.json`.
fn test_app() -> (Router, Arc<ManualClock>) {
    let catalog = MemoryVenueCatalog::from_json(include_str!("../../config/seed.json")).unwrap();
    let clock = Arc::new(ManualClock::new(Utc.with_ymd_and_hms(2026, 11, 1, 12, 0, 0).unwrap()));
    let engine = ReservationEngine::new(
        Arc::new(catalog),
        Arc::new(MemoryReservationStore::new()),
        clock.clone(),
    );
    (app(AppState::new(engine)), clock)
}

fn hold_body(show: &str, seats: Value) -> Value {
    json!({
        "theatreId": THEATRE,
        "screenId": SCREEN,
        "showId": show,
        "movieId": MOVIE,
        "seats": seats,
    })
}

async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let request = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => request
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => request.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, json)
}

async fn post(app: &Router, uri: &str, body: Value) -> (StatusCode, Value) {
    send(app, Method::POST, uri, Some(body)).await
}

async fn get(app: &Router, uri: &str) -> (StatusCode, Value) {
    send(app, Method::GET, uri, None).await
}

#[tokio::test]
async fn test_health() {
    let (app, _) = test_app();
    let (status, body) = get(&app, "/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn test_book_pay_fetch() {
    let (app, _) = test_app();
    let seats = json!([
        { "seatId": "A1", "seatType": "PREMIUM" },
        { "seatId": "A2", "seatType": "PREMIUM" },
    ]);

    let (status, held) = post(&app, "/api/booking/book", hold_body(SHOW, seats)).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(held["message"], "Seats held for 5 minutes");
    assert_eq!(held["totalAmount"], 376);
    assert_eq!(held["holdExpiresAt"], "2026-11-01T12:05:00Z");
    let booking_id = held["bookingId"].as_str().unwrap().to_string();

    let (status, paid) = post(&app, "/api/booking/pay", json!({ "bookingId": booking_id })).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(paid["message"], "Booking confirmed");
    assert_eq!(paid["bookingId"], booking_id.as_str());

    let (status, again) = post(&app, "/api/booking/pay", json!({ "bookingId": booking_id })).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(again["message"], "Already confirmed");

    let (status, fetched) = get(&app, &format!("/api/booking/getbooking/{}", booking_id)).await;
    assert_eq!(status, StatusCode::OK);
    let booking = &fetched["booking"];
    assert_eq!(booking["status"], "CONFIRMED");
    assert_eq!(booking["totalAmount"], 376);
    assert_eq!(booking["seats"][0]["price"], 188);
    assert_eq!(booking["theatre"]["name"], "Grand Regal");
    assert_eq!(booking["movie"]["title"], "The Long Night");
    assert_eq!(booking["show"]["id"], SHOW);
}

#[tokio::test]
async fn test_overlapping_hold_is_conflict() {
    let (app, _) = test_app();
    let (status, _) = post(
        &app,
        "/api/booking/book",
        hold_body(SHOW, json!([{ "seatId": "B1", "seatType": "NORMAL" }])),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = post(
        &app,
        "/api/booking/book",
        hold_body(
            SHOW,
            json!([{ "seatId": "B1", "seatType": "NORMAL" }, { "seatId": "B2", "seatType": "NORMAL" }]),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["kind"], "CONFLICT");
    assert_eq!(body["error"], "One or more seats already held or booked");

    // another show of the same screen is unaffected
    let (status, _) = post(
        &app,
        "/api/booking/book",
        hold_body(LATE_SHOW, json!([{ "seatId": "B1", "seatType": "NORMAL" }])),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
}

#[tokio::test]
async fn test_pay_after_expiry_is_gone() {
    let (app, clock) = test_app();
    let (_, held) = post(
        &app,
        "/api/booking/book",
        hold_body(SHOW, json!([{ "seatId": "C1", "seatType": "LUXURY" }])),
    )
    .await;
    assert_eq!(held["totalAmount"], 225);
    let booking_id = held["bookingId"].as_str().unwrap().to_string();

    clock.advance(Duration::minutes(5));

    let (status, body) = post(&app, "/api/booking/pay", json!({ "bookingId": booking_id })).await;
    assert_eq!(status, StatusCode::GONE);
    assert_eq!(body["kind"], "EXPIRED");
    assert_eq!(body["error"], "Hold expired");

    let (_, fetched) = get(&app, &format!("/api/booking/getbooking/{}", booking_id)).await;
    assert_eq!(fetched["booking"]["status"], "EXPIRED");

    let (status, _) = post(
        &app,
        "/api/booking/book",
        hold_body(SHOW, json!([{ "seatId": "C1", "seatType": "LUXURY" }])),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
}

#[tokio::test]
async fn test_cancel_then_pay_is_invalid_state() {
    let (app, _) = test_app();
    let (_, held) = post(
        &app,
        "/api/booking/book",
        hold_body(SHOW, json!([{ "seatId": "D1", "seatType": "RECLINER" }])),
    )
    .await;
    assert_eq!(held["totalAmount"], 300);
    let booking_id = held["bookingId"].as_str().unwrap().to_string();

    let (status, body) = post(&app, "/api/booking/cancel", json!({ "bookingId": booking_id })).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Booking cancelled");

    let (status, body) = post(&app, "/api/booking/pay", json!({ "bookingId": booking_id })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["kind"], "INVALID_STATE");
}

#[tokio::test]
async fn test_bad_requests() {
    let (app, _) = test_app();

    let (status, body) = post(&app, "/api/booking/book", json!({ "showId": SHOW })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["kind"], "INVALID_REQUEST");
    assert_eq!(body["error"], "Missing required fields");

    let (status, body) = post(
        &app,
        "/api/booking/book",
        hold_body(SHOW, json!([{ "seatId": "A1", "seatType": "NORMAL" }])),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["kind"], "INVALID_REQUEST");

    let (status, body) = post(
        &app,
        "/api/booking/book",
        hold_body(SHOW, json!([{ "seatId": "A1", "seatType": "BALCONY" }])),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["kind"], "INVALID_REQUEST");

    let (status, body) = post(&app, "/api/booking/pay", json!({})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "bookingId required");
}

#[tokio::test]
async fn test_not_found() {
    let (app, _) = test_app();

    let (status, body) = get(&app, "/api/booking/getbooking/not-a-uuid").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["kind"], "NOT_FOUND");

    let unknown = uuid::Uuid::new_v4();
    let (status, body) = get(&app, &format!("/api/booking/getbooking/{}", unknown)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Booking not found");

    let (status, _) = post(&app, "/api/booking/pay", json!({ "bookingId": unknown })).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = post(
        &app,
        "/api/booking/book",
        hold_body(&uuid::Uuid::new_v4().to_string(), json!([{ "seatId": "A1", "seatType": "PREMIUM" }])),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Show not found");
}
