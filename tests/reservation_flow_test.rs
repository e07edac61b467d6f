// Reservation engine end to end against a real database
// Skipped when DATABASE_URL is not set

use axum::http::StatusCode;
use chrono::{Datelike, Duration, Utc};
use innkeep_backend::models::Role;
use serde_json::{json, Value};
use serial_test::serial;

mod common;
use common::{unique_email, TestApp};

async fn create_guest(app: &TestApp, token: &str, first: &str, last: &str) -> Value {
    let response = app
        .post("/guests")
        .bearer(token)
        .json(&json!({
            "first_name": first,
            "last_name": last,
            "email": unique_email(&first.to_lowercase()),
        }))
        .send()
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    response.json().await["data"].clone()
}

async fn create_room(app: &TestApp, token: &str, number: &str) -> Value {
    let response = app
        .post("/rooms")
        .bearer(token)
        .json(&json!({ "number": number, "name": "Garden King" }))
        .send()
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    response.json().await["data"].clone()
}

#[tokio::test]
#[serial]
async fn test_reservation_marks_room_and_status() {
    let Some(app) = TestApp::with_database().await else {
        return;
    };
    let (_, _, token) = app.signed_in(Role::Employee).await;

    let guest = create_guest(&app, &token, "Ada", "Lovelace").await;
    let room = create_room(&app, &token, "101").await;
    assert_eq!(room["occupied"], false);

    let check_in = Utc::now() - Duration::days(1);
    let check_out = Utc::now() + Duration::days(3);

    let response = app
        .post("/reservations")
        .bearer(&token)
        .json(&json!({
            "primary_guest_id": guest["id"],
            "room_numbers": ["101"],
            "check_in": check_in,
            "check_out": check_out,
            "payment_method": "card",
            "total_amount": 420.0
        }))
        .send()
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let body = response.json().await;
    let reservation = &body["data"];
    assert_eq!(reservation["guest_status"], "active");
    assert_eq!(reservation["primary_guest_name"], "Ada Lovelace");
    assert_eq!(reservation["primary_guest"]["id"], guest["id"]);
    assert_eq!(reservation["additional_guests"].as_array().unwrap().len(), 0);

    let response = app
        .get(&format!("/rooms/{}", room["id"].as_str().unwrap()))
        .bearer(&token)
        .send()
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.json().await["data"]["occupied"], true);

    let response = app
        .get(&format!("/reservations/{}", reservation["id"].as_str().unwrap()))
        .bearer(&token)
        .send()
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.json().await["data"]["total_amount"], 420.0);
}

#[tokio::test]
#[serial]
async fn test_past_reservation_is_inactive() {
    let Some(app) = TestApp::with_database().await else {
        return;
    };
    let (_, _, token) = app.signed_in(Role::Admin).await;

    let guest = create_guest(&app, &token, "Grace", "Hopper").await;
    create_room(&app, &token, "7").await;

    let response = app
        .post("/reservations")
        .bearer(&token)
        .json(&json!({
            "primary_guest_id": guest["id"],
            "room_numbers": ["7"],
            "check_in": "2024-01-29T20:00:00Z",
            "check_out": "2024-02-05T16:00:00Z",
            "total_amount": 100.0
        }))
        .send()
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    assert_eq!(response.json().await["data"]["guest_status"], "inactive");
}

#[tokio::test]
#[serial]
async fn test_reservation_rejects_bad_input() {
    let Some(app) = TestApp::with_database().await else {
        return;
    };
    let (_, _, token) = app.signed_in(Role::Employee).await;
    let guest = create_guest(&app, &token, "Alan", "Turing").await;
    create_room(&app, &token, "12").await;

    // Check-out before check-in
    let response = app
        .post("/reservations")
        .bearer(&token)
        .json(&json!({
            "primary_guest_id": guest["id"],
            "room_numbers": ["12"],
            "check_in": "2024-02-05T16:00:00Z",
            "check_out": "2024-01-29T20:00:00Z"
        }))
        .send()
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    // Unknown primary guest
    let response = app
        .post("/reservations")
        .bearer(&token)
        .json(&json!({
            "primary_guest_id": uuid::Uuid::new_v4(),
            "room_numbers": ["12"],
            "check_in": "2024-01-29T20:00:00Z",
            "check_out": "2024-02-05T16:00:00Z"
        }))
        .send()
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
#[serial]
async fn test_additional_guests_resolved_without_duplicates() {
    let Some(app) = TestApp::with_database().await else {
        return;
    };
    let (_, _, token) = app.signed_in(Role::Employee).await;

    let primary = create_guest(&app, &token, "Mary", "Shelley").await;
    let existing = create_guest(&app, &token, "Percy", "Shelley").await;
    create_room(&app, &token, "201").await;

    let check_in = Utc::now() - Duration::hours(2);
    let check_out = Utc::now() + Duration::days(2);

    let response = app
        .post("/reservations")
        .bearer(&token)
        .json(&json!({
            "primary_guest_id": primary["id"],
            "room_numbers": ["201"],
            "check_in": check_in,
            "check_out": check_out,
            "additional_guests": [
                { "guest_id": existing["id"] },
                { "identification_number": "ID-CLAIRE", "first_name": "Claire", "last_name": "Clairmont" },
                { "guest_id": existing["id"] }
            ]
        }))
        .send()
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let reservation = response.json().await["data"].clone();
    let additional = reservation["additional_guests"].as_array().unwrap();
    assert_eq!(additional.len(), 2);

    // The identification number now resolves to the guest created above
    let response = app
        .post("/reservations")
        .bearer(&token)
        .json(&json!({
            "primary_guest_id": primary["id"],
            "room_numbers": ["201"],
            "check_in": check_in,
            "check_out": check_out,
            "additional_guests": [{ "identification_number": "ID-CLAIRE" }]
        }))
        .send()
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let second = response.json().await["data"].clone();
    let claire_first = additional
        .iter()
        .find(|g| g["identification_number"] == "ID-CLAIRE")
        .unwrap();
    assert_eq!(second["additional_guests"][0]["id"], claire_first["id"]);

    // Calendar months are local to the property
    let local = check_in.with_timezone(&app.config.business.timezone);
    let response = app
        .get(&format!(
            "/reservations/calendar?month={}&year={}",
            local.month(),
            local.year()
        ))
        .bearer(&token)
        .send()
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let entries = response.json().await["data"].clone();
    let entry = entries
        .as_array()
        .unwrap()
        .iter()
        .find(|e| e["id"] == reservation["id"])
        .expect("reservation in calendar");
    assert!(entry["additional_guests"]
        .as_array()
        .unwrap()
        .iter()
        .all(|g| g["id"] != primary["id"]));

    // Each staying guest appears once even with two overlapping stays
    let response = app
        .get("/guests/current?limit=100")
        .bearer(&token)
        .send()
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = response.json().await;
    let current = body["data"].as_array().unwrap();
    let primary_rows = current
        .iter()
        .filter(|c| c["guest"]["id"] == primary["id"])
        .count();
    assert_eq!(primary_rows, 1);
    assert_eq!(body["meta"]["total"], 3);
}

#[tokio::test]
#[serial]
async fn test_analytics_buckets_span_weeks() {
    let Some(app) = TestApp::with_database().await else {
        return;
    };
    let (_, _, token) = app.signed_in(Role::Admin).await;

    let primary = create_guest(&app, &token, "Emmy", "Noether").await;
    create_room(&app, &token, "301").await;

    let response = app
        .post("/reservations")
        .bearer(&token)
        .json(&json!({
            "primary_guest_id": primary["id"],
            "room_numbers": ["301"],
            "check_in": "2024-01-29T20:00:00Z",
            "check_out": "2024-02-05T16:00:00Z",
            "total_amount": 840.0,
            "additional_guests": [
                { "identification_number": "ID-HILBERT", "first_name": "David", "last_name": "Hilbert" }
            ]
        }))
        .send()
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = app
        .get("/reservations/analytics?date=2024-01-31")
        .bearer(&token)
        .send()
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let data = response.json().await["data"].clone();
    assert_eq!(data["reference_week_start"], "2024-01-28");

    let weeks = data["weeks"].as_array().unwrap();
    for start in ["2024-01-28", "2024-02-04"] {
        let week = weeks
            .iter()
            .find(|w| w["week_start"] == start)
            .unwrap_or_else(|| panic!("week {} missing", start));
        assert_eq!(week["total_reservations"], 1);
        assert_eq!(week["total_guests"], 2);
    }
    assert_eq!(data["reservations"].as_array().unwrap().len(), 1);
}

#[tokio::test]
#[serial]
async fn test_room_numbers_unique_per_tenant() {
    let Some(app) = TestApp::with_database().await else {
        return;
    };
    let (_, _, token) = app.signed_in(Role::Employee).await;
    let (_, _, other_token) = app.signed_in(Role::Employee).await;

    create_room(&app, &token, "404").await;

    let response = app
        .post("/rooms")
        .bearer(&token)
        .json(&json!({ "number": " 404 " }))
        .send()
        .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);

    // Same number in another tenant is fine
    create_room(&app, &other_token, "404").await;

    let response = app.get("/rooms?sortKey=bogus").bearer(&token).send().await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
#[serial]
async fn test_failed_reservation_leaves_no_writes() {
    let Some(app) = TestApp::with_database().await else {
        return;
    };
    let (_, _, token) = app.signed_in(Role::Employee).await;

    let primary = create_guest(&app, &token, "Rosalind", "Franklin").await;
    let room = create_room(&app, &token, "501").await;
    let room_uri = format!("/rooms/{}", room["id"].as_str().unwrap());

    // Unknown room number, after an additional guest was created and room 501 flagged
    let response = app
        .post("/reservations")
        .bearer(&token)
        .json(&json!({
            "primary_guest_id": primary["id"],
            "room_numbers": ["501", "999"],
            "check_in": Utc::now(),
            "check_out": Utc::now() + Duration::days(2),
            "additional_guests": [
                { "identification_number": "ID-ROLL", "first_name": "Roll", "last_name": "Back" }
            ]
        }))
        .send()
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    // Unresolvable additional guest after a resolvable one
    let response = app
        .post("/reservations")
        .bearer(&token)
        .json(&json!({
            "primary_guest_id": primary["id"],
            "room_numbers": ["501"],
            "check_in": Utc::now(),
            "check_out": Utc::now() + Duration::days(2),
            "additional_guests": [
                { "identification_number": "ID-ROLL", "first_name": "Roll", "last_name": "Back" },
                { "guest_id": uuid::Uuid::new_v4() }
            ]
        }))
        .send()
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = app.get("/reservations").bearer(&token).send().await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.json().await["meta"]["total"], 0);

    // Only the primary guest exists
    let response = app.get("/guests").bearer(&token).send().await;
    let body = response.json().await;
    assert_eq!(body["meta"]["total"], 1);
    assert_eq!(body["data"][0]["id"], primary["id"]);

    let response = app.get(&room_uri).bearer(&token).send().await;
    assert_eq!(response.json().await["data"]["occupied"], false);
}
