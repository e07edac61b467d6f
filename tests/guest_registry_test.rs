// Guest registry behaviour against a real database
// Skipped when DATABASE_URL is not set

use axum::http::StatusCode;
use chrono::{Duration, Utc};
use innkeep_backend::models::Role;
use serde_json::json;
use serial_test::serial;
use uuid::Uuid;

mod common;
use common::{unique_email, TestApp};

#[tokio::test]
#[serial]
async fn test_upsert_by_email_updates_in_place() {
    let Some(app) = TestApp::with_database().await else {
        return;
    };
    let (_, _, token) = app.signed_in(Role::Employee).await;
    let email = unique_email("twice");

    let first = app
        .post("/guests")
        .bearer(&token)
        .json(&json!({ "first_name": "Sam", "last_name": "First", "email": email }))
        .send()
        .await;
    assert_eq!(first.status(), StatusCode::OK);
    let first = first.json().await["data"].clone();

    // Same address in another case still matches
    let second = app
        .post("/guests")
        .bearer(&token)
        .json(&json!({
            "first_name": "Sam",
            "last_name": "Second",
            "email": email.to_uppercase()
        }))
        .send()
        .await;
    assert_eq!(second.status(), StatusCode::OK);
    let second = second.json().await["data"].clone();

    assert_eq!(first["id"], second["id"]);
    assert_eq!(second["last_name"], "Second");

    let response = app
        .get(&format!("/guests/search?q={}", email))
        .bearer(&token)
        .send()
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let matches = response.json().await["data"].clone();
    assert_eq!(matches.as_array().unwrap().len(), 1);
    assert_eq!(matches[0]["last_name"], "Second");
}

#[tokio::test]
#[serial]
async fn test_upsert_requires_email() {
    let Some(app) = TestApp::with_database().await else {
        return;
    };
    let (_, _, token) = app.signed_in(Role::Employee).await;

    let response = app
        .post("/guests")
        .bearer(&token)
        .json(&json!({ "first_name": "No", "last_name": "Mail" }))
        .send()
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
#[serial]
async fn test_delete_missing_guest_is_not_found() {
    let Some(app) = TestApp::with_database().await else {
        return;
    };
    let (_, _, token) = app.signed_in(Role::Admin).await;

    let response = app
        .delete(&format!("/guests/{}", Uuid::new_v4()))
        .bearer(&token)
        .send()
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let body = response.json().await;
    assert_eq!(body["success"], false);
    assert_eq!(body["status"], 404);
}

#[tokio::test]
#[serial]
async fn test_guests_are_tenant_scoped() {
    let Some(app) = TestApp::with_database().await else {
        return;
    };
    let (_, _, token) = app.signed_in(Role::Employee).await;
    let (_, _, other_token) = app.signed_in(Role::Employee).await;

    let guest = app
        .post("/guests")
        .bearer(&token)
        .json(&json!({
            "first_name": "Only",
            "last_name": "Mine",
            "email": unique_email("scoped")
        }))
        .send()
        .await
        .json()
        .await["data"]
        .clone();
    let uri = format!("/guests/{}", guest["id"].as_str().unwrap());

    let response = app.get(&uri).bearer(&other_token).send().await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = app.delete(&uri).bearer(&other_token).send().await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    // Still there for its owner, then gone after delete
    let response = app.get(&uri).bearer(&token).send().await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = app.delete(&uri).bearer(&token).send().await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = app.get(&uri).bearer(&token).send().await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
#[serial]
async fn test_guest_list_paginates() {
    let Some(app) = TestApp::with_database().await else {
        return;
    };
    let (_, _, token) = app.signed_in(Role::Employee).await;

    for n in 0..3 {
        let response = app
            .post("/guests")
            .bearer(&token)
            .json(&json!({
                "first_name": format!("Page{}", n),
                "last_name": "Guest",
                "email": unique_email("page")
            }))
            .send()
            .await;
        assert_eq!(response.status(), StatusCode::OK);
    }

    let response = app
        .get("/guests?page=2&limit=2&sortKey=first_name&sortDirection=asc")
        .bearer(&token)
        .send()
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = response.json().await;
    assert_eq!(body["meta"]["total"], 3);
    assert_eq!(body["meta"]["total_pages"], 2);
    assert_eq!(body["data"].as_array().unwrap().len(), 1);
    assert_eq!(body["data"][0]["first_name"], "Page2");
}

#[tokio::test]
#[serial]
async fn test_padded_email_is_trimmed() {
    let Some(app) = TestApp::with_database().await else {
        return;
    };
    let (_, _, token) = app.signed_in(Role::Employee).await;
    let email = unique_email("padded");

    let response = app
        .post("/guests")
        .bearer(&token)
        .json(&json!({
            "first_name": "Pad",
            "last_name": "Ded",
            "email": format!("  {}  ", email)
        }))
        .send()
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.json().await["data"]["email"], email);
}

#[tokio::test]
#[serial]
async fn test_delete_linked_guest_keeps_reservation() {
    let Some(app) = TestApp::with_database().await else {
        return;
    };
    let (_, _, token) = app.signed_in(Role::Employee).await;
    let (_, _, other_token) = app.signed_in(Role::Admin).await;

    let primary = app
        .post("/guests")
        .bearer(&token)
        .json(&json!({ "first_name": "P", "last_name": "Q", "email": unique_email("pq") }))
        .send()
        .await
        .json()
        .await["data"]
        .clone();
    let response = app
        .post("/rooms")
        .bearer(&token)
        .json(&json!({ "number": "1" }))
        .send()
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = app
        .post("/reservations")
        .bearer(&token)
        .json(&json!({
            "primary_guest_id": primary["id"],
            "room_numbers": ["1"],
            "check_in": Utc::now(),
            "check_out": Utc::now() + Duration::days(1),
            "additional_guests": [
                { "identification_number": "ID-LINKED", "first_name": "Linked", "last_name": "Guest" }
            ]
        }))
        .send()
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let reservation = response.json().await["data"].clone();
    let reservation_uri = format!("/reservations/{}", reservation["id"].as_str().unwrap());
    let additional_id = reservation["additional_guests"][0]["id"].as_str().unwrap().to_string();

    // Another tenant cannot touch the links
    let response = app
        .delete(&format!("/guests/{}", additional_id))
        .bearer(&other_token)
        .send()
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = app
        .get(&format!("/guests/{}/reservations", additional_id))
        .bearer(&token)
        .send()
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let linked = response.json().await["data"]["reservations"].clone();
    assert_eq!(linked.as_array().unwrap().len(), 1);
    assert_eq!(linked[0]["id"], reservation["id"]);

    // Deleting the primary keeps the reservation and its name snapshot
    let response = app
        .delete(&format!("/guests/{}", primary["id"].as_str().unwrap()))
        .bearer(&token)
        .send()
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = app.get(&reservation_uri).bearer(&token).send().await;
    assert_eq!(response.status(), StatusCode::OK);
    let detail = response.json().await["data"].clone();
    assert!(detail["primary_guest"].is_null());
    assert_eq!(detail["primary_guest_name"], "P Q");
    assert_eq!(detail["additional_guests"].as_array().unwrap().len(), 1);

    let response = app
        .delete(&format!("/guests/{}", additional_id))
        .bearer(&token)
        .send()
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = app.get(&reservation_uri).bearer(&token).send().await;
    let detail = response.json().await["data"].clone();
    assert!(detail["additional_guests"].as_array().unwrap().is_empty());
}
