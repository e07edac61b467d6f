// Login, password reset, invitations and tenant administration
// Skipped when DATABASE_URL is not set

use axum::http::{header, StatusCode};
use innkeep_backend::models::Role;
use serde_json::json;
use serial_test::serial;
use uuid::Uuid;

mod common;
use common::{unique_email, TestApp, TEST_PASSWORD};

/// Pull the token out of the last link emailed to `address`
fn token_from_mail(app: &TestApp, address: &str, path: &str) -> String {
    let message = app.mailbox.last_to(address).expect("email sent");
    let text = message.text.expect("plain text part");
    let start = text.find(path).expect("link in email") + path.len();
    text[start..]
        .split_whitespace()
        .next()
        .expect("token after link")
        .to_string()
}

#[tokio::test]
#[serial]
async fn test_login_sets_cookie_and_returns_token() {
    let Some(app) = TestApp::with_database().await else {
        return;
    };
    let tenant = app.create_tenant("Login Inn").await;
    let user = app.create_user(tenant.id, Role::Admin).await;

    let response = app
        .post("/login")
        .json(&json!({ "username": user.username, "password": TEST_PASSWORD }))
        .send()
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let cookie = response.header(header::SET_COOKIE).expect("cookie");
    assert!(cookie.starts_with("token="));
    assert!(cookie.contains("HttpOnly"));

    let body = response.json().await;
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["user"]["id"], user.id.to_string());
    assert!(body["data"]["user"].get("password_hash").is_none());

    // The issued token opens admin routes
    let token = body["data"]["token"].as_str().unwrap().to_string();
    let response = app.get("/users").bearer(&token).send().await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
#[serial]
async fn test_login_rejects_wrong_password() {
    let Some(app) = TestApp::with_database().await else {
        return;
    };
    let tenant = app.create_tenant("Login Inn").await;
    let user = app.create_user(tenant.id, Role::Employee).await;

    let response = app
        .post("/login")
        .json(&json!({ "username": user.username, "password": "wrong-password" }))
        .send()
        .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = app
        .post("/login")
        .json(&json!({ "username": "nobody-here", "password": TEST_PASSWORD }))
        .send()
        .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(
        response.json().await["message"],
        "Invalid username or password"
    );
}

#[tokio::test]
#[serial]
async fn test_password_reset_flow() {
    let Some(app) = TestApp::with_database().await else {
        return;
    };
    let tenant = app.create_tenant("Reset Inn").await;
    let user = app.create_user(tenant.id, Role::Employee).await;

    let response = app
        .post("/password/forgot")
        .json(&json!({ "email": user.email }))
        .send()
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let token = token_from_mail(&app, &user.email, "/password/reset/");

    let response = app
        .put(&format!("/password/reset/{}", token))
        .json(&json!({ "password": "BrandNew123", "confirmPassword": "BrandNew123" }))
        .send()
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.json().await["data"]["token"].is_string());

    // Tokens are single use
    let response = app
        .put(&format!("/password/reset/{}", token))
        .json(&json!({ "password": "BrandNew456", "confirmPassword": "BrandNew456" }))
        .send()
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = app
        .post("/login")
        .json(&json!({ "username": user.username, "password": "BrandNew123" }))
        .send()
        .await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
#[serial]
async fn test_forgot_password_unknown_email_and_failed_delivery() {
    let Some(app) = TestApp::with_database().await else {
        return;
    };

    let response = app
        .post("/password/forgot")
        .json(&json!({ "email": unique_email("ghost") }))
        .send()
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let tenant = app.create_tenant("Mail Inn").await;
    let user = app.create_user(tenant.id, Role::Employee).await;

    app.mailbox.set_failing(true);
    let response = app
        .post("/password/forgot")
        .json(&json!({ "email": user.email }))
        .send()
        .await;
    app.mailbox.set_failing(false);
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
#[serial]
async fn test_invitation_and_registration() {
    let Some(app) = TestApp::with_database().await else {
        return;
    };
    let (tenant, _, admin_token) = app.signed_in(Role::Admin).await;
    let email = unique_email("invitee");
    let username = format!("invitee{}", &Uuid::new_v4().simple().to_string()[..8]);

    let response = app
        .post("/users")
        .bearer(&admin_token)
        .json(&json!({
            "username": username,
            "first_name": "New",
            "last_name": "Hire",
            "email": email,
            "role": "Employee"
        }))
        .send()
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let created = response.json().await["data"].clone();
    assert_eq!(created["status"], "Invited");
    assert_eq!(created["tenant_id"], tenant.id.to_string());

    // Username and email are unique
    let response = app
        .post("/users")
        .bearer(&admin_token)
        .json(&json!({
            "username": username,
            "first_name": "Again",
            "last_name": "Hire",
            "email": unique_email("other"),
            "role": "Employee"
        }))
        .send()
        .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);

    let token = token_from_mail(&app, &email, "/complete-registration/");
    let response = app
        .put(&format!("/complete-registration/{}", token))
        .json(&json!({ "password": "Welcome123" }))
        .send()
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.json().await["data"]["status"], "Active");

    let response = app
        .post("/login")
        .json(&json!({ "username": username, "password": "Welcome123" }))
        .send()
        .await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
#[serial]
async fn test_admin_cannot_create_super_admin() {
    let Some(app) = TestApp::with_database().await else {
        return;
    };
    let (_, _, admin_token) = app.signed_in(Role::Admin).await;

    let response = app
        .post("/users")
        .bearer(&admin_token)
        .json(&json!({
            "username": "wouldbe.root",
            "first_name": "Would",
            "last_name": "Be",
            "email": unique_email("root"),
            "role": "SuperAdmin"
        }))
        .send()
        .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
#[serial]
async fn test_users_of_other_tenants_are_hidden() {
    let Some(app) = TestApp::with_database().await else {
        return;
    };
    let (_, _, admin_token) = app.signed_in(Role::Admin).await;
    let (_, stranger, _) = app.signed_in(Role::Employee).await;

    let response = app
        .get(&format!("/users/{}", stranger.id))
        .bearer(&admin_token)
        .send()
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
#[serial]
async fn test_employee_updates_only_self() {
    let Some(app) = TestApp::with_database().await else {
        return;
    };
    let (tenant, employee, token) = app.signed_in(Role::Employee).await;
    let colleague = app.create_user(tenant.id, Role::Employee).await;

    let response = app
        .put(&format!("/users/{}", employee.id))
        .bearer(&token)
        .json(&json!({ "first_name": "Renamed" }))
        .send()
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.json().await["data"]["first_name"], "Renamed");

    let response = app
        .put(&format!("/users/{}", colleague.id))
        .bearer(&token)
        .json(&json!({ "first_name": "Hijacked" }))
        .send()
        .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = app
        .put(&format!("/users/{}", employee.id))
        .bearer(&token)
        .json(&json!({ "role": "Admin" }))
        .send()
        .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
#[serial]
async fn test_super_admin_manages_tenants() {
    let Some(app) = TestApp::with_database().await else {
        return;
    };
    let (_, _, token) = app.signed_in(Role::SuperAdmin).await;

    let response = app
        .post("/tenants")
        .bearer(&token)
        .json(&json!({ "name": "Harbour House", "membership": "Basic" }))
        .send()
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let tenant = response.json().await["data"].clone();
    let uri = format!("/tenants/{}", tenant["id"].as_str().unwrap());

    let response = app
        .put(&uri)
        .bearer(&token)
        .json(&json!({ "name": "Harbour House Hotel" }))
        .send()
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.json().await["data"]["name"], "Harbour House Hotel");

    let response = app.delete(&uri).bearer(&token).send().await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = app.get(&uri).bearer(&token).send().await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
