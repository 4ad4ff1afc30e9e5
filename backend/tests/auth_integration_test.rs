//! Integration tests for authentication and client management

mod common;

use axum::http::StatusCode;
use common::{unique_email, COACH_INVITE_CODE, PASSWORD};
use serde_json::json;

#[tokio::test]
#[ignore = "requires database"]
async fn test_register_success() {
    let app = common::TestApp::new().await;

    let body = json!({
        "email": unique_email("register"),
        "password": PASSWORD,
        "name": "Casey Coach",
        "role": "coach",
        "invite_code": COACH_INVITE_CODE
    });
    let (status, response) = app.post("/api/v1/auth/register", &body).await;

    assert_eq!(status, StatusCode::CREATED);
    assert!(!response["data"]["access_token"].as_str().unwrap().is_empty());
    assert!(!response["data"]["refresh_token"].as_str().unwrap().is_empty());
    assert_eq!(response["data"]["token_type"], "Bearer");
    assert_eq!(response["data"]["role"], "coach");
}

#[tokio::test]
#[ignore = "requires database"]
async fn test_self_registration_is_client_without_invite() {
    let app = common::TestApp::new().await;

    let body = json!({
        "email": unique_email("selfserve"),
        "password": PASSWORD,
        "name": "Sam"
    });
    let (status, response) = app.post("/api/v1/auth/register", &body).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(response["data"]["role"], "client");

    let body = json!({
        "email": unique_email("wannabe"),
        "password": PASSWORD,
        "name": "Sam",
        "role": "coach",
        "invite_code": "not-the-code"
    });
    let (status, _) = app.post("/api/v1/auth/register", &body).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
#[ignore = "requires database"]
async fn test_register_duplicate_email() {
    let app = common::TestApp::new().await;

    let body = json!({
        "email": unique_email("duplicate"),
        "password": PASSWORD,
        "name": "Dup"
    });
    let (status, _) = app.post("/api/v1/auth/register", &body).await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, _) = app.post("/api/v1/auth/register", &body).await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
#[ignore = "requires database"]
async fn test_register_rejects_bad_credentials() {
    let app = common::TestApp::new().await;

    let body = json!({ "email": "not-an-email", "password": PASSWORD, "name": "X" });
    let (status, _) = app.post("/api/v1/auth/register", &body).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let body = json!({ "email": unique_email("weak"), "password": "123", "name": "X" });
    let (status, _) = app.post("/api/v1/auth/register", &body).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
#[ignore = "requires database"]
async fn test_login_and_refresh() {
    let app = common::TestApp::new().await;
    let coach = app.create_coach().await;

    let wrong = json!({ "email": coach.email, "password": "WrongPassword1!" });
    let (status, _) = app.post("/api/v1/auth/login", &wrong).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let login = json!({ "email": coach.email, "password": PASSWORD });
    let (status, response) = app.post("/api/v1/auth/login", &login).await;
    assert_eq!(status, StatusCode::OK);

    let refresh = response["data"]["refresh_token"].as_str().unwrap();
    let (status, refreshed) = app
        .post("/api/v1/auth/refresh", &json!({ "refresh_token": refresh }))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert!(refreshed["data"]["access_token"].as_str().is_some());

    // An access token is not accepted as a refresh token
    let (status, _) = app
        .post("/api/v1/auth/refresh", &json!({ "refresh_token": coach.token }))
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
#[ignore = "requires database"]
async fn test_coach_manages_clients() {
    let app = common::TestApp::new().await;
    let coach = app.create_coach().await;
    let client = app.create_client(&coach).await;

    let (status, me) = app.get_auth("/api/v1/auth/me", &client.token).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(me["data"]["role"], "client");
    assert_eq!(me["data"]["coach_id"], coach.id.to_string());

    let (status, clients) = app.get_auth("/api/v1/clients", &coach.token).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(clients["data"].as_array().unwrap().len(), 1);

    let path = format!("/api/v1/clients/{}", client.id);
    let (status, updated) = app
        .patch_auth(&path, &json!({ "notes": "Prefers morning sessions" }), &coach.token)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["data"]["notes"], "Prefers morning sessions");

    // The client can read their own record
    let (status, _) = app.get_auth(&path, &client.token).await;
    assert_eq!(status, StatusCode::OK);

    // Another coach cannot see them
    let other = app.create_coach().await;
    let (status, _) = app.get_auth(&path, &other.token).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    assert_eq!(app.delete_auth(&path, &coach.token).await, StatusCode::NO_CONTENT);
    let (_, clients) = app.get_auth("/api/v1/clients", &coach.token).await;
    assert!(clients["data"].as_array().unwrap().is_empty());

    let (_, clients) = app
        .get_auth("/api/v1/clients?include_archived=true", &coach.token)
        .await;
    assert_eq!(clients["data"][0]["is_archived"], true);
}
