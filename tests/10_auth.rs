mod common;

use anyhow::Result;
use common::{TestApp, PASSWORD};
use reqwest::StatusCode;
use serde_json::{json, Value};

#[tokio::test]
async fn health_and_root_are_public() -> Result<()> {
    let app = TestApp::spawn().await?;

    let res = app.client.get(app.url("/health")).send().await?;
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await?;
    assert_eq!(body["database"], "memory");

    let res = app.client.get(app.url("/")).send().await?;
    assert_eq!(res.status(), StatusCode::OK);
    Ok(())
}

#[tokio::test]
async fn register_returns_user_without_password() -> Result<()> {
    let app = TestApp::spawn().await?;

    let res = app.register("alice").await?;
    assert_eq!(res.status(), StatusCode::CREATED);
    let location = res.headers()["location"].to_str()?.to_string();

    let body: Value = res.json().await?;
    assert_eq!(body["username"], "alice");
    assert_eq!(body["fullname"], "Test User");
    assert_eq!(location, format!("/users/{}", body["id"].as_str().unwrap_or_default()));
    assert!(body.get("password").is_none());
    assert!(body.get("passwordHash").is_none());
    assert!(body.get("password_hash").is_none());
    Ok(())
}

#[tokio::test]
async fn duplicate_username_is_rejected() -> Result<()> {
    let app = TestApp::spawn().await?;
    app.register("alice").await?;

    let res = app.register("alice").await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: Value = res.json().await?;
    assert_eq!(body["code"], "DUPLICATE_USERNAME");
    Ok(())
}

#[tokio::test]
async fn registration_validation_is_422_with_location() -> Result<()> {
    let app = TestApp::spawn().await?;

    let cases = [
        (json!({ "password": PASSWORD }), "username"),
        (json!({ "username": "alice" }), "password"),
        (json!({ "username": 7, "password": PASSWORD }), "username"),
        (json!({ "username": " alice", "password": PASSWORD }), "username"),
        (json!({ "username": "alice", "password": " password123" }), "password"),
        (json!({ "username": "alice", "password": "short" }), "password"),
        (json!({ "username": "alice", "password": "x".repeat(73) }), "password"),
    ];

    for (payload, location) in cases {
        let res = app.client.post(app.url("/users")).json(&payload).send().await?;
        assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY, "payload {}", payload);
        let body: Value = res.json().await?;
        assert_eq!(body["code"], "UNPROCESSABLE_ENTITY");
        assert!(body["field_errors"].get(location).is_some(), "payload {} -> {}", payload, body);
    }
    Ok(())
}

#[tokio::test]
async fn registration_without_a_json_body_is_422() -> Result<()> {
    let app = TestApp::spawn().await?;

    let bare = app.client.post(app.url("/users")).send().await?;
    let malformed = app
        .client
        .post(app.url("/users"))
        .header("content-type", "application/json")
        .body("{bad")
        .send()
        .await?;

    for res in [bare, malformed] {
        assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);
        let body: Value = res.json().await?;
        assert_eq!(body["code"], "UNPROCESSABLE_ENTITY");
        assert_eq!(body["field_errors"]["username"], "Missing field");
    }
    Ok(())
}

#[tokio::test]
async fn login_failures_are_uniform() -> Result<()> {
    let app = TestApp::spawn().await?;
    app.register("alice").await?;

    let wrong_password = app.login("alice", "wrongPassword").await?;
    assert_eq!(wrong_password.status(), StatusCode::UNAUTHORIZED);
    let wrong_password: Value = wrong_password.json().await?;

    let unknown_user = app.login("wrongUsername", PASSWORD).await?;
    assert_eq!(unknown_user.status(), StatusCode::UNAUTHORIZED);
    let unknown_user: Value = unknown_user.json().await?;

    assert_eq!(wrong_password, unknown_user);
    Ok(())
}

#[tokio::test]
async fn login_without_credentials_is_bad_request() -> Result<()> {
    let app = TestApp::spawn().await?;

    let res = app.client.post(app.url("/login")).json(&json!({})).send().await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    Ok(())
}

#[tokio::test]
async fn token_gates_protected_routes() -> Result<()> {
    let app = TestApp::spawn().await?;

    let res = app.client.get(app.url("/folders")).send().await?;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

    let res = app.get("/folders", "not.a.token").send().await?;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    let body: Value = res.json().await?;
    assert_eq!(body["code"], "UNAUTHORIZED");

    let token = app.signup("alice").await?;
    let res = app.get("/folders", &token).send().await?;
    assert_eq!(res.status(), StatusCode::OK);
    Ok(())
}

#[tokio::test]
async fn refresh_issues_a_working_token() -> Result<()> {
    let app = TestApp::spawn().await?;
    let token = app.signup("alice").await?;

    let res = app.post("/refresh", &token, json!({})).send().await?;
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await?;
    let refreshed = body["authToken"].as_str().unwrap_or_default().to_string();
    assert!(!refreshed.is_empty());

    let res = app.get("/notes", &refreshed).send().await?;
    assert_eq!(res.status(), StatusCode::OK);

    let res = app.client.post(app.url("/refresh")).send().await?;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    Ok(())
}
