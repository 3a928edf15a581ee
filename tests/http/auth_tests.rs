//! Registration, sign-in and bearer token handling.

use super::client::{PASSWORD, TestApp, app, text};
use axum::http::{Method, StatusCode};
use rstest::rstest;
use serde_json::json;

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn health_needs_no_token(app: TestApp) {
    let reply = app.send(Method::GET, "/health", None, None).await;

    assert_eq!(reply.status, StatusCode::OK);
    assert_eq!(reply.body, json!({ "status": "ok" }));
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn registered_token_identifies_the_user(app: TestApp) {
    let token = app.register("ada@example.com", "Ada").await;

    let reply = app.get("/api/auth/me", &token).await;

    assert_eq!(reply.status, StatusCode::OK);
    assert_eq!(text(&reply.body, "email"), "ada@example.com");
    assert_eq!(text(&reply.body, "first_name"), "Ada");
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn missing_token_is_unauthorized(app: TestApp) {
    let reply = app.send(Method::GET, "/api/auth/me", None, None).await;

    assert_eq!(reply.status, StatusCode::UNAUTHORIZED);
    assert_eq!(
        text(&reply.body, "detail"),
        "Authentication credentials were not provided."
    );
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn forged_token_is_unauthorized(app: TestApp) {
    let reply = app.get("/api/projects", "not-a-real-token").await;

    assert_eq!(reply.status, StatusCode::UNAUTHORIZED);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn mismatched_passwords_are_rejected(app: TestApp) {
    let reply = app
        .send(
            Method::POST,
            "/api/auth/register",
            None,
            Some(json!({
                "email": "ada@example.com",
                "password": PASSWORD,
                "confirm_password": "something-else",
            })),
        )
        .await;

    assert_eq!(reply.status, StatusCode::BAD_REQUEST);
    assert_eq!(reply.body, json!({ "password": ["Password fields didn't match."] }));
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn duplicate_email_is_rejected(app: TestApp) {
    app.register("ada@example.com", "Ada").await;

    let reply = app
        .send(
            Method::POST,
            "/api/auth/register",
            None,
            Some(json!({
                "email": "ada@example.com",
                "password": PASSWORD,
                "confirm_password": PASSWORD,
            })),
        )
        .await;

    assert_eq!(reply.status, StatusCode::BAD_REQUEST);
    assert!(reply.body.get("email").is_some(), "{}", reply.body);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn login_checks_the_password(app: TestApp) {
    app.register("ada@example.com", "Ada").await;

    let wrong = app
        .send(
            Method::POST,
            "/api/auth/login",
            None,
            Some(json!({ "email": "ada@example.com", "password": "wrong-password" })),
        )
        .await;
    let right = app
        .send(
            Method::POST,
            "/api/auth/login",
            None,
            Some(json!({ "email": "ada@example.com", "password": PASSWORD })),
        )
        .await;

    assert_eq!(wrong.status, StatusCode::BAD_REQUEST);
    assert_eq!(
        wrong.body,
        json!({ "non_field_errors": ["Invalid email or password."] })
    );
    assert_eq!(right.status, StatusCode::OK);
    assert_eq!(text(&right.body, "message"), "Login successful");
}
