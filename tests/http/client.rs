//! In-process client for the HTTP API over in-memory stores.

use axum::Router;
use axum::body::{Body, to_bytes};
use axum::http::{Method, Request, StatusCode, header};
use planboard::account::adapters::jwt::JwtTokenService;
use planboard::api::{self, AppState, Repositories};
use planboard::blob::adapters::memory::InMemoryBlobStore;
use rstest::fixture;
use serde_json::{Value, json};
use std::sync::Arc;
use tower::ServiceExt;

/// Password used for every registered test user.
pub const PASSWORD: &str = "correct-horse-battery";

/// Upload limit applied to the test router.
pub const MAX_UPLOAD_BYTES: usize = 64 * 1024;

/// Router over fresh in-memory stores.
#[derive(Clone)]
pub struct TestApp {
    router: Router,
}

/// Status and decoded JSON body of one response.
#[derive(Debug)]
pub struct Reply {
    pub status: StatusCode,
    pub body: Value,
}

impl TestApp {
    /// Builds the full router with in-memory repositories and blobs.
    #[must_use]
    pub fn new() -> Self {
        let tokens = JwtTokenService::new(
            b"test-signing-secret",
            "planboard-tests",
            chrono::Duration::minutes(30),
        );
        let state = AppState::new(
            Repositories::in_memory(),
            Arc::new(InMemoryBlobStore::new()),
            tokens,
        );
        Self {
            router: api::router(state, MAX_UPLOAD_BYTES),
        }
    }

    /// Sends a request with an optional bearer token and JSON body.
    pub async fn send(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> Reply {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(bearer) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {bearer}"));
        }
        let request_body = match body {
            Some(json_body) => {
                builder = builder.header(header::CONTENT_TYPE, "application/json");
                Body::from(serde_json::to_vec(&json_body).expect("body serialises"))
            }
            None => Body::empty(),
        };
        let request = builder.body(request_body).expect("request builds");
        self.dispatch(request).await
    }

    /// Sends a prepared request.
    pub async fn dispatch(&self, request: Request<Body>) -> Reply {
        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("router is infallible");
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body is readable");
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or_else(|_| {
                Value::String(String::from_utf8_lossy(&bytes).into_owned())
            })
        };
        Reply { status, body }
    }

    /// Authenticated GET.
    pub async fn get(&self, uri: &str, token: &str) -> Reply {
        self.send(Method::GET, uri, Some(token), None).await
    }

    /// Authenticated POST with a JSON body.
    pub async fn post(&self, uri: &str, token: &str, body: Value) -> Reply {
        self.send(Method::POST, uri, Some(token), Some(body)).await
    }

    /// Authenticated PATCH with a JSON body.
    pub async fn patch(&self, uri: &str, token: &str, body: Value) -> Reply {
        self.send(Method::PATCH, uri, Some(token), Some(body)).await
    }

    /// Authenticated DELETE.
    pub async fn delete(&self, uri: &str, token: &str) -> Reply {
        self.send(Method::DELETE, uri, Some(token), None).await
    }

    /// Registers `email` and returns its bearer token.
    pub async fn register(&self, email: &str, first_name: &str) -> String {
        let reply = self
            .send(
                Method::POST,
                "/api/auth/register",
                None,
                Some(json!({
                    "email": email,
                    "first_name": first_name,
                    "last_name": "Tester",
                    "password": PASSWORD,
                    "confirm_password": PASSWORD,
                })),
            )
            .await;
        assert_eq!(reply.status, StatusCode::CREATED, "{:?}", reply.body);
        reply.body["token"]
            .as_str()
            .expect("token is a string")
            .to_owned()
    }
}

impl Default for TestApp {
    fn default() -> Self {
        Self::new()
    }
}

/// Provides a fresh application for each test.
#[fixture]
pub fn app() -> TestApp {
    TestApp::new()
}

/// Reads a string field from a JSON body.
pub fn text<'a>(body: &'a Value, field: &str) -> &'a str {
    body[field]
        .as_str()
        .unwrap_or_else(|| panic!("{field} is not a string in {body}"))
}
