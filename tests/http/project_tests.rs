//! Project routes and role enforcement.

use super::client::{TestApp, app, text};
use axum::http::StatusCode;
use rstest::rstest;
use serde_json::json;

async fn create_project(app: &TestApp, token: &str, title: &str) -> String {
    let reply = app
        .post("/api/projects", token, json!({ "title": title }))
        .await;
    assert_eq!(reply.status, StatusCode::CREATED, "{}", reply.body);
    text(&reply.body, "id").to_owned()
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn creator_owns_new_project(app: TestApp) {
    let token = app.register("owner@example.com", "Olive").await;

    let reply = app
        .post("/api/projects", &token, json!({ "title": "Apollo" }))
        .await;

    assert_eq!(reply.status, StatusCode::CREATED);
    assert_eq!(text(&reply.body, "user_role"), "owner");
    assert_eq!(text(&reply.body, "status"), "planning");
    assert_eq!(reply.body["permissions"]["can_delete"], json!(true));
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn strangers_get_not_found(app: TestApp) {
    let owner = app.register("owner@example.com", "Olive").await;
    let stranger = app.register("stranger@example.com", "Sam").await;
    let id = create_project(&app, &owner, "Apollo").await;

    let reply = app.get(&format!("/api/projects/{id}"), &stranger).await;

    assert_eq!(reply.status, StatusCode::NOT_FOUND);
    assert_eq!(reply.body, json!({ "detail": "Not found." }));
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn viewers_can_read_but_not_edit(app: TestApp) {
    let owner = app.register("owner@example.com", "Olive").await;
    let viewer = app.register("viewer@example.com", "Vic").await;
    let id = create_project(&app, &owner, "Apollo").await;

    let added = app
        .post(
            &format!("/api/projects/{id}/members"),
            &owner,
            json!({ "email": "viewer@example.com", "role": "viewer" }),
        )
        .await;
    let read = app.get(&format!("/api/projects/{id}"), &viewer).await;
    let edit = app
        .patch(
            &format!("/api/projects/{id}"),
            &viewer,
            json!({ "title": "Artemis" }),
        )
        .await;

    assert_eq!(added.status, StatusCode::CREATED, "{}", added.body);
    assert_eq!(read.status, StatusCode::OK);
    assert_eq!(text(&read.body, "user_role"), "viewer");
    assert_eq!(edit.status, StatusCode::FORBIDDEN);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn unknown_member_email_is_a_field_error(app: TestApp) {
    let owner = app.register("owner@example.com", "Olive").await;
    let id = create_project(&app, &owner, "Apollo").await;

    let reply = app
        .post(
            &format!("/api/projects/{id}/members"),
            &owner,
            json!({ "email": "nobody@example.com" }),
        )
        .await;

    assert_eq!(reply.status, StatusCode::BAD_REQUEST);
    assert_eq!(
        reply.body,
        json!({ "email": ["User with email nobody@example.com not found"] })
    );
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn deleting_a_project_removes_its_tasks(app: TestApp) {
    let owner = app.register("owner@example.com", "Olive").await;
    let id = create_project(&app, &owner, "Apollo").await;
    let task = app
        .post(
            "/api/tasks/tasks",
            &owner,
            json!({ "title": "Launch", "project_id": id }),
        )
        .await;
    assert_eq!(task.status, StatusCode::CREATED, "{}", task.body);
    let task_id = text(&task.body, "id").to_owned();

    let removed = app.delete(&format!("/api/projects/{id}"), &owner).await;
    let lookup = app.get(&format!("/api/tasks/tasks/{task_id}"), &owner).await;

    assert_eq!(removed.status, StatusCode::NO_CONTENT);
    assert_eq!(lookup.status, StatusCode::NOT_FOUND);
}
