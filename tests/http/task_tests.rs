//! Task routes: completion, bulk changes, lists and templates.

use super::client::{TestApp, app, text};
use axum::http::StatusCode;
use rstest::rstest;
use serde_json::{Value, json};

async fn create_task(app: &TestApp, token: &str, body: Value) -> String {
    let reply = app.post("/api/tasks/tasks", token, body).await;
    assert_eq!(reply.status, StatusCode::CREATED, "{}", reply.body);
    text(&reply.body, "id").to_owned()
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn new_task_is_a_personal_todo(app: TestApp) {
    let token = app.register("ada@example.com", "Ada").await;

    let reply = app
        .post(
            "/api/tasks/tasks",
            &token,
            json!({ "title": "Write report", "tags": "docs, q3" }),
        )
        .await;

    assert_eq!(reply.status, StatusCode::CREATED);
    assert_eq!(text(&reply.body, "status"), "todo");
    assert_eq!(text(&reply.body, "priority"), "medium");
    assert_eq!(text(&reply.body, "context_type"), "standalone");
    assert_eq!(text(&reply.body, "context_display"), "Personal Task");
    assert_eq!(reply.body["tag_list"], json!(["docs", "q3"]));
    assert_eq!(reply.body["can_start"], json!(true));
    assert_eq!(text(&reply.body["created_by"], "email"), "ada@example.com");
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn unknown_assignee_is_rejected(app: TestApp) {
    let token = app.register("ada@example.com", "Ada").await;

    let reply = app
        .post(
            "/api/tasks/tasks",
            &token,
            json!({
                "title": "Delegate",
                "assignee_id": "00000000-0000-4000-8000-000000000000",
            }),
        )
        .await;

    assert_eq!(reply.status, StatusCode::BAD_REQUEST);
    assert_eq!(reply.body, json!({ "assignee_id": ["User not found"] }));
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn project_viewers_cannot_create_tasks_by_assigning_themselves(app: TestApp) {
    let owner = app.register("owner@example.com", "Olive").await;
    let viewer = app.register("viewer@example.com", "Vic").await;
    let project = app
        .post("/api/projects", &owner, json!({ "title": "Apollo" }))
        .await;
    let project_id = text(&project.body, "id").to_owned();
    let added = app
        .post(
            &format!("/api/projects/{project_id}/members"),
            &owner,
            json!({ "email": "viewer@example.com", "role": "viewer" }),
        )
        .await;
    let me = app.get("/api/auth/me", &viewer).await;

    let reply = app
        .post(
            "/api/tasks/tasks",
            &viewer,
            json!({
                "title": "Sneak in",
                "project_id": project_id,
                "assignee_id": text(&me.body, "id"),
            }),
        )
        .await;

    assert_eq!(added.status, StatusCode::CREATED, "{}", added.body);
    assert_eq!(reply.status, StatusCode::FORBIDDEN, "{}", reply.body);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn completing_twice_reports_already_completed(app: TestApp) {
    let token = app.register("ada@example.com", "Ada").await;
    let id = create_task(&app, &token, json!({ "title": "Ship" })).await;
    let uri = format!("/api/tasks/tasks/{id}/complete");

    let first = app.post(&uri, &token, json!({})).await;
    let second = app.post(&uri, &token, json!({})).await;
    let detail = app.get(&format!("/api/tasks/tasks/{id}"), &token).await;

    assert_eq!(first.body, json!({ "message": "Task completed successfully" }));
    assert_eq!(second.body, json!({ "message": "Task is already completed" }));
    assert_eq!(text(&detail.body, "status"), "done");
    assert_eq!(detail.body["progress_percentage"], json!(100));
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn bulk_status_update_reports_count(app: TestApp) {
    let token = app.register("ada@example.com", "Ada").await;
    let first = create_task(&app, &token, json!({ "title": "One" })).await;
    let second = create_task(&app, &token, json!({ "title": "Two" })).await;

    let reply = app
        .post(
            "/api/tasks/tasks/bulk",
            &token,
            json!({
                "task_ids": [first, second],
                "action": "update_status",
                "value": "in_progress",
            }),
        )
        .await;
    let listed = app
        .get("/api/tasks/tasks?status=in_progress", &token)
        .await;

    assert_eq!(reply.status, StatusCode::OK, "{}", reply.body);
    assert_eq!(
        reply.body,
        json!({ "message": "Successfully update_status 2 tasks", "updated_count": 2 })
    );
    assert_eq!(listed.body.as_array().map(Vec::len), Some(2));
}

#[rstest]
#[case::missing_value(
    json!({ "action": "update_status" }),
    json!({ "value": ["Value is required for action: update_status"] })
)]
#[case::bad_status(
    json!({ "action": "update_status", "value": "finished" }),
    json!({ "value": ["Invalid status value"] })
)]
#[case::bad_priority(
    json!({ "action": "update_priority", "value": "critical" }),
    json!({ "value": ["Invalid priority value"] })
)]
#[tokio::test(flavor = "multi_thread")]
async fn bulk_rejects_bad_values(app: TestApp, #[case] extra: Value, #[case] expected: Value) {
    let token = app.register("ada@example.com", "Ada").await;
    let id = create_task(&app, &token, json!({ "title": "One" })).await;
    let mut body = extra;
    body["task_ids"] = json!([id]);

    let reply = app.post("/api/tasks/tasks/bulk", &token, body).await;

    assert_eq!(reply.status, StatusCode::BAD_REQUEST);
    assert_eq!(reply.body, expected);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn other_users_tasks_are_hidden(app: TestApp) {
    let owner = app.register("ada@example.com", "Ada").await;
    let other = app.register("bob@example.com", "Bob").await;
    let id = create_task(&app, &owner, json!({ "title": "Private" })).await;

    let reply = app.get(&format!("/api/tasks/tasks/{id}"), &other).await;
    let listed = app.get("/api/tasks/tasks", &other).await;

    assert_eq!(reply.status, StatusCode::NOT_FOUND);
    assert_eq!(listed.body, json!([]));
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn time_logs_accumulate_into_actual_hours(app: TestApp) {
    let token = app.register("ada@example.com", "Ada").await;
    let id = create_task(&app, &token, json!({ "title": "Measure" })).await;
    let uri = format!("/api/tasks/tasks/{id}/time-logs");

    let first = app
        .post(&uri, &token, json!({ "hours": "1.50", "date": "2026-03-02" }))
        .await;
    let second = app
        .post(&uri, &token, json!({ "hours": 2, "date": "2026-03-03" }))
        .await;
    let detail = app.get(&format!("/api/tasks/tasks/{id}"), &token).await;

    assert_eq!(first.status, StatusCode::CREATED, "{}", first.body);
    assert_eq!(second.status, StatusCode::CREATED, "{}", second.body);
    assert_eq!(text(&detail.body, "actual_hours"), "3.50");
    assert_eq!(text(&detail.body, "total_time_logged"), "3.50");
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn task_lists_reorder_their_tasks(app: TestApp) {
    let token = app.register("ada@example.com", "Ada").await;
    let list = app
        .post("/api/tasks/task-lists", &token, json!({ "name": "Sprint" }))
        .await;
    assert_eq!(list.status, StatusCode::CREATED, "{}", list.body);
    let list_id = text(&list.body, "id").to_owned();
    let first = create_task(
        &app,
        &token,
        json!({ "title": "First", "task_list_id": list_id }),
    )
    .await;
    let second = create_task(
        &app,
        &token,
        json!({ "title": "Second", "task_list_id": list_id }),
    )
    .await;

    let reply = app
        .post(
            &format!("/api/tasks/task-lists/{list_id}/reorder"),
            &token,
            json!({ "task_ids": [second, first] }),
        )
        .await;
    let reloaded = app
        .get(&format!("/api/tasks/task-lists/{list_id}"), &token)
        .await;
    let moved = app
        .get(&format!("/api/tasks/tasks/{second}"), &token)
        .await;

    assert_eq!(reply.body, json!({ "message": "Tasks reordered successfully" }));
    assert_eq!(reloaded.body["tasks_count"], json!(2));
    assert_eq!(moved.body["position"], json!(0));
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn templates_render_for_the_requesting_user(app: TestApp) {
    let token = app.register("ada@example.com", "Ada").await;
    let template = app
        .post(
            "/api/tasks/templates",
            &token,
            json!({
                "name": "Review",
                "title_template": "Review by {{ user }}",
                "priority": "high",
                "tags": "review",
            }),
        )
        .await;
    assert_eq!(template.status, StatusCode::CREATED, "{}", template.body);
    let template_id = text(&template.body, "id").to_owned();

    let reply = app
        .post(
            &format!("/api/tasks/templates/{template_id}/create-task"),
            &token,
            json!({}),
        )
        .await;

    assert_eq!(reply.status, StatusCode::CREATED, "{}", reply.body);
    assert_eq!(text(&reply.body, "title"), "Review by Ada Tester");
    assert_eq!(text(&reply.body, "priority"), "high");
    assert_eq!(reply.body["tag_list"], json!(["review"]));
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn dashboard_counts_own_tasks(app: TestApp) {
    let token = app.register("ada@example.com", "Ada").await;
    create_task(&app, &token, json!({ "title": "Open" })).await;
    let done = create_task(&app, &token, json!({ "title": "Closed" })).await;
    app.post(
        &format!("/api/tasks/tasks/{done}/complete"),
        &token,
        json!({}),
    )
    .await;

    let reply = app.get("/api/tasks/tasks/dashboard", &token).await;

    assert_eq!(reply.status, StatusCode::OK);
    assert_eq!(reply.body["my_tasks_summary"]["total"], json!(2));
    assert_eq!(reply.body["my_tasks_summary"]["done"], json!(1));
    assert_eq!(reply.body["by_context"]["standalone_tasks"], json!(2));
}
