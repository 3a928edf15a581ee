//! HTTP API tests driven through `tower::ServiceExt::oneshot`.
//!
//! Tests are organized into modules by route group:
//! - `auth_tests`: registration, sign-in and bearer token checks
//! - `project_tests`: projects, members and role enforcement
//! - `task_tests`: tasks, bulk changes, lists and templates

#![expect(
    clippy::expect_used,
    reason = "Test code uses expect for assertion clarity"
)]

mod http {
    pub mod client;

    mod auth_tests;
    mod project_tests;
    mod task_tests;
}
