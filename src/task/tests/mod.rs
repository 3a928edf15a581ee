//! Unit tests for the task context.

mod domain_tests;
mod failure_tests;
mod record_tests;
mod service_tests;
mod support;
mod template_tests;
