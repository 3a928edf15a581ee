//! Unit tests for the account context.

mod credential_tests;
mod domain_tests;
mod service_tests;
mod support;
