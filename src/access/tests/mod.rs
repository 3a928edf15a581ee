//! Unit tests for the role ladder and policy tables.

mod policy_tests;
mod role_tests;
