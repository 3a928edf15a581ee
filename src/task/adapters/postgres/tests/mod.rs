//! Row conversion tests for the task adapter.

mod row_tests;
