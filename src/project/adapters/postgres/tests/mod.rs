//! Row conversion tests for the project adapter.

mod row_tests;
