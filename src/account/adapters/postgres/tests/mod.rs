//! Row conversion tests for the user adapter.

mod row_tests;
