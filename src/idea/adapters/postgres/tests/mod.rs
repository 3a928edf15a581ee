//! Row conversion tests for the idea adapter.

mod row_tests;
