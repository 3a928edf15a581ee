//! Unit tests for shared value types.

mod choice_tests;
mod field_tests;
mod tag_tests;
