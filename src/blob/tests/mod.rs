//! Unit tests for blob storage.

mod filesystem_tests;
mod memory_tests;
