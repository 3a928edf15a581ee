//! Unit tests for the idea context.

mod domain_tests;
