//! Adapter implementations of the project and topic ports.

pub mod memory;
pub mod postgres;
