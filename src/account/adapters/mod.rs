//! Adapter implementations for account ports.

pub mod jwt;
pub mod memory;
pub mod password;
pub mod postgres;
