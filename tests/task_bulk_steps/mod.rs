//! Step definitions for bulk task scenarios.

mod given;
mod then;
mod when;
pub mod world;
