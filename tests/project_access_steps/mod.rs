//! Step definitions for project access scenarios.

mod given;
mod then;
mod when;
pub mod world;
