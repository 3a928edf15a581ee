//! Tasks, task lists, templates and the collaboration records on a task.
//!
//! A task takes its access role from the project and idea it belongs to;
//! standalone tasks are governed by their creator and assignee. The module
//! follows the same layout as the other contexts:
//!
//! - Domain types in [`domain`]
//! - Port contracts in [`ports`]
//! - Adapter implementations in [`adapters`]
//! - Orchestration services in [`services`]

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod services;

#[cfg(test)]
mod tests;
