//! Projects, their teams, shared files and links, the activity log, and
//! knowledge topics.
//!
//! A project is owned by the user who created it; other users reach it only
//! through a [`domain::ProjectMembership`]. Every operation resolves the
//! caller's [`crate::access::AccessRole`] and authorises it against
//! [`crate::access::PROJECT_POLICY`].
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
