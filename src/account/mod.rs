//! User accounts, credentials and bearer tokens.
//!
//! Accounts are the identity every other context refers to through
//! [`domain::UserId`]. The module follows the same hexagonal split as the
//! rest of the crate:
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
