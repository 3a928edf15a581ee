//! Hierarchical, per-resource access control.
//!
//! Projects and ideas share one role ladder (`viewer < contributor < editor
//! < owner`). Each resource kind supplies an [`AccessPolicy`] naming the
//! minimum role for every [`Action`], and every service authorises through
//! [`AccessPolicy::authorize`] instead of comparing roles inline.
//!
//! Callers without any role are told the resource is not visible, which the
//! HTTP layer renders as `404 Not Found` so that existence never leaks.

mod error;
mod policy;
mod role;

pub use error::{AccessError, ParseRoleError};
pub use policy::{AccessPolicy, Action, IDEA_POLICY, PROJECT_POLICY, Permissions, TASK_POLICY};
pub use role::{AccessRole, MemberRole};

#[cfg(test)]
mod tests;
