//! Project membership rows.

use super::{MembershipId, ProjectId};
use crate::access::MemberRole;
use crate::account::domain::UserId;
use chrono::{DateTime, Utc};
use mockable::Clock;

/// Grants `user` a role on a project.
///
/// At most one membership exists per `(project, user)` pair, and the project
/// owner never holds one.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct ProjectMembership {
    /// Membership identifier.
    pub id: MembershipId,
    /// Project the role applies to.
    pub project_id: ProjectId,
    /// Member.
    pub user_id: UserId,
    /// Granted role.
    pub role: MemberRole,
    /// When the member joined.
    pub created_at: DateTime<Utc>,
    /// When the role last changed.
    pub updated_at: DateTime<Utc>,
}

impl ProjectMembership {
    /// Creates a membership.
    #[must_use]
    pub fn new(
        project_id: ProjectId,
        user_id: UserId,
        role: MemberRole,
        clock: &impl Clock,
    ) -> Self {
        let timestamp = clock.utc();
        Self {
            id: MembershipId::new(),
            project_id,
            user_id,
            role,
            created_at: timestamp,
            updated_at: timestamp,
        }
    }

    /// Changes the granted role.
    pub fn change_role(&mut self, role: MemberRole, clock: &impl Clock) {
        self.role = role;
        self.updated_at = clock.utc();
    }
}
