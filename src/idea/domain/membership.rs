//! Idea collaborators.

use super::{IdeaId, IdeaMembershipId};
use crate::access::MemberRole;
use crate::account::domain::UserId;
use chrono::{DateTime, Utc};
use mockable::Clock;

/// Grants `user_id` a role on an idea, recording who invited them.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct IdeaMembership {
    /// Membership identifier.
    pub id: IdeaMembershipId,
    /// Idea the role applies to.
    pub idea_id: IdeaId,
    /// Collaborator.
    pub user_id: UserId,
    /// Granted role.
    pub role: MemberRole,
    /// User who added the collaborator.
    pub added_by: UserId,
    /// When the collaborator was added.
    pub created_at: DateTime<Utc>,
}

impl IdeaMembership {
    /// Creates a membership.
    #[must_use]
    pub fn new(
        idea_id: IdeaId,
        user_id: UserId,
        role: MemberRole,
        added_by: UserId,
        clock: &impl Clock,
    ) -> Self {
        Self {
            id: IdeaMembershipId::new(),
            idea_id,
            user_id,
            role,
            added_by,
            created_at: clock.utc(),
        }
    }
}
