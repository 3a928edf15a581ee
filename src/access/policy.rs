//! Per-resource policy tables and the single authorisation check.

use super::{AccessError, AccessRole};
use serde::Serialize;
use std::fmt;

/// Operation a caller attempts on a protected resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    /// Read the resource and its content.
    View,
    /// Add new content (files, notes, tasks, ...).
    Contribute,
    /// Change the resource or existing content.
    Edit,
    /// Add, re-role or remove members.
    ManageMembers,
    /// Delete the resource.
    Delete,
}

impl Action {
    /// Returns the wire representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::View => "view",
            Self::Contribute => "contribute",
            Self::Edit => "edit",
            Self::ManageMembers => "manage_members",
            Self::Delete => "delete",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Minimum role required for each action on one kind of resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AccessPolicy {
    view: AccessRole,
    contribute: AccessRole,
    edit: AccessRole,
    manage_members: AccessRole,
    delete: AccessRole,
}

/// Projects: only the owner manages the team or deletes the project.
pub const PROJECT_POLICY: AccessPolicy = AccessPolicy {
    view: AccessRole::Viewer,
    contribute: AccessRole::Contributor,
    edit: AccessRole::Editor,
    manage_members: AccessRole::Owner,
    delete: AccessRole::Owner,
};

/// Ideas: editors may also manage the idea's collaborators.
pub const IDEA_POLICY: AccessPolicy = AccessPolicy {
    view: AccessRole::Viewer,
    contribute: AccessRole::Contributor,
    edit: AccessRole::Editor,
    manage_members: AccessRole::Editor,
    delete: AccessRole::Owner,
};

/// Tasks: contributors add and update work; deleting it takes an editor.
pub const TASK_POLICY: AccessPolicy = AccessPolicy {
    view: AccessRole::Viewer,
    contribute: AccessRole::Contributor,
    edit: AccessRole::Editor,
    manage_members: AccessRole::Owner,
    delete: AccessRole::Editor,
};

impl AccessPolicy {
    /// Returns the minimum role for `action`.
    #[must_use]
    pub const fn required(&self, action: Action) -> AccessRole {
        match action {
            Action::View => self.view,
            Action::Contribute => self.contribute,
            Action::Edit => self.edit,
            Action::ManageMembers => self.manage_members,
            Action::Delete => self.delete,
        }
    }

    /// Returns `true` when `role` may perform `action`.
    #[must_use]
    pub const fn allows(&self, role: AccessRole, action: Action) -> bool {
        role.satisfies(self.required(action))
    }

    /// Authorises `action` for a caller holding `role`.
    ///
    /// # Errors
    ///
    /// Returns [`AccessError::NotVisible`] when the caller has no role and
    /// [`AccessError::Forbidden`] when the role is too low.
    pub const fn authorize(
        &self,
        role: Option<AccessRole>,
        action: Action,
    ) -> Result<AccessRole, AccessError> {
        let Some(held) = role else {
            return Err(AccessError::NotVisible);
        };
        if self.allows(held, action) {
            Ok(held)
        } else {
            Err(AccessError::Forbidden {
                action,
                required: self.required(action),
            })
        }
    }

    /// Expands `role` into the permission flags shown to clients.
    #[must_use]
    pub const fn permissions(&self, role: AccessRole) -> Permissions {
        Permissions {
            can_view: self.allows(role, Action::View),
            can_contribute: self.allows(role, Action::Contribute),
            can_edit: self.allows(role, Action::Edit),
            can_manage_members: self.allows(role, Action::ManageMembers),
            can_delete: self.allows(role, Action::Delete),
        }
    }
}

/// Permission flags for one caller on one resource.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[expect(
    clippy::struct_excessive_bools,
    reason = "flags mirror the permission matrix returned to clients"
)]
pub struct Permissions {
    /// Caller may read the resource.
    pub can_view: bool,
    /// Caller may add content.
    pub can_contribute: bool,
    /// Caller may change the resource.
    pub can_edit: bool,
    /// Caller may manage members.
    pub can_manage_members: bool,
    /// Caller may delete the resource.
    pub can_delete: bool,
}
