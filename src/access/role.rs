//! Role ladder shared by projects and ideas.

use super::ParseRoleError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Role that a membership row may grant.
///
/// Ownership is implied by the resource itself and can never be assigned
/// through a membership.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MemberRole {
    /// Read-only access.
    #[default]
    Viewer,
    /// May add content such as notes, files and tasks.
    Contributor,
    /// May change the resource and its content.
    Editor,
}

impl MemberRole {
    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Viewer => "viewer",
            Self::Contributor => "contributor",
            Self::Editor => "editor",
        }
    }
}

impl TryFrom<&str> for MemberRole {
    type Error = ParseRoleError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim().to_ascii_lowercase().as_str() {
            "viewer" => Ok(Self::Viewer),
            "contributor" => Ok(Self::Contributor),
            "editor" => Ok(Self::Editor),
            _ => Err(ParseRoleError(value.to_owned())),
        }
    }
}

/// Effective role of a caller on a resource, ordered by rank.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum AccessRole {
    /// Read-only access.
    Viewer,
    /// May add content.
    Contributor,
    /// May change the resource.
    Editor,
    /// Created the resource; holds every permission.
    Owner,
}

impl AccessRole {
    /// Resolves the caller's role from ownership and membership.
    ///
    /// Ownership always wins; otherwise the membership role applies, and a
    /// caller with neither has no access.
    #[must_use]
    pub const fn resolve(is_owner: bool, membership: Option<MemberRole>) -> Option<Self> {
        if is_owner {
            return Some(Self::Owner);
        }
        match membership {
            Some(role) => Some(Self::from_member(role)),
            None => None,
        }
    }

    /// Lifts a membership role onto the access ladder.
    #[must_use]
    pub const fn from_member(role: MemberRole) -> Self {
        match role {
            MemberRole::Viewer => Self::Viewer,
            MemberRole::Contributor => Self::Contributor,
            MemberRole::Editor => Self::Editor,
        }
    }

    /// Numeric rank, starting at 1 for viewers.
    #[must_use]
    pub const fn rank(self) -> u8 {
        match self {
            Self::Viewer => 1,
            Self::Contributor => 2,
            Self::Editor => 3,
            Self::Owner => 4,
        }
    }

    /// Returns `true` when this role satisfies `required`.
    #[must_use]
    pub const fn satisfies(self, required: Self) -> bool {
        self.rank() >= required.rank()
    }

    /// Returns the wire representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Viewer => "viewer",
            Self::Contributor => "contributor",
            Self::Editor => "editor",
            Self::Owner => "owner",
        }
    }

    /// Returns the higher of two optional roles.
    #[must_use]
    pub fn strongest(left: Option<Self>, right: Option<Self>) -> Option<Self> {
        left.max(right)
    }
}

impl fmt::Display for AccessRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
