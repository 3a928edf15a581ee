//! Shared JSON representations.

use crate::account::domain::{User, UserId, UserProfile, UserSummary};
use crate::blob::StoredFile;
use axum::http::header::{CONTENT_DISPOSITION, CONTENT_TYPE};
use axum::response::{IntoResponse, Response};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::HashMap;

/// Full representation of the signed-in user.
#[derive(Debug, Clone, Serialize)]
pub struct UserView {
    /// Identifier.
    pub id: UserId,
    /// Email address.
    pub email: String,
    /// Given name.
    pub first_name: String,
    /// Family name.
    pub last_name: String,
    /// Profile details.
    #[serde(flatten)]
    pub profile: UserProfile,
    /// Registration timestamp.
    pub date_joined: DateTime<Utc>,
}

impl From<&User> for UserView {
    fn from(user: &User) -> Self {
        Self {
            id: user.id(),
            email: user.email().as_str().to_owned(),
            first_name: user.first_name().to_owned(),
            last_name: user.last_name().to_owned(),
            profile: user.profile().clone(),
            date_joined: user.date_joined(),
        }
    }
}

/// A membership row with the member's public identity.
#[derive(Debug, Clone, Serialize)]
pub struct MemberView<M> {
    /// The membership.
    #[serde(flatten)]
    pub membership: M,
    /// Member details; absent when the account no longer exists.
    pub user: Option<UserSummary>,
}

impl<M> MemberView<M> {
    /// Joins each membership with its user summary.
    pub fn join(
        memberships: Vec<M>,
        user_of: impl Fn(&M) -> UserId,
        users: &HashMap<UserId, UserSummary>,
    ) -> Vec<Self> {
        memberships
            .into_iter()
            .map(|membership| {
                let user = users.get(&user_of(&membership)).cloned();
                Self { membership, user }
            })
            .collect()
    }
}

/// A comment with its nested replies.
#[derive(Debug, Clone, Serialize)]
pub struct ThreadView<C> {
    /// The comment.
    #[serde(flatten)]
    pub comment: C,
    /// Replies, oldest first.
    pub replies: Vec<ThreadView<C>>,
}

/// `{"message": "..."}` confirmation body.
#[derive(Debug, Clone, Serialize)]
pub struct Message {
    /// Confirmation text.
    pub message: String,
}

impl Message {
    /// Wraps `message`.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Raw file content sent back as a download.
#[derive(Debug)]
pub struct Download {
    /// Content type header value.
    pub content_type: String,
    /// Suggested file name.
    pub file_name: String,
    /// Content.
    pub bytes: Vec<u8>,
}

impl Download {
    /// Pairs stored metadata with its content.
    #[must_use]
    pub fn of(file: &StoredFile, bytes: Vec<u8>) -> Self {
        Self {
            content_type: file.content_type.clone(),
            file_name: file.file_name.replace(['"', '\\', '\r', '\n'], "_"),
            bytes,
        }
    }
}

impl IntoResponse for Download {
    fn into_response(self) -> Response {
        let disposition = format!("attachment; filename=\"{}\"", self.file_name);
        (
            [(CONTENT_TYPE, self.content_type), (CONTENT_DISPOSITION, disposition)],
            self.bytes,
        )
            .into_response()
    }
}
