//! Diesel row models for projects and topics.

use super::schema::{
    project_activities, project_files, project_links, project_memberships, projects,
    topic_comments, topic_links, topic_media, topic_notes, topic_tags, topics,
};
use chrono::{DateTime, NaiveDate, Utc};
use diesel::prelude::*;
use uuid::Uuid;

/// Project record.
#[derive(Debug, Clone, Queryable, Selectable, Insertable, AsChangeset)]
#[diesel(table_name = projects)]
#[diesel(check_for_backend(diesel::pg::Pg))]
#[diesel(treat_none_as_null = true)]
pub struct ProjectRow {
    /// Project identifier.
    pub id: Uuid,
    /// Title.
    pub title: String,
    /// Description.
    pub description: String,
    /// Status string.
    pub status: String,
    /// Priority string.
    pub priority: String,
    /// Owning user.
    pub owner_id: Uuid,
    /// Due date.
    pub due_date: Option<NaiveDate>,
    /// Completion percentage.
    pub progress: i16,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last change timestamp.
    pub updated_at: DateTime<Utc>,
}

/// Membership record.
#[derive(Debug, Clone, Queryable, Selectable, Insertable, AsChangeset)]
#[diesel(table_name = project_memberships)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct MembershipRow {
    /// Membership identifier.
    pub id: Uuid,
    /// Project.
    pub project_id: Uuid,
    /// Member.
    pub user_id: Uuid,
    /// Role string.
    pub role: String,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last change timestamp.
    pub updated_at: DateTime<Utc>,
}

/// Project file record.
#[derive(Debug, Clone, Queryable, Selectable, Insertable, AsChangeset)]
#[diesel(table_name = project_files)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct ProjectFileRow {
    /// File identifier.
    pub id: Uuid,
    /// Project.
    pub project_id: Uuid,
    /// Title.
    pub title: String,
    /// Description.
    pub description: String,
    /// Original file name.
    pub file_name: String,
    /// MIME type.
    pub content_type: String,
    /// Size in bytes.
    pub file_size: i64,
    /// Blob store key.
    pub storage_key: String,
    /// SHA-256 digest.
    pub sha256: String,
    /// Uploader.
    pub uploaded_by: Uuid,
    /// Upload timestamp.
    pub uploaded_at: DateTime<Utc>,
}

/// Project link record.
#[derive(Debug, Clone, Queryable, Selectable, Insertable, AsChangeset)]
#[diesel(table_name = project_links)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct ProjectLinkRow {
    /// Link identifier.
    pub id: Uuid,
    /// Project.
    pub project_id: Uuid,
    /// Title.
    pub title: String,
    /// Target URL.
    pub url: String,
    /// Description.
    pub description: String,
    /// Author.
    pub created_by: Uuid,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last change timestamp.
    pub updated_at: DateTime<Utc>,
}

/// Activity log record.
#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = project_activities)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct ActivityRow {
    /// Entry identifier.
    pub id: Uuid,
    /// Project.
    pub project_id: Uuid,
    /// Acting user.
    pub user_id: Uuid,
    /// Action label.
    pub action: String,
    /// Detail.
    pub description: String,
    /// Entry timestamp.
    pub created_at: DateTime<Utc>,
}

/// Topic record.
#[derive(Debug, Clone, Queryable, Selectable, Insertable, AsChangeset)]
#[diesel(table_name = topics)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct TopicRow {
    /// Topic identifier.
    pub id: Uuid,
    /// Project.
    pub project_id: Uuid,
    /// Title.
    pub title: String,
    /// Description.
    pub description: String,
    /// Colour.
    pub color: String,
    /// Author.
    pub created_by: Uuid,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last change timestamp.
    pub updated_at: DateTime<Utc>,
}

/// Topic note record.
#[derive(Debug, Clone, Queryable, Selectable, Insertable, AsChangeset)]
#[diesel(table_name = topic_notes)]
#[diesel(check_for_backend(diesel::pg::Pg))]
#[diesel(treat_none_as_null = true)]
pub struct TopicNoteRow {
    /// Note identifier.
    pub id: Uuid,
    /// Topic.
    pub topic_id: Uuid,
    /// Title.
    pub title: String,
    /// Body.
    pub content: String,
    /// Author.
    pub created_by: Uuid,
    /// Last editor.
    pub last_edited_by: Option<Uuid>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last change timestamp.
    pub updated_at: DateTime<Utc>,
}

/// Topic link record.
#[derive(Debug, Clone, Queryable, Selectable, Insertable, AsChangeset)]
#[diesel(table_name = topic_links)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct TopicLinkRow {
    /// Link identifier.
    pub id: Uuid,
    /// Topic.
    pub topic_id: Uuid,
    /// Title.
    pub title: String,
    /// Target URL.
    pub url: String,
    /// Description.
    pub description: String,
    /// Link type string.
    pub link_type: String,
    /// Author.
    pub created_by: Uuid,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last change timestamp.
    pub updated_at: DateTime<Utc>,
}

/// Topic media record.
#[derive(Debug, Clone, Queryable, Selectable, Insertable, AsChangeset)]
#[diesel(table_name = topic_media)]
#[diesel(check_for_backend(diesel::pg::Pg))]
#[diesel(treat_none_as_null = true)]
pub struct TopicMediaRow {
    /// Media identifier.
    pub id: Uuid,
    /// Topic.
    pub topic_id: Uuid,
    /// Title.
    pub title: String,
    /// Description.
    pub description: String,
    /// Media type string.
    pub media_type: String,
    /// Original file name.
    pub file_name: String,
    /// MIME type.
    pub content_type: String,
    /// Size in bytes.
    pub file_size: i64,
    /// Blob store key.
    pub storage_key: String,
    /// SHA-256 digest.
    pub sha256: String,
    /// Playback length.
    pub duration_seconds: Option<i64>,
    /// Uploader.
    pub uploaded_by: Uuid,
    /// Upload timestamp.
    pub uploaded_at: DateTime<Utc>,
}

/// Topic tag record.
#[derive(Debug, Clone, Queryable, Selectable, Insertable, AsChangeset)]
#[diesel(table_name = topic_tags)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct TopicTagRow {
    /// Tag identifier.
    pub id: Uuid,
    /// Topic.
    pub topic_id: Uuid,
    /// Name.
    pub name: String,
    /// Colour.
    pub color: String,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

/// Topic comment record.
#[derive(Debug, Clone, Queryable, Selectable, Insertable, AsChangeset)]
#[diesel(table_name = topic_comments)]
#[diesel(check_for_backend(diesel::pg::Pg))]
#[diesel(treat_none_as_null = true)]
pub struct TopicCommentRow {
    /// Comment identifier.
    pub id: Uuid,
    /// Topic.
    pub topic_id: Uuid,
    /// Author.
    pub author_id: Uuid,
    /// Body.
    pub content: String,
    /// Parent comment.
    pub parent_id: Option<Uuid>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last change timestamp.
    pub updated_at: DateTime<Utc>,
}
