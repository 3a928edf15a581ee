//! Diesel row models for ideas.

use super::schema::{idea_memberships, idea_notes, idea_projects, idea_resources, ideas};
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

/// Idea record.
#[derive(Debug, Clone, Queryable, Selectable, Insertable, AsChangeset)]
#[diesel(table_name = ideas)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct IdeaRow {
    /// Idea identifier.
    pub id: Uuid,
    /// Title.
    pub title: String,
    /// Description.
    pub description: String,
    /// Problem statement.
    pub problem_statement: String,
    /// Solution overview.
    pub solution_overview: String,
    /// Target audience.
    pub target_audience: String,
    /// Market potential.
    pub market_potential: String,
    /// Revenue model.
    pub revenue_model: String,
    /// Competition analysis.
    pub competition_analysis: String,
    /// Technical requirements.
    pub technical_requirements: String,
    /// Effort estimate.
    pub estimated_effort: String,
    /// Priority string.
    pub priority: String,
    /// Status string.
    pub status: String,
    /// Comma-separated tags.
    pub tags: String,
    /// Owning user.
    pub owner_id: Uuid,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last change timestamp.
    pub updated_at: DateTime<Utc>,
}

/// Idea-to-project link.
#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = idea_projects)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct IdeaProjectRow {
    /// Idea.
    pub idea_id: Uuid,
    /// Project.
    pub project_id: Uuid,
}

/// Idea membership record.
#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = idea_memberships)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct IdeaMembershipRow {
    /// Membership identifier.
    pub id: Uuid,
    /// Idea.
    pub idea_id: Uuid,
    /// Collaborator.
    pub user_id: Uuid,
    /// Role string.
    pub role: String,
    /// Inviting user.
    pub added_by: Uuid,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

/// Idea note record.
#[derive(Debug, Clone, Queryable, Selectable, Insertable, AsChangeset)]
#[diesel(table_name = idea_notes)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct IdeaNoteRow {
    /// Note identifier.
    pub id: Uuid,
    /// Idea.
    pub idea_id: Uuid,
    /// Title.
    pub title: String,
    /// Body.
    pub content: String,
    /// Author.
    pub author_id: Uuid,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last change timestamp.
    pub updated_at: DateTime<Utc>,
}

/// Idea resource record.
#[derive(Debug, Clone, Queryable, Selectable, Insertable, AsChangeset)]
#[diesel(table_name = idea_resources)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct IdeaResourceRow {
    /// Resource identifier.
    pub id: Uuid,
    /// Idea.
    pub idea_id: Uuid,
    /// Title.
    pub title: String,
    /// Target URL.
    pub url: String,
    /// Description.
    pub description: String,
    /// Kind string.
    pub resource_type: String,
    /// Adding user.
    pub added_by: Uuid,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}
