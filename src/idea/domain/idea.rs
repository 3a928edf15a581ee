//! Idea aggregate root.

use super::{IdeaDomainError, IdeaId};
use crate::account::domain::UserId;
use crate::project::domain::ProjectId;
use crate::shared::{FieldError, Tags, choice_enum, optional_text, required_text};
use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::Serialize;

const MAX_TITLE_CHARS: usize = 200;
const MAX_TEXT_CHARS: usize = 10_000;
const MAX_EFFORT_CHARS: usize = 100;

choice_enum! {
    /// Maturity of an idea.
    #[derive(Default)]
    IdeaStatus, field = "status" {
        /// Rough thought; the default.
        #[default]
        Draft => "draft",
        /// Worked out well enough to discuss.
        Concept => "concept",
        /// Being built.
        InDevelopment => "in_development",
        /// Shipped.
        Implemented => "implemented",
        /// Parked.
        OnHold => "on_hold",
        /// Dropped.
        Cancelled => "cancelled",
    }
}

choice_enum! {
    /// Relative importance of an idea.
    #[derive(Default)]
    IdeaPriority, field = "priority" {
        /// Nice to have.
        Low => "low",
        /// The default.
        #[default]
        Medium => "medium",
        /// Important.
        High => "high",
        /// Must be pursued now.
        Critical => "critical",
    }
}

/// Long-form business and technical write-up of an idea.
///
/// Every field is optional free text; `estimated_effort` is a short label
/// such as `"2-3 weeks"`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct IdeaBrief {
    /// Problem the idea solves.
    pub problem_statement: String,
    /// High-level outline of the solution.
    pub solution_overview: String,
    /// Who benefits.
    pub target_audience: String,
    /// Market size and opportunity.
    pub market_potential: String,
    /// How the idea would make money.
    pub revenue_model: String,
    /// Competitors and differentiation.
    pub competition_analysis: String,
    /// Key technical requirements and constraints.
    pub technical_requirements: String,
    /// Time or effort estimate.
    pub estimated_effort: String,
}

fn replace_text(
    slot: &mut String,
    value: Option<String>,
    field: &'static str,
    max_chars: usize,
) -> Result<(), FieldError> {
    if let Some(text) = value {
        *slot = optional_text(field, text, max_chars)?;
    }
    Ok(())
}

impl IdeaBrief {
    fn validated(self) -> Result<Self, FieldError> {
        let mut brief = Self::default();
        brief.patch(BriefPatch {
            problem_statement: Some(self.problem_statement),
            solution_overview: Some(self.solution_overview),
            target_audience: Some(self.target_audience),
            market_potential: Some(self.market_potential),
            revenue_model: Some(self.revenue_model),
            competition_analysis: Some(self.competition_analysis),
            technical_requirements: Some(self.technical_requirements),
            estimated_effort: Some(self.estimated_effort),
        })?;
        Ok(brief)
    }

    fn patch(&mut self, patch: BriefPatch) -> Result<(), FieldError> {
        replace_text(
            &mut self.problem_statement,
            patch.problem_statement,
            "problem_statement",
            MAX_TEXT_CHARS,
        )?;
        replace_text(
            &mut self.solution_overview,
            patch.solution_overview,
            "solution_overview",
            MAX_TEXT_CHARS,
        )?;
        replace_text(
            &mut self.target_audience,
            patch.target_audience,
            "target_audience",
            MAX_TEXT_CHARS,
        )?;
        replace_text(
            &mut self.market_potential,
            patch.market_potential,
            "market_potential",
            MAX_TEXT_CHARS,
        )?;
        replace_text(
            &mut self.revenue_model,
            patch.revenue_model,
            "revenue_model",
            MAX_TEXT_CHARS,
        )?;
        replace_text(
            &mut self.competition_analysis,
            patch.competition_analysis,
            "competition_analysis",
            MAX_TEXT_CHARS,
        )?;
        replace_text(
            &mut self.technical_requirements,
            patch.technical_requirements,
            "technical_requirements",
            MAX_TEXT_CHARS,
        )?;
        replace_text(
            &mut self.estimated_effort,
            patch.estimated_effort,
            "estimated_effort",
            MAX_EFFORT_CHARS,
        )
    }
}

struct BriefPatch {
    problem_statement: Option<String>,
    solution_overview: Option<String>,
    target_audience: Option<String>,
    market_potential: Option<String>,
    revenue_model: Option<String>,
    competition_analysis: Option<String>,
    technical_requirements: Option<String>,
    estimated_effort: Option<String>,
}

/// Input for creating an idea.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewIdea {
    /// Idea title.
    pub title: String,
    /// Short description; required.
    pub description: String,
    /// Long-form write-up.
    pub brief: IdeaBrief,
    /// Initial priority.
    pub priority: IdeaPriority,
    /// Initial status.
    pub status: IdeaStatus,
    /// Comma-separated tags.
    pub tags: String,
}

impl NewIdea {
    /// Creates input with a title and description and defaults otherwise.
    #[must_use]
    pub fn described(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            ..Self::default()
        }
    }
}

/// Partial update of an idea; `None` leaves a field unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IdeaChanges {
    /// New title.
    pub title: Option<String>,
    /// New description.
    pub description: Option<String>,
    /// New problem statement.
    pub problem_statement: Option<String>,
    /// New solution overview.
    pub solution_overview: Option<String>,
    /// New target audience.
    pub target_audience: Option<String>,
    /// New market potential.
    pub market_potential: Option<String>,
    /// New revenue model.
    pub revenue_model: Option<String>,
    /// New competition analysis.
    pub competition_analysis: Option<String>,
    /// New technical requirements.
    pub technical_requirements: Option<String>,
    /// New effort estimate.
    pub estimated_effort: Option<String>,
    /// New priority.
    pub priority: Option<IdeaPriority>,
    /// New status.
    pub status: Option<IdeaStatus>,
    /// New comma-separated tags.
    pub tags: Option<String>,
    /// Replacement project links; unreadable projects are dropped.
    pub project_ids: Option<Vec<ProjectId>>,
}

/// Idea aggregate root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Idea {
    id: IdeaId,
    title: String,
    description: String,
    brief: IdeaBrief,
    priority: IdeaPriority,
    status: IdeaStatus,
    tags: Tags,
    owner: UserId,
    project_ids: Vec<ProjectId>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

/// Parameter object for reconstructing a persisted idea.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistedIdeaData {
    /// Persisted identifier.
    pub id: IdeaId,
    /// Persisted title.
    pub title: String,
    /// Persisted description.
    pub description: String,
    /// Persisted write-up.
    pub brief: IdeaBrief,
    /// Persisted priority.
    pub priority: IdeaPriority,
    /// Persisted status.
    pub status: IdeaStatus,
    /// Persisted tags.
    pub tags: Tags,
    /// Owning user.
    pub owner: UserId,
    /// Linked projects.
    pub project_ids: Vec<ProjectId>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last change timestamp.
    pub updated_at: DateTime<Utc>,
}

impl Idea {
    /// Creates an idea owned by `owner` with no linked projects.
    ///
    /// # Errors
    ///
    /// Returns [`IdeaDomainError::Field`] for a blank title or description,
    /// or any oversized field.
    pub fn create(
        input: NewIdea,
        owner: UserId,
        clock: &impl Clock,
    ) -> Result<Self, IdeaDomainError> {
        let timestamp = clock.utc();
        Ok(Self {
            id: IdeaId::new(),
            title: required_text("title", input.title, MAX_TITLE_CHARS)?,
            description: required_text("description", input.description, MAX_TEXT_CHARS)?,
            brief: input.brief.validated()?,
            priority: input.priority,
            status: input.status,
            tags: Tags::parse("tags", &input.tags)?,
            owner,
            project_ids: Vec::new(),
            created_at: timestamp,
            updated_at: timestamp,
        })
    }

    /// Reconstructs an idea from persisted storage.
    #[must_use]
    pub fn from_persisted(data: PersistedIdeaData) -> Self {
        let mut idea = Self {
            id: data.id,
            title: data.title,
            description: data.description,
            brief: data.brief,
            priority: data.priority,
            status: data.status,
            tags: data.tags,
            owner: data.owner,
            project_ids: Vec::new(),
            created_at: data.created_at,
            updated_at: data.updated_at,
        };
        idea.set_projects(data.project_ids);
        idea
    }

    /// Returns the idea identifier.
    #[must_use]
    pub const fn id(&self) -> IdeaId {
        self.id
    }

    /// Returns the title.
    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Returns the description.
    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Returns the long-form write-up.
    #[must_use]
    pub const fn brief(&self) -> &IdeaBrief {
        &self.brief
    }

    /// Returns the priority.
    #[must_use]
    pub const fn priority(&self) -> IdeaPriority {
        self.priority
    }

    /// Returns the status.
    #[must_use]
    pub const fn status(&self) -> IdeaStatus {
        self.status
    }

    /// Returns the tags.
    #[must_use]
    pub const fn tags(&self) -> &Tags {
        &self.tags
    }

    /// Returns the owning user.
    #[must_use]
    pub const fn owner(&self) -> UserId {
        self.owner
    }

    /// Returns `true` when `user` owns the idea.
    #[must_use]
    pub fn is_owned_by(&self, user: UserId) -> bool {
        self.owner == user
    }

    /// Returns the linked projects in ascending identifier order.
    #[must_use]
    pub fn project_ids(&self) -> &[ProjectId] {
        &self.project_ids
    }

    /// Returns the creation timestamp.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Returns the last change timestamp.
    #[must_use]
    pub const fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Applies a partial update, validating every field first.
    ///
    /// `project_ids` is ignored here; links are replaced through
    /// [`Self::link_projects`] once their visibility has been checked.
    ///
    /// # Errors
    ///
    /// Returns [`IdeaDomainError::Field`] for invalid values; the idea is
    /// left unchanged in that case.
    pub fn apply(
        &mut self,
        changes: IdeaChanges,
        clock: &impl Clock,
    ) -> Result<(), IdeaDomainError> {
        let title = changes
            .title
            .map(|value| required_text("title", value, MAX_TITLE_CHARS))
            .transpose()?;
        let description = changes
            .description
            .map(|value| required_text("description", value, MAX_TEXT_CHARS))
            .transpose()?;
        let tags = changes
            .tags
            .map(|raw| Tags::parse("tags", &raw))
            .transpose()?;
        let mut brief = self.brief.clone();
        brief.patch(BriefPatch {
            problem_statement: changes.problem_statement,
            solution_overview: changes.solution_overview,
            target_audience: changes.target_audience,
            market_potential: changes.market_potential,
            revenue_model: changes.revenue_model,
            competition_analysis: changes.competition_analysis,
            technical_requirements: changes.technical_requirements,
            estimated_effort: changes.estimated_effort,
        })?;

        self.brief = brief;
        if let Some(value) = title {
            self.title = value;
        }
        if let Some(value) = description {
            self.description = value;
        }
        if let Some(value) = tags {
            self.tags = value;
        }
        if let Some(value) = changes.priority {
            self.priority = value;
        }
        if let Some(value) = changes.status {
            self.status = value;
        }
        self.touch(clock);
        Ok(())
    }

    /// Replaces the linked projects.
    pub fn link_projects(&mut self, project_ids: Vec<ProjectId>, clock: &impl Clock) {
        self.set_projects(project_ids);
        self.touch(clock);
    }

    /// Removes the link to `project`, returning `true` when one existed.
    pub fn unlink_project(&mut self, project: ProjectId) -> bool {
        let before = self.project_ids.len();
        self.project_ids.retain(|linked| *linked != project);
        before != self.project_ids.len()
    }

    /// Returns `true` when the title, description, problem statement or
    /// tags contain `needle`, ignoring case.
    #[must_use]
    pub fn mentions(&self, needle: &str) -> bool {
        let lowered = needle.trim().to_lowercase();
        [
            self.title.as_str(),
            self.description.as_str(),
            self.brief.problem_statement.as_str(),
            self.tags.to_csv().as_str(),
        ]
        .iter()
        .any(|haystack| haystack.to_lowercase().contains(&lowered))
    }

    /// Updates the `updated_at` timestamp to the current clock time.
    pub fn touch(&mut self, clock: &impl Clock) {
        self.updated_at = clock.utc();
    }

    fn set_projects(&mut self, mut project_ids: Vec<ProjectId>) {
        project_ids.sort_unstable();
        project_ids.dedup();
        self.project_ids = project_ids;
    }
}

/// Child record counts shown in idea listings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct IdeaCounts {
    /// Notes on the idea.
    pub notes: usize,
    /// Resources on the idea.
    pub resources: usize,
    /// Linked projects.
    pub projects: usize,
    /// Collaborators, not counting the owner.
    pub members: usize,
}

/// Optional narrowing of an idea listing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IdeaFilter {
    /// Only ideas in this status.
    pub status: Option<IdeaStatus>,
    /// Only ideas with this priority.
    pub priority: Option<IdeaPriority>,
    /// Case-insensitive text search.
    pub search: Option<String>,
    /// Only ideas linked to this project.
    pub project: Option<ProjectId>,
}

impl IdeaFilter {
    /// Returns the trimmed search text, if any.
    #[must_use]
    pub fn search_term(&self) -> Option<&str> {
        self.search
            .as_deref()
            .map(str::trim)
            .filter(|term| !term.is_empty())
    }

    /// Returns `true` when `idea` passes every criterion.
    #[must_use]
    pub fn matches(&self, idea: &Idea) -> bool {
        self.status.is_none_or(|status| idea.status() == status)
            && self.priority.is_none_or(|priority| idea.priority() == priority)
            && self
                .project
                .is_none_or(|project| idea.project_ids().contains(&project))
            && self.search_term().is_none_or(|term| idea.mentions(term))
    }
}
