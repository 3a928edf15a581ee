//! Idea orchestration services.

mod access;
mod ideas;

pub use access::{IdeaGrant, idea_role, resolve_idea_grant};
pub use ideas::{
    IdeaDetail, IdeaOverview, IdeaService, IdeaServiceError, IdeaServiceResult, IdeaStats,
    RecentIdea,
};
