//! Domain model for ideas.

mod content;
mod error;
mod idea;
mod ids;
mod membership;

pub use content::{IdeaNote, IdeaResource, ResourceChanges, ResourceType};
pub use error::IdeaDomainError;
pub use idea::{
    Idea, IdeaBrief, IdeaChanges, IdeaCounts, IdeaFilter, IdeaPriority, IdeaStatus, NewIdea,
    PersistedIdeaData,
};
pub use ids::{IdeaId, IdeaMembershipId, IdeaNoteId, IdeaResourceId};
pub use membership::IdeaMembership;
