//! Port contracts for idea persistence.

mod repository;

pub use repository::{IdeaRepository, IdeaRepositoryError, IdeaRepositoryResult};
