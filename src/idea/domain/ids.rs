//! Identifier types for the idea domain.

use crate::shared::uuid_id;

uuid_id! {
    /// Unique identifier for an idea.
    IdeaId
}

uuid_id! {
    /// Unique identifier for an idea membership row.
    IdeaMembershipId
}

uuid_id! {
    /// Unique identifier for an idea note.
    IdeaNoteId
}

uuid_id! {
    /// Unique identifier for an idea resource.
    IdeaResourceId
}
