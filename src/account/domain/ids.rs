//! Identifier types for the account domain.

crate::shared::uuid_id! {
    /// Unique identifier for a registered user.
    UserId
}
