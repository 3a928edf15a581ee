//! Domain model for user accounts.

mod error;
mod ids;
mod user;

pub use error::AccountDomainError;
pub use ids::UserId;
pub use user::{
    EmailAddress, MIN_PASSWORD_CHARS, NewUser, PersistedUserData, ProfileChanges, User,
    UserProfile, UserSummary, check_new_password,
};
