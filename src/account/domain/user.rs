//! User aggregate and profile values.

use super::{AccountDomainError, UserId};
use crate::shared::{optional_text, required_text};
use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Minimum accepted password length in characters.
pub const MIN_PASSWORD_CHARS: usize = 8;

const MAX_NAME_CHARS: usize = 30;
const MAX_EMAIL_CHARS: usize = 254;

/// Normalised, lower-case email address.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EmailAddress(String);

impl EmailAddress {
    /// Parses and normalises an email address.
    ///
    /// # Errors
    ///
    /// Returns [`AccountDomainError::InvalidEmail`] unless the value has a
    /// non-empty local part, a dotted domain and no whitespace.
    pub fn new(value: impl Into<String>) -> Result<Self, AccountDomainError> {
        let raw = value.into();
        let normalized = raw.trim().to_lowercase();
        let is_valid = normalized.chars().count() <= MAX_EMAIL_CHARS
            && !normalized.chars().any(char::is_whitespace)
            && normalized.split_once('@').is_some_and(|(local, domain)| {
                !local.is_empty()
                    && !domain.contains('@')
                    && domain.contains('.')
                    && !domain.starts_with('.')
                    && !domain.ends_with('.')
            });
        if !is_valid {
            return Err(AccountDomainError::InvalidEmail(raw));
        }
        Ok(Self(normalized))
    }

    /// Returns the address as `str`.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EmailAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Optional profile details shown on the account page.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    /// Free-form biography.
    pub bio: String,
    /// Contact phone number.
    pub phone: String,
    /// Employer or organisation.
    pub company: String,
    /// Job title within the company.
    pub job_title: String,
    /// City or region.
    pub location: String,
}

/// Partial update of names and profile fields.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ProfileChanges {
    /// New given name.
    pub first_name: Option<String>,
    /// New family name.
    pub last_name: Option<String>,
    /// New biography.
    pub bio: Option<String>,
    /// New phone number.
    pub phone: Option<String>,
    /// New company.
    pub company: Option<String>,
    /// New job title.
    pub job_title: Option<String>,
    /// New location.
    pub location: Option<String>,
}

/// Public identity of a user as embedded in other resources.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserSummary {
    /// User identifier.
    pub id: UserId,
    /// Email address.
    pub email: String,
    /// Given name.
    pub first_name: String,
    /// Family name.
    pub last_name: String,
}

/// Validated input for registering a user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUser {
    /// Normalised email address.
    pub email: EmailAddress,
    /// Given name.
    pub first_name: String,
    /// Family name.
    pub last_name: String,
    /// Password hash in PHC string format.
    pub password_hash: String,
}

/// Registered user aggregate.
#[derive(Clone, PartialEq, Eq)]
pub struct User {
    id: UserId,
    email: EmailAddress,
    first_name: String,
    last_name: String,
    password_hash: String,
    is_active: bool,
    profile: UserProfile,
    last_login: Option<DateTime<Utc>>,
    date_joined: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

/// Parameter object for reconstructing a persisted user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistedUserData {
    /// Persisted identifier.
    pub id: UserId,
    /// Persisted email address.
    pub email: EmailAddress,
    /// Persisted given name.
    pub first_name: String,
    /// Persisted family name.
    pub last_name: String,
    /// Persisted password hash.
    pub password_hash: String,
    /// Whether the account may sign in.
    pub is_active: bool,
    /// Persisted profile details.
    pub profile: UserProfile,
    /// Last successful sign-in.
    pub last_login: Option<DateTime<Utc>>,
    /// Registration timestamp.
    pub date_joined: DateTime<Utc>,
    /// Last change timestamp.
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Registers a new active user.
    ///
    /// # Errors
    ///
    /// Returns [`AccountDomainError::Field`] when either name is blank or
    /// longer than 30 characters.
    pub fn register(input: NewUser, clock: &impl Clock) -> Result<Self, AccountDomainError> {
        let timestamp = clock.utc();
        Ok(Self {
            id: UserId::new(),
            email: input.email,
            first_name: required_text("first_name", input.first_name, MAX_NAME_CHARS)?,
            last_name: required_text("last_name", input.last_name, MAX_NAME_CHARS)?,
            password_hash: input.password_hash,
            is_active: true,
            profile: UserProfile::default(),
            last_login: None,
            date_joined: timestamp,
            updated_at: timestamp,
        })
    }

    /// Reconstructs a user from persisted storage.
    #[must_use]
    pub fn from_persisted(data: PersistedUserData) -> Self {
        Self {
            id: data.id,
            email: data.email,
            first_name: data.first_name,
            last_name: data.last_name,
            password_hash: data.password_hash,
            is_active: data.is_active,
            profile: data.profile,
            last_login: data.last_login,
            date_joined: data.date_joined,
            updated_at: data.updated_at,
        }
    }

    /// Returns the user identifier.
    #[must_use]
    pub const fn id(&self) -> UserId {
        self.id
    }

    /// Returns the email address.
    #[must_use]
    pub const fn email(&self) -> &EmailAddress {
        &self.email
    }

    /// Returns the given name.
    #[must_use]
    pub fn first_name(&self) -> &str {
        &self.first_name
    }

    /// Returns the family name.
    #[must_use]
    pub fn last_name(&self) -> &str {
        &self.last_name
    }

    /// Returns `first last`, or the email when both names are blank.
    #[must_use]
    pub fn display_name(&self) -> String {
        let full = format!("{} {}", self.first_name, self.last_name);
        let trimmed = full.trim();
        if trimmed.is_empty() {
            self.email.as_str().to_owned()
        } else {
            trimmed.to_owned()
        }
    }

    /// Returns the stored password hash.
    #[must_use]
    pub fn password_hash(&self) -> &str {
        &self.password_hash
    }

    /// Returns `true` when the account may sign in.
    #[must_use]
    pub const fn is_active(&self) -> bool {
        self.is_active
    }

    /// Returns the profile details.
    #[must_use]
    pub const fn profile(&self) -> &UserProfile {
        &self.profile
    }

    /// Returns the last successful sign-in, if any.
    #[must_use]
    pub const fn last_login(&self) -> Option<DateTime<Utc>> {
        self.last_login
    }

    /// Returns the registration timestamp.
    #[must_use]
    pub const fn date_joined(&self) -> DateTime<Utc> {
        self.date_joined
    }

    /// Returns the last change timestamp.
    #[must_use]
    pub const fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Returns the public identity of this user.
    #[must_use]
    pub fn summary(&self) -> UserSummary {
        UserSummary {
            id: self.id,
            email: self.email.as_str().to_owned(),
            first_name: self.first_name.clone(),
            last_name: self.last_name.clone(),
        }
    }

    /// Applies a partial profile update.
    ///
    /// Every supplied value is validated before any is applied.
    ///
    /// # Errors
    ///
    /// Returns [`AccountDomainError::Field`] when a value is blank (names
    /// only) or too long.
    pub fn apply_profile(
        &mut self,
        changes: ProfileChanges,
        clock: &impl Clock,
    ) -> Result<(), AccountDomainError> {
        let mut next = self.clone();
        if let Some(first_name) = changes.first_name {
            next.first_name = required_text("first_name", first_name, MAX_NAME_CHARS)?;
        }
        if let Some(last_name) = changes.last_name {
            next.last_name = required_text("last_name", last_name, MAX_NAME_CHARS)?;
        }
        if let Some(bio) = changes.bio {
            next.profile.bio = optional_text("bio", bio, 2000)?;
        }
        if let Some(phone) = changes.phone {
            next.profile.phone = optional_text("phone", phone, 20)?;
        }
        if let Some(company) = changes.company {
            next.profile.company = optional_text("company", company, 100)?;
        }
        if let Some(job_title) = changes.job_title {
            next.profile.job_title = optional_text("job_title", job_title, 100)?;
        }
        if let Some(location) = changes.location {
            next.profile.location = optional_text("location", location, 100)?;
        }
        next.updated_at = clock.utc();
        *self = next;
        Ok(())
    }

    /// Records a successful sign-in.
    pub fn record_login(&mut self, clock: &impl Clock) {
        let now = clock.utc();
        self.last_login = Some(now);
        self.updated_at = now;
    }

    /// Enables or disables sign-in for this account.
    pub fn set_active(&mut self, is_active: bool, clock: &impl Clock) {
        self.is_active = is_active;
        self.updated_at = clock.utc();
    }
}

impl fmt::Debug for User {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("User")
            .field("id", &self.id)
            .field("email", &self.email)
            .field("first_name", &self.first_name)
            .field("last_name", &self.last_name)
            .field("is_active", &self.is_active)
            .finish_non_exhaustive()
    }
}

/// Checks a new password against the length policy and its confirmation.
///
/// # Errors
///
/// Returns [`AccountDomainError::PasswordTooShort`] or
/// [`AccountDomainError::PasswordMismatch`].
pub fn check_new_password(password: &str, confirmation: &str) -> Result<(), AccountDomainError> {
    if password.chars().count() < MIN_PASSWORD_CHARS {
        return Err(AccountDomainError::PasswordTooShort(MIN_PASSWORD_CHARS));
    }
    if password != confirmation {
        return Err(AccountDomainError::PasswordMismatch);
    }
    Ok(())
}
