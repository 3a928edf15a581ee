//! Registration, sign-in, lookup and profile maintenance.

use crate::account::{
    domain::{
        AccountDomainError, EmailAddress, NewUser, ProfileChanges, User, UserId, UserSummary,
        check_new_password,
    },
    ports::{CredentialError, PasswordHasher, UserRepository, UserRepositoryError},
};
use mockable::Clock;
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;

/// Queries shorter than this return no search results.
const MIN_SEARCH_CHARS: usize = 2;
/// Maximum number of search results.
const SEARCH_LIMIT: usize = 10;

/// Request payload for registering a user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegisterRequest {
    email: String,
    first_name: String,
    last_name: String,
    password: String,
    confirm_password: String,
}

impl RegisterRequest {
    /// Creates a registration request whose confirmation equals `password`.
    #[must_use]
    pub fn new(
        email: impl Into<String>,
        first_name: impl Into<String>,
        last_name: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        let secret = password.into();
        Self {
            email: email.into(),
            first_name: first_name.into(),
            last_name: last_name.into(),
            confirm_password: secret.clone(),
            password: secret,
        }
    }

    /// Sets a distinct password confirmation.
    #[must_use]
    pub fn with_confirmation(mut self, confirm_password: impl Into<String>) -> Self {
        self.confirm_password = confirm_password.into();
        self
    }
}

/// Service-level errors for account operations.
#[derive(Debug, Error)]
pub enum AccountServiceError {
    /// Domain validation failed.
    #[error(transparent)]
    Domain(#[from] AccountDomainError),
    /// Repository operation failed.
    #[error(transparent)]
    Repository(#[from] UserRepositoryError),
    /// Password hashing failed.
    #[error(transparent)]
    Credential(#[from] CredentialError),
    /// The email address is already registered.
    #[error("a user with email {0} already exists")]
    EmailTaken(EmailAddress),
    /// Unknown email or wrong password.
    #[error("invalid email or password")]
    InvalidCredentials,
    /// The account exists but may not sign in.
    #[error("user account is disabled")]
    AccountDisabled,
    /// No user has the given identifier.
    #[error("user not found: {0}")]
    UnknownUser(UserId),
}

/// Result type for account service operations.
pub type AccountServiceResult<T> = Result<T, AccountServiceError>;

/// Account orchestration service.
pub struct AccountService<R, H, C>
where
    R: UserRepository + ?Sized,
    H: PasswordHasher + ?Sized,
    C: Clock + Send + Sync,
{
    repository: Arc<R>,
    hasher: Arc<H>,
    clock: Arc<C>,
}

impl<R, H, C> Clone for AccountService<R, H, C>
where
    R: UserRepository + ?Sized,
    H: PasswordHasher + ?Sized,
    C: Clock + Send + Sync,
{
    fn clone(&self) -> Self {
        Self {
            repository: Arc::clone(&self.repository),
            hasher: Arc::clone(&self.hasher),
            clock: Arc::clone(&self.clock),
        }
    }
}

impl<R, H, C> AccountService<R, H, C>
where
    R: UserRepository + ?Sized,
    H: PasswordHasher + ?Sized + 'static,
    C: Clock + Send + Sync,
{
    /// Creates a new account service.
    #[must_use]
    pub const fn new(repository: Arc<R>, hasher: Arc<H>, clock: Arc<C>) -> Self {
        Self {
            repository,
            hasher,
            clock,
        }
    }

    /// Registers a new user.
    ///
    /// # Errors
    ///
    /// Returns [`AccountServiceError::Domain`] for invalid input,
    /// [`AccountServiceError::EmailTaken`] for a registered email, and
    /// repository or hashing failures otherwise.
    pub async fn register(&self, request: RegisterRequest) -> AccountServiceResult<User> {
        let email = EmailAddress::new(request.email)?;
        check_new_password(&request.password, &request.confirm_password)?;
        if self.repository.find_by_email(&email).await?.is_some() {
            return Err(AccountServiceError::EmailTaken(email));
        }

        let password_hash = self.hash_password(request.password).await?;
        let user = User::register(
            NewUser {
                email,
                first_name: request.first_name,
                last_name: request.last_name,
                password_hash,
            },
            &*self.clock,
        )?;
        self.repository.store(&user).await.map_err(|err| match err {
            UserRepositoryError::DuplicateEmail(taken) => AccountServiceError::EmailTaken(taken),
            other => AccountServiceError::Repository(other),
        })?;
        tracing::info!(user_id = %user.id(), "registered user");
        Ok(user)
    }

    /// Verifies credentials and records the sign-in.
    ///
    /// # Errors
    ///
    /// Returns [`AccountServiceError::InvalidCredentials`] for unknown
    /// emails and wrong passwords, and
    /// [`AccountServiceError::AccountDisabled`] for inactive accounts.
    pub async fn authenticate(&self, email: &str, password: &str) -> AccountServiceResult<User> {
        let Ok(address) = EmailAddress::new(email) else {
            return Err(AccountServiceError::InvalidCredentials);
        };
        let Some(mut user) = self.repository.find_by_email(&address).await? else {
            return Err(AccountServiceError::InvalidCredentials);
        };

        let hasher = Arc::clone(&self.hasher);
        let candidate = password.to_owned();
        let stored = user.password_hash().to_owned();
        let matches = tokio::task::spawn_blocking(move || hasher.verify(&candidate, &stored))
            .await
            .map_err(|err| CredentialError(err.to_string()))??;
        if !matches {
            tracing::debug!(user_id = %user.id(), "rejected sign-in with wrong password");
            return Err(AccountServiceError::InvalidCredentials);
        }
        if !user.is_active() {
            return Err(AccountServiceError::AccountDisabled);
        }

        user.record_login(&*self.clock);
        self.repository.update(&user).await?;
        Ok(user)
    }

    /// Returns the user with `id`.
    ///
    /// # Errors
    ///
    /// Returns [`AccountServiceError::UnknownUser`] when no such user exists.
    pub async fn get(&self, id: UserId) -> AccountServiceResult<User> {
        self.repository
            .find_by_id(id)
            .await?
            .ok_or(AccountServiceError::UnknownUser(id))
    }

    /// Returns the user with `id` when it exists and may sign in.
    ///
    /// # Errors
    ///
    /// Returns [`AccountServiceError::Repository`] when lookup fails.
    pub async fn find_active(&self, id: UserId) -> AccountServiceResult<Option<User>> {
        let user = self.repository.find_by_id(id).await?;
        Ok(user.filter(User::is_active))
    }

    /// Finds a user by email, treating malformed addresses as unknown.
    ///
    /// # Errors
    ///
    /// Returns [`AccountServiceError::Repository`] when lookup fails.
    pub async fn find_by_email(&self, email: &str) -> AccountServiceResult<Option<User>> {
        let Ok(address) = EmailAddress::new(email) else {
            return Ok(None);
        };
        Ok(self.repository.find_by_email(&address).await?)
    }

    /// Resolves public summaries for a set of users.
    ///
    /// # Errors
    ///
    /// Returns [`AccountServiceError::Repository`] when lookup fails.
    pub async fn summaries(
        &self,
        ids: &[UserId],
    ) -> AccountServiceResult<HashMap<UserId, UserSummary>> {
        let mut unique = ids.to_vec();
        unique.sort_unstable();
        unique.dedup();
        let users = self.repository.find_many(&unique).await?;
        Ok(users
            .into_iter()
            .map(|user| (user.id(), user.summary()))
            .collect())
    }

    /// Searches other users by name or email.
    ///
    /// Queries shorter than two characters yield no results.
    ///
    /// # Errors
    ///
    /// Returns [`AccountServiceError::Repository`] when lookup fails.
    pub async fn search(
        &self,
        caller: UserId,
        query: &str,
    ) -> AccountServiceResult<Vec<UserSummary>> {
        let trimmed = query.trim();
        if trimmed.chars().count() < MIN_SEARCH_CHARS {
            return Ok(Vec::new());
        }
        let users = self.repository.search(trimmed, caller, SEARCH_LIMIT).await?;
        Ok(users.iter().map(User::summary).collect())
    }

    /// Applies a partial profile update.
    ///
    /// # Errors
    ///
    /// Returns [`AccountServiceError::UnknownUser`] for unknown users and
    /// [`AccountServiceError::Domain`] for invalid values.
    pub async fn update_profile(
        &self,
        id: UserId,
        changes: ProfileChanges,
    ) -> AccountServiceResult<User> {
        let mut user = self.get(id).await?;
        user.apply_profile(changes, &*self.clock)?;
        self.repository.update(&user).await?;
        Ok(user)
    }

    async fn hash_password(&self, password: String) -> AccountServiceResult<String> {
        let hasher = Arc::clone(&self.hasher);
        let hash = tokio::task::spawn_blocking(move || hasher.hash(&password))
            .await
            .map_err(|err| CredentialError(err.to_string()))??;
        Ok(hash)
    }
}
