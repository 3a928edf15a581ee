//! In-memory user repository for tests and single-process deployments.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use crate::account::{
    domain::{EmailAddress, User, UserId},
    ports::{UserRepository, UserRepositoryError, UserRepositoryResult},
};

/// Thread-safe in-memory user repository.
#[derive(Debug, Clone, Default)]
pub struct InMemoryUserRepository {
    state: Arc<RwLock<InMemoryUserState>>,
}

#[derive(Debug, Default)]
struct InMemoryUserState {
    users: HashMap<UserId, User>,
    email_index: HashMap<EmailAddress, UserId>,
}

impl InMemoryUserRepository {
    /// Creates an empty repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

fn poisoned<T>(err: PoisonError<T>) -> UserRepositoryError {
    UserRepositoryError::persistence(std::io::Error::other(err.to_string()))
}

fn matches_query(user: &User, needle: &str) -> bool {
    [
        user.first_name(),
        user.last_name(),
        user.email().as_str(),
    ]
    .iter()
    .any(|field| field.to_lowercase().contains(needle))
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn store(&self, user: &User) -> UserRepositoryResult<()> {
        let mut state = self.state.write().map_err(poisoned)?;
        if state.email_index.contains_key(user.email()) {
            return Err(UserRepositoryError::DuplicateEmail(user.email().clone()));
        }
        state.email_index.insert(user.email().clone(), user.id());
        state.users.insert(user.id(), user.clone());
        Ok(())
    }

    async fn update(&self, user: &User) -> UserRepositoryResult<()> {
        let mut state = self.state.write().map_err(poisoned)?;
        let previous_email = state
            .users
            .get(&user.id())
            .map(|existing| existing.email().clone())
            .ok_or(UserRepositoryError::NotFound(user.id()))?;
        if &previous_email != user.email() {
            if state.email_index.contains_key(user.email()) {
                return Err(UserRepositoryError::DuplicateEmail(user.email().clone()));
            }
            state.email_index.remove(&previous_email);
            state.email_index.insert(user.email().clone(), user.id());
        }
        state.users.insert(user.id(), user.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: UserId) -> UserRepositoryResult<Option<User>> {
        let state = self.state.read().map_err(poisoned)?;
        Ok(state.users.get(&id).cloned())
    }

    async fn find_by_email(&self, email: &EmailAddress) -> UserRepositoryResult<Option<User>> {
        let state = self.state.read().map_err(poisoned)?;
        Ok(state
            .email_index
            .get(email)
            .and_then(|id| state.users.get(id))
            .cloned())
    }

    async fn find_many(&self, ids: &[UserId]) -> UserRepositoryResult<Vec<User>> {
        let state = self.state.read().map_err(poisoned)?;
        Ok(ids
            .iter()
            .filter_map(|id| state.users.get(id).cloned())
            .collect())
    }

    async fn search(
        &self,
        query: &str,
        exclude: UserId,
        limit: usize,
    ) -> UserRepositoryResult<Vec<User>> {
        let needle = query.trim().to_lowercase();
        let state = self.state.read().map_err(poisoned)?;
        let mut found: Vec<User> = state
            .users
            .values()
            .filter(|user| user.id() != exclude && matches_query(user, &needle))
            .cloned()
            .collect();
        found.sort_by(|left, right| left.email().as_str().cmp(right.email().as_str()));
        found.truncate(limit);
        Ok(found)
    }
}
