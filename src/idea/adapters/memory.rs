//! In-memory idea repository.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use crate::account::domain::UserId;
use crate::idea::{
    domain::{
        Idea, IdeaCounts, IdeaFilter, IdeaId, IdeaMembership, IdeaMembershipId, IdeaNote,
        IdeaNoteId, IdeaResource, IdeaResourceId,
    },
    ports::{IdeaRepository, IdeaRepositoryError, IdeaRepositoryResult},
};
use crate::project::domain::ProjectId;

/// Thread-safe in-memory idea store.
#[derive(Debug, Clone, Default)]
pub struct InMemoryIdeaRepository {
    state: Arc<RwLock<InMemoryIdeaState>>,
}

#[derive(Debug, Default)]
struct InMemoryIdeaState {
    ideas: HashMap<IdeaId, Idea>,
    memberships: HashMap<IdeaMembershipId, IdeaMembership>,
    notes: HashMap<IdeaNoteId, IdeaNote>,
    resources: HashMap<IdeaResourceId, IdeaResource>,
}

impl InMemoryIdeaRepository {
    /// Creates an empty repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl InMemoryIdeaState {
    fn is_member(&self, idea: IdeaId, user: UserId) -> bool {
        self.memberships
            .values()
            .any(|membership| membership.idea_id == idea && membership.user_id == user)
    }
}

fn poisoned<T>(err: PoisonError<T>) -> IdeaRepositoryError {
    IdeaRepositoryError::persistence(std::io::Error::other(err.to_string()))
}

fn newest_first<T, K: Ord>(mut items: Vec<T>, key: impl Fn(&T) -> K) -> Vec<T> {
    items.sort_by(|left, right| key(right).cmp(&key(left)));
    items
}

#[async_trait]
impl IdeaRepository for InMemoryIdeaRepository {
    async fn store(&self, idea: &Idea) -> IdeaRepositoryResult<()> {
        let mut state = self.state.write().map_err(poisoned)?;
        state.ideas.insert(idea.id(), idea.clone());
        Ok(())
    }

    async fn update(&self, idea: &Idea) -> IdeaRepositoryResult<()> {
        let mut state = self.state.write().map_err(poisoned)?;
        let slot = state
            .ideas
            .get_mut(&idea.id())
            .ok_or(IdeaRepositoryError::NotFound(idea.id()))?;
        *slot = idea.clone();
        Ok(())
    }

    async fn find_by_id(&self, id: IdeaId) -> IdeaRepositoryResult<Option<Idea>> {
        let state = self.state.read().map_err(poisoned)?;
        Ok(state.ideas.get(&id).cloned())
    }

    async fn list_for_user(
        &self,
        user: UserId,
        filter: &IdeaFilter,
    ) -> IdeaRepositoryResult<Vec<Idea>> {
        let state = self.state.read().map_err(poisoned)?;
        let visible: Vec<Idea> = state
            .ideas
            .values()
            .filter(|idea| idea.is_owned_by(user) || state.is_member(idea.id(), user))
            .filter(|idea| filter.matches(idea))
            .cloned()
            .collect();
        Ok(newest_first(visible, Idea::updated_at))
    }

    async fn delete_idea(&self, id: IdeaId) -> IdeaRepositoryResult<()> {
        let mut state = self.state.write().map_err(poisoned)?;
        if state.ideas.remove(&id).is_none() {
            return Err(IdeaRepositoryError::NotFound(id));
        }
        state.memberships.retain(|_, membership| membership.idea_id != id);
        state.notes.retain(|_, note| note.idea_id != id);
        state.resources.retain(|_, resource| resource.idea_id != id);
        Ok(())
    }

    async fn detach_project(&self, project: ProjectId) -> IdeaRepositoryResult<()> {
        let mut state = self.state.write().map_err(poisoned)?;
        for idea in state.ideas.values_mut() {
            idea.unlink_project(project);
        }
        Ok(())
    }

    async fn counts(&self, id: IdeaId) -> IdeaRepositoryResult<IdeaCounts> {
        let state = self.state.read().map_err(poisoned)?;
        let idea = state.ideas.get(&id).ok_or(IdeaRepositoryError::NotFound(id))?;
        Ok(IdeaCounts {
            notes: state.notes.values().filter(|note| note.idea_id == id).count(),
            resources: state
                .resources
                .values()
                .filter(|resource| resource.idea_id == id)
                .count(),
            projects: idea.project_ids().len(),
            members: state
                .memberships
                .values()
                .filter(|membership| membership.idea_id == id)
                .count(),
        })
    }

    async fn save_membership(&self, membership: &IdeaMembership) -> IdeaRepositoryResult<()> {
        let mut state = self.state.write().map_err(poisoned)?;
        let clash = state.memberships.values().any(|other| {
            other.id != membership.id
                && other.idea_id == membership.idea_id
                && other.user_id == membership.user_id
        });
        if clash {
            return Err(IdeaRepositoryError::DuplicateMember {
                idea: membership.idea_id,
                user: membership.user_id,
            });
        }
        state.memberships.insert(membership.id, membership.clone());
        Ok(())
    }

    async fn find_membership(
        &self,
        idea: IdeaId,
        user: UserId,
    ) -> IdeaRepositoryResult<Option<IdeaMembership>> {
        let state = self.state.read().map_err(poisoned)?;
        Ok(state
            .memberships
            .values()
            .find(|membership| membership.idea_id == idea && membership.user_id == user)
            .cloned())
    }

    async fn list_memberships(&self, idea: IdeaId) -> IdeaRepositoryResult<Vec<IdeaMembership>> {
        let state = self.state.read().map_err(poisoned)?;
        let members = state
            .memberships
            .values()
            .filter(|membership| membership.idea_id == idea)
            .cloned()
            .collect();
        Ok(newest_first(members, |membership: &IdeaMembership| {
            membership.created_at
        }))
    }

    async fn delete_membership(&self, id: IdeaMembershipId) -> IdeaRepositoryResult<()> {
        let mut state = self.state.write().map_err(poisoned)?;
        state.memberships.remove(&id);
        Ok(())
    }

    async fn save_note(&self, note: &IdeaNote) -> IdeaRepositoryResult<()> {
        let mut state = self.state.write().map_err(poisoned)?;
        state.notes.insert(note.id, note.clone());
        Ok(())
    }

    async fn find_note(&self, id: IdeaNoteId) -> IdeaRepositoryResult<Option<IdeaNote>> {
        let state = self.state.read().map_err(poisoned)?;
        Ok(state.notes.get(&id).cloned())
    }

    async fn list_notes(&self, idea: IdeaId) -> IdeaRepositoryResult<Vec<IdeaNote>> {
        let state = self.state.read().map_err(poisoned)?;
        let notes = state
            .notes
            .values()
            .filter(|note| note.idea_id == idea)
            .cloned()
            .collect();
        Ok(newest_first(notes, |note: &IdeaNote| note.created_at))
    }

    async fn delete_note(&self, id: IdeaNoteId) -> IdeaRepositoryResult<()> {
        let mut state = self.state.write().map_err(poisoned)?;
        state.notes.remove(&id);
        Ok(())
    }

    async fn save_resource(&self, resource: &IdeaResource) -> IdeaRepositoryResult<()> {
        let mut state = self.state.write().map_err(poisoned)?;
        state.resources.insert(resource.id, resource.clone());
        Ok(())
    }

    async fn find_resource(
        &self,
        id: IdeaResourceId,
    ) -> IdeaRepositoryResult<Option<IdeaResource>> {
        let state = self.state.read().map_err(poisoned)?;
        Ok(state.resources.get(&id).cloned())
    }

    async fn list_resources(&self, idea: IdeaId) -> IdeaRepositoryResult<Vec<IdeaResource>> {
        let state = self.state.read().map_err(poisoned)?;
        let resources = state
            .resources
            .values()
            .filter(|resource| resource.idea_id == idea)
            .cloned()
            .collect();
        Ok(newest_first(resources, |resource: &IdeaResource| {
            resource.created_at
        }))
    }

    async fn delete_resource(&self, id: IdeaResourceId) -> IdeaRepositoryResult<()> {
        let mut state = self.state.write().map_err(poisoned)?;
        state.resources.remove(&id);
        Ok(())
    }
}
