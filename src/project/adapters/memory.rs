//! In-memory project and topic repository for tests and single-process
//! deployments.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use crate::account::domain::UserId;
use crate::project::{
    domain::{
        MembershipId, Project, ProjectActivity, ProjectFile, ProjectFileId, ProjectId,
        ProjectLink, ProjectLinkId, ProjectMembership, Topic, TopicComment, TopicCommentId,
        TopicCounts, TopicId, TopicLink, TopicLinkId, TopicMedia, TopicMediaId, TopicNote,
        TopicNoteId, TopicTag, TopicTagId,
    },
    ports::{
        ProjectRepository, ProjectRepositoryError, ProjectRepositoryResult, TopicRepository,
        TopicRepositoryError, TopicRepositoryResult,
    },
};

/// Thread-safe in-memory store implementing both project ports.
#[derive(Debug, Clone, Default)]
pub struct InMemoryProjectRepository {
    state: Arc<RwLock<InMemoryProjectState>>,
}

#[derive(Debug, Default)]
struct InMemoryProjectState {
    projects: HashMap<ProjectId, Project>,
    memberships: HashMap<MembershipId, ProjectMembership>,
    files: HashMap<ProjectFileId, ProjectFile>,
    links: HashMap<ProjectLinkId, ProjectLink>,
    activities: Vec<ProjectActivity>,
    topics: HashMap<TopicId, Topic>,
    notes: HashMap<TopicNoteId, TopicNote>,
    topic_links: HashMap<TopicLinkId, TopicLink>,
    media: HashMap<TopicMediaId, TopicMedia>,
    tags: HashMap<TopicTagId, TopicTag>,
    comments: HashMap<TopicCommentId, TopicComment>,
}

impl InMemoryProjectRepository {
    /// Creates an empty repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl InMemoryProjectState {
    fn remove_topic(&mut self, id: TopicId) -> Vec<String> {
        self.topics.remove(&id);
        self.notes.retain(|_, note| note.topic_id != id);
        self.topic_links.retain(|_, link| link.topic_id != id);
        self.tags.retain(|_, tag| tag.topic_id != id);
        self.comments.retain(|_, comment| comment.topic_id != id);
        let mut keys = Vec::new();
        self.media.retain(|_, media| {
            if media.topic_id == id {
                keys.push(media.file.storage_key.clone());
                false
            } else {
                true
            }
        });
        keys
    }

    fn title_taken(&self, topic: &Topic) -> bool {
        self.topics.values().any(|other| {
            other.id() != topic.id()
                && other.project_id() == topic.project_id()
                && other.title() == topic.title()
        })
    }
}

fn poisoned<T>(err: PoisonError<T>) -> ProjectRepositoryError {
    ProjectRepositoryError::persistence(std::io::Error::other(err.to_string()))
}

fn topic_poisoned<T>(err: PoisonError<T>) -> TopicRepositoryError {
    TopicRepositoryError::persistence(std::io::Error::other(err.to_string()))
}

fn newest_first<T, K: Ord>(mut items: Vec<T>, key: impl Fn(&T) -> K) -> Vec<T> {
    items.sort_by(|left, right| key(right).cmp(&key(left)));
    items
}

#[async_trait]
impl ProjectRepository for InMemoryProjectRepository {
    async fn store(&self, project: &Project) -> ProjectRepositoryResult<()> {
        let mut state = self.state.write().map_err(poisoned)?;
        state.projects.insert(project.id(), project.clone());
        Ok(())
    }

    async fn update(&self, project: &Project) -> ProjectRepositoryResult<()> {
        let mut state = self.state.write().map_err(poisoned)?;
        let slot = state
            .projects
            .get_mut(&project.id())
            .ok_or(ProjectRepositoryError::NotFound(project.id()))?;
        *slot = project.clone();
        Ok(())
    }

    async fn find_by_id(&self, id: ProjectId) -> ProjectRepositoryResult<Option<Project>> {
        let state = self.state.read().map_err(poisoned)?;
        Ok(state.projects.get(&id).cloned())
    }

    async fn list_for_user(&self, user: UserId) -> ProjectRepositoryResult<Vec<Project>> {
        let state = self.state.read().map_err(poisoned)?;
        let visible: Vec<Project> = state
            .projects
            .values()
            .filter(|project| {
                project.is_owned_by(user)
                    || state.memberships.values().any(|membership| {
                        membership.project_id == project.id() && membership.user_id == user
                    })
            })
            .cloned()
            .collect();
        Ok(newest_first(visible, Project::updated_at))
    }

    async fn delete_project(&self, id: ProjectId) -> ProjectRepositoryResult<Vec<String>> {
        let mut state = self.state.write().map_err(poisoned)?;
        if state.projects.remove(&id).is_none() {
            return Err(ProjectRepositoryError::NotFound(id));
        }
        state.memberships.retain(|_, membership| membership.project_id != id);
        state.links.retain(|_, link| link.project_id != id);
        state.activities.retain(|activity| activity.project_id != id);
        let mut keys = Vec::new();
        state.files.retain(|_, file| {
            if file.project_id == id {
                keys.push(file.file.storage_key.clone());
                false
            } else {
                true
            }
        });
        let topic_ids: Vec<TopicId> = state
            .topics
            .values()
            .filter(|topic| topic.project_id() == id)
            .map(Topic::id)
            .collect();
        for topic in topic_ids {
            keys.extend(state.remove_topic(topic));
        }
        Ok(keys)
    }

    async fn save_membership(
        &self,
        membership: &ProjectMembership,
    ) -> ProjectRepositoryResult<()> {
        let mut state = self.state.write().map_err(poisoned)?;
        let clash = state.memberships.values().any(|other| {
            other.id != membership.id
                && other.project_id == membership.project_id
                && other.user_id == membership.user_id
        });
        if clash {
            return Err(ProjectRepositoryError::DuplicateMember {
                project: membership.project_id,
                user: membership.user_id,
            });
        }
        state.memberships.insert(membership.id, membership.clone());
        Ok(())
    }

    async fn find_membership(
        &self,
        project: ProjectId,
        user: UserId,
    ) -> ProjectRepositoryResult<Option<ProjectMembership>> {
        let state = self.state.read().map_err(poisoned)?;
        Ok(state
            .memberships
            .values()
            .find(|membership| membership.project_id == project && membership.user_id == user)
            .cloned())
    }

    async fn find_membership_by_id(
        &self,
        id: MembershipId,
    ) -> ProjectRepositoryResult<Option<ProjectMembership>> {
        let state = self.state.read().map_err(poisoned)?;
        Ok(state.memberships.get(&id).cloned())
    }

    async fn list_memberships(
        &self,
        project: ProjectId,
    ) -> ProjectRepositoryResult<Vec<ProjectMembership>> {
        let state = self.state.read().map_err(poisoned)?;
        let mut members: Vec<ProjectMembership> = state
            .memberships
            .values()
            .filter(|membership| membership.project_id == project)
            .cloned()
            .collect();
        members.sort_by_key(|membership| membership.created_at);
        Ok(members)
    }

    async fn delete_membership(&self, id: MembershipId) -> ProjectRepositoryResult<()> {
        let mut state = self.state.write().map_err(poisoned)?;
        state.memberships.remove(&id);
        Ok(())
    }

    async fn save_file(&self, file: &ProjectFile) -> ProjectRepositoryResult<()> {
        let mut state = self.state.write().map_err(poisoned)?;
        state.files.insert(file.id, file.clone());
        Ok(())
    }

    async fn find_file(&self, id: ProjectFileId) -> ProjectRepositoryResult<Option<ProjectFile>> {
        let state = self.state.read().map_err(poisoned)?;
        Ok(state.files.get(&id).cloned())
    }

    async fn list_files(&self, project: ProjectId) -> ProjectRepositoryResult<Vec<ProjectFile>> {
        let state = self.state.read().map_err(poisoned)?;
        let files = state
            .files
            .values()
            .filter(|file| file.project_id == project)
            .cloned()
            .collect();
        Ok(newest_first(files, |file: &ProjectFile| file.uploaded_at))
    }

    async fn delete_file(&self, id: ProjectFileId) -> ProjectRepositoryResult<()> {
        let mut state = self.state.write().map_err(poisoned)?;
        state.files.remove(&id);
        Ok(())
    }

    async fn save_link(&self, link: &ProjectLink) -> ProjectRepositoryResult<()> {
        let mut state = self.state.write().map_err(poisoned)?;
        state.links.insert(link.id, link.clone());
        Ok(())
    }

    async fn find_link(&self, id: ProjectLinkId) -> ProjectRepositoryResult<Option<ProjectLink>> {
        let state = self.state.read().map_err(poisoned)?;
        Ok(state.links.get(&id).cloned())
    }

    async fn list_links(&self, project: ProjectId) -> ProjectRepositoryResult<Vec<ProjectLink>> {
        let state = self.state.read().map_err(poisoned)?;
        let links = state
            .links
            .values()
            .filter(|link| link.project_id == project)
            .cloned()
            .collect();
        Ok(newest_first(links, |link: &ProjectLink| link.created_at))
    }

    async fn delete_link(&self, id: ProjectLinkId) -> ProjectRepositoryResult<()> {
        let mut state = self.state.write().map_err(poisoned)?;
        state.links.remove(&id);
        Ok(())
    }

    async fn record_activity(&self, activity: &ProjectActivity) -> ProjectRepositoryResult<()> {
        let mut state = self.state.write().map_err(poisoned)?;
        state.activities.push(activity.clone());
        Ok(())
    }

    async fn list_activities(
        &self,
        project: ProjectId,
    ) -> ProjectRepositoryResult<Vec<ProjectActivity>> {
        let state = self.state.read().map_err(poisoned)?;
        // Insertion order breaks ties between entries sharing a timestamp.
        let mut entries: Vec<ProjectActivity> = state
            .activities
            .iter()
            .filter(|activity| activity.project_id == project)
            .cloned()
            .collect();
        entries.reverse();
        entries.sort_by(|left, right| right.created_at.cmp(&left.created_at));
        Ok(entries)
    }
}

#[async_trait]
impl TopicRepository for InMemoryProjectRepository {
    async fn store_topic(&self, topic: &Topic) -> TopicRepositoryResult<()> {
        let mut state = self.state.write().map_err(topic_poisoned)?;
        if state.title_taken(topic) {
            return Err(TopicRepositoryError::DuplicateTitle {
                project: topic.project_id(),
                title: topic.title().to_owned(),
            });
        }
        state.topics.insert(topic.id(), topic.clone());
        Ok(())
    }

    async fn update_topic(&self, topic: &Topic) -> TopicRepositoryResult<()> {
        let mut state = self.state.write().map_err(topic_poisoned)?;
        if !state.topics.contains_key(&topic.id()) {
            return Err(TopicRepositoryError::NotFound(topic.id()));
        }
        if state.title_taken(topic) {
            return Err(TopicRepositoryError::DuplicateTitle {
                project: topic.project_id(),
                title: topic.title().to_owned(),
            });
        }
        state.topics.insert(topic.id(), topic.clone());
        Ok(())
    }

    async fn find_topic(&self, id: TopicId) -> TopicRepositoryResult<Option<Topic>> {
        let state = self.state.read().map_err(topic_poisoned)?;
        Ok(state.topics.get(&id).cloned())
    }

    async fn list_topics(&self, project: ProjectId) -> TopicRepositoryResult<Vec<Topic>> {
        let state = self.state.read().map_err(topic_poisoned)?;
        let topics = state
            .topics
            .values()
            .filter(|topic| topic.project_id() == project)
            .cloned()
            .collect();
        Ok(newest_first(topics, Topic::updated_at))
    }

    async fn delete_topic(&self, id: TopicId) -> TopicRepositoryResult<Vec<String>> {
        let mut state = self.state.write().map_err(topic_poisoned)?;
        if !state.topics.contains_key(&id) {
            return Err(TopicRepositoryError::NotFound(id));
        }
        Ok(state.remove_topic(id))
    }

    async fn topic_counts(&self, id: TopicId) -> TopicRepositoryResult<TopicCounts> {
        let state = self.state.read().map_err(topic_poisoned)?;
        Ok(TopicCounts {
            notes: state.notes.values().filter(|note| note.topic_id == id).count(),
            links: state.topic_links.values().filter(|link| link.topic_id == id).count(),
            media: state.media.values().filter(|media| media.topic_id == id).count(),
            comments: state
                .comments
                .values()
                .filter(|comment| comment.topic_id == id)
                .count(),
        })
    }

    async fn save_note(&self, note: &TopicNote) -> TopicRepositoryResult<()> {
        let mut state = self.state.write().map_err(topic_poisoned)?;
        state.notes.insert(note.id, note.clone());
        Ok(())
    }

    async fn find_note(&self, id: TopicNoteId) -> TopicRepositoryResult<Option<TopicNote>> {
        let state = self.state.read().map_err(topic_poisoned)?;
        Ok(state.notes.get(&id).cloned())
    }

    async fn list_notes(&self, topic: TopicId) -> TopicRepositoryResult<Vec<TopicNote>> {
        let state = self.state.read().map_err(topic_poisoned)?;
        let notes = state
            .notes
            .values()
            .filter(|note| note.topic_id == topic)
            .cloned()
            .collect();
        Ok(newest_first(notes, |note: &TopicNote| note.updated_at))
    }

    async fn delete_note(&self, id: TopicNoteId) -> TopicRepositoryResult<()> {
        let mut state = self.state.write().map_err(topic_poisoned)?;
        state.notes.remove(&id);
        Ok(())
    }

    async fn save_link(&self, link: &TopicLink) -> TopicRepositoryResult<()> {
        let mut state = self.state.write().map_err(topic_poisoned)?;
        state.topic_links.insert(link.id, link.clone());
        Ok(())
    }

    async fn find_link(&self, id: TopicLinkId) -> TopicRepositoryResult<Option<TopicLink>> {
        let state = self.state.read().map_err(topic_poisoned)?;
        Ok(state.topic_links.get(&id).cloned())
    }

    async fn list_links(&self, topic: TopicId) -> TopicRepositoryResult<Vec<TopicLink>> {
        let state = self.state.read().map_err(topic_poisoned)?;
        let links = state
            .topic_links
            .values()
            .filter(|link| link.topic_id == topic)
            .cloned()
            .collect();
        Ok(newest_first(links, |link: &TopicLink| link.created_at))
    }

    async fn delete_link(&self, id: TopicLinkId) -> TopicRepositoryResult<()> {
        let mut state = self.state.write().map_err(topic_poisoned)?;
        state.topic_links.remove(&id);
        Ok(())
    }

    async fn save_media(&self, media: &TopicMedia) -> TopicRepositoryResult<()> {
        let mut state = self.state.write().map_err(topic_poisoned)?;
        state.media.insert(media.id, media.clone());
        Ok(())
    }

    async fn find_media(&self, id: TopicMediaId) -> TopicRepositoryResult<Option<TopicMedia>> {
        let state = self.state.read().map_err(topic_poisoned)?;
        Ok(state.media.get(&id).cloned())
    }

    async fn list_media(&self, topic: TopicId) -> TopicRepositoryResult<Vec<TopicMedia>> {
        let state = self.state.read().map_err(topic_poisoned)?;
        let media = state
            .media
            .values()
            .filter(|media| media.topic_id == topic)
            .cloned()
            .collect();
        Ok(newest_first(media, |media: &TopicMedia| media.uploaded_at))
    }

    async fn delete_media(&self, id: TopicMediaId) -> TopicRepositoryResult<()> {
        let mut state = self.state.write().map_err(topic_poisoned)?;
        state.media.remove(&id);
        Ok(())
    }

    async fn save_tag(&self, tag: &TopicTag) -> TopicRepositoryResult<()> {
        let mut state = self.state.write().map_err(topic_poisoned)?;
        let clash = state.tags.values().any(|other| {
            other.id != tag.id && other.topic_id == tag.topic_id && other.name == tag.name
        });
        if clash {
            return Err(TopicRepositoryError::DuplicateTag {
                topic: tag.topic_id,
                name: tag.name.clone(),
            });
        }
        state.tags.insert(tag.id, tag.clone());
        Ok(())
    }

    async fn find_tag(&self, id: TopicTagId) -> TopicRepositoryResult<Option<TopicTag>> {
        let state = self.state.read().map_err(topic_poisoned)?;
        Ok(state.tags.get(&id).cloned())
    }

    async fn list_tags(&self, topic: TopicId) -> TopicRepositoryResult<Vec<TopicTag>> {
        let state = self.state.read().map_err(topic_poisoned)?;
        let mut tags: Vec<TopicTag> = state
            .tags
            .values()
            .filter(|tag| tag.topic_id == topic)
            .cloned()
            .collect();
        tags.sort_by(|left, right| left.name.cmp(&right.name));
        Ok(tags)
    }

    async fn delete_tag(&self, id: TopicTagId) -> TopicRepositoryResult<()> {
        let mut state = self.state.write().map_err(topic_poisoned)?;
        state.tags.remove(&id);
        Ok(())
    }

    async fn save_comment(&self, comment: &TopicComment) -> TopicRepositoryResult<()> {
        let mut state = self.state.write().map_err(topic_poisoned)?;
        state.comments.insert(comment.id, comment.clone());
        Ok(())
    }

    async fn find_comment(
        &self,
        id: TopicCommentId,
    ) -> TopicRepositoryResult<Option<TopicComment>> {
        let state = self.state.read().map_err(topic_poisoned)?;
        Ok(state.comments.get(&id).cloned())
    }

    async fn list_comments(&self, topic: TopicId) -> TopicRepositoryResult<Vec<TopicComment>> {
        let state = self.state.read().map_err(topic_poisoned)?;
        let mut comments: Vec<TopicComment> = state
            .comments
            .values()
            .filter(|comment| comment.topic_id == topic)
            .cloned()
            .collect();
        comments.sort_by_key(|comment| comment.created_at);
        Ok(comments)
    }

    async fn delete_comment(&self, id: TopicCommentId) -> TopicRepositoryResult<()> {
        let mut state = self.state.write().map_err(topic_poisoned)?;
        let mut doomed = vec![id];
        while let Some(current) = doomed.pop() {
            state.comments.remove(&current);
            doomed.extend(
                state
                    .comments
                    .values()
                    .filter(|comment| comment.parent == Some(current))
                    .map(|comment| comment.id),
            );
        }
        Ok(())
    }
}
