//! `PostgreSQL` implementation of the topic port.

use super::models::{
    TopicCommentRow, TopicLinkRow, TopicMediaRow, TopicNoteRow, TopicRow, TopicTagRow,
};
use super::repository::{PostgresProjectRepository, size_column};
use super::schema::{topic_comments, topic_links, topic_media, topic_notes, topic_tags, topics};
use crate::account::domain::UserId;
use crate::blob::StoredFile;
use crate::project::{
    domain::{
        LinkType, MediaType, PersistedTopicData, ProjectId, Topic, TopicComment, TopicCommentId,
        TopicCounts, TopicId, TopicLink, TopicLinkId, TopicMedia, TopicMediaId, TopicNote,
        TopicNoteId, TopicTag, TopicTagId,
    },
    ports::{TopicRepository, TopicRepositoryError, TopicRepositoryResult},
};
use crate::shared::HexColor;
use crate::storage::run_blocking;
use async_trait::async_trait;
use diesel::prelude::*;
use diesel::result::{DatabaseErrorKind, Error as DieselError};

fn count(value: i64) -> usize {
    usize::try_from(value).unwrap_or_default()
}

fn title_clash(topic: &Topic) -> impl Fn(DieselError) -> TopicRepositoryError + use<> {
    let project = topic.project_id();
    let title = topic.title().to_owned();
    move |err| match err {
        DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _) => {
            TopicRepositoryError::DuplicateTitle {
                project,
                title: title.clone(),
            }
        }
        other => TopicRepositoryError::persistence(other),
    }
}

#[async_trait]
impl TopicRepository for PostgresProjectRepository {
    async fn store_topic(&self, topic: &Topic) -> TopicRepositoryResult<()> {
        let row = topic_to_row(topic);
        let on_error = title_clash(topic);
        run_blocking(&self.pool, TopicRepositoryError::persistence, move |connection| {
            diesel::insert_into(topics::table)
                .values(&row)
                .execute(connection)
                .map_err(on_error)?;
            Ok(())
        })
        .await
    }

    async fn update_topic(&self, topic: &Topic) -> TopicRepositoryResult<()> {
        let row = topic_to_row(topic);
        let on_error = title_clash(topic);
        let id = topic.id();
        run_blocking(&self.pool, TopicRepositoryError::persistence, move |connection| {
            let affected = diesel::update(topics::table.filter(topics::id.eq(row.id)))
                .set(&row)
                .execute(connection)
                .map_err(on_error)?;
            if affected == 0 {
                return Err(TopicRepositoryError::NotFound(id));
            }
            Ok(())
        })
        .await
    }

    async fn find_topic(&self, id: TopicId) -> TopicRepositoryResult<Option<Topic>> {
        run_blocking(&self.pool, TopicRepositoryError::persistence, move |connection| {
            let row = topics::table
                .filter(topics::id.eq(id.into_inner()))
                .select(TopicRow::as_select())
                .first::<TopicRow>(connection)
                .optional()
                .map_err(TopicRepositoryError::persistence)?;
            row.map(row_to_topic).transpose()
        })
        .await
    }

    async fn list_topics(&self, project: ProjectId) -> TopicRepositoryResult<Vec<Topic>> {
        run_blocking(&self.pool, TopicRepositoryError::persistence, move |connection| {
            topics::table
                .filter(topics::project_id.eq(project.into_inner()))
                .order(topics::updated_at.desc())
                .select(TopicRow::as_select())
                .load::<TopicRow>(connection)
                .map_err(TopicRepositoryError::persistence)?
                .into_iter()
                .map(row_to_topic)
                .collect()
        })
        .await
    }

    async fn delete_topic(&self, id: TopicId) -> TopicRepositoryResult<Vec<String>> {
        let key = id.into_inner();
        run_blocking(&self.pool, TopicRepositoryError::persistence, move |connection| {
            let (affected, keys) = connection
                .transaction::<_, DieselError, _>(|tx| {
                    let keys: Vec<String> = topic_media::table
                        .filter(topic_media::topic_id.eq(key))
                        .select(topic_media::storage_key)
                        .load(tx)?;
                    let affected =
                        diesel::delete(topics::table.filter(topics::id.eq(key))).execute(tx)?;
                    Ok((affected, keys))
                })
                .map_err(TopicRepositoryError::persistence)?;
            if affected == 0 {
                return Err(TopicRepositoryError::NotFound(id));
            }
            Ok(keys)
        })
        .await
    }

    async fn topic_counts(&self, id: TopicId) -> TopicRepositoryResult<TopicCounts> {
        let key = id.into_inner();
        run_blocking(&self.pool, TopicRepositoryError::persistence, move |connection| {
            let notes: i64 = topic_notes::table
                .filter(topic_notes::topic_id.eq(key))
                .count()
                .get_result(connection)
                .map_err(TopicRepositoryError::persistence)?;
            let links: i64 = topic_links::table
                .filter(topic_links::topic_id.eq(key))
                .count()
                .get_result(connection)
                .map_err(TopicRepositoryError::persistence)?;
            let media: i64 = topic_media::table
                .filter(topic_media::topic_id.eq(key))
                .count()
                .get_result(connection)
                .map_err(TopicRepositoryError::persistence)?;
            let comments: i64 = topic_comments::table
                .filter(topic_comments::topic_id.eq(key))
                .count()
                .get_result(connection)
                .map_err(TopicRepositoryError::persistence)?;
            Ok(TopicCounts {
                notes: count(notes),
                links: count(links),
                media: count(media),
                comments: count(comments),
            })
        })
        .await
    }

    async fn save_note(&self, note: &TopicNote) -> TopicRepositoryResult<()> {
        let row = TopicNoteRow {
            id: note.id.into_inner(),
            topic_id: note.topic_id.into_inner(),
            title: note.title.clone(),
            content: note.content.clone(),
            created_by: note.created_by.into_inner(),
            last_edited_by: note.last_edited_by.map(UserId::into_inner),
            created_at: note.created_at,
            updated_at: note.updated_at,
        };
        run_blocking(&self.pool, TopicRepositoryError::persistence, move |connection| {
            diesel::insert_into(topic_notes::table)
                .values(&row)
                .on_conflict(topic_notes::id)
                .do_update()
                .set(&row)
                .execute(connection)
                .map_err(TopicRepositoryError::persistence)?;
            Ok(())
        })
        .await
    }

    async fn find_note(&self, id: TopicNoteId) -> TopicRepositoryResult<Option<TopicNote>> {
        run_blocking(&self.pool, TopicRepositoryError::persistence, move |connection| {
            let row = topic_notes::table
                .filter(topic_notes::id.eq(id.into_inner()))
                .select(TopicNoteRow::as_select())
                .first::<TopicNoteRow>(connection)
                .optional()
                .map_err(TopicRepositoryError::persistence)?;
            Ok(row.map(row_to_note))
        })
        .await
    }

    async fn list_notes(&self, topic: TopicId) -> TopicRepositoryResult<Vec<TopicNote>> {
        run_blocking(&self.pool, TopicRepositoryError::persistence, move |connection| {
            let rows = topic_notes::table
                .filter(topic_notes::topic_id.eq(topic.into_inner()))
                .order(topic_notes::updated_at.desc())
                .select(TopicNoteRow::as_select())
                .load::<TopicNoteRow>(connection)
                .map_err(TopicRepositoryError::persistence)?;
            Ok(rows.into_iter().map(row_to_note).collect())
        })
        .await
    }

    async fn delete_note(&self, id: TopicNoteId) -> TopicRepositoryResult<()> {
        run_blocking(&self.pool, TopicRepositoryError::persistence, move |connection| {
            diesel::delete(topic_notes::table.filter(topic_notes::id.eq(id.into_inner())))
                .execute(connection)
                .map_err(TopicRepositoryError::persistence)?;
            Ok(())
        })
        .await
    }

    async fn save_link(&self, link: &TopicLink) -> TopicRepositoryResult<()> {
        let row = TopicLinkRow {
            id: link.id.into_inner(),
            topic_id: link.topic_id.into_inner(),
            title: link.title.clone(),
            url: link.url.clone(),
            description: link.description.clone(),
            link_type: link.link_type.as_str().to_owned(),
            created_by: link.created_by.into_inner(),
            created_at: link.created_at,
            updated_at: link.updated_at,
        };
        run_blocking(&self.pool, TopicRepositoryError::persistence, move |connection| {
            diesel::insert_into(topic_links::table)
                .values(&row)
                .on_conflict(topic_links::id)
                .do_update()
                .set(&row)
                .execute(connection)
                .map_err(TopicRepositoryError::persistence)?;
            Ok(())
        })
        .await
    }

    async fn find_link(&self, id: TopicLinkId) -> TopicRepositoryResult<Option<TopicLink>> {
        run_blocking(&self.pool, TopicRepositoryError::persistence, move |connection| {
            let row = topic_links::table
                .filter(topic_links::id.eq(id.into_inner()))
                .select(TopicLinkRow::as_select())
                .first::<TopicLinkRow>(connection)
                .optional()
                .map_err(TopicRepositoryError::persistence)?;
            row.map(row_to_link).transpose()
        })
        .await
    }

    async fn list_links(&self, topic: TopicId) -> TopicRepositoryResult<Vec<TopicLink>> {
        run_blocking(&self.pool, TopicRepositoryError::persistence, move |connection| {
            topic_links::table
                .filter(topic_links::topic_id.eq(topic.into_inner()))
                .order(topic_links::created_at.desc())
                .select(TopicLinkRow::as_select())
                .load::<TopicLinkRow>(connection)
                .map_err(TopicRepositoryError::persistence)?
                .into_iter()
                .map(row_to_link)
                .collect()
        })
        .await
    }

    async fn delete_link(&self, id: TopicLinkId) -> TopicRepositoryResult<()> {
        run_blocking(&self.pool, TopicRepositoryError::persistence, move |connection| {
            diesel::delete(topic_links::table.filter(topic_links::id.eq(id.into_inner())))
                .execute(connection)
                .map_err(TopicRepositoryError::persistence)?;
            Ok(())
        })
        .await
    }

    async fn save_media(&self, media: &TopicMedia) -> TopicRepositoryResult<()> {
        let row = media_to_row(media);
        run_blocking(&self.pool, TopicRepositoryError::persistence, move |connection| {
            diesel::insert_into(topic_media::table)
                .values(&row)
                .on_conflict(topic_media::id)
                .do_update()
                .set(&row)
                .execute(connection)
                .map_err(TopicRepositoryError::persistence)?;
            Ok(())
        })
        .await
    }

    async fn find_media(&self, id: TopicMediaId) -> TopicRepositoryResult<Option<TopicMedia>> {
        run_blocking(&self.pool, TopicRepositoryError::persistence, move |connection| {
            let row = topic_media::table
                .filter(topic_media::id.eq(id.into_inner()))
                .select(TopicMediaRow::as_select())
                .first::<TopicMediaRow>(connection)
                .optional()
                .map_err(TopicRepositoryError::persistence)?;
            row.map(row_to_media).transpose()
        })
        .await
    }

    async fn list_media(&self, topic: TopicId) -> TopicRepositoryResult<Vec<TopicMedia>> {
        run_blocking(&self.pool, TopicRepositoryError::persistence, move |connection| {
            topic_media::table
                .filter(topic_media::topic_id.eq(topic.into_inner()))
                .order(topic_media::uploaded_at.desc())
                .select(TopicMediaRow::as_select())
                .load::<TopicMediaRow>(connection)
                .map_err(TopicRepositoryError::persistence)?
                .into_iter()
                .map(row_to_media)
                .collect()
        })
        .await
    }

    async fn delete_media(&self, id: TopicMediaId) -> TopicRepositoryResult<()> {
        run_blocking(&self.pool, TopicRepositoryError::persistence, move |connection| {
            diesel::delete(topic_media::table.filter(topic_media::id.eq(id.into_inner())))
                .execute(connection)
                .map_err(TopicRepositoryError::persistence)?;
            Ok(())
        })
        .await
    }

    async fn save_tag(&self, tag: &TopicTag) -> TopicRepositoryResult<()> {
        let row = TopicTagRow {
            id: tag.id.into_inner(),
            topic_id: tag.topic_id.into_inner(),
            name: tag.name.clone(),
            color: tag.color.as_str().to_owned(),
            created_at: tag.created_at,
        };
        let topic = tag.topic_id;
        let name = tag.name.clone();
        run_blocking(&self.pool, TopicRepositoryError::persistence, move |connection| {
            diesel::insert_into(topic_tags::table)
                .values(&row)
                .on_conflict(topic_tags::id)
                .do_update()
                .set(&row)
                .execute(connection)
                .map_err(|err| match err {
                    DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _) => {
                        TopicRepositoryError::DuplicateTag { topic, name }
                    }
                    other => TopicRepositoryError::persistence(other),
                })?;
            Ok(())
        })
        .await
    }

    async fn find_tag(&self, id: TopicTagId) -> TopicRepositoryResult<Option<TopicTag>> {
        run_blocking(&self.pool, TopicRepositoryError::persistence, move |connection| {
            let row = topic_tags::table
                .filter(topic_tags::id.eq(id.into_inner()))
                .select(TopicTagRow::as_select())
                .first::<TopicTagRow>(connection)
                .optional()
                .map_err(TopicRepositoryError::persistence)?;
            row.map(row_to_tag).transpose()
        })
        .await
    }

    async fn list_tags(&self, topic: TopicId) -> TopicRepositoryResult<Vec<TopicTag>> {
        run_blocking(&self.pool, TopicRepositoryError::persistence, move |connection| {
            topic_tags::table
                .filter(topic_tags::topic_id.eq(topic.into_inner()))
                .order(topic_tags::name.asc())
                .select(TopicTagRow::as_select())
                .load::<TopicTagRow>(connection)
                .map_err(TopicRepositoryError::persistence)?
                .into_iter()
                .map(row_to_tag)
                .collect()
        })
        .await
    }

    async fn delete_tag(&self, id: TopicTagId) -> TopicRepositoryResult<()> {
        run_blocking(&self.pool, TopicRepositoryError::persistence, move |connection| {
            diesel::delete(topic_tags::table.filter(topic_tags::id.eq(id.into_inner())))
                .execute(connection)
                .map_err(TopicRepositoryError::persistence)?;
            Ok(())
        })
        .await
    }

    async fn save_comment(&self, comment: &TopicComment) -> TopicRepositoryResult<()> {
        let row = TopicCommentRow {
            id: comment.id.into_inner(),
            topic_id: comment.topic_id.into_inner(),
            author_id: comment.author.into_inner(),
            content: comment.content.clone(),
            parent_id: comment.parent.map(TopicCommentId::into_inner),
            created_at: comment.created_at,
            updated_at: comment.updated_at,
        };
        run_blocking(&self.pool, TopicRepositoryError::persistence, move |connection| {
            diesel::insert_into(topic_comments::table)
                .values(&row)
                .on_conflict(topic_comments::id)
                .do_update()
                .set(&row)
                .execute(connection)
                .map_err(TopicRepositoryError::persistence)?;
            Ok(())
        })
        .await
    }

    async fn find_comment(
        &self,
        id: TopicCommentId,
    ) -> TopicRepositoryResult<Option<TopicComment>> {
        run_blocking(&self.pool, TopicRepositoryError::persistence, move |connection| {
            let row = topic_comments::table
                .filter(topic_comments::id.eq(id.into_inner()))
                .select(TopicCommentRow::as_select())
                .first::<TopicCommentRow>(connection)
                .optional()
                .map_err(TopicRepositoryError::persistence)?;
            Ok(row.map(row_to_comment))
        })
        .await
    }

    async fn list_comments(&self, topic: TopicId) -> TopicRepositoryResult<Vec<TopicComment>> {
        run_blocking(&self.pool, TopicRepositoryError::persistence, move |connection| {
            let rows = topic_comments::table
                .filter(topic_comments::topic_id.eq(topic.into_inner()))
                .order(topic_comments::created_at.asc())
                .select(TopicCommentRow::as_select())
                .load::<TopicCommentRow>(connection)
                .map_err(TopicRepositoryError::persistence)?;
            Ok(rows.into_iter().map(row_to_comment).collect())
        })
        .await
    }

    async fn delete_comment(&self, id: TopicCommentId) -> TopicRepositoryResult<()> {
        // Replies reference their parent with ON DELETE CASCADE.
        run_blocking(&self.pool, TopicRepositoryError::persistence, move |connection| {
            diesel::delete(topic_comments::table.filter(topic_comments::id.eq(id.into_inner())))
                .execute(connection)
                .map_err(TopicRepositoryError::persistence)?;
            Ok(())
        })
        .await
    }
}

pub(super) fn topic_to_row(topic: &Topic) -> TopicRow {
    TopicRow {
        id: topic.id().into_inner(),
        project_id: topic.project_id().into_inner(),
        title: topic.title().to_owned(),
        description: topic.description().to_owned(),
        color: topic.color().as_str().to_owned(),
        created_by: topic.created_by().into_inner(),
        created_at: topic.created_at(),
        updated_at: topic.updated_at(),
    }
}

pub(super) fn row_to_topic(row: TopicRow) -> TopicRepositoryResult<Topic> {
    let color = HexColor::new("color", &row.color).map_err(TopicRepositoryError::persistence)?;
    Ok(Topic::from_persisted(PersistedTopicData {
        id: TopicId::from_uuid(row.id),
        project_id: ProjectId::from_uuid(row.project_id),
        title: row.title,
        description: row.description,
        color,
        created_by: UserId::from_uuid(row.created_by),
        created_at: row.created_at,
        updated_at: row.updated_at,
    }))
}

fn row_to_note(row: TopicNoteRow) -> TopicNote {
    TopicNote {
        id: TopicNoteId::from_uuid(row.id),
        topic_id: TopicId::from_uuid(row.topic_id),
        title: row.title,
        content: row.content,
        created_by: UserId::from_uuid(row.created_by),
        last_edited_by: row.last_edited_by.map(UserId::from_uuid),
        created_at: row.created_at,
        updated_at: row.updated_at,
    }
}

fn row_to_link(row: TopicLinkRow) -> TopicRepositoryResult<TopicLink> {
    let link_type =
        LinkType::try_from(row.link_type.as_str()).map_err(TopicRepositoryError::persistence)?;
    Ok(TopicLink {
        id: TopicLinkId::from_uuid(row.id),
        topic_id: TopicId::from_uuid(row.topic_id),
        title: row.title,
        url: row.url,
        description: row.description,
        link_type,
        created_by: UserId::from_uuid(row.created_by),
        created_at: row.created_at,
        updated_at: row.updated_at,
    })
}

pub(super) fn media_to_row(media: &TopicMedia) -> TopicMediaRow {
    TopicMediaRow {
        id: media.id.into_inner(),
        topic_id: media.topic_id.into_inner(),
        title: media.title.clone(),
        description: media.description.clone(),
        media_type: media.media_type.as_str().to_owned(),
        file_name: media.file.file_name.clone(),
        content_type: media.file.content_type.clone(),
        file_size: size_column(media.file.size),
        storage_key: media.file.storage_key.clone(),
        sha256: media.file.sha256.clone(),
        duration_seconds: media.duration_seconds.map(i64::from),
        uploaded_by: media.uploaded_by.into_inner(),
        uploaded_at: media.uploaded_at,
    }
}

pub(super) fn row_to_media(row: TopicMediaRow) -> TopicRepositoryResult<TopicMedia> {
    let media_type =
        MediaType::try_from(row.media_type.as_str()).map_err(TopicRepositoryError::persistence)?;
    let size = u64::try_from(row.file_size).map_err(TopicRepositoryError::persistence)?;
    let duration_seconds = row
        .duration_seconds
        .map(u32::try_from)
        .transpose()
        .map_err(TopicRepositoryError::persistence)?;
    Ok(TopicMedia {
        id: TopicMediaId::from_uuid(row.id),
        topic_id: TopicId::from_uuid(row.topic_id),
        title: row.title,
        description: row.description,
        media_type,
        file: StoredFile {
            file_name: row.file_name,
            content_type: row.content_type,
            size,
            storage_key: row.storage_key,
            sha256: row.sha256,
        },
        duration_seconds,
        uploaded_by: UserId::from_uuid(row.uploaded_by),
        uploaded_at: row.uploaded_at,
    })
}

fn row_to_tag(row: TopicTagRow) -> TopicRepositoryResult<TopicTag> {
    let color = HexColor::new("color", &row.color).map_err(TopicRepositoryError::persistence)?;
    Ok(TopicTag {
        id: TopicTagId::from_uuid(row.id),
        topic_id: TopicId::from_uuid(row.topic_id),
        name: row.name,
        color,
        created_at: row.created_at,
    })
}

fn row_to_comment(row: TopicCommentRow) -> TopicComment {
    TopicComment {
        id: TopicCommentId::from_uuid(row.id),
        topic_id: TopicId::from_uuid(row.topic_id),
        author: UserId::from_uuid(row.author_id),
        content: row.content,
        parent: row.parent_id.map(TopicCommentId::from_uuid),
        created_at: row.created_at,
        updated_at: row.updated_at,
    }
}
