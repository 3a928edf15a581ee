//! Comments, attachments and time logs hung off a task.

use super::tasks::{ATTACHMENT_NAMESPACE, TaskService, TaskServiceError, TaskServiceResult};
use crate::access::{Action, TASK_POLICY};
use crate::account::domain::UserId;
use crate::blob::{Upload, ports::BlobStore};
use crate::idea::ports::IdeaRepository;
use crate::project::ports::ProjectRepository;
use crate::shared::FieldError;
use crate::task::{
    domain::{
        ActivityAction, ActivityEntry, Hours, TaskAttachment, TaskAttachmentId, TaskComment,
        TaskCommentId, TaskId, TaskTimeLog, TimeLogChanges, TimeLogId,
    },
    ports::TaskRepository,
};
use chrono::NaiveDate;
use mockable::Clock;
use std::collections::HashMap;

/// A task comment with its nested replies.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskCommentThread {
    /// The comment.
    pub comment: TaskComment,
    /// Replies, oldest first.
    pub replies: Vec<TaskCommentThread>,
}

/// Input for logging time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTimeLog {
    /// What was done.
    pub description: String,
    /// Time spent.
    pub hours: Hours,
    /// Day the work happened.
    pub date: NaiveDate,
}

fn threads(comments: Vec<TaskComment>) -> Vec<TaskCommentThread> {
    let mut children: HashMap<Option<TaskCommentId>, Vec<TaskComment>> = HashMap::new();
    for comment in comments {
        children.entry(comment.parent).or_default().push(comment);
    }
    replies_to(None, &mut children)
}

fn replies_to(
    parent: Option<TaskCommentId>,
    children: &mut HashMap<Option<TaskCommentId>, Vec<TaskComment>>,
) -> Vec<TaskCommentThread> {
    let direct = children.remove(&parent).unwrap_or_default();
    direct
        .into_iter()
        .map(|comment| {
            let replies = replies_to(Some(comment.id), children);
            TaskCommentThread { comment, replies }
        })
        .collect()
}

/// Sums the task's logs with `changed` replacing its stored version and
/// `removed` left out.
fn projected_total(
    logs: Vec<TaskTimeLog>,
    changed: Option<&TaskTimeLog>,
    removed: Option<TimeLogId>,
) -> TaskServiceResult<Hours> {
    let replaced = changed.map(|log| log.id);
    let kept = logs
        .into_iter()
        .filter(|log| Some(log.id) != replaced && Some(log.id) != removed)
        .map(|log| log.hours);
    Hours::checked_sum(kept.chain(changed.map(|log| log.hours))).ok_or_else(|| {
        TaskServiceError::Validation(FieldError::new(
            "hours",
            "Total logged time may not exceed 999.99 hours.",
        ))
    })
}

impl<T, P, I, B, C> TaskService<T, P, I, B, C>
where
    T: TaskRepository + ?Sized,
    P: ProjectRepository + ?Sized,
    I: IdeaRepository + ?Sized,
    B: BlobStore + ?Sized,
    C: Clock + Send + Sync,
{
    /// Lists top-level comments with nested replies.
    ///
    /// # Errors
    ///
    /// Requires the view permission.
    pub async fn comments(
        &self,
        caller: UserId,
        task: TaskId,
    ) -> TaskServiceResult<Vec<TaskCommentThread>> {
        self.authorize(caller, task, Action::View).await?;
        Ok(threads(self.tasks.list_comments(task).await?))
    }

    /// Posts a comment or reply; anyone who can see the task may comment.
    ///
    /// # Errors
    ///
    /// Requires the view permission; returns
    /// [`TaskServiceError::NotFound`] for an unknown parent.
    pub async fn create_comment(
        &self,
        caller: UserId,
        task: TaskId,
        content: String,
        parent: Option<TaskCommentId>,
    ) -> TaskServiceResult<TaskComment> {
        self.authorize(caller, task, Action::View).await?;
        let parent_comment = match parent {
            Some(id) => Some(
                self.tasks
                    .find_comment(id)
                    .await?
                    .ok_or(TaskServiceError::NotFound("parent comment"))?,
            ),
            None => None,
        };
        let comment = TaskComment::new(
            task,
            caller,
            content,
            parent_comment.as_ref(),
            &*self.clock,
        )?;
        self.tasks.save_comment(&comment).await?;
        self.note(task, caller, ActivityAction::CommentAdded, "Comment added".to_owned())
            .await?;
        Ok(comment)
    }

    /// Edits a comment; only its author may do so.
    ///
    /// # Errors
    ///
    /// Returns [`TaskServiceError::NotAuthor`] for anyone else.
    pub async fn update_comment(
        &self,
        caller: UserId,
        task: TaskId,
        comment_id: TaskCommentId,
        content: String,
    ) -> TaskServiceResult<TaskComment> {
        self.authorize(caller, task, Action::View).await?;
        let mut comment = self.comment_in(task, comment_id).await?;
        if comment.author != caller {
            return Err(TaskServiceError::NotAuthor);
        }
        comment.edit(content, &*self.clock)?;
        self.tasks.save_comment(&comment).await?;
        Ok(comment)
    }

    /// Deletes a comment and its replies; allowed for the author and for
    /// editors.
    ///
    /// # Errors
    ///
    /// Requires authorship or the edit permission.
    pub async fn delete_comment(
        &self,
        caller: UserId,
        task: TaskId,
        comment_id: TaskCommentId,
    ) -> TaskServiceResult<()> {
        let grant = self.authorize(caller, task, Action::View).await?;
        let comment = self.comment_in(task, comment_id).await?;
        if comment.author != caller {
            TASK_POLICY.authorize(Some(grant.role), Action::Edit)?;
        }
        self.tasks.delete_comment(comment.id).await?;
        Ok(())
    }

    /// Lists a task's attachments, newest first.
    ///
    /// # Errors
    ///
    /// Requires the view permission.
    pub async fn attachments(
        &self,
        caller: UserId,
        task: TaskId,
    ) -> TaskServiceResult<Vec<TaskAttachment>> {
        self.authorize(caller, task, Action::View).await?;
        Ok(self.tasks.list_attachments(task).await?)
    }

    /// Stores an upload as an attachment of the task.
    ///
    /// # Errors
    ///
    /// Requires the contribute permission; returns blob and validation
    /// failures otherwise.
    pub async fn upload_attachment(
        &self,
        caller: UserId,
        task: TaskId,
        upload: Upload,
    ) -> TaskServiceResult<TaskAttachment> {
        self.authorize(caller, task, Action::Contribute).await?;
        TaskAttachment::check_upload(&upload.file_name, upload.content_type.as_deref())?;
        let stored = self.blobs.put(ATTACHMENT_NAMESPACE, upload).await?;
        let attachment = TaskAttachment::new(task, stored, caller, &*self.clock);
        if let Err(err) = self.tasks.save_attachment(&attachment).await {
            self.release_blobs(&[attachment.file.storage_key.clone()])
                .await;
            return Err(err.into());
        }
        self.note(
            task,
            caller,
            ActivityAction::AttachmentAdded,
            format!("Attachment \"{}\" added", attachment.file.file_name),
        )
        .await?;
        tracing::info!(
            task_id = %task,
            attachment_id = %attachment.id,
            size = attachment.file.size,
            "stored task attachment"
        );
        Ok(attachment)
    }

    /// Returns an attachment with its content.
    ///
    /// # Errors
    ///
    /// Requires the view permission; returns
    /// [`TaskServiceError::NotFound`] when the record or its content is
    /// missing.
    pub async fn download_attachment(
        &self,
        caller: UserId,
        task: TaskId,
        attachment_id: TaskAttachmentId,
    ) -> TaskServiceResult<(TaskAttachment, Vec<u8>)> {
        self.authorize(caller, task, Action::View).await?;
        let attachment = self.attachment_in(task, attachment_id).await?;
        let bytes = self
            .blobs
            .get(&attachment.file.storage_key)
            .await?
            .ok_or(TaskServiceError::NotFound("attachment content"))?;
        Ok((attachment, bytes))
    }

    /// Deletes an attachment and its content.
    ///
    /// # Errors
    ///
    /// Requires the edit permission unless the caller uploaded the file.
    pub async fn delete_attachment(
        &self,
        caller: UserId,
        task: TaskId,
        attachment_id: TaskAttachmentId,
    ) -> TaskServiceResult<()> {
        let grant = self.authorize(caller, task, Action::View).await?;
        let attachment = self.attachment_in(task, attachment_id).await?;
        if attachment.uploaded_by != caller {
            TASK_POLICY.authorize(Some(grant.role), Action::Edit)?;
        }
        self.tasks.delete_attachment(attachment.id).await?;
        self.release_blobs(&[attachment.file.storage_key]).await;
        Ok(())
    }

    /// Lists a task's time logs, latest day first.
    ///
    /// # Errors
    ///
    /// Requires the view permission.
    pub async fn time_logs(
        &self,
        caller: UserId,
        task: TaskId,
    ) -> TaskServiceResult<Vec<TaskTimeLog>> {
        self.authorize(caller, task, Action::View).await?;
        Ok(self.tasks.list_time_logs(task).await?)
    }

    /// Logs time against a task and refreshes its actual hours.
    ///
    /// # Errors
    ///
    /// Requires the contribute permission; returns
    /// [`TaskServiceError::Validation`] when the total would exceed the
    /// storable range.
    pub async fn log_time(
        &self,
        caller: UserId,
        task: TaskId,
        input: NewTimeLog,
    ) -> TaskServiceResult<TaskTimeLog> {
        self.authorize(caller, task, Action::Contribute).await?;
        let log = TaskTimeLog::new(
            task,
            caller,
            input.description,
            input.hours,
            input.date,
            &*self.clock,
        )?;
        let total = projected_total(self.tasks.list_time_logs(task).await?, Some(&log), None)?;
        self.tasks.save_time_log(&log).await?;
        self.sync_actual_hours(task, total).await?;
        Ok(log)
    }

    /// Changes a time log; allowed for its owner and for editors.
    ///
    /// # Errors
    ///
    /// Requires ownership of the log or the edit permission.
    pub async fn update_time_log(
        &self,
        caller: UserId,
        task: TaskId,
        log_id: TimeLogId,
        changes: TimeLogChanges,
    ) -> TaskServiceResult<TaskTimeLog> {
        let mut log = self.owned_log(caller, task, log_id).await?;
        log.apply(changes)?;
        let total = projected_total(self.tasks.list_time_logs(task).await?, Some(&log), None)?;
        self.tasks.save_time_log(&log).await?;
        self.sync_actual_hours(task, total).await?;
        Ok(log)
    }

    /// Deletes a time log; allowed for its owner and for editors.
    ///
    /// # Errors
    ///
    /// Requires ownership of the log or the edit permission.
    pub async fn delete_time_log(
        &self,
        caller: UserId,
        task: TaskId,
        log_id: TimeLogId,
    ) -> TaskServiceResult<()> {
        let log = self.owned_log(caller, task, log_id).await?;
        let total = projected_total(self.tasks.list_time_logs(task).await?, None, Some(log.id))?;
        self.tasks.delete_time_log(log.id).await?;
        self.sync_actual_hours(task, total).await?;
        Ok(())
    }

    async fn owned_log(
        &self,
        caller: UserId,
        task: TaskId,
        log_id: TimeLogId,
    ) -> TaskServiceResult<TaskTimeLog> {
        let grant = self.authorize(caller, task, Action::View).await?;
        let log = self
            .tasks
            .find_time_log(log_id)
            .await?
            .filter(|found| found.task_id == task)
            .ok_or(TaskServiceError::NotFound("time log"))?;
        if log.user != caller {
            TASK_POLICY.authorize(Some(grant.role), Action::Edit)?;
        }
        Ok(log)
    }

    async fn sync_actual_hours(&self, id: TaskId, total: Hours) -> TaskServiceResult<()> {
        let mut task = self
            .tasks
            .find_by_id(id)
            .await?
            .ok_or(TaskServiceError::NotFound("task"))?;
        task.set_actual_hours(Some(total), &*self.clock);
        self.tasks.update(&task).await?;
        Ok(())
    }

    async fn note(
        &self,
        task: TaskId,
        caller: UserId,
        action: ActivityAction,
        description: String,
    ) -> TaskServiceResult<()> {
        for activity in self.record(task, vec![ActivityEntry::note(action, description)], caller) {
            self.tasks.record_activity(&activity).await?;
        }
        Ok(())
    }

    async fn comment_in(
        &self,
        task: TaskId,
        id: TaskCommentId,
    ) -> TaskServiceResult<TaskComment> {
        self.tasks
            .find_comment(id)
            .await?
            .filter(|comment| comment.task_id == task)
            .ok_or(TaskServiceError::NotFound("comment"))
    }

    async fn attachment_in(
        &self,
        task: TaskId,
        id: TaskAttachmentId,
    ) -> TaskServiceResult<TaskAttachment> {
        self.tasks
            .find_attachment(id)
            .await?
            .filter(|attachment| attachment.task_id == task)
            .ok_or(TaskServiceError::NotFound("attachment"))
    }
}
