//! Diesel schema for tasks, lists, templates and task records.

diesel::table! {
    /// Tasks.
    tasks (id) {
        /// Task identifier.
        id -> Uuid,
        /// Title.
        #[max_length = 200]
        title -> Varchar,
        /// Description.
        description -> Text,
        /// Status.
        #[max_length = 20]
        status -> Varchar,
        /// Priority.
        #[max_length = 10]
        priority -> Varchar,
        /// Owning project.
        project_id -> Nullable<Uuid>,
        /// Owning idea.
        idea_id -> Nullable<Uuid>,
        /// Containing list.
        task_list_id -> Nullable<Uuid>,
        /// Assignee.
        assignee_id -> Nullable<Uuid>,
        /// Creator.
        created_by -> Uuid,
        /// Parent task.
        parent_task_id -> Nullable<Uuid>,
        /// Due date.
        due_date -> Nullable<Timestamptz>,
        /// Start date.
        start_date -> Nullable<Timestamptz>,
        /// Completion timestamp.
        completed_at -> Nullable<Timestamptz>,
        /// Estimate in hundredths of an hour.
        estimated_hundredths -> Nullable<Int4>,
        /// Logged time in hundredths of an hour.
        actual_hundredths -> Nullable<Int4>,
        /// Position inside the list.
        position -> Int4,
        /// Comma-separated tags.
        tags -> Text,
        /// Creation timestamp.
        created_at -> Timestamptz,
        /// Last change timestamp.
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Dependency edges: `task_id` waits on `depends_on_id`.
    task_dependencies (task_id, depends_on_id) {
        /// Waiting task.
        task_id -> Uuid,
        /// Task waited on.
        depends_on_id -> Uuid,
    }
}

diesel::table! {
    /// Task lists.
    task_lists (id) {
        /// List identifier.
        id -> Uuid,
        /// Owning project, absent for personal lists.
        project_id -> Nullable<Uuid>,
        /// Name.
        #[max_length = 200]
        name -> Varchar,
        /// Description.
        description -> Text,
        /// Ordering key.
        position -> Int4,
        /// Creator.
        created_by -> Uuid,
        /// Creation timestamp.
        created_at -> Timestamptz,
        /// Last change timestamp.
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Task history.
    task_activities (id) {
        /// Entry identifier.
        id -> Uuid,
        /// Task.
        task_id -> Uuid,
        /// Acting user.
        user_id -> Uuid,
        /// Kind of change.
        #[max_length = 20]
        action -> Varchar,
        /// Summary.
        description -> Text,
        /// Previous value.
        old_value -> Text,
        /// New value.
        new_value -> Text,
        /// Creation timestamp.
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Task comments.
    task_comments (id) {
        /// Comment identifier.
        id -> Uuid,
        /// Task.
        task_id -> Uuid,
        /// Author.
        author_id -> Uuid,
        /// Body.
        content -> Text,
        /// Comment replied to.
        parent_id -> Nullable<Uuid>,
        /// Creation timestamp.
        created_at -> Timestamptz,
        /// Last change timestamp.
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Task attachments.
    task_attachments (id) {
        /// Attachment identifier.
        id -> Uuid,
        /// Task.
        task_id -> Uuid,
        /// Original file name.
        file_name -> Text,
        /// MIME type.
        content_type -> Text,
        /// Size in bytes.
        file_size -> Int8,
        /// Blob storage key.
        storage_key -> Text,
        /// Content digest.
        sha256 -> Text,
        /// Uploader.
        uploaded_by -> Uuid,
        /// Upload timestamp.
        uploaded_at -> Timestamptz,
    }
}

diesel::table! {
    /// Time logged against tasks.
    task_time_logs (id) {
        /// Log identifier.
        id -> Uuid,
        /// Task.
        task_id -> Uuid,
        /// Logging user.
        user_id -> Uuid,
        /// What the time went on.
        description -> Text,
        /// Hours in hundredths.
        hundredths -> Int4,
        /// Day the work happened.
        work_date -> Date,
        /// Creation timestamp.
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Task templates.
    task_templates (id) {
        /// Template identifier.
        id -> Uuid,
        /// Name.
        #[max_length = 200]
        name -> Varchar,
        /// Description.
        description -> Text,
        /// Title source.
        #[max_length = 200]
        title_template -> Varchar,
        /// Description source.
        description_template -> Text,
        /// Priority.
        #[max_length = 10]
        priority -> Varchar,
        /// Estimate in hundredths of an hour.
        estimated_hundredths -> Nullable<Int4>,
        /// Comma-separated tags.
        tags -> Text,
        /// Author.
        created_by -> Uuid,
        /// Visible to everyone.
        is_public -> Bool,
        /// Creation timestamp.
        created_at -> Timestamptz,
    }
}

diesel::allow_tables_to_appear_in_same_query!(
    tasks,
    task_dependencies,
    task_lists,
    task_activities,
    task_comments,
    task_attachments,
    task_time_logs,
    task_templates,
);
