//! Diesel schema for projects, their team and resources, and topics.

diesel::table! {
    /// Projects.
    projects (id) {
        /// Project identifier.
        id -> Uuid,
        /// Title.
        #[max_length = 255]
        title -> Varchar,
        /// Description.
        description -> Text,
        /// Lifecycle status.
        #[max_length = 20]
        status -> Varchar,
        /// Priority.
        #[max_length = 20]
        priority -> Varchar,
        /// Owning user.
        owner_id -> Uuid,
        /// Due date.
        due_date -> Nullable<Date>,
        /// Completion percentage.
        progress -> Int2,
        /// Creation timestamp.
        created_at -> Timestamptz,
        /// Last change timestamp.
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Project memberships, unique per `(project_id, user_id)`.
    project_memberships (id) {
        /// Membership identifier.
        id -> Uuid,
        /// Project.
        project_id -> Uuid,
        /// Member.
        user_id -> Uuid,
        /// Granted role.
        #[max_length = 20]
        role -> Varchar,
        /// Creation timestamp.
        created_at -> Timestamptz,
        /// Last change timestamp.
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Files uploaded to projects.
    project_files (id) {
        /// File identifier.
        id -> Uuid,
        /// Project.
        project_id -> Uuid,
        /// Title.
        #[max_length = 200]
        title -> Varchar,
        /// Description.
        description -> Text,
        /// Original file name.
        file_name -> Text,
        /// MIME type.
        content_type -> Text,
        /// Size in bytes.
        file_size -> Int8,
        /// Blob store key.
        storage_key -> Text,
        /// SHA-256 digest.
        sha256 -> Text,
        /// Uploader.
        uploaded_by -> Uuid,
        /// Upload timestamp.
        uploaded_at -> Timestamptz,
    }
}

diesel::table! {
    /// External links shared with projects.
    project_links (id) {
        /// Link identifier.
        id -> Uuid,
        /// Project.
        project_id -> Uuid,
        /// Title.
        #[max_length = 200]
        title -> Varchar,
        /// Target URL.
        #[max_length = 200]
        url -> Varchar,
        /// Description.
        description -> Text,
        /// Author.
        created_by -> Uuid,
        /// Creation timestamp.
        created_at -> Timestamptz,
        /// Last change timestamp.
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Append-only project activity log.
    project_activities (id) {
        /// Entry identifier.
        id -> Uuid,
        /// Project.
        project_id -> Uuid,
        /// Acting user.
        user_id -> Uuid,
        /// Action label.
        #[max_length = 200]
        action -> Varchar,
        /// Detail.
        description -> Text,
        /// Entry timestamp.
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Knowledge topics, unique by title per project.
    topics (id) {
        /// Topic identifier.
        id -> Uuid,
        /// Project.
        project_id -> Uuid,
        /// Title.
        #[max_length = 200]
        title -> Varchar,
        /// Description.
        description -> Text,
        /// Display colour.
        #[max_length = 7]
        color -> Varchar,
        /// Author.
        created_by -> Uuid,
        /// Creation timestamp.
        created_at -> Timestamptz,
        /// Last change timestamp.
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Topic notes.
    topic_notes (id) {
        /// Note identifier.
        id -> Uuid,
        /// Topic.
        topic_id -> Uuid,
        /// Title.
        #[max_length = 200]
        title -> Varchar,
        /// Body.
        content -> Text,
        /// Author.
        created_by -> Uuid,
        /// Last editor.
        last_edited_by -> Nullable<Uuid>,
        /// Creation timestamp.
        created_at -> Timestamptz,
        /// Last change timestamp.
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Topic links.
    topic_links (id) {
        /// Link identifier.
        id -> Uuid,
        /// Topic.
        topic_id -> Uuid,
        /// Title.
        #[max_length = 200]
        title -> Varchar,
        /// Target URL.
        #[max_length = 200]
        url -> Varchar,
        /// Description.
        description -> Text,
        /// Classification.
        #[max_length = 20]
        link_type -> Varchar,
        /// Author.
        created_by -> Uuid,
        /// Creation timestamp.
        created_at -> Timestamptz,
        /// Last change timestamp.
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Topic media.
    topic_media (id) {
        /// Media identifier.
        id -> Uuid,
        /// Topic.
        topic_id -> Uuid,
        /// Title.
        #[max_length = 200]
        title -> Varchar,
        /// Description.
        description -> Text,
        /// Media kind.
        #[max_length = 20]
        media_type -> Varchar,
        /// Original file name.
        file_name -> Text,
        /// MIME type.
        content_type -> Text,
        /// Size in bytes.
        file_size -> Int8,
        /// Blob store key.
        storage_key -> Text,
        /// SHA-256 digest.
        sha256 -> Text,
        /// Playback length.
        duration_seconds -> Nullable<Int8>,
        /// Uploader.
        uploaded_by -> Uuid,
        /// Upload timestamp.
        uploaded_at -> Timestamptz,
    }
}

diesel::table! {
    /// Topic tags, unique by name per topic.
    topic_tags (id) {
        /// Tag identifier.
        id -> Uuid,
        /// Topic.
        topic_id -> Uuid,
        /// Name.
        #[max_length = 50]
        name -> Varchar,
        /// Display colour.
        #[max_length = 7]
        color -> Varchar,
        /// Creation timestamp.
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Threaded topic comments.
    topic_comments (id) {
        /// Comment identifier.
        id -> Uuid,
        /// Topic.
        topic_id -> Uuid,
        /// Author.
        author_id -> Uuid,
        /// Body.
        content -> Text,
        /// Parent comment for replies.
        parent_id -> Nullable<Uuid>,
        /// Creation timestamp.
        created_at -> Timestamptz,
        /// Last change timestamp.
        updated_at -> Timestamptz,
    }
}

diesel::allow_tables_to_appear_in_same_query!(
    projects,
    project_memberships,
    project_files,
    project_links,
    project_activities,
    topics,
    topic_notes,
    topic_links,
    topic_media,
    topic_tags,
    topic_comments,
);
