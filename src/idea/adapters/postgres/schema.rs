//! Diesel schema for ideas and their content.

diesel::table! {
    /// Ideas.
    ideas (id) {
        /// Idea identifier.
        id -> Uuid,
        /// Title.
        #[max_length = 200]
        title -> Varchar,
        /// Description.
        description -> Text,
        /// Problem statement.
        problem_statement -> Text,
        /// Solution overview.
        solution_overview -> Text,
        /// Target audience.
        target_audience -> Text,
        /// Market potential.
        market_potential -> Text,
        /// Revenue model.
        revenue_model -> Text,
        /// Competition analysis.
        competition_analysis -> Text,
        /// Technical requirements.
        technical_requirements -> Text,
        /// Effort estimate.
        #[max_length = 100]
        estimated_effort -> Varchar,
        /// Priority.
        #[max_length = 10]
        priority -> Varchar,
        /// Status.
        #[max_length = 20]
        status -> Varchar,
        /// Comma-separated tags.
        tags -> Text,
        /// Owning user.
        owner_id -> Uuid,
        /// Creation timestamp.
        created_at -> Timestamptz,
        /// Last change timestamp.
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Links between ideas and projects.
    idea_projects (idea_id, project_id) {
        /// Idea.
        idea_id -> Uuid,
        /// Project.
        project_id -> Uuid,
    }
}

diesel::table! {
    /// Idea collaborators, unique per `(idea_id, user_id)`.
    idea_memberships (id) {
        /// Membership identifier.
        id -> Uuid,
        /// Idea.
        idea_id -> Uuid,
        /// Collaborator.
        user_id -> Uuid,
        /// Granted role.
        #[max_length = 20]
        role -> Varchar,
        /// Inviting user.
        added_by -> Uuid,
        /// Creation timestamp.
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Idea notes.
    idea_notes (id) {
        /// Note identifier.
        id -> Uuid,
        /// Idea.
        idea_id -> Uuid,
        /// Title.
        #[max_length = 200]
        title -> Varchar,
        /// Body.
        content -> Text,
        /// Author.
        author_id -> Uuid,
        /// Creation timestamp.
        created_at -> Timestamptz,
        /// Last change timestamp.
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Idea resources.
    idea_resources (id) {
        /// Resource identifier.
        id -> Uuid,
        /// Idea.
        idea_id -> Uuid,
        /// Title.
        #[max_length = 200]
        title -> Varchar,
        /// Target URL.
        #[max_length = 200]
        url -> Varchar,
        /// Description.
        description -> Text,
        /// Resource kind.
        #[max_length = 20]
        resource_type -> Varchar,
        /// Adding user.
        added_by -> Uuid,
        /// Creation timestamp.
        created_at -> Timestamptz,
    }
}

diesel::allow_tables_to_appear_in_same_query!(
    ideas,
    idea_projects,
    idea_memberships,
    idea_notes,
    idea_resources,
);
