//! Diesel schema for migration persistence.

diesel::table! {
    /// Migration aggregates with route, lifecycle status, and pass counters.
    migrations (id) {
        /// Migration identifier.
        id -> Uuid,
        /// Source backend name.
        #[max_length = 100]
        source_backend -> Varchar,
        /// Destination backend name.
        #[max_length = 100]
        destination_backend -> Varchar,
        /// Source container identifier.
        source_project_id -> Text,
        /// Destination container identifier.
        destination_list_id -> Text,
        /// Destination workspace identifier, possibly empty.
        destination_workspace_id -> Text,
        /// Lifecycle status.
        #[max_length = 50]
        status -> Varchar,
        /// Tasks fetched for the latest pass.
        total_tasks -> Int4,
        /// Tasks created during the latest pass.
        completed_tasks -> Int4,
        /// Tasks that failed during the latest pass.
        failed_tasks -> Int4,
        /// Creation timestamp.
        created_at -> Timestamptz,
        /// Last update timestamp.
        updated_at -> Timestamptz,
        /// Terminal status timestamp.
        completed_at -> Nullable<Timestamptz>,
    }
}

diesel::table! {
    /// Discovered source values and their resolved destination values.
    migration_mappings (id) {
        /// Record identifier.
        id -> Uuid,
        /// Owning migration.
        migration_id -> Uuid,
        /// Attribute class.
        #[max_length = 20]
        kind -> Varchar,
        /// Discovered source value.
        source_value -> Text,
        /// Resolved destination value.
        destination_value -> Nullable<Text>,
        /// Resolution state.
        #[max_length = 20]
        status -> Varchar,
        /// Assignee display details.
        metadata -> Nullable<Jsonb>,
        /// Discovery timestamp.
        created_at -> Timestamptz,
        /// Latest resolution timestamp.
        updated_at -> Timestamptz,
        /// Discovery order.
        sequence -> Int8,
    }
}

diesel::table! {
    /// Append-only per-task transfer results.
    task_outcomes (id) {
        /// Entry identifier.
        id -> Uuid,
        /// Owning migration.
        migration_id -> Uuid,
        /// Source task identifier.
        source_task_id -> Text,
        /// Destination task identifier on success.
        destination_task_id -> Nullable<Text>,
        /// Transfer result.
        #[max_length = 20]
        outcome -> Varchar,
        /// Failure detail.
        error -> Nullable<Text>,
        /// Recording timestamp.
        recorded_at -> Timestamptz,
        /// Insertion order.
        sequence -> Int8,
    }
}

diesel::joinable!(migration_mappings -> migrations (migration_id));
diesel::joinable!(task_outcomes -> migrations (migration_id));
diesel::allow_tables_to_appear_in_same_query!(migrations, migration_mappings, task_outcomes);
