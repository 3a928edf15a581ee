//! Embedded SQL migrations.

use diesel::connection::SimpleConnection;
use diesel::pg::PgConnection;
use diesel::result::Error as DieselError;

/// Ordered `(name, up.sql)` pairs applied at start-up.
pub const MIGRATIONS: &[(&str, &str)] = &[
    (
        "2026-01-10-000000_create_accounts",
        include_str!("../../migrations/2026-01-10-000000_create_accounts/up.sql"),
    ),
    (
        "2026-01-10-000001_create_projects",
        include_str!("../../migrations/2026-01-10-000001_create_projects/up.sql"),
    ),
    (
        "2026-01-10-000002_create_ideas",
        include_str!("../../migrations/2026-01-10-000002_create_ideas/up.sql"),
    ),
    (
        "2026-01-10-000003_create_tasks",
        include_str!("../../migrations/2026-01-10-000003_create_tasks/up.sql"),
    ),
];

/// Applies every migration in order.
///
/// Each script is idempotent (`IF NOT EXISTS`), so re-running on an
/// up-to-date database is a no-op.
///
/// # Errors
///
/// Returns the first [`DieselError`] raised by a script.
pub fn apply_migrations(connection: &mut PgConnection) -> Result<(), DieselError> {
    for (name, script) in MIGRATIONS {
        tracing::debug!(migration = name, "applying migration");
        connection.batch_execute(script)?;
    }
    Ok(())
}
