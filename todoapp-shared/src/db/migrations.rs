/// Schema bootstrap
///
/// The SQL files under the workspace `migrations/` directory are embedded at
/// compile time and applied on startup. They create the `roles`,
/// `permissions`, `role_permissions`, `users` and `todos` tables and seed the
/// built-in roles and their permissions.
///
/// # Example
///
/// ```no_run
/// use todoapp_shared::db::pool::{create_pool, DatabaseConfig};
/// use todoapp_shared::db::migrations::run_migrations;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let pool = create_pool(DatabaseConfig {
///     url: std::env::var("DATABASE_URL")?,
///     ..Default::default()
/// }).await?;
///
/// run_migrations(&pool).await?;
/// # Ok(())
/// # }
/// ```

use sqlx::migrate::{MigrateError, Migrator};
use sqlx::postgres::PgPool;
use tracing::{info, warn};

static MIGRATOR: Migrator = sqlx::migrate!("../migrations");

/// Applies every pending migration
///
/// # Errors
///
/// Returns an error if a migration fails to execute or an applied
/// migration no longer matches its file
pub async fn run_migrations(pool: &PgPool) -> Result<(), MigrateError> {
    info!(
        embedded = MIGRATOR.iter().count(),
        "Applying database migrations"
    );

    match MIGRATOR.run(pool).await {
        Ok(()) => {
            info!("Database schema is up to date");
            Ok(())
        }
        Err(e) => {
            warn!(error = %e, "Migration failed");
            Err(e)
        }
    }
}
