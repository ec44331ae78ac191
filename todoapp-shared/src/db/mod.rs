/// Database utilities
///
/// - [`pool`]: PostgreSQL connection pool creation and health checks
/// - [`migrations`]: Applies the bundled schema on startup

pub mod migrations;
pub mod pool;
