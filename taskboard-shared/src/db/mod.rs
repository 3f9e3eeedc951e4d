/// Database layer for Taskboard
///
/// # Modules
///
/// - `pool`: PostgreSQL connection pool with health checks
/// - `migrations`: Embedded migration runner
///
/// Row types and their queries live in [`crate::models`]; the
/// [`crate::store::PgStore`] backend ties the two together.

pub mod migrations;
pub mod pool;
