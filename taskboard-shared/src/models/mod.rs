/// Database models for Taskboard
///
/// This module contains the row types, request types and the sqlx queries the
/// Postgres store is built from.
///
/// # Models
///
/// - `user`: Credentials and user profiles
/// - `session`: Sign-in sessions referenced by issued tokens
/// - `project`: Projects and their expanded details
/// - `membership`: User-project relationships with roles
/// - `task`: Tasks under a project
/// - `comment`: Discussion on a task
/// - `notification`: Per-user notification feed
/// - `team_member`: Team directory entries
///
/// # Example
///
/// ```no_run
/// use taskboard_shared::models::user::User;
/// use taskboard_shared::db::pool::{create_pool, DatabaseConfig};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let pool = create_pool(DatabaseConfig::default()).await?;
///
/// let team = User::list_by_first_name(&pool).await?;
/// # Ok(())
/// # }
/// ```

pub mod comment;
pub mod membership;
pub mod notification;
pub mod project;
pub mod session;
pub mod task;
pub mod team_member;
pub mod user;
