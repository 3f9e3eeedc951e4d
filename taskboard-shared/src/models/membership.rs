/// Project membership model and database operations
///
/// Memberships join users to projects with a role. Each (project, user) pair
/// has at most one membership, and each project has exactly one owner.
///
/// # Schema
///
/// ```sql
/// CREATE TYPE membership_role AS ENUM ('owner', 'member', 'viewer');
///
/// CREATE TABLE project_members (
///     project_id UUID NOT NULL REFERENCES projects(id) ON DELETE CASCADE,
///     user_id UUID NOT NULL REFERENCES users(id),
///     role membership_role NOT NULL DEFAULT 'member',
///     joined_at TIMESTAMPTZ NOT NULL DEFAULT clock_timestamp(),
///     PRIMARY KEY (project_id, user_id)
/// );
///
/// CREATE UNIQUE INDEX project_members_single_owner
///     ON project_members (project_id) WHERE role = 'owner';
/// ```
///
/// # Roles
///
/// - **owner**: Full control, manages members and project settings
/// - **member**: Creates and edits tasks
/// - **viewer**: Read-only access
///
/// # Example
///
/// ```no_run
/// use taskboard_shared::models::membership::{ProjectMembership, CreateMembership, MembershipRole};
/// use taskboard_shared::db::pool::{create_pool, DatabaseConfig};
/// use uuid::Uuid;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let pool = create_pool(DatabaseConfig::default()).await?;
///
/// let project_id = Uuid::new_v4();
/// let user_id = Uuid::new_v4();
///
/// ProjectMembership::create(&pool, CreateMembership {
///     project_id,
///     user_id,
///     role: MembershipRole::Member,
/// }).await?;
///
/// let membership = ProjectMembership::find(&pool, project_id, user_id).await?;
/// assert_eq!(membership.map(|m| m.role), Some(MembershipRole::Member));
/// # Ok(())
/// # }
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use super::user::User;

/// Roles a user can hold on a project
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "membership_role", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum MembershipRole {
    /// Created the project; manages members and settings
    Owner,

    /// Creates and edits tasks
    Member,

    /// Read-only access
    Viewer,
}

impl MembershipRole {
    /// Converts role to string for display
    pub fn as_str(&self) -> &'static str {
        match self {
            MembershipRole::Owner => "owner",
            MembershipRole::Member => "member",
            MembershipRole::Viewer => "viewer",
        }
    }

    /// Checks if this role has at least the permission level of `required`
    ///
    /// Hierarchy: Owner > Member > Viewer
    pub fn has_permission(&self, required: &MembershipRole) -> bool {
        self.permission_level() >= required.permission_level()
    }

    fn permission_level(&self) -> u8 {
        match self {
            MembershipRole::Owner => 3,
            MembershipRole::Member => 2,
            MembershipRole::Viewer => 1,
        }
    }
}

/// Membership row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct ProjectMembership {
    pub project_id: Uuid,

    pub user_id: Uuid,

    /// Role within the project
    pub role: MembershipRole,

    /// When the user joined the project
    pub joined_at: DateTime<Utc>,
}

/// Input for creating a membership
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateMembership {
    pub project_id: Uuid,

    pub user_id: Uuid,

    /// Role to assign (defaults to Member)
    #[serde(default = "default_role")]
    pub role: MembershipRole,
}

fn default_role() -> MembershipRole {
    MembershipRole::Member
}

/// A project's team member: the user's profile plus their project role
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct ProjectMember {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub user: User,

    /// Role within the project (the profile's `role` is the job title)
    pub project_role: MembershipRole,

    pub joined_at: DateTime<Utc>,
}

impl ProjectMembership {
    /// Adds a user to a project
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The membership already exists (`project_members_pkey`)
    /// - A second owner is added (`project_members_single_owner`)
    /// - Project or user doesn't exist (foreign key violation)
    /// - Database connection fails
    pub async fn create(pool: &PgPool, data: CreateMembership) -> Result<Self, sqlx::Error> {
        let membership = sqlx::query_as::<_, ProjectMembership>(
            r#"
            INSERT INTO project_members (project_id, user_id, role)
            VALUES ($1, $2, $3)
            RETURNING project_id, user_id, role, joined_at
            "#,
        )
        .bind(data.project_id)
        .bind(data.user_id)
        .bind(data.role)
        .fetch_one(pool)
        .await?;

        Ok(membership)
    }

    /// Finds the membership of a user in a project
    pub async fn find(
        pool: &PgPool,
        project_id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<Self>, sqlx::Error> {
        let membership = sqlx::query_as::<_, ProjectMembership>(
            r#"
            SELECT project_id, user_id, role, joined_at
            FROM project_members
            WHERE project_id = $1 AND user_id = $2
            "#,
        )
        .bind(project_id)
        .bind(user_id)
        .fetch_optional(pool)
        .await?;

        Ok(membership)
    }

    /// Lists a project's members with their profiles, in join order
    pub async fn list_members(
        pool: &PgPool,
        project_id: Uuid,
    ) -> Result<Vec<ProjectMember>, sqlx::Error> {
        let members = sqlx::query_as::<_, ProjectMember>(
            r#"
            SELECT u.id, u.email, u.first_name, u.last_name, u.role, u.department,
                   u.avatar_url, u.phone, u.location, u.bio, u.join_date, u.updated_at,
                   pm.role AS project_role, pm.joined_at
            FROM project_members pm
            JOIN users u ON u.id = pm.user_id
            WHERE pm.project_id = $1
            ORDER BY pm.joined_at ASC
            "#,
        )
        .bind(project_id)
        .fetch_all(pool)
        .await?;

        Ok(members)
    }
}
