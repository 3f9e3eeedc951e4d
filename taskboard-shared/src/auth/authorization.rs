/// Project-level authorization checks
///
/// Permissions are derived from the caller's membership role in the project:
///
/// | Permission | Minimum role | Grants                                 |
/// |------------|--------------|----------------------------------------|
/// | `Read`     | viewer       | see the project, its team and tasks    |
/// | `Write`    | member       | create and edit tasks                  |
/// | `Manage`   | owner        | edit project settings, add members     |
///
/// # Example
///
/// ```no_run
/// use taskboard_shared::auth::authorization::{require_permission, ResourcePermission};
/// use taskboard_shared::auth::middleware::AuthContext;
/// use taskboard_shared::store::Store;
/// use uuid::Uuid;
///
/// async fn check(store: &dyn Store, auth: &AuthContext, project_id: Uuid) -> Result<(), Box<dyn std::error::Error>> {
///     require_permission(store, auth, project_id, ResourcePermission::Write).await?;
///     Ok(())
/// }
/// ```

use uuid::Uuid;

use super::middleware::AuthContext;
use crate::error::StoreError;
use crate::models::membership::MembershipRole;
use crate::store::Store;

/// Error type for authorization checks
#[derive(Debug, thiserror::Error)]
pub enum AuthzError {
    /// Caller has no membership in the project
    #[error("Not a member of project {0}")]
    NotMember(Uuid),

    #[error("Insufficient permissions: requires {required:?}, has {actual:?}")]
    InsufficientRole {
        required: MembershipRole,
        actual: MembershipRole,
    },

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Permission types for authorization checks
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourcePermission {
    Read,
    Write,
    Manage,
}

impl ResourcePermission {
    /// Gets the minimum role required for this permission
    pub fn min_role(&self) -> MembershipRole {
        match self {
            ResourcePermission::Read => MembershipRole::Viewer,
            ResourcePermission::Write => MembershipRole::Member,
            ResourcePermission::Manage => MembershipRole::Owner,
        }
    }
}

/// Checks that a user holds at least `required_role` in a project
///
/// # Returns
///
/// The user's actual role
///
/// # Errors
///
/// Returns error if:
/// - User is not a member (`NotMember`)
/// - User's role is insufficient (`InsufficientRole`)
/// - The membership lookup fails
pub async fn require_project_role(
    store: &dyn Store,
    project_id: Uuid,
    user_id: Uuid,
    required_role: MembershipRole,
) -> Result<MembershipRole, AuthzError> {
    let role = store
        .find_membership(project_id, user_id)
        .await?
        .map(|m| m.role)
        .ok_or(AuthzError::NotMember(project_id))?;

    check_role(role, required_role)?;

    Ok(role)
}

/// Checks the caller has `permission` on a project
pub async fn require_permission(
    store: &dyn Store,
    auth: &AuthContext,
    project_id: Uuid,
    permission: ResourcePermission,
) -> Result<MembershipRole, AuthzError> {
    require_project_role(store, project_id, auth.user_id, permission.min_role()).await
}

fn check_role(actual: MembershipRole, required: MembershipRole) -> Result<(), AuthzError> {
    if actual.has_permission(&required) {
        Ok(())
    } else {
        Err(AuthzError::InsufficientRole { required, actual })
    }
}
