//! Domain access layer
//!
//! CRUD over projects, memberships, tasks, comments, notifications and the
//! team directory on behalf of an explicit caller. Every operation takes the caller's [`AuthContext`] and
//! returns an [`Outcome`]:
//!
//! - `Ok(value)` on success
//! - `Empty` when a read finds nothing the caller may see
//! - `Failed(error)` when the operation was refused or the store failed
//!
//! # Visibility
//!
//! A caller sees a project, its team and its tasks only while holding a
//! membership in it. Reads of anything else come back `Empty`, exactly as if
//! the row did not exist. Writes against a project the caller cannot see fail
//! with `NotFound`; writes the caller's role does not allow fail with
//! `Forbidden`.
//!
//! | Operation                     | Required role |
//! |-------------------------------|---------------|
//! | read project, team, tasks     | viewer        |
//! | create / edit tasks, comment  | member        |
//! | edit project, add team member | owner         |
//!
//! Notifications belong to their recipient alone; anyone else's look missing.
//!
//! Failures are logged here, at the boundary, and passed on unchanged.

mod notifications;
mod projects;
mod tasks;
mod team;

use std::sync::Arc;

use tracing::warn;
use uuid::Uuid;
use validator::ValidationErrors;

use crate::auth::authorization::{require_permission, AuthzError, ResourcePermission};
use crate::auth::middleware::AuthContext;
use crate::error::StoreError;
use crate::models::membership::MembershipRole;
use crate::models::project::Project;
use crate::outcome::Outcome;
use crate::store::Store;

/// Error type for access-layer operations
#[derive(Debug, thiserror::Error)]
pub enum AccessError {
    /// The caller's role does not allow the operation
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// The target does not exist or is not visible to the caller
    #[error("Not found: {0}")]
    NotFound(String),

    /// The write would duplicate an existing row
    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationErrors),

    #[error(transparent)]
    Store(StoreError),
}

impl From<StoreError> for AccessError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Conflict(constraint) => AccessError::Conflict(constraint),
            StoreError::MissingReference(constraint) => AccessError::NotFound(format!(
                "Referenced row does not exist ({})",
                constraint
            )),
            other => AccessError::Store(other),
        }
    }
}

impl From<AuthzError> for AccessError {
    fn from(err: AuthzError) -> Self {
        match err {
            AuthzError::NotMember(project_id) => {
                AccessError::NotFound(format!("Project {} not found", project_id))
            }
            AuthzError::InsufficientRole { required, actual } => AccessError::Forbidden(format!(
                "Requires {} role, caller is {}",
                required.as_str(),
                actual.as_str()
            )),
            AuthzError::Store(e) => AccessError::from(e),
        }
    }
}

/// Access operations over a [`Store`]
#[derive(Clone)]
pub struct AccessLayer {
    store: Arc<dyn Store>,
}

impl AccessLayer {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &Arc<dyn Store> {
        &self.store
    }

    /// Caller's role in a project, or None if the caller cannot see it
    async fn visible_role(
        &self,
        caller: &AuthContext,
        project_id: Uuid,
    ) -> Result<Option<MembershipRole>, AccessError> {
        Ok(self
            .store
            .find_membership(project_id, caller.user_id)
            .await?
            .map(|m| m.role))
    }

    /// Loads a project for a write, checking the caller's permission on it
    async fn project_for_write(
        &self,
        caller: &AuthContext,
        project_id: Uuid,
        permission: ResourcePermission,
    ) -> Result<Project, AccessError> {
        let project = self
            .store
            .find_project(project_id)
            .await?
            .ok_or_else(|| AccessError::NotFound(format!("Project {} not found", project_id)))?;

        require_permission(self.store.as_ref(), caller, project_id, permission).await?;

        Ok(project)
    }
}

/// Logs a failed operation and converts the result into an [`Outcome`]
fn settle<T>(
    operation: &'static str,
    caller: &AuthContext,
    result: Result<Option<T>, AccessError>,
) -> Outcome<T> {
    if let Err(e) = &result {
        warn!(operation, user_id = %caller.user_id, error = %e, "Access operation failed");
    }
    Outcome::from(result)
}

/// Like [`settle`], with an empty list reported as `Empty`
fn settle_list<T>(
    operation: &'static str,
    caller: &AuthContext,
    result: Result<Vec<T>, AccessError>,
) -> Outcome<Vec<T>> {
    match result {
        Ok(items) => Outcome::from_vec(items),
        Err(e) => settle(operation, caller, Err(e)),
    }
}
