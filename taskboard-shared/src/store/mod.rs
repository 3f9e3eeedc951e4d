//! Storage abstraction
//!
//! The identity service and access layer never talk to sqlx directly; they go
//! through [`Store`], which has a PostgreSQL backend ([`PgStore`]) for
//! production and an in-memory backend ([`MemoryStore`]) for tests and local
//! development. Both enforce the same constraints:
//!
//! - credential and profile emails are unique
//! - a profile, session, membership, comment or notification must reference
//!   existing rows
//! - one membership per (project, user), one owner per project
//! - project creation with its memberships is all-or-nothing
//!
//! Listing methods return rows in the order the caller shows them
//! (projects, project tasks and notifications newest first, team by first
//! name, members in join order, comments oldest first).

pub mod memory;
pub mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgStore;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::error::StoreResult;
use crate::models::comment::{CreateComment, TaskComment};
use crate::models::membership::{CreateMembership, ProjectMember, ProjectMembership};
use crate::models::notification::{CreateNotification, Notification};
use crate::models::project::{CreateProject, Project, UpdateProject};
use crate::models::session::Session;
use crate::models::task::{CreateTask, Task, UpdateTask};
use crate::models::user::{CreateCredential, CreateProfile, Credential, UpdateProfile, User};

#[async_trait]
pub trait Store: Send + Sync {
    /// Checks the backend is reachable
    async fn ping(&self) -> StoreResult<()>;

    // Credentials

    async fn create_credential(&self, data: CreateCredential) -> StoreResult<Credential>;

    /// Looks up a credential by its (already normalized) email
    async fn find_credential_by_email(&self, email: &str) -> StoreResult<Option<Credential>>;

    async fn find_credential(&self, id: Uuid) -> StoreResult<Option<Credential>>;

    /// Replaces a credential's password hash; returns false if it doesn't exist
    async fn update_password_hash(&self, id: Uuid, password_hash: &str) -> StoreResult<bool>;

    /// Deletes a credential; returns whether a row was removed
    async fn delete_credential(&self, id: Uuid) -> StoreResult<bool>;

    // Profiles

    async fn create_profile(&self, data: CreateProfile) -> StoreResult<User>;

    async fn find_user(&self, id: Uuid) -> StoreResult<Option<User>>;

    /// Every profile, ordered by first name
    async fn list_users(&self) -> StoreResult<Vec<User>>;

    async fn update_profile(&self, id: Uuid, data: UpdateProfile) -> StoreResult<Option<User>>;

    // Sessions

    async fn create_session(&self, user_id: Uuid, expires_at: DateTime<Utc>)
        -> StoreResult<Session>;

    async fn find_session(&self, id: Uuid) -> StoreResult<Option<Session>>;

    /// Marks a session revoked; returns false if it was missing or already revoked
    async fn revoke_session(&self, id: Uuid) -> StoreResult<bool>;

    // Projects

    /// Inserts the project, the owner membership and one member membership
    /// per `member_ids` entry atomically
    async fn create_project(&self, data: CreateProject) -> StoreResult<Project>;

    async fn find_project(&self, id: Uuid) -> StoreResult<Option<Project>>;

    /// Projects the user holds a membership in, newest first
    async fn list_projects_for_member(&self, user_id: Uuid) -> StoreResult<Vec<Project>>;

    async fn update_project(&self, id: Uuid, data: UpdateProject) -> StoreResult<Option<Project>>;

    // Memberships

    async fn create_membership(&self, data: CreateMembership) -> StoreResult<ProjectMembership>;

    async fn find_membership(
        &self,
        project_id: Uuid,
        user_id: Uuid,
    ) -> StoreResult<Option<ProjectMembership>>;

    /// Members with their profiles, in join order
    async fn list_project_members(&self, project_id: Uuid) -> StoreResult<Vec<ProjectMember>>;

    // Tasks

    async fn create_task(&self, data: CreateTask) -> StoreResult<Task>;

    async fn find_task(&self, id: Uuid) -> StoreResult<Option<Task>>;

    /// A project's tasks, newest first
    async fn list_tasks_by_project(&self, project_id: Uuid) -> StoreResult<Vec<Task>>;

    /// Tasks assigned to a user, soonest due first
    async fn list_tasks_by_assignee(&self, assignee_id: Uuid) -> StoreResult<Vec<Task>>;

    async fn update_task(&self, id: Uuid, data: UpdateTask) -> StoreResult<Option<Task>>;

    // Comments

    async fn create_comment(&self, data: CreateComment) -> StoreResult<TaskComment>;

    /// A task's comments, oldest first
    async fn list_comments(&self, task_id: Uuid) -> StoreResult<Vec<TaskComment>>;

    // Notifications

    async fn create_notification(&self, data: CreateNotification) -> StoreResult<Notification>;

    /// The user's feed, newest first
    async fn list_notifications(&self, user_id: Uuid) -> StoreResult<Vec<Notification>>;

    /// Marks one of the user's notifications read; None if it isn't theirs
    async fn mark_notification_read(
        &self,
        user_id: Uuid,
        id: Uuid,
    ) -> StoreResult<Option<Notification>>;

    /// Marks all of the user's notifications read; returns how many were unread
    async fn mark_all_notifications_read(&self, user_id: Uuid) -> StoreResult<u64>;

    /// Removes one of the user's notifications; None if it isn't theirs
    async fn delete_notification(&self, user_id: Uuid, id: Uuid)
        -> StoreResult<Option<Notification>>;
}
