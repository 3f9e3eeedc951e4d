//! PostgreSQL store backed by the model queries

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use super::Store;
use crate::db::pool::health_check;
use crate::error::StoreResult;
use crate::models::comment::{CreateComment, TaskComment};
use crate::models::membership::{CreateMembership, ProjectMember, ProjectMembership};
use crate::models::notification::{CreateNotification, Notification};
use crate::models::project::{CreateProject, Project, UpdateProject};
use crate::models::session::Session;
use crate::models::task::{CreateTask, Task, UpdateTask};
use crate::models::user::{CreateCredential, CreateProfile, Credential, UpdateProfile, User};

/// [`Store`] over a sqlx connection pool
#[derive(Debug, Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl Store for PgStore {
    async fn ping(&self) -> StoreResult<()> {
        Ok(health_check(&self.pool).await?)
    }

    async fn create_credential(&self, data: CreateCredential) -> StoreResult<Credential> {
        Ok(Credential::create(&self.pool, data).await?)
    }

    async fn find_credential_by_email(&self, email: &str) -> StoreResult<Option<Credential>> {
        Ok(Credential::find_by_email(&self.pool, email).await?)
    }

    async fn find_credential(&self, id: Uuid) -> StoreResult<Option<Credential>> {
        Ok(Credential::find_by_id(&self.pool, id).await?)
    }

    async fn update_password_hash(&self, id: Uuid, password_hash: &str) -> StoreResult<bool> {
        Ok(Credential::update_password_hash(&self.pool, id, password_hash).await?)
    }

    async fn delete_credential(&self, id: Uuid) -> StoreResult<bool> {
        Ok(Credential::delete(&self.pool, id).await?)
    }

    async fn create_profile(&self, data: CreateProfile) -> StoreResult<User> {
        Ok(User::create(&self.pool, data).await?)
    }

    async fn find_user(&self, id: Uuid) -> StoreResult<Option<User>> {
        Ok(User::find_by_id(&self.pool, id).await?)
    }

    async fn list_users(&self) -> StoreResult<Vec<User>> {
        Ok(User::list_by_first_name(&self.pool).await?)
    }

    async fn update_profile(&self, id: Uuid, data: UpdateProfile) -> StoreResult<Option<User>> {
        Ok(User::update(&self.pool, id, data).await?)
    }

    async fn create_session(
        &self,
        user_id: Uuid,
        expires_at: DateTime<Utc>,
    ) -> StoreResult<Session> {
        Ok(Session::create(&self.pool, user_id, expires_at).await?)
    }

    async fn find_session(&self, id: Uuid) -> StoreResult<Option<Session>> {
        Ok(Session::find_by_id(&self.pool, id).await?)
    }

    async fn revoke_session(&self, id: Uuid) -> StoreResult<bool> {
        Ok(Session::revoke(&self.pool, id).await?)
    }

    async fn create_project(&self, data: CreateProject) -> StoreResult<Project> {
        Ok(Project::create_with_members(&self.pool, data).await?)
    }

    async fn find_project(&self, id: Uuid) -> StoreResult<Option<Project>> {
        Ok(Project::find_by_id(&self.pool, id).await?)
    }

    async fn list_projects_for_member(&self, user_id: Uuid) -> StoreResult<Vec<Project>> {
        Ok(Project::list_for_member(&self.pool, user_id).await?)
    }

    async fn update_project(&self, id: Uuid, data: UpdateProject) -> StoreResult<Option<Project>> {
        Ok(Project::update(&self.pool, id, data).await?)
    }

    async fn create_membership(&self, data: CreateMembership) -> StoreResult<ProjectMembership> {
        Ok(ProjectMembership::create(&self.pool, data).await?)
    }

    async fn find_membership(
        &self,
        project_id: Uuid,
        user_id: Uuid,
    ) -> StoreResult<Option<ProjectMembership>> {
        Ok(ProjectMembership::find(&self.pool, project_id, user_id).await?)
    }

    async fn list_project_members(&self, project_id: Uuid) -> StoreResult<Vec<ProjectMember>> {
        Ok(ProjectMembership::list_members(&self.pool, project_id).await?)
    }

    async fn create_task(&self, data: CreateTask) -> StoreResult<Task> {
        Ok(Task::create(&self.pool, data).await?)
    }

    async fn find_task(&self, id: Uuid) -> StoreResult<Option<Task>> {
        Ok(Task::find_by_id(&self.pool, id).await?)
    }

    async fn list_tasks_by_project(&self, project_id: Uuid) -> StoreResult<Vec<Task>> {
        Ok(Task::list_by_project(&self.pool, project_id).await?)
    }

    async fn list_tasks_by_assignee(&self, assignee_id: Uuid) -> StoreResult<Vec<Task>> {
        Ok(Task::list_by_assignee(&self.pool, assignee_id).await?)
    }

    async fn update_task(&self, id: Uuid, data: UpdateTask) -> StoreResult<Option<Task>> {
        Ok(Task::update(&self.pool, id, data).await?)
    }

    async fn create_comment(&self, data: CreateComment) -> StoreResult<TaskComment> {
        Ok(TaskComment::create(&self.pool, data).await?)
    }

    async fn list_comments(&self, task_id: Uuid) -> StoreResult<Vec<TaskComment>> {
        Ok(TaskComment::list_by_task(&self.pool, task_id).await?)
    }

    async fn create_notification(&self, data: CreateNotification) -> StoreResult<Notification> {
        Ok(Notification::create(&self.pool, data).await?)
    }

    async fn list_notifications(&self, user_id: Uuid) -> StoreResult<Vec<Notification>> {
        Ok(Notification::list_for_user(&self.pool, user_id).await?)
    }

    async fn mark_notification_read(
        &self,
        user_id: Uuid,
        id: Uuid,
    ) -> StoreResult<Option<Notification>> {
        Ok(Notification::mark_read(&self.pool, user_id, id).await?)
    }

    async fn mark_all_notifications_read(&self, user_id: Uuid) -> StoreResult<u64> {
        Ok(Notification::mark_all_read(&self.pool, user_id).await?)
    }

    async fn delete_notification(
        &self,
        user_id: Uuid,
        id: Uuid,
    ) -> StoreResult<Option<Notification>> {
        Ok(Notification::delete(&self.pool, user_id, id).await?)
    }
}
