//! In-memory store
//!
//! All tables live behind a single [`RwLock`], so every write (including
//! project creation with its memberships) is applied atomically. Constraint
//! violations are reported with the same [`StoreError`] variants and
//! constraint names the PostgreSQL schema produces.

use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

use super::Store;
use crate::error::{StoreError, StoreResult};
use crate::models::comment::{CreateComment, TaskComment};
use crate::models::membership::{
    CreateMembership, MembershipRole, ProjectMember, ProjectMembership,
};
use crate::models::notification::{CreateNotification, Notification};
use crate::models::project::{CreateProject, Project, ProjectStatus, UpdateProject};
use crate::models::session::Session;
use crate::models::task::{CreateTask, Task, TaskStatus, UpdateTask};
use crate::models::user::{CreateCredential, CreateProfile, Credential, UpdateProfile, User};

/// Rows are kept in insertion order.
#[derive(Debug, Default)]
struct Tables {
    credentials: Vec<Credential>,
    users: Vec<User>,
    sessions: Vec<Session>,
    projects: Vec<Project>,
    memberships: Vec<ProjectMembership>,
    tasks: Vec<Task>,
    comments: Vec<TaskComment>,
    notifications: Vec<Notification>,
}

impl Tables {
    fn credential_exists(&self, id: Uuid) -> bool {
        self.credentials.iter().any(|c| c.id == id)
    }

    fn user_exists(&self, id: Uuid) -> bool {
        self.users.iter().any(|u| u.id == id)
    }

    fn project_exists(&self, id: Uuid) -> bool {
        self.projects.iter().any(|p| p.id == id)
    }

    fn user(&self, id: Uuid) -> Option<&User> {
        self.users.iter().find(|u| u.id == id)
    }

    fn require_user(&self, id: Uuid, constraint: &str) -> StoreResult<()> {
        if self.user_exists(id) {
            Ok(())
        } else {
            Err(StoreError::MissingReference(constraint.to_string()))
        }
    }

    /// Validates a membership insert against the primary key and single-owner index
    fn check_membership(&self, data: &CreateMembership) -> StoreResult<()> {
        if !self.project_exists(data.project_id) {
            return Err(StoreError::MissingReference(
                "project_members_project_id_fkey".to_string(),
            ));
        }
        self.require_user(data.user_id, "project_members_user_id_fkey")?;

        if self
            .memberships
            .iter()
            .any(|m| m.project_id == data.project_id && m.user_id == data.user_id)
        {
            return Err(StoreError::Conflict("project_members_pkey".to_string()));
        }

        if data.role == MembershipRole::Owner
            && self
                .memberships
                .iter()
                .any(|m| m.project_id == data.project_id && m.role == MembershipRole::Owner)
        {
            return Err(StoreError::Conflict(
                "project_members_single_owner".to_string(),
            ));
        }

        Ok(())
    }
}

/// [`Store`] keeping every table in process memory
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
    fail_profile_inserts: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every subsequent profile insert fail with a backend error
    ///
    /// Used to exercise sign-up compensation.
    pub fn fail_profile_inserts(&self, fail: bool) {
        self.fail_profile_inserts.store(fail, Ordering::SeqCst);
    }

    /// Number of stored credentials
    pub async fn credential_count(&self) -> usize {
        self.tables.read().await.credentials.len()
    }

    /// Number of stored projects
    pub async fn project_count(&self) -> usize {
        self.tables.read().await.projects.len()
    }

    /// Number of stored memberships across all projects
    pub async fn membership_count(&self) -> usize {
        self.tables.read().await.memberships.len()
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn ping(&self) -> StoreResult<()> {
        Ok(())
    }

    async fn create_credential(&self, data: CreateCredential) -> StoreResult<Credential> {
        let mut tables = self.tables.write().await;

        if tables.credentials.iter().any(|c| c.email == data.email) {
            return Err(StoreError::Conflict("credentials_email_key".to_string()));
        }

        let credential = Credential {
            id: Uuid::new_v4(),
            email: data.email,
            password_hash: data.password_hash,
            created_at: Utc::now(),
        };
        tables.credentials.push(credential.clone());

        Ok(credential)
    }

    async fn find_credential_by_email(&self, email: &str) -> StoreResult<Option<Credential>> {
        let tables = self.tables.read().await;
        Ok(tables.credentials.iter().find(|c| c.email == email).cloned())
    }

    async fn find_credential(&self, id: Uuid) -> StoreResult<Option<Credential>> {
        let tables = self.tables.read().await;
        Ok(tables.credentials.iter().find(|c| c.id == id).cloned())
    }

    async fn update_password_hash(&self, id: Uuid, password_hash: &str) -> StoreResult<bool> {
        let mut tables = self.tables.write().await;

        match tables.credentials.iter_mut().find(|c| c.id == id) {
            Some(credential) => {
                credential.password_hash = password_hash.to_string();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete_credential(&self, id: Uuid) -> StoreResult<bool> {
        let mut tables = self.tables.write().await;

        let before = tables.credentials.len();
        tables.credentials.retain(|c| c.id != id);
        let removed = tables.credentials.len() < before;

        // ON DELETE CASCADE
        if removed {
            tables.users.retain(|u| u.id != id);
            tables.sessions.retain(|s| s.user_id != id);
        }

        Ok(removed)
    }

    async fn create_profile(&self, data: CreateProfile) -> StoreResult<User> {
        if self.fail_profile_inserts.load(Ordering::SeqCst) {
            return Err(StoreError::Backend("profile insert rejected".to_string()));
        }

        let mut tables = self.tables.write().await;

        if !tables.credential_exists(data.id) {
            return Err(StoreError::MissingReference("users_id_fkey".to_string()));
        }
        if tables.user_exists(data.id) {
            return Err(StoreError::Conflict("users_pkey".to_string()));
        }
        if tables.users.iter().any(|u| u.email == data.email) {
            return Err(StoreError::Conflict("users_email_key".to_string()));
        }

        let now = Utc::now();
        let user = User {
            id: data.id,
            email: data.email,
            first_name: data.first_name,
            last_name: data.last_name,
            role: data.role,
            department: data.department,
            avatar_url: None,
            phone: None,
            location: None,
            bio: None,
            join_date: now,
            updated_at: now,
        };
        tables.users.push(user.clone());

        Ok(user)
    }

    async fn find_user(&self, id: Uuid) -> StoreResult<Option<User>> {
        Ok(self.tables.read().await.user(id).cloned())
    }

    async fn list_users(&self) -> StoreResult<Vec<User>> {
        let mut users = self.tables.read().await.users.clone();
        users.sort_by(|a, b| {
            a.first_name
                .cmp(&b.first_name)
                .then_with(|| a.last_name.cmp(&b.last_name))
        });
        Ok(users)
    }

    async fn update_profile(&self, id: Uuid, data: UpdateProfile) -> StoreResult<Option<User>> {
        let mut tables = self.tables.write().await;

        Ok(tables.users.iter_mut().find(|u| u.id == id).map(|user| {
            data.apply_to(user);
            user.clone()
        }))
    }

    async fn create_session(
        &self,
        user_id: Uuid,
        expires_at: DateTime<Utc>,
    ) -> StoreResult<Session> {
        let mut tables = self.tables.write().await;

        if !tables.credential_exists(user_id) {
            return Err(StoreError::MissingReference(
                "sessions_user_id_fkey".to_string(),
            ));
        }

        let session = Session {
            id: Uuid::new_v4(),
            user_id,
            created_at: Utc::now(),
            expires_at,
            revoked_at: None,
        };
        tables.sessions.push(session.clone());

        Ok(session)
    }

    async fn find_session(&self, id: Uuid) -> StoreResult<Option<Session>> {
        let tables = self.tables.read().await;
        Ok(tables.sessions.iter().find(|s| s.id == id).cloned())
    }

    async fn revoke_session(&self, id: Uuid) -> StoreResult<bool> {
        let mut tables = self.tables.write().await;

        match tables
            .sessions
            .iter_mut()
            .find(|s| s.id == id && s.revoked_at.is_none())
        {
            Some(session) => {
                session.revoked_at = Some(Utc::now());
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn create_project(&self, data: CreateProject) -> StoreResult<Project> {
        let mut tables = self.tables.write().await;

        // Validate every row before touching the tables so a failure leaves nothing behind
        tables.require_user(data.owner_id, "projects_owner_id_fkey")?;
        for (i, member_id) in data.member_ids.iter().enumerate() {
            tables.require_user(*member_id, "project_members_user_id_fkey")?;
            if *member_id == data.owner_id || data.member_ids[..i].contains(member_id) {
                return Err(StoreError::Conflict("project_members_pkey".to_string()));
            }
        }

        let now = Utc::now();
        let project = Project {
            id: Uuid::new_v4(),
            name: data.name,
            description: data.description,
            status: ProjectStatus::Active,
            due_date: data.due_date,
            color: data.color,
            owner_id: data.owner_id,
            created_at: now,
            updated_at: now,
        };

        tables.projects.push(project.clone());
        tables.memberships.push(ProjectMembership {
            project_id: project.id,
            user_id: data.owner_id,
            role: MembershipRole::Owner,
            joined_at: now,
        });
        for member_id in data.member_ids {
            tables.memberships.push(ProjectMembership {
                project_id: project.id,
                user_id: member_id,
                role: MembershipRole::Member,
                joined_at: now,
            });
        }

        Ok(project)
    }

    async fn find_project(&self, id: Uuid) -> StoreResult<Option<Project>> {
        let tables = self.tables.read().await;
        Ok(tables.projects.iter().find(|p| p.id == id).cloned())
    }

    async fn list_projects_for_member(&self, user_id: Uuid) -> StoreResult<Vec<Project>> {
        let tables = self.tables.read().await;

        Ok(tables
            .projects
            .iter()
            .rev()
            .filter(|p| {
                tables
                    .memberships
                    .iter()
                    .any(|m| m.project_id == p.id && m.user_id == user_id)
            })
            .cloned()
            .collect())
    }

    async fn update_project(&self, id: Uuid, data: UpdateProject) -> StoreResult<Option<Project>> {
        let mut tables = self.tables.write().await;

        Ok(tables.projects.iter_mut().find(|p| p.id == id).map(|project| {
            data.apply_to(project);
            project.clone()
        }))
    }

    async fn create_membership(&self, data: CreateMembership) -> StoreResult<ProjectMembership> {
        let mut tables = self.tables.write().await;

        tables.check_membership(&data)?;

        let membership = ProjectMembership {
            project_id: data.project_id,
            user_id: data.user_id,
            role: data.role,
            joined_at: Utc::now(),
        };
        tables.memberships.push(membership.clone());

        Ok(membership)
    }

    async fn find_membership(
        &self,
        project_id: Uuid,
        user_id: Uuid,
    ) -> StoreResult<Option<ProjectMembership>> {
        let tables = self.tables.read().await;
        Ok(tables
            .memberships
            .iter()
            .find(|m| m.project_id == project_id && m.user_id == user_id)
            .cloned())
    }

    async fn list_project_members(&self, project_id: Uuid) -> StoreResult<Vec<ProjectMember>> {
        let tables = self.tables.read().await;

        Ok(tables
            .memberships
            .iter()
            .filter(|m| m.project_id == project_id)
            .filter_map(|m| {
                tables.user(m.user_id).map(|user| ProjectMember {
                    user: user.clone(),
                    project_role: m.role,
                    joined_at: m.joined_at,
                })
            })
            .collect())
    }

    async fn create_task(&self, data: CreateTask) -> StoreResult<Task> {
        let mut tables = self.tables.write().await;

        if !tables.project_exists(data.project_id) {
            return Err(StoreError::MissingReference(
                "tasks_project_id_fkey".to_string(),
            ));
        }
        tables.require_user(data.assignee_id, "tasks_assignee_id_fkey")?;

        let now = Utc::now();
        let task = Task {
            id: Uuid::new_v4(),
            name: data.name,
            description: data.description,
            status: TaskStatus::Todo,
            priority: data.priority,
            assignee_id: data.assignee_id,
            project_id: data.project_id,
            due_date: data.due_date,
            created_at: now,
            updated_at: now,
        };
        tables.tasks.push(task.clone());

        Ok(task)
    }

    async fn find_task(&self, id: Uuid) -> StoreResult<Option<Task>> {
        let tables = self.tables.read().await;
        Ok(tables.tasks.iter().find(|t| t.id == id).cloned())
    }

    async fn list_tasks_by_project(&self, project_id: Uuid) -> StoreResult<Vec<Task>> {
        let tables = self.tables.read().await;
        Ok(tables
            .tasks
            .iter()
            .rev()
            .filter(|t| t.project_id == project_id)
            .cloned()
            .collect())
    }

    async fn list_tasks_by_assignee(&self, assignee_id: Uuid) -> StoreResult<Vec<Task>> {
        let tables = self.tables.read().await;

        // Newest first among equal due dates, matching the SQL ordering
        let mut tasks: Vec<Task> = tables
            .tasks
            .iter()
            .rev()
            .filter(|t| t.assignee_id == assignee_id)
            .cloned()
            .collect();
        tasks.sort_by_key(|t| t.due_date);

        Ok(tasks)
    }

    async fn update_task(&self, id: Uuid, data: UpdateTask) -> StoreResult<Option<Task>> {
        let mut tables = self.tables.write().await;

        if let Some(assignee_id) = data.assignee_id {
            tables.require_user(assignee_id, "tasks_assignee_id_fkey")?;
        }

        Ok(tables.tasks.iter_mut().find(|t| t.id == id).map(|task| {
            data.apply_to(task);
            task.clone()
        }))
    }

    async fn create_comment(&self, data: CreateComment) -> StoreResult<TaskComment> {
        let mut tables = self.tables.write().await;

        if !tables.tasks.iter().any(|t| t.id == data.task_id) {
            return Err(StoreError::MissingReference(
                "task_comments_task_id_fkey".to_string(),
            ));
        }
        let author_name = tables
            .user(data.author_id)
            .map(User::full_name)
            .ok_or_else(|| {
                StoreError::MissingReference("task_comments_author_id_fkey".to_string())
            })?;

        let comment = TaskComment {
            id: Uuid::new_v4(),
            task_id: data.task_id,
            author_id: data.author_id,
            author_name,
            content: data.content,
            created_at: Utc::now(),
        };
        tables.comments.push(comment.clone());

        Ok(comment)
    }

    async fn list_comments(&self, task_id: Uuid) -> StoreResult<Vec<TaskComment>> {
        let tables = self.tables.read().await;
        Ok(tables
            .comments
            .iter()
            .filter(|c| c.task_id == task_id)
            .cloned()
            .collect())
    }

    async fn create_notification(&self, data: CreateNotification) -> StoreResult<Notification> {
        let mut tables = self.tables.write().await;

        tables.require_user(data.user_id, "notifications_user_id_fkey")?;

        let notification = Notification {
            id: Uuid::new_v4(),
            user_id: data.user_id,
            kind: data.kind,
            title: data.title,
            message: data.message,
            read: false,
            priority: data.priority,
            action_url: data.action_url,
            created_at: Utc::now(),
        };
        tables.notifications.push(notification.clone());

        Ok(notification)
    }

    async fn list_notifications(&self, user_id: Uuid) -> StoreResult<Vec<Notification>> {
        let tables = self.tables.read().await;
        Ok(tables
            .notifications
            .iter()
            .rev()
            .filter(|n| n.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn mark_notification_read(
        &self,
        user_id: Uuid,
        id: Uuid,
    ) -> StoreResult<Option<Notification>> {
        let mut tables = self.tables.write().await;

        Ok(tables
            .notifications
            .iter_mut()
            .find(|n| n.id == id && n.user_id == user_id)
            .map(|n| {
                n.read = true;
                n.clone()
            }))
    }

    async fn mark_all_notifications_read(&self, user_id: Uuid) -> StoreResult<u64> {
        let mut tables = self.tables.write().await;

        let mut updated = 0;
        for n in tables
            .notifications
            .iter_mut()
            .filter(|n| n.user_id == user_id && !n.read)
        {
            n.read = true;
            updated += 1;
        }

        Ok(updated)
    }

    async fn delete_notification(
        &self,
        user_id: Uuid,
        id: Uuid,
    ) -> StoreResult<Option<Notification>> {
        let mut tables = self.tables.write().await;

        let position = tables
            .notifications
            .iter()
            .position(|n| n.id == id && n.user_id == user_id);

        Ok(position.map(|i| tables.notifications.remove(i)))
    }
}
