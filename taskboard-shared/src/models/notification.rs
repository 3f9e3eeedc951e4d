/// Notification model and database operations
///
/// Each user has a private feed. Entries are written when something happens
/// to the user (a task assigned to them, being added to a project) and are
/// only ever read, marked read or deleted by that user.
///
/// # Schema
///
/// ```sql
/// CREATE TYPE notification_type AS ENUM ('task', 'project', 'mention', 'deadline', 'team');
///
/// CREATE TABLE notifications (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     user_id UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
///     type notification_type NOT NULL,
///     title VARCHAR(200) NOT NULL,
///     message TEXT NOT NULL,
///     read BOOLEAN NOT NULL DEFAULT FALSE,
///     priority task_priority,
///     action_url VARCHAR(512),
///     created_at TIMESTAMPTZ NOT NULL DEFAULT clock_timestamp()
/// );
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use super::project::Project;
use super::task::{Task, TaskPriority};

/// What a notification is about
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "notification_type", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum NotificationKind {
    Task,
    Project,
    Mention,
    Deadline,
    Team,
}

impl NotificationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            NotificationKind::Task => "task",
            NotificationKind::Project => "project",
            NotificationKind::Mention => "mention",
            NotificationKind::Deadline => "deadline",
            NotificationKind::Team => "team",
        }
    }
}

/// Notification row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Notification {
    pub id: Uuid,

    /// Recipient
    pub user_id: Uuid,

    #[sqlx(rename = "type")]
    #[serde(rename = "type")]
    pub kind: NotificationKind,

    pub title: String,

    pub message: String,

    pub read: bool,

    pub priority: Option<TaskPriority>,

    /// Where the dashboard links the entry to
    pub action_url: Option<String>,

    pub created_at: DateTime<Utc>,
}

/// Input for inserting a notification
#[derive(Debug, Clone, PartialEq)]
pub struct CreateNotification {
    pub user_id: Uuid,
    pub kind: NotificationKind,
    pub title: String,
    pub message: String,
    pub priority: Option<TaskPriority>,
    pub action_url: Option<String>,
}

impl CreateNotification {
    /// Tells the assignee about a task created for them
    pub fn task_assigned(task: &Task, project: &Project) -> Self {
        Self {
            user_id: task.assignee_id,
            kind: NotificationKind::Task,
            title: "New task assigned".to_string(),
            message: format!(
                "You've been assigned to '{}' in {}. It is due {}.",
                task.name, project.name, task.due_date
            ),
            priority: Some(task.priority),
            action_url: Some(format!("/v1/tasks/{}", task.id)),
        }
    }

    /// Tells a user they joined a project's team
    pub fn added_to_project(user_id: Uuid, project: &Project) -> Self {
        Self {
            user_id,
            kind: NotificationKind::Team,
            title: "Added to project".to_string(),
            message: format!("You have been added to the {} project team.", project.name),
            priority: None,
            action_url: Some(format!("/v1/projects/{}", project.id)),
        }
    }
}

const NOTIFICATION_COLUMNS: &str =
    "id, user_id, type, title, message, read, priority, action_url, created_at";

impl Notification {
    /// Inserts a notification
    ///
    /// # Errors
    ///
    /// Returns an error if the recipient doesn't exist (foreign key violation)
    /// or the database connection fails
    pub async fn create(pool: &PgPool, data: CreateNotification) -> Result<Self, sqlx::Error> {
        let query = format!(
            r#"
            INSERT INTO notifications (user_id, type, title, message, priority, action_url)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {}
            "#,
            NOTIFICATION_COLUMNS
        );

        sqlx::query_as::<_, Notification>(&query)
            .bind(data.user_id)
            .bind(data.kind)
            .bind(data.title)
            .bind(data.message)
            .bind(data.priority)
            .bind(data.action_url)
            .fetch_one(pool)
            .await
    }

    /// A user's feed, newest first
    pub async fn list_for_user(pool: &PgPool, user_id: Uuid) -> Result<Vec<Self>, sqlx::Error> {
        let query = format!(
            "SELECT {} FROM notifications WHERE user_id = $1 ORDER BY created_at DESC",
            NOTIFICATION_COLUMNS
        );

        sqlx::query_as::<_, Notification>(&query)
            .bind(user_id)
            .fetch_all(pool)
            .await
    }

    /// Marks one of the user's notifications read
    ///
    /// Returns None if the notification doesn't exist or belongs to someone else.
    pub async fn mark_read(
        pool: &PgPool,
        user_id: Uuid,
        id: Uuid,
    ) -> Result<Option<Self>, sqlx::Error> {
        let query = format!(
            "UPDATE notifications SET read = TRUE WHERE id = $1 AND user_id = $2 RETURNING {}",
            NOTIFICATION_COLUMNS
        );

        sqlx::query_as::<_, Notification>(&query)
            .bind(id)
            .bind(user_id)
            .fetch_optional(pool)
            .await
    }

    /// Marks every unread notification of the user read; returns how many changed
    pub async fn mark_all_read(pool: &PgPool, user_id: Uuid) -> Result<u64, sqlx::Error> {
        let result =
            sqlx::query("UPDATE notifications SET read = TRUE WHERE user_id = $1 AND NOT read")
                .bind(user_id)
                .execute(pool)
                .await?;

        Ok(result.rows_affected())
    }

    /// Deletes one of the user's notifications and returns it
    pub async fn delete(
        pool: &PgPool,
        user_id: Uuid,
        id: Uuid,
    ) -> Result<Option<Self>, sqlx::Error> {
        let query = format!(
            "DELETE FROM notifications WHERE id = $1 AND user_id = $2 RETURNING {}",
            NOTIFICATION_COLUMNS
        );

        sqlx::query_as::<_, Notification>(&query)
            .bind(id)
            .bind(user_id)
            .fetch_optional(pool)
            .await
    }
}
