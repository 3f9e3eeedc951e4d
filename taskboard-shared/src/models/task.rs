/// Task model and database operations
///
/// Tasks belong to exactly one project and are assigned to exactly one user.
/// New tasks start in `todo`; any status can be reached from any other.
///
/// # Schema
///
/// ```sql
/// CREATE TYPE task_status AS ENUM ('todo', 'in-progress', 'review', 'done');
/// CREATE TYPE task_priority AS ENUM ('low', 'medium', 'high');
///
/// CREATE TABLE tasks (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     name VARCHAR(200) NOT NULL,
///     description TEXT NOT NULL DEFAULT '',
///     status task_status NOT NULL DEFAULT 'todo',
///     priority task_priority NOT NULL DEFAULT 'medium',
///     assignee_id UUID NOT NULL REFERENCES users(id),
///     project_id UUID NOT NULL REFERENCES projects(id) ON DELETE CASCADE,
///     due_date DATE NOT NULL,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT clock_timestamp(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT clock_timestamp()
/// );
/// ```
///
/// # Example
///
/// ```no_run
/// use taskboard_shared::models::task::{Task, CreateTask, TaskPriority};
/// use taskboard_shared::db::pool::{create_pool, DatabaseConfig};
/// use chrono::NaiveDate;
/// use uuid::Uuid;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let pool = create_pool(DatabaseConfig::default()).await?;
///
/// let task = Task::create(&pool, CreateTask {
///     name: "Write launch post".to_string(),
///     description: String::new(),
///     project_id: Uuid::new_v4(),
///     assignee_id: Uuid::new_v4(),
///     priority: TaskPriority::High,
///     due_date: NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
/// }).await?;
/// # Ok(())
/// # }
/// ```

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;
use validator::Validate;

/// Task workflow status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "task_status", rename_all = "kebab-case")]
#[serde(rename_all = "kebab-case")]
pub enum TaskStatus {
    Todo,
    InProgress,
    Review,
    Done,
}

impl TaskStatus {
    pub const ALL: [TaskStatus; 4] = [
        TaskStatus::Todo,
        TaskStatus::InProgress,
        TaskStatus::Review,
        TaskStatus::Done,
    ];

    /// Converts status to its wire/database string
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::Todo => "todo",
            TaskStatus::InProgress => "in-progress",
            TaskStatus::Review => "review",
            TaskStatus::Done => "done",
        }
    }

    pub fn is_done(&self) -> bool {
        matches!(self, TaskStatus::Done)
    }
}

/// Task priority
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "task_priority", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum TaskPriority {
    Low,
    Medium,
    High,
}

impl TaskPriority {
    pub const ALL: [TaskPriority; 3] = [TaskPriority::Low, TaskPriority::Medium, TaskPriority::High];

    pub fn as_str(&self) -> &'static str {
        match self {
            TaskPriority::Low => "low",
            TaskPriority::Medium => "medium",
            TaskPriority::High => "high",
        }
    }
}

/// Task row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Task {
    pub id: Uuid,

    pub name: String,

    pub description: String,

    pub status: TaskStatus,

    pub priority: TaskPriority,

    /// User responsible for the task
    pub assignee_id: Uuid,

    /// Owning project
    pub project_id: Uuid,

    pub due_date: NaiveDate,

    pub created_at: DateTime<Utc>,

    pub updated_at: DateTime<Utc>,
}

/// Task creation request, as submitted by a caller
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct NewTask {
    #[validate(length(min = 1, max = 200, message = "Name must be 1-200 characters"))]
    pub name: String,

    #[serde(default)]
    #[validate(length(max = 5000, message = "Description must be at most 5000 characters"))]
    pub description: String,

    pub project_id: Uuid,

    pub assignee_id: Uuid,

    #[serde(default = "default_priority")]
    pub priority: TaskPriority,

    pub due_date: NaiveDate,
}

fn default_priority() -> TaskPriority {
    TaskPriority::Medium
}

/// Input for inserting a task
#[derive(Debug, Clone)]
pub struct CreateTask {
    pub name: String,
    pub description: String,
    pub project_id: Uuid,
    pub assignee_id: Uuid,
    pub priority: TaskPriority,
    pub due_date: NaiveDate,
}

impl From<NewTask> for CreateTask {
    fn from(request: NewTask) -> Self {
        Self {
            name: request.name,
            description: request.description,
            project_id: request.project_id,
            assignee_id: request.assignee_id,
            priority: request.priority,
            due_date: request.due_date,
        }
    }
}

/// Task edit
///
/// Only non-None fields will be updated. Status changes are not restricted.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct UpdateTask {
    #[validate(length(min = 1, max = 200, message = "Name must be 1-200 characters"))]
    pub name: Option<String>,

    #[validate(length(max = 5000, message = "Description must be at most 5000 characters"))]
    pub description: Option<String>,

    pub status: Option<TaskStatus>,

    pub priority: Option<TaskPriority>,

    pub assignee_id: Option<Uuid>,

    pub due_date: Option<NaiveDate>,
}

impl UpdateTask {
    /// Applies the edit to an in-memory task
    pub fn apply_to(self, task: &mut Task) {
        if let Some(name) = self.name {
            task.name = name;
        }
        if let Some(description) = self.description {
            task.description = description;
        }
        if let Some(status) = self.status {
            task.status = status;
        }
        if let Some(priority) = self.priority {
            task.priority = priority;
        }
        if let Some(assignee_id) = self.assignee_id {
            task.assignee_id = assignee_id;
        }
        if let Some(due_date) = self.due_date {
            task.due_date = due_date;
        }
        task.updated_at = Utc::now();
    }
}

const TASK_COLUMNS: &str = "id, name, description, status, priority, assignee_id, project_id, \
                            due_date, created_at, updated_at";

impl Task {
    /// Creates a new task in `todo`
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Project or assignee doesn't exist (foreign key violation)
    /// - Database connection fails
    pub async fn create(pool: &PgPool, data: CreateTask) -> Result<Self, sqlx::Error> {
        let query = format!(
            r#"
            INSERT INTO tasks (name, description, status, priority, assignee_id, project_id, due_date)
            VALUES ($1, $2, 'todo', $3, $4, $5, $6)
            RETURNING {}
            "#,
            TASK_COLUMNS
        );

        let task = sqlx::query_as::<_, Task>(&query)
            .bind(data.name)
            .bind(data.description)
            .bind(data.priority)
            .bind(data.assignee_id)
            .bind(data.project_id)
            .bind(data.due_date)
            .fetch_one(pool)
            .await?;

        Ok(task)
    }

    /// Finds a task by ID
    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        let query = format!("SELECT {} FROM tasks WHERE id = $1", TASK_COLUMNS);

        let task = sqlx::query_as::<_, Task>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await?;

        Ok(task)
    }

    /// Lists a project's tasks, newest first
    pub async fn list_by_project(pool: &PgPool, project_id: Uuid) -> Result<Vec<Self>, sqlx::Error> {
        let query = format!(
            "SELECT {} FROM tasks WHERE project_id = $1 ORDER BY created_at DESC",
            TASK_COLUMNS
        );

        let tasks = sqlx::query_as::<_, Task>(&query)
            .bind(project_id)
            .fetch_all(pool)
            .await?;

        Ok(tasks)
    }

    /// Lists tasks assigned to a user, soonest due first
    pub async fn list_by_assignee(
        pool: &PgPool,
        assignee_id: Uuid,
    ) -> Result<Vec<Self>, sqlx::Error> {
        let query = format!(
            "SELECT {} FROM tasks WHERE assignee_id = $1 ORDER BY due_date ASC, created_at DESC",
            TASK_COLUMNS
        );

        let tasks = sqlx::query_as::<_, Task>(&query)
            .bind(assignee_id)
            .fetch_all(pool)
            .await?;

        Ok(tasks)
    }

    /// Updates a task
    ///
    /// Only non-None fields in `data` will be updated.
    ///
    /// # Returns
    ///
    /// The updated task if found, None if it doesn't exist
    pub async fn update(
        pool: &PgPool,
        id: Uuid,
        data: UpdateTask,
    ) -> Result<Option<Self>, sqlx::Error> {
        let query = format!(
            r#"
            UPDATE tasks
            SET name = COALESCE($2, name),
                description = COALESCE($3, description),
                status = COALESCE($4, status),
                priority = COALESCE($5, priority),
                assignee_id = COALESCE($6, assignee_id),
                due_date = COALESCE($7, due_date),
                updated_at = NOW()
            WHERE id = $1
            RETURNING {}
            "#,
            TASK_COLUMNS
        );

        let task = sqlx::query_as::<_, Task>(&query)
            .bind(id)
            .bind(data.name)
            .bind(data.description)
            .bind(data.status)
            .bind(data.priority)
            .bind(data.assignee_id)
            .bind(data.due_date)
            .fetch_optional(pool)
            .await?;

        Ok(task)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_task_status_as_str() {
        assert_eq!(TaskStatus::Todo.as_str(), "todo");
        assert_eq!(TaskStatus::InProgress.as_str(), "in-progress");
        assert_eq!(TaskStatus::Review.as_str(), "review");
        assert_eq!(TaskStatus::Done.as_str(), "done");
    }

    #[test]
    fn test_task_status_serde_matches_as_str() {
        for status in TaskStatus::ALL {
            let json = serde_json::to_value(status).unwrap();
            assert_eq!(json, serde_json::Value::String(status.as_str().to_string()));
        }
    }

    #[test]
    fn test_only_done_is_done() {
        assert!(TaskStatus::Done.is_done());
        assert!(!TaskStatus::Review.is_done());
        assert!(!TaskStatus::InProgress.is_done());
    }

    #[test]
    fn test_new_task_default_priority() {
        let task: NewTask = serde_json::from_value(serde_json::json!({
            "name": "Draft",
            "project_id": Uuid::new_v4(),
            "assignee_id": Uuid::new_v4(),
            "due_date": "2025-01-01",
        }))
        .unwrap();
        assert_eq!(task.priority, TaskPriority::Medium);
        assert!(task.description.is_empty());
        assert!(task.validate().is_ok());
    }

    #[test]
    fn test_update_task_allows_any_status_change() {
        let mut task = Task {
            id: Uuid::new_v4(),
            name: "Draft".to_string(),
            description: String::new(),
            status: TaskStatus::Done,
            priority: TaskPriority::Low,
            assignee_id: Uuid::new_v4(),
            project_id: Uuid::new_v4(),
            due_date: NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };

        UpdateTask {
            status: Some(TaskStatus::Todo),
            ..Default::default()
        }
        .apply_to(&mut task);

        assert_eq!(task.status, TaskStatus::Todo);
        assert_eq!(task.priority, TaskPriority::Low);
    }
}
