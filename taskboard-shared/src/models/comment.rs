/// Task comment model and database operations
///
/// Comments are read back with the author's display name so a task's
/// discussion renders without a second profile lookup.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;
use validator::{Validate, ValidationError};

/// Comment row joined with its author's name
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct TaskComment {
    pub id: Uuid,

    pub task_id: Uuid,

    pub author_id: Uuid,

    /// Author's "first last" name
    pub author_name: String,

    pub content: String,

    pub created_at: DateTime<Utc>,
}

/// Comment as submitted by a caller
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct NewComment {
    #[validate(
        length(max = 2000, message = "Comment must be at most 2000 characters"),
        custom(function = "not_blank")
    )]
    pub content: String,
}

fn not_blank(content: &str) -> Result<(), ValidationError> {
    if content.trim().is_empty() {
        let mut err = ValidationError::new("blank");
        err.message = Some("Comment cannot be empty".into());
        return Err(err);
    }
    Ok(())
}

/// Input for inserting a comment
#[derive(Debug, Clone)]
pub struct CreateComment {
    pub task_id: Uuid,
    pub author_id: Uuid,
    pub content: String,
}

impl CreateComment {
    pub fn new(task_id: Uuid, author_id: Uuid, request: NewComment) -> Self {
        Self {
            task_id,
            author_id,
            content: request.content.trim().to_string(),
        }
    }
}

impl TaskComment {
    /// Inserts a comment and returns it with the author's name
    ///
    /// # Errors
    ///
    /// Returns an error if the task or author doesn't exist (foreign key
    /// violation) or the database connection fails
    pub async fn create(pool: &PgPool, data: CreateComment) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, TaskComment>(
            r#"
            WITH inserted AS (
                INSERT INTO task_comments (task_id, author_id, content)
                VALUES ($1, $2, $3)
                RETURNING id, task_id, author_id, content, created_at
            )
            SELECT i.id, i.task_id, i.author_id,
                   u.first_name || ' ' || u.last_name AS author_name,
                   i.content, i.created_at
            FROM inserted i
            JOIN users u ON u.id = i.author_id
            "#,
        )
        .bind(data.task_id)
        .bind(data.author_id)
        .bind(data.content)
        .fetch_one(pool)
        .await
    }

    /// A task's comments, oldest first
    pub async fn list_by_task(pool: &PgPool, task_id: Uuid) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, TaskComment>(
            r#"
            SELECT c.id, c.task_id, c.author_id,
                   u.first_name || ' ' || u.last_name AS author_name,
                   c.content, c.created_at
            FROM task_comments c
            JOIN users u ON u.id = c.author_id
            WHERE c.task_id = $1
            ORDER BY c.created_at ASC
            "#,
        )
        .bind(task_id)
        .fetch_all(pool)
        .await
    }
}
