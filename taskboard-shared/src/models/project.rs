/// Project model and database operations
///
/// A project is always created together with its owner membership (and any
/// requested member memberships) inside one transaction, so a project row
/// never exists without an owner.
///
/// # Schema
///
/// ```sql
/// CREATE TYPE project_status AS ENUM ('active', 'planning', 'review', 'completed');
///
/// CREATE TABLE projects (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     name VARCHAR(200) NOT NULL,
///     description TEXT NOT NULL DEFAULT '',
///     status project_status NOT NULL DEFAULT 'active',
///     due_date DATE NOT NULL,
///     color VARCHAR(32) NOT NULL,
///     owner_id UUID NOT NULL REFERENCES users(id),
///     created_at TIMESTAMPTZ NOT NULL DEFAULT clock_timestamp(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT clock_timestamp()
/// );
/// ```
///
/// # Progress
///
/// Progress is not stored. [`ProjectDetails`] derives it from the project's
/// tasks so it can never disagree with them.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;
use validator::{Validate, ValidationError};

use super::membership::{MembershipRole, ProjectMember};
use super::task::{Task, TaskStatus};

/// Project lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "project_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ProjectStatus {
    Active,
    Planning,
    Review,
    Completed,
}

impl ProjectStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProjectStatus::Active => "active",
            ProjectStatus::Planning => "planning",
            ProjectStatus::Review => "review",
            ProjectStatus::Completed => "completed",
        }
    }
}

/// Project row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Project {
    pub id: Uuid,

    pub name: String,

    /// Free-text description
    pub description: String,

    pub status: ProjectStatus,

    pub due_date: NaiveDate,

    /// Display color tag (e.g. "bg-blue-500")
    pub color: String,

    /// User holding the owner membership
    pub owner_id: Uuid,

    pub created_at: DateTime<Utc>,

    pub updated_at: DateTime<Utc>,
}

/// Project creation request, as submitted by a caller
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct NewProject {
    #[validate(length(min = 1, max = 200, message = "Name must be 1-200 characters"))]
    pub name: String,

    #[serde(default)]
    #[validate(length(max = 5000, message = "Description must be at most 5000 characters"))]
    pub description: String,

    pub due_date: NaiveDate,

    #[validate(custom(function = "validate_color"))]
    pub color: String,

    /// Users to add as members besides the owner
    #[serde(default)]
    pub team_member_ids: Vec<Uuid>,
}

/// Input for the transactional project insert
#[derive(Debug, Clone)]
pub struct CreateProject {
    pub name: String,
    pub description: String,
    pub due_date: NaiveDate,
    pub color: String,

    /// Becomes the owner membership
    pub owner_id: Uuid,

    /// Each becomes a member membership; must not contain the owner or duplicates
    pub member_ids: Vec<Uuid>,
}

impl CreateProject {
    /// Builds the insert from a request, owned by `owner_id`
    ///
    /// Drops the owner and repeated ids from the requested members, keeping
    /// the first occurrence order.
    pub fn from_request(owner_id: Uuid, request: NewProject) -> Self {
        let mut member_ids: Vec<Uuid> = Vec::with_capacity(request.team_member_ids.len());
        for id in request.team_member_ids {
            if id != owner_id && !member_ids.contains(&id) {
                member_ids.push(id);
            }
        }

        Self {
            name: request.name,
            description: request.description,
            due_date: request.due_date,
            color: request.color,
            owner_id,
            member_ids,
        }
    }
}

/// Project edit
///
/// Only non-None fields will be updated.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct UpdateProject {
    #[validate(length(min = 1, max = 200, message = "Name must be 1-200 characters"))]
    pub name: Option<String>,

    #[validate(length(max = 5000, message = "Description must be at most 5000 characters"))]
    pub description: Option<String>,

    pub status: Option<ProjectStatus>,

    pub due_date: Option<NaiveDate>,

    #[validate(custom(function = "validate_color"))]
    pub color: Option<String>,
}

impl UpdateProject {
    /// Applies the edit to an in-memory project
    pub fn apply_to(self, project: &mut Project) {
        if let Some(name) = self.name {
            project.name = name;
        }
        if let Some(description) = self.description {
            project.description = description;
        }
        if let Some(status) = self.status {
            project.status = status;
        }
        if let Some(due_date) = self.due_date {
            project.due_date = due_date;
        }
        if let Some(color) = self.color {
            project.color = color;
        }
        project.updated_at = Utc::now();
    }
}

/// Color tags are short tokens of letters, digits, `-` and `#`
fn validate_color(color: &str) -> Result<(), ValidationError> {
    let valid = !color.is_empty()
        && color.len() <= 32
        && color
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '#');

    if valid {
        Ok(())
    } else {
        let mut err = ValidationError::new("color");
        err.message = Some("Color must be 1-32 characters of letters, digits, '-' or '#'".into());
        Err(err)
    }
}

/// A project expanded with its team and tasks
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectDetails {
    #[serde(flatten)]
    pub project: Project,

    /// Percentage of tasks marked done (0-100)
    pub progress: u8,

    pub team_members: Vec<ProjectMember>,

    /// Newest first
    pub tasks: Vec<Task>,
}

impl ProjectDetails {
    pub fn new(project: Project, team_members: Vec<ProjectMember>, tasks: Vec<Task>) -> Self {
        let progress = progress_of(&tasks);
        Self {
            project,
            progress,
            team_members,
            tasks,
        }
    }

    /// Number of tasks marked done
    pub fn completed_tasks(&self) -> usize {
        self.tasks
            .iter()
            .filter(|t| t.status == TaskStatus::Done)
            .count()
    }

    /// The team member holding the owner role
    pub fn owner(&self) -> Option<&ProjectMember> {
        self.team_members
            .iter()
            .find(|m| m.project_role == MembershipRole::Owner)
    }
}

/// Share of done tasks as a rounded percentage; 0 for a project without tasks
pub fn progress_of(tasks: &[Task]) -> u8 {
    if tasks.is_empty() {
        return 0;
    }
    let done = tasks.iter().filter(|t| t.status == TaskStatus::Done).count();
    ((done * 100 + tasks.len() / 2) / tasks.len()) as u8
}

const PROJECT_COLUMNS: &str =
    "id, name, description, status, due_date, color, owner_id, created_at, updated_at";

impl Project {
    /// Creates a project with its owner and member memberships in one transaction
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The owner or a member doesn't exist (foreign key violation)
    /// - A member id is repeated (membership primary key violation)
    /// - Database connection fails
    ///
    /// On any error nothing is persisted.
    pub async fn create_with_members(
        pool: &PgPool,
        data: CreateProject,
    ) -> Result<Self, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let query = format!(
            r#"
            INSERT INTO projects (name, description, status, due_date, color, owner_id)
            VALUES ($1, $2, 'active', $3, $4, $5)
            RETURNING {}
            "#,
            PROJECT_COLUMNS
        );
        let project = sqlx::query_as::<_, Project>(&query)
            .bind(&data.name)
            .bind(&data.description)
            .bind(data.due_date)
            .bind(&data.color)
            .bind(data.owner_id)
            .fetch_one(&mut *tx)
            .await?;

        sqlx::query(
            "INSERT INTO project_members (project_id, user_id, role) VALUES ($1, $2, 'owner')",
        )
        .bind(project.id)
        .bind(data.owner_id)
        .execute(&mut *tx)
        .await?;

        for member_id in &data.member_ids {
            sqlx::query(
                "INSERT INTO project_members (project_id, user_id, role) VALUES ($1, $2, 'member')",
            )
            .bind(project.id)
            .bind(member_id)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        Ok(project)
    }

    /// Finds a project by ID
    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        let query = format!("SELECT {} FROM projects WHERE id = $1", PROJECT_COLUMNS);

        let project = sqlx::query_as::<_, Project>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await?;

        Ok(project)
    }

    /// Lists the projects a user is a member of, newest first
    pub async fn list_for_member(pool: &PgPool, user_id: Uuid) -> Result<Vec<Self>, sqlx::Error> {
        let projects = sqlx::query_as::<_, Project>(
            r#"
            SELECT p.id, p.name, p.description, p.status, p.due_date, p.color,
                   p.owner_id, p.created_at, p.updated_at
            FROM projects p
            JOIN project_members pm ON pm.project_id = p.id
            WHERE pm.user_id = $1
            ORDER BY p.created_at DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(pool)
        .await?;

        Ok(projects)
    }

    /// Updates a project
    ///
    /// Only non-None fields in `data` will be updated.
    ///
    /// # Returns
    ///
    /// The updated project if found, None if it doesn't exist
    pub async fn update(
        pool: &PgPool,
        id: Uuid,
        data: UpdateProject,
    ) -> Result<Option<Self>, sqlx::Error> {
        let query = format!(
            r#"
            UPDATE projects
            SET name = COALESCE($2, name),
                description = COALESCE($3, description),
                status = COALESCE($4, status),
                due_date = COALESCE($5, due_date),
                color = COALESCE($6, color),
                updated_at = NOW()
            WHERE id = $1
            RETURNING {}
            "#,
            PROJECT_COLUMNS
        );

        let project = sqlx::query_as::<_, Project>(&query)
            .bind(id)
            .bind(data.name)
            .bind(data.description)
            .bind(data.status)
            .bind(data.due_date)
            .bind(data.color)
            .fetch_optional(pool)
            .await?;

        Ok(project)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::task::TaskPriority;

    fn task_with_status(status: TaskStatus) -> Task {
        Task {
            id: Uuid::new_v4(),
            name: "Task".to_string(),
            description: String::new(),
            status,
            priority: TaskPriority::Medium,
            assignee_id: Uuid::new_v4(),
            project_id: Uuid::new_v4(),
            due_date: NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn new_project(color: &str) -> NewProject {
        NewProject {
            name: "Roadmap".to_string(),
            description: String::new(),
            due_date: NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
            color: color.to_string(),
            team_member_ids: vec![],
        }
    }

    #[test]
    fn test_project_status_as_str() {
        assert_eq!(ProjectStatus::Active.as_str(), "active");
        assert_eq!(ProjectStatus::Completed.as_str(), "completed");
    }

    #[test]
    fn test_progress_without_tasks_is_zero() {
        assert_eq!(progress_of(&[]), 0);
    }

    #[test]
    fn test_progress_rounds_done_share() {
        let tasks = vec![
            task_with_status(TaskStatus::Done),
            task_with_status(TaskStatus::Todo),
            task_with_status(TaskStatus::InProgress),
        ];
        assert_eq!(progress_of(&tasks), 33);

        let tasks = vec![
            task_with_status(TaskStatus::Done),
            task_with_status(TaskStatus::Done),
            task_with_status(TaskStatus::Review),
        ];
        assert_eq!(progress_of(&tasks), 67);
    }

    #[test]
    fn test_progress_all_done() {
        let tasks = vec![task_with_status(TaskStatus::Done); 4];
        assert_eq!(progress_of(&tasks), 100);
    }

    #[test]
    fn test_create_project_drops_owner_and_duplicates() {
        let owner = Uuid::new_v4();
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        let mut request = new_project("bg-blue-500");
        request.team_member_ids = vec![a, owner, b, a];

        let create = CreateProject::from_request(owner, request);
        assert_eq!(create.member_ids, vec![a, b]);
        assert_eq!(create.owner_id, owner);
    }

    #[test]
    fn test_new_project_validation() {
        assert!(new_project("bg-blue-500").validate().is_ok());
        assert!(new_project("#3b82f6").validate().is_ok());
        assert!(new_project("").validate().is_err());
        assert!(new_project("red; drop").validate().is_err());

        let mut unnamed = new_project("bg-blue-500");
        unnamed.name = String::new();
        assert!(unnamed.validate().is_err());
    }

    #[test]
    fn test_update_project_apply() {
        let mut project = Project {
            id: Uuid::new_v4(),
            name: "Roadmap".to_string(),
            description: String::new(),
            status: ProjectStatus::Active,
            due_date: NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
            color: "bg-blue-500".to_string(),
            owner_id: Uuid::new_v4(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };

        UpdateProject {
            status: Some(ProjectStatus::Review),
            ..Default::default()
        }
        .apply_to(&mut project);

        assert_eq!(project.status, ProjectStatus::Review);
        assert_eq!(project.name, "Roadmap");
    }
}
