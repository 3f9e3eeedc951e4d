//! Task operations

use std::collections::HashSet;

use tracing::info;
use uuid::Uuid;
use validator::Validate;

use super::{settle, settle_list, AccessError, AccessLayer};
use crate::auth::authorization::ResourcePermission;
use crate::auth::middleware::AuthContext;
use crate::models::comment::{CreateComment, NewComment, TaskComment};
use crate::models::notification::CreateNotification;
use crate::models::task::{CreateTask, NewTask, Task, UpdateTask};
use crate::outcome::Outcome;

impl AccessLayer {
    /// A project's tasks, newest first; `Empty` if the project is not visible
    pub async fn get_tasks_by_project(
        &self,
        caller: &AuthContext,
        project_id: Uuid,
    ) -> Outcome<Vec<Task>> {
        let result: Result<Vec<Task>, AccessError> = async {
            if self.visible_role(caller, project_id).await?.is_none() {
                return Ok(Vec::new());
            }
            Ok(self.store.list_tasks_by_project(project_id).await?)
        }
        .await;

        settle_list("get_tasks_by_project", caller, result)
    }

    /// Creates a task in `todo` (requires member or owner on the project)
    pub async fn create_task(&self, caller: &AuthContext, request: NewTask) -> Outcome<Task> {
        let result: Result<Option<_>, AccessError> = async {
            request.validate()?;
            let project = self
                .project_for_write(caller, request.project_id, ResourcePermission::Write)
                .await?;

            let task = self.store.create_task(CreateTask::from(request)).await?;

            info!(
                task_id = %task.id,
                project_id = %task.project_id,
                assignee_id = %task.assignee_id,
                "Task created"
            );

            if task.assignee_id != caller.user_id {
                self.notify(CreateNotification::task_assigned(&task, &project))
                    .await;
            }

            Ok(Some(task))
        }
        .await;

        settle("create_task", caller, result)
    }

    /// Tasks assigned to the caller in projects the caller can see
    pub async fn get_my_tasks(&self, caller: &AuthContext) -> Outcome<Vec<Task>> {
        let result: Result<Vec<Task>, AccessError> = async {
            let (tasks, projects) = futures::try_join!(
                self.store.list_tasks_by_assignee(caller.user_id),
                self.store.list_projects_for_member(caller.user_id),
            )?;

            let visible: HashSet<Uuid> = projects.into_iter().map(|p| p.id).collect();

            Ok(tasks
                .into_iter()
                .filter(|t| visible.contains(&t.project_id))
                .collect())
        }
        .await;

        settle_list("get_my_tasks", caller, result)
    }

    /// A single task; `Empty` if missing or its project is not visible
    pub async fn get_task(&self, caller: &AuthContext, task_id: Uuid) -> Outcome<Task> {
        let result: Result<Option<Task>, AccessError> = async {
            let Some(task) = self.store.find_task(task_id).await? else {
                return Ok(None);
            };

            if self.visible_role(caller, task.project_id).await?.is_none() {
                return Ok(None);
            }

            Ok(Some(task))
        }
        .await;

        settle("get_task", caller, result)
    }

    /// Edits a task (requires member or owner); any status change is allowed
    pub async fn update_task(
        &self,
        caller: &AuthContext,
        task_id: Uuid,
        update: UpdateTask,
    ) -> Outcome<Task> {
        let result: Result<Option<_>, AccessError> = async {
            update.validate()?;
            self.task_for_write(caller, task_id).await?;

            let updated = self
                .store
                .update_task(task_id, update)
                .await?
                .ok_or_else(|| AccessError::NotFound(format!("Task {} not found", task_id)))?;

            info!(task_id = %updated.id, status = updated.status.as_str(), "Task updated");

            Ok(Some(updated))
        }
        .await;

        settle("update_task", caller, result)
    }

    /// A task's comments, oldest first; `Empty` if the task is not visible
    pub async fn get_task_comments(
        &self,
        caller: &AuthContext,
        task_id: Uuid,
    ) -> Outcome<Vec<TaskComment>> {
        let result: Result<Vec<TaskComment>, AccessError> = async {
            let Some(task) = self.store.find_task(task_id).await? else {
                return Ok(Vec::new());
            };

            if self.visible_role(caller, task.project_id).await?.is_none() {
                return Ok(Vec::new());
            }

            Ok(self.store.list_comments(task_id).await?)
        }
        .await;

        settle_list("get_task_comments", caller, result)
    }

    /// Comments on a task as the caller (requires member or owner)
    pub async fn add_task_comment(
        &self,
        caller: &AuthContext,
        task_id: Uuid,
        request: NewComment,
    ) -> Outcome<TaskComment> {
        let result: Result<Option<_>, AccessError> = async {
            request.validate()?;
            self.task_for_write(caller, task_id).await?;

            let comment = self
                .store
                .create_comment(CreateComment::new(task_id, caller.user_id, request))
                .await?;

            info!(comment_id = %comment.id, %task_id, "Comment added");

            Ok(Some(comment))
        }
        .await;

        settle("add_task_comment", caller, result)
    }

    /// Loads a task for a write, checking Write permission on its project
    async fn task_for_write(&self, caller: &AuthContext, task_id: Uuid) -> Result<Task, AccessError> {
        let task = self
            .store
            .find_task(task_id)
            .await?
            .ok_or_else(|| AccessError::NotFound(format!("Task {} not found", task_id)))?;

        self.project_for_write(caller, task.project_id, ResourcePermission::Write)
            .await
            .map_err(|e| match e {
                // The task lives in a project the caller cannot see
                AccessError::NotFound(_) => {
                    AccessError::NotFound(format!("Task {} not found", task_id))
                }
                other => other,
            })?;

        Ok(task)
    }
}
