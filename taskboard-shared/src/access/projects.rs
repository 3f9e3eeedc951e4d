//! Project operations

use futures::future::try_join_all;
use tracing::info;
use uuid::Uuid;
use validator::Validate;

use super::{settle, settle_list, AccessError, AccessLayer};
use crate::auth::authorization::ResourcePermission;
use crate::auth::middleware::AuthContext;
use crate::models::membership::{CreateMembership, MembershipRole, ProjectMembership};
use crate::models::notification::CreateNotification;
use crate::models::project::{CreateProject, NewProject, Project, ProjectDetails, UpdateProject};
use crate::outcome::Outcome;

impl AccessLayer {
    /// Projects the caller is a member of, newest first, each with its team and tasks
    pub async fn get_projects(&self, caller: &AuthContext) -> Outcome<Vec<ProjectDetails>> {
        settle_list("get_projects", caller, self.list_projects(caller).await)
    }

    /// Creates a project owned by the caller
    ///
    /// The project, the caller's owner membership and one member membership
    /// per distinct `team_member_ids` entry are written atomically. The
    /// caller's own id in `team_member_ids` is ignored. Each added member is
    /// notified.
    pub async fn create_project(
        &self,
        caller: &AuthContext,
        request: NewProject,
    ) -> Outcome<ProjectDetails> {
        let result: Result<Option<_>, AccessError> = async {
            request.validate()?;

            let project = self
                .store
                .create_project(CreateProject::from_request(caller.user_id, request))
                .await?;

            info!(project_id = %project.id, owner_id = %caller.user_id, "Project created");

            let details = self.expand(project).await?;
            for member in details
                .team_members
                .iter()
                .filter(|m| m.project_role != MembershipRole::Owner)
            {
                self.notify(CreateNotification::added_to_project(
                    member.user.id,
                    &details.project,
                ))
                .await;
            }

            Ok(Some(details))
        }
        .await;

        settle("create_project", caller, result)
    }

    /// A single project with its team and tasks; `Empty` if not visible
    pub async fn get_project_by_id(
        &self,
        caller: &AuthContext,
        project_id: Uuid,
    ) -> Outcome<ProjectDetails> {
        let result: Result<Option<_>, AccessError> = async {
            if self.visible_role(caller, project_id).await?.is_none() {
                return Ok(None);
            }

            match self.store.find_project(project_id).await? {
                Some(project) => self.expand(project).await.map(Some),
                None => Ok(None),
            }
        }
        .await;

        settle("get_project_by_id", caller, result)
    }

    /// Edits name, description, status, due date or color (owner only)
    pub async fn update_project(
        &self,
        caller: &AuthContext,
        project_id: Uuid,
        update: UpdateProject,
    ) -> Outcome<ProjectDetails> {
        let result: Result<Option<_>, AccessError> = async {
            update.validate()?;
            self.project_for_write(caller, project_id, ResourcePermission::Manage)
                .await?;

            let project = self
                .store
                .update_project(project_id, update)
                .await?
                .ok_or_else(|| AccessError::NotFound(format!("Project {} not found", project_id)))?;

            info!(project_id = %project.id, "Project updated");

            self.expand(project).await.map(Some)
        }
        .await;

        settle("update_project", caller, result)
    }

    /// Adds a user to a project as a member (owner only)
    ///
    /// Adding an existing member fails with `Conflict` and leaves the
    /// membership set unchanged.
    pub async fn add_team_member_to_project(
        &self,
        caller: &AuthContext,
        project_id: Uuid,
        user_id: Uuid,
    ) -> Outcome<ProjectMembership> {
        let result: Result<Option<_>, AccessError> = async {
            let project = self
                .project_for_write(caller, project_id, ResourcePermission::Manage)
                .await?;

            let membership = self
                .store
                .create_membership(CreateMembership {
                    project_id,
                    user_id,
                    role: MembershipRole::Member,
                })
                .await
                .map_err(|e| match AccessError::from(e) {
                    AccessError::Conflict(_) => AccessError::Conflict(format!(
                        "User {} is already a member of project {}",
                        user_id, project_id
                    )),
                    other => other,
                })?;

            info!(%project_id, %user_id, "Team member added to project");

            self.notify(CreateNotification::added_to_project(user_id, &project))
                .await;

            Ok(Some(membership))
        }
        .await;

        settle("add_team_member_to_project", caller, result)
    }

    async fn list_projects(&self, caller: &AuthContext) -> Result<Vec<ProjectDetails>, AccessError> {
        let projects = self.store.list_projects_for_member(caller.user_id).await?;

        try_join_all(projects.into_iter().map(|project| self.expand(project))).await
    }

    /// Loads the team members and tasks of a project
    pub(super) async fn expand(&self, project: Project) -> Result<ProjectDetails, AccessError> {
        let (team_members, tasks) = futures::try_join!(
            self.store.list_project_members(project.id),
            self.store.list_tasks_by_project(project.id),
        )?;

        Ok(ProjectDetails::new(project, team_members, tasks))
    }
}
