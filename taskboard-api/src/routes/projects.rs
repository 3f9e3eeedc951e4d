/// Project endpoints
///
/// All routes act on behalf of the authenticated caller and only see
/// projects the caller is a member of. A project the caller cannot see is
/// reported as `404 Not Found`, the same as one that does not exist.
///
/// # Endpoints
///
/// - `GET /v1/projects?search=` - The caller's projects, newest first
/// - `POST /v1/projects` - Create a project owned by the caller
/// - `GET /v1/projects/:id` - One project with team and tasks
/// - `PATCH /v1/projects/:id` - Edit a project (owner)
/// - `POST /v1/projects/:id/members` - Add a team member (owner)

use crate::{
    app::AppState,
    error::{found, items, ApiResult},
};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use taskboard_shared::{
    auth::middleware::AuthContext,
    models::{
        membership::ProjectMembership,
        project::{NewProject, ProjectDetails, UpdateProject},
    },
    views::filter_projects,
};
use uuid::Uuid;

/// Search filter for list endpoints
#[derive(Debug, Default, Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    pub search: Option<String>,
}

/// Add member request
#[derive(Debug, Deserialize)]
pub struct AddMemberRequest {
    pub user_id: Uuid,
}

/// List the caller's projects
///
/// # Endpoint
///
/// ```text
/// GET /v1/projects?search=road
/// Authorization: Bearer <token>
/// ```
///
/// # Response
///
/// ```json
/// [
///   {
///     "id": "uuid",
///     "name": "Roadmap",
///     "description": "",
///     "status": "active",
///     "due_date": "2025-01-01",
///     "color": "bg-blue-500",
///     "owner_id": "uuid",
///     "progress": 50,
///     "team_members": [ ... ],
///     "tasks": [ ... ]
///   }
/// ]
/// ```
pub async fn list_projects(
    State(state): State<AppState>,
    auth: AuthContext,
    Query(query): Query<SearchQuery>,
) -> ApiResult<Json<Vec<ProjectDetails>>> {
    let projects = items(state.access.get_projects(&auth).await)?;

    let projects = match query.search.as_deref() {
        Some(search) => filter_projects(&projects, search),
        None => projects,
    };

    Ok(Json(projects))
}

/// Create a project
///
/// The caller becomes its owner; every id in `team_member_ids` becomes a
/// member. The project and all memberships are written atomically.
///
/// # Endpoint
///
/// ```text
/// POST /v1/projects
/// Authorization: Bearer <token>
/// Content-Type: application/json
///
/// {
///   "name": "Roadmap",
///   "description": "Plan for next year",
///   "due_date": "2025-01-01",
///   "color": "bg-blue-500",
///   "team_member_ids": ["uuid"]
/// }
/// ```
///
/// # Errors
///
/// - `404 Not Found`: A team member id does not exist (nothing is created)
/// - `422 Unprocessable Entity`: Validation failed
pub async fn create_project(
    State(state): State<AppState>,
    auth: AuthContext,
    Json(req): Json<NewProject>,
) -> ApiResult<(StatusCode, Json<ProjectDetails>)> {
    let project = found(state.access.create_project(&auth, req).await, "Project")?;

    Ok((StatusCode::CREATED, Json(project)))
}

/// Get one project with its team and tasks
pub async fn get_project(
    State(state): State<AppState>,
    auth: AuthContext,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<ProjectDetails>> {
    let project = found(state.access.get_project_by_id(&auth, id).await, "Project")?;

    Ok(Json(project))
}

/// Edit a project
///
/// # Errors
///
/// - `403 Forbidden`: The caller is a member but not the owner
/// - `404 Not Found`: No such project visible to the caller
pub async fn update_project(
    State(state): State<AppState>,
    auth: AuthContext,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateProject>,
) -> ApiResult<Json<ProjectDetails>> {
    let project = found(state.access.update_project(&auth, id, req).await, "Project")?;

    Ok(Json(project))
}

/// Add a user to the project as a member
///
/// # Endpoint
///
/// ```text
/// POST /v1/projects/:id/members
/// Authorization: Bearer <token>
/// Content-Type: application/json
///
/// { "user_id": "uuid" }
/// ```
///
/// # Errors
///
/// - `403 Forbidden`: The caller is not the owner
/// - `404 Not Found`: No such project, or no such user
/// - `409 Conflict`: The user is already a member
pub async fn add_member(
    State(state): State<AppState>,
    auth: AuthContext,
    Path(id): Path<Uuid>,
    Json(req): Json<AddMemberRequest>,
) -> ApiResult<(StatusCode, Json<ProjectMembership>)> {
    let membership = found(
        state
            .access
            .add_team_member_to_project(&auth, id, req.user_id)
            .await,
        "Project",
    )?;

    Ok((StatusCode::CREATED, Json(membership)))
}
