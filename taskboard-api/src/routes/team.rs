/// Team directory endpoint
///
/// # Endpoint
///
/// ```text
/// GET /v1/team?search=developer
/// Authorization: Bearer <token>
/// ```
///
/// Lists every user ordered by first name. `search` matches the full name or
/// role label, case-insensitively.

use crate::{
    app::AppState,
    error::{items, ApiResult},
    routes::projects::SearchQuery,
};
use axum::{
    extract::{Query, State},
    Json,
};
use taskboard_shared::{
    auth::middleware::AuthContext, models::team_member::TeamMember, views::filter_team,
};

pub async fn list_team(
    State(state): State<AppState>,
    auth: AuthContext,
    Query(query): Query<SearchQuery>,
) -> ApiResult<Json<Vec<TeamMember>>> {
    let members = items(state.access.get_team_members(&auth).await)?;

    let members = match query.search.as_deref() {
        Some(search) => filter_team(&members, search),
        None => members,
    };

    Ok(Json(members))
}
