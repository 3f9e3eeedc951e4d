//! Team directory

use super::{settle_list, AccessError, AccessLayer};
use crate::auth::middleware::AuthContext;
use crate::models::team_member::TeamMember;
use crate::outcome::Outcome;

impl AccessLayer {
    /// Every user profile ordered by first name, all reported online
    ///
    /// The directory is visible to any authenticated caller.
    pub async fn get_team_members(&self, caller: &AuthContext) -> Outcome<Vec<TeamMember>> {
        let result: Result<Vec<TeamMember>, AccessError> = self
            .store
            .list_users()
            .await
            .map(|users| users.into_iter().map(TeamMember::online).collect())
            .map_err(Into::into);

        settle_list("get_team_members", caller, result)
    }
}
