//! Team directory entries

use serde::{Deserialize, Serialize};

use super::user::User;

/// Presence shown next to a team member
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Presence {
    Online,
    Away,
    Offline,
}

/// A user profile as listed in the team directory
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TeamMember {
    #[serde(flatten)]
    pub user: User,

    pub status: Presence,
}

impl TeamMember {
    /// Presence is not tracked; every listed member reports online.
    pub fn online(user: User) -> Self {
        Self {
            user,
            status: Presence::Online,
        }
    }
}
