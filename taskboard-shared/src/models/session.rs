/// Session model and database operations
///
/// A session is opened on sign-up/sign-in and referenced by the `sid` claim of
/// every token issued for it. Revoking the session (sign-out) invalidates all
/// of its tokens even before they expire.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE sessions (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     user_id UUID NOT NULL REFERENCES credentials(id) ON DELETE CASCADE,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     expires_at TIMESTAMPTZ NOT NULL,
///     revoked_at TIMESTAMPTZ
/// );
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

/// Authenticated session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Session {
    /// Session ID (the `sid` token claim)
    pub id: Uuid,

    /// User the session belongs to
    pub user_id: Uuid,

    pub created_at: DateTime<Utc>,

    /// Hard expiry, independent of token expiry
    pub expires_at: DateTime<Utc>,

    /// Set on sign-out
    pub revoked_at: Option<DateTime<Utc>>,
}

impl Session {
    /// Whether the session can still authenticate at `now`
    pub fn is_active_at(&self, now: DateTime<Utc>) -> bool {
        self.revoked_at.is_none() && now < self.expires_at
    }

    /// Whether the session can still authenticate
    pub fn is_active(&self) -> bool {
        self.is_active_at(Utc::now())
    }

    /// Opens a new session
    pub async fn create(
        pool: &PgPool,
        user_id: Uuid,
        expires_at: DateTime<Utc>,
    ) -> Result<Self, sqlx::Error> {
        let session = sqlx::query_as::<_, Session>(
            r#"
            INSERT INTO sessions (user_id, expires_at)
            VALUES ($1, $2)
            RETURNING id, user_id, created_at, expires_at, revoked_at
            "#,
        )
        .bind(user_id)
        .bind(expires_at)
        .fetch_one(pool)
        .await?;

        Ok(session)
    }

    /// Finds a session by ID
    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        let session = sqlx::query_as::<_, Session>(
            r#"
            SELECT id, user_id, created_at, expires_at, revoked_at
            FROM sessions
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(session)
    }

    /// Revokes a session
    ///
    /// Returns true if an active session was revoked, false if it didn't exist
    /// or was already revoked.
    pub async fn revoke(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            r#"
            UPDATE sessions
            SET revoked_at = NOW()
            WHERE id = $1 AND revoked_at IS NULL
            "#,
        )
        .bind(id)
        .execute(pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }
}
