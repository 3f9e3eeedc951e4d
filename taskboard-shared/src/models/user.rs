/// Credential and user profile models with their database operations
///
/// Authentication data and profile data live in separate tables. A credential
/// row holds the login email and password hash; the profile row shares the
/// credential's id and carries everything the dashboard displays.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE credentials (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     email TEXT NOT NULL UNIQUE,
///     password_hash VARCHAR(255) NOT NULL,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
///
/// CREATE TABLE users (
///     id UUID PRIMARY KEY REFERENCES credentials(id) ON DELETE CASCADE,
///     email TEXT NOT NULL UNIQUE,
///     first_name VARCHAR(100) NOT NULL,
///     last_name VARCHAR(100) NOT NULL,
///     role VARCHAR(100) NOT NULL,
///     department VARCHAR(100) NOT NULL,
///     avatar_url VARCHAR(512),
///     phone VARCHAR(50),
///     location VARCHAR(200),
///     bio TEXT,
///     join_date TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```
///
/// # Example
///
/// ```no_run
/// use taskboard_shared::models::user::{Credential, CreateCredential, CreateProfile, User};
/// use taskboard_shared::db::pool::{create_pool, DatabaseConfig};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let pool = create_pool(DatabaseConfig::default()).await?;
///
/// let credential = Credential::create(&pool, CreateCredential {
///     email: "jane@example.com".to_string(),
///     password_hash: "$argon2id$...".to_string(),
/// }).await?;
///
/// let user = User::create(&pool, CreateProfile {
///     id: credential.id,
///     email: credential.email.clone(),
///     first_name: "Jane".to_string(),
///     last_name: "Doe".to_string(),
///     role: "Designer".to_string(),
///     department: "Product".to_string(),
/// }).await?;
/// println!("Created {}", user.full_name());
/// # Ok(())
/// # }
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;
use validator::Validate;

/// Login credential
///
/// Passwords are stored as Argon2id hashes, never in plaintext, and the hash
/// is never serialized.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Credential {
    /// Credential ID, shared with the profile row
    pub id: Uuid,

    /// Login email, stored lower-cased
    pub email: String,

    /// Argon2id password hash
    #[serde(skip_serializing, default)]
    pub password_hash: String,

    /// When the credential was created
    pub created_at: DateTime<Utc>,
}

/// Input for creating a credential
#[derive(Debug, Clone)]
pub struct CreateCredential {
    /// Email address (callers normalize it with [`normalize_email`])
    pub email: String,

    /// Argon2id password hash (NOT plaintext password!)
    pub password_hash: String,
}

/// User profile
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct User {
    /// User ID (same as the credential ID)
    pub id: Uuid,

    /// Email address, unique across users
    pub email: String,

    pub first_name: String,

    pub last_name: String,

    /// Job role label (e.g. "Frontend Developer")
    pub role: String,

    /// Department label
    pub department: String,

    pub avatar_url: Option<String>,

    pub phone: Option<String>,

    pub location: Option<String>,

    pub bio: Option<String>,

    /// When the user signed up
    pub join_date: DateTime<Utc>,

    /// When the profile was last edited
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// First and last name joined with a space
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// Input for creating a profile row
#[derive(Debug, Clone)]
pub struct CreateProfile {
    /// Credential ID the profile belongs to
    pub id: Uuid,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub role: String,
    pub department: String,
}

/// Input for editing a profile
///
/// All fields are optional. Only non-None fields will be updated; the nullable
/// columns take `Some(None)` to clear them.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct UpdateProfile {
    #[validate(length(min = 1, max = 100, message = "First name must be 1-100 characters"))]
    pub first_name: Option<String>,

    #[validate(length(min = 1, max = 100, message = "Last name must be 1-100 characters"))]
    pub last_name: Option<String>,

    #[validate(length(min = 1, max = 100, message = "Role must be 1-100 characters"))]
    pub role: Option<String>,

    #[validate(length(min = 1, max = 100, message = "Department must be 1-100 characters"))]
    pub department: Option<String>,

    #[serde(default, deserialize_with = "present")]
    #[validate(length(max = 512, message = "Avatar URL must be at most 512 characters"))]
    pub avatar_url: Option<Option<String>>,

    #[serde(default, deserialize_with = "present")]
    #[validate(length(max = 50, message = "Phone must be at most 50 characters"))]
    pub phone: Option<Option<String>>,

    #[serde(default, deserialize_with = "present")]
    #[validate(length(max = 200, message = "Location must be at most 200 characters"))]
    pub location: Option<Option<String>>,

    #[serde(default, deserialize_with = "present")]
    #[validate(length(max = 2000, message = "Bio must be at most 2000 characters"))]
    pub bio: Option<Option<String>>,
}

/// Maps a present field to `Some`, so an explicit `null` becomes `Some(None)`
fn present<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: serde::Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

impl UpdateProfile {
    /// Whether the update carries no changes
    pub fn is_noop(&self) -> bool {
        self.first_name.is_none()
            && self.last_name.is_none()
            && self.role.is_none()
            && self.department.is_none()
            && self.avatar_url.is_none()
            && self.phone.is_none()
            && self.location.is_none()
            && self.bio.is_none()
    }

    /// Applies the update to an in-memory profile
    pub fn apply_to(self, user: &mut User) {
        if let Some(first_name) = self.first_name {
            user.first_name = first_name;
        }
        if let Some(last_name) = self.last_name {
            user.last_name = last_name;
        }
        if let Some(role) = self.role {
            user.role = role;
        }
        if let Some(department) = self.department {
            user.department = department;
        }
        if let Some(avatar_url) = self.avatar_url {
            user.avatar_url = avatar_url;
        }
        if let Some(phone) = self.phone {
            user.phone = phone;
        }
        if let Some(location) = self.location {
            user.location = location;
        }
        if let Some(bio) = self.bio {
            user.bio = bio;
        }
        user.updated_at = Utc::now();
    }
}

/// Lower-cases and trims an email address for storage and lookup
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

const USER_COLUMNS: &str = "id, email, first_name, last_name, role, department, avatar_url, \
                            phone, location, bio, join_date, updated_at";

impl Credential {
    /// Creates a new credential
    ///
    /// # Errors
    ///
    /// Returns an error if the email is already registered (unique constraint
    /// `credentials_email_key`) or the database connection fails.
    pub async fn create(pool: &PgPool, data: CreateCredential) -> Result<Self, sqlx::Error> {
        let credential = sqlx::query_as::<_, Credential>(
            r#"
            INSERT INTO credentials (email, password_hash)
            VALUES ($1, $2)
            RETURNING id, email, password_hash, created_at
            "#,
        )
        .bind(data.email)
        .bind(data.password_hash)
        .fetch_one(pool)
        .await?;

        Ok(credential)
    }

    /// Finds a credential by (normalized) email
    pub async fn find_by_email(pool: &PgPool, email: &str) -> Result<Option<Self>, sqlx::Error> {
        let credential = sqlx::query_as::<_, Credential>(
            r#"
            SELECT id, email, password_hash, created_at
            FROM credentials
            WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(pool)
        .await?;

        Ok(credential)
    }

    /// Finds a credential by ID
    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        let credential = sqlx::query_as::<_, Credential>(
            "SELECT id, email, password_hash, created_at FROM credentials WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(credential)
    }

    /// Replaces the stored password hash
    ///
    /// Returns true if the credential exists.
    pub async fn update_password_hash(
        pool: &PgPool,
        id: Uuid,
        password_hash: &str,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("UPDATE credentials SET password_hash = $2 WHERE id = $1")
            .bind(id)
            .bind(password_hash)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Deletes a credential (cascades to its profile and sessions)
    ///
    /// Returns true if a row was deleted.
    pub async fn delete(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM credentials WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

impl User {
    /// Inserts a profile row for an existing credential
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The credential doesn't exist (foreign key violation)
    /// - A profile with the same id or email exists (unique constraint violation)
    /// - Database connection fails
    pub async fn create(pool: &PgPool, data: CreateProfile) -> Result<Self, sqlx::Error> {
        let query = format!(
            r#"
            INSERT INTO users (id, email, first_name, last_name, role, department)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {}
            "#,
            USER_COLUMNS
        );

        let user = sqlx::query_as::<_, User>(&query)
            .bind(data.id)
            .bind(data.email)
            .bind(data.first_name)
            .bind(data.last_name)
            .bind(data.role)
            .bind(data.department)
            .fetch_one(pool)
            .await?;

        Ok(user)
    }

    /// Finds a profile by ID
    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        let query = format!("SELECT {} FROM users WHERE id = $1", USER_COLUMNS);

        let user = sqlx::query_as::<_, User>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await?;

        Ok(user)
    }

    /// Lists every profile ordered by first name (team directory)
    pub async fn list_by_first_name(pool: &PgPool) -> Result<Vec<Self>, sqlx::Error> {
        let query = format!(
            "SELECT {} FROM users ORDER BY first_name ASC, last_name ASC",
            USER_COLUMNS
        );

        let users = sqlx::query_as::<_, User>(&query).fetch_all(pool).await?;

        Ok(users)
    }

    /// Updates a profile
    ///
    /// Only non-None fields in `data` will be updated. The `updated_at`
    /// timestamp is always refreshed.
    ///
    /// # Returns
    ///
    /// The updated profile if found, None if it doesn't exist
    pub async fn update(
        pool: &PgPool,
        id: Uuid,
        data: UpdateProfile,
    ) -> Result<Option<Self>, sqlx::Error> {
        // Build dynamic update query based on which fields are present
        let mut query = String::from("UPDATE users SET updated_at = NOW()");
        let mut bind_count = 1;

        let text_columns = [
            ("first_name", data.first_name.is_some()),
            ("last_name", data.last_name.is_some()),
            ("role", data.role.is_some()),
            ("department", data.department.is_some()),
            ("avatar_url", data.avatar_url.is_some()),
            ("phone", data.phone.is_some()),
            ("location", data.location.is_some()),
            ("bio", data.bio.is_some()),
        ];
        for (column, present) in text_columns {
            if present {
                bind_count += 1;
                query.push_str(&format!(", {} = ${}", column, bind_count));
            }
        }

        query.push_str(&format!(" WHERE id = $1 RETURNING {}", USER_COLUMNS));

        let mut q = sqlx::query_as::<_, User>(&query).bind(id);

        // Bind order must follow the column order above
        for value in [data.first_name, data.last_name, data.role, data.department]
            .into_iter()
            .flatten()
        {
            q = q.bind(value);
        }
        for value in [data.avatar_url, data.phone, data.location, data.bio]
            .into_iter()
            .flatten()
        {
            q = q.bind(value);
        }

        let user = q.fetch_optional(pool).await?;

        Ok(user)
    }
}
