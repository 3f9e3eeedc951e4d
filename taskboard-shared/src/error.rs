/// Data access errors
///
/// Every backend failure surfaces as a [`StoreError`], whichever [`Store`]
/// implementation produced it. Postgres errors are classified by database error
/// kind so callers can tell a constraint violation from a transport failure.
///
/// [`Store`]: crate::store::Store

/// Store result type alias
pub type StoreResult<T> = Result<T, StoreError>;

/// Error type for store operations
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// A row the operation depends on does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// Unique or exclusion constraint violated (duplicate email, duplicate membership, ...)
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Foreign key violated (referenced user/project does not exist)
    #[error("Missing reference: {0}")]
    MissingReference(String),

    /// A row came back in a shape that does not match the declared model
    #[error("Failed to decode row: {0}")]
    Decode(String),

    /// Connection, pool or any other backend failure
    #[error("Backend error: {0}")]
    Backend(String),
}

impl StoreError {
    /// Whether this error is a uniqueness conflict
    pub fn is_conflict(&self) -> bool {
        matches!(self, StoreError::Conflict(_))
    }
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => StoreError::NotFound("Row not found".to_string()),
            sqlx::Error::Database(db_err) => {
                let constraint = db_err.constraint().unwrap_or("unknown").to_string();
                if db_err.is_unique_violation() {
                    StoreError::Conflict(constraint)
                } else if db_err.is_foreign_key_violation() {
                    StoreError::MissingReference(constraint)
                } else {
                    StoreError::Backend(db_err.to_string())
                }
            }
            sqlx::Error::ColumnDecode { index, source } => {
                StoreError::Decode(format!("column {}: {}", index, source))
            }
            sqlx::Error::Decode(source) => StoreError::Decode(source.to_string()),
            _ => StoreError::Backend(err.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_row_not_found_maps_to_not_found() {
        let err: StoreError = sqlx::Error::RowNotFound.into();
        assert!(matches!(err, StoreError::NotFound(_)));
    }

    #[test]
    fn test_pool_timeout_maps_to_backend() {
        let err: StoreError = sqlx::Error::PoolTimedOut.into();
        assert!(matches!(err, StoreError::Backend(_)));
        assert!(!err.is_conflict());
    }

    #[test]
    fn test_error_display() {
        let err = StoreError::Conflict("project_members_pkey".to_string());
        assert_eq!(err.to_string(), "Conflict: project_members_pkey");
    }
}
