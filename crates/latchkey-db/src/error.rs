//! Database-specific error types and conversions.

use latchkey_core::error::LatchkeyError;

/// Database-layer error type.
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    #[error("SurrealDB error: {0}")]
    Surreal(#[from] surrealdb::Error),

    #[error("Migration failed: {0}")]
    Migration(String),

    #[error("Query failed: {0}")]
    Query(String),

    #[error("Malformed row: {0}")]
    InvalidRow(String),

    #[error("Record not found: {entity} with id {id}")]
    NotFound { entity: String, id: String },

    #[error("Unique constraint violated: {0}")]
    Conflict(String),
}

impl DbError {
    /// Classify a failed statement by its message. SurrealDB reports
    /// unique index and duplicate record violations only as text.
    pub(crate) fn from_statement(message: String) -> Self {
        if message.contains("already contains") || message.contains("already exists") {
            DbError::Conflict(message)
        } else {
            DbError::Query(message)
        }
    }
}

impl From<DbError> for LatchkeyError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound { entity, id } => LatchkeyError::NotFound { entity, id },
            DbError::Conflict(entity) => LatchkeyError::Conflict { entity },
            other => LatchkeyError::Database(other.to_string()),
        }
    }
}
