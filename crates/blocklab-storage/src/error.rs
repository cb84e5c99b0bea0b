//! Storage error types for blocklab-storage.
//!
//! [`StorageError`] covers every failure mode of the storage layer: rejected
//! input, malformed keys, missing documents, and backend failures.

use thiserror::Error;

use crate::types::ProjectId;

/// Errors produced by storage operations.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Required input was missing or malformed.
    #[error("validation error: {0}")]
    Validation(String),

    /// A project key was not well-formed.
    #[error("invalid project id: {0}")]
    InvalidIdentifier(String),

    /// No project with the given ID exists.
    #[error("project not found: {0}")]
    NotFound(ProjectId),

    /// The SQLite backend failed.
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// Applying schema migrations failed.
    #[error("migration error: {0}")]
    Migration(String),

    /// A stored row could not be decoded back into a project.
    #[error("corrupt project row: {reason}")]
    Corrupt { reason: String },
}

impl StorageError {
    /// True for failures of the backend itself rather than of the request.
    pub fn is_unavailable(&self) -> bool {
        matches!(
            self,
            StorageError::Database(_) | StorageError::Migration(_) | StorageError::Corrupt { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ProjectId;

    #[test]
    fn only_backend_failures_are_unavailable() {
        assert!(StorageError::Migration("v2".into()).is_unavailable());
        assert!(StorageError::Corrupt { reason: "lang".into() }.is_unavailable());
        assert!(StorageError::Database(rusqlite::Error::InvalidQuery).is_unavailable());
        assert!(!StorageError::Validation("name".into()).is_unavailable());
        assert!(!StorageError::InvalidIdentifier("zz".into()).is_unavailable());
        assert!(!StorageError::NotFound(ProjectId::new_v4()).is_unavailable());
    }
}
