//! Repository error types
//!
//! This module provides structured error types for repository operations.
//! Driver-level signals from [`DatabaseError`] are translated here, at the
//! repository boundary; in particular a "no rows" result becomes
//! [`RepositoryErrorKind::NotFound`] and never leaks upward.
//!
//! # Example
//!
//! ```rust
//! use item_catalog::repository::{RepositoryError, RepositoryErrorKind};
//!
//! let error = RepositoryError::not_found("Item", 42);
//! assert!(matches!(error.kind, RepositoryErrorKind::NotFound));
//! assert_eq!(error.entity_id, Some(42));
//! ```

use std::fmt;

use crate::domain::ValidationError;
use crate::sql::{DatabaseError, DatabaseErrorKind};

/// Operation being performed when the repository error occurred
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RepositoryOperation {
    /// Finding a single entity by ID
    FindById,
    /// Listing every entity
    FindAll,
    /// Creating a new entity
    Create,
    /// Updating an existing entity
    Update,
    /// Deleting an entity
    Delete,
    /// Counting entities per category
    Summarize,
}

impl fmt::Display for RepositoryOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::FindById => write!(f, "find_by_id"),
            Self::FindAll => write!(f, "find_all"),
            Self::Create => write!(f, "create"),
            Self::Update => write!(f, "update"),
            Self::Delete => write!(f, "delete"),
            Self::Summarize => write!(f, "summarize"),
        }
    }
}

/// Category of repository error
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RepositoryErrorKind {
    /// Entity was not found
    NotFound,
    /// Validation failed before database operation
    ValidationFailed,
    /// The request context was cancelled
    Cancelled,
    /// The request context deadline elapsed
    Timeout,
    /// Database constraint violation
    ConstraintViolation,
    /// Failed to connect to database
    ConnectionFailed,
    /// Underlying database error
    DatabaseError,
    /// A stored row could not be mapped onto the entity
    SerializationError,
}

impl fmt::Display for RepositoryErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound => write!(f, "not_found"),
            Self::ValidationFailed => write!(f, "validation_failed"),
            Self::Cancelled => write!(f, "cancelled"),
            Self::Timeout => write!(f, "timeout"),
            Self::ConstraintViolation => write!(f, "constraint_violation"),
            Self::ConnectionFailed => write!(f, "connection_failed"),
            Self::DatabaseError => write!(f, "database_error"),
            Self::SerializationError => write!(f, "serialization_error"),
        }
    }
}

/// Structured repository error with operation context
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepositoryError {
    /// The operation being performed when the error occurred
    pub operation: RepositoryOperation,
    /// The category of error
    pub kind: RepositoryErrorKind,
    /// Human-readable error message
    pub message: String,
    /// The type of entity involved (e.g., "Item")
    pub entity_type: Option<String>,
    /// The ID of the entity involved
    pub entity_id: Option<i64>,
}

impl RepositoryError {
    pub fn new(
        operation: RepositoryOperation,
        kind: RepositoryErrorKind,
        message: impl Into<String>,
    ) -> Self {
        Self {
            operation,
            kind,
            message: message.into(),
            entity_type: None,
            entity_id: None,
        }
    }

    /// Create a "not found" error with entity context
    pub fn not_found(entity_type: impl Into<String>, entity_id: i64) -> Self {
        Self {
            operation: RepositoryOperation::FindById,
            kind: RepositoryErrorKind::NotFound,
            message: "Entity not found".to_string(),
            entity_type: Some(entity_type.into()),
            entity_id: Some(entity_id),
        }
    }

    /// Create a validation failed error
    pub fn validation_failed(operation: RepositoryOperation, err: &ValidationError) -> Self {
        Self::new(operation, RepositoryErrorKind::ValidationFailed, err.to_string())
    }

    /// Translate a SQL-layer error raised during `operation`
    ///
    /// | database kind | repository kind |
    /// |---|---|
    /// | `NoRows` | `NotFound` |
    /// | `Cancelled` | `Cancelled` |
    /// | `Timeout` | `Timeout` |
    /// | `ConstraintViolation` | `ConstraintViolation` |
    /// | `ConnectionFailed`, `PoolExhausted` | `ConnectionFailed` |
    /// | `TypeConversion` | `SerializationError` |
    /// | anything else | `DatabaseError` |
    pub fn from_database(operation: RepositoryOperation, err: DatabaseError) -> Self {
        let kind = match err.kind {
            DatabaseErrorKind::NoRows => RepositoryErrorKind::NotFound,
            DatabaseErrorKind::Cancelled => RepositoryErrorKind::Cancelled,
            DatabaseErrorKind::Timeout => RepositoryErrorKind::Timeout,
            DatabaseErrorKind::ConstraintViolation => RepositoryErrorKind::ConstraintViolation,
            DatabaseErrorKind::ConnectionFailed | DatabaseErrorKind::PoolExhausted => {
                RepositoryErrorKind::ConnectionFailed
            }
            DatabaseErrorKind::TypeConversion => RepositoryErrorKind::SerializationError,
            DatabaseErrorKind::QueryFailed | DatabaseErrorKind::Other => {
                RepositoryErrorKind::DatabaseError
            }
        };
        Self::new(operation, kind, err.to_string())
    }

    /// Add entity context to an existing error
    #[must_use]
    pub fn with_entity(mut self, entity_type: impl Into<String>, entity_id: i64) -> Self {
        self.entity_type = Some(entity_type.into());
        self.entity_id = Some(entity_id);
        self
    }

    /// Set the operation that caused the error
    #[must_use]
    pub fn with_operation(mut self, operation: RepositoryOperation) -> Self {
        self.operation = operation;
        self
    }

    pub fn is_not_found(&self) -> bool {
        self.kind == RepositoryErrorKind::NotFound
    }

    /// Check if this error is retriable (transient errors that may succeed on retry)
    ///
    /// Nothing in this crate retries; callers outside the core may.
    pub fn is_retriable(&self) -> bool {
        matches!(
            self.kind,
            RepositoryErrorKind::ConnectionFailed | RepositoryErrorKind::Timeout
        )
    }
}

impl fmt::Display for RepositoryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Repository {} error during {}: {}",
            self.kind, self.operation, self.message
        )?;
        if let (Some(ref entity_type), Some(entity_id)) = (&self.entity_type, self.entity_id) {
            write!(f, " [{}: {}]", entity_type, entity_id)?;
        }
        Ok(())
    }
}

impl std::error::Error for RepositoryError {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sql::DatabaseOperation;
    use rstest::rstest;

    #[test]
    fn test_not_found_convenience() {
        let error = RepositoryError::not_found("Item", 7);
        assert_eq!(error.operation, RepositoryOperation::FindById);
        assert_eq!(error.kind, RepositoryErrorKind::NotFound);
        assert_eq!(error.entity_type.as_deref(), Some("Item"));
        assert_eq!(error.entity_id, Some(7));
        assert!(error.is_not_found());
        assert!(!error.is_retriable());
    }

    #[rstest]
    #[case(DatabaseErrorKind::NoRows, RepositoryErrorKind::NotFound)]
    #[case(DatabaseErrorKind::Cancelled, RepositoryErrorKind::Cancelled)]
    #[case(DatabaseErrorKind::Timeout, RepositoryErrorKind::Timeout)]
    #[case(DatabaseErrorKind::ConstraintViolation, RepositoryErrorKind::ConstraintViolation)]
    #[case(DatabaseErrorKind::ConnectionFailed, RepositoryErrorKind::ConnectionFailed)]
    #[case(DatabaseErrorKind::PoolExhausted, RepositoryErrorKind::ConnectionFailed)]
    #[case(DatabaseErrorKind::TypeConversion, RepositoryErrorKind::SerializationError)]
    #[case(DatabaseErrorKind::QueryFailed, RepositoryErrorKind::DatabaseError)]
    #[case(DatabaseErrorKind::Other, RepositoryErrorKind::DatabaseError)]
    fn test_from_database_kind_mapping(
        #[case] db_kind: DatabaseErrorKind,
        #[case] expected: RepositoryErrorKind,
    ) {
        let db = DatabaseError::new(DatabaseOperation::Query, db_kind, "boom");
        let error = RepositoryError::from_database(RepositoryOperation::Update, db);
        assert_eq!(error.kind, expected);
        assert_eq!(error.operation, RepositoryOperation::Update);
    }

    #[test]
    fn test_validation_failed_keeps_message() {
        let error = RepositoryError::validation_failed(
            RepositoryOperation::Update,
            &ValidationError::EmptyName,
        );
        assert_eq!(error.kind, RepositoryErrorKind::ValidationFailed);
        assert_eq!(error.message, "name must not be empty");
    }

    #[test]
    fn test_display_with_entity() {
        let error = RepositoryError::not_found("Item", 123).with_operation(RepositoryOperation::Delete);
        let display = error.to_string();
        assert!(display.contains("not_found"));
        assert!(display.contains("delete"));
        assert!(display.contains("[Item: 123]"));
    }

    #[test]
    fn test_display_without_entity() {
        let error = RepositoryError::new(
            RepositoryOperation::Summarize,
            RepositoryErrorKind::DatabaseError,
            "Query failed",
        );
        let display = error.to_string();
        assert!(display.contains("database_error"));
        assert!(display.contains("summarize"));
        assert!(!display.contains('['));
    }
}
