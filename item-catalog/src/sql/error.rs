//! Structured errors for the SQL execution layer

use std::fmt;

use crate::context::Interrupted;

/// Result type for [`SqlHandler`](super::SqlHandler) calls
pub type DbResult<T> = std::result::Result<T, DatabaseError>;

/// Database operation being performed when the error occurred
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DatabaseOperation {
    /// Establishing a database connection
    Connect,
    /// Running a statement that returns no rows
    Execute,
    /// Running a statement that returns a row set
    Query,
    /// Running a statement that returns a single row
    QueryRow,
    /// Reading a column out of a fetched row
    Scan,
    /// Acquiring a connection from the pool
    PoolAcquire,
}

impl fmt::Display for DatabaseOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Connect => write!(f, "connect"),
            Self::Execute => write!(f, "execute"),
            Self::Query => write!(f, "query"),
            Self::QueryRow => write!(f, "query_row"),
            Self::Scan => write!(f, "scan"),
            Self::PoolAcquire => write!(f, "pool_acquire"),
        }
    }
}

/// Category of database error
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DatabaseErrorKind {
    /// A single-row query matched nothing
    NoRows,
    /// The request context was cancelled
    Cancelled,
    /// The request context deadline elapsed
    Timeout,
    /// Failed to establish connection
    ConnectionFailed,
    /// Constraint violation (unique, not null, check)
    ConstraintViolation,
    /// Query execution failed
    QueryFailed,
    /// Column value could not be converted to the requested type
    TypeConversion,
    /// Connection pool exhausted
    PoolExhausted,
    /// Other/unknown error
    Other,
}

impl fmt::Display for DatabaseErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoRows => write!(f, "no_rows"),
            Self::Cancelled => write!(f, "cancelled"),
            Self::Timeout => write!(f, "timeout"),
            Self::ConnectionFailed => write!(f, "connection_failed"),
            Self::ConstraintViolation => write!(f, "constraint_violation"),
            Self::QueryFailed => write!(f, "query_failed"),
            Self::TypeConversion => write!(f, "type_conversion"),
            Self::PoolExhausted => write!(f, "pool_exhausted"),
            Self::Other => write!(f, "other"),
        }
    }
}

/// Structured database error with operation context
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatabaseError {
    /// The operation being performed when the error occurred
    pub operation: DatabaseOperation,
    /// The category of error
    pub kind: DatabaseErrorKind,
    /// Human-readable error message
    pub message: String,
    /// Additional context (e.g., column index, statement fragment)
    pub context: Option<String>,
}

impl DatabaseError {
    pub fn new(
        operation: DatabaseOperation,
        kind: DatabaseErrorKind,
        message: impl Into<String>,
    ) -> Self {
        Self {
            operation,
            kind,
            message: message.into(),
            context: None,
        }
    }

    /// A single-row query found nothing
    pub fn no_rows() -> Self {
        Self::new(
            DatabaseOperation::QueryRow,
            DatabaseErrorKind::NoRows,
            "no rows in result set",
        )
    }

    pub fn connection_failed(message: impl Into<String>) -> Self {
        Self::new(
            DatabaseOperation::Connect,
            DatabaseErrorKind::ConnectionFailed,
            message,
        )
    }

    pub fn query_failed(operation: DatabaseOperation, message: impl Into<String>) -> Self {
        Self::new(operation, DatabaseErrorKind::QueryFailed, message)
    }

    pub fn constraint_violation(operation: DatabaseOperation, message: impl Into<String>) -> Self {
        Self::new(operation, DatabaseErrorKind::ConstraintViolation, message)
    }

    /// A column could not be read as the requested type
    pub fn type_conversion(index: usize, message: impl Into<String>) -> Self {
        Self::new(
            DatabaseOperation::Scan,
            DatabaseErrorKind::TypeConversion,
            message,
        )
        .add_context(format!("column {}", index))
    }

    /// Translate a context interruption into the matching error kind
    pub fn interrupted(operation: DatabaseOperation, reason: Interrupted) -> Self {
        match reason {
            Interrupted::Cancelled => {
                Self::new(operation, DatabaseErrorKind::Cancelled, "context cancelled")
            }
            Interrupted::DeadlineExceeded => Self::new(
                operation,
                DatabaseErrorKind::Timeout,
                "context deadline exceeded",
            ),
        }
    }

    /// Check if this error is retriable (transient errors that may succeed on retry)
    pub fn is_retriable(&self) -> bool {
        matches!(
            self.kind,
            DatabaseErrorKind::ConnectionFailed
                | DatabaseErrorKind::Timeout
                | DatabaseErrorKind::PoolExhausted
        )
    }

    /// Add context to an existing error
    #[must_use]
    pub fn add_context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }

    #[must_use]
    pub fn with_operation(mut self, operation: DatabaseOperation) -> Self {
        self.operation = operation;
        self
    }
}

impl fmt::Display for DatabaseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Database {} error during {}: {}",
            self.kind, self.operation, self.message
        )?;
        if let Some(ref ctx) = self.context {
            write!(f, " [context: {}]", ctx)?;
        }
        Ok(())
    }
}

impl std::error::Error for DatabaseError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_rows_is_not_retriable() {
        let err = DatabaseError::no_rows();
        assert_eq!(err.kind, DatabaseErrorKind::NoRows);
        assert_eq!(err.operation, DatabaseOperation::QueryRow);
        assert!(!err.is_retriable());
    }

    #[test]
    fn test_interrupted_maps_to_kind() {
        let cancelled = DatabaseError::interrupted(DatabaseOperation::Execute, Interrupted::Cancelled);
        assert_eq!(cancelled.kind, DatabaseErrorKind::Cancelled);
        assert!(!cancelled.is_retriable());

        let expired =
            DatabaseError::interrupted(DatabaseOperation::Query, Interrupted::DeadlineExceeded);
        assert_eq!(expired.kind, DatabaseErrorKind::Timeout);
        assert!(expired.is_retriable());
    }

    #[test]
    fn test_display_with_context() {
        let err = DatabaseError::type_conversion(3, "expected integer, got text");
        let display = err.to_string();
        assert!(display.contains("type_conversion"));
        assert!(display.contains("scan"));
        assert!(display.contains("[context: column 3]"));
    }

    #[test]
    fn test_display_without_context() {
        let err = DatabaseError::connection_failed("refused");
        assert_eq!(
            err.to_string(),
            "Database connection_failed error during connect: refused"
        );
    }
}
