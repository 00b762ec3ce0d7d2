use thiserror::Error;

use crate::domain::ValidationError;
use crate::repository::{RepositoryError, RepositoryErrorKind};

/// Failure of an item usecase
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ItemError {
    #[error("item not found")]
    NotFound,

    #[error("invalid input: {message}")]
    InvalidInput { message: String },

    #[error("request cancelled")]
    Cancelled,

    #[error("request timed out")]
    Timeout,

    #[error("storage failure: {0}")]
    Storage(#[source] RepositoryError),
}

/// Closed set of usecase failure categories
///
/// The HTTP layer matches on this exhaustively, so adding a variant is a
/// compile error there until it is mapped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ItemErrorKind {
    NotFound,
    InvalidInput,
    Cancelled,
    Timeout,
    Storage,
}

impl ItemError {
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput {
            message: message.into(),
        }
    }

    pub fn kind(&self) -> ItemErrorKind {
        match self {
            Self::NotFound => ItemErrorKind::NotFound,
            Self::InvalidInput { .. } => ItemErrorKind::InvalidInput,
            Self::Cancelled => ItemErrorKind::Cancelled,
            Self::Timeout => ItemErrorKind::Timeout,
            Self::Storage(_) => ItemErrorKind::Storage,
        }
    }
}

impl From<ValidationError> for ItemError {
    fn from(err: ValidationError) -> Self {
        Self::invalid_input(err.to_string())
    }
}

impl From<RepositoryError> for ItemError {
    fn from(err: RepositoryError) -> Self {
        match err.kind {
            RepositoryErrorKind::NotFound => Self::NotFound,
            // update re-validates; its message is the entity's own
            RepositoryErrorKind::ValidationFailed => Self::InvalidInput {
                message: err.message,
            },
            RepositoryErrorKind::Cancelled => Self::Cancelled,
            RepositoryErrorKind::Timeout => Self::Timeout,
            RepositoryErrorKind::ConstraintViolation
            | RepositoryErrorKind::ConnectionFailed
            | RepositoryErrorKind::DatabaseError
            | RepositoryErrorKind::SerializationError => Self::Storage(err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::RepositoryOperation;
    use rstest::rstest;

    #[rstest]
    #[case(RepositoryErrorKind::NotFound, ItemErrorKind::NotFound)]
    #[case(RepositoryErrorKind::ValidationFailed, ItemErrorKind::InvalidInput)]
    #[case(RepositoryErrorKind::Cancelled, ItemErrorKind::Cancelled)]
    #[case(RepositoryErrorKind::Timeout, ItemErrorKind::Timeout)]
    #[case(RepositoryErrorKind::ConstraintViolation, ItemErrorKind::Storage)]
    #[case(RepositoryErrorKind::ConnectionFailed, ItemErrorKind::Storage)]
    #[case(RepositoryErrorKind::DatabaseError, ItemErrorKind::Storage)]
    #[case(RepositoryErrorKind::SerializationError, ItemErrorKind::Storage)]
    fn test_repository_kind_mapping(
        #[case] repo_kind: RepositoryErrorKind,
        #[case] expected: ItemErrorKind,
    ) {
        let err = RepositoryError::new(RepositoryOperation::Update, repo_kind, "boom");
        assert_eq!(ItemError::from(err).kind(), expected);
    }

    #[test]
    fn test_validation_error_becomes_invalid_input() {
        let err = ItemError::from(ValidationError::EmptyCategory);
        assert_eq!(err, ItemError::invalid_input("category must not be empty"));
    }

    #[test]
    fn test_storage_keeps_source() {
        let repo = RepositoryError::new(
            RepositoryOperation::FindAll,
            RepositoryErrorKind::ConnectionFailed,
            "refused",
        );
        let err = ItemError::from(repo.clone());
        assert_eq!(err, ItemError::Storage(repo));
        assert!(std::error::Error::source(&err).is_some());
    }
}
