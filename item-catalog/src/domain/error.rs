use thiserror::Error;

/// An [`Item`](super::Item) invariant that does not hold
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("name must not be empty")]
    EmptyName,

    #[error("category must not be empty")]
    EmptyCategory,

    #[error("purchase_price must be >= 0, got {0}")]
    NegativePrice(i64),
}
