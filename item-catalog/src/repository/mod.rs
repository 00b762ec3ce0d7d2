//! Item storage
//!
//! [`ItemRepository`] is the data-access contract the usecase layer depends
//! on. [`SqlItemRepository`] implements it over any [`SqlHandler`](crate::sql::SqlHandler)
//! with parameterized statements only.

mod error;
mod item;

pub use error::{RepositoryError, RepositoryErrorKind, RepositoryOperation};
pub use item::{ItemRepository, RepositoryResult, SqlItemRepository};

#[cfg(test)]
pub use item::MockItemRepository;
