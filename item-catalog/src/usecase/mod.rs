//! Item usecases
//!
//! Orchestrates entity construction, patch merging and repository calls, and
//! converts repository failures into the closed [`ItemErrorKind`] set the
//! HTTP layer maps from.

mod error;
mod item;

pub use error::{ItemError, ItemErrorKind};
pub use item::{
    CategorySummary, CreateItemInput, ItemInteractor, ItemResult, ItemUsecase, PatchItemInput,
};

#[cfg(test)]
pub use item::MockItemUsecase;
