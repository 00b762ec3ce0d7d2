//! Item entity and its invariants

mod entity;
mod error;

pub use entity::Item;
pub use error::ValidationError;
