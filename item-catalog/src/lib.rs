//! # item-catalog
//!
//! Catalog service for owned physical items (watches, bags, ...) with
//! create, read, partial update, delete, and a per-category count.
//!
//! ## Layers
//!
//! - [`domain`]: the [`Item`](domain::Item) entity and its invariants
//! - [`usecase`]: orchestration, patch merging, the closed error kind set
//! - [`repository`]: the data-access contract and its SQL implementation
//! - [`sql`]: the minimal SQL execution interface and its sqlx SQLite adapter
//! - [`handlers`]: axum endpoints and the HTTP error mapping
//!
//! ## Example
//!
//! ```rust,no_run
//! use item_catalog::prelude::*;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let config = Config::load()?;
//!     init_tracing(&config)?;
//!
//!     let handler = SqliteHandler::new(create_pool(&config.database).await?);
//!     ensure_schema(&handler).await?;
//!
//!     let items = ItemInteractor::new(SqlItemRepository::new(handler.clone()));
//!     let state = AppState::new(config.clone(), Arc::new(items)).with_database(handler);
//!
//!     Server::new(config).serve(router(state)).await
//! }
//! ```

pub mod config;
pub mod context;
pub mod database;
pub mod domain;
pub mod error;
pub mod handlers;
pub mod health;
pub mod observability;
pub mod repository;
pub mod server;
pub mod sql;
pub mod state;
pub mod usecase;

/// Commonly used types for wiring the service
pub mod prelude {
    pub use crate::config::Config;
    pub use crate::context::RequestContext;
    pub use crate::database::{connect_in_memory, create_pool, ensure_schema};
    pub use crate::domain::{Item, ValidationError};
    pub use crate::error::{Error, Result};
    pub use crate::handlers::{ApiError, ApiErrorKind};
    pub use crate::health::{health, readiness};
    pub use crate::observability::init_tracing;
    pub use crate::repository::{ItemRepository, RepositoryError, SqlItemRepository};
    pub use crate::server::{router, Server};
    pub use crate::sql::{SqlHandler, SqliteHandler};
    pub use crate::state::AppState;
    pub use crate::usecase::{
        CategorySummary, CreateItemInput, ItemError, ItemInteractor, ItemUsecase, PatchItemInput,
    };
}
