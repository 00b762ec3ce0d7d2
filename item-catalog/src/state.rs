//! Application state shared across handlers

use std::sync::Arc;

use crate::{
    config::Config, context::RequestContext, sql::SqliteHandler, usecase::ItemUsecase,
};

/// Application state shared across handlers
///
/// Cloning is cheap; every field is reference counted.
#[derive(Clone)]
pub struct AppState {
    config: Arc<Config>,
    items: Arc<dyn ItemUsecase>,
    db: Option<SqliteHandler>,
}

impl AppState {
    /// Create state without a storage handle; readiness then reports no dependencies
    pub fn new(config: Config, items: Arc<dyn ItemUsecase>) -> Self {
        Self {
            config: Arc::new(config),
            items,
            db: None,
        }
    }

    /// Attach the storage handle probed by `/ready`
    #[must_use]
    pub fn with_database(mut self, db: SqliteHandler) -> Self {
        self.db = Some(db);
        self
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn items(&self) -> &dyn ItemUsecase {
        self.items.as_ref()
    }

    pub fn db(&self) -> Option<&SqliteHandler> {
        self.db.as_ref()
    }

    /// Fresh context bounded by `service.timeout_secs`
    pub fn request_context(&self) -> RequestContext {
        RequestContext::with_timeout(self.config.service.timeout())
    }
}
