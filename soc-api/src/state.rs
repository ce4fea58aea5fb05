//! Shared application state for Axum routers.

use std::sync::Arc;
use std::time::Instant;

use soc_storage::{DbConfig, SqliteStudyStore, StudyStore};

use crate::error_pages::ErrorPages;
use crate::render::{HtmlRenderer, TemplateRenderer};

/// Application-wide state shared across all routes.
///
/// Built once at startup and read-only afterwards.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn StudyStore>,
    pub renderer: Arc<dyn TemplateRenderer>,
    pub error_pages: Arc<ErrorPages>,
    pub start_time: Instant,
}

impl AppState {
    pub fn new(store: Arc<dyn StudyStore>, renderer: Arc<dyn TemplateRenderer>) -> Self {
        Self {
            store,
            renderer,
            error_pages: Arc::new(ErrorPages::standard()),
            start_time: Instant::now(),
        }
    }

    /// SQLite store at the configured path with the built-in renderer.
    pub fn from_config(db_config: &DbConfig) -> Self {
        Self::new(
            Arc::new(SqliteStudyStore::from_config(db_config)),
            Arc::new(HtmlRenderer::default()),
        )
    }
}

crate::impl_from_ref!(Arc<dyn StudyStore>, store);
crate::impl_from_ref!(Arc<dyn TemplateRenderer>, renderer);
