//! soc API - HTML Pages over the Study Database
//!
//! Axum front end for the read-only study database:
//! - the study list and one page per study, rendered server-side
//! - the client-side plotting scripts under `/static`
//! - registered error pages for 404, 500, 403 and 410
//! - health probes under `/health`

pub mod config;
pub mod error;
pub mod error_pages;
pub mod macros;
pub mod render;
pub mod routes;
pub mod server;
pub mod state;
pub mod telemetry;

pub use config::ServerConfig;
pub use error::{ApiError, ApiResult, ErrorCode};
pub use error_pages::{error_page_middleware, ErrorPages};
pub use render::{HtmlRenderer, RenderError, TemplateContext, TemplateRenderer};
pub use routes::create_router;
pub use server::{bind_listener, serve};
pub use state::AppState;

pub use soc_storage::{DbConfig, SqliteStudyStore, StudyStore};
