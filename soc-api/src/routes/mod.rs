//! Route Modules
//!
//! All routes are registered once in [`create_router`].

use axum::{http::Uri, middleware, routing::get, Router};
use std::path::Path;
use tower_http::{compression::CompressionLayer, services::ServeDir, trace::TraceLayer};

use crate::error::ApiError;
use crate::error_pages::error_page_middleware;
use crate::state::AppState;
use crate::telemetry::observability_middleware;

pub mod health;
pub mod pages;

/// Build the application router.
///
/// Layer order, outermost first: request tracing, observability, compression,
/// error pages. Error pages therefore see every response, including static
/// file misses and the fallback.
pub fn create_router(state: AppState, static_dir: &Path) -> Router {
    Router::new()
        .route("/", get(pages::index_html))
        .route("/index.html", get(pages::index_html))
        .route("/study/:page", get(pages::study_html))
        .nest("/health", health::create_router())
        .nest_service("/static", ServeDir::new(static_dir))
        .fallback(not_found)
        .layer(middleware::from_fn_with_state(
            state.clone(),
            error_page_middleware,
        ))
        .layer(CompressionLayer::new())
        .layer(middleware::from_fn(observability_middleware))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn not_found(uri: Uri) -> ApiError {
    ApiError::page_not_found(uri.path())
}
