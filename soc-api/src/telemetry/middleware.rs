//! Axum Middleware for HTTP Request Tracing
//!
//! Wraps every request in a span named by its normalized route and logs a
//! completion line with method, route, status and duration.

use axum::{extract::Request, middleware::Next, response::Response};
use once_cell::sync::Lazy;
use regex::Regex;
use std::time::Instant;
use tracing::{info_span, Instrument};

static STUDY_PAGE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^/study/[^/]+\.html$").expect("Invalid study page regex"));

static STUDY_SEGMENT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^/study/[^/]+$").expect("Invalid study segment regex"));

/// Normalize a path for spans (one route per study page, not one per study).
fn normalize_path(path: &str) -> String {
    if STUDY_PAGE.is_match(path) {
        "/study/{curated_study_number}.html".to_string()
    } else if STUDY_SEGMENT.is_match(path) {
        "/study/{page}".to_string()
    } else {
        path.to_string()
    }
}

/// Observability middleware for Axum.
pub async fn observability_middleware(request: Request, next: Next) -> Response {
    let start = Instant::now();

    let method = request.method().clone();
    let path = request.uri().path().to_string();
    let normalized_path = normalize_path(&path);

    let span = info_span!(
        "http_request",
        http.method = %method,
        http.target = %path,
        http.route = %normalized_path,
    );

    let response = next.run(request).instrument(span).await;

    let duration = start.elapsed();
    let status = response.status();

    if status.is_server_error() {
        tracing::warn!(
            method = %method,
            route = %normalized_path,
            status = status.as_u16(),
            duration_ms = duration.as_millis(),
            "Request failed"
        );
    } else {
        tracing::info!(
            method = %method,
            route = %normalized_path,
            status = status.as_u16(),
            duration_ms = duration.as_millis(),
            "Request completed"
        );
    }

    response
}
