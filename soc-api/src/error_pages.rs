//! Registered Error Pages
//!
//! A fixed set of status codes is registered at startup. Any response that
//! leaves the router with one of them gets its body replaced by the shared
//! `errorhandler.html` page; the status code is kept.

use axum::{
    body::Body,
    extract::{Request, State},
    http::{header, HeaderValue, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use std::collections::BTreeSet;

use crate::render::{TemplateContext, ERROR_TEMPLATE};
use crate::state::AppState;

/// Status codes rendered with the shared error page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorPages {
    statuses: BTreeSet<u16>,
}

impl ErrorPages {
    pub fn new(statuses: impl IntoIterator<Item = StatusCode>) -> Self {
        Self {
            statuses: statuses.into_iter().map(|s| s.as_u16()).collect(),
        }
    }

    /// 404, 500, 403 and 410.
    pub fn standard() -> Self {
        Self::new([
            StatusCode::NOT_FOUND,
            StatusCode::INTERNAL_SERVER_ERROR,
            StatusCode::FORBIDDEN,
            StatusCode::GONE,
        ])
    }

    pub fn handles(&self, status: StatusCode) -> bool {
        self.statuses.contains(&status.as_u16())
    }
}

/// Swap the body of registered error responses for the error page.
pub async fn error_page_middleware(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    let response = next.run(request).await;
    let status = response.status();
    if !state.error_pages.handles(status) {
        return response;
    }

    let html = match state.renderer.render(ERROR_TEMPLATE, &TemplateContext::new()) {
        Ok(html) => html,
        Err(err) => {
            tracing::error!(status = status.as_u16(), error = %err, "Error page rendering failed");
            return (status, status.canonical_reason().unwrap_or("Error")).into_response();
        }
    };

    let (mut parts, _) = response.into_parts();
    parts.headers.remove(header::CONTENT_LENGTH);
    parts.headers.remove(header::CONTENT_ENCODING);
    parts.headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("text/html; charset=utf-8"),
    );
    Response::from_parts(parts, Body::from(html))
}
