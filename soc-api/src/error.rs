//! Error Types for soc API
//!
//! This module defines error handling for the page layer, including:
//! - ApiError struct carrying a code and a server-side message
//! - ErrorCode enum mapping each category to an HTTP status
//! - IntoResponse implementation for Axum
//!
//! The client only ever sees the status code and the shared error page; the
//! message is for logs.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use soc_core::StoreError;
use std::fmt;

use crate::render::RenderError;

// ============================================================================
// ERROR CODE ENUM
// ============================================================================

/// Error codes for page responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    // ========================================================================
    // Client Errors (400, 403, 404, 410)
    // ========================================================================
    /// Configuration or request input is invalid
    InvalidInput,

    /// Access to the resource is forbidden
    Forbidden,

    /// No route or file matches the request
    PageNotFound,

    /// No study carries the requested curated number
    StudyNotFound,

    /// The resource existed once and is gone
    Gone,

    // ========================================================================
    // Server Errors (500)
    // ========================================================================
    /// The study database file is missing
    DataSourceNotFound,

    /// A query failed or returned undecodable data
    DatabaseError,

    /// A page template could not be rendered
    RenderFailed,

    /// Anything else
    InternalError,
}

impl ErrorCode {
    /// Get the HTTP status code for this error code.
    pub fn status_code(&self) -> StatusCode {
        match self {
            ErrorCode::InvalidInput => StatusCode::BAD_REQUEST,
            ErrorCode::Forbidden => StatusCode::FORBIDDEN,
            ErrorCode::PageNotFound | ErrorCode::StudyNotFound => StatusCode::NOT_FOUND,
            ErrorCode::Gone => StatusCode::GONE,

            ErrorCode::DataSourceNotFound
            | ErrorCode::DatabaseError
            | ErrorCode::RenderFailed
            | ErrorCode::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get a default message for this error code.
    pub fn default_message(&self) -> &'static str {
        match self {
            ErrorCode::InvalidInput => "Invalid input",
            ErrorCode::Forbidden => "Access forbidden",
            ErrorCode::PageNotFound => "Page not found",
            ErrorCode::StudyNotFound => "Study not found",
            ErrorCode::Gone => "Resource is gone",
            ErrorCode::DataSourceNotFound => "Study database not found",
            ErrorCode::DatabaseError => "Database operation failed",
            ErrorCode::RenderFailed => "Page rendering failed",
            ErrorCode::InternalError => "Internal server error",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

// ============================================================================
// API ERROR STRUCT
// ============================================================================

/// Error returned by page handlers and startup code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiError {
    /// Error code categorizing the error
    pub code: ErrorCode,

    /// Message for logs; never sent to the client
    pub message: String,
}

impl ApiError {
    /// Create a new API error with the given code and message.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    /// Create a new API error with the given code, using the default message.
    pub fn from_code(code: ErrorCode) -> Self {
        Self::new(code, code.default_message())
    }

    /// Get the HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        self.code.status_code()
    }

    // ========================================================================
    // Convenience constructors for common errors
    // ========================================================================

    /// Create an InvalidInput error.
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidInput, message)
    }

    /// Create a Forbidden error.
    pub fn forbidden() -> Self {
        Self::from_code(ErrorCode::Forbidden)
    }

    /// Create a PageNotFound error for `path`.
    pub fn page_not_found(path: impl fmt::Display) -> Self {
        Self::new(ErrorCode::PageNotFound, format!("No page at {}", path))
    }

    /// Create a StudyNotFound error.
    pub fn study_not_found(curated_study_number: impl fmt::Display) -> Self {
        Self::new(
            ErrorCode::StudyNotFound,
            format!("Study {} not found", curated_study_number),
        )
    }

    /// Create a Gone error.
    pub fn gone() -> Self {
        Self::from_code(ErrorCode::Gone)
    }

    /// Create a RenderFailed error.
    pub fn render_failed(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::RenderFailed, message)
    }

    /// Create an InternalError.
    pub fn internal_error(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InternalError, message)
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code, self.message)
    }
}

impl std::error::Error for ApiError {}

// ============================================================================
// AXUM INTEGRATION
// ============================================================================

/// The body is a bare reason phrase. Registered statuses get the shared
/// error page in place of it (see `error_pages`).
impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(code = %self.code, message = %self.message, "Request failed");
        } else {
            tracing::debug!(code = %self.code, message = %self.message, "Request rejected");
        }
        (status, self.code.default_message()).into_response()
    }
}

// ============================================================================
// CONVERSIONS FROM LIBRARY ERRORS
// ============================================================================

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::StudyNotFound {
                curated_study_number,
            } => ApiError::study_not_found(curated_study_number),
            StoreError::DataSourceNotFound { .. } => {
                ApiError::new(ErrorCode::DataSourceNotFound, err.to_string())
            }
            StoreError::MissingColumn { .. }
            | StoreError::Decode { .. }
            | StoreError::Database { .. } => {
                ApiError::new(ErrorCode::DatabaseError, err.to_string())
            }
        }
    }
}

impl From<RenderError> for ApiError {
    fn from(err: RenderError) -> Self {
        ApiError::render_failed(err.to_string())
    }
}

impl From<tokio::task::JoinError> for ApiError {
    fn from(err: tokio::task::JoinError) -> Self {
        ApiError::internal_error(format!("Blocking task failed: {}", err))
    }
}

// ============================================================================
// RESULT TYPE ALIAS
// ============================================================================

/// Result type alias for API operations.
pub type ApiResult<T> = Result<T, ApiError>;
