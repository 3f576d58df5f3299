//! Routing error definitions.
//!
//! Two disjoint classes:
//! - [`RouteError`]: configuration defects found while building the route
//!   table. Always fatal to startup.
//! - [`VersionError`] and [`DispatchError`]: per-request failures, turned
//!   into HTTP responses and never fatal to the process.

use axum::http::{header, HeaderValue, Method, StatusCode};
use axum::response::{IntoResponse, Response};
use thiserror::Error;

/// Which bound of a version range was violated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RangeViolation {
    /// `from` is below the configured minimum.
    BelowMinimum { min: u32 },
    /// `until` is above the configured maximum.
    AboveMaximum { max: u32 },
    /// `from` is greater than the effective `until`.
    Inverted,
}

impl std::fmt::Display for RangeViolation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RangeViolation::BelowMinimum { min } => {
                write!(f, "from is below minimum api version {}", min)
            }
            RangeViolation::AboveMaximum { max } => {
                write!(f, "until is above maximum api version {}", max)
            }
            RangeViolation::Inverted => write!(f, "from is greater than until"),
        }
    }
}

/// Errors raised while expanding and registering routes.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RouteError {
    /// The declared version range is outside the configured bounds or empty.
    #[error(
        "Invalid api versions for endpoint {endpoint} (from: {from}, until: {until}): {violation}"
    )]
    InvalidRange {
        endpoint: String,
        from: u32,
        until: u32,
        violation: RangeViolation,
    },

    /// A path template that cannot be registered.
    #[error("Invalid path template {path:?} for endpoint {endpoint}")]
    InvalidPath { endpoint: String, path: String },

    /// Two endpoints would match the same request.
    #[error("Ambiguous mapping: {duplicate} conflicts with {existing} on {method} {path}")]
    Conflict {
        existing: String,
        duplicate: String,
        method: String,
        path: String,
    },
}

/// The version could not be read from a request path.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum VersionError {
    #[error("Invalid version detected in path {path:?}")]
    NotFound { path: String },
}

impl IntoResponse for VersionError {
    fn into_response(self) -> Response {
        (StatusCode::BAD_REQUEST, self.to_string()).into_response()
    }
}

/// No registered route accepted the request.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DispatchError {
    #[error("No matching route found")]
    NotFound,

    #[error("Method not allowed")]
    MethodNotAllowed { allowed: Vec<Method> },

    #[error("Required request parameter missing or mismatched")]
    BadParams,

    #[error("Unsupported media type")]
    UnsupportedMediaType,

    #[error("No acceptable representation")]
    NotAcceptable,
}

impl DispatchError {
    pub fn status(&self) -> StatusCode {
        match self {
            DispatchError::NotFound => StatusCode::NOT_FOUND,
            DispatchError::MethodNotAllowed { .. } => StatusCode::METHOD_NOT_ALLOWED,
            DispatchError::BadParams => StatusCode::BAD_REQUEST,
            DispatchError::UnsupportedMediaType => StatusCode::UNSUPPORTED_MEDIA_TYPE,
            DispatchError::NotAcceptable => StatusCode::NOT_ACCEPTABLE,
        }
    }
}

impl IntoResponse for DispatchError {
    fn into_response(self) -> Response {
        let mut response = (self.status(), self.to_string()).into_response();
        if let DispatchError::MethodNotAllowed { allowed } = &self {
            let allow = allowed
                .iter()
                .map(Method::as_str)
                .collect::<Vec<_>>()
                .join(", ");
            if let Ok(value) = HeaderValue::from_str(&allow) {
                response.headers_mut().insert(header::ALLOW, value);
            }
        }
        response
    }
}
