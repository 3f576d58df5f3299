//! Request version resolution.
//!
//! Reads the API version a caller asked for back out of the request path:
//! the first segment of the form `{prefix}<n>/`, where `n` is a positive
//! integer without a leading zero, decides the version. Anything before or
//! after that segment is ignored, so `/api/v2/tasks` and `/v2/tasks/123`
//! both resolve to `2`.

use std::sync::Arc;

use axum::extract::{FromRequestParts, OriginalUri};
use axum::http::request::Parts;

use crate::routing::error::VersionError;
use crate::routing::version::VERSION_PREFIX;

/// Stateless version extractor for a given path prefix.
#[derive(Debug, Clone)]
pub struct VersionResolver {
    prefix: Arc<str>,
}

impl Default for VersionResolver {
    fn default() -> Self {
        Self::new(VERSION_PREFIX)
    }
}

impl VersionResolver {
    pub fn new(prefix: impl Into<Arc<str>>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn resolve(&self, path: &str) -> Result<u32, VersionError> {
        self.find(path).ok_or_else(|| VersionError::NotFound {
            path: path.to_string(),
        })
    }

    fn find(&self, path: &str) -> Option<u32> {
        let prefix = &*self.prefix;
        if prefix.is_empty() {
            return None;
        }

        path.match_indices(prefix).find_map(|(start, _)| {
            let rest = &path[start + prefix.len()..];
            let digits = rest.bytes().take_while(u8::is_ascii_digit).count();
            if digits == 0 || rest.starts_with('0') || rest.as_bytes().get(digits) != Some(&b'/') {
                return None;
            }
            // Overflowing digit runs are not a version.
            rest[..digits].parse().ok()
        })
    }
}

/// Resolve with the default `/v` prefix.
pub fn resolve_version(path: &str) -> Result<u32, VersionError> {
    VersionResolver::default().resolve(path)
}

/// Version requested by the current request.
///
/// Resolved from the original request URI with the resolver the dispatcher
/// attached to the request, or the default one. Rejects with
/// `400 Bad Request` when the path carries no version segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ApiVersion(pub u32);

impl<S> FromRequestParts<S> for ApiVersion
where
    S: Send + Sync,
{
    type Rejection = VersionError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let uri = match OriginalUri::from_request_parts(parts, state).await {
            Ok(OriginalUri(uri)) => uri,
            Err(never) => match never {},
        };
        let resolver = parts
            .extensions
            .get::<VersionResolver>()
            .cloned()
            .unwrap_or_default();
        resolver.resolve(uri.path()).map(ApiVersion)
    }
}
