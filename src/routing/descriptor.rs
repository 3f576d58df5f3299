//! Handler declarations.
//!
//! A [`HandlerDescriptor`] is the statically built record of one dispatch
//! target: its matching criteria, an optional [`VersionRange`] and the
//! handler itself. A [`HandlerGroup`] plays the role of a controller: it
//! contributes base paths and a default version range to its members.
//!
//! # Design Decisions
//! - Declarations are plain values passed to the registry at startup
//! - A handler-level range fully replaces the group-level one (no
//!   intersection)

use std::sync::Arc;

use axum::body::Body;
use axum::handler::Handler;
use axum::http::{Method, Request};
use axum::response::Response;
use futures_util::future::BoxFuture;

use crate::routing::error::RouteError;
use crate::routing::matcher::{MediaType, NameValueCondition, RequestCriteria};
use crate::routing::version::VersionRange;

/// Type-erased handler invocation target.
#[derive(Clone)]
pub struct Endpoint {
    inner: Arc<dyn Fn(Request<Body>) -> BoxFuture<'static, Response> + Send + Sync>,
}

impl Endpoint {
    /// Wrap any stateless axum handler.
    pub fn from_handler<H, T>(handler: H) -> Self
    where
        H: Handler<T, ()>,
        T: 'static,
    {
        Self {
            inner: Arc::new(move |req: Request<Body>| -> BoxFuture<'static, Response> {
                Box::pin(handler.clone().call(req, ()))
            }),
        }
    }

    pub fn call(&self, req: Request<Body>) -> BoxFuture<'static, Response> {
        (self.inner)(req)
    }
}

impl std::fmt::Debug for Endpoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Endpoint")
    }
}

/// One candidate handler and everything needed to route to it.
#[derive(Debug, Clone)]
pub struct HandlerDescriptor {
    name: String,
    criteria: RequestCriteria,
    version: Option<VersionRange>,
    endpoint: Endpoint,
}

impl HandlerDescriptor {
    /// A handler with no criteria yet; it matches any method on the paths
    /// supplied later (or on its group's paths).
    pub fn new<H, T>(name: impl Into<String>, handler: H) -> Self
    where
        H: Handler<T, ()>,
        T: 'static,
    {
        Self {
            name: name.into(),
            criteria: RequestCriteria::default(),
            version: None,
            endpoint: Endpoint::from_handler(handler),
        }
    }

    pub fn route<H, T>(method: Method, path: impl Into<String>, handler: H) -> Self
    where
        H: Handler<T, ()>,
        T: 'static,
    {
        let path = path.into();
        Self::new(format!("{} {}", method, path), handler)
            .method(method)
            .path(path)
    }

    pub fn get<H, T>(path: impl Into<String>, handler: H) -> Self
    where
        H: Handler<T, ()>,
        T: 'static,
    {
        Self::route(Method::GET, path, handler)
    }

    pub fn post<H, T>(path: impl Into<String>, handler: H) -> Self
    where
        H: Handler<T, ()>,
        T: 'static,
    {
        Self::route(Method::POST, path, handler)
    }

    pub fn put<H, T>(path: impl Into<String>, handler: H) -> Self
    where
        H: Handler<T, ()>,
        T: 'static,
    {
        Self::route(Method::PUT, path, handler)
    }

    pub fn patch<H, T>(path: impl Into<String>, handler: H) -> Self
    where
        H: Handler<T, ()>,
        T: 'static,
    {
        Self::route(Method::PATCH, path, handler)
    }

    pub fn delete<H, T>(path: impl Into<String>, handler: H) -> Self
    where
        H: Handler<T, ()>,
        T: 'static,
    {
        Self::route(Method::DELETE, path, handler)
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn method(mut self, method: Method) -> Self {
        if !self.criteria.methods.contains(&method) {
            self.criteria.methods.push(method);
        }
        self
    }

    pub fn path(mut self, path: impl Into<String>) -> Self {
        self.criteria.paths.push(path.into());
        self
    }

    /// Require a header: `name`, `!name`, `name=value` or `name!=value`.
    pub fn header(mut self, expr: &str) -> Self {
        self.criteria.headers.push(NameValueCondition::header(expr));
        self
    }

    /// Require a query parameter, same expression forms as [`Self::header`].
    pub fn param(mut self, expr: &str) -> Self {
        self.criteria.params.push(NameValueCondition::param(expr));
        self
    }

    pub fn consumes(mut self, media_type: &str) -> Self {
        self.criteria.consumes.push(MediaType::parse(media_type));
        self
    }

    pub fn produces(mut self, media_type: &str) -> Self {
        self.criteria.produces.push(MediaType::parse(media_type));
        self
    }

    /// Serve this handler only for the given API versions.
    pub fn versioned(mut self, range: VersionRange) -> Self {
        self.version = Some(range);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn criteria(&self) -> &RequestCriteria {
        &self.criteria
    }

    pub fn version(&self) -> Option<VersionRange> {
        self.version
    }

    pub fn endpoint(&self) -> &Endpoint {
        &self.endpoint
    }
}

/// Group-level declaration shared by several handlers.
#[derive(Debug, Clone)]
pub struct HandlerGroup {
    name: String,
    criteria: RequestCriteria,
    version: Option<VersionRange>,
    handlers: Vec<HandlerDescriptor>,
}

impl HandlerGroup {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            criteria: RequestCriteria::default(),
            version: None,
            handlers: Vec::new(),
        }
    }

    /// Base path prepended to every member's paths.
    pub fn path(mut self, path: impl Into<String>) -> Self {
        self.criteria.paths.push(path.into());
        self
    }

    /// Method added to every member's methods.
    pub fn method(mut self, method: Method) -> Self {
        if !self.criteria.methods.contains(&method) {
            self.criteria.methods.push(method);
        }
        self
    }

    pub fn header(mut self, expr: &str) -> Self {
        self.criteria.headers.push(NameValueCondition::header(expr));
        self
    }

    pub fn param(mut self, expr: &str) -> Self {
        self.criteria.params.push(NameValueCondition::param(expr));
        self
    }

    /// Default request media type, replaced by a member's own `consumes`.
    pub fn consumes(mut self, media_type: &str) -> Self {
        self.criteria.consumes.push(MediaType::parse(media_type));
        self
    }

    pub fn produces(mut self, media_type: &str) -> Self {
        self.criteria.produces.push(MediaType::parse(media_type));
        self
    }

    /// Default version range for members that declare none.
    pub fn versioned(mut self, range: VersionRange) -> Self {
        self.version = Some(range);
        self
    }

    pub fn handler(mut self, handler: HandlerDescriptor) -> Self {
        self.handlers.push(handler);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Resolve every member into a standalone descriptor.
    ///
    /// Most specific wins: a member's own range replaces the group range.
    /// Under a group path, member paths must be empty or start with `/`.
    pub fn descriptors(&self) -> Result<Vec<HandlerDescriptor>, RouteError> {
        self.handlers
            .iter()
            .map(|h| {
                let name = format!("{}::{}", self.name, h.name);

                if !self.criteria.paths.is_empty() {
                    let relative = h
                        .criteria
                        .paths
                        .iter()
                        .find(|p| !p.is_empty() && !p.starts_with('/'));
                    if let Some(path) = relative {
                        return Err(RouteError::InvalidPath {
                            endpoint: name,
                            path: path.clone(),
                        });
                    }
                }

                let version = match (h.version, self.version) {
                    (Some(own), Some(inherited)) => {
                        tracing::debug!(
                            group = %self.name,
                            endpoint = %h.name,
                            own = %own,
                            inherited = %inherited,
                            "Endpoint version range overrides group range"
                        );
                        Some(own)
                    }
                    (own, inherited) => own.or(inherited),
                };

                Ok(HandlerDescriptor {
                    name,
                    criteria: self.criteria.combine(&h.criteria),
                    version,
                    endpoint: h.endpoint.clone(),
                })
            })
            .collect()
    }
}
