//! Route lookup and dispatch.
//!
//! # Responsibilities
//! - Hand every path template of the [`RouteTable`] to the axum router
//! - Pick the single entry whose criteria match the request
//! - Return an explicit error response when nothing matches
//!
//! # Design Decisions
//! - Immutable after construction (thread-safe without locks)
//! - axum matches path templates; this module only chooses among entries
//!   that share a template
//! - Explicit HEAD mappings first, then the most specific entry; registration
//!   order breaks ties
//! - Explicit no-match rather than silent default

use std::sync::Arc;
use std::time::Instant;

use axum::body::Body;
use axum::http::{Method, Request, Uri};
use axum::response::{IntoResponse, Response};
use axum::routing::any;
use axum::Router;

use crate::observability::metrics;
use crate::routing::error::DispatchError;
use crate::routing::matcher::{MatchStage, RequestView};
use crate::routing::registry::{RouteEntry, RouteTable};
use crate::routing::resolver::VersionResolver;

/// Select the entry that serves a request among entries sharing a path.
///
/// Candidates are narrowed stage by stage; the stage that rejects the last
/// candidate determines the error.
pub fn select<'a>(
    candidates: &'a [RouteEntry],
    req: &RequestView<'_>,
) -> Result<&'a RouteEntry, DispatchError> {
    let mut remaining: Vec<&RouteEntry> = candidates.iter().collect();

    for stage in MatchStage::ALL {
        let next: Vec<&RouteEntry> = remaining
            .iter()
            .copied()
            .filter(|e| e.criteria.matches_stage(stage, req))
            .collect();

        if next.is_empty() {
            return Err(match stage {
                MatchStage::Method => DispatchError::MethodNotAllowed {
                    allowed: allowed_methods(&remaining),
                },
                MatchStage::Params => DispatchError::BadParams,
                MatchStage::Headers => DispatchError::NotFound,
                MatchStage::Consumes => DispatchError::UnsupportedMediaType,
                MatchStage::Produces => DispatchError::NotAcceptable,
            });
        }
        remaining = next;
    }

    // An explicit HEAD mapping outranks a GET mapping serving HEAD.
    let rank = |e: &RouteEntry| {
        let explicit_head =
            *req.method() == Method::HEAD && e.criteria.methods.contains(&Method::HEAD);
        (explicit_head, e.criteria.specificity())
    };

    remaining
        .into_iter()
        .max_by(|a, b| rank(*a).cmp(&rank(*b)).then(b.id.cmp(&a.id)))
        .ok_or(DispatchError::NotFound)
}

fn allowed_methods(entries: &[&RouteEntry]) -> Vec<Method> {
    let mut allowed: Vec<Method> = Vec::new();
    for m in entries.iter().flat_map(|e| e.criteria.methods.iter()) {
        if !allowed.contains(m) {
            allowed.push(m.clone());
        }
    }
    allowed
}

/// Binds a [`RouteTable`] to the host router.
#[derive(Debug, Clone)]
pub struct Dispatcher {
    table: Arc<RouteTable>,
    resolver: VersionResolver,
}

impl Dispatcher {
    pub fn new(table: RouteTable) -> Self {
        let resolver = VersionResolver::new(table.versioning().version_prefix.as_str());
        Self {
            table: Arc::new(table),
            resolver,
        }
    }

    pub fn table(&self) -> &RouteTable {
        &self.table
    }

    /// Build the axum router: one route per path template plus a
    /// not-found fallback.
    pub fn into_router(self) -> Router {
        let mut router = Router::new();

        for (path, entries) in self.table.by_path() {
            let candidates: Arc<[RouteEntry]> = entries.into_iter().cloned().collect();
            let resolver = self.resolver.clone();
            router = router.route(
                path,
                any(move |req: Request<Body>| dispatch(candidates.clone(), resolver.clone(), req)),
            );
        }

        metrics::record_routes_registered(self.table.len());
        router.fallback(not_found)
    }
}

async fn dispatch(
    candidates: Arc<[RouteEntry]>,
    resolver: VersionResolver,
    mut req: Request<Body>,
) -> Response {
    let start = Instant::now();
    let method = req.method().to_string();

    let selected = {
        let view = RequestView::from_request(&req);
        select(&candidates, &view)
    };

    let entry = match selected {
        Ok(entry) => entry,
        Err(err) => {
            tracing::debug!(
                method = %method,
                path = %req.uri().path(),
                status = %err.status(),
                "No route criteria matched"
            );
            metrics::record_request(&method, err.status().as_u16(), "none", start);
            return err.into_response();
        }
    };

    let version = entry
        .version
        .map(|v| v.to_string())
        .unwrap_or_else(|| "none".to_string());

    tracing::debug!(
        endpoint = %entry.name,
        version = %version,
        path = %req.uri().path(),
        "Dispatching request"
    );

    req.extensions_mut().insert(resolver);
    let response = entry.endpoint.call(req).await;

    metrics::record_request(&method, response.status().as_u16(), &version, start);
    response
}

async fn not_found(method: Method, uri: Uri) -> Response {
    let start = Instant::now();
    tracing::warn!(method = %method, path = %uri.path(), "No route matched");
    metrics::record_request(method.as_str(), 404, "none", start);
    DispatchError::NotFound.into_response()
}
