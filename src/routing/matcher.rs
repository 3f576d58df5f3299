//! Request criteria matching.
//!
//! # Responsibilities
//! - Hold the non-version matching criteria of a route (method, headers,
//!   query params, consumes, produces)
//! - Evaluate each criterion against a request, one stage at a time
//! - Rank matching routes by specificity
//!
//! # Design Decisions
//! - Path templates are matched by axum, not here
//! - Header names compare case-insensitively, param names case-sensitively
//! - Empty condition list = always matches (wildcard)
//! - No regex to guarantee O(n) matching

use axum::http::{header, HeaderMap, Method, Request};
use serde::Serialize;

/// A `name`, `!name`, `name=value` or `name!=value` condition.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NameValueCondition {
    name: String,
    value: Option<String>,
    negated: bool,
}

impl NameValueCondition {
    fn parse(expr: &str, lowercase_name: bool) -> Self {
        let expr = expr.trim();
        let (name, value, negated) = if let Some((name, value)) = expr.split_once("!=") {
            (name, Some(value), true)
        } else if let Some((name, value)) = expr.split_once('=') {
            (name, Some(value), false)
        } else if let Some(name) = expr.strip_prefix('!') {
            (name, None, true)
        } else {
            (expr, None, false)
        };

        let name = name.trim();
        Self {
            name: if lowercase_name {
                name.to_ascii_lowercase()
            } else {
                name.to_string()
            },
            value: value.map(|v| v.trim().to_string()),
            negated,
        }
    }

    /// Parse a header condition; the name is case-insensitive.
    pub fn header(expr: &str) -> Self {
        Self::parse(expr, true)
    }

    /// Parse a query parameter condition.
    pub fn param(expr: &str) -> Self {
        Self::parse(expr, false)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    fn evaluate<'a>(&self, mut values: impl Iterator<Item = &'a str>) -> bool {
        let matched = match &self.value {
            Some(expected) => values.any(|v| v == expected.as_str()),
            None => values.next().is_some(),
        };
        matched != self.negated
    }

    fn matches_headers(&self, headers: &HeaderMap) -> bool {
        self.evaluate(
            headers
                .get_all(self.name.as_str())
                .iter()
                .filter_map(|v| v.to_str().ok()),
        )
    }

    fn matches_params(&self, params: &[(String, String)]) -> bool {
        self.evaluate(
            params
                .iter()
                .filter(|(k, _)| *k == self.name)
                .map(|(_, v)| v.as_str()),
        )
    }
}

impl std::fmt::Display for NameValueCondition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match (&self.value, self.negated) {
            (Some(v), true) => write!(f, "{}!={}", self.name, v),
            (Some(v), false) => write!(f, "{}={}", self.name, v),
            (None, true) => write!(f, "!{}", self.name),
            (None, false) => write!(f, "{}", self.name),
        }
    }
}

/// A `type/subtype` media type, parameters stripped.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MediaType {
    kind: String,
    subtype: String,
}

impl MediaType {
    /// Lenient parse: a bare `type` is read as `type/*`.
    pub fn parse(raw: &str) -> Self {
        let essence = raw.split(';').next().unwrap_or_default().trim();
        let (kind, subtype) = essence.split_once('/').unwrap_or((essence, "*"));
        Self {
            kind: kind.trim().to_ascii_lowercase(),
            subtype: subtype.trim().to_ascii_lowercase(),
        }
    }

    fn octet_stream() -> Self {
        Self::parse("application/octet-stream")
    }

    fn any() -> Self {
        Self::parse("*/*")
    }

    /// True if `self` as a range covers `other`.
    pub fn includes(&self, other: &MediaType) -> bool {
        if self.kind == "*" {
            return true;
        }
        self.kind == other.kind && (self.subtype == "*" || self.subtype == other.subtype)
    }

    pub fn is_compatible_with(&self, other: &MediaType) -> bool {
        self.includes(other) || other.includes(self)
    }
}

impl std::fmt::Display for MediaType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.kind, self.subtype)
    }
}

/// Request attributes consulted during criteria evaluation.
#[derive(Debug)]
pub struct RequestView<'a> {
    method: &'a Method,
    headers: &'a HeaderMap,
    params: Vec<(String, String)>,
}

impl<'a> RequestView<'a> {
    pub fn new(method: &'a Method, headers: &'a HeaderMap, query: Option<&str>) -> Self {
        let params = query
            .map(|q| {
                url::form_urlencoded::parse(q.as_bytes())
                    .into_owned()
                    .collect()
            })
            .unwrap_or_default();
        Self {
            method,
            headers,
            params,
        }
    }

    pub fn from_request<B>(req: &'a Request<B>) -> Self {
        Self::new(req.method(), req.headers(), req.uri().query())
    }

    pub fn method(&self) -> &Method {
        self.method
    }

    fn content_type(&self) -> MediaType {
        self.headers
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(MediaType::parse)
            .unwrap_or_else(MediaType::octet_stream)
    }

    /// Acceptable media ranges; `*/*` without an Accept header. Ranges
    /// weighted `q=0` are refusals and are left out.
    fn accepted(&self) -> Vec<MediaType> {
        let ranges: Vec<&str> = self
            .headers
            .get_all(header::ACCEPT)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .flat_map(|v| v.split(','))
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .collect();
        if ranges.is_empty() {
            return vec![MediaType::any()];
        }
        ranges
            .into_iter()
            .filter(|r| quality(r) > 0.0)
            .map(MediaType::parse)
            .collect()
    }
}

/// The `q` weight of an Accept range, 1 when absent or unreadable.
fn quality(range: &str) -> f32 {
    range
        .split(';')
        .skip(1)
        .filter_map(|p| p.split_once('='))
        .find(|(k, _)| k.trim().eq_ignore_ascii_case("q"))
        .and_then(|(_, v)| v.trim().parse::<f32>().ok())
        .unwrap_or(1.0)
}

/// Criteria are evaluated in this order; the stage that rejects the last
/// remaining candidate decides the error reported to the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum MatchStage {
    Method,
    Params,
    Headers,
    Consumes,
    Produces,
}

impl MatchStage {
    pub const ALL: [MatchStage; 5] = [
        MatchStage::Method,
        MatchStage::Params,
        MatchStage::Headers,
        MatchStage::Consumes,
        MatchStage::Produces,
    ];
}

/// Matching criteria of a single handler, minus the version.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestCriteria {
    /// Accepted methods. Empty = any method.
    pub methods: Vec<Method>,
    /// Path templates in axum syntax (`/tasks/{id}`).
    pub paths: Vec<String>,
    pub headers: Vec<NameValueCondition>,
    pub params: Vec<NameValueCondition>,
    pub consumes: Vec<MediaType>,
    pub produces: Vec<MediaType>,
}

/// Canonical, order-independent form of the non-path criteria.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct CriteriaSignature {
    pub headers: Vec<String>,
    pub params: Vec<String>,
    pub consumes: Vec<String>,
    pub produces: Vec<String>,
}

impl RequestCriteria {
    /// Combine group-level criteria with handler-level criteria.
    ///
    /// Paths are concatenated pairwise, methods and conditions are unioned,
    /// and the handler's media types replace the group's when declared.
    pub fn combine(&self, other: &RequestCriteria) -> RequestCriteria {
        let paths = match (self.paths.is_empty(), other.paths.is_empty()) {
            (true, _) => other.paths.clone(),
            (false, true) => self.paths.clone(),
            (false, false) => self
                .paths
                .iter()
                .flat_map(|base| other.paths.iter().map(move |p| format!("{}{}", base, p)))
                .collect(),
        };

        let mut methods = self.methods.clone();
        for m in &other.methods {
            if !methods.contains(m) {
                methods.push(m.clone());
            }
        }

        RequestCriteria {
            methods,
            paths,
            headers: [self.headers.as_slice(), other.headers.as_slice()].concat(),
            params: [self.params.as_slice(), other.params.as_slice()].concat(),
            consumes: if other.consumes.is_empty() {
                self.consumes.clone()
            } else {
                other.consumes.clone()
            },
            produces: if other.produces.is_empty() {
                self.produces.clone()
            } else {
                other.produces.clone()
            },
        }
    }

    /// Evaluate one stage of the criteria against a request.
    pub fn matches_stage(&self, stage: MatchStage, req: &RequestView<'_>) -> bool {
        match stage {
            MatchStage::Method => {
                self.methods.is_empty()
                    || self.methods.contains(req.method)
                    || (*req.method == Method::HEAD && self.methods.contains(&Method::GET))
            }
            MatchStage::Params => self.params.iter().all(|c| c.matches_params(&req.params)),
            MatchStage::Headers => self.headers.iter().all(|c| c.matches_headers(req.headers)),
            MatchStage::Consumes => {
                if self.consumes.is_empty() {
                    return true;
                }
                let content_type = req.content_type();
                self.consumes.iter().any(|c| c.includes(&content_type))
            }
            MatchStage::Produces => {
                if self.produces.is_empty() {
                    return true;
                }
                let accepted = req.accepted();
                self.produces
                    .iter()
                    .any(|p| accepted.iter().any(|a| a.is_compatible_with(p)))
            }
        }
    }

    pub fn matches(&self, req: &RequestView<'_>) -> bool {
        MatchStage::ALL.iter().all(|s| self.matches_stage(*s, req))
    }

    /// Ranking key; greater is more specific.
    pub fn specificity(&self) -> (usize, usize, bool, bool, bool) {
        (
            self.params.len(),
            self.headers.len(),
            !self.consumes.is_empty(),
            !self.produces.is_empty(),
            !self.methods.is_empty(),
        )
    }

    pub fn signature(&self) -> CriteriaSignature {
        fn sorted<T: ToString>(items: &[T]) -> Vec<String> {
            let mut out: Vec<String> = items.iter().map(ToString::to_string).collect();
            out.sort();
            out.dedup();
            out
        }
        CriteriaSignature {
            headers: sorted(&self.headers),
            params: sorted(&self.params),
            consumes: sorted(&self.consumes),
            produces: sorted(&self.produces),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;

    fn request(uri: &str, headers: &[(&str, &str)]) -> Request<Body> {
        let mut builder = Request::builder().uri(uri);
        for (k, v) in headers {
            builder = builder.header(*k, *v);
        }
        builder.body(Body::empty()).unwrap()
    }

    #[test]
    fn test_header_condition_forms() {
        let req = request("/", &[("X-Client", "mobile")]);
        let view = RequestView::from_request(&req);

        assert!(NameValueCondition::header("x-client").matches_headers(view.headers));
        assert!(NameValueCondition::header("X-Client=mobile").matches_headers(view.headers));
        assert!(!NameValueCondition::header("X-Client=web").matches_headers(view.headers));
        assert!(NameValueCondition::header("X-Client!=web").matches_headers(view.headers));
        assert!(!NameValueCondition::header("!X-Client").matches_headers(view.headers));
        assert!(NameValueCondition::header("!X-Other").matches_headers(view.headers));
    }

    #[test]
    fn test_param_condition_reads_query() {
        let req = request("/tasks?status=open&page=2", &[]);
        let view = RequestView::from_request(&req);

        assert!(NameValueCondition::param("status=open").matches_params(&view.params));
        assert!(NameValueCondition::param("page").matches_params(&view.params));
        assert!(!NameValueCondition::param("Status").matches_params(&view.params));
    }

    #[test]
    fn test_media_type_ranges() {
        let json = MediaType::parse("application/json; charset=utf-8");
        assert_eq!(json.to_string(), "application/json");
        assert!(MediaType::parse("*/*").includes(&json));
        assert!(MediaType::parse("application/*").includes(&json));
        assert!(!MediaType::parse("text/*").includes(&json));
        assert!(json.is_compatible_with(&MediaType::parse("application/*")));
    }

    #[test]
    fn test_consumes_defaults_to_octet_stream() {
        let criteria = RequestCriteria {
            consumes: vec![MediaType::parse("application/json")],
            ..Default::default()
        };
        let req = request("/", &[]);
        assert!(!criteria.matches_stage(MatchStage::Consumes, &RequestView::from_request(&req)));

        let req = request("/", &[("content-type", "application/json")]);
        assert!(criteria.matches_stage(MatchStage::Consumes, &RequestView::from_request(&req)));
    }

    #[test]
    fn test_produces_uses_accept() {
        let criteria = RequestCriteria {
            produces: vec![MediaType::parse("application/json")],
            ..Default::default()
        };
        let no_accept = request("/", &[]);
        assert!(criteria.matches(&RequestView::from_request(&no_accept)));

        let html = request("/", &[("accept", "text/html")]);
        assert!(!criteria.matches(&RequestView::from_request(&html)));

        let list = request("/", &[("accept", "text/html, application/*;q=0.8")]);
        assert!(criteria.matches(&RequestView::from_request(&list)));
    }

    #[test]
    fn test_zero_quality_is_refusal() {
        assert_eq!(quality("text/html"), 1.0);
        assert_eq!(quality("application/*;q=0.8"), 0.8);
        assert_eq!(quality("application/json; Q=0"), 0.0);

        let criteria = RequestCriteria {
            produces: vec![MediaType::parse("application/json")],
            ..Default::default()
        };
        let refused = request("/", &[("accept", "application/json;q=0")]);
        assert!(!criteria.matches(&RequestView::from_request(&refused)));

        let fallback = request("/", &[("accept", "application/json;q=0, */*;q=0.1")]);
        assert!(criteria.matches(&RequestView::from_request(&fallback)));
    }

    #[test]
    fn test_head_served_by_get() {
        let criteria = RequestCriteria {
            methods: vec![Method::GET],
            ..Default::default()
        };
        let req = Request::builder().method(Method::HEAD).body(Body::empty()).unwrap();
        assert!(criteria.matches_stage(MatchStage::Method, &RequestView::from_request(&req)));

        let req = Request::builder().method(Method::POST).body(Body::empty()).unwrap();
        assert!(!criteria.matches_stage(MatchStage::Method, &RequestView::from_request(&req)));
    }

    #[test]
    fn test_combine_group_and_handler() {
        let group = RequestCriteria {
            paths: vec!["/tasks".into()],
            produces: vec![MediaType::parse("text/plain")],
            ..Default::default()
        };
        let handler = RequestCriteria {
            methods: vec![Method::GET],
            paths: vec!["".into(), "/{id}".into()],
            headers: vec![NameValueCondition::header("X-Trace")],
            ..Default::default()
        };

        let combined = group.combine(&handler);
        assert_eq!(combined.paths, vec!["/tasks", "/tasks/{id}"]);
        assert_eq!(combined.methods, vec![Method::GET]);
        assert_eq!(combined.headers.len(), 1);
        assert_eq!(combined.produces, vec![MediaType::parse("text/plain")]);
    }

    #[test]
    fn test_signature_is_order_independent() {
        let a = RequestCriteria {
            headers: vec![NameValueCondition::header("A"), NameValueCondition::header("B=1")],
            ..Default::default()
        };
        let b = RequestCriteria {
            headers: vec![NameValueCondition::header("b=1"), NameValueCondition::header("a")],
            ..Default::default()
        };
        assert_eq!(a.signature(), b.signature());
    }
}
