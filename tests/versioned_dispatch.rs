//! End-to-end dispatch through the layered router, in process.

use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use tower::ServiceExt;
use versioned_router::config::{ServerConfig, VersioningConfig};
use versioned_router::lifecycle::startup::build_route_table;
use versioned_router::routing::{RangeViolation, RouteError};
use versioned_router::{
    resolve_version, ApiVersion, HandlerDescriptor, HandlerGroup, HttpServer, RouteRegistry,
    VersionRange,
};

mod common;
use common::{body_text, get};

async fn handler_a(ApiVersion(v): ApiVersion) -> String {
    format!("A{}", v)
}

async fn handler_b(ApiVersion(v): ApiVersion) -> String {
    format!("B{}", v)
}

async fn plain() -> &'static str {
    "plain"
}

fn scenario_a_registry() -> RouteRegistry {
    let a = HandlerDescriptor::get("/tasks", handler_a)
        .named("a")
        .versioned(VersionRange::new(1, 1));
    let b = HandlerDescriptor::get("/tasks", handler_b)
        .named("b")
        .versioned(VersionRange::new(2, 0));
    RouteRegistry::new(VersioningConfig::default())
        .handler(a)
        .handler(b)
}

#[tokio::test]
async fn test_split_ranges_dispatch_per_version() {
    let table = scenario_a_registry().build().unwrap();

    let mut paths: Vec<(String, String)> = table
        .entries()
        .iter()
        .map(|e| (e.path.clone(), e.name.clone()))
        .collect();
    paths.sort();
    assert_eq!(
        paths,
        vec![
            ("/v1/tasks".to_string(), "a".to_string()),
            ("/v2/tasks".to_string(), "b".to_string()),
            ("/v3/tasks".to_string(), "b".to_string()),
        ]
    );

    let app = HttpServer::new(ServerConfig::default(), table).router();

    for (path, expected) in [("/v1/tasks", "A1"), ("/v2/tasks", "B2"), ("/v3/tasks", "B3")] {
        let res = app.clone().oneshot(get(path)).await.unwrap();
        assert_eq!(res.status(), StatusCode::OK, "{}", path);
        assert_eq!(body_text(res).await, expected);
    }

    assert_eq!(resolve_version("/v2/tasks"), Ok(2));
}

#[tokio::test]
async fn test_range_beyond_max_fails_registration() {
    let err = RouteRegistry::new(VersioningConfig::default())
        .handler(HandlerDescriptor::get("/tasks", plain).versioned(VersionRange::new(1, 4)))
        .build()
        .unwrap_err();

    assert!(matches!(
        err,
        RouteError::InvalidRange {
            from: 1,
            until: 4,
            violation: RangeViolation::AboveMaximum { max: 3 },
            ..
        }
    ));
}

#[tokio::test]
async fn test_unversioned_request_against_versioned_table_is_not_found() {
    let table = scenario_a_registry().build().unwrap();
    let app = HttpServer::new(ServerConfig::default(), table).router();

    let res = app.clone().oneshot(get("/tasks")).await.unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    let res = app.oneshot(get("/v4/tasks")).await.unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_handler_range_beats_group_range() {
    let table = RouteRegistry::new(VersioningConfig::default())
        .group(
            HandlerGroup::new("descriptions")
                .path("/descriptions")
                .versioned(VersionRange::only(1))
                .handler(
                    HandlerDescriptor::get("", handler_b)
                        .named("latest")
                        .versioned(VersionRange::since(3)),
                )
                .handler(HandlerDescriptor::get("/legacy", handler_a).named("legacy")),
        )
        .build()
        .unwrap();

    let mut paths: Vec<&str> = table.entries().iter().map(|e| e.path.as_str()).collect();
    paths.sort();
    assert_eq!(paths, vec!["/v1/descriptions/legacy", "/v3/descriptions"]);
}

#[tokio::test]
async fn test_unversioned_route_rejects_version_lookup() {
    let table = RouteRegistry::new(VersioningConfig::default())
        .handler(HandlerDescriptor::get("/status", handler_a))
        .build()
        .unwrap();
    let app = HttpServer::new(ServerConfig::default(), table).router();

    let res = app.oneshot(get("/status")).await.unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    assert!(body_text(res).await.contains("Invalid version"));
}

#[tokio::test]
async fn test_conflict_produces_no_table() {
    let result = RouteRegistry::new(VersioningConfig::default())
        .handler(
            HandlerDescriptor::get("/tasks", plain)
                .named("first")
                .versioned(VersionRange::default()),
        )
        .handler(
            HandlerDescriptor::get("/tasks", plain)
                .named("second")
                .versioned(VersionRange::only(3)),
        )
        .build();

    assert_eq!(
        result.unwrap_err(),
        RouteError::Conflict {
            existing: "first".into(),
            duplicate: "second".into(),
            method: "GET".into(),
            path: "/v3/tasks".into(),
        }
    );
}

#[tokio::test]
async fn test_method_mismatch_is_405() {
    let table = scenario_a_registry().build().unwrap();
    let app = HttpServer::new(ServerConfig::default(), table).router();

    let req = Request::builder()
        .method(Method::POST)
        .uri("/v2/tasks")
        .body(Body::empty())
        .unwrap();
    let res = app.oneshot(req).await.unwrap();
    assert_eq!(res.status(), StatusCode::METHOD_NOT_ALLOWED);
    assert_eq!(res.headers().get("allow").unwrap(), "GET");
}

#[tokio::test]
async fn test_explicit_head_handler_is_reachable() {
    async fn get_body() -> &'static str {
        "get"
    }
    async fn head_body() -> &'static str {
        "head"
    }

    let table = RouteRegistry::new(VersioningConfig::default())
        .handler(HandlerDescriptor::get("/x", get_body).versioned(VersionRange::only(1)))
        .handler(
            HandlerDescriptor::route(Method::HEAD, "/x", head_body)
                .versioned(VersionRange::only(1)),
        )
        .build()
        .unwrap();
    let app = HttpServer::new(ServerConfig::default(), table).router();

    let req = Request::builder()
        .method(Method::HEAD)
        .uri("/v1/x")
        .body(Body::empty())
        .unwrap();
    let res = app.clone().oneshot(req).await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(res.headers().get("content-length").unwrap(), "4");

    let res = app.oneshot(get("/v1/x")).await.unwrap();
    assert_eq!(body_text(res).await, "get");
}

#[tokio::test]
async fn test_custom_prefix_reaches_extractor() {
    let versioning = VersioningConfig {
        version_prefix: "/version".into(),
        ..Default::default()
    };
    let table = RouteRegistry::new(versioning.clone())
        .handler(HandlerDescriptor::get("/tasks/", handler_b).versioned(VersionRange::only(2)))
        .build()
        .unwrap();

    let mut config = ServerConfig::default();
    config.versioning = versioning;
    let app = HttpServer::new(config, table).router();

    let res = app.oneshot(get("/version2/tasks/")).await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(body_text(res).await, "B2");
}

#[tokio::test]
async fn test_demo_api() {
    let config = ServerConfig::default();
    let table = build_route_table(&config).unwrap();
    let app = HttpServer::new(config, table).router();

    let cases = [
        ("/v1/projects", "Project from API with Version: 1"),
        ("/v3/projects", "Project from API with Version: 3"),
        ("/v1/tasks", "Task from API with Version: 1"),
        ("/v2/tasks", "Task from API with Version: 2"),
        ("/v1/tasks/descriptions", "Description from API with Version: 1"),
        ("/v3/tasks/descriptions", "Description from API with Version: 3"),
        ("/v1/users", "User from API with Version: 1"),
        ("/v3/users", "User from API with Version: 3"),
    ];

    for (path, expected) in cases {
        let res = app.clone().oneshot(get(path)).await.unwrap();
        assert_eq!(res.status(), StatusCode::OK, "{}", path);
        assert_eq!(body_text(res).await, expected, "{}", path);
    }

    let res = app.oneshot(get("/projects")).await.unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
}
