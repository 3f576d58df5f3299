//! Version-aware HTTP routing.
//!
//! Handlers declare the inclusive range of API versions they serve; at
//! startup every declaration is expanded into one `/v{n}/...` route per
//! version, checked for conflicts, and frozen into an immutable route table
//! served through axum.

pub mod api;
pub mod config;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod routing;

pub use config::ServerConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
pub use routing::{
    resolve_version, ApiVersion, HandlerDescriptor, HandlerGroup, RouteRegistry, RouteTable,
    VersionRange,
};
