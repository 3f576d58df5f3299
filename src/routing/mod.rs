//! Versioned routing subsystem.
//!
//! # Data Flow
//! ```text
//! Route Compilation (at startup):
//!     HandlerGroup / HandlerDescriptor declarations
//!     → descriptor.rs (group defaults, most specific version range wins)
//!     → expander.rs (one route per version: /v1/tasks, /v2/tasks, ...)
//!     → registry.rs (conflict detection)
//!     → Freeze as immutable RouteTable
//!
//! Incoming Request (method, path, headers, query)
//!     → axum path match (router.rs registers one route per template)
//!     → matcher.rs (evaluate criteria, most specific wins)
//!     → handler, optionally reading ApiVersion (resolver.rs)
//! ```
//!
//! # Design Decisions
//! - Routes compiled at startup, immutable at runtime
//! - Every configuration defect fails startup; nothing is resolved lazily
//! - Deterministic: same input always matches same route

pub mod descriptor;
pub mod error;
pub mod expander;
pub mod matcher;
pub mod registry;
pub mod resolver;
pub mod router;
pub mod version;

pub use descriptor::{Endpoint, HandlerDescriptor, HandlerGroup};
pub use error::{DispatchError, RangeViolation, RouteError, VersionError};
pub use expander::{expand, ExpandedRoute, RouteExpander};
pub use matcher::RequestCriteria;
pub use registry::{register, RouteEntry, RouteRegistry, RouteSummary, RouteTable};
pub use resolver::{resolve_version, ApiVersion, VersionResolver};
pub use router::Dispatcher;
pub use version::{VersionRange, MAX_API_VERSION, MIN_API_VERSION, VERSION_PREFIX};
