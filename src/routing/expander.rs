//! Route expansion.
//!
//! Turns one [`HandlerDescriptor`] into the concrete routes to register:
//! one route per API version in its range, each with the version segment
//! prepended to every path template. Unversioned descriptors pass through
//! as a single route.
//!
//! Expansion is pure. Every error it returns is a static configuration
//! defect and is reported before the server accepts traffic.

use std::ops::RangeInclusive;

use crate::config::VersioningConfig;
use crate::routing::descriptor::{Endpoint, HandlerDescriptor};
use crate::routing::error::{RangeViolation, RouteError};
use crate::routing::matcher::RequestCriteria;
use crate::routing::version::VersionRange;

/// One concrete, registrable route.
#[derive(Debug, Clone)]
pub struct ExpandedRoute {
    /// Name of the descriptor this route was expanded from.
    pub name: String,
    /// API version served, `None` for pass-through routes.
    pub version: Option<u32>,
    /// Criteria with version-prefixed paths.
    pub criteria: RequestCriteria,
    pub endpoint: Endpoint,
}

impl ExpandedRoute {
    /// The `/v{n}` segment this route was registered under.
    pub fn version_segment(&self, versioning: &VersioningConfig) -> Option<String> {
        self.version.map(|v| versioning.segment(v))
    }
}

/// Expander bound to a set of versioning bounds.
#[derive(Debug, Clone, Default)]
pub struct RouteExpander {
    versioning: VersioningConfig,
}

impl RouteExpander {
    pub fn new(versioning: VersioningConfig) -> Self {
        Self { versioning }
    }

    pub fn versioning(&self) -> &VersioningConfig {
        &self.versioning
    }

    /// Validate a range and return the versions it covers.
    pub fn versions(
        &self,
        endpoint: &str,
        range: VersionRange,
    ) -> Result<RangeInclusive<u32>, RouteError> {
        let min = self.versioning.min_api_version;
        let max = self.versioning.max_api_version;
        let from = range.from;
        let until = range.effective_until(max);

        let invalid = |violation: RangeViolation| RouteError::InvalidRange {
            endpoint: endpoint.to_string(),
            from,
            until,
            violation,
        };

        if from < min {
            return Err(invalid(RangeViolation::BelowMinimum { min }));
        }
        if until > max {
            return Err(invalid(RangeViolation::AboveMaximum { max }));
        }
        if from > until {
            return Err(invalid(RangeViolation::Inverted));
        }
        Ok(from..=until)
    }

    pub fn expand(&self, descriptor: &HandlerDescriptor) -> Result<Vec<ExpandedRoute>, RouteError> {
        let criteria = descriptor.criteria();
        let paths = if criteria.paths.is_empty() {
            vec![String::new()]
        } else {
            criteria.paths.clone()
        };

        if let Some(bad) = paths.iter().find(|p| !is_valid_template(p)) {
            return Err(RouteError::InvalidPath {
                endpoint: descriptor.name().to_string(),
                path: bad.clone(),
            });
        }

        let Some(range) = descriptor.version() else {
            if paths.iter().any(String::is_empty) {
                return Err(RouteError::InvalidPath {
                    endpoint: descriptor.name().to_string(),
                    path: String::new(),
                });
            }
            return Ok(vec![ExpandedRoute {
                name: descriptor.name().to_string(),
                version: None,
                criteria: RequestCriteria {
                    paths,
                    ..criteria.clone()
                },
                endpoint: descriptor.endpoint().clone(),
            }]);
        };

        let versions = self.versions(descriptor.name(), range)?;

        let routes = versions
            .map(|version| {
                let segment = self.versioning.segment(version);
                ExpandedRoute {
                    name: descriptor.name().to_string(),
                    version: Some(version),
                    criteria: RequestCriteria {
                        paths: paths.iter().map(|p| format!("{}{}", segment, p)).collect(),
                        ..criteria.clone()
                    },
                    endpoint: descriptor.endpoint().clone(),
                }
            })
            .collect::<Vec<_>>();

        tracing::trace!(
            endpoint = %descriptor.name(),
            range = %range,
            routes = routes.len(),
            "Expanded versioned endpoint"
        );
        Ok(routes)
    }
}

/// Empty, or `/`-rooted without axum 0.7 style `:param` / `*rest`
/// segments. Capture syntax is checked at registration.
fn is_valid_template(path: &str) -> bool {
    if path.is_empty() {
        return true;
    }
    path.starts_with('/')
        && path
            .split('/')
            .all(|segment| !segment.starts_with(':') && !segment.starts_with('*'))
}

/// Expand with the default versioning bounds.
pub fn expand(descriptor: &HandlerDescriptor) -> Result<Vec<ExpandedRoute>, RouteError> {
    RouteExpander::default().expand(descriptor)
}
