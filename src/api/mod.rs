//! Demo API resources.
//!
//! Every handler answers with a short text naming the resource and the API
//! version it was reached through. The resources cover each declaration
//! style the router supports:
//! - group-level open range (`projects`)
//! - split group ranges on one path (`tasks`)
//! - endpoint-level ranges inside an unversioned group (`tasks/descriptions`)
//! - hand-written version paths without any range (`users`)

pub mod projects;
pub mod users;

use crate::config::VersioningConfig;
use crate::routing::{ApiVersion, RouteRegistry};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceType {
    Project,
    Task,
    Description,
    User,
}

impl std::fmt::Display for ResourceType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ResourceType::Project => "Project",
            ResourceType::Task => "Task",
            ResourceType::Description => "Description",
            ResourceType::User => "User",
        };
        f.write_str(name)
    }
}

pub fn dummy_response(resource: ResourceType, ApiVersion(version): ApiVersion) -> String {
    format!("{} from API with Version: {}", resource, version)
}

/// Registry with every demo resource declared.
pub fn registry(versioning: VersioningConfig) -> RouteRegistry {
    let registry = RouteRegistry::new(versioning);
    let registry = projects::register(registry);
    users::register(registry)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dummy_response() {
        assert_eq!(
            dummy_response(ResourceType::Task, ApiVersion(2)),
            "Task from API with Version: 2"
        );
    }

    #[test]
    fn test_registry_builds_with_defaults() {
        let table = registry(VersioningConfig::default()).build().unwrap();
        let mut paths: Vec<&str> = table.entries().iter().map(|e| e.path.as_str()).collect();
        paths.sort();
        assert_eq!(
            paths,
            vec![
                "/v1/projects",
                "/v1/tasks",
                "/v1/tasks/descriptions",
                "/v1/users",
                "/v2/projects",
                "/v2/tasks",
                "/v2/tasks/descriptions",
                "/v2/users",
                "/v3/projects",
                "/v3/tasks",
                "/v3/tasks/descriptions",
                "/v3/users",
            ]
        );
    }

    #[test]
    fn test_registry_with_lower_max_version() {
        let versioning = VersioningConfig {
            max_api_version: 2,
            ..Default::default()
        };
        let table = registry(versioning).build().unwrap();
        let paths: Vec<&str> = table.entries().iter().map(|e| e.path.as_str()).collect();

        for gone in ["/v3/projects", "/v3/tasks", "/v3/tasks/descriptions"] {
            assert!(!paths.contains(&gone), "{}", gone);
        }
        for kept in ["/v2/projects", "/v2/tasks", "/v2/tasks/descriptions"] {
            assert!(paths.contains(&kept), "{}", kept);
        }
        // Literal user paths are not expanded and stay at /v3.
        assert!(paths.contains(&"/v3/users"));
        assert_eq!(table.len(), 9);
    }
}
