//! Project, task and task description resources.

use crate::api::{dummy_response, ResourceType};
use crate::routing::{ApiVersion, HandlerDescriptor, HandlerGroup, RouteRegistry, VersionRange};

async fn get_projects(version: ApiVersion) -> String {
    dummy_response(ResourceType::Project, version)
}

async fn get_tasks_v1(version: ApiVersion) -> String {
    dummy_response(ResourceType::Task, version)
}

async fn get_tasks(version: ApiVersion) -> String {
    dummy_response(ResourceType::Task, version)
}

async fn get_descriptions_v1(version: ApiVersion) -> String {
    dummy_response(ResourceType::Description, version)
}

async fn get_descriptions(version: ApiVersion) -> String {
    dummy_response(ResourceType::Description, version)
}

pub fn register(registry: RouteRegistry) -> RouteRegistry {
    registry
        .group(
            HandlerGroup::new("projects")
                .versioned(VersionRange::default())
                .handler(HandlerDescriptor::get("/projects", get_projects).named("get_projects")),
        )
        .group(
            HandlerGroup::new("tasks_v1")
                .path("/tasks")
                .versioned(VersionRange::until(1))
                .handler(HandlerDescriptor::get("", get_tasks_v1).named("get_tasks")),
        )
        .group(
            HandlerGroup::new("tasks")
                .path("/tasks")
                .versioned(VersionRange::since(2))
                .handler(HandlerDescriptor::get("", get_tasks).named("get_tasks")),
        )
        .group(
            HandlerGroup::new("task_descriptions")
                .handler(
                    HandlerDescriptor::get("/tasks/descriptions", get_descriptions_v1)
                        .named("get_descriptions_v1")
                        .versioned(VersionRange::until(1)),
                )
                .handler(
                    HandlerDescriptor::get("/tasks/descriptions", get_descriptions)
                        .named("get_descriptions")
                        .versioned(VersionRange::since(2)),
                ),
        )
}
