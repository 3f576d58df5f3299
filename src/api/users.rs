//! User resource, declared with literal version paths and no range.

use crate::api::{dummy_response, ResourceType};
use crate::routing::{ApiVersion, HandlerDescriptor, HandlerGroup, RouteRegistry};

async fn get_user(version: ApiVersion) -> String {
    dummy_response(ResourceType::User, version)
}

async fn get_user_v1(version: ApiVersion) -> String {
    dummy_response(ResourceType::User, version)
}

pub fn register(registry: RouteRegistry) -> RouteRegistry {
    registry.group(
        HandlerGroup::new("users")
            .handler(
                HandlerDescriptor::get("/v2/users", get_user)
                    .path("/v3/users")
                    .named("get_user"),
            )
            .handler(HandlerDescriptor::get("/v1/users", get_user_v1).named("get_user_v1")),
    )
}
