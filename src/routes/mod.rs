pub mod actions;
pub mod discovery;
pub mod routes_state;

use axum::{
    routing::{get, post},
    Json,
    Router,
};
use extension_kit::ExtensionList;
pub use routes_state::RouteState;

use crate::lambda::{action::action_base_path, discovery::discovery_base_path};

/// Builds the capability table: every path the agent may call, mapped to its
/// handler.
pub fn create_routes(route_state: RouteState) -> Router {
    let discovery_path = discovery_base_path();
    let action_path = action_base_path();
    Router::new()
        .route("/", get(extension_list))
        .route("/healthz", get(healthz_handler))
        .route(&discovery_path, get(discovery::discovery_description))
        .route(
            &format!("{discovery_path}/target-description"),
            get(discovery::target_description),
        )
        .route(
            &format!("{discovery_path}/attribute-descriptions"),
            get(discovery::attribute_descriptions),
        )
        .route(
            &format!("{discovery_path}/discovered-targets"),
            get(discovery::discovered_targets).with_state(route_state.clone()),
        )
        .route(&action_path, get(actions::action_description))
        .route(
            &format!("{action_path}/prepare"),
            post(actions::prepare).with_state(route_state.clone()),
        )
        .route(
            &format!("{action_path}/start"),
            post(actions::start).with_state(route_state.clone()),
        )
        .route(
            &format!("{action_path}/stop"),
            post(actions::stop).with_state(route_state.clone()),
        )
}

/// Entry point of the agent: lists the actions and discoveries of this
/// extension.
pub async fn extension_list() -> Json<ExtensionList> {
    Json(ExtensionList {
        actions: crate::lambda::action::action_list(),
        discoveries: crate::lambda::discovery::discovery_list(),
    })
}

async fn healthz_handler() -> &'static str {
    "ok"
}
