use axum::{extract::State, Json};
use extension_kit::discovery::{
    AttributeDescriptions,
    DiscoveredTargets,
    DiscoveryDescription,
    TargetDescription,
};
use tracing::{info, warn};

use super::routes_state::RouteState;
use crate::{http_objects::ExtensionAPIError, lambda::discovery, metrics::Timer};

pub async fn discovery_description() -> Json<DiscoveryDescription> {
    Json(discovery::discovery_description())
}

pub async fn target_description() -> Json<TargetDescription> {
    Json(discovery::target_description())
}

pub async fn attribute_descriptions() -> Json<AttributeDescriptions> {
    Json(discovery::attribute_descriptions())
}

/// Lists every Lambda function of the account. A failed page fails the whole
/// poll; the agent keeps its previous targets until the next one.
pub async fn discovered_targets(
    State(state): State<RouteState>,
) -> Result<Json<DiscoveredTargets>, ExtensionAPIError> {
    let result = {
        let _timer = Timer::start_with_labels(&state.metrics.discovery_duration, &[]);
        discovery::enumerate_targets(state.functions.as_ref()).await
    };
    match result {
        Ok(targets) => {
            info!(targets = targets.len(), "discovered lambda functions");
            state
                .metrics
                .discovered_targets
                .add(targets.len() as u64, &[]);
            Ok(Json(DiscoveredTargets { targets }))
        }
        Err(partial) => {
            warn!(
                partial_targets = partial.targets.len(),
                "discarding partial lambda discovery"
            );
            Err(ExtensionAPIError::internal_error(
                "Failed to collect lambda function information",
                &partial.source,
            ))
        }
    }
}
