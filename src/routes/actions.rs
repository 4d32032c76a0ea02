use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use extension_kit::action::{
    ActionDescription,
    PrepareActionRequestBody,
    PrepareResult,
    StartActionRequestBody,
    StartResult,
    StopActionRequestBody,
    StopResult,
};

use super::routes_state::RouteState;
use crate::{
    http_objects::ExtensionAPIError,
    lambda::action::{self, LambdaActionState},
    metrics::extension::ActionOperation,
};

pub async fn action_description() -> Json<ActionDescription> {
    Json(action::action_description())
}

pub async fn prepare(
    State(state): State<RouteState>,
    payload: Result<Json<PrepareActionRequestBody>, JsonRejection>,
) -> Result<Json<PrepareResult>, ExtensionAPIError> {
    let result = prepare_action(payload);
    state.metrics.record_action(ActionOperation::Prepare, result.is_ok());
    result
}

pub async fn start(
    State(state): State<RouteState>,
    payload: Result<Json<StartActionRequestBody>, JsonRejection>,
) -> Result<Json<StartResult>, ExtensionAPIError> {
    let result = start_action(&state, payload).await;
    state.metrics.record_action(ActionOperation::Start, result.is_ok());
    result
}

pub async fn stop(
    State(state): State<RouteState>,
    payload: Result<Json<StopActionRequestBody>, JsonRejection>,
) -> Result<Json<StopResult>, ExtensionAPIError> {
    let result = stop_action(&state, payload).await;
    state.metrics.record_action(ActionOperation::Stop, result.is_ok());
    result
}

fn prepare_action(
    payload: Result<Json<PrepareActionRequestBody>, JsonRejection>,
) -> Result<Json<PrepareResult>, ExtensionAPIError> {
    let Json(request) = payload?;
    let prepared = action::prepare(&request)?;
    Ok(Json(PrepareResult {
        state: prepared.into_action_state()?,
    }))
}

async fn start_action(
    state: &RouteState,
    payload: Result<Json<StartActionRequestBody>, JsonRejection>,
) -> Result<Json<StartResult>, ExtensionAPIError> {
    let Json(request) = payload?;
    let action_state = LambdaActionState::from_action_state(request.state)?;
    action::start(state.parameter_store.as_ref(), &action_state).await?;
    Ok(Json(StartResult { state: None }))
}

async fn stop_action(
    state: &RouteState,
    payload: Result<Json<StopActionRequestBody>, JsonRejection>,
) -> Result<Json<StopResult>, ExtensionAPIError> {
    let Json(request) = payload?;
    let action_state = LambdaActionState::from_action_state(request.state)?;
    action::stop(state.parameter_store.as_ref(), &action_state).await?;
    Ok(Json(StopResult {}))
}
