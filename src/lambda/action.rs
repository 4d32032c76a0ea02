//! The "inject status code" attack.
//!
//! The attack never holds state of its own. Prepare turns the selected target
//! and the user's parameters into a [`LambdaActionState`], which travels to the
//! agent and comes back verbatim on start and stop. Start writes the failure
//! injection config to the function's SSM parameter, stop deletes it; the
//! wrapped function picks up either change on its next invocation.

use std::collections::HashMap;

use extension_kit::{
    action::{
        ActionDescription,
        ActionKind,
        ActionList,
        ActionParameter,
        ActionState,
        MutatingEndpointReference,
        ParameterType,
        PrepareActionRequestBody,
        TargetSelectionTemplate,
        TimeControl,
    },
    DescribingEndpointReference,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{info, warn};

use super::{
    attributes,
    Error,
    BASE_PATH,
    DESCRIPTION_VERSION,
    TARGET_ICON,
    TARGET_ID,
};
use crate::aws::{DeleteOutcome, ParameterStore};

const PARAMETER_DESCRIPTION: &str = "lambda failure injection config - set by steadybit";
const PROVENANCE_TAG: (&str, &str) = ("created-by", "steadybit");

pub fn action_base_path() -> String {
    format!("{BASE_PATH}/actions/inject-failure")
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FailureMode {
    #[serde(rename = "statuscode")]
    StatusCode,
}

/// Value stored in the SSM parameter and read by the failure-lambda wrapper.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FailureInjectionConfig {
    pub failure_mode: FailureMode,
    /// Fraction of invocations to fail, between 0 and 1.
    pub rate: f64,
    pub status_code: u16,
    pub is_enabled: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LambdaActionState {
    /// Name of the SSM parameter the target function watches.
    pub param: String,
    pub config: FailureInjectionConfig,
}

impl LambdaActionState {
    pub fn into_action_state(self) -> Result<ActionState, Error> {
        match serde_json::to_value(self) {
            Ok(Value::Object(state)) => Ok(state),
            Ok(other) => Err(Error::Internal(format!(
                "Failed to encode action state: expected an object, got {other}"
            ))),
            Err(e) => Err(Error::Internal(format!("Failed to encode action state: {e}"))),
        }
    }

    pub fn from_action_state(state: ActionState) -> Result<Self, Error> {
        serde_json::from_value(Value::Object(state))
            .map_err(|e| Error::Validation(format!("Failed to convert action state: {e}")))
    }
}

/// Validates the target and computes the state for the later calls. No
/// remote call is made.
pub fn prepare(request: &PrepareActionRequestBody) -> Result<LambdaActionState, Error> {
    let target = request
        .target
        .as_ref()
        .ok_or_else(|| Error::Validation("Request is missing the target".to_string()))?;

    let param = target
        .attributes
        .get(attributes::FAILURE_INJECTION_PARAM)
        .and_then(|values| values.first())
        .filter(|param| !param.is_empty())
        .ok_or_else(|| {
            Error::Precondition(format!(
                "Target is missing the '{}' attribute. Did you wrap the lambda with https://github.com/gunnargrosch/failure-lambda ?",
                attributes::FAILURE_INJECTION_PARAM
            ))
        })?;

    let rate = number_parameter(&request.config, "rate")?;
    if !(0.0..=100.0).contains(&rate) {
        return Err(Error::Validation(format!(
            "Parameter 'rate' must be between 0 and 100, got {rate}"
        )));
    }
    let status_code = number_parameter(&request.config, "statuscode")?;
    if status_code.fract() != 0.0 || !(100.0..=599.0).contains(&status_code) {
        return Err(Error::Validation(format!(
            "Parameter 'statuscode' must be an HTTP status code, got {status_code}"
        )));
    }

    Ok(LambdaActionState {
        param: param.clone(),
        config: FailureInjectionConfig {
            failure_mode: FailureMode::StatusCode,
            rate: rate / 100.0,
            status_code: status_code as u16,
            is_enabled: true,
        },
    })
}

/// Reads a numeric parameter. The agent sends numbers, but defaults it
/// fills in itself arrive as strings.
fn number_parameter(config: &HashMap<String, Value>, name: &str) -> Result<f64, Error> {
    let invalid = || Error::Validation(format!("Parameter '{name}' must be a number"));
    match config.get(name) {
        Some(Value::Number(number)) => number.as_f64().ok_or_else(invalid),
        Some(Value::String(text)) => text.trim().parse::<f64>().map_err(|_| invalid()),
        Some(_) => Err(invalid()),
        None => Err(Error::Validation(format!(
            "Missing required parameter '{name}'"
        ))),
    }
}

/// Writes the failure injection config to the target's parameter,
/// overwriting whatever is there.
pub async fn start(store: &dyn ParameterStore, state: &LambdaActionState) -> Result<(), Error> {
    let value = serde_json::to_string(&state.config).map_err(|e| {
        Error::Internal(format!("Failed to encode failure injection config: {e}"))
    })?;

    store
        .put(&state.param, &value, PARAMETER_DESCRIPTION)
        .await
        .map_err(|e| Error::io("Failed to put ssm parameter", e))?;
    info!(
        param = %state.param,
        rate = state.config.rate,
        status_code = state.config.status_code,
        "failure injection enabled"
    );

    // Tagging is best effort; the parameter is already live.
    if let Err(e) = store.add_tags(&state.param, &[PROVENANCE_TAG]).await {
        warn!(param = %state.param, "failed to tag ssm parameter: {:#}", e);
    }
    Ok(())
}

/// Removes the failure injection config. A parameter that is already gone
/// counts as stopped.
pub async fn stop(store: &dyn ParameterStore, state: &LambdaActionState) -> Result<(), Error> {
    let outcome = store
        .delete(&state.param)
        .await
        .map_err(|e| Error::io("Failed to delete ssm parameter", e))?;
    match outcome {
        DeleteOutcome::Deleted => info!(param = %state.param, "failure injection removed"),
        DeleteOutcome::NotFound => {
            info!(param = %state.param, "ssm parameter already absent, nothing to remove")
        }
    }
    Ok(())
}

pub fn action_list() -> ActionList {
    ActionList {
        actions: vec![DescribingEndpointReference::get(action_base_path())],
    }
}

pub fn action_description() -> ActionDescription {
    let base = action_base_path();
    ActionDescription {
        id: format!("{TARGET_ID}.statusCode"),
        label: "Inject Status Code".to_string(),
        description: "Returns a fixed status code.".to_string(),
        version: DESCRIPTION_VERSION.to_string(),
        icon: Some(TARGET_ICON.to_string()),
        target_type: Some(TARGET_ID.to_string()),
        target_selection_templates: vec![TargetSelectionTemplate {
            label: "by function name".to_string(),
            query: format!("{}=\"\"", attributes::FUNCTION_NAME),
        }],
        category: Some("cloud".to_string()),
        kind: ActionKind::Attack,
        time_control: TimeControl::External,
        parameters: vec![
            ActionParameter {
                name: "duration".to_string(),
                label: "Duration".to_string(),
                kind: ParameterType::Duration,
                description: Some("The duration of the attack.".to_string()),
                default_value: Some("30s".to_string()),
                required: Some(true),
                advanced: Some(false),
                order: Some(0),
            },
            ActionParameter {
                name: "statuscode".to_string(),
                label: "Status Code".to_string(),
                kind: ParameterType::Integer,
                description: Some("The status code to return.".to_string()),
                default_value: Some("500".to_string()),
                required: Some(true),
                advanced: None,
                order: Some(1),
            },
            ActionParameter {
                name: "rate".to_string(),
                label: "Rate".to_string(),
                kind: ParameterType::Percentage,
                description: Some("The rate of failures to inject.".to_string()),
                default_value: Some("100".to_string()),
                required: Some(true),
                advanced: None,
                order: Some(1),
            },
        ],
        prepare: MutatingEndpointReference::post(format!("{base}/prepare")),
        start: MutatingEndpointReference::post(format!("{base}/start")),
        stop: Some(MutatingEndpointReference::post(format!("{base}/stop"))),
    }
}
