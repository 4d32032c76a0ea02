//! Action kit documents: action descriptions and the prepare/start/stop
//! envelopes.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{Attributes, DescribingEndpointReference, Method};

/// Opaque state handed back and forth between agent and extension.
pub type ActionState = serde_json::Map<String, Value>;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ActionList {
    pub actions: Vec<DescribingEndpointReference>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ActionKind {
    Attack,
    Check,
    #[serde(rename = "load_test")]
    LoadTest,
    Other,
}

/// Who decides when an action ends.
///
/// `External` means the agent calls stop once the `duration` parameter has
/// elapsed; the extension never times anything itself.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TimeControl {
    External,
    Internal,
    Instantaneous,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ParameterType {
    String,
    Integer,
    Percentage,
    Duration,
    Boolean,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ActionParameter {
    pub name: String,
    pub label: String,
    #[serde(rename = "type")]
    pub kind: ParameterType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_value: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub required: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub advanced: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TargetSelectionTemplate {
    pub label: String,
    pub query: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MutatingEndpointReference {
    pub method: Method,
    pub path: String,
}

impl MutatingEndpointReference {
    pub fn post(path: impl Into<String>) -> Self {
        Self {
            method: Method::Post,
            path: path.into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ActionDescription {
    pub id: String,
    pub label: String,
    pub description: String,
    pub version: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_type: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub target_selection_templates: Vec<TargetSelectionTemplate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    pub kind: ActionKind,
    pub time_control: TimeControl,
    pub parameters: Vec<ActionParameter>,
    pub prepare: MutatingEndpointReference,
    pub start: MutatingEndpointReference,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stop: Option<MutatingEndpointReference>,
}

/// Target as seen by an action: the selected target's name and attributes.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ActionTarget {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub attributes: Attributes,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PrepareActionRequestBody {
    #[serde(default)]
    pub config: HashMap<String, Value>,
    #[serde(default)]
    pub target: Option<ActionTarget>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub execution_id: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PrepareResult {
    pub state: ActionState,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StartActionRequestBody {
    pub state: ActionState,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StartResult {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<ActionState>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StopActionRequestBody {
    pub state: ActionState,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StopResult {}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_prepare_request_body_from_agent_json() {
        let body: PrepareActionRequestBody = serde_json::from_value(json!({
            "config": { "rate": 50, "statuscode": 503, "duration": 30000 },
            "target": {
                "name": "checkout",
                "attributes": { "aws.lambda.failure-injection-param": ["/checkout/failure"] }
            },
            "executionId": "42"
        }))
        .unwrap();

        assert_eq!(body.config["rate"], json!(50));
        assert_eq!(body.execution_id.as_deref(), Some("42"));
        let target = body.target.unwrap();
        assert_eq!(target.name, "checkout");
        assert_eq!(
            target.attributes["aws.lambda.failure-injection-param"],
            vec!["/checkout/failure".to_string()]
        );
    }

    #[test]
    fn test_parameter_type_is_serialized_as_type() {
        let parameter = ActionParameter {
            name: "rate".to_string(),
            label: "Rate".to_string(),
            kind: ParameterType::Percentage,
            description: None,
            default_value: Some("100".to_string()),
            required: Some(true),
            advanced: None,
            order: Some(1),
        };
        assert_eq!(
            serde_json::to_value(&parameter).unwrap(),
            json!({
                "name": "rate",
                "label": "Rate",
                "type": "percentage",
                "defaultValue": "100",
                "required": true,
                "order": 1
            })
        );
    }

    #[test]
    fn test_action_kind_wire_values() {
        assert_eq!(serde_json::to_value(ActionKind::Attack).unwrap(), json!("attack"));
        assert_eq!(
            serde_json::to_value(ActionKind::LoadTest).unwrap(),
            json!("load_test")
        );
        let kind: ActionKind = serde_json::from_value(json!("load_test")).unwrap();
        assert_eq!(kind, ActionKind::LoadTest);
    }
}
