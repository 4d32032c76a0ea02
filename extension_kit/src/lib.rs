//! Wire types shared between an extension and the orchestrating agent.
//!
//! The agent talks to an extension exclusively through JSON documents:
//! capability descriptions it fetches once (what can be discovered, which
//! actions exist and how to call them) and request/response envelopes it
//! exchanges on every discovery poll or action transition. Everything here is
//! plain data with serde derives; behavior lives in the extension itself.

pub mod action;
pub mod discovery;
mod error;

use std::collections::HashMap;

pub use error::ExtensionError;
use serde::{Deserialize, Serialize};

/// HTTP method of an endpoint advertised to the agent.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum Method {
    #[serde(rename = "GET")]
    Get,
    #[serde(rename = "POST")]
    Post,
}

/// Reference to an endpoint that returns a description document.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DescribingEndpointReference {
    pub method: Method,
    pub path: String,
}

impl DescribingEndpointReference {
    pub fn get(path: impl Into<String>) -> Self {
        Self {
            method: Method::Get,
            path: path.into(),
        }
    }
}

/// Label with singular and plural forms.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PluralLabel {
    pub one: String,
    pub other: String,
}

impl PluralLabel {
    pub fn new(one: &str, other: &str) -> Self {
        Self {
            one: one.to_string(),
            other: other.to_string(),
        }
    }
}

/// Response of the extension root path.
///
/// The agent reads every kit's listing from the same document, so the action
/// and discovery lists are flattened into one object.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExtensionList {
    #[serde(flatten)]
    pub actions: action::ActionList,
    #[serde(flatten)]
    pub discoveries: discovery::DiscoveryList,
}

/// Attributes of a target: attribute name to its values.
pub type Attributes = HashMap<String, Vec<String>>;
