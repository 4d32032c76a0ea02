//! Discovery kit documents: what an extension can discover and the targets it
//! found.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::{DescribingEndpointReference, Method, PluralLabel};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiscoveryList {
    pub discoveries: Vec<DescribingEndpointReference>,
    pub target_types: Vec<DescribingEndpointReference>,
    pub target_attributes: Vec<DescribingEndpointReference>,
}

/// Which agents of a cluster run a discovery.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "UPPERCASE")]
pub enum RestrictTo {
    Any,
    Leader,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DescribingEndpointReferenceWithCallInterval {
    pub method: Method,
    pub path: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub call_interval: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DiscoveryDescription {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub restrict_to: Option<RestrictTo>,
    pub discover: DescribingEndpointReferenceWithCallInterval,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Column {
    pub attribute: String,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum Direction {
    #[serde(rename = "ASC")]
    Asc,
    #[serde(rename = "DESC")]
    Desc,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct OrderBy {
    pub attribute: String,
    pub direction: Direction,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Table {
    pub columns: Vec<Column>,
    pub order_by: Vec<OrderBy>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TargetDescription {
    pub id: String,
    pub version: String,
    pub label: PluralLabel,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    pub table: Table,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AttributeDescription {
    pub attribute: String,
    pub label: PluralLabel,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct AttributeDescriptions {
    pub attributes: Vec<AttributeDescription>,
}

/// A discovered target.
///
/// Attributes are kept in a `BTreeMap` so that the rendered document is
/// stable between polls.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Target {
    pub id: String,
    pub label: String,
    pub target_type: String,
    pub attributes: BTreeMap<String, Vec<String>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DiscoveredTargets {
    pub targets: Vec<Target>,
}
