use std::collections::BTreeMap;

use extension_kit::{
    discovery::{
        AttributeDescription,
        AttributeDescriptions,
        Column,
        DescribingEndpointReferenceWithCallInterval,
        Direction,
        DiscoveryDescription,
        DiscoveryList,
        OrderBy,
        RestrictTo,
        Table,
        Target,
        TargetDescription,
    },
    DescribingEndpointReference,
    Method,
    PluralLabel,
};
use tracing::debug;

use super::{
    attributes,
    BASE_PATH,
    DESCRIPTION_VERSION,
    FAILURE_INJECTION_ENV_VAR,
    TARGET_ICON,
    TARGET_ID,
};
use crate::aws::{FunctionDescription, FunctionLister};

pub fn discovery_base_path() -> String {
    format!("{BASE_PATH}/discovery")
}

/// Listing of all functions ended early because a page request failed.
#[derive(Debug, thiserror::Error)]
#[error("lambda function listing failed after {} targets", .targets.len())]
pub struct PartialDiscovery {
    /// Targets of the pages fetched before the failure.
    pub targets: Vec<Target>,
    pub source: anyhow::Error,
}

/// Enumerates all functions by following the continuation marker until the
/// last page, preserving the provider's order.
pub async fn enumerate_targets(
    lister: &dyn FunctionLister,
) -> Result<Vec<Target>, PartialDiscovery> {
    let mut targets = Vec::with_capacity(20);
    let mut marker: Option<String> = None;
    loop {
        let page = match lister.list_functions(marker.take()).await {
            Ok(page) => page,
            Err(source) => return Err(PartialDiscovery { targets, source }),
        };
        debug!(
            functions = page.functions.len(),
            has_more = page.next_marker.is_some(),
            "fetched lambda function page"
        );
        targets.extend(page.functions.iter().map(to_target));

        match page.next_marker {
            Some(next) => marker = Some(next),
            None => break,
        }
    }
    Ok(targets)
}

pub fn to_target(function: &FunctionDescription) -> Target {
    let text = |value: &Option<String>| vec![value.clone().unwrap_or_default()];
    let arn = function.function_arn.clone().unwrap_or_default();
    let name = function.function_name.clone().unwrap_or_default();

    let mut attrs = BTreeMap::new();
    attrs.insert(attributes::ARN.to_string(), vec![arn.clone()]);
    attrs.insert(attributes::FUNCTION_NAME.to_string(), vec![name.clone()]);
    attrs.insert(attributes::RUNTIME.to_string(), text(&function.runtime));
    attrs.insert(attributes::ROLE.to_string(), text(&function.role));
    attrs.insert(attributes::HANDLER.to_string(), text(&function.handler));
    attrs.insert(
        attributes::CODE_SIZE.to_string(),
        vec![function.code_size.to_string()],
    );
    attrs.insert(
        attributes::DESCRIPTION.to_string(),
        text(&function.description),
    );
    if let Some(timeout) = function.timeout {
        attrs.insert(attributes::TIMEOUT.to_string(), vec![timeout.to_string()]);
    }
    if let Some(memory_size) = function.memory_size {
        attrs.insert(
            attributes::MEMORY_SIZE.to_string(),
            vec![memory_size.to_string()],
        );
    }
    attrs.insert(
        attributes::LAST_MODIFIED.to_string(),
        text(&function.last_modified),
    );
    attrs.insert(attributes::VERSION.to_string(), text(&function.version));
    attrs.insert(
        attributes::REVISION_ID.to_string(),
        text(&function.revision_id),
    );
    attrs.insert(
        attributes::PACKAGE_TYPE.to_string(),
        text(&function.package_type),
    );
    attrs.insert(
        attributes::ARCHITECTURE.to_string(),
        function.architectures.clone(),
    );
    if let Some(param) = function
        .environment
        .as_ref()
        .and_then(|env| env.get(FAILURE_INJECTION_ENV_VAR))
    {
        attrs.insert(
            attributes::FAILURE_INJECTION_PARAM.to_string(),
            vec![param.clone()],
        );
    }

    Target {
        id: arn,
        label: name,
        target_type: TARGET_ID.to_string(),
        attributes: attrs,
    }
}

pub fn discovery_list() -> DiscoveryList {
    let base = discovery_base_path();
    DiscoveryList {
        discoveries: vec![DescribingEndpointReference::get(base.clone())],
        target_types: vec![DescribingEndpointReference::get(format!(
            "{base}/target-description"
        ))],
        target_attributes: vec![DescribingEndpointReference::get(format!(
            "{base}/attribute-descriptions"
        ))],
    }
}

pub fn discovery_description() -> DiscoveryDescription {
    DiscoveryDescription {
        id: TARGET_ID.to_string(),
        restrict_to: Some(RestrictTo::Leader),
        discover: DescribingEndpointReferenceWithCallInterval {
            method: Method::Get,
            path: format!("{}/discovered-targets", discovery_base_path()),
            call_interval: Some("1m".to_string()),
        },
    }
}

pub fn target_description() -> TargetDescription {
    TargetDescription {
        id: TARGET_ID.to_string(),
        version: DESCRIPTION_VERSION.to_string(),
        label: PluralLabel::new("AWS Lambda", "AWS Lambdas"),
        icon: Some(TARGET_ICON.to_string()),
        category: Some("cloud".to_string()),
        table: Table {
            columns: vec![
                Column {
                    attribute: attributes::FUNCTION_NAME.to_string(),
                },
                Column {
                    attribute: attributes::DESCRIPTION.to_string(),
                },
            ],
            order_by: vec![OrderBy {
                attribute: attributes::FUNCTION_NAME.to_string(),
                direction: Direction::Asc,
            }],
        },
    }
}

pub fn attribute_descriptions() -> AttributeDescriptions {
    let labels = [
        (attributes::FUNCTION_NAME, "Function Name", "Function Names"),
        (attributes::ARN, "ARN", "ARNs"),
        (attributes::RUNTIME, "Runtime", "Runtimes"),
        (attributes::ROLE, "Role", "Roles"),
        (attributes::HANDLER, "Handler", "Handlers"),
        (attributes::CODE_SIZE, "Code Size", "Code Sizes"),
        (attributes::DESCRIPTION, "Description", "Descriptions"),
        (attributes::TIMEOUT, "Timeout", "Timeouts"),
        (attributes::MEMORY_SIZE, "Memory Size", "Memory Sizes"),
        (attributes::LAST_MODIFIED, "Last Modified", "Last Modified"),
        (attributes::VERSION, "Version", "Versions"),
        (attributes::REVISION_ID, "Revision ID", "Revision IDs"),
        (attributes::PACKAGE_TYPE, "Package Type", "Package Types"),
        (attributes::ARCHITECTURE, "Architecture", "Architectures"),
        (
            attributes::FAILURE_INJECTION_PARAM,
            "Failure Injection SSM Parameter",
            "Failure Injection SSM Parameters",
        ),
    ];
    AttributeDescriptions {
        attributes: labels
            .into_iter()
            .map(|(attribute, one, other)| AttributeDescription {
                attribute: attribute.to_string(),
                label: PluralLabel::new(one, other),
            })
            .collect(),
    }
}
