//! Adapters between the AWS SDK clients and the extension.
//!
//! The discovery and action logic only see the [`FunctionLister`] and
//! [`ParameterStore`] traits, which keeps them independent from the SDK's
//! request builders and lets tests swap in in-memory implementations.

mod lambda;
mod ssm;

use std::collections::HashMap;

use anyhow::Result;
use async_trait::async_trait;
use aws_config::{BehaviorVersion, SdkConfig};
pub use lambda::LambdaFunctionLister;
pub use ssm::SsmParameterStore;
use tracing::info;

use crate::config::AwsConfig;

/// Provider-neutral view of a Lambda function configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FunctionDescription {
    pub function_arn: Option<String>,
    pub function_name: Option<String>,
    pub runtime: Option<String>,
    pub role: Option<String>,
    pub handler: Option<String>,
    pub code_size: i64,
    pub description: Option<String>,
    pub timeout: Option<i32>,
    pub memory_size: Option<i32>,
    pub last_modified: Option<String>,
    pub version: Option<String>,
    pub revision_id: Option<String>,
    pub package_type: Option<String>,
    pub architectures: Vec<String>,
    /// Environment variables, `None` when the function declares none.
    pub environment: Option<HashMap<String, String>>,
}

/// One page of a function listing.
#[derive(Debug, Clone, Default)]
pub struct FunctionPage {
    pub functions: Vec<FunctionDescription>,
    /// Continuation marker for the next page, `None` on the last page.
    pub next_marker: Option<String>,
}

#[async_trait]
pub trait FunctionLister: Send + Sync {
    /// Lists one page of functions starting at `marker`.
    async fn list_functions(&self, marker: Option<String>) -> Result<FunctionPage>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteOutcome {
    Deleted,
    NotFound,
}

/// Remote key/value store holding failure injection configurations.
#[async_trait]
pub trait ParameterStore: Send + Sync {
    /// Writes `value` under `name`, replacing any existing value.
    async fn put(&self, name: &str, value: &str, description: &str) -> Result<()>;

    async fn add_tags(&self, name: &str, tags: &[(&str, &str)]) -> Result<()>;

    /// Deletes `name`. A missing parameter is reported as
    /// [`DeleteOutcome::NotFound`] rather than as an error.
    async fn delete(&self, name: &str) -> Result<DeleteOutcome>;
}

/// Resolves region and credentials once for the whole process.
pub async fn load_sdk_config(config: &AwsConfig) -> SdkConfig {
    let mut loader = aws_config::defaults(BehaviorVersion::latest());
    if let Some(region) = &config.region {
        loader = loader.region(aws_config::Region::new(region.clone()));
    }
    if let Some(endpoint_url) = &config.endpoint_url {
        loader = loader.endpoint_url(endpoint_url);
    }
    let sdk_config = loader.load().await;
    info!(
        region = ?sdk_config.region(),
        "loaded aws configuration"
    );
    sdk_config
}
