use anyhow::{anyhow, Result};
use async_trait::async_trait;
use aws_config::SdkConfig;
use aws_sdk_ssm::{
    error::{DisplayErrorContext, SdkError},
    operation::delete_parameter::{DeleteParameterError, DeleteParameterOutput},
    types::{ParameterType, ResourceTypeForTagging, Tag},
    Client,
};

use super::{DeleteOutcome, ParameterStore};

pub struct SsmParameterStore {
    client: Client,
}

impl SsmParameterStore {
    pub fn new(sdk_config: &SdkConfig) -> Self {
        Self {
            client: Client::new(sdk_config),
        }
    }
}

#[async_trait]
impl ParameterStore for SsmParameterStore {
    async fn put(&self, name: &str, value: &str, description: &str) -> Result<()> {
        self.client
            .put_parameter()
            .name(name)
            .value(value)
            .r#type(ParameterType::String)
            .data_type("text")
            .description(description)
            .overwrite(true)
            .send()
            .await
            .map_err(|e| anyhow!("PutParameter {} failed: {}", name, DisplayErrorContext(&e)))?;
        Ok(())
    }

    async fn add_tags(&self, name: &str, tags: &[(&str, &str)]) -> Result<()> {
        let tags = tags
            .iter()
            .map(|(key, value)| Tag::builder().key(*key).value(*value).build())
            .collect::<Result<Vec<_>, _>>()?;
        self.client
            .add_tags_to_resource()
            .resource_type(ResourceTypeForTagging::Parameter)
            .resource_id(name)
            .set_tags(Some(tags))
            .send()
            .await
            .map_err(|e| {
                anyhow!(
                    "AddTagsToResource {} failed: {}",
                    name,
                    DisplayErrorContext(&e)
                )
            })?;
        Ok(())
    }

    async fn delete(&self, name: &str) -> Result<DeleteOutcome> {
        delete_outcome(name, self.client.delete_parameter().name(name).send().await)
    }
}

/// A parameter that does not exist counts as deleted; every other failure is
/// an error.
fn delete_outcome<R: std::fmt::Debug>(
    name: &str,
    result: Result<DeleteParameterOutput, SdkError<DeleteParameterError, R>>,
) -> Result<DeleteOutcome> {
    match result {
        Ok(_) => Ok(DeleteOutcome::Deleted),
        Err(e) if e.as_service_error().is_some_and(|e| e.is_parameter_not_found()) => {
            Ok(DeleteOutcome::NotFound)
        }
        Err(e) => Err(anyhow!(
            "DeleteParameter {} failed: {}",
            name,
            DisplayErrorContext(&e)
        )),
    }
}
