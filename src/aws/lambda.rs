use anyhow::{anyhow, Result};
use async_trait::async_trait;
use aws_config::SdkConfig;
use aws_sdk_lambda::{error::DisplayErrorContext, types::FunctionConfiguration, Client};

use super::{FunctionDescription, FunctionLister, FunctionPage};

pub struct LambdaFunctionLister {
    client: Client,
}

impl LambdaFunctionLister {
    pub fn new(sdk_config: &SdkConfig) -> Self {
        Self {
            client: Client::new(sdk_config),
        }
    }
}

#[async_trait]
impl FunctionLister for LambdaFunctionLister {
    async fn list_functions(&self, marker: Option<String>) -> Result<FunctionPage> {
        let output = self
            .client
            .list_functions()
            .set_marker(marker)
            .send()
            .await
            .map_err(|e| anyhow!("ListFunctions failed: {}", DisplayErrorContext(&e)))?;

        Ok(FunctionPage {
            functions: output.functions().iter().map(Into::into).collect(),
            next_marker: output.next_marker().map(str::to_string),
        })
    }
}

impl From<&FunctionConfiguration> for FunctionDescription {
    fn from(function: &FunctionConfiguration) -> Self {
        let owned = |value: Option<&str>| value.map(str::to_string);
        FunctionDescription {
            function_arn: owned(function.function_arn()),
            function_name: owned(function.function_name()),
            runtime: function.runtime().map(|r| r.as_str().to_string()),
            role: owned(function.role()),
            handler: owned(function.handler()),
            code_size: function.code_size(),
            description: owned(function.description()),
            timeout: function.timeout(),
            memory_size: function.memory_size(),
            last_modified: owned(function.last_modified()),
            version: owned(function.version()),
            revision_id: owned(function.revision_id()),
            package_type: function.package_type().map(|p| p.as_str().to_string()),
            architectures: function
                .architectures()
                .iter()
                .map(|a| a.as_str().to_string())
                .collect(),
            environment: function
                .environment()
                .and_then(|env| env.variables())
                .cloned(),
        }
    }
}

#[cfg(test)]
mod tests {
    use aws_sdk_lambda::types::{Architecture, EnvironmentResponse, PackageType, Runtime};

    use super::*;

    #[test]
    fn test_function_configuration_conversion() {
        let function = FunctionConfiguration::builder()
            .function_name("checkout")
            .function_arn("arn:aws:lambda:eu-central-1:123456789012:function:checkout")
            .runtime(Runtime::Nodejs20x)
            .code_size(2048)
            .timeout(30)
            .package_type(PackageType::Zip)
            .architectures(Architecture::X8664)
            .architectures(Architecture::Arm64)
            .environment(
                EnvironmentResponse::builder()
                    .variables("FAILURE_INJECTION_PARAM", "/checkout/failure")
                    .build(),
            )
            .build();

        let description = FunctionDescription::from(&function);
        assert_eq!(description.function_name.as_deref(), Some("checkout"));
        assert_eq!(description.runtime.as_deref(), Some("nodejs20.x"));
        assert_eq!(description.code_size, 2048);
        assert_eq!(description.timeout, Some(30));
        assert_eq!(description.memory_size, None);
        assert_eq!(description.package_type.as_deref(), Some("Zip"));
        assert_eq!(description.architectures, vec!["x86_64", "arm64"]);
        assert_eq!(
            description
                .environment
                .unwrap()
                .get("FAILURE_INJECTION_PARAM")
                .map(String::as_str),
            Some("/checkout/failure")
        );
        assert_eq!(description.role, None);
    }
}
