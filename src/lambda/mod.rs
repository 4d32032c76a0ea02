//! AWS Lambda discovery and the status code failure injection attack.

pub mod action;
pub mod discovery;

/// Target type of discovered Lambda functions.
pub const TARGET_ID: &str = "com.steadybit.extension_aws.lambda";

pub const TARGET_ICON: &str = "data:image/svg+xml,%3Csvg%20xmlns%3D%22http%3A%2F%2Fwww.w3.org%2F2000%2Fsvg%22%20viewBox%3D%220%200%2024%2024%22%3E%3Cpath%20fill%3D%22currentColor%22%20d%3D%22M4%2021h4.5l3-6.5L15%2021h5L12.5%205H8l1%202.2h1.8L4%2021z%22%2F%3E%3C%2Fsvg%3E";

/// Version of the target type and action, used by the agent for caching.
pub const DESCRIPTION_VERSION: &str = env!("CARGO_PKG_VERSION");

pub const BASE_PATH: &str = "/lambda";

/// Environment variable a wrapped function reads its SSM parameter name from.
pub const FAILURE_INJECTION_ENV_VAR: &str = "FAILURE_INJECTION_PARAM";

pub mod attributes {
    pub const ARN: &str = "aws.arn";
    pub const FUNCTION_NAME: &str = "aws.lambda.function-name";
    pub const RUNTIME: &str = "aws.lambda.runtime";
    pub const ROLE: &str = "aws.role";
    pub const HANDLER: &str = "aws.lambda.handler";
    pub const CODE_SIZE: &str = "aws.lambda.code-size";
    pub const DESCRIPTION: &str = "aws.lambda.description";
    pub const TIMEOUT: &str = "aws.lambda.timeout";
    pub const MEMORY_SIZE: &str = "aws.lambda.memory-size";
    pub const LAST_MODIFIED: &str = "aws.lambda.last-modified";
    pub const VERSION: &str = "aws.lambda.version";
    pub const REVISION_ID: &str = "aws.lambda.revision-id";
    pub const PACKAGE_TYPE: &str = "aws.lambda.package-type";
    pub const ARCHITECTURE: &str = "aws.lambda.architecture";
    pub const FAILURE_INJECTION_PARAM: &str = "aws.lambda.failure-injection-param";
}

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Malformed or missing caller input.
    #[error("{0}")]
    Validation(String),

    /// The target cannot be used for the requested operation.
    #[error("{0}")]
    Precondition(String),

    /// The extension failed to encode its own data.
    #[error("{0}")]
    Internal(String),

    /// Communication with AWS failed.
    #[error("{message}")]
    Io {
        message: String,
        source: anyhow::Error,
    },
}

impl Error {
    pub fn io(message: &str, source: anyhow::Error) -> Self {
        Self::Io {
            message: message.to_string(),
            source,
        }
    }
}
