use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use extension_kit::ExtensionError;
use tracing::error;

use crate::lambda;

/// Error returned by every handler, rendered as the extension error body.
#[derive(Debug)]
pub struct ExtensionAPIError {
    status_code: StatusCode,
    body: ExtensionError,
}

impl ExtensionAPIError {
    pub fn new(status_code: StatusCode, body: ExtensionError) -> Self {
        Self { status_code, body }
    }

    pub fn bad_request(title: &str) -> Self {
        Self::new(StatusCode::BAD_REQUEST, ExtensionError::new(title))
    }

    pub fn internal_error(title: &str, e: &anyhow::Error) -> Self {
        Self::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            ExtensionError::with_source(title, e),
        )
    }

    #[cfg(test)]
    pub fn status_code(&self) -> StatusCode {
        self.status_code
    }

    #[cfg(test)]
    pub fn body(&self) -> &ExtensionError {
        &self.body
    }
}

impl IntoResponse for ExtensionAPIError {
    fn into_response(self) -> Response {
        error!("API Error: {} - {}", self.status_code, self.body);
        (self.status_code, Json(self.body)).into_response()
    }
}

impl From<lambda::Error> for ExtensionAPIError {
    fn from(e: lambda::Error) -> Self {
        match e {
            lambda::Error::Validation(message) | lambda::Error::Precondition(message) => {
                Self::bad_request(&message)
            }
            lambda::Error::Internal(message) => Self::new(
                StatusCode::INTERNAL_SERVER_ERROR,
                ExtensionError::new(&message),
            ),
            lambda::Error::Io { message, source } => Self::internal_error(&message, &source),
        }
    }
}

impl From<JsonRejection> for ExtensionAPIError {
    fn from(rejection: JsonRejection) -> Self {
        Self::new(
            StatusCode::BAD_REQUEST,
            ExtensionError {
                title: "Failed to parse request body".to_string(),
                detail: Some(rejection.body_text()),
            },
        )
    }
}
