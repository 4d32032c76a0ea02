use std::fmt;

use serde::{Deserialize, Serialize};

/// Error body returned to the agent when a call fails.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ExtensionError {
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl ExtensionError {
    pub fn new(title: &str) -> Self {
        Self {
            title: title.to_string(),
            detail: None,
        }
    }

    /// Builds an error with the full cause chain of `source` as detail.
    pub fn with_source(title: &str, source: &anyhow::Error) -> Self {
        Self {
            title: title.to_string(),
            detail: Some(format!("{source:#}")),
        }
    }
}

impl fmt::Display for ExtensionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.detail {
            Some(detail) => write!(f, "{}: {}", self.title, detail),
            None => write!(f, "{}", self.title),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detail_is_omitted_when_absent() {
        let json = serde_json::to_value(ExtensionError::new("boom")).unwrap();
        assert_eq!(json, serde_json::json!({ "title": "boom" }));
    }

    #[test]
    fn test_detail_carries_cause_chain() {
        let source = anyhow::anyhow!("connection reset").context("put parameter");
        let err = ExtensionError::with_source("Failed to put ssm parameter", &source);
        assert_eq!(err.detail.as_deref(), Some("put parameter: connection reset"));
        assert_eq!(
            err.to_string(),
            "Failed to put ssm parameter: put parameter: connection reset"
        );
    }
}
