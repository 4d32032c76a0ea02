use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
};

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use extension_kit::action::{ActionTarget, PrepareActionRequestBody};
use serde_json::Value;
use tracing::subscriber;
use tracing_subscriber::{layer::SubscriberExt, Layer};

use crate::{
    aws::{DeleteOutcome, FunctionDescription, FunctionLister, FunctionPage, ParameterStore},
    lambda::attributes,
    metrics,
    routes::RouteState,
};

pub fn init_test_tracing() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("debug"));
    let _ = subscriber::set_global_default(
        tracing_subscriber::registry()
            .with(tracing_subscriber::fmt::layer().with_filter(env_filter)),
    );
}

pub fn mock_function(name: &str) -> FunctionDescription {
    FunctionDescription {
        function_arn: Some(format!(
            "arn:aws:lambda:eu-central-1:123456789012:function:{name}"
        )),
        function_name: Some(name.to_string()),
        runtime: Some("nodejs20.x".to_string()),
        handler: Some("index.handler".to_string()),
        code_size: 1024,
        version: Some("$LATEST".to_string()),
        package_type: Some("Zip".to_string()),
        architectures: vec!["x86_64".to_string()],
        ..Default::default()
    }
}

pub fn prepare_request(param: Option<&str>, config: Value) -> PrepareActionRequestBody {
    let mut attributes = HashMap::new();
    attributes.insert(
        attributes::FUNCTION_NAME.to_string(),
        vec!["checkout".to_string()],
    );
    if let Some(param) = param {
        attributes.insert(
            attributes::FAILURE_INJECTION_PARAM.to_string(),
            vec![param.to_string()],
        );
    }
    PrepareActionRequestBody {
        config: serde_json::from_value(config).expect("config must be an object"),
        target: Some(ActionTarget {
            name: "checkout".to_string(),
            attributes,
        }),
        execution_id: None,
    }
}

/// Serves pre-built pages, chained with `page-<n>` markers.
#[derive(Default)]
pub struct FakeFunctionLister {
    pages: Vec<Vec<FunctionDescription>>,
    failing_page: Option<usize>,
    requested_markers: Mutex<Vec<Option<String>>>,
}

impl FakeFunctionLister {
    pub fn with_pages(pages: Vec<Vec<FunctionDescription>>) -> Self {
        Self {
            pages,
            ..Default::default()
        }
    }

    pub fn failing_at_page(mut self, page: usize) -> Self {
        self.failing_page = Some(page);
        self
    }

    pub fn requested_markers(&self) -> Vec<Option<String>> {
        self.requested_markers.lock().unwrap().clone()
    }
}

#[async_trait]
impl FunctionLister for FakeFunctionLister {
    async fn list_functions(&self, marker: Option<String>) -> Result<FunctionPage> {
        self.requested_markers.lock().unwrap().push(marker.clone());
        let index = match marker {
            None => 0,
            Some(marker) => marker
                .strip_prefix("page-")
                .and_then(|n| n.parse::<usize>().ok())
                .ok_or_else(|| anyhow!("unknown marker {marker}"))?,
        };
        if self.failing_page == Some(index) {
            return Err(anyhow!("ThrottlingException: rate exceeded"));
        }
        let functions = self.pages.get(index).cloned().unwrap_or_default();
        let next_marker = (index + 1 < self.pages.len()).then(|| format!("page-{}", index + 1));
        Ok(FunctionPage {
            functions,
            next_marker,
        })
    }
}

#[derive(Default)]
struct StoredParameter {
    value: String,
    tags: Vec<(String, String)>,
}

/// In-memory parameter store with switchable failures.
#[derive(Default)]
pub struct FakeParameterStore {
    parameters: Mutex<HashMap<String, StoredParameter>>,
    fail_writes: bool,
    fail_tags: bool,
    fail_deletes: bool,
}

impl FakeParameterStore {
    pub fn failing_writes(mut self) -> Self {
        self.fail_writes = true;
        self
    }

    pub fn failing_tags(mut self) -> Self {
        self.fail_tags = true;
        self
    }

    pub fn failing_deletes(mut self) -> Self {
        self.fail_deletes = true;
        self
    }

    pub fn value(&self, name: &str) -> Option<String> {
        self.parameters
            .lock()
            .unwrap()
            .get(name)
            .map(|p| p.value.clone())
    }

    pub fn tags(&self, name: &str) -> Vec<(String, String)> {
        self.parameters
            .lock()
            .unwrap()
            .get(name)
            .map(|p| p.tags.clone())
            .unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.parameters.lock().unwrap().len()
    }
}

#[async_trait]
impl ParameterStore for FakeParameterStore {
    async fn put(&self, name: &str, value: &str, _description: &str) -> Result<()> {
        if self.fail_writes {
            return Err(anyhow!("AccessDeniedException: not authorized to perform ssm:PutParameter"));
        }
        self.parameters
            .lock()
            .unwrap()
            .entry(name.to_string())
            .or_default()
            .value = value.to_string();
        Ok(())
    }

    async fn add_tags(&self, name: &str, tags: &[(&str, &str)]) -> Result<()> {
        if self.fail_tags {
            return Err(anyhow!("AccessDeniedException: not authorized to perform ssm:AddTagsToResource"));
        }
        let mut parameters = self.parameters.lock().unwrap();
        let parameter = parameters
            .get_mut(name)
            .ok_or_else(|| anyhow!("InvalidResourceId: {name}"))?;
        for (key, value) in tags {
            parameter.tags.retain(|(k, _)| k != key);
            parameter.tags.push((key.to_string(), value.to_string()));
        }
        Ok(())
    }

    async fn delete(&self, name: &str) -> Result<DeleteOutcome> {
        if self.fail_deletes {
            return Err(anyhow!("InternalServerError: service unavailable"));
        }
        match self.parameters.lock().unwrap().remove(name) {
            Some(_) => Ok(DeleteOutcome::Deleted),
            None => Ok(DeleteOutcome::NotFound),
        }
    }
}

pub fn test_route_state(
    functions: Arc<dyn FunctionLister>,
    parameter_store: Arc<dyn ParameterStore>,
) -> RouteState {
    init_test_tracing();
    RouteState {
        functions,
        parameter_store,
        metrics: Arc::new(metrics::extension::Metrics::new()),
    }
}
