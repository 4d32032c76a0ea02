use std::sync::Arc;

use crate::{
    aws::{FunctionLister, ParameterStore},
    metrics::extension,
};

#[derive(Clone)]
pub struct RouteState {
    pub functions: Arc<dyn FunctionLister>,
    pub parameter_store: Arc<dyn ParameterStore>,
    pub metrics: Arc<extension::Metrics>,
}
