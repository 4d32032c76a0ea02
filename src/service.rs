use std::{net::SocketAddr, sync::Arc};

use anyhow::{Context, Result};
use axum_server::Handle;
use tokio::signal;
use tower_http::trace::TraceLayer;
use tracing::{error, info};

use crate::{
    aws::{self, FunctionLister, LambdaFunctionLister, ParameterStore, SsmParameterStore},
    config::ExtensionConfig,
    metrics::{self, init_provider},
    middleware::InstanceRequestSpan,
    routes::{create_routes, RouteState},
};

pub struct Service {
    pub config: ExtensionConfig,
    pub functions: Arc<dyn FunctionLister>,
    pub parameter_store: Arc<dyn ParameterStore>,
}

impl Service {
    pub async fn new(config: ExtensionConfig) -> Result<Self> {
        let sdk_config = aws::load_sdk_config(&config.aws).await;
        let functions: Arc<dyn FunctionLister> = Arc::new(LambdaFunctionLister::new(&sdk_config));
        let parameter_store: Arc<dyn ParameterStore> =
            Arc::new(SsmParameterStore::new(&sdk_config));

        Ok(Self {
            config,
            functions,
            parameter_store,
        })
    }

    pub async fn start(&self) -> Result<()> {
        init_provider(&self.config, env!("CARGO_PKG_VERSION"))
            .context("error initializing metrics provider")?;

        let route_state = RouteState {
            functions: self.functions.clone(),
            parameter_store: self.parameter_store.clone(),
            metrics: Arc::new(metrics::extension::Metrics::new()),
        };

        let handle = Handle::new();
        let handle_sh = handle.clone();
        tokio::spawn(async move {
            shutdown_signal(handle_sh).await;
            info!("graceful shutdown signal received, shutting down server gracefully");
        });

        let addr: SocketAddr = self
            .config
            .listen_addr()
            .parse()
            .with_context(|| format!("invalid listen address {}", self.config.listen_addr()))?;
        info!("extension api listening on {}", addr);

        let routes = create_routes(route_state).layer(
            TraceLayer::new_for_http().make_span_with(InstanceRequestSpan::new(
                &self.config.env,
                &self.config.instance_id(),
            )),
        );
        axum_server::bind(addr)
            .handle(handle)
            .serve(routes.into_make_service())
            .await?;

        Ok(())
    }
}

async fn shutdown_signal(handle: Handle) {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("failed to install Ctrl+C handler: {:?}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!("failed to install SIGTERM handler: {:?}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    handle.shutdown();
    info!("signal received, shutting down server gracefully");
}
