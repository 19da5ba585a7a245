use std::sync::Arc;

use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tracing::info;

use weft_core::config::AppConfig;
use weft_core::traits::{AgentStore, WorkflowStore};
use weft_engine::Orchestrator;

use crate::routes;
use crate::state::AppState;

/// HTTP gateway server built on axum.
pub struct GatewayServer {
    config: AppConfig,
    orchestrator: Arc<Orchestrator>,
    workflows: Arc<dyn WorkflowStore>,
    agents: Arc<dyn AgentStore>,
}

impl GatewayServer {
    pub fn new(
        config: AppConfig,
        orchestrator: Arc<Orchestrator>,
        workflows: Arc<dyn WorkflowStore>,
        agents: Arc<dyn AgentStore>,
    ) -> Self {
        Self {
            config,
            orchestrator,
            workflows,
            agents,
        }
    }

    /// Run the gateway until the cancellation token is triggered.
    pub async fn run(&self, shutdown: CancellationToken) -> anyhow::Result<()> {
        let state = Arc::new(AppState {
            config: self.config.clone(),
            orchestrator: self.orchestrator.clone(),
            workflows: self.workflows.clone(),
            agents: self.agents.clone(),
        });

        let app = routes::router(state);

        let listener = TcpListener::bind(&self.config.gateway.bind).await?;
        info!(bind = %self.config.gateway.bind, "Gateway listening");

        axum::serve(listener, app)
            .with_graceful_shutdown(async move { shutdown.cancelled().await })
            .await?;

        info!("Gateway shut down");
        Ok(())
    }
}
