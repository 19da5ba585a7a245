use std::sync::Arc;

use weft_core::config::AppConfig;
use weft_core::traits::{AgentStore, WorkflowStore};
use weft_engine::Orchestrator;

/// Shared application state for axum handlers.
pub struct AppState {
    pub config: AppConfig,
    pub orchestrator: Arc<Orchestrator>,
    pub workflows: Arc<dyn WorkflowStore>,
    pub agents: Arc<dyn AgentStore>,
}
