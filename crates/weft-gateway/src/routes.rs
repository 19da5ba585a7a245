use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::{json, Value};
use tower_http::cors::CorsLayer;
use tracing::debug;

use weft_core::error::WeftError;
use weft_core::model::{AgentDef, OrchestrationRequest, OrchestrationResult, Workflow};

use crate::state::AppState;

/// Error surface for every handler: a status code plus a message body.
///
/// Engine and store failures arrive as `WeftError` and map onto the
/// status taxonomy below; plain GET misses use `not_found` directly.
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    pub fn not_found(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            message: message.into(),
        }
    }
}

impl From<WeftError> for ApiError {
    fn from(err: WeftError) -> Self {
        let status = match &err {
            WeftError::WorkflowNotFound(_) => StatusCode::NOT_FOUND,
            WeftError::InvalidWorkflow(_)
            | WeftError::NodeExecution(_)
            | WeftError::UnsupportedEngine(_)
            | WeftError::MissingAgent(_) => StatusCode::BAD_REQUEST,
            WeftError::FeatureDisabled(_) => StatusCode::NOT_IMPLEMENTED,
            WeftError::Timeout(_)
            | WeftError::Server { .. }
            | WeftError::Network(_)
            | WeftError::Rejected { .. }
            | WeftError::RemoteReported(_)
            | WeftError::ChatRequest(_) => StatusCode::BAD_GATEWAY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        Self {
            status,
            message: err.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(json!({ "error": self.message }))).into_response()
    }
}

/// Build the full route table over shared state.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/workflows", post(create_workflow).get(list_workflows))
        .route("/workflows/{id}", get(get_workflow))
        .route("/agents", post(create_agent).get(list_agents))
        .route("/agents/{id}", get(get_agent))
        .route("/orchestrate/run", post(orchestrate_run))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

// GET /health
pub async fn health() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

#[derive(Deserialize)]
pub struct CreateWorkflowBody {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    /// Raw graph document. Stored as-is; engines validate it at run time.
    #[serde(default)]
    pub graph: serde_json::Map<String, Value>,
}

// POST /workflows
pub async fn create_workflow(
    State(state): State<Arc<AppState>>,
    Json(body): Json<CreateWorkflowBody>,
) -> Result<(StatusCode, Json<Workflow>), ApiError> {
    let mut workflow = Workflow::new(body.name, Value::Object(body.graph));
    if let Some(description) = body.description {
        workflow = workflow.with_description(description);
    }
    state.workflows.create_workflow(&workflow).await?;
    debug!(workflow_id = %workflow.id, name = %workflow.name, "Workflow created");
    Ok((StatusCode::CREATED, Json(workflow)))
}

// GET /workflows
pub async fn list_workflows(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<Workflow>>, ApiError> {
    Ok(Json(state.workflows.list_workflows().await?))
}

// GET /workflows/{id}
pub async fn get_workflow(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<Workflow>, ApiError> {
    state
        .workflows
        .get_workflow(&id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::not_found(format!("Workflow not found: {}", id)))
}

#[derive(Deserialize)]
pub struct CreateAgentBody {
    pub name: String,
    #[serde(default)]
    pub role: Option<String>,
    pub prompt: String,
}

// POST /agents
pub async fn create_agent(
    State(state): State<Arc<AppState>>,
    Json(body): Json<CreateAgentBody>,
) -> Result<(StatusCode, Json<AgentDef>), ApiError> {
    let mut agent = AgentDef::new(body.name, body.prompt);
    if let Some(role) = body.role {
        agent = agent.with_role(role);
    }
    state.agents.create_agent(&agent).await?;
    debug!(agent_id = %agent.id, name = %agent.name, "Agent created");
    Ok((StatusCode::CREATED, Json(agent)))
}

// GET /agents
pub async fn list_agents(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<AgentDef>>, ApiError> {
    Ok(Json(state.agents.list_agents().await?))
}

// GET /agents/{id}
pub async fn get_agent(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<AgentDef>, ApiError> {
    state
        .agents
        .get_agent(&id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::not_found(format!("Agent not found: {}", id)))
}

#[derive(Deserialize)]
pub struct RunBody {
    /// Engine name; the configured default applies when absent or empty.
    #[serde(default)]
    pub engine: Option<String>,
    pub workflow_id: String,
    #[serde(default)]
    pub inputs: serde_json::Map<String, Value>,
}

// POST /orchestrate/run
pub async fn orchestrate_run(
    State(state): State<Arc<AppState>>,
    Json(body): Json<RunBody>,
) -> Result<Json<OrchestrationResult>, ApiError> {
    let engine = body
        .engine
        .filter(|e| !e.trim().is_empty())
        .unwrap_or_else(|| state.config.engines.default_engine.clone());
    let request = OrchestrationRequest::new(engine, body.workflow_id).with_inputs(body.inputs);
    let result = state.orchestrator.execute(&request).await?;
    Ok(Json(result))
}
