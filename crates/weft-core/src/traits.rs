use futures::future::BoxFuture;

use crate::error::Result;
use crate::model::{AgentDef, ChatMessage, Workflow};

/// Non-streaming completion backend for the chat engine.
pub trait ChatModel: Send + Sync + 'static {
    /// Model name shown in logs.
    fn name(&self) -> &str;

    /// Send a message sequence and return the assistant's reply text.
    fn complete(&self, messages: Vec<ChatMessage>) -> BoxFuture<'_, Result<String>>;
}

/// Persistence backend for workflow documents.
pub trait WorkflowStore: Send + Sync + 'static {
    /// Persist a workflow.
    fn create_workflow(&self, workflow: &Workflow) -> BoxFuture<'_, Result<()>>;

    /// Fetch one workflow by id. `None` when the id is unknown.
    fn get_workflow(&self, id: &str) -> BoxFuture<'_, Result<Option<Workflow>>>;

    /// List all workflows, newest first.
    fn list_workflows(&self) -> BoxFuture<'_, Result<Vec<Workflow>>>;
}

/// Persistence backend for agent personas.
pub trait AgentStore: Send + Sync + 'static {
    /// Persist an agent definition.
    fn create_agent(&self, agent: &AgentDef) -> BoxFuture<'_, Result<()>>;

    /// Fetch one agent by id. `None` when the id is unknown.
    fn get_agent(&self, id: &str) -> BoxFuture<'_, Result<Option<AgentDef>>>;

    /// List all agents, newest first.
    fn list_agents(&self) -> BoxFuture<'_, Result<Vec<AgentDef>>>;
}
