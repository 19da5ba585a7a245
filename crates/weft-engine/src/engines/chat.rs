use std::sync::Arc;

use futures::future::BoxFuture;
use serde_json::{json, Map, Value};
use tracing::debug;

use weft_core::error::{Result, WeftError};
use weft_core::model::{
    AgentDef, ChatMessage, EngineLog, LogEntry, OrchestrationArtifact, Workflow,
};
use weft_core::traits::{AgentStore, ChatModel};

use crate::engine::{Engine, EngineRun};

const DEFAULT_PERSONA: &str = "You are a workflow step executor. Answer concisely.";

/// Chat-model engine: each node is one completion call.
///
/// The prompt is assembled from the node's stored agent persona, the
/// run inputs, and the outputs of earlier nodes in the same run, so a
/// linear workflow behaves like a short agent relay.
pub struct ChatEngine {
    agents: Arc<dyn AgentStore>,
    model: Arc<dyn ChatModel>,
}

impl ChatEngine {
    pub fn new(agents: Arc<dyn AgentStore>, model: Arc<dyn ChatModel>) -> Self {
        Self { agents, model }
    }

    async fn resolve_agent(&self, node_id: &str, agent_id: Option<&str>) -> Result<AgentDef> {
        let id = agent_id.ok_or_else(|| {
            WeftError::MissingAgent(format!("node '{}' does not reference an agent", node_id))
        })?;
        self.agents
            .get_agent(id)
            .await?
            .ok_or_else(|| WeftError::MissingAgent(id.to_string()))
    }
}

impl Engine for ChatEngine {
    fn name(&self) -> &str {
        "chat"
    }

    fn run(
        &self,
        workflow: &Workflow,
        inputs: &Map<String, Value>,
    ) -> BoxFuture<'_, Result<EngineRun>> {
        let workflow = workflow.clone();
        let inputs = inputs.clone();
        Box::pin(async move {
            let graph = workflow.parse_graph()?;

            let mut run = EngineRun::new();
            run.logs.push(EngineLog::Entry(LogEntry::info(format!(
                "Chat run started with {} nodes",
                graph.nodes.len()
            ))));

            let mut previous: Vec<(String, String)> = Vec::new();
            for node in &graph.nodes {
                let agent = self
                    .resolve_agent(&node.id, node.agent_id.as_deref())
                    .await?;
                let system = agent
                    .role
                    .clone()
                    .unwrap_or_else(|| DEFAULT_PERSONA.to_string());
                let user = build_user_message(&agent, &inputs, &previous);

                debug!(
                    node = %node.id,
                    agent = %agent.name,
                    model = self.model.name(),
                    "Chat node dispatched"
                );
                let output = self
                    .model
                    .complete(vec![ChatMessage::system(system), ChatMessage::user(user)])
                    .await?;

                run.logs.push(EngineLog::Entry(
                    LogEntry::info(format!("Agent '{}' replied", agent.name))
                        .with_node(&node.id)
                        .with_detail(json!({"output_preview": preview(&output)})),
                ));
                previous.push((node.id.clone(), output.clone()));
                run.plan.record(&node.id, OrchestrationArtifact::ok(output));
            }

            run.logs
                .push(EngineLog::Entry(LogEntry::info("Chat run complete")));
            Ok(run)
        })
    }
}

fn build_user_message(
    agent: &AgentDef,
    inputs: &Map<String, Value>,
    previous: &[(String, String)],
) -> String {
    let mut sections = vec![agent.prompt.clone()];
    if !inputs.is_empty() {
        sections.push(format!("Inputs: {}", Value::Object(inputs.clone())));
    }
    if !previous.is_empty() {
        let prior = previous
            .iter()
            .map(|(id, output)| format!("{}: {}", id, output))
            .collect::<Vec<_>>()
            .join("\n");
        sections.push(format!("Previous outputs:\n{}", prior));
    }
    sections.join("\n\n")
}

fn preview(text: &str) -> String {
    text.chars().take(120).collect()
}
