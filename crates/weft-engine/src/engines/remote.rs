use futures::future::BoxFuture;
use serde_json::{Map, Value};
use tracing::info;

use weft_core::error::{Result, WeftError};
use weft_core::model::{EngineLog, OrchestrationArtifact, Workflow};
use weft_remote::{CallContext, RemoteClient};

use super::prompt_snippet;
use crate::engine::{Engine, EngineRun};

/// Live adapter: each node becomes one call to the remote runner.
///
/// A runner-reported business failure becomes `NodeExecution` and
/// aborts the run; transport failures out of the client propagate
/// unmodified so callers can tell the two apart by type.
pub struct RemoteEngine {
    client: RemoteClient,
}

impl RemoteEngine {
    pub fn new(client: RemoteClient) -> Self {
        Self { client }
    }
}

impl Engine for RemoteEngine {
    fn name(&self) -> &str {
        "remote"
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
            let snippet = prompt_snippet(&inputs).unwrap_or_default();

            let mut run = EngineRun::new();
            run.logs.push(EngineLog::text(format!(
                "Remote run started with {} nodes",
                graph.nodes.len()
            )));

            for node in &graph.nodes {
                let prompt = format!("node:{} {}", node.id, snippet);
                let ctx = CallContext {
                    node_id: &node.id,
                    params: &node.params,
                    workflow_id: &workflow.id,
                    workflow_name: &workflow.name,
                    workflow_size: graph.nodes.len(),
                    edges: &graph.edges,
                    inputs: &inputs,
                };

                let response = match self.client.call(&prompt, &ctx).await {
                    Ok(response) => response,
                    Err(WeftError::RemoteReported(message)) => {
                        return Err(WeftError::NodeExecution(format!(
                            "node '{}': {}",
                            node.id, message
                        )));
                    }
                    Err(other) => return Err(other),
                };

                info!(node = %node.id, "Runner executed node");
                run.plan
                    .record(&node.id, OrchestrationArtifact::ok(response.output.unwrap_or_default()));
                run.logs
                    .push(EngineLog::text(format!("Runner executed node {}", node.id)));
            }

            run.logs.push(EngineLog::text("Remote run complete"));
            Ok(run)
        })
    }
}
