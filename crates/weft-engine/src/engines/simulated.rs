use futures::future::BoxFuture;
use serde_json::{Map, Value};
use tracing::debug;

use weft_core::error::Result;
use weft_core::model::{EngineLog, OrchestrationArtifact, Workflow};

use super::prompt_snippet;
use crate::engine::{Engine, EngineRun};

/// Local stand-in for a live adapter, used when its mode flag says
/// simulate. Output echoes the engine name, node id, and prompt
/// fragment so callers can watch inputs flow end to end without a
/// credential.
#[derive(Debug, Clone)]
pub struct SimulatedEngine {
    name: String,
}

impl SimulatedEngine {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

impl Engine for SimulatedEngine {
    fn name(&self) -> &str {
        &self.name
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
            let snippet = prompt_snippet(&inputs);

            let mut run = EngineRun::new();
            run.logs.push(EngineLog::text(format!(
                "Simulated {} run started with {} nodes",
                self.name,
                graph.nodes.len()
            )));

            for node in &graph.nodes {
                let output = match &snippet {
                    Some(s) => format!("sim-{}-{}-{}", self.name, node.id, s),
                    None => format!("sim-{}-{}", self.name, node.id),
                };
                debug!(node = %node.id, engine = %self.name, "Simulated node executed");
                run.plan.record(&node.id, OrchestrationArtifact::ok(output));
                run.logs
                    .push(EngineLog::text(format!("Simulated node {}", node.id)));
            }

            run.logs.push(EngineLog::text("Simulated run complete"));
            Ok(run)
        })
    }
}
