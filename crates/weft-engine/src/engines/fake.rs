use futures::future::BoxFuture;
use serde_json::{Map, Value};
use tracing::debug;

use weft_core::error::{Result, WeftError};
use weft_core::model::{EngineLog, OrchestrationArtifact, Workflow};

use super::prompt_snippet;
use crate::engine::{Engine, EngineRun};

/// Deterministic local engine for development and tests.
///
/// Output is a pure function of the node id and the run's `prompt`
/// input, so callers can assert exact artifacts. A truthy
/// `simulate_error` input aborts the run before any node executes:
/// that is the supported way to exercise failure propagation end to
/// end.
#[derive(Debug, Clone, Copy, Default)]
pub struct FakeEngine;

impl FakeEngine {
    pub fn new() -> Self {
        Self
    }
}

impl Engine for FakeEngine {
    fn name(&self) -> &str {
        "fake"
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

            if let Some(value) = inputs.get("simulate_error") {
                if truthy(value) {
                    return Err(WeftError::NodeExecution(error_message(value)));
                }
            }

            let snippet = prompt_snippet(&inputs);
            let mut run = EngineRun::new();
            run.logs.push(EngineLog::text(format!(
                "Fake run started with {} nodes",
                graph.nodes.len()
            )));

            for node in &graph.nodes {
                let output = match &snippet {
                    Some(s) => format!("fake-{}-{}", node.id, s),
                    None => format!("fake-{}", node.id),
                };
                debug!(node = %node.id, "Fake node executed");
                run.plan.record(&node.id, OrchestrationArtifact::ok(output));
                run.logs
                    .push(EngineLog::text(format!("Executed node {}", node.id)));
            }

            run.logs.push(EngineLog::text("Fake run complete"));
            Ok(run)
        })
    }
}

/// JSON truthiness: null, false, 0, "", [], and {} do not trigger.
fn truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map(|f| f != 0.0).unwrap_or(true),
        Value::String(s) => !s.is_empty(),
        Value::Array(items) => !items.is_empty(),
        Value::Object(map) => !map.is_empty(),
    }
}

fn error_message(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
