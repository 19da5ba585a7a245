use futures::future::BoxFuture;
use serde_json::{Map, Value};

use weft_core::error::Result;
use weft_core::model::{EngineLog, OrchestrationPlan, Workflow};

/// What one engine run produced: the plan plus the raw log trail.
///
/// Logs come back unenriched; the orchestrator stamps them with the
/// run's correlation id before they reach a caller.
#[derive(Debug, Clone, Default)]
pub struct EngineRun {
    pub plan: OrchestrationPlan,
    pub logs: Vec<EngineLog>,
}

impl EngineRun {
    pub fn new() -> Self {
        Self::default()
    }
}

/// An execution back end for workflows.
///
/// Implementations walk the workflow's nodes in declaration order and
/// differ only in how a node's output is computed. A failed node aborts
/// the run; no partial plan is returned.
pub trait Engine: Send + Sync {
    /// Canonical engine name, stamped onto results and logs.
    fn name(&self) -> &str;

    /// Execute a workflow with the given run inputs.
    fn run(
        &self,
        workflow: &Workflow,
        inputs: &Map<String, Value>,
    ) -> BoxFuture<'_, Result<EngineRun>>;
}

impl std::fmt::Debug for dyn Engine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Engine").field("name", &self.name()).finish()
    }
}
