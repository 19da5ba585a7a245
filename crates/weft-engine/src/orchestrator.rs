use std::sync::Arc;
use std::time::Instant;

use serde_json::json;
use tracing::{error, info};
use uuid::Uuid;

use weft_core::error::{Result, WeftError};
use weft_core::model::{EngineLog, LogEntry, OrchestrationRequest, OrchestrationResult};
use weft_core::traits::WorkflowStore;

use crate::registry::EngineRegistry;

/// Single entry point for orchestration runs.
///
/// Resolves the workflow, dispatches to an engine, measures wall-clock
/// duration, and stamps one run-scoped correlation id onto every log
/// entry before handing the result back.
pub struct Orchestrator {
    registry: EngineRegistry,
    workflows: Arc<dyn WorkflowStore>,
}

impl Orchestrator {
    pub fn new(registry: EngineRegistry, workflows: Arc<dyn WorkflowStore>) -> Self {
        Self {
            registry,
            workflows,
        }
    }

    pub fn registry(&self) -> &EngineRegistry {
        &self.registry
    }

    /// Run one orchestration request to completion.
    pub async fn execute(&self, request: &OrchestrationRequest) -> Result<OrchestrationResult> {
        let workflow = self
            .workflows
            .get_workflow(&request.workflow_id)
            .await?
            .ok_or_else(|| WeftError::WorkflowNotFound(request.workflow_id.clone()))?;

        let engine = self.registry.resolve(&request.engine)?;
        let engine_name = engine.name().to_string();
        let correlation_id = Uuid::new_v4().to_string();

        info!(
            engine = %engine_name,
            workflow_id = %workflow.id,
            correlation_id = %correlation_id,
            "Orchestration run started"
        );

        let start = Instant::now();
        let outcome = engine.run(&workflow, &request.inputs).await;
        let duration_ms = start.elapsed().as_millis() as u64;

        let run = match outcome {
            Ok(run) => run,
            Err(e) => {
                error!(
                    engine = %engine_name,
                    workflow_id = %workflow.id,
                    correlation_id = %correlation_id,
                    error = %e,
                    "Orchestration run failed"
                );
                return Err(e);
            }
        };

        let mut logs: Vec<LogEntry> = Vec::with_capacity(run.logs.len() + 1);
        for log in run.logs {
            logs.push(stamp(log, &engine_name, &workflow.id, &correlation_id));
        }

        let summary = LogEntry::info("Run complete").with_detail(json!({
            "duration_ms": duration_ms,
            "executed_nodes": run.plan.executed_nodes.len(),
            "artifacts": run.plan.artifacts.len(),
        }));
        logs.push(stamp(
            EngineLog::Entry(summary),
            &engine_name,
            &workflow.id,
            &correlation_id,
        ));

        info!(
            engine = %engine_name,
            workflow_id = %workflow.id,
            correlation_id = %correlation_id,
            duration_ms,
            executed = run.plan.executed_nodes.len(),
            "Orchestration run complete"
        );

        Ok(OrchestrationResult {
            engine: engine_name,
            workflow_id: workflow.id,
            plan: run.plan,
            logs,
            duration_ms,
            correlation_id,
        })
    }
}

/// Normalize an engine log into a structured entry carrying the run's
/// identity fields. Plain-text lines get a synthesized timestamp.
fn stamp(log: EngineLog, engine: &str, workflow_id: &str, correlation_id: &str) -> LogEntry {
    let mut entry = match log {
        EngineLog::Entry(entry) => entry,
        EngineLog::Text(text) => LogEntry::info(text),
    };
    entry.engine = Some(engine.to_string());
    entry.workflow_id = Some(workflow_id.to_string());
    entry.correlation_id = Some(correlation_id.to_string());
    entry
}
