use std::sync::Arc;

use serde_json::{json, Map, Value};

use weft_core::config::EnginesConfig;
use weft_core::error::WeftError;
use weft_core::model::{AgentDef, ArtifactStatus, OrchestrationRequest, Workflow};
use weft_core::traits::{AgentStore, WorkflowStore};
use weft_engine::{EngineRegistry, Orchestrator};
use weft_store::SqliteStore;

fn orchestrator() -> (Orchestrator, Arc<SqliteStore>) {
    let store = Arc::new(SqliteStore::in_memory().expect("open in-memory store"));
    let workflows: Arc<dyn WorkflowStore> = store.clone();
    let agents: Arc<dyn AgentStore> = store.clone();

    let engines = EnginesConfig::default();
    let model = weft_llm::create_model(&engines.chat).expect("stub model");
    let registry = EngineRegistry::from_config(&engines, agents, model);
    (Orchestrator::new(registry, workflows), store)
}

fn inputs(value: Value) -> Map<String, Value> {
    value.as_object().expect("object inputs").clone()
}

#[tokio::test]
async fn test_fake_engine_end_to_end() {
    let (orchestrator, store) = orchestrator();

    let workflow = Workflow::new(
        "release",
        json!({
            "nodes": [{"id": "n1"}, {"id": "n2"}],
            "edges": [{"from": "n1", "to": "n2", "label": "then"}],
        }),
    );
    store.create_workflow(&workflow).await.expect("store workflow");

    let request = OrchestrationRequest::new("fake", &workflow.id)
        .with_inputs(inputs(json!({"prompt": "Ship the release"})));
    let result = orchestrator.execute(&request).await.expect("run");

    assert_eq!(result.engine, "fake");
    assert_eq!(result.workflow_id, workflow.id);
    assert_eq!(result.plan.executed_nodes, vec!["n1", "n2"]);
    for id in &result.plan.executed_nodes {
        let artifact = result.plan.artifacts.get(id).expect("artifact per node");
        assert_eq!(artifact.status, ArtifactStatus::Ok);
    }
    assert_eq!(
        result.plan.artifacts["n1"].output.as_deref(),
        Some("fake-n1-Ship the release")
    );

    assert!(!result.logs.is_empty());
    for log in &result.logs {
        assert_eq!(log.correlation_id.as_deref(), Some(result.correlation_id.as_str()));
        assert_eq!(log.engine.as_deref(), Some("fake"));
        assert_eq!(log.workflow_id.as_deref(), Some(workflow.id.as_str()));
    }
    let last = result.logs.last().expect("summary log");
    assert_eq!(last.message, "Run complete");
}

#[tokio::test]
async fn test_chat_engine_uses_seeded_persona() {
    let (orchestrator, store) = orchestrator();

    let agent = AgentDef::new("Release Manager", "Draft the release notes.")
        .with_role("You coordinate releases.");
    store.create_agent(&agent).await.expect("store agent");

    let workflow = Workflow::new(
        "notes",
        json!({"nodes": [{"id": "draft", "agentId": agent.id}]}),
    );
    store.create_workflow(&workflow).await.expect("store workflow");

    let request = OrchestrationRequest::new("chat", &workflow.id)
        .with_inputs(inputs(json!({"version": "1.4.0"})));
    let result = orchestrator.execute(&request).await.expect("run");

    assert_eq!(result.plan.executed_nodes, vec!["draft"]);
    let output = result.plan.artifacts["draft"].output.as_deref().expect("output");
    // The stub model echoes the user message, which opens with the persona prompt.
    assert!(output.starts_with("[chat-stub | temp=0]"));
    assert!(output.contains("Draft the release notes."));
}

#[tokio::test]
async fn test_simulated_remote_runs_without_credential() {
    let (orchestrator, store) = orchestrator();

    let workflow = Workflow::new("probe", json!({"nodes": [{"id": "n1"}]}));
    store.create_workflow(&workflow).await.expect("store workflow");

    let request = OrchestrationRequest::new("remote", &workflow.id)
        .with_inputs(inputs(json!({"prompt": "Check the runner wiring"})));
    let result = orchestrator.execute(&request).await.expect("run");

    assert_eq!(result.engine, "remote");
    assert_eq!(
        result.plan.artifacts["n1"].output.as_deref(),
        Some("sim-remote-n1-Check the runner wiring")
    );
}

#[tokio::test]
async fn test_seeded_graph_shape_runs_unchanged() {
    // Nodes written by the seed command carry agentId and label keys on
    // top of the id; engines must accept that shape as-is.
    let (orchestrator, store) = orchestrator();

    let agent_id = "6f2c1f4e-aaaa-bbbb-cccc-0123456789ab";
    let workflow = Workflow::new(
        "CI/CD Pipeline",
        json!({
            "nodes": [{"id": agent_id, "agentId": agent_id, "label": "Backend Developer"}],
            "edges": [],
        }),
    );
    store.create_workflow(&workflow).await.expect("store workflow");

    let request = OrchestrationRequest::new("fake", &workflow.id);
    let result = orchestrator.execute(&request).await.expect("run");

    assert_eq!(result.plan.executed_nodes, vec![agent_id]);
    assert_eq!(
        result.plan.artifacts[agent_id].output.as_deref(),
        Some(format!("fake-{agent_id}").as_str())
    );
}

#[tokio::test]
async fn test_unknown_workflow_is_not_found() {
    let (orchestrator, _store) = orchestrator();

    let request = OrchestrationRequest::new("fake", "no-such-id");
    let err = orchestrator.execute(&request).await.unwrap_err();
    match err {
        WeftError::WorkflowNotFound(id) => assert_eq!(id, "no-such-id"),
        other => panic!("expected WorkflowNotFound, got {other:?}"),
    }
}

#[tokio::test]
async fn test_simulate_error_aborts_the_run() {
    let (orchestrator, store) = orchestrator();

    let workflow = Workflow::new("gate", json!({"nodes": [{"id": "n1"}]}));
    store.create_workflow(&workflow).await.expect("store workflow");

    let request = OrchestrationRequest::new("fake", &workflow.id)
        .with_inputs(inputs(json!({"simulate_error": "deploy gate tripped"})));
    let err = orchestrator.execute(&request).await.unwrap_err();
    match err {
        WeftError::NodeExecution(msg) => assert_eq!(msg, "deploy gate tripped"),
        other => panic!("expected NodeExecution, got {other:?}"),
    }
}
