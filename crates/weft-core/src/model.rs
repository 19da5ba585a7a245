use std::collections::{BTreeMap, HashSet};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::error::{Result, WeftError};

/// A stored workflow: a named node graph plus bookkeeping.
///
/// The graph is kept as raw JSON; the store is schema-agnostic and
/// validation happens when an engine parses it into a [`WorkflowGraph`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Workflow {
    /// Unique identifier.
    pub id: String,
    /// Human-readable name.
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Raw graph document (`{"nodes": [...], "edges": [...]}`).
    pub graph: Value,
    pub created_at: DateTime<Utc>,
}

impl Workflow {
    /// Create a new workflow with a minted id.
    pub fn new(name: impl Into<String>, graph: Value) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            name: name.into(),
            description: None,
            graph,
            created_at: Utc::now(),
        }
    }

    /// Set the description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Parse and validate this workflow's graph.
    pub fn parse_graph(&self) -> Result<WorkflowGraph> {
        WorkflowGraph::parse(&self.graph)
    }
}

/// A validated workflow graph.
///
/// Nodes are kept in declaration order; execution follows that order.
/// Edges are structural metadata carried through to adapters but never
/// consulted for ordering.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WorkflowGraph {
    #[serde(default)]
    pub nodes: Vec<WorkflowNode>,
    #[serde(default)]
    pub edges: Vec<WorkflowEdge>,
}

impl WorkflowGraph {
    /// Validate a raw graph document.
    ///
    /// A missing or null graph (or a missing `nodes` key) is an empty
    /// graph, not an error. Anything else malformed is `InvalidWorkflow`:
    /// a non-array `nodes`, a node without an id, or a duplicate node id.
    pub fn parse(graph: &Value) -> Result<Self> {
        let obj = match graph {
            Value::Null => return Ok(Self::default()),
            Value::Object(map) => map,
            _ => {
                return Err(WeftError::InvalidWorkflow(
                    "graph must be an object".to_string(),
                ))
            }
        };

        let nodes = match obj.get("nodes") {
            None | Some(Value::Null) => Vec::new(),
            Some(Value::Array(items)) => {
                let mut nodes: Vec<WorkflowNode> = Vec::with_capacity(items.len());
                let mut seen: HashSet<&str> = HashSet::new();
                for (idx, item) in items.iter().enumerate() {
                    let node: WorkflowNode = serde_json::from_value(item.clone())
                        .map_err(|e| WeftError::InvalidWorkflow(format!("node {}: {}", idx, e)))?;
                    if node.id.is_empty() {
                        return Err(WeftError::InvalidWorkflow(format!(
                            "node {} has an empty id",
                            idx
                        )));
                    }
                    nodes.push(node);
                }
                for node in &nodes {
                    if !seen.insert(node.id.as_str()) {
                        return Err(WeftError::InvalidWorkflow(format!(
                            "duplicate node id: {}",
                            node.id
                        )));
                    }
                }
                nodes
            }
            Some(_) => {
                return Err(WeftError::InvalidWorkflow(
                    "nodes must be an array".to_string(),
                ))
            }
        };

        let edges = match obj.get("edges") {
            None | Some(Value::Null) => Vec::new(),
            Some(value) => serde_json::from_value(value.clone())
                .map_err(|e| WeftError::InvalidWorkflow(format!("edges: {}", e)))?,
        };

        Ok(Self { nodes, edges })
    }
}

/// One step in a workflow.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkflowNode {
    /// Unique within the workflow.
    pub id: String,
    /// Optional reference to a stored agent persona.
    #[serde(rename = "agentId", default, skip_serializing_if = "Option::is_none")]
    pub agent_id: Option<String>,
    /// Free-form per-node parameters, forwarded to adapters.
    #[serde(default, skip_serializing_if = "serde_json::Map::is_empty")]
    pub params: serde_json::Map<String, Value>,
}

impl WorkflowNode {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            agent_id: None,
            params: serde_json::Map::new(),
        }
    }

    pub fn with_agent(mut self, agent_id: impl Into<String>) -> Self {
        self.agent_id = Some(agent_id.into());
        self
    }
}

/// A declared connection between two nodes. Metadata only.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkflowEdge {
    pub from: String,
    pub to: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

/// A stored agent persona referenced by workflow nodes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentDef {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    pub prompt: String,
    pub created_at: DateTime<Utc>,
}

impl AgentDef {
    pub fn new(name: impl Into<String>, prompt: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            name: name.into(),
            role: None,
            prompt: prompt.into(),
            created_at: Utc::now(),
        }
    }

    pub fn with_role(mut self, role: impl Into<String>) -> Self {
        self.role = Some(role.into());
        self
    }
}

/// One orchestration call: which engine, which workflow, with what inputs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrchestrationRequest {
    pub engine: String,
    pub workflow_id: String,
    #[serde(default)]
    pub inputs: serde_json::Map<String, Value>,
}

impl OrchestrationRequest {
    pub fn new(engine: impl Into<String>, workflow_id: impl Into<String>) -> Self {
        Self {
            engine: engine.into(),
            workflow_id: workflow_id.into(),
            inputs: serde_json::Map::new(),
        }
    }

    pub fn with_inputs(mut self, inputs: serde_json::Map<String, Value>) -> Self {
        self.inputs = inputs;
        self
    }
}

/// Outcome status of a single node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArtifactStatus {
    Ok,
    Error,
}

/// The recorded outcome of executing one node. Immutable once produced.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrchestrationArtifact {
    pub status: ArtifactStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl OrchestrationArtifact {
    pub fn ok(output: impl Into<String>) -> Self {
        Self {
            status: ArtifactStatus::Ok,
            output: Some(output.into()),
            error: None,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            status: ArtifactStatus::Error,
            output: None,
            error: Some(message.into()),
        }
    }
}

/// Routing strategy tag carried on every plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Routing {
    Sequential,
}

/// The aggregate record of which nodes ran and what each produced.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrchestrationPlan {
    /// Node ids in the order they were actually processed.
    pub executed_nodes: Vec<String>,
    /// One artifact per executed node.
    pub artifacts: BTreeMap<String, OrchestrationArtifact>,
    pub routing: Routing,
}

impl OrchestrationPlan {
    pub fn new() -> Self {
        Self {
            executed_nodes: Vec::new(),
            artifacts: BTreeMap::new(),
            routing: Routing::Sequential,
        }
    }

    /// Record a node outcome.
    ///
    /// The artifact is stored before the id is appended, so
    /// `executed_nodes` never references a missing artifact.
    pub fn record(&mut self, node_id: &str, artifact: OrchestrationArtifact) {
        self.artifacts.insert(node_id.to_string(), artifact);
        self.executed_nodes.push(node_id.to_string());
    }
}

impl Default for OrchestrationPlan {
    fn default() -> Self {
        Self::new()
    }
}

/// The complete result of one orchestration run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrchestrationResult {
    pub engine: String,
    pub workflow_id: String,
    pub plan: OrchestrationPlan,
    pub logs: Vec<LogEntry>,
    pub duration_ms: u64,
    pub correlation_id: String,
}

/// A structured log line attached to an orchestration result.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogEntry {
    /// RFC 3339 UTC timestamp.
    pub timestamp: String,
    pub level: String,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub node: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub engine: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub workflow_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub correlation_id: Option<String>,
}

impl LogEntry {
    pub fn info(message: impl Into<String>) -> Self {
        Self::with_level("info", message)
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::with_level("error", message)
    }

    fn with_level(level: &str, message: impl Into<String>) -> Self {
        Self {
            timestamp: Utc::now().to_rfc3339(),
            level: level.to_string(),
            message: message.into(),
            node: None,
            detail: None,
            engine: None,
            workflow_id: None,
            correlation_id: None,
        }
    }

    pub fn with_node(mut self, node: impl Into<String>) -> Self {
        self.node = Some(node.into());
        self
    }

    pub fn with_detail(mut self, detail: Value) -> Self {
        self.detail = Some(detail);
        self
    }
}

/// A log emitted by an engine before the coordinator enriches it.
///
/// Engines may emit plain text lines or already-structured entries;
/// the coordinator normalizes both into [`LogEntry`] values stamped
/// with the run's correlation id.
#[derive(Debug, Clone)]
pub enum EngineLog {
    Text(String),
    Entry(LogEntry),
}

impl EngineLog {
    pub fn text(message: impl Into<String>) -> Self {
        Self::Text(message.into())
    }
}

/// Role in a chat exchange.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

/// A single chat message sent to a chat model or remote runner.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_graph_ordered_nodes() {
        let graph = json!({
            "nodes": [{"id": "n1"}, {"id": "n2", "agentId": "a1"}, {"id": "n3"}],
            "edges": [{"from": "n1", "to": "n2", "label": "then"}],
        });
        let parsed = WorkflowGraph::parse(&graph).unwrap();
        let ids: Vec<&str> = parsed.nodes.iter().map(|n| n.id.as_str()).collect();
        assert_eq!(ids, vec!["n1", "n2", "n3"]);
        assert_eq!(parsed.nodes[1].agent_id.as_deref(), Some("a1"));
        assert_eq!(parsed.edges.len(), 1);
        assert_eq!(parsed.edges[0].label.as_deref(), Some("then"));
    }

    #[test]
    fn test_parse_graph_missing_nodes_is_empty() {
        let parsed = WorkflowGraph::parse(&json!({})).unwrap();
        assert!(parsed.nodes.is_empty());
        assert!(parsed.edges.is_empty());

        let parsed = WorkflowGraph::parse(&Value::Null).unwrap();
        assert!(parsed.nodes.is_empty());
    }

    #[test]
    fn test_parse_graph_nodes_not_array() {
        let err = WorkflowGraph::parse(&json!({"nodes": "n1"})).unwrap_err();
        match err {
            WeftError::InvalidWorkflow(msg) => assert!(msg.contains("array")),
            other => panic!("expected InvalidWorkflow, got {other:?}"),
        }
    }

    #[test]
    fn test_parse_graph_node_without_id() {
        let err = WorkflowGraph::parse(&json!({"nodes": [{"agentId": "a1"}]})).unwrap_err();
        assert!(matches!(err, WeftError::InvalidWorkflow(_)));
    }

    #[test]
    fn test_parse_graph_duplicate_node_id() {
        let err =
            WorkflowGraph::parse(&json!({"nodes": [{"id": "n1"}, {"id": "n1"}]})).unwrap_err();
        match err {
            WeftError::InvalidWorkflow(msg) => assert!(msg.contains("duplicate")),
            other => panic!("expected InvalidWorkflow, got {other:?}"),
        }
    }

    #[test]
    fn test_plan_record_keeps_sets_equal() {
        let mut plan = OrchestrationPlan::new();
        plan.record("n1", OrchestrationArtifact::ok("out-1"));
        plan.record("n2", OrchestrationArtifact::ok("out-2"));

        assert_eq!(plan.executed_nodes, vec!["n1", "n2"]);
        assert_eq!(plan.artifacts.len(), 2);
        for id in &plan.executed_nodes {
            assert!(plan.artifacts.contains_key(id));
        }
    }

    #[test]
    fn test_plan_serializes_routing_tag() {
        let plan = OrchestrationPlan::new();
        let json = serde_json::to_value(&plan).unwrap();
        assert_eq!(json["routing"], "sequential");
        assert_eq!(json["executed_nodes"], json!([]));
    }

    #[test]
    fn test_artifact_status_wire_format() {
        let json = serde_json::to_value(OrchestrationArtifact::ok("done")).unwrap();
        assert_eq!(json["status"], "ok");
        assert_eq!(json["output"], "done");
        assert!(json.get("error").is_none());

        let json = serde_json::to_value(OrchestrationArtifact::error("boom")).unwrap();
        assert_eq!(json["status"], "error");
        assert_eq!(json["error"], "boom");
    }

    #[test]
    fn test_log_entry_skips_empty_fields() {
        let entry = LogEntry::info("Run started");
        let json = serde_json::to_string(&entry).unwrap();
        assert!(json.contains("Run started"));
        assert!(!json.contains("\"node\""));
        assert!(!json.contains("\"detail\""));
        assert!(!json.contains("correlation_id"));

        let entry = LogEntry::info("Node done")
            .with_node("n1")
            .with_detail(json!({"output_preview": "fake-n1"}));
        let json = serde_json::to_string(&entry).unwrap();
        assert!(json.contains("\"node\":\"n1\""));
        assert!(json.contains("output_preview"));
    }

    #[test]
    fn test_request_deserializes_without_inputs() {
        let req: OrchestrationRequest =
            serde_json::from_value(json!({"engine": "fake", "workflow_id": "wf-1"})).unwrap();
        assert_eq!(req.engine, "fake");
        assert!(req.inputs.is_empty());
    }
}
