use chrono::{DateTime, Utc};
use futures::future::BoxFuture;
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;
use std::sync::Mutex;
use tracing::debug;

use weft_core::error::{Result, WeftError};
use weft_core::model::{AgentDef, Workflow};
use weft_core::traits::{AgentStore, WorkflowStore};

/// SQLite-backed store for workflows and agent personas.
///
/// The graph column holds the raw JSON document; validation happens
/// when an engine parses it, not on write.
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

const SCHEMA: &str = "CREATE TABLE IF NOT EXISTS workflows (
    id TEXT PRIMARY KEY,
    name TEXT NOT NULL,
    description TEXT,
    graph TEXT NOT NULL,
    created_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_workflows_created
    ON workflows(created_at DESC);

CREATE TABLE IF NOT EXISTS agents (
    id TEXT PRIMARY KEY,
    name TEXT NOT NULL,
    role TEXT,
    prompt TEXT NOT NULL,
    created_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_agents_created
    ON agents(created_at DESC);";

impl SqliteStore {
    /// Open or create a SQLite database at the given path.
    pub fn open(path: &Path) -> Result<Self> {
        // Create parent directories
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                WeftError::Database(format!("Failed to create db directory: {}", e))
            })?;
        }

        let conn = Connection::open(path).map_err(|e| WeftError::Database(e.to_string()))?;

        // Enable WAL mode for better concurrent performance
        conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA synchronous=NORMAL;")
            .map_err(|e| WeftError::Database(e.to_string()))?;

        conn.execute_batch(SCHEMA)
            .map_err(|e| WeftError::Database(e.to_string()))?;

        debug!(path = %path.display(), "SQLite store opened");
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Open an in-memory database (for testing).
    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().map_err(|e| WeftError::Database(e.to_string()))?;

        conn.execute_batch(SCHEMA)
            .map_err(|e| WeftError::Database(e.to_string()))?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }
}

fn map_workflow_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Workflow> {
    let graph_str: String = row.get(3)?;
    let ts_str: String = row.get(4)?;
    Ok(Workflow {
        id: row.get(0)?,
        name: row.get(1)?,
        description: row.get(2)?,
        graph: serde_json::from_str(&graph_str).unwrap_or_default(),
        created_at: parse_timestamp(&ts_str),
    })
}

fn map_agent_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<AgentDef> {
    let ts_str: String = row.get(4)?;
    Ok(AgentDef {
        id: row.get(0)?,
        name: row.get(1)?,
        role: row.get(2)?,
        prompt: row.get(3)?,
        created_at: parse_timestamp(&ts_str),
    })
}

fn parse_timestamp(s: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|_| Utc::now())
}

impl WorkflowStore for SqliteStore {
    fn create_workflow(&self, workflow: &Workflow) -> BoxFuture<'_, Result<()>> {
        let w = workflow.clone();

        Box::pin(async move {
            let graph = serde_json::to_string(&w.graph)?;
            let conn = self
                .conn
                .lock()
                .map_err(|e| WeftError::Database(e.to_string()))?;

            conn.execute(
                "INSERT INTO workflows (id, name, description, graph, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![w.id, w.name, w.description, graph, w.created_at.to_rfc3339()],
            )
            .map_err(|e| WeftError::Database(e.to_string()))?;

            Ok(())
        })
    }

    fn get_workflow(&self, id: &str) -> BoxFuture<'_, Result<Option<Workflow>>> {
        let id = id.to_string();

        Box::pin(async move {
            let conn = self
                .conn
                .lock()
                .map_err(|e| WeftError::Database(e.to_string()))?;

            conn.query_row(
                "SELECT id, name, description, graph, created_at
                 FROM workflows WHERE id = ?1",
                params![id],
                map_workflow_row,
            )
            .optional()
            .map_err(|e| WeftError::Database(e.to_string()))
        })
    }

    fn list_workflows(&self) -> BoxFuture<'_, Result<Vec<Workflow>>> {
        Box::pin(async move {
            let conn = self
                .conn
                .lock()
                .map_err(|e| WeftError::Database(e.to_string()))?;

            let mut stmt = conn
                .prepare(
                    "SELECT id, name, description, graph, created_at
                     FROM workflows ORDER BY created_at DESC, id",
                )
                .map_err(|e| WeftError::Database(e.to_string()))?;

            let rows = stmt
                .query_map([], map_workflow_row)
                .map_err(|e| WeftError::Database(e.to_string()))?;

            let mut workflows = Vec::new();
            for row in rows {
                workflows.push(row.map_err(|e| WeftError::Database(e.to_string()))?);
            }

            Ok(workflows)
        })
    }
}

impl AgentStore for SqliteStore {
    fn create_agent(&self, agent: &AgentDef) -> BoxFuture<'_, Result<()>> {
        let a = agent.clone();

        Box::pin(async move {
            let conn = self
                .conn
                .lock()
                .map_err(|e| WeftError::Database(e.to_string()))?;

            conn.execute(
                "INSERT INTO agents (id, name, role, prompt, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![a.id, a.name, a.role, a.prompt, a.created_at.to_rfc3339()],
            )
            .map_err(|e| WeftError::Database(e.to_string()))?;

            Ok(())
        })
    }

    fn get_agent(&self, id: &str) -> BoxFuture<'_, Result<Option<AgentDef>>> {
        let id = id.to_string();

        Box::pin(async move {
            let conn = self
                .conn
                .lock()
                .map_err(|e| WeftError::Database(e.to_string()))?;

            conn.query_row(
                "SELECT id, name, role, prompt, created_at FROM agents WHERE id = ?1",
                params![id],
                map_agent_row,
            )
            .optional()
            .map_err(|e| WeftError::Database(e.to_string()))
        })
    }

    fn list_agents(&self) -> BoxFuture<'_, Result<Vec<AgentDef>>> {
        Box::pin(async move {
            let conn = self
                .conn
                .lock()
                .map_err(|e| WeftError::Database(e.to_string()))?;

            let mut stmt = conn
                .prepare(
                    "SELECT id, name, role, prompt, created_at
                     FROM agents ORDER BY created_at DESC, id",
                )
                .map_err(|e| WeftError::Database(e.to_string()))?;

            let rows = stmt
                .query_map([], map_agent_row)
                .map_err(|e| WeftError::Database(e.to_string()))?;

            let mut agents = Vec::new();
            for row in rows {
                agents.push(row.map_err(|e| WeftError::Database(e.to_string()))?);
            }

            Ok(agents)
        })
    }
}
