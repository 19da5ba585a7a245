//! In-memory fakes shared by this crate's unit tests.

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

use futures::future::BoxFuture;

use weft_core::error::{Result, WeftError};
use weft_core::model::{AgentDef, ChatMessage, Workflow};
use weft_core::traits::{AgentStore, ChatModel, WorkflowStore};

pub struct MemoryWorkflows {
    workflows: Mutex<HashMap<String, Workflow>>,
}

impl MemoryWorkflows {
    pub fn with(workflows: Vec<Workflow>) -> Self {
        let map = workflows.into_iter().map(|w| (w.id.clone(), w)).collect();
        Self {
            workflows: Mutex::new(map),
        }
    }
}

impl WorkflowStore for MemoryWorkflows {
    fn create_workflow(&self, workflow: &Workflow) -> BoxFuture<'_, Result<()>> {
        let workflow = workflow.clone();
        Box::pin(async move {
            self.workflows
                .lock()
                .unwrap()
                .insert(workflow.id.clone(), workflow);
            Ok(())
        })
    }

    fn get_workflow(&self, id: &str) -> BoxFuture<'_, Result<Option<Workflow>>> {
        let id = id.to_string();
        Box::pin(async move { Ok(self.workflows.lock().unwrap().get(&id).cloned()) })
    }

    fn list_workflows(&self) -> BoxFuture<'_, Result<Vec<Workflow>>> {
        Box::pin(async move {
            let mut all: Vec<Workflow> = self.workflows.lock().unwrap().values().cloned().collect();
            all.sort_by_key(|w| std::cmp::Reverse(w.created_at));
            Ok(all)
        })
    }
}

pub struct MemoryAgents {
    agents: Mutex<HashMap<String, AgentDef>>,
}

impl MemoryAgents {
    pub fn new() -> Self {
        Self::with(Vec::new())
    }

    pub fn with(agents: Vec<AgentDef>) -> Self {
        let map = agents.into_iter().map(|a| (a.id.clone(), a)).collect();
        Self {
            agents: Mutex::new(map),
        }
    }
}

impl AgentStore for MemoryAgents {
    fn create_agent(&self, agent: &AgentDef) -> BoxFuture<'_, Result<()>> {
        let agent = agent.clone();
        Box::pin(async move {
            self.agents.lock().unwrap().insert(agent.id.clone(), agent);
            Ok(())
        })
    }

    fn get_agent(&self, id: &str) -> BoxFuture<'_, Result<Option<AgentDef>>> {
        let id = id.to_string();
        Box::pin(async move { Ok(self.agents.lock().unwrap().get(&id).cloned()) })
    }

    fn list_agents(&self) -> BoxFuture<'_, Result<Vec<AgentDef>>> {
        Box::pin(async move {
            let mut all: Vec<AgentDef> = self.agents.lock().unwrap().values().cloned().collect();
            all.sort_by_key(|a| std::cmp::Reverse(a.created_at));
            Ok(all)
        })
    }
}

/// Chat model that replays scripted replies and records every message
/// list it was given.
pub struct ScriptedModel {
    replies: Mutex<VecDeque<Result<String>>>,
    seen: Mutex<Vec<Vec<ChatMessage>>>,
}

impl ScriptedModel {
    pub fn new(replies: Vec<&str>) -> Self {
        Self {
            replies: Mutex::new(replies.into_iter().map(|r| Ok(r.to_string())).collect()),
            seen: Mutex::new(Vec::new()),
        }
    }

    pub fn failing(message: &str) -> Self {
        Self {
            replies: Mutex::new(VecDeque::from([Err(WeftError::ChatRequest(
                message.to_string(),
            ))])),
            seen: Mutex::new(Vec::new()),
        }
    }

    pub fn seen(&self) -> Vec<Vec<ChatMessage>> {
        self.seen.lock().unwrap().clone()
    }
}

impl ChatModel for ScriptedModel {
    fn name(&self) -> &str {
        "scripted"
    }

    fn complete(&self, messages: Vec<ChatMessage>) -> BoxFuture<'_, Result<String>> {
        self.seen.lock().unwrap().push(messages);
        let next = self
            .replies
            .lock()
            .unwrap()
            .pop_front()
            .expect("model called more times than scripted");
        Box::pin(async move { next })
    }
}
