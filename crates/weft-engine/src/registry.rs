use std::collections::HashMap;
use std::sync::Arc;

use tracing::debug;

use weft_core::config::{EngineMode, EnginesConfig};
use weft_core::error::{Result, WeftError};
use weft_core::traits::{AgentStore, ChatModel};
use weft_remote::RemoteClient;

use crate::engine::Engine;
use crate::engines::{ChatEngine, FakeEngine, RemoteEngine, SimulatedEngine};

type EngineFactory = Box<dyn Fn() -> Result<Box<dyn Engine>> + Send + Sync>;

/// Explicit name-to-factory table, built once at startup.
///
/// Each resolve constructs a fresh engine instance, so concurrent runs
/// share nothing mutable. Precondition checks (a live remote adapter
/// needs a credential) happen inside the factory, before any variant
/// is constructed.
pub struct EngineRegistry {
    factories: HashMap<String, EngineFactory>,
}

impl EngineRegistry {
    pub fn from_config(
        engines: &EnginesConfig,
        agents: Arc<dyn AgentStore>,
        model: Arc<dyn ChatModel>,
    ) -> Self {
        let mut factories: HashMap<String, EngineFactory> = HashMap::new();

        factories.insert(
            "fake".to_string(),
            Box::new(|| Ok(Box::new(FakeEngine::new()) as Box<dyn Engine>)),
        );

        let remote = engines.remote.clone();
        factories.insert(
            "remote".to_string(),
            Box::new(move || match remote.mode {
                EngineMode::Simulate => {
                    Ok(Box::new(SimulatedEngine::new("remote")) as Box<dyn Engine>)
                }
                EngineMode::Live => {
                    if remote.credential().is_none() {
                        return Err(WeftError::FeatureDisabled(
                            "remote live mode requires a credential".to_string(),
                        ));
                    }
                    let client = RemoteClient::new(remote.clone());
                    Ok(Box::new(RemoteEngine::new(client)) as Box<dyn Engine>)
                }
            }),
        );

        factories.insert(
            "chat".to_string(),
            Box::new(move || {
                Ok(Box::new(ChatEngine::new(agents.clone(), model.clone())) as Box<dyn Engine>)
            }),
        );

        Self { factories }
    }

    /// Resolve an engine by name. Matching is case-insensitive.
    pub fn resolve(&self, name: &str) -> Result<Box<dyn Engine>> {
        let key = name.trim().to_lowercase();
        match self.factories.get(&key) {
            Some(factory) => {
                debug!(engine = %key, "Engine resolved");
                factory()
            }
            None => Err(WeftError::UnsupportedEngine(name.to_string())),
        }
    }

    /// Registered engine names, sorted.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.factories.keys().cloned().collect();
        names.sort();
        names
    }
}
