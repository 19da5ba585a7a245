pub mod engine;
pub mod engines;
pub mod orchestrator;
pub mod registry;

#[cfg(test)]
pub(crate) mod testing;

pub use engine::{Engine, EngineRun};
pub use engines::{ChatEngine, FakeEngine, RemoteEngine, SimulatedEngine};
pub use orchestrator::Orchestrator;
pub use registry::EngineRegistry;
