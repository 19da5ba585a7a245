pub mod chat;
pub mod fake;
pub mod remote;
pub mod simulated;

pub use chat::ChatEngine;
pub use fake::FakeEngine;
pub use remote::RemoteEngine;
pub use simulated::SimulatedEngine;

use serde_json::{Map, Value};

/// First 24 characters of the run's `prompt` input, if any.
///
/// Non-string prompts are carried through their JSON rendering so a
/// numeric or structured prompt still shows up in outputs.
pub(crate) fn prompt_snippet(inputs: &Map<String, Value>) -> Option<String> {
    let prompt = match inputs.get("prompt")? {
        Value::Null => return None,
        Value::String(s) => s.clone(),
        other => other.to_string(),
    };
    if prompt.is_empty() {
        return None;
    }
    Some(prompt.chars().take(24).collect())
}
