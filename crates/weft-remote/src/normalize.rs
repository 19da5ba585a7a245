use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Token accounting passed through when the runner reports it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenUsage {
    #[serde(default)]
    pub prompt_tokens: u64,
    #[serde(default)]
    pub completion_tokens: u64,
}

/// The runner's reply, reduced to one canonical shape.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoteResponse {
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub usage: Option<TokenUsage>,
}

type Matcher = fn(&Value) -> Option<RemoteResponse>;

/// Matchers in priority order. A body carrying both `results` and
/// `status` takes its output from `results[0]`.
const MATCHERS: &[Matcher] = &[match_results, match_choices, match_direct];

/// Reduce whatever the runner sent to the canonical response shape.
/// Bodies no matcher recognizes become an `unknown_response_shape` error.
pub fn normalize(body: &Value) -> RemoteResponse {
    for matcher in MATCHERS {
        if let Some(resp) = matcher(body) {
            return resp;
        }
    }
    RemoteResponse {
        status: "error".to_string(),
        output: None,
        error: Some("unknown_response_shape".to_string()),
        usage: None,
    }
}

/// `{status, results: [{content|text}], usage?}`
fn match_results(body: &Value) -> Option<RemoteResponse> {
    let results = body.get("results")?.as_array()?;
    let output = results.first().and_then(|r| {
        r.get("content")
            .and_then(Value::as_str)
            .or_else(|| r.get("text").and_then(Value::as_str))
            .map(str::to_string)
    });
    Some(RemoteResponse {
        status: status_of(body, "ok"),
        output,
        error: body.get("error").and_then(error_message),
        usage: usage_of(body),
    })
}

/// `{choices: [{message: {content}} | {text}]}`
fn match_choices(body: &Value) -> Option<RemoteResponse> {
    let choices = body.get("choices")?.as_array()?;
    let first = choices.first()?;
    let output = first
        .pointer("/message/content")
        .and_then(Value::as_str)
        .or_else(|| first.get("text").and_then(Value::as_str))
        .map(str::to_string)?;
    Some(RemoteResponse {
        status: "ok".to_string(),
        output: Some(output),
        error: None,
        usage: usage_of(body),
    })
}

/// `{status, output, error}` with at least one of the keys present.
fn match_direct(body: &Value) -> Option<RemoteResponse> {
    let obj = body.as_object()?;
    if !obj.contains_key("status") && !obj.contains_key("output") && !obj.contains_key("error") {
        return None;
    }

    let error = obj.get("error").and_then(error_message);
    let default_status = if error.is_some() { "error" } else { "ok" };
    Some(RemoteResponse {
        status: status_of(body, default_status),
        output: obj.get("output").and_then(string_or_json),
        error,
        usage: usage_of(body),
    })
}

fn status_of(body: &Value, default: &str) -> String {
    body.get("status")
        .and_then(Value::as_str)
        .unwrap_or(default)
        .to_string()
}

fn usage_of(body: &Value) -> Option<TokenUsage> {
    body.get("usage")
        .and_then(|u| serde_json::from_value(u.clone()).ok())
}

/// An error field may be a plain string or a `{message}` object.
fn error_message(error: &Value) -> Option<String> {
    match error {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        Value::Object(map) => map
            .get("message")
            .and_then(Value::as_str)
            .map(str::to_string)
            .or_else(|| Some(error.to_string())),
        other => Some(other.to_string()),
    }
}

fn string_or_json(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}
