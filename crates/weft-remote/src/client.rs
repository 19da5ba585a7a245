use std::sync::Arc;
use std::time::Duration;

use futures::future::BoxFuture;
use serde_json::{json, Value};
use tracing::{debug, warn};

use weft_core::config::RemoteConfig;
use weft_core::error::{Result, WeftError};
use weft_core::model::{ChatMessage, WorkflowEdge};

use crate::normalize::{normalize, RemoteResponse};
use crate::transport::{HttpTransport, RemoteTransport, TransportReply};

const SYSTEM_PROMPT: &str = "You execute one workflow step and return its output as plain text.";

/// Delay hook used between retry attempts. Production sleeps; tests record.
pub type DelayFn = Arc<dyn Fn(Duration) -> BoxFuture<'static, ()> + Send + Sync>;

/// Per-call context forwarded to the runner as metadata.
#[derive(Debug, Clone)]
pub struct CallContext<'a> {
    pub node_id: &'a str,
    pub params: &'a serde_json::Map<String, Value>,
    pub workflow_id: &'a str,
    pub workflow_name: &'a str,
    /// Node count of the workflow being executed.
    pub workflow_size: usize,
    pub edges: &'a [WorkflowEdge],
    pub inputs: &'a serde_json::Map<String, Value>,
}

/// Outcome of a single transport attempt.
enum Attempt {
    Success(TransportReply),
    Retryable(WeftError),
    Fatal(WeftError),
}

/// Client for the remote runner service.
///
/// One `call` makes up to `max_retries + 1` attempts. HTTP 5xx,
/// timeouts, and connection failures are retried with linear backoff
/// (`backoff_ms * n` before retry n); any 4xx fails immediately. When
/// every attempt fails, the last transport error propagates unmodified
/// so callers can tell infrastructure failure from a runner-reported
/// one by type.
pub struct RemoteClient {
    config: RemoteConfig,
    transport: Arc<dyn RemoteTransport>,
    delay: DelayFn,
}

impl RemoteClient {
    /// HTTP-backed client with real sleeps between retries.
    pub fn new(config: RemoteConfig) -> Self {
        let transport = Arc::new(HttpTransport::new(
            config.credential().map(str::to_string),
            config.timeout_secs,
        ));
        Self::with_transport(config, transport)
    }

    /// Client over a custom transport (tests script one).
    pub fn with_transport(config: RemoteConfig, transport: Arc<dyn RemoteTransport>) -> Self {
        Self {
            config,
            transport,
            delay: Arc::new(|d| -> BoxFuture<'static, ()> { Box::pin(tokio::time::sleep(d)) }),
        }
    }

    /// Replace the inter-retry delay (tests record instead of sleeping).
    pub fn with_delay(mut self, delay: DelayFn) -> Self {
        self.delay = delay;
        self
    }

    /// Execute one node on the runner service.
    pub async fn call(&self, prompt: &str, ctx: &CallContext<'_>) -> Result<RemoteResponse> {
        let url = self.url();
        let payload = self.build_payload(prompt, ctx);
        let mut last_err: Option<WeftError> = None;

        for attempt in 0..=self.config.max_retries {
            if attempt > 0 {
                let backoff = Duration::from_millis(self.config.backoff_ms * attempt as u64);
                warn!(
                    attempt,
                    max_retries = self.config.max_retries,
                    backoff_ms = backoff.as_millis() as u64,
                    node = ctx.node_id,
                    "Retrying runner call"
                );
                (self.delay)(backoff).await;
            }

            match self.attempt(&url, &payload).await {
                Attempt::Success(reply) => {
                    let resp = normalize(&reply.body);
                    if resp.status != "ok" {
                        let message = resp
                            .error
                            .unwrap_or_else(|| "runner_error".to_string());
                        return Err(WeftError::RemoteReported(message));
                    }
                    debug!(node = ctx.node_id, "Runner call succeeded");
                    return Ok(resp);
                }
                Attempt::Retryable(e) => {
                    last_err = Some(e);
                }
                Attempt::Fatal(e) => return Err(e),
            }
        }

        Err(last_err.unwrap_or_else(|| WeftError::Network("runner unreachable".to_string())))
    }

    async fn attempt(&self, url: &str, payload: &Value) -> Attempt {
        match self.transport.post(url, payload).await {
            Ok(reply) if reply.status >= 500 => Attempt::Retryable(WeftError::Server {
                status: reply.status,
                body: snippet(&reply.text),
            }),
            Ok(reply) if reply.status >= 400 => Attempt::Fatal(WeftError::Rejected {
                status: reply.status,
                body: snippet(&reply.text),
            }),
            Ok(reply) => Attempt::Success(reply),
            Err(e) if e.is_retryable() => Attempt::Retryable(e),
            Err(e) => Attempt::Fatal(e),
        }
    }

    fn url(&self) -> String {
        let base = self.config.base_url.trim_end_matches('/');
        if self.config.call_path.starts_with('/') {
            format!("{}{}", base, self.config.call_path)
        } else {
            format!("{}/{}", base, self.config.call_path)
        }
    }

    fn build_payload(&self, prompt: &str, ctx: &CallContext<'_>) -> Value {
        let messages = vec![ChatMessage::system(SYSTEM_PROMPT), ChatMessage::user(prompt)];
        json!({
            "model": self.config.model,
            "messages": messages,
            "parameters": ctx.params,
            "metadata": {
                "node": ctx.node_id,
                "flow": {
                    "id": ctx.workflow_id,
                    "name": ctx.workflow_name,
                    "size": ctx.workflow_size,
                },
                "extras": { "edges": ctx.edges },
            },
            "context": ctx.inputs,
        })
    }
}

fn snippet(text: &str) -> String {
    text.chars().take(200).collect()
}
