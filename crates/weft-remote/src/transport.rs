use std::time::Duration;

use futures::future::BoxFuture;
use reqwest::Client;
use serde_json::Value;

use weft_core::error::{Result, WeftError};

/// A reply that made it across the wire, whatever its HTTP status.
///
/// Status classification (retryable 5xx, fatal 4xx) happens in the
/// client's retry loop, not here.
#[derive(Debug, Clone)]
pub struct TransportReply {
    pub status: u16,
    /// Parsed body. `Null` when the body is not valid JSON.
    pub body: Value,
    /// Raw body text, kept for error messages.
    pub text: String,
}

impl TransportReply {
    pub fn json(status: u16, body: Value) -> Self {
        let text = body.to_string();
        Self { status, body, text }
    }
}

/// Transport seam for the remote client.
///
/// The production implementation speaks HTTP; tests substitute a
/// scripted fake. Errors out of here are already typed: `Timeout` for
/// an expired deadline, `Network` for everything below HTTP.
pub trait RemoteTransport: Send + Sync + 'static {
    fn post(&self, url: &str, payload: &Value) -> BoxFuture<'_, Result<TransportReply>>;
}

/// reqwest-backed transport with bearer auth and a per-call timeout.
pub struct HttpTransport {
    http: Client,
    credential: Option<String>,
    timeout: Duration,
}

impl HttpTransport {
    pub fn new(credential: Option<String>, timeout_secs: u64) -> Self {
        Self {
            http: Client::new(),
            credential,
            timeout: Duration::from_secs(timeout_secs),
        }
    }
}

impl RemoteTransport for HttpTransport {
    fn post(&self, url: &str, payload: &Value) -> BoxFuture<'_, Result<TransportReply>> {
        let url = url.to_string();
        let payload = payload.clone();

        Box::pin(async move {
            let mut req = self.http.post(&url).timeout(self.timeout).json(&payload);

            if let Some(credential) = &self.credential {
                req = req.header("Authorization", format!("Bearer {}", credential));
            }

            let response = req.send().await.map_err(|e| {
                if e.is_timeout() {
                    WeftError::Timeout(self.timeout.as_secs())
                } else {
                    WeftError::Network(e.to_string())
                }
            })?;

            let status = response.status().as_u16();
            let text = response
                .text()
                .await
                .map_err(|e| WeftError::Network(e.to_string()))?;
            let body = serde_json::from_str(&text).unwrap_or(Value::Null);

            Ok(TransportReply { status, body, text })
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_reply_json_keeps_text() {
        let reply = TransportReply::json(200, json!({"status": "ok"}));
        assert_eq!(reply.status, 200);
        assert_eq!(reply.body["status"], "ok");
        assert_eq!(reply.text, r#"{"status":"ok"}"#);
    }
}
