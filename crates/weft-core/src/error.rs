use thiserror::Error;

#[derive(Debug, Error)]
pub enum WeftError {
    // Workflow errors
    #[error("Invalid workflow: {0}")]
    InvalidWorkflow(String),

    #[error("Workflow not found: {0}")]
    WorkflowNotFound(String),

    #[error("Node execution failed: {0}")]
    NodeExecution(String),

    // Engine dispatch errors
    #[error("Engine not supported: {0}")]
    UnsupportedEngine(String),

    #[error("Engine disabled: {0}")]
    FeatureDisabled(String),

    #[error("Agent not found: {0}")]
    MissingAgent(String),

    // Remote transport errors (retryable inside the client, typed for callers)
    #[error("Remote call timed out after {0}s")]
    Timeout(u64),

    #[error("Remote server error: HTTP {status}: {body}")]
    Server { status: u16, body: String },

    #[error("Remote connection failed: {0}")]
    Network(String),

    #[error("Remote call rejected: HTTP {status}: {body}")]
    Rejected { status: u16, body: String },

    #[error("Remote runner reported failure: {0}")]
    RemoteReported(String),

    // Chat model errors
    #[error("Chat request failed: {0}")]
    ChatRequest(String),

    #[error("Chat provider not supported: {0}")]
    UnsupportedProvider(String),

    // Config errors
    #[error("Config error: {0}")]
    Config(String),

    #[error("Config file not found: {0}")]
    ConfigNotFound(String),

    // Storage errors
    #[error("Database error: {0}")]
    Database(String),

    // I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    // JSON errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl WeftError {
    /// Transport failures the remote client is allowed to retry.
    /// A 4xx rejection is final: the request itself is wrong.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            WeftError::Timeout(_) | WeftError::Server { .. } | WeftError::Network(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, WeftError>;
