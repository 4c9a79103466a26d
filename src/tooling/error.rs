use thiserror::Error;

#[derive(Debug, Error)]
pub enum ToolError {
    #[error("failed to spawn tool server '{server}': {source}")]
    Spawn {
        server: String,
        #[source]
        source: std::io::Error,
    },
    #[error("tool server '{server}' transport error: {message}")]
    Transport { server: String, message: String },
    #[error("tool server '{server}' returned invalid JSON: {source}")]
    InvalidJson {
        server: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("tool server '{server}' request failed: {source}")]
    Http {
        server: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("tool server '{server}' returned error {code}: {message}")]
    Execution {
        server: String,
        code: i64,
        message: String,
    },
    #[error("tool server '{server}' terminated unexpectedly")]
    Terminated { server: String },
    #[error("tool server '{server}' is not connected")]
    NotConnected { server: String },
    #[error("tool server '{server}' is already registered")]
    DuplicateServer { server: String },
    #[error("no registered server exposes tool '{tool}'")]
    UnknownTool { tool: String },
    #[error("tool '{tool}' call missing required parameters: {}", .missing.join(", "))]
    MissingParameters { tool: String, missing: Vec<String> },
}
