use super::envelope::{PROTOCOL_VERSION, RpcResponse};
use super::error::ToolError;
use super::http::HttpTransport;
use super::stdio::StdioTransport;
use super::transport::ToolTransport;
use crate::config::ToolServerConfig;
use crate::domain::ToolDescriptor;
use serde_json::{Value, json};
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::debug;

/// One connected tool provider: a transport plus the handshake, discovery
/// and invocation protocol on top of it. A server whose process or channel
/// goes away is re-connected (handshake included) on the next use.
pub struct ToolServer {
    name: String,
    transport: Box<dyn ToolTransport>,
    catalog: Mutex<Vec<ToolDescriptor>>,
    ready: AtomicBool,
}

impl ToolServer {
    pub fn new(transport: Box<dyn ToolTransport>) -> Self {
        Self {
            name: transport.server_name().to_string(),
            transport,
            catalog: Mutex::new(Vec::new()),
            ready: AtomicBool::new(false),
        }
    }

    /// Build the server with the transport its configuration calls for.
    pub fn from_config(config: &ToolServerConfig) -> Self {
        match config {
            ToolServerConfig::Stdio(stdio) => {
                Self::new(Box::new(StdioTransport::new(stdio.clone())))
            }
            ToolServerConfig::Http(http) => Self::new(Box::new(HttpTransport::new(http.clone()))),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Connect the transport and perform the capability handshake.
    pub async fn connect(&self) -> Result<(), ToolError> {
        self.transport.connect().await?;
        let params = json!({
            "protocolVersion": PROTOCOL_VERSION,
            "clientInfo": {
                "name": env!("CARGO_PKG_NAME"),
                "version": env!("CARGO_PKG_VERSION"),
            },
            "capabilities": {}
        });
        let response = self.transport.send("initialize", params).await?;
        self.unwrap_result(response)?;
        self.ready.store(true, Ordering::SeqCst);
        debug!(server = %self.name, "tool server handshake complete");
        Ok(())
    }

    pub async fn disconnect(&self) {
        self.ready.store(false, Ordering::SeqCst);
        self.transport.disconnect().await;
        self.catalog.lock().expect("catalog lock").clear();
    }

    async fn ensure_connected(&self) -> Result<(), ToolError> {
        if self.ready.load(Ordering::SeqCst) {
            return Ok(());
        }
        self.connect().await
    }

    /// Send on the live channel, dropping readiness when the channel dies
    /// so the next use reconnects.
    async fn send(&self, method: &str, params: Value) -> Result<RpcResponse, ToolError> {
        match self.transport.send(method, params).await {
            Ok(response) => Ok(response),
            Err(err) => {
                if matches!(
                    err,
                    ToolError::Terminated { .. }
                        | ToolError::NotConnected { .. }
                        | ToolError::Transport { .. }
                ) {
                    self.ready.store(false, Ordering::SeqCst);
                }
                Err(err)
            }
        }
    }

    /// Fetch and normalize the provider's tool descriptors.
    pub async fn list_tools(&self) -> Result<Vec<ToolDescriptor>, ToolError> {
        self.ensure_connected().await?;
        let response = self.send("tools/list", json!({})).await?;
        let result = self.unwrap_result(response)?;

        let mut tools = Vec::new();
        if let Some(array) = result.get("tools").and_then(Value::as_array) {
            for raw in array {
                let Some(name) = raw.get("name").and_then(Value::as_str) else {
                    continue;
                };
                let mut tool = ToolDescriptor::new(name);
                if let Some(description) = raw.get("description").and_then(Value::as_str) {
                    tool = tool.with_description(description);
                }
                if let Some(schema) = raw.get("inputSchema") {
                    tool = tool.with_input_schema(schema.clone());
                }
                tools.push(tool);
            }
        }

        *self.catalog.lock().expect("catalog lock") = tools.clone();
        debug!(server = %self.name, tools = tools.len(), "refreshed tool catalog");
        Ok(tools)
    }

    /// Most recent catalog fetched by `list_tools`.
    pub fn cached_tool(&self, name: &str) -> Option<ToolDescriptor> {
        self.catalog
            .lock()
            .expect("catalog lock")
            .iter()
            .find(|tool| tool.name == name)
            .cloned()
    }

    pub async fn call_tool(&self, tool: &str, arguments: Value) -> Result<Value, ToolError> {
        self.ensure_connected().await?;
        let arguments = match arguments {
            Value::Null => Value::Object(Default::default()),
            other => other,
        };
        let response = self
            .send("tools/call", json!({ "name": tool, "arguments": arguments }))
            .await?;
        let result = self.unwrap_result(response)?;

        // Some providers report failures inside the result body rather than
        // the JSON-RPC error envelope.
        if let Some(error) = result.get("error").and_then(Value::as_object) {
            let message = error
                .get("message")
                .and_then(Value::as_str)
                .unwrap_or("unknown error")
                .to_string();
            let code = error.get("code").and_then(Value::as_i64).unwrap_or(-32000);
            return Err(ToolError::Execution {
                server: self.name.clone(),
                code,
                message,
            });
        }

        Ok(result)
    }

    fn unwrap_result(&self, response: RpcResponse) -> Result<Value, ToolError> {
        if let Some(error) = response.error {
            return Err(ToolError::Execution {
                server: self.name.clone(),
                code: error.code,
                message: error.message,
            });
        }
        Ok(response.result.unwrap_or(Value::Null))
    }
}
