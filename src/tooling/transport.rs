use super::envelope::RpcResponse;
use super::error::ToolError;
use async_trait::async_trait;
use serde_json::Value;

/// Raw request/response channel to one external tool provider. The transport
/// owns request-id allocation; callers see only method/params in and a
/// response envelope out.
#[async_trait]
pub trait ToolTransport: Send + Sync {
    /// Server name used for error and log context.
    fn server_name(&self) -> &str;

    async fn connect(&self) -> Result<(), ToolError>;

    async fn disconnect(&self);

    /// Issue one request and wait for its response envelope.
    async fn send(&self, method: &str, params: Value) -> Result<RpcResponse, ToolError>;
}
