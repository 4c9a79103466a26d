use super::envelope::{RpcRequest, RpcResponse};
use super::error::ToolError;
use super::transport::ToolTransport;
use crate::config::HttpServerConfig;
use async_trait::async_trait;
use serde_json::Value;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::debug;

/// Remote transport: one POST per call against a configured base URL.
/// Stateless and safe for concurrent calls; only the request id counter is
/// shared per instance.
pub struct HttpTransport {
    config: HttpServerConfig,
    client: reqwest::Client,
    next_id: AtomicU64,
}

impl HttpTransport {
    pub fn new(config: HttpServerConfig) -> Self {
        Self {
            config,
            client: reqwest::Client::new(),
            next_id: AtomicU64::new(1),
        }
    }
}

#[async_trait]
impl ToolTransport for HttpTransport {
    fn server_name(&self) -> &str {
        &self.config.name
    }

    async fn connect(&self) -> Result<(), ToolError> {
        debug!(server = %self.config.name, url = %self.config.url, "using remote tool server");
        Ok(())
    }

    async fn disconnect(&self) {}

    async fn send(&self, method: &str, params: Value) -> Result<RpcResponse, ToolError> {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let request = RpcRequest::new(id, method, params);

        let response = self
            .client
            .post(&self.config.url)
            .json(&request)
            .send()
            .await
            .and_then(|response| response.error_for_status())
            .map_err(|source| ToolError::Http {
                server: self.config.name.clone(),
                source,
            })?;

        response
            .json::<RpcResponse>()
            .await
            .map_err(|source| ToolError::Http {
                server: self.config.name.clone(),
                source,
            })
    }
}
