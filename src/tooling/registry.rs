use super::error::ToolError;
use super::server::ToolServer;
use crate::domain::ToolDescriptor;
use serde_json::Value;
use std::sync::{Arc, Mutex};
use tracing::{debug, info};

/// Aggregates the connected tool servers behind one catalog. Owned
/// explicitly by the hosting process; `shutdown` releases every provider
/// handle. The registry never retries a failing server — failures surface
/// to the controller, which folds them into the task's retry accounting.
#[derive(Default)]
pub struct ToolRegistry {
    // Registration order is lookup order.
    servers: Mutex<Vec<Arc<ToolServer>>>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&self, server: ToolServer) -> Result<(), ToolError> {
        let mut servers = self.servers.lock().expect("registry lock");
        if servers.iter().any(|known| known.name() == server.name()) {
            return Err(ToolError::DuplicateServer {
                server: server.name().to_string(),
            });
        }
        info!(server = %server.name(), "registered tool server");
        servers.push(Arc::new(server));
        Ok(())
    }

    pub fn unregister(&self, name: &str) -> Option<Arc<ToolServer>> {
        let mut servers = self.servers.lock().expect("registry lock");
        let position = servers.iter().position(|known| known.name() == name)?;
        info!(server = name, "unregistered tool server");
        Some(servers.remove(position))
    }

    pub fn servers(&self) -> Vec<Arc<ToolServer>> {
        self.servers.lock().expect("registry lock").clone()
    }

    /// Union of every server's live catalog, in registration order.
    /// Sequential fan-out: correctness does not require concurrency here.
    pub async fn discover_tools(&self) -> Result<Vec<ToolDescriptor>, ToolError> {
        let mut catalog = Vec::new();
        for server in self.servers() {
            let tools = server.list_tools().await?;
            catalog.extend(tools);
        }
        debug!(tools = catalog.len(), "discovered tool catalog");
        Ok(catalog)
    }

    /// First registered server whose last-fetched catalog carries the tool.
    pub fn find_tool(&self, name: &str) -> Option<(Arc<ToolServer>, ToolDescriptor)> {
        self.servers()
            .into_iter()
            .find_map(|server| server.cached_tool(name).map(|tool| (server, tool)))
    }

    /// Structural check: every schema-declared required field must be
    /// present in the supplied parameters. Not a full schema validator.
    pub fn validate(tool: &ToolDescriptor, params: &Value) -> Result<(), ToolError> {
        let required = tool.required_params();
        if required.is_empty() {
            return Ok(());
        }
        let supplied = params.as_object();
        let missing: Vec<String> = required
            .into_iter()
            .filter(|name| !supplied.is_some_and(|map| map.contains_key(*name)))
            .map(String::from)
            .collect();
        if missing.is_empty() {
            Ok(())
        } else {
            Err(ToolError::MissingParameters {
                tool: tool.name.clone(),
                missing,
            })
        }
    }

    pub async fn call_tool(&self, name: &str, params: Value) -> Result<Value, ToolError> {
        let Some((server, _)) = self.find_tool(name) else {
            return Err(ToolError::UnknownTool {
                tool: name.to_string(),
            });
        };
        debug!(server = %server.name(), tool = name, "dispatching tool call");
        server.call_tool(name, params).await
    }

    /// Disconnect and release every registered provider.
    pub async fn shutdown(&self) {
        let drained: Vec<Arc<ToolServer>> = {
            let mut servers = self.servers.lock().expect("registry lock");
            servers.drain(..).collect()
        };
        for server in drained {
            server.disconnect().await;
        }
        info!("tool registry shut down");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tooling::envelope::RpcResponse;
    use crate::tooling::transport::ToolTransport;
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::Mutex as StdMutex;

    struct CatalogTransport {
        name: String,
        tools: Vec<Value>,
        calls: Arc<StdMutex<Vec<String>>>,
    }

    impl CatalogTransport {
        fn new(name: &str, tools: Vec<Value>) -> Self {
            Self {
                name: name.to_string(),
                tools,
                calls: Arc::new(StdMutex::new(Vec::new())),
            }
        }
    }

    #[async_trait]
    impl ToolTransport for CatalogTransport {
        fn server_name(&self) -> &str {
            &self.name
        }

        async fn connect(&self) -> Result<(), ToolError> {
            Ok(())
        }

        async fn disconnect(&self) {}

        async fn send(&self, method: &str, _params: Value) -> Result<RpcResponse, ToolError> {
            self.calls.lock().expect("calls lock").push(method.into());
            let result = match method {
                "tools/list" => json!({ "tools": self.tools }),
                "tools/call" => json!({ "content": [{ "type": "text", "text": "ok" }] }),
                _ => json!({}),
            };
            let envelope = json!({ "jsonrpc": "2.0", "id": 1, "result": result });
            Ok(serde_json::from_value(envelope).expect("valid envelope"))
        }
    }

    fn server_with(name: &str, tools: Vec<Value>) -> ToolServer {
        ToolServer::new(Box::new(CatalogTransport::new(name, tools)))
    }

    #[tokio::test]
    async fn duplicate_registration_is_rejected() {
        let registry = ToolRegistry::new();
        registry
            .register(server_with("files", vec![]))
            .expect("first registration succeeds");
        let duplicate = registry.register(server_with("files", vec![]));
        assert!(matches!(
            duplicate,
            Err(ToolError::DuplicateServer { .. })
        ));
    }

    #[tokio::test]
    async fn discovery_unions_catalogs_in_registration_order() {
        let registry = ToolRegistry::new();
        registry
            .register(server_with("files", vec![json!({ "name": "read_file" })]))
            .expect("register files");
        registry
            .register(server_with("search", vec![json!({ "name": "web_search" })]))
            .expect("register search");

        let catalog = registry.discover_tools().await.expect("discovery succeeds");
        let names: Vec<&str> = catalog.iter().map(|tool| tool.name.as_str()).collect();
        assert_eq!(names, vec!["read_file", "web_search"]);
    }

    #[tokio::test]
    async fn find_tool_prefers_first_registered_server() {
        let registry = ToolRegistry::new();
        registry
            .register(server_with("first", vec![json!({ "name": "shared" })]))
            .expect("register first");
        registry
            .register(server_with("second", vec![json!({ "name": "shared" })]))
            .expect("register second");
        registry.discover_tools().await.expect("discovery succeeds");

        let (server, _) = registry.find_tool("shared").expect("tool found");
        assert_eq!(server.name(), "first");
    }

    #[tokio::test]
    async fn unknown_tool_call_fails_without_dispatch() {
        let registry = ToolRegistry::new();
        registry
            .register(server_with("files", vec![json!({ "name": "read_file" })]))
            .expect("register files");
        registry.discover_tools().await.expect("discovery succeeds");

        let outcome = registry.call_tool("not_a_tool", json!({})).await;
        assert!(matches!(outcome, Err(ToolError::UnknownTool { .. })));
    }

    #[test]
    fn validate_reports_missing_required_fields() {
        let tool = ToolDescriptor::new("send_email").with_input_schema(json!({
            "type": "object",
            "required": ["to", "subject", "body"]
        }));

        let partial = json!({ "to": "a@example.com" });
        match ToolRegistry::validate(&tool, &partial) {
            Err(ToolError::MissingParameters { missing, .. }) => {
                assert_eq!(missing, vec!["subject".to_string(), "body".to_string()]);
            }
            other => panic!("expected missing parameters, got {other:?}"),
        }

        let full = json!({ "to": "a@example.com", "subject": "hi", "body": "..." });
        assert!(ToolRegistry::validate(&tool, &full).is_ok());
    }

    #[test]
    fn validate_accepts_schema_without_required_list() {
        let tool = ToolDescriptor::new("noop");
        assert!(ToolRegistry::validate(&tool, &Value::Null).is_ok());
    }

    #[tokio::test]
    async fn unregister_removes_server_from_lookup() {
        let registry = ToolRegistry::new();
        registry
            .register(server_with("files", vec![json!({ "name": "read_file" })]))
            .expect("register files");
        registry.discover_tools().await.expect("discovery succeeds");
        assert!(registry.find_tool("read_file").is_some());

        assert!(registry.unregister("files").is_some());
        assert!(registry.find_tool("read_file").is_none());
        assert!(registry.unregister("files").is_none());
    }
}
