mod envelope;
mod error;
mod http;
mod registry;
mod server;
mod stdio;
mod transport;

pub use envelope::{JSONRPC_VERSION, PROTOCOL_VERSION, RpcError, RpcRequest, RpcResponse};
pub use error::ToolError;
pub use http::HttpTransport;
pub use registry::ToolRegistry;
pub use server::ToolServer;
pub use stdio::StdioTransport;
pub use transport::ToolTransport;
