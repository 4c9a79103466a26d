mod defaults;
mod error;
mod loader;
mod server;

pub use error::ConfigError;
pub use server::{HttpServerConfig, StdioServerConfig, ToolServerConfig};

use std::path::Path;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub scheduler: SchedulerSettings,
    pub generator: GeneratorSettings,
    pub engine: EngineSettings,
    pub servers: Vec<ToolServerConfig>,
}

impl AppConfig {
    /// Load and validate configuration from a file path, falling back to
    /// the default location.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        loader::load_config(path)
    }
}

#[derive(Debug, Clone)]
pub struct SchedulerSettings {
    pub poll_interval_secs: u64,
    pub max_concurrent_campaigns: usize,
}

impl SchedulerSettings {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }
}

#[derive(Debug, Clone)]
pub struct GeneratorSettings {
    pub endpoint: String,
    pub model: String,
    /// Name of the environment variable holding the bearer token, if any.
    pub api_key_env: Option<String>,
}

#[derive(Debug, Clone)]
pub struct EngineSettings {
    pub recent_artifacts_in_prompt: usize,
}
