use super::defaults::{
    DEFAULT_CONFIG_PATH, DEFAULT_MAX_CONCURRENT_CAMPAIGNS, DEFAULT_POLL_INTERVAL_SECS,
    DEFAULT_RECENT_ARTIFACTS_IN_PROMPT,
};
use super::error::ConfigError;
use super::server::RawServer;
use super::{AppConfig, EngineSettings, GeneratorSettings, SchedulerSettings, ToolServerConfig};
use dotenvy::from_filename;
use serde::Deserialize;
use std::collections::HashSet;
use std::fs;
use std::io;
use std::path::Path;
use std::sync::Once;
use tracing::debug;

static ENV_LOADER: Once = Once::new();

/// Raw configuration structure for deserialization from TOML
#[derive(Debug, Deserialize, Default)]
struct RawConfig {
    #[serde(default)]
    scheduler: RawScheduler,
    generator: Option<RawGenerator>,
    #[serde(default)]
    engine: RawEngine,
    #[serde(default)]
    servers: Vec<RawServer>,
}

#[derive(Debug, Deserialize, Default)]
struct RawScheduler {
    poll_interval_secs: Option<u64>,
    max_concurrent_campaigns: Option<usize>,
}

#[derive(Debug, Deserialize, Default)]
struct RawGenerator {
    endpoint: Option<String>,
    model: Option<String>,
    api_key_env: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
struct RawEngine {
    recent_artifacts_in_prompt: Option<usize>,
}

/// Ensures environment variables are loaded from config/.env
pub fn ensure_env_loaded() {
    ENV_LOADER.call_once(|| {
        let _ = from_filename("config/.env");
    });
}

/// Load and validate configuration from a file path
pub fn load_config(path: Option<&Path>) -> Result<AppConfig, ConfigError> {
    ensure_env_loaded();
    let config_path = path.unwrap_or_else(|| Path::new(DEFAULT_CONFIG_PATH));
    read_config(config_path)
}

fn read_config(path: &Path) -> Result<AppConfig, ConfigError> {
    debug!(path = %path.display(), "Reading engine configuration file");

    let content = fs::read_to_string(path).map_err(|source| {
        if source.kind() == io::ErrorKind::NotFound {
            ConfigError::NotFound {
                path: path.to_path_buf(),
            }
        } else {
            ConfigError::Io {
                path: path.to_path_buf(),
                source,
            }
        }
    })?;

    let parsed: RawConfig = toml::from_str(&content).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })?;

    validate_and_build(parsed)
}

fn validate_and_build(parsed: RawConfig) -> Result<AppConfig, ConfigError> {
    let raw_generator = parsed.generator.unwrap_or_default();
    let endpoint = raw_generator
        .endpoint
        .ok_or(ConfigError::MissingGeneratorEndpoint)?;
    let model = raw_generator
        .model
        .ok_or(ConfigError::MissingGeneratorModel)?;

    let max_concurrent_campaigns = parsed
        .scheduler
        .max_concurrent_campaigns
        .unwrap_or(DEFAULT_MAX_CONCURRENT_CAMPAIGNS);
    if max_concurrent_campaigns == 0 {
        return Err(ConfigError::InvalidConcurrencyCap);
    }

    let mut seen = HashSet::new();
    for server in &parsed.servers {
        if !seen.insert(server.name().to_string()) {
            return Err(ConfigError::DuplicateServerName {
                server: server.name().to_string(),
            });
        }
    }
    let servers: Vec<ToolServerConfig> = parsed
        .servers
        .into_iter()
        .map(RawServer::into_config)
        .collect::<Result<_, _>>()?;

    Ok(AppConfig {
        scheduler: SchedulerSettings {
            poll_interval_secs: parsed
                .scheduler
                .poll_interval_secs
                .unwrap_or(DEFAULT_POLL_INTERVAL_SECS),
            max_concurrent_campaigns,
        },
        generator: GeneratorSettings {
            endpoint,
            model,
            api_key_env: raw_generator.api_key_env,
        },
        engine: EngineSettings {
            recent_artifacts_in_prompt: parsed
                .engine
                .recent_artifacts_in_prompt
                .unwrap_or(DEFAULT_RECENT_ARTIFACTS_IN_PROMPT),
        },
        servers,
    })
}
