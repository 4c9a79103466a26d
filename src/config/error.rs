use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur when loading or validating configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("configuration file not found at {path:?}")]
    NotFound { path: PathBuf },

    #[error("failed to read config from {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to parse config from {path:?}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("missing required field 'endpoint' in [generator]")]
    MissingGeneratorEndpoint,

    #[error("missing required field 'model' in [generator]")]
    MissingGeneratorModel,

    #[error("server '{server}' declares unknown transport '{transport}'")]
    UnknownTransport { server: String, transport: String },

    #[error("stdio server '{server}' is missing required field 'command'")]
    MissingCommand { server: String },

    #[error("http server '{server}' is missing required field 'url'")]
    MissingUrl { server: String },

    #[error("server name '{server}' is declared more than once")]
    DuplicateServerName { server: String },

    #[error("scheduler.max_concurrent_campaigns must be at least 1")]
    InvalidConcurrencyCap,
}
