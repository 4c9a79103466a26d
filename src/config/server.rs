use super::error::ConfigError;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::PathBuf;

/// One configured tool provider: a subprocess spoken to over stdio, or a
/// remote endpoint spoken to over HTTP.
#[derive(Debug, Clone, PartialEq)]
pub enum ToolServerConfig {
    Stdio(StdioServerConfig),
    Http(HttpServerConfig),
}

impl ToolServerConfig {
    pub fn name(&self) -> &str {
        match self {
            ToolServerConfig::Stdio(config) => &config.name,
            ToolServerConfig::Http(config) => &config.name,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct StdioServerConfig {
    pub name: String,
    pub command: PathBuf,
    pub args: Vec<String>,
    pub env: HashMap<String, String>,
    pub workdir: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct HttpServerConfig {
    pub name: String,
    pub url: String,
}

#[derive(Debug, Clone, Deserialize)]
pub(super) struct RawServer {
    name: String,
    transport: String,
    command: Option<String>,
    #[serde(default)]
    args: Vec<String>,
    #[serde(default)]
    env: HashMap<String, String>,
    workdir: Option<String>,
    url: Option<String>,
}

impl RawServer {
    pub(super) fn name(&self) -> &str {
        &self.name
    }

    pub(super) fn into_config(self) -> Result<ToolServerConfig, ConfigError> {
        let expand = |s: &str| -> String {
            shellexpand::full(s)
                .map(|cow| cow.into_owned())
                .unwrap_or_else(|_| s.to_string())
        };

        match self.transport.as_str() {
            "stdio" => {
                let command = self.command.ok_or_else(|| ConfigError::MissingCommand {
                    server: self.name.clone(),
                })?;
                Ok(ToolServerConfig::Stdio(StdioServerConfig {
                    name: self.name,
                    command: PathBuf::from(expand(&command)),
                    args: self.args.iter().map(|arg| expand(arg)).collect(),
                    env: self.env,
                    workdir: self.workdir.map(|dir| PathBuf::from(expand(&dir))),
                }))
            }
            "http" => {
                let url = self.url.ok_or_else(|| ConfigError::MissingUrl {
                    server: self.name.clone(),
                })?;
                Ok(ToolServerConfig::Http(HttpServerConfig {
                    name: self.name,
                    url: expand(&url),
                }))
            }
            other => Err(ConfigError::UnknownTransport {
                server: self.name,
                transport: other.to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;

    #[test]
    fn expands_env_vars_in_command_and_args() {
        unsafe {
            env::set_var("TEST_TOOL_ROOT", "/opt/tools");
        }

        let raw = RawServer {
            name: "files".to_string(),
            transport: "stdio".to_string(),
            command: Some("${TEST_TOOL_ROOT}/file-server".to_string()),
            args: vec!["--root".to_string(), "${TEST_TOOL_ROOT}/data".to_string()],
            env: HashMap::new(),
            workdir: None,
            url: None,
        };

        let config = raw.into_config().expect("valid stdio config");
        match config {
            ToolServerConfig::Stdio(stdio) => {
                assert!(
                    stdio
                        .command
                        .to_str()
                        .expect("valid utf8")
                        .contains("/opt/tools/file-server")
                );
                assert!(stdio.args.contains(&"/opt/tools/data".to_string()));
            }
            other => panic!("expected stdio config, got {other:?}"),
        }

        unsafe {
            env::remove_var("TEST_TOOL_ROOT");
        }
    }

    #[test]
    fn stdio_without_command_is_rejected() {
        let raw = RawServer {
            name: "files".to_string(),
            transport: "stdio".to_string(),
            command: None,
            args: Vec::new(),
            env: HashMap::new(),
            workdir: None,
            url: None,
        };
        assert!(matches!(
            raw.into_config(),
            Err(ConfigError::MissingCommand { .. })
        ));
    }

    #[test]
    fn http_without_url_is_rejected() {
        let raw = RawServer {
            name: "search".to_string(),
            transport: "http".to_string(),
            command: None,
            args: Vec::new(),
            env: HashMap::new(),
            workdir: None,
            url: None,
        };
        assert!(matches!(
            raw.into_config(),
            Err(ConfigError::MissingUrl { .. })
        ));
    }

    #[test]
    fn unknown_transport_is_rejected() {
        let raw = RawServer {
            name: "quic-server".to_string(),
            transport: "quic".to_string(),
            command: None,
            args: Vec::new(),
            env: HashMap::new(),
            workdir: None,
            url: None,
        };
        match raw.into_config() {
            Err(ConfigError::UnknownTransport { transport, .. }) => {
                assert_eq!(transport, "quic");
            }
            other => panic!("expected unknown transport error, got {other:?}"),
        }
    }
}
