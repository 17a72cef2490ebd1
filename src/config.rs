//! Configuration module for the ansible API server
//!
//! Handles loading configuration from multiple sources, later ones winning:
//! - Default values
//! - The first configuration file found (explicit path, `$ANSIBLE_API_CONFIG`,
//!   `~/.ansible-api.toml`, `./ansible-api.toml`)
//! - Environment variables (`ANSIBLE_API_*`)
//! - Command-line arguments (applied by the binary)

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::net::{IpAddr, SocketAddr};
use std::path::{Path, PathBuf};

use crate::api::ApiConfig;
use crate::command::DEFAULT_ANSIBLE_BIN;
use crate::logging::LogFormat;

/// Main configuration structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// HTTP server settings
    pub server: ServerConfig,

    /// Ansible invocation settings
    pub ansible: AnsibleConfig,

    /// Logging settings
    pub logging: LoggingConfig,
}

/// HTTP server settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Address to bind to
    pub bind: String,

    /// Port to listen on
    pub port: u16,

    /// Allow cross-origin requests
    pub enable_cors: bool,

    /// Maximum request body size in bytes
    pub max_body_size: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "0.0.0.0".to_string(),
            port: 8080,
            enable_cors: false,
            max_body_size: 1024 * 1024,
        }
    }
}

/// Ansible invocation settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnsibleConfig {
    /// Program to run, looked up in `PATH` unless it contains a slash
    pub binary: String,

    /// Kill ansible after this many seconds (no limit when unset)
    pub timeout: Option<u64>,

    /// Extra environment for every ansible process
    pub environment: HashMap<String, String>,

    /// Working directory for ansible processes
    pub working_dir: Option<PathBuf>,
}

impl Default for AnsibleConfig {
    fn default() -> Self {
        Self {
            binary: DEFAULT_ANSIBLE_BIN.to_string(),
            timeout: None,
            environment: HashMap::new(),
            working_dir: None,
        }
    }
}

/// Logging settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default level when `RUST_LOG` is not set
    pub level: String,

    /// Output format
    pub format: LogFormat,

    /// Colored output (pretty and compact formats)
    pub ansi: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Compact,
            ansi: true,
        }
    }
}

impl Config {
    /// Load configuration from all sources
    pub fn load(config_path: Option<&PathBuf>) -> Result<Self> {
        let mut config = match Self::find_config_file(config_path)? {
            Some(path) => Self::from_file(&path)?,
            None => Config::default(),
        };

        config.apply_env_overrides()?;

        Ok(config)
    }

    /// Pick the configuration file to read, if any
    fn find_config_file(explicit_path: Option<&PathBuf>) -> Result<Option<PathBuf>> {
        // Explicit path takes priority and must exist
        if let Some(path) = explicit_path {
            if !path.exists() {
                bail!("Config file not found: {}", path.display());
            }
            return Ok(Some(path.clone()));
        }

        Ok(Self::get_config_paths().into_iter().find(|p| p.exists()))
    }

    /// Get the list of configuration file paths to check, in priority order
    fn get_config_paths() -> Vec<PathBuf> {
        let mut paths = Vec::new();

        if let Ok(env_config) = std::env::var("ANSIBLE_API_CONFIG") {
            paths.push(PathBuf::from(env_config));
        }

        if let Some(home) = dirs::home_dir() {
            paths.push(home.join(".ansible-api.toml"));
        }

        paths.push(PathBuf::from("ansible-api.toml"));

        paths
    }

    /// Load from a specific file, format chosen by extension
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("");

        let config = match extension {
            "yml" | "yaml" => serde_yaml::from_str(&content)?,
            "json" => serde_json::from_str(&content)?,
            "toml" => toml::from_str(&content)?,
            _ => {
                // Try TOML first, then YAML
                toml::from_str(&content)
                    .or_else(|_| serde_yaml::from_str(&content))
                    .with_context(|| format!("Failed to parse config file: {}", path.display()))?
            }
        };

        Ok(config)
    }

    /// Apply environment variable overrides
    fn apply_env_overrides(&mut self) -> Result<()> {
        // ANSIBLE_API_BIND
        if let Ok(bind) = std::env::var("ANSIBLE_API_BIND") {
            self.server.bind = bind;
        }

        // ANSIBLE_API_PORT
        if let Ok(port) = std::env::var("ANSIBLE_API_PORT") {
            self.server.port = port
                .parse()
                .with_context(|| format!("Invalid ANSIBLE_API_PORT: {}", port))?;
        }

        // ANSIBLE_API_ANSIBLE_BIN
        if let Ok(binary) = std::env::var("ANSIBLE_API_ANSIBLE_BIN") {
            self.ansible.binary = binary;
        }

        // ANSIBLE_API_TIMEOUT
        if let Ok(timeout) = std::env::var("ANSIBLE_API_TIMEOUT") {
            self.ansible.timeout = Some(
                timeout
                    .parse()
                    .with_context(|| format!("Invalid ANSIBLE_API_TIMEOUT: {}", timeout))?,
            );
        }

        // ANSIBLE_API_LOG_LEVEL
        if let Ok(level) = std::env::var("ANSIBLE_API_LOG_LEVEL") {
            self.logging.level = level;
        }

        // ANSIBLE_API_LOG_FORMAT
        if let Ok(format) = std::env::var("ANSIBLE_API_LOG_FORMAT") {
            self.logging.format = format.parse()?;
        }

        // NO_COLOR
        if std::env::var("NO_COLOR").is_ok() {
            self.logging.ansi = false;
        }

        Ok(())
    }

    /// Socket address the server binds to
    pub fn bind_address(&self) -> Result<SocketAddr> {
        let ip: IpAddr = self
            .server
            .bind
            .parse()
            .with_context(|| format!("Invalid bind address: {}", self.server.bind))?;
        Ok(SocketAddr::new(ip, self.server.port))
    }

    /// Build the HTTP server configuration
    pub fn api_config(&self) -> Result<ApiConfig> {
        Ok(ApiConfig::default()
            .with_address(self.bind_address()?)
            .with_ansible_bin(self.ansible.binary.clone())
            .with_cors(self.server.enable_cors)
            .with_max_body_size(self.server.max_body_size))
    }
}
