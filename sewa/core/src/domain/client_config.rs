// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

// Client Configuration Types
//
// Defines the configuration schema for the Sewa client, including:
// - Kubernetes-style manifest format (apiVersion/kind/metadata/spec)
// - REST backend location and bearer token
// - Object storage upload endpoint
// - Badge polling interval and log level

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

pub const API_VERSION: &str = "sewa.gov/v1";
pub const KIND: &str = "ClientConfig";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config at {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Top-level Kubernetes-style client configuration manifest
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfigManifest {
    /// API version (must be "sewa.gov/v1")
    #[serde(rename = "apiVersion")]
    pub api_version: String,

    /// Resource kind (must be "ClientConfig")
    pub kind: String,

    pub metadata: ManifestMetadata,

    pub spec: ClientConfigSpec,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ManifestMetadata {
    pub name: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ClientConfigSpec {
    #[serde(default)]
    pub api: ApiConfig,

    #[serde(default)]
    pub storage: StorageConfig,

    #[serde(default)]
    pub polling: PollingConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Prefix of every backend route, e.g. "https://api.sewa.example/api"
    #[serde(default = "default_base_url")]
    pub base_url: String,

    #[serde(default = "default_api_timeout")]
    pub timeout_secs: u64,

    /// Bearer token sent on every call
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auth_token: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Multipart upload endpoint of the document host
    #[serde(default = "default_upload_url")]
    pub upload_url: String,

    /// Unsigned upload preset, sent as the `upload_preset` form field
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub upload_preset: Option<String>,

    #[serde(default = "default_upload_timeout")]
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PollingConfig {
    #[serde(default = "default_badge_interval")]
    pub badge_interval_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
}

fn default_base_url() -> String {
    "http://localhost:5000/api".to_string()
}

fn default_api_timeout() -> u64 {
    30
}

fn default_upload_url() -> String {
    "http://localhost:5000/upload".to_string()
}

fn default_upload_timeout() -> u64 {
    60
}

fn default_badge_interval() -> u64 {
    30
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: default_api_timeout(),
            auth_token: None,
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            upload_url: default_upload_url(),
            upload_preset: None,
            timeout_secs: default_upload_timeout(),
        }
    }
}

impl Default for PollingConfig {
    fn default() -> Self {
        Self {
            badge_interval_secs: default_badge_interval(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

impl Default for ClientConfigManifest {
    fn default() -> Self {
        Self {
            api_version: API_VERSION.to_string(),
            kind: KIND.to_string(),
            metadata: ManifestMetadata {
                name: "sewa-client".to_string(),
                version: Some("1.0.0".to_string()),
            },
            spec: ClientConfigSpec::default(),
        }
    }
}

impl ApiConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl StorageConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl PollingConfig {
    pub fn badge_interval(&self) -> Duration {
        Duration::from_secs(self.badge_interval_secs)
    }
}

impl ClientConfigManifest {
    /// Load configuration from YAML file
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml_str(&content)
    }

    /// Save configuration to YAML file
    pub fn to_yaml_file(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let path = path.as_ref();
        let yaml = serde_yaml::to_string(self)?;
        std::fs::write(path, yaml).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Parse configuration from YAML string
    pub fn from_yaml_str(yaml: &str) -> Result<Self, ConfigError> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    /// Discover configuration file using precedence order
    /// 1. SEWA_CONFIG_PATH environment variable
    /// 2. ./sewa-config.yaml (working directory)
    /// 3. ~/.sewa/config.yaml (user home)
    /// 4. /etc/sewa/config.yaml (system, Unix) or C:\ProgramData\Sewa\config.yaml (Windows)
    pub fn discover_config() -> Option<PathBuf> {
        if let Ok(path) = std::env::var("SEWA_CONFIG_PATH") {
            let path = PathBuf::from(path);
            if path.exists() {
                return Some(path);
            }
        }

        let cwd = PathBuf::from("./sewa-config.yaml");
        if cwd.exists() {
            return Some(cwd);
        }

        if let Some(home) = dirs::home_dir() {
            let user_config = home.join(".sewa").join("config.yaml");
            if user_config.exists() {
                return Some(user_config);
            }
        }

        #[cfg(unix)]
        let system_config = PathBuf::from("/etc/sewa/config.yaml");
        #[cfg(windows)]
        let system_config = PathBuf::from("C:\\ProgramData\\Sewa\\config.yaml");

        if system_config.exists() {
            return Some(system_config);
        }

        None
    }

    /// Load from an explicit path (which must exist), else discovery, else
    /// defaults. Environment overrides are applied in every case.
    pub fn load_or_default(cli_path: Option<PathBuf>) -> Result<Self, ConfigError> {
        let mut config = if let Some(path) = cli_path {
            tracing::info!("Loading configuration from explicit path: {:?}", path);
            Self::from_yaml_file(&path)?
        } else if let Some(path) = Self::discover_config() {
            tracing::info!("Loading configuration from discovered path: {:?}", path);
            Self::from_yaml_file(path)?
        } else {
            tracing::warn!("No configuration file found in standard locations. Using defaults.");
            Self::default()
        };
        config.apply_env_overrides();
        Ok(config)
    }

    /// Apply environment variable overrides to configuration
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides_from(|key| std::env::var(key).ok());
    }

    /// Apply overrides from an arbitrary variable lookup.
    pub fn apply_overrides_from(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(url) = non_empty("SEWA_API_URL") {
            tracing::info!("Environment override: SEWA_API_URL={}", url);
            self.spec.api.base_url = url;
        }
        if let Some(token) = non_empty("SEWA_AUTH_TOKEN") {
            tracing::info!("Environment override: SEWA_AUTH_TOKEN=<redacted>");
            self.spec.api.auth_token = Some(token);
        }
        if let Some(url) = non_empty("SEWA_UPLOAD_URL") {
            tracing::info!("Environment override: SEWA_UPLOAD_URL={}", url);
            self.spec.storage.upload_url = url;
        }
        if let Some(preset) = non_empty("SEWA_UPLOAD_PRESET") {
            tracing::info!("Environment override: SEWA_UPLOAD_PRESET={}", preset);
            self.spec.storage.upload_preset = Some(preset);
        }
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |msg: String| Err(ConfigError::Invalid(msg));

        if self.api_version != API_VERSION {
            return invalid(format!(
                "apiVersion '{}' must be '{}'",
                self.api_version, API_VERSION
            ));
        }
        if self.kind != KIND {
            return invalid(format!("kind '{}' must be '{}'", self.kind, KIND));
        }
        if self.metadata.name.is_empty() {
            return invalid("metadata.name cannot be empty".to_string());
        }
        if !is_http_url(&self.spec.api.base_url) {
            return invalid(format!(
                "spec.api.base_url must be an http(s) URL, got '{}'",
                self.spec.api.base_url
            ));
        }
        if !is_http_url(&self.spec.storage.upload_url) {
            return invalid(format!(
                "spec.storage.upload_url must be an http(s) URL, got '{}'",
                self.spec.storage.upload_url
            ));
        }
        if self.spec.api.timeout_secs == 0 || self.spec.storage.timeout_secs == 0 {
            return invalid("timeouts must be greater than zero".to_string());
        }
        if self.spec.polling.badge_interval_secs == 0 {
            return invalid("spec.polling.badge_interval_secs must be greater than zero".to_string());
        }
        Ok(())
    }
}

fn is_http_url(url: &str) -> bool {
    let url = url.trim();
    (url.starts_with("http://") && url.len() > "http://".len())
        || (url.starts_with("https://") && url.len() > "https://".len())
}
