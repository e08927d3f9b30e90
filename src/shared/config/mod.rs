//! Application configuration module
//!
//! Configuration is assembled from an optional TOML file (named by
//! `LAYOUT_CONFIG`) overlaid with environment variables, then validated once
//! at startup. Every storage backend is optional; the service runs with
//! whatever subset is configured.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use thiserror::Error;

/// Default HTTP port
const DEFAULT_PORT: u16 = 3000;

/// Default GitHub REST endpoint
pub const DEFAULT_GITHUB_API_URL: &str = "https://api.github.com";

/// Default maximum normalized edit distance for the fuzzy translator tier
pub const DEFAULT_FUZZY_THRESHOLD: f64 = 0.3;

/// Storage backend selector
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    /// Remote disk-service HTTP API
    Disk,
    /// GitHub repository used as a filesystem
    GitHub,
    /// PostgreSQL document table
    Database,
    /// In-process map, for tests and local development
    Memory,
}

impl StoreBackend {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Disk => "disk",
            Self::GitHub => "github",
            Self::Database => "database",
            Self::Memory => "memory",
        }
    }
}

impl fmt::Display for StoreBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StoreBackend {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "disk" => Ok(Self::Disk),
            "github" => Ok(Self::GitHub),
            "database" | "db" => Ok(Self::Database),
            "memory" => Ok(Self::Memory),
            other => Err(ConfigError::InvalidValue {
                key: "backend",
                value: other.to_string(),
            }),
        }
    }
}

/// Disk-service connection settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiskServiceConfig {
    /// Base URL, e.g. `http://10.0.0.5:5000`
    pub base_url: String,
    /// Bearer token sent with every request
    pub token: String,
}

/// GitHub repository-storage settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GitHubConfig {
    /// Account that owns one repository per store
    pub owner: String,
    pub token: String,
    #[serde(default = "default_github_api_url")]
    pub api_url: String,
}

/// Fill-mask language model endpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FillMaskConfig {
    pub url: String,
    #[serde(default)]
    pub token: Option<String>,
}

fn default_github_api_url() -> String {
    DEFAULT_GITHUB_API_URL.to_string()
}

/// Application configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub port: u16,
    pub database_url: Option<String>,
    pub jwt_secret: Option<String>,
    pub disk: Option<DiskServiceConfig>,
    pub github: Option<GitHubConfig>,
    pub fill_mask: Option<FillMaskConfig>,
    /// JSON file of `{input, output}` exemplars for the fuzzy tier
    pub translator_dataset: Option<PathBuf>,
    pub fuzzy_threshold: f64,
    pub default_backend: Option<StoreBackend>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            database_url: None,
            jwt_secret: None,
            disk: None,
            github: None,
            fill_mask: None,
            translator_dataset: None,
            fuzzy_threshold: DEFAULT_FUZZY_THRESHOLD,
            default_backend: None,
        }
    }
}

impl AppConfig {
    /// Create a new AppConfigBuilder
    pub fn builder() -> AppConfigBuilder {
        AppConfigBuilder::default()
    }

    /// Parse a TOML configuration document
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        toml::from_str(source).map_err(|e| ConfigError::File(e.to_string()))
    }

    /// Load the TOML file at `path`
    pub fn from_toml_file(path: &Path) -> Result<Self, ConfigError> {
        let source = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::File(format!("{}: {}", path.display(), e)))?;
        Self::from_toml_str(&source)
    }

    /// Load from `LAYOUT_CONFIG` (if set) and the process environment
    pub fn from_env() -> Result<Self, ConfigError> {
        let base = match std::env::var("LAYOUT_CONFIG") {
            Ok(path) => Self::from_toml_file(Path::new(&path))?,
            Err(_) => Self::default(),
        };
        let config = Self::overlay(base, |key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Apply environment-style overrides from `lookup` on top of `base`
    pub fn overlay<F>(base: AppConfig, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut builder = AppConfigBuilder::from_config(base);

        if let Some(port) = lookup("SERVER_PORT") {
            let port = port.parse::<u16>().map_err(|_| ConfigError::InvalidValue {
                key: "SERVER_PORT",
                value: port,
            })?;
            builder = builder.port(port);
        }
        if let Some(url) = lookup("DATABASE_URL") {
            builder = builder.database_url(url);
        }
        if let Some(secret) = lookup("JWT_SECRET") {
            builder = builder.jwt_secret(secret);
        }
        if let Some(url) = lookup("DISK_SERVICE_URL") {
            let token = lookup("DISK_SERVICE_TOKEN").ok_or(ConfigError::MissingValue(
                "DISK_SERVICE_TOKEN",
            ))?;
            builder = builder.disk(url, token);
        }
        if let Some(owner) = lookup("GITHUB_OWNER") {
            let token = lookup("GITHUB_TOKEN").ok_or(ConfigError::MissingValue("GITHUB_TOKEN"))?;
            let api_url = lookup("GITHUB_API_URL").unwrap_or_else(default_github_api_url);
            builder = builder.github(owner, token, api_url);
        }
        if let Some(url) = lookup("FILL_MASK_URL") {
            builder = builder.fill_mask(url, lookup("FILL_MASK_TOKEN"));
        }
        if let Some(path) = lookup("TRANSLATOR_DATASET") {
            builder = builder.translator_dataset(PathBuf::from(path));
        }
        if let Some(threshold) = lookup("FUZZY_THRESHOLD") {
            let parsed = threshold
                .parse::<f64>()
                .map_err(|_| ConfigError::InvalidValue {
                    key: "FUZZY_THRESHOLD",
                    value: threshold,
                })?;
            builder = builder.fuzzy_threshold(parsed);
        }
        if let Some(backend) = lookup("DEFAULT_BACKEND") {
            builder = builder.default_backend(backend.parse()?);
        }

        builder.build()
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        match &self.jwt_secret {
            Some(secret) if !secret.is_empty() => {}
            _ => return Err(ConfigError::MissingValue("JWT_SECRET")),
        }
        if !(self.fuzzy_threshold > 0.0 && self.fuzzy_threshold <= 1.0) {
            return Err(ConfigError::InvalidValue {
                key: "FUZZY_THRESHOLD",
                value: self.fuzzy_threshold.to_string(),
            });
        }
        if let Some(disk) = &self.disk {
            check_url(&disk.base_url)?;
        }
        if let Some(github) = &self.github {
            check_url(&github.api_url)?;
        }
        if let Some(fill_mask) = &self.fill_mask {
            check_url(&fill_mask.url)?;
        }
        if let Some(backend) = self.default_backend {
            if !self.is_configured(backend) {
                return Err(ConfigError::InvalidValue {
                    key: "DEFAULT_BACKEND",
                    value: format!("{} (not configured)", backend),
                });
            }
        }
        Ok(())
    }

    /// Whether the settings for `backend` are present
    pub fn is_configured(&self, backend: StoreBackend) -> bool {
        match backend {
            StoreBackend::Disk => self.disk.is_some(),
            StoreBackend::GitHub => self.github.is_some(),
            StoreBackend::Database => self.database_url.is_some(),
            StoreBackend::Memory => true,
        }
    }

    /// Backend used when a request does not name one
    pub fn effective_default_backend(&self) -> StoreBackend {
        self.default_backend.unwrap_or(if self.database_url.is_some() {
            StoreBackend::Database
        } else {
            StoreBackend::Memory
        })
    }
}

fn check_url(url: &str) -> Result<(), ConfigError> {
    if url.starts_with("http://") || url.starts_with("https://") {
        Ok(())
    } else {
        Err(ConfigError::InvalidUrl(url.to_string()))
    }
}

/// Builder for AppConfig
#[derive(Debug, Default)]
pub struct AppConfigBuilder {
    config: AppConfig,
}

impl AppConfigBuilder {
    /// Start from an existing configuration
    pub fn from_config(config: AppConfig) -> Self {
        Self { config }
    }

    pub fn port(mut self, port: u16) -> Self {
        self.config.port = port;
        self
    }

    pub fn database_url(mut self, url: impl Into<String>) -> Self {
        self.config.database_url = Some(url.into());
        self
    }

    pub fn jwt_secret(mut self, secret: impl Into<String>) -> Self {
        self.config.jwt_secret = Some(secret.into());
        self
    }

    pub fn disk(mut self, base_url: impl Into<String>, token: impl Into<String>) -> Self {
        self.config.disk = Some(DiskServiceConfig {
            base_url: trim_slash(base_url.into()),
            token: token.into(),
        });
        self
    }

    pub fn github(
        mut self,
        owner: impl Into<String>,
        token: impl Into<String>,
        api_url: impl Into<String>,
    ) -> Self {
        self.config.github = Some(GitHubConfig {
            owner: owner.into(),
            token: token.into(),
            api_url: trim_slash(api_url.into()),
        });
        self
    }

    pub fn fill_mask(mut self, url: impl Into<String>, token: Option<String>) -> Self {
        self.config.fill_mask = Some(FillMaskConfig {
            url: url.into(),
            token,
        });
        self
    }

    pub fn translator_dataset(mut self, path: PathBuf) -> Self {
        self.config.translator_dataset = Some(path);
        self
    }

    pub fn fuzzy_threshold(mut self, threshold: f64) -> Self {
        self.config.fuzzy_threshold = threshold;
        self
    }

    pub fn default_backend(mut self, backend: StoreBackend) -> Self {
        self.config.default_backend = Some(backend);
        self
    }

    /// Build the configuration
    pub fn build(self) -> Result<AppConfig, ConfigError> {
        Ok(self.config)
    }
}

fn trim_slash(url: String) -> String {
    url.trim_end_matches('/').to_string()
}

/// Configuration errors
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("invalid URL: {0}")]
    InvalidUrl(String),
    #[error("missing value: {0}")]
    MissingValue(&'static str),
    #[error("invalid value for {key}: {value}")]
    InvalidValue { key: &'static str, value: String },
    #[error("config file error: {0}")]
    File(String),
}
