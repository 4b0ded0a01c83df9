//! Configuration module for satchel.

use serde::Deserialize;
use std::path::Path;

use crate::{Result, SatchelError};

/// Environment variable that overrides `storage.root`.
pub const STORAGE_ROOT_ENV: &str = "SATCHEL_STORAGE_ROOT";

/// HTTP server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Host address to bind.
    #[serde(default = "default_host")]
    pub host: String,
    /// Port number to listen on.
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    5000
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

/// Upload storage configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    /// Root directory holding one subdirectory per subject.
    #[serde(default = "default_storage_root")]
    pub root: String,
    /// Extensions accepted on upload, compared case-insensitively.
    #[serde(default = "default_allowed_extensions")]
    pub allowed_extensions: Vec<String>,
}

fn default_storage_root() -> String {
    "uploads".to_string()
}

fn default_allowed_extensions() -> Vec<String> {
    crate::file::DEFAULT_ALLOWED_EXTENSIONS
        .iter()
        .map(|s| s.to_string())
        .collect()
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            root: default_storage_root(),
            allowed_extensions: default_allowed_extensions(),
        }
    }
}

/// Homepage configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct SiteConfig {
    /// Page title.
    #[serde(default = "default_site_title")]
    pub title: String,
    /// Subjects offered on the homepage. The first one is selected on load.
    #[serde(default = "default_subjects")]
    pub subjects: Vec<String>,
}

fn default_site_title() -> String {
    "Study Materials".to_string()
}

fn default_subjects() -> Vec<String> {
    vec!["DS".to_string()]
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            title: default_site_title(),
            subjects: default_subjects(),
        }
    }
}

/// Templates configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct TemplatesConfig {
    /// Path to the templates directory.
    #[serde(default = "default_templates_path")]
    pub path: String,
}

fn default_templates_path() -> String {
    "templates".to_string()
}

impl Default for TemplatesConfig {
    fn default() -> Self {
        Self {
            path: default_templates_path(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Path to the log file.
    #[serde(default = "default_log_file")]
    pub file: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_file() -> String {
    "logs/satchel.log".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file: default_log_file(),
        }
    }
}

/// Web layer configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct WebConfig {
    /// CORS allowed origins. Empty means any origin.
    #[serde(default)]
    pub cors_origins: Vec<String>,
    /// Whether to serve static front-end assets under `/static`.
    #[serde(default = "default_serve_static")]
    pub serve_static: bool,
    /// Path to static files directory.
    #[serde(default = "default_static_path")]
    pub static_path: String,
}

fn default_serve_static() -> bool {
    true
}

fn default_static_path() -> String {
    "static".to_string()
}

impl Default for WebConfig {
    fn default() -> Self {
        Self {
            cors_origins: vec![],
            serve_static: default_serve_static(),
            static_path: default_static_path(),
        }
    }
}

/// Main configuration structure.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct Config {
    /// Server configuration.
    #[serde(default)]
    pub server: ServerConfig,
    /// Storage configuration.
    #[serde(default)]
    pub storage: StorageConfig,
    /// Homepage configuration.
    #[serde(default)]
    pub site: SiteConfig,
    /// Templates configuration.
    #[serde(default)]
    pub templates: TemplatesConfig,
    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
    /// Web layer configuration.
    #[serde(default)]
    pub web: WebConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(SatchelError::Io)?;
        Self::parse(&content)
    }

    /// Load configuration from a TOML file and apply environment variable overrides.
    pub fn load_with_env<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut config = Self::load(path)?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Parse configuration from a TOML string.
    pub fn parse(s: &str) -> Result<Self> {
        toml::from_str(s).map_err(|e| SatchelError::Config(format!("config parse error: {e}")))
    }

    /// Apply environment variable overrides to the configuration.
    ///
    /// Supported environment variables:
    /// - `SATCHEL_STORAGE_ROOT`: Override the upload storage root
    pub fn apply_env_overrides(&mut self) {
        if let Ok(root) = std::env::var(STORAGE_ROOT_ENV) {
            if !root.is_empty() {
                self.storage.root = root;
            }
        }
    }

    /// Validate the configuration.
    ///
    /// Returns an error if:
    /// - The storage root is empty
    /// - No upload extension is allowed
    /// - No homepage subject is configured
    pub fn validate(&self) -> Result<()> {
        if self.storage.root.trim().is_empty() {
            return Err(SatchelError::Config("storage.root must not be empty".to_string()));
        }
        if self.storage.allowed_extensions.is_empty() {
            return Err(SatchelError::Config(
                "storage.allowed_extensions must list at least one extension".to_string(),
            ));
        }
        if self.site.subjects.is_empty() {
            return Err(SatchelError::Config(
                "site.subjects must list at least one subject".to_string(),
            ));
        }
        Ok(())
    }
}
