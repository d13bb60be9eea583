//! Rapport configuration
//!
//! ## Configuration Resolution
//!
//! Config is loaded with a two-layer resolution:
//! 1. Explicit path, else the override in the data dir
//!    (~/.local/share/rapport/config/rapport.toml) when it exists
//! 2. Fall back to embedded defaults (compiled into binary)
//!
//! Environment variables are applied on top:
//! - `RAPPORT_API_URL`: backend base URL
//! - `RAPPORT_API_TIMEOUT`: request timeout in seconds

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::error::{Error, Result};
use crate::format::MoneyFormat;

/// Embedded default config (compiled into binary)
const DEFAULT_CONFIG: &str = include_str!("../../../config/rapport.toml");

/// Backend connection settings
#[derive(Debug, Clone, PartialEq)]
pub struct ApiConfig {
    pub base_url: String,
    pub timeout: Duration,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8080".to_string(),
            timeout: Duration::from_secs(30),
        }
    }
}

/// Printable document settings
#[derive(Debug, Clone, PartialEq)]
pub struct DocumentConfig {
    /// Shown in the document footer
    pub organisation: String,
    /// Body lines per page, header and footer excluded
    pub lines_per_page: usize,
    pub signature_label: String,
}

impl Default for DocumentConfig {
    fn default() -> Self {
        Self {
            organisation: "BUPORTIS".to_string(),
            lines_per_page: 60,
            signature_label: "Signature".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Config {
    pub api: ApiConfig,
    pub format: MoneyFormat,
    pub document: DocumentConfig,
    /// File the config was read from (None for embedded defaults)
    pub source: Option<PathBuf>,
}

impl Config {
    /// Resolve config: override file, embedded defaults, then environment
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let mut config = load_file(explicit)?;
        config.apply_env(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    /// Parse config from TOML content
    pub fn from_toml(content: &str) -> Result<Self> {
        let raw: RawConfig = toml::from_str(content)
            .map_err(|e| Error::Config(format!("Invalid config TOML: {}", e)))?;

        let mut config = Config::default();

        if let Some(api) = raw.api {
            if let Some(url) = api.base_url {
                config.api.base_url = normalize_base_url(&url)?;
            }
            if let Some(secs) = api.timeout_secs {
                config.api.timeout = timeout_from_secs(secs)?;
            }
        }

        if let Some(format) = raw.format {
            if let Some(suffix) = format.currency_suffix {
                config.format.currency_suffix = suffix;
            }
            if let Some(sep) = format.grouping_separator {
                config.format.grouping_separator = sep;
            }
        }

        if let Some(document) = raw.document {
            if let Some(org) = document.organisation {
                config.document.organisation = org;
            }
            if let Some(lines) = document.lines_per_page {
                if lines < 10 {
                    return Err(Error::Config(format!(
                        "document.lines_per_page must be at least 10, got {}",
                        lines
                    )));
                }
                config.document.lines_per_page = lines;
            }
            if let Some(label) = document.signature_label {
                config.document.signature_label = label;
            }
        }

        Ok(config)
    }

    /// Apply environment overrides through a lookup function
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup("RAPPORT_API_URL").filter(|v| !v.trim().is_empty()) {
            self.api.base_url = normalize_base_url(&url)?;
        }
        if let Some(raw) = lookup("RAPPORT_API_TIMEOUT").filter(|v| !v.trim().is_empty()) {
            let secs: u64 = raw.trim().parse().map_err(|_| {
                Error::Config(format!("RAPPORT_API_TIMEOUT must be whole seconds, got '{}'", raw))
            })?;
            self.api.timeout = timeout_from_secs(secs)?;
        }
        Ok(())
    }

    /// Replace the backend URL (command-line override)
    pub fn with_base_url(mut self, url: &str) -> Result<Self> {
        self.api.base_url = normalize_base_url(url)?;
        Ok(self)
    }
}

/// Default config override path
pub fn default_config_path() -> Option<PathBuf> {
    dirs::data_local_dir().map(|d| d.join("rapport").join("config").join("rapport.toml"))
}

/// Load configuration (override first, then default)
fn load_file(explicit: Option<&Path>) -> Result<Config> {
    if let Some(path) = explicit {
        // An explicit path must exist
        let content = fs::read_to_string(path).map_err(|e| {
            Error::Config(format!("Failed to read config {}: {}", path.display(), e))
        })?;
        let mut config = Config::from_toml(&content)?;
        config.source = Some(path.to_path_buf());
        return Ok(config);
    }

    if let Some(default_path) = default_config_path() {
        if default_path.exists() {
            let content = fs::read_to_string(&default_path)
                .map_err(|e| Error::Config(format!("Failed to read config: {}", e)))?;
            let mut config = Config::from_toml(&content)?;
            config.source = Some(default_path);
            return Ok(config);
        }
    }

    Config::from_toml(DEFAULT_CONFIG)
}

fn normalize_base_url(url: &str) -> Result<String> {
    let url = url.trim().trim_end_matches('/');
    if !(url.starts_with("http://") || url.starts_with("https://")) {
        return Err(Error::Config(format!(
            "API base URL must start with http:// or https://, got '{}'",
            url
        )));
    }
    Ok(url.to_string())
}

fn timeout_from_secs(secs: u64) -> Result<Duration> {
    if secs == 0 {
        return Err(Error::Config("API timeout must be greater than zero".into()));
    }
    Ok(Duration::from_secs(secs))
}

/// Raw config structure for TOML parsing
#[derive(Debug, Deserialize)]
struct RawConfig {
    api: Option<RawApi>,
    format: Option<RawFormat>,
    document: Option<RawDocument>,
}

#[derive(Debug, Deserialize)]
struct RawApi {
    base_url: Option<String>,
    timeout_secs: Option<u64>,
}

#[derive(Debug, Deserialize)]
struct RawFormat {
    currency_suffix: Option<String>,
    grouping_separator: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawDocument {
    organisation: Option<String>,
    lines_per_page: Option<usize>,
    signature_label: Option<String>,
}
