//! CLI command implementations
//!
//! Commands are organized by domain:
//! - `config` - Configuration display commands (show, path)
//! - `findall` - Lookup collection fetch
//! - `reports` - Report generation and listing

pub mod config;
pub mod findall;
pub mod reports;

// Re-export command functions for main.rs
pub use config::*;
pub use findall::*;
pub use reports::*;

use std::path::Path;

use anyhow::{Context, Result};
use rapport_core::{Config, ReportClient};

/// Resolve configuration, applying the `--base-url` override last
pub fn load_config(path: Option<&Path>, base_url: Option<&str>) -> Result<Config> {
    let config = Config::load(path).context("Failed to load configuration")?;
    match base_url {
        Some(url) => config
            .with_base_url(url)
            .context("Invalid --base-url"),
        None => Ok(config),
    }
}

pub fn client(config: &Config) -> Result<ReportClient> {
    ReportClient::from_config(&config.api).context("Failed to create HTTP client")
}
