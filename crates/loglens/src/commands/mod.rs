//! Command implementations

pub mod handlers;
pub mod hash_password;
pub mod serve;
pub mod show;

use anyhow::{Context, Result};
use loglens_core::constants::config_home;
use loglens_core::{Error, HandlerRegistry, LensConfig};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Load the configuration from `explicit`, or search the working directory
/// and then the user config directory
pub fn load_config(explicit: Option<&Path>) -> Result<(LensConfig, PathBuf)> {
    if let Some(path) = explicit {
        let config = LensConfig::load(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?;
        return Ok((config, path.to_path_buf()));
    }

    let cwd = std::env::current_dir()?;
    match LensConfig::find_and_load(&cwd) {
        Ok(found) => Ok(found),
        Err(Error::ConfigError(_)) => LensConfig::find_and_load(&config_home())
            .context("No configuration found; pass --config or set LOGLENS_CONFIG"),
        Err(e) => Err(e.into()),
    }
}

/// Build the handler registry, including custom file-backed kinds
pub fn build_registry(config: &LensConfig) -> HandlerRegistry {
    let registry = HandlerRegistry::from_config(&config.logging);
    for kind in &config.file_backed_kinds {
        registry.register_file_backed_kind(kind);
    }
    debug!(
        "Loaded {} handlers, file-backed kinds: {:?}",
        registry.len(),
        registry.file_backed_kinds()
    );
    registry
}

/// Descriptors of every file-backed handler, in name order
pub fn file_backed_descriptors(registry: &HandlerRegistry) -> Vec<loglens_core::HandlerDescriptor> {
    registry
        .descriptors()
        .into_iter()
        .filter(|d| d.is_file_backed())
        .collect()
}
