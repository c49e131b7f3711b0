//! Error types for LogLens

use std::path::PathBuf;

/// LogLens error type
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Handler not registered: {0}")]
    NotRegistered(String),

    #[error("Handler {handler} is misconfigured: {reason}")]
    Misconfigured { handler: String, reason: String },

    #[error("Handler {0} does not write to a file")]
    NotFileBacked(String),

    #[error("Invalid level: {0}")]
    InvalidLevel(String),

    #[error("Config error: {0}")]
    ConfigError(String),

    #[error("Config file not found: {0}")]
    ConfigNotFound(PathBuf),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("YAML parse error: {0}")]
    YamlError(#[from] serde_yaml::Error),
}

/// Result type alias for LogLens
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub fn config<S: Into<String>>(msg: S) -> Self {
        Error::ConfigError(msg.into())
    }

    pub fn misconfigured<H: Into<String>, R: Into<String>>(handler: H, reason: R) -> Self {
        Error::Misconfigured {
            handler: handler.into(),
            reason: reason.into(),
        }
    }

    /// Whether this error means "nothing to show" rather than a fault
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::NotRegistered(_))
    }
}
