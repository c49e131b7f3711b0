//! Configuration file parsing for LogLens
//!
//! Supports multiple configuration file formats:
//! - TOML (.toml)
//! - YAML (.yaml, .yml)
//! - JSON (.json)
//!
//! The `logging` section mirrors a logging configuration dictionary: named
//! handlers (class, filename, level) and loggers keyed by tracing target
//! that route records to those handlers.

use serde::{Deserialize, Deserializer};
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::warn;

use crate::constants::*;
use crate::error::{Error, Result};

/// Supported configuration file formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    Toml,
    Yaml,
    Json,
}

impl ConfigFormat {
    /// Detect format from file extension
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "toml" => Some(ConfigFormat::Toml),
            "yaml" | "yml" => Some(ConfigFormat::Yaml),
            "json" => Some(ConfigFormat::Json),
            _ => None,
        }
    }

    /// Detect format from file path
    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|e| e.to_str())
            .and_then(Self::from_extension)
    }
}

/// HTTP server settings
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_bind")]
    pub bind: String,
    #[serde(default = "default_mount_path")]
    pub mount_path: String,
    /// Requests carrying this key in `X-API-Key` act as a privileged caller
    pub api_key: Option<String>,
    pub cors_origin: Option<String>,
    /// Seconds a login session stays valid
    #[serde(default = "default_session_ttl_secs")]
    pub session_ttl_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            mount_path: default_mount_path(),
            api_key: None,
            cors_origin: None,
            session_ttl_secs: default_session_ttl_secs(),
        }
    }
}

fn default_bind() -> String {
    DEFAULT_BIND.to_string()
}

fn default_mount_path() -> String {
    DEFAULT_MOUNT_PATH.to_string()
}

fn default_session_ttl_secs() -> u64 {
    DEFAULT_SESSION_TTL_SECS
}

/// A login account
#[derive(Debug, Clone, Deserialize)]
pub struct UserConfig {
    pub username: String,
    /// Lowercase hex SHA-256 of the password
    pub password_sha256: String,
    #[serde(default)]
    pub superuser: bool,
}

/// One entry of `logging.handlers`
///
/// Every field is optional so that a single broken entry does not prevent
/// the rest of the configuration from loading.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct HandlerConfig {
    pub class: Option<String>,
    pub filename: Option<PathBuf>,
    pub level: Option<String>,
}

/// One entry of `logging.loggers`, keyed by tracing target
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LoggerConfig {
    #[serde(default)]
    pub handlers: Vec<String>,
    pub level: Option<String>,
}

/// The `logging` section
///
/// Parsed entry by entry: a handler whose fields have the wrong shape is
/// kept aside in `invalid_handlers` instead of failing the whole file, and a
/// section that is not a table is ignored.
#[derive(Debug, Clone, Default)]
pub struct LoggingConfig {
    pub handlers: BTreeMap<String, HandlerConfig>,
    pub loggers: BTreeMap<String, LoggerConfig>,
    /// Handler entries that could not be parsed, with the reason
    pub invalid_handlers: BTreeMap<String, String>,
}

impl<'de> Deserialize<'de> for LoggingConfig {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        Ok(Self::from_value(Value::deserialize(deserializer)?))
    }
}

fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "a list",
        Value::Object(_) => "a table",
    }
}

/// Entries of a table-valued section, or nothing if it has another shape
fn section_entries(section: &str, value: Option<Value>) -> serde_json::Map<String, Value> {
    match value {
        Some(Value::Object(entries)) => entries,
        None | Some(Value::Null) => serde_json::Map::new(),
        Some(other) => {
            warn!(
                "Ignoring {}: expected a table, found {}",
                section,
                value_kind(&other)
            );
            serde_json::Map::new()
        }
    }
}

impl LoggingConfig {
    /// Build the section from an already parsed document, entry by entry
    pub fn from_value(value: Value) -> Self {
        let mut logging = Self::default();
        let mut section = section_entries("logging", Some(value));

        for (name, entry) in section_entries("logging.handlers", section.remove("handlers")) {
            match serde_json::from_value::<HandlerConfig>(entry) {
                Ok(handler) => {
                    logging.handlers.insert(name, handler);
                }
                Err(e) => {
                    logging.invalid_handlers.insert(name, e.to_string());
                }
            }
        }

        for (name, entry) in section_entries("logging.loggers", section.remove("loggers")) {
            match serde_json::from_value::<LoggerConfig>(entry) {
                Ok(logger) => {
                    logging.loggers.insert(name, logger);
                }
                Err(e) => warn!("Ignoring logger {}: {}", name, e),
            }
        }

        logging
    }

    /// Make relative handler filenames relative to `base_dir`
    pub fn resolve_paths(&mut self, base_dir: &Path) {
        for handler in self.handlers.values_mut() {
            if let Some(filename) = &handler.filename {
                if filename.is_relative() {
                    handler.filename = Some(base_dir.join(filename));
                }
            }
        }
    }
}

/// Configuration file structure (loglens.toml/yaml/json)
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LensConfig {
    /// Accept log records posted by browsers
    #[serde(default)]
    pub allow_client_logging: bool,
    /// Return at most this many trailing bytes of a log file
    pub max_read_bytes: Option<u64>,
    /// Custom handler classes to treat as file-backed
    #[serde(default)]
    pub file_backed_kinds: Vec<String>,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub users: Vec<UserConfig>,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl LensConfig {
    /// Load config from file, automatically detecting format from extension
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(Error::ConfigNotFound(path.to_path_buf()));
        }

        let format = ConfigFormat::from_path(path).ok_or_else(|| {
            Error::ConfigError(format!(
                "Unsupported config file extension: {}. Expected .toml, .yaml, .yml, or .json",
                path.display()
            ))
        })?;

        let content = std::fs::read_to_string(path)?;
        let mut config = Self::parse(&content, format)?;

        let base_dir = path.parent().unwrap_or_else(|| Path::new("."));
        config.logging.resolve_paths(base_dir);

        Ok(config)
    }

    /// Parse config content with specified format
    pub fn parse(content: &str, format: ConfigFormat) -> Result<Self> {
        match format {
            ConfigFormat::Toml => Ok(toml::from_str(content)?),
            ConfigFormat::Yaml => Ok(serde_yaml::from_str(content)?),
            ConfigFormat::Json => Ok(serde_json::from_str(content)?),
        }
    }

    /// Find and load config file from a directory
    pub fn find_and_load(dir: &Path) -> Result<(Self, PathBuf)> {
        for name in CONFIG_FILES {
            let path = dir.join(name);
            if path.exists() {
                let config = Self::load(&path)?;
                return Ok((config, path));
            }
        }
        Err(Error::ConfigError(format!(
            "No config file found in {}. Expected one of: {:?}",
            dir.display(),
            CONFIG_FILES
        )))
    }

    pub fn find_user(&self, username: &str) -> Option<&UserConfig> {
        self.users.iter().find(|u| u.username == username)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_config_format_detection() {
        assert_eq!(ConfigFormat::from_extension("toml"), Some(ConfigFormat::Toml));
        assert_eq!(ConfigFormat::from_extension("yaml"), Some(ConfigFormat::Yaml));
        assert_eq!(ConfigFormat::from_extension("yml"), Some(ConfigFormat::Yaml));
        assert_eq!(ConfigFormat::from_extension("json"), Some(ConfigFormat::Json));
        assert_eq!(ConfigFormat::from_extension("txt"), None);
    }

    #[test]
    fn test_config_parse_toml() {
        let config_content = r#"
allow_client_logging = true
file_backed_kinds = ["demo.handler.CustomFileHandler"]

[server]
bind = "0.0.0.0:9000"

[[users]]
username = "admin"
password_sha256 = "8c6976e5b5410415bde908bd4dee15dfb167a9c873fc4bb8a81f6f2ab448a918"
superuser = true

[logging.handlers.client]
class = "logging.handlers.RotatingFileHandler"
filename = "logs/client.log"
level = "DEBUG"

[logging.handlers.console]
class = "logging.StreamHandler"

[logging.loggers."loglens::client"]
handlers = ["client"]
level = "DEBUG"
"#;
        let mut file = NamedTempFile::with_suffix(".toml").unwrap();
        file.write_all(config_content.as_bytes()).unwrap();

        let config = LensConfig::load(file.path()).unwrap();
        assert!(config.allow_client_logging);
        assert_eq!(config.file_backed_kinds, vec!["demo.handler.CustomFileHandler"]);
        assert_eq!(config.server.bind, "0.0.0.0:9000");
        assert_eq!(config.server.mount_path, DEFAULT_MOUNT_PATH);
        assert!(config.find_user("admin").unwrap().superuser);
        assert_eq!(config.logging.handlers.len(), 2);

        // Relative filenames are anchored at the config file's directory
        let client = &config.logging.handlers["client"];
        let expected = file.path().parent().unwrap().join("logs/client.log");
        assert_eq!(client.filename.as_deref(), Some(expected.as_path()));

        let logger = &config.logging.loggers["loglens::client"];
        assert_eq!(logger.handlers, vec!["client"]);
    }

    #[test]
    fn test_config_parse_yaml() {
        let config_content = r#"
max_read_bytes: 4096
logging:
  handlers:
    django:
      class: logging.FileHandler
      filename: /var/log/app/django.log
      level: WARNING
"#;
        let mut file = NamedTempFile::with_suffix(".yaml").unwrap();
        file.write_all(config_content.as_bytes()).unwrap();

        let config = LensConfig::load(file.path()).unwrap();
        assert!(!config.allow_client_logging);
        assert_eq!(config.max_read_bytes, Some(4096));
        let django = &config.logging.handlers["django"];
        assert_eq!(django.filename, Some(PathBuf::from("/var/log/app/django.log")));
        assert_eq!(django.level.as_deref(), Some("WARNING"));
    }

    #[test]
    fn test_config_parse_json() {
        let config_content = r#"
{
    "allow_client_logging": false,
    "logging": {
        "handlers": {
            "misc": {"class": "timed_rotating_file", "filename": "/tmp/misc.log"}
        }
    }
}
"#;
        let config = LensConfig::parse(config_content, ConfigFormat::Json).unwrap();
        assert_eq!(config.logging.handlers.len(), 1);
        assert!(config.logging.loggers.is_empty());
    }

    #[test]
    fn test_config_defaults() {
        let config = LensConfig::parse("", ConfigFormat::Toml).unwrap();
        assert!(!config.allow_client_logging);
        assert!(config.max_read_bytes.is_none());
        assert!(config.logging.handlers.is_empty());
        assert!(config.users.is_empty());
        assert_eq!(config.server.bind, DEFAULT_BIND);
        assert_eq!(config.server.session_ttl_secs, DEFAULT_SESSION_TTL_SECS);
    }

    #[test]
    fn test_handler_entry_without_class_still_loads() {
        let config_content = r#"
[logging.handlers.broken]
filename = "/tmp/broken.log"
"#;
        let config = LensConfig::parse(config_content, ConfigFormat::Toml).unwrap();
        assert!(config.logging.handlers["broken"].class.is_none());
    }

    #[test]
    fn test_mistyped_handler_entry_does_not_fail_the_file() {
        let config_content = r#"
[logging.handlers.good]
class = "logging.FileHandler"
filename = "/tmp/good.log"

[logging.handlers.bad]
class = 5

[logging.handlers.loud]
class = "file"
filename = "/tmp/loud.log"
level = 10

[logging.loggers.root]
handlers = ["good"]

[logging.loggers.broken]
handlers = "good"
"#;
        let config = LensConfig::parse(config_content, ConfigFormat::Toml).unwrap();
        let logging = &config.logging;
        assert_eq!(logging.handlers.keys().collect::<Vec<_>>(), vec!["good"]);
        assert!(logging.invalid_handlers.contains_key("bad"));
        assert!(logging.invalid_handlers.contains_key("loud"));
        assert_eq!(logging.loggers.keys().collect::<Vec<_>>(), vec!["root"]);
    }

    #[test]
    fn test_logging_section_of_wrong_shape_is_ignored() {
        let config = LensConfig::parse(
            "allow_client_logging = true\n[logging]\nhandlers = [\"a\", \"b\"]\n",
            ConfigFormat::Toml,
        )
        .unwrap();
        assert!(config.allow_client_logging);
        assert!(config.logging.handlers.is_empty());
        assert!(config.logging.invalid_handlers.is_empty());

        let config = LensConfig::parse("logging: 3\n", ConfigFormat::Yaml).unwrap();
        assert!(config.logging.handlers.is_empty());

        let config = LensConfig::parse(r#"{"logging": null}"#, ConfigFormat::Json).unwrap();
        assert!(config.logging.loggers.is_empty());
    }

    #[test]
    fn test_config_not_found() {
        let result = LensConfig::load(Path::new("/nonexistent/loglens.toml"));
        assert!(matches!(result, Err(Error::ConfigNotFound(_))));
    }

    #[test]
    fn test_unsupported_extension() {
        let file = NamedTempFile::with_suffix(".ini").unwrap();
        let result = LensConfig::load(file.path());
        assert!(matches!(result, Err(Error::ConfigError(_))));
    }

    #[test]
    fn test_find_and_load() {
        let dir = tempfile::TempDir::new().unwrap();
        std::fs::write(dir.path().join("loglens.yml"), "allow_client_logging: true\n").unwrap();

        let (config, path) = LensConfig::find_and_load(dir.path()).unwrap();
        assert!(config.allow_client_logging);
        assert!(path.ends_with("loglens.yml"));
    }
}
