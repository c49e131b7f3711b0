//! Handler registry
//!
//! Catalog of configured handlers plus the set of kinds that count as
//! file-backed. Built once from the `logging` configuration section at
//! startup and shared read-only afterwards. Registering an additional
//! file-backed kind is the only mutation and is safe to perform at any
//! time, though callers are expected to finish registration before serving
//! requests.

use parking_lot::RwLock;
use std::collections::{BTreeMap, HashSet};
use std::path::PathBuf;
use tracing::{debug, warn};

use crate::config::{HandlerConfig, LoggingConfig};
use crate::constants::BUILTIN_FILE_KINDS;
use crate::error::{Error, Result};
use crate::types::{HandlerDescriptor, HandlerKind, Level};

/// A handler entry as configured; path visibility is decided at resolve time
#[derive(Debug, Clone)]
struct HandlerEntry {
    kind: HandlerKind,
    filename: Option<PathBuf>,
    min_level: Level,
}

impl HandlerEntry {
    fn from_config(config: &HandlerConfig) -> std::result::Result<Self, String> {
        let class = config
            .class
            .as_deref()
            .filter(|c| !c.trim().is_empty())
            .ok_or_else(|| "missing handler class".to_string())?;

        let min_level = match &config.level {
            Some(level) => level.parse::<Level>().map_err(|e| e.to_string())?,
            None => Level::default(),
        };

        Ok(Self {
            kind: HandlerKind::parse(class),
            filename: config.filename.clone(),
            min_level,
        })
    }
}

/// Registry of configured handlers
pub struct HandlerRegistry {
    handlers: BTreeMap<String, HandlerEntry>,
    /// Entries that could not be understood, with the reason
    misconfigured: BTreeMap<String, String>,
    file_backed: RwLock<HashSet<HandlerKind>>,
}

impl Default for HandlerRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl HandlerRegistry {
    /// Create an empty registry knowing only the built-in file kinds
    pub fn new() -> Self {
        let file_backed = BUILTIN_FILE_KINDS
            .iter()
            .map(|k| HandlerKind::parse(k))
            .collect();

        Self {
            handlers: BTreeMap::new(),
            misconfigured: BTreeMap::new(),
            file_backed: RwLock::new(file_backed),
        }
    }

    /// Build the registry from the `logging` configuration section
    pub fn from_config(logging: &LoggingConfig) -> Self {
        let mut registry = Self::new();

        for (name, config) in &logging.handlers {
            match HandlerEntry::from_config(config) {
                Ok(entry) => {
                    debug!("Registered handler {} ({})", name, entry.kind);
                    registry.handlers.insert(name.clone(), entry);
                }
                Err(reason) => {
                    warn!("Ignoring handler {}: {}", name, reason);
                    registry.misconfigured.insert(name.clone(), reason);
                }
            }
        }

        for (name, reason) in &logging.invalid_handlers {
            warn!("Ignoring handler {}: {}", name, reason);
            registry.misconfigured.insert(name.clone(), reason.clone());
        }

        registry
    }

    /// Treat `kind` as file-backed from now on
    ///
    /// Returns `true` if the kind was not registered before. Kinds are
    /// never removed.
    pub fn register_file_backed_kind(&self, kind: &str) -> bool {
        let kind = HandlerKind::parse(kind);
        let inserted = self.file_backed.write().insert(kind.clone());
        if inserted {
            debug!("Registered file-backed handler kind {}", kind);
        }
        inserted
    }

    pub fn is_file_backed(&self, kind: &HandlerKind) -> bool {
        self.file_backed.read().contains(kind)
    }

    /// Currently registered file-backed kinds, sorted
    pub fn file_backed_kinds(&self) -> Vec<String> {
        let mut kinds: Vec<String> = self
            .file_backed
            .read()
            .iter()
            .map(|k| k.as_str().to_string())
            .collect();
        kinds.sort();
        kinds
    }

    /// Map of handler name to file path for every file-backed handler
    pub fn list_file_backed_handlers(&self) -> BTreeMap<String, PathBuf> {
        let file_backed = self.file_backed.read();
        self.handlers
            .iter()
            .filter(|(_, entry)| file_backed.contains(&entry.kind))
            .filter_map(|(name, entry)| {
                entry
                    .filename
                    .as_ref()
                    .map(|path| (name.clone(), path.clone()))
            })
            .collect()
    }

    /// Look up a handler by exact name
    pub fn resolve(&self, name: &str) -> Result<HandlerDescriptor> {
        if let Some(reason) = self.misconfigured.get(name) {
            return Err(Error::misconfigured(name, reason.clone()));
        }

        let entry = self
            .handlers
            .get(name)
            .ok_or_else(|| Error::NotRegistered(name.to_string()))?;

        let path = if self.is_file_backed(&entry.kind) {
            match &entry.filename {
                Some(path) => Some(path.clone()),
                None => return Err(Error::misconfigured(name, "file handler has no filename")),
            }
        } else {
            None
        };

        Ok(HandlerDescriptor {
            name: name.to_string(),
            kind: entry.kind.clone(),
            path,
            min_level: entry.min_level,
        })
    }

    /// Resolve a handler name straight to its file path
    pub fn resolve_path(&self, name: &str) -> Result<PathBuf> {
        self.resolve(name)?
            .path
            .ok_or_else(|| Error::NotFileBacked(name.to_string()))
    }

    /// Every well-formed handler, file-backed or not
    pub fn descriptors(&self) -> Vec<HandlerDescriptor> {
        self.handlers
            .keys()
            .filter_map(|name| self.resolve(name).ok())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn handler(class: &str, filename: Option<&str>, level: Option<&str>) -> HandlerConfig {
        HandlerConfig {
            class: Some(class.to_string()),
            filename: filename.map(PathBuf::from),
            level: level.map(str::to_string),
        }
    }

    fn sample_config() -> LoggingConfig {
        let mut logging = LoggingConfig::default();
        logging.handlers.insert(
            "client".into(),
            handler("RotatingFile", Some("/logs/client.log"), Some("DEBUG")),
        );
        logging
            .handlers
            .insert("console".into(), handler("Stream", None, None));
        logging
    }

    #[test]
    fn test_list_excludes_non_file_handlers() {
        let registry = HandlerRegistry::from_config(&sample_config());
        let paths = registry.list_file_backed_handlers();

        assert_eq!(paths.len(), 1);
        assert_eq!(paths["client"], PathBuf::from("/logs/client.log"));
        assert!(!paths.contains_key("console"));
    }

    #[test]
    fn test_empty_config_lists_nothing() {
        let registry = HandlerRegistry::from_config(&LoggingConfig::default());
        assert!(registry.is_empty());
        assert!(registry.list_file_backed_handlers().is_empty());
    }

    #[test]
    fn test_resolve() {
        let registry = HandlerRegistry::from_config(&sample_config());

        let client = registry.resolve("client").unwrap();
        assert_eq!(client.kind, HandlerKind::RotatingFile);
        assert_eq!(client.path, Some(PathBuf::from("/logs/client.log")));
        assert_eq!(client.min_level, Level::Debug);

        let console = registry.resolve("console").unwrap();
        assert!(console.path.is_none());
        assert!(!console.is_file_backed());

        assert!(matches!(registry.resolve("missing"), Err(Error::NotRegistered(_))));
        // Lookup is exact
        assert!(matches!(registry.resolve("Client"), Err(Error::NotRegistered(_))));
    }

    #[test]
    fn test_resolve_path() {
        let registry = HandlerRegistry::from_config(&sample_config());
        assert_eq!(
            registry.resolve_path("client").unwrap(),
            PathBuf::from("/logs/client.log")
        );
        assert!(matches!(
            registry.resolve_path("console"),
            Err(Error::NotFileBacked(_))
        ));
    }

    #[test]
    fn test_custom_kind_registration() {
        let mut logging = sample_config();
        logging.handlers.insert(
            "requests".into(),
            handler("demo.handler.CustomFileHandler", Some("/logs/requests.log"), None),
        );
        let registry = HandlerRegistry::from_config(&logging);

        // Unknown kinds are not file-backed until registered
        assert!(!registry.list_file_backed_handlers().contains_key("requests"));
        assert!(registry.resolve("requests").unwrap().path.is_none());

        assert!(registry.register_file_backed_kind("demo.handler.CustomFileHandler"));
        assert!(!registry.register_file_backed_kind("demo.handler.CustomFileHandler"));

        let paths = registry.list_file_backed_handlers();
        assert_eq!(paths["requests"], PathBuf::from("/logs/requests.log"));
        assert_eq!(
            registry.resolve("requests").unwrap().path,
            Some(PathBuf::from("/logs/requests.log"))
        );
        assert_eq!(registry.file_backed_kinds().len(), 5);
    }

    #[test]
    fn test_builtin_kinds_registered_once() {
        let registry = HandlerRegistry::new();
        assert!(!registry.register_file_backed_kind("logging.FileHandler"));
        assert!(registry.is_file_backed(&HandlerKind::WatchedFile));
        assert!(!registry.is_file_backed(&HandlerKind::Stream));
    }

    #[test]
    fn test_misconfigured_entries() {
        let mut logging = sample_config();
        logging.handlers.insert(
            "no_class".into(),
            HandlerConfig {
                class: None,
                filename: Some(PathBuf::from("/logs/x.log")),
                level: None,
            },
        );
        logging
            .handlers
            .insert("bad_level".into(), handler("file", Some("/logs/y.log"), Some("LOUD")));
        logging
            .handlers
            .insert("no_file".into(), handler("file", None, None));

        let registry = HandlerRegistry::from_config(&logging);
        assert!(matches!(registry.resolve("no_class"), Err(Error::Misconfigured { .. })));
        assert!(matches!(registry.resolve("bad_level"), Err(Error::Misconfigured { .. })));
        assert!(matches!(registry.resolve("no_file"), Err(Error::Misconfigured { .. })));

        // Broken entries never show up in the listing
        let paths = registry.list_file_backed_handlers();
        assert_eq!(paths.keys().collect::<Vec<_>>(), vec!["client"]);
    }

    #[test]
    fn test_unparseable_entry_is_misconfigured() {
        let config = crate::config::LensConfig::parse(
            r#"
[logging.handlers.good]
class = "logging.FileHandler"
filename = "/tmp/good.log"

[logging.handlers.bad]
class = 5
"#,
            crate::config::ConfigFormat::Toml,
        )
        .unwrap();
        let registry = HandlerRegistry::from_config(&config.logging);

        assert!(matches!(registry.resolve("bad"), Err(Error::Misconfigured { .. })));
        assert_eq!(
            registry.list_file_backed_handlers()["good"],
            PathBuf::from("/tmp/good.log")
        );
    }

    #[test]
    fn test_descriptor_path_matches_kind() {
        let registry = HandlerRegistry::from_config(&sample_config());
        for descriptor in registry.descriptors() {
            assert_eq!(
                descriptor.path.is_some(),
                registry.is_file_backed(&descriptor.kind),
                "{}",
                descriptor.name
            );
        }
    }
}
