//! Core types for LogLens

use serde::{Serialize, Serializer};
use std::path::PathBuf;
use std::str::FromStr;

use crate::error::{Error, Result};

/// Severity of a log record, ordered from least to most severe
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Level {
    #[default]
    Debug,
    Info,
    Warning,
    Error,
    Critical,
}

impl Level {
    pub const ALL: [Level; 5] = [
        Level::Debug,
        Level::Info,
        Level::Warning,
        Level::Error,
        Level::Critical,
    ];

    /// Numeric level as written into the `[LVL:n]` line prefix
    pub fn levelno(&self) -> u8 {
        match self {
            Level::Debug => 10,
            Level::Info => 20,
            Level::Warning => 30,
            Level::Error => 40,
            Level::Critical => 50,
        }
    }

    /// Level for a `[LVL:n]` number; values between the named levels round down
    pub fn from_levelno(levelno: u8) -> Level {
        match levelno {
            50..=u8::MAX => Level::Critical,
            40..=49 => Level::Error,
            30..=39 => Level::Warning,
            20..=29 => Level::Info,
            _ => Level::Debug,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Level::Debug => "DEBUG",
            Level::Info => "INFO",
            Level::Warning => "WARNING",
            Level::Error => "ERROR",
            Level::Critical => "CRITICAL",
        }
    }
}

impl FromStr for Level {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_uppercase().as_str() {
            "DEBUG" => Ok(Level::Debug),
            "INFO" => Ok(Level::Info),
            "WARNING" | "WARN" => Ok(Level::Warning),
            "ERROR" => Ok(Level::Error),
            "CRITICAL" | "FATAL" => Ok(Level::Critical),
            _ => Err(Error::InvalidLevel(s.to_string())),
        }
    }
}

impl std::fmt::Display for Level {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// The implementation behind a configured handler
///
/// Configuration may name a kind either by its short name (`rotating_file`,
/// `RotatingFile`) or by the dotted class name used in Python-style logging
/// dictionaries (`logging.handlers.RotatingFileHandler`). Anything that is
/// not recognized is kept verbatim as a [`HandlerKind::Custom`] kind, which
/// only counts as file-backed once it has been registered.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum HandlerKind {
    File,
    RotatingFile,
    TimedRotatingFile,
    WatchedFile,
    Stream,
    Null,
    Custom(String),
}

impl HandlerKind {
    /// Parse a kind from a configured class name; never fails
    pub fn parse(class: &str) -> Self {
        let class = class.trim();
        let short = class
            .strip_prefix("logging.handlers.")
            .or_else(|| class.strip_prefix("logging."))
            .unwrap_or(class);
        let short = short.strip_suffix("Handler").unwrap_or(short);
        let normalized: String = short
            .chars()
            .filter(|c| *c != '_' && *c != '-')
            .flat_map(char::to_lowercase)
            .collect();

        match normalized.as_str() {
            "file" => HandlerKind::File,
            "rotatingfile" => HandlerKind::RotatingFile,
            "timedrotatingfile" => HandlerKind::TimedRotatingFile,
            "watchedfile" => HandlerKind::WatchedFile,
            "stream" | "console" | "stdout" | "stderr" => HandlerKind::Stream,
            "null" => HandlerKind::Null,
            _ => HandlerKind::Custom(class.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            HandlerKind::File => "file",
            HandlerKind::RotatingFile => "rotating_file",
            HandlerKind::TimedRotatingFile => "timed_rotating_file",
            HandlerKind::WatchedFile => "watched_file",
            HandlerKind::Stream => "stream",
            HandlerKind::Null => "null",
            HandlerKind::Custom(name) => name,
        }
    }
}

impl std::fmt::Display for HandlerKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl Serialize for HandlerKind {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// One configured logging sink as seen through the registry
///
/// `path` is set exactly when `kind` is file-backed at the time the
/// descriptor was resolved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HandlerDescriptor {
    pub name: String,
    pub kind: HandlerKind,
    pub path: Option<PathBuf>,
    pub min_level: Level,
}

impl HandlerDescriptor {
    pub fn is_file_backed(&self) -> bool {
        self.path.is_some()
    }
}

/// Who is calling, as established by the authentication layer
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CallerIdentity {
    pub name: Option<String>,
    pub authenticated: bool,
    pub privileged: bool,
}

impl CallerIdentity {
    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn user(name: impl Into<String>, privileged: bool) -> Self {
        Self {
            name: Some(name.into()),
            authenticated: true,
            privileged,
        }
    }

    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or("anonymous")
    }
}

/// Outcome of a file operation on a resolved path
#[derive(Debug, Clone, PartialEq)]
pub enum FileAccessResult {
    /// Whole (or, with a read cap, trailing) file content
    Content {
        text: String,
        last_modified: f64,
        truncated: bool,
    },
    /// Modification time only
    Modified { last_modified: f64 },
    Cleared,
    NotFound { requested_path: PathBuf },
    Misconfigured { reason: String },
}

impl FileAccessResult {
    pub fn not_found(path: impl Into<PathBuf>) -> Self {
        FileAccessResult::NotFound {
            requested_path: path.into(),
        }
    }

    pub fn misconfigured(reason: impl Into<String>) -> Self {
        FileAccessResult::Misconfigured {
            reason: reason.into(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, FileAccessResult::NotFound { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_ordering() {
        assert!(Level::Debug < Level::Info);
        assert!(Level::Info < Level::Warning);
        assert!(Level::Warning < Level::Error);
        assert!(Level::Error < Level::Critical);
    }

    #[test]
    fn test_level_from_str() {
        assert_eq!("warning".parse::<Level>().unwrap(), Level::Warning);
        assert_eq!("WARN".parse::<Level>().unwrap(), Level::Warning);
        assert_eq!("CRITICAL".parse::<Level>().unwrap(), Level::Critical);
        assert!("TRACE".parse::<Level>().is_err());
    }

    #[test]
    fn test_levelno() {
        let numbers: Vec<u8> = Level::ALL.iter().map(Level::levelno).collect();
        assert_eq!(numbers, vec![10, 20, 30, 40, 50]);
        for level in Level::ALL {
            assert_eq!(Level::from_levelno(level.levelno()), level);
        }
        assert_eq!(Level::from_levelno(35), Level::Warning);
        assert_eq!(Level::from_levelno(0), Level::Debug);
    }

    #[test]
    fn test_handler_kind_parse() {
        assert_eq!(HandlerKind::parse("logging.FileHandler"), HandlerKind::File);
        assert_eq!(
            HandlerKind::parse("logging.handlers.RotatingFileHandler"),
            HandlerKind::RotatingFile
        );
        assert_eq!(
            HandlerKind::parse("logging.handlers.TimedRotatingFileHandler"),
            HandlerKind::TimedRotatingFile
        );
        assert_eq!(HandlerKind::parse("watched_file"), HandlerKind::WatchedFile);
        assert_eq!(HandlerKind::parse("RotatingFile"), HandlerKind::RotatingFile);
        assert_eq!(HandlerKind::parse("logging.StreamHandler"), HandlerKind::Stream);
        assert_eq!(HandlerKind::parse("Stream"), HandlerKind::Stream);
        assert_eq!(
            HandlerKind::parse("demo.handler.CustomFileHandler"),
            HandlerKind::Custom("demo.handler.CustomFileHandler".to_string())
        );
    }

    #[test]
    fn test_handler_kind_serializes_as_str() {
        let json = serde_json::to_string(&HandlerKind::TimedRotatingFile).unwrap();
        assert_eq!(json, "\"timed_rotating_file\"");
    }

    #[test]
    fn test_caller_identity() {
        let anon = CallerIdentity::anonymous();
        assert!(!anon.authenticated);
        assert!(!anon.privileged);
        assert_eq!(anon.display_name(), "anonymous");

        let admin = CallerIdentity::user("admin", true);
        assert!(admin.authenticated && admin.privileged);
        assert_eq!(admin.display_name(), "admin");
    }
}
