//! Constants and default values for LogLens

use std::path::PathBuf;

/// Directory name used under the user config dir
pub const LOGLENS_DIR: &str = "loglens";

/// Default config file names to search for (in priority order)
pub const CONFIG_FILES: &[&str] = &[
    "loglens.toml",
    "loglens.yaml",
    "loglens.yml",
    "loglens.json",
];

/// Default bind address for the web server
pub const DEFAULT_BIND: &str = "127.0.0.1:8000";

/// Default path the routes are mounted under
pub const DEFAULT_MOUNT_PATH: &str = "/log-lens";

/// Tracing target that client-submitted log records are emitted on
pub const CLIENT_LOG_TARGET: &str = "loglens::client";

/// Name of the session cookie set on login
pub const SESSION_COOKIE: &str = "loglens_session";

/// Default lifetime of a login session, in seconds
pub const DEFAULT_SESSION_TTL_SECS: u64 = 12 * 60 * 60;

/// Header carrying the API key
pub const API_KEY_HEADER: &str = "X-API-Key";

/// Response text when a parameterized request lacks `handler_name`
pub const MISSING_HANDLER_NAME: &str = "400 Bad Request: no handler name provided";

/// Kinds that are file-backed before any custom registration
pub const BUILTIN_FILE_KINDS: &[&str] = &[
    "file",
    "rotating_file",
    "timed_rotating_file",
    "watched_file",
];

/// Get the LogLens config directory (e.g. ~/.config/loglens)
pub fn config_home() -> PathBuf {
    dirs::config_dir()
        .map(|d| d.join(LOGLENS_DIR))
        .unwrap_or_else(|| PathBuf::from(LOGLENS_DIR))
}
