//! Client log ingestion
//!
//! Browsers post `{"log_message" | "error_message": string, "severity": string}`.
//! Accepted records are forwarded to a [`ClientSink`]; in production that is
//! [`TracingSink`], which emits them on the client log target so that the
//! configured host sinks pick them up like any other record.

use loglens_core::constants::CLIENT_LOG_TARGET;
use loglens_core::Level;
use serde::Deserialize;
use std::sync::Arc;
use tracing::debug;

/// Destination for accepted client records
pub trait ClientSink: Send + Sync {
    fn record(&self, level: Level, message: &str);
}

/// Emits client records as tracing events on [`CLIENT_LOG_TARGET`]
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl ClientSink for TracingSink {
    fn record(&self, level: Level, message: &str) {
        // Field name must stay in sync with format::SEVERITY_FIELD
        let severity = level.as_str();
        match level {
            Level::Debug => {
                tracing::debug!(target: CLIENT_LOG_TARGET, severity, "{}", message)
            }
            Level::Info => tracing::info!(target: CLIENT_LOG_TARGET, severity, "{}", message),
            Level::Warning => tracing::warn!(target: CLIENT_LOG_TARGET, severity, "{}", message),
            Level::Error | Level::Critical => {
                tracing::error!(target: CLIENT_LOG_TARGET, severity, "{}", message)
            }
        }
    }
}

/// Body of a client log submission
#[derive(Debug, Clone, Deserialize)]
pub struct ClientLogPayload {
    #[serde(alias = "error_message")]
    pub log_message: String,
    pub severity: String,
}

/// Map a client-supplied severity name onto a level
///
/// Unknown names are recorded as errors rather than dropped.
pub fn client_severity(severity: &str) -> Level {
    match severity {
        "DEBUG" => Level::Debug,
        "INFO" => Level::Info,
        "WARNING" => Level::Warning,
        "ERROR" => Level::Error,
        "CRITICAL" | "ASSERTION_FAILED" | "ASSERTION FAILED (CRITICAL)" => Level::Critical,
        _ => Level::Error,
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RejectReason {
    Disabled,
    Malformed(String),
}

impl std::fmt::Display for RejectReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RejectReason::Disabled => write!(f, "Client logger is disabled."),
            RejectReason::Malformed(reason) => write!(f, "Malformed client log: {}", reason),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Submission {
    Accepted(Level),
    Rejected(RejectReason),
}

/// Validates client records and forwards them to the sink
#[derive(Clone)]
pub struct ClientLogIngest {
    enabled: bool,
    sink: Arc<dyn ClientSink>,
}

impl ClientLogIngest {
    pub fn new(enabled: bool, sink: Arc<dyn ClientSink>) -> Self {
        Self { enabled, sink }
    }

    /// Ingest that forwards to tracing
    pub fn tracing(enabled: bool) -> Self {
        Self::new(enabled, Arc::new(TracingSink))
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn submit(&self, severity: &str, message: &str) -> Submission {
        if !self.enabled {
            return Submission::Rejected(RejectReason::Disabled);
        }
        let level = client_severity(severity);
        self.sink.record(level, message);
        Submission::Accepted(level)
    }

    /// Parse a raw JSON body and submit it
    pub fn submit_payload(&self, body: &[u8]) -> Submission {
        if !self.enabled {
            return Submission::Rejected(RejectReason::Disabled);
        }
        match serde_json::from_slice::<ClientLogPayload>(body) {
            Ok(payload) => self.submit(&payload.severity, &payload.log_message),
            Err(e) => {
                debug!("Rejected client log payload: {}", e);
                Submission::Rejected(RejectReason::Malformed(e.to_string()))
            }
        }
    }
}
