//! Level-prefixed log line format
//!
//! Lines written to handler files look like
//!
//! ```text
//! [LVL:30]2026-01-05 14:02:11,204 WARNING: disk almost full
//! ```
//!
//! The numeric prefix lets the viewer colorize and filter lines without
//! knowing the rest of the layout.

use chrono::{DateTime, Local};
use loglens_core::Level;
use std::fmt;
use tracing::field::{Field, Visit};
use tracing::{Event, Subscriber};
use tracing_subscriber::fmt::format::Writer;
use tracing_subscriber::fmt::{FmtContext, FormatEvent, FormatFields};
use tracing_subscriber::registry::LookupSpan;

/// Event field that overrides the tracing level in the written line
pub const SEVERITY_FIELD: &str = "severity";

/// Map a tracing level onto the five-level scale
pub fn level_from_tracing(level: &tracing::Level) -> Level {
    match *level {
        tracing::Level::TRACE | tracing::Level::DEBUG => Level::Debug,
        tracing::Level::INFO => Level::Info,
        tracing::Level::WARN => Level::Warning,
        tracing::Level::ERROR => Level::Error,
    }
}

/// Render one log line (without trailing newline)
pub fn format_line(level: Level, at: &DateTime<Local>, message: &str) -> String {
    format!(
        "[LVL:{}]{} {}: {}",
        level.levelno(),
        at.format("%Y-%m-%d %H:%M:%S,%3f"),
        level,
        message
    )
}

/// Split a formatted line into its level number and the remainder
pub fn parse_level_prefix(line: &str) -> Option<(u8, &str)> {
    let rest = line.strip_prefix("[LVL:")?;
    let end = rest.find(']')?;
    let levelno = rest[..end].parse().ok()?;
    Some((levelno, &rest[end + 1..]))
}

#[derive(Default)]
struct RecordVisitor {
    message: String,
    severity: Option<Level>,
    fields: Vec<(&'static str, String)>,
}

impl Visit for RecordVisitor {
    fn record_str(&mut self, field: &Field, value: &str) {
        match field.name() {
            SEVERITY_FIELD => self.severity = value.parse().ok(),
            "message" => self.message = value.to_string(),
            name => self.fields.push((name, value.to_string())),
        }
    }

    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        match field.name() {
            "message" => self.message = format!("{:?}", value),
            SEVERITY_FIELD => self.severity = format!("{:?}", value).trim_matches('"').parse().ok(),
            name => self.fields.push((name, format!("{:?}", value))),
        }
    }
}

/// `tracing-subscriber` event formatter producing level-prefixed lines
///
/// Level filters only see the tracing level, which has no CRITICAL and can
/// be overridden by the `severity` field. The formatter therefore applies
/// the configured thresholds a second time, on the level it is about to
/// write, and writes nothing for records below them.
#[derive(Debug, Clone, Default)]
pub struct LensFormat {
    thresholds: Vec<(String, Level)>,
    default_threshold: Option<Level>,
}

impl LensFormat {
    pub fn new() -> Self {
        Self::default()
    }

    /// Minimum level for targets starting with `target`
    pub fn with_threshold(mut self, target: impl Into<String>, level: Level) -> Self {
        self.thresholds.push((target.into(), level));
        self
    }

    /// Minimum level for targets no other threshold matches
    pub fn with_default_threshold(mut self, level: Level) -> Self {
        self.default_threshold = Some(level);
        self
    }

    /// Threshold applying to `target`; the longest matching prefix wins
    pub fn threshold_for(&self, target: &str) -> Level {
        self.thresholds
            .iter()
            .filter(|(prefix, _)| target.starts_with(prefix.as_str()))
            .max_by_key(|(prefix, _)| prefix.len())
            .map(|(_, level)| *level)
            .or(self.default_threshold)
            .unwrap_or(Level::Debug)
    }
}

impl<S, N> FormatEvent<S, N> for LensFormat
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        _ctx: &FmtContext<'_, S, N>,
        mut writer: Writer<'_>,
        event: &Event<'_>,
    ) -> fmt::Result {
        let mut visitor = RecordVisitor::default();
        event.record(&mut visitor);

        let level = visitor
            .severity
            .unwrap_or_else(|| level_from_tracing(event.metadata().level()));
        if level < self.threshold_for(event.metadata().target()) {
            return Ok(());
        }
        write!(writer, "{}", format_line(level, &Local::now(), &visitor.message))?;
        for (name, value) in &visitor.fields {
            write!(writer, " {}={}", name, value)?;
        }
        writeln!(writer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_format_line() {
        let at = Local.with_ymd_and_hms(2026, 1, 5, 14, 2, 11).unwrap();
        let line = format_line(Level::Warning, &at, "disk almost full");
        assert_eq!(line, "[LVL:30]2026-01-05 14:02:11,000 WARNING: disk almost full");
    }

    #[test]
    fn test_parse_level_prefix() {
        let at = Local::now();
        let line = format_line(Level::Critical, &at, "boom");
        let (levelno, rest) = parse_level_prefix(&line).unwrap();
        assert_eq!(levelno, 50);
        assert!(rest.ends_with("CRITICAL: boom"));

        assert!(parse_level_prefix("plain line").is_none());
        assert!(parse_level_prefix("[LVL:abc]x").is_none());
    }

    #[test]
    fn test_level_from_tracing() {
        assert_eq!(level_from_tracing(&tracing::Level::TRACE), Level::Debug);
        assert_eq!(level_from_tracing(&tracing::Level::WARN), Level::Warning);
        assert_eq!(level_from_tracing(&tracing::Level::ERROR), Level::Error);
    }

    #[test]
    fn test_threshold_for_longest_prefix() {
        let format = LensFormat::new()
            .with_default_threshold(Level::Info)
            .with_threshold("app", Level::Warning)
            .with_threshold("app::audit", Level::Critical);

        assert_eq!(format.threshold_for("app::audit::trail"), Level::Critical);
        assert_eq!(format.threshold_for("app::requests"), Level::Warning);
        assert_eq!(format.threshold_for("other"), Level::Info);
        assert_eq!(LensFormat::new().threshold_for("other"), Level::Debug);
    }
}
