//! Host log sinks built from the `logging` configuration
//!
//! Each file-backed handler that at least one logger routes to becomes a
//! `tracing-subscriber` fmt layer appending level-prefixed lines to the
//! handler's file. A logger keyed `root` (or the empty string) applies to
//! every target. Rotation is left to whatever manages the files outside
//! this process.

use loglens_core::{HandlerRegistry, Level, LoggingConfig};
use std::path::Path;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::filter::{LevelFilter, Targets};
use tracing_subscriber::{Layer, Registry};

use crate::format::LensFormat;

/// A boxed layer that can sit directly on top of the registry
pub type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync + 'static>;

/// Layers for the configured file handlers plus the handlers that were skipped
#[derive(Default)]
pub struct HostSinks {
    pub layers: Vec<BoxedLayer>,
    /// Handler names that should have had a sink, with the reason they don't
    pub skipped: Vec<(String, String)>,
    /// Handler names that received a sink
    pub installed: Vec<String>,
}

pub fn level_filter(level: Level) -> LevelFilter {
    match level {
        Level::Debug => LevelFilter::DEBUG,
        Level::Info => LevelFilter::INFO,
        Level::Warning => LevelFilter::WARN,
        Level::Error | Level::Critical => LevelFilter::ERROR,
    }
}

fn is_root(target: &str) -> bool {
    target.is_empty() || target == "root"
}

/// Build one file layer per routed file-backed handler
pub fn build_host_sinks(registry: &HandlerRegistry, logging: &LoggingConfig) -> HostSinks {
    let mut sinks = HostSinks::default();

    for (name, path) in registry.list_file_backed_handlers() {
        let descriptor = match registry.resolve(&name) {
            Ok(descriptor) => descriptor,
            Err(e) => {
                sinks.skipped.push((name, e.to_string()));
                continue;
            }
        };

        let mut targets = Targets::new();
        let mut format = LensFormat::new();
        let mut routed = false;
        for (target, logger) in &logging.loggers {
            if !logger.handlers.iter().any(|h| *h == name) {
                continue;
            }
            let logger_level = logger
                .level
                .as_deref()
                .and_then(|l| l.parse::<Level>().ok())
                .unwrap_or_default();
            // Records must pass both the logger's and the handler's threshold
            let threshold = logger_level.max(descriptor.min_level);
            let filter = level_filter(threshold);
            if is_root(target) {
                targets = targets.with_default(filter);
                format = format.with_default_threshold(threshold);
            } else {
                targets = targets.with_target(target.clone(), filter);
                format = format.with_threshold(target.clone(), threshold);
            }
            routed = true;
        }

        if !routed {
            continue;
        }

        match open_appender(&path) {
            Ok(appender) => {
                let layer = tracing_subscriber::fmt::layer()
                    .event_format(format)
                    .with_writer(appender)
                    .with_ansi(false)
                    .with_filter(targets)
                    .boxed();
                sinks.layers.push(layer);
                sinks.installed.push(name);
            }
            Err(reason) => sinks.skipped.push((name, reason)),
        }
    }

    sinks
}

fn open_appender(path: &Path) -> Result<RollingFileAppender, String> {
    let file_name = path
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| format!("{} has no file name", path.display()))?;
    let dir = path.parent().unwrap_or_else(|| Path::new("."));

    RollingFileAppender::builder()
        .rotation(Rotation::NEVER)
        .filename_prefix(file_name)
        .build(dir)
        .map_err(|e| format!("cannot open {}: {}", path.display(), e))
}
