//! Show command implementation

use anyhow::{bail, Result};
use loglens_core::{FileAccessResult, Level};
use loglens_logs::{parse_level_prefix, FileAccess};
use std::path::Path;

use crate::cli::ShowArgs;
use crate::output::{format_level, print_info};

/// Lines of `text` whose record is at or above `min_level`, prefix removed
///
/// Lines without a `[LVL:n]` prefix belong to the record above them, so a
/// traceback is kept or dropped together with its first line. Lines before
/// the first prefixed line are treated as DEBUG.
pub fn filter_records(text: &str, min_level: Level) -> Vec<(Level, &str)> {
    let mut current = Level::Debug;
    text.lines()
        .filter_map(|line| {
            let body = match parse_level_prefix(line) {
                Some((levelno, rest)) => {
                    current = Level::from_levelno(levelno);
                    rest
                }
                None => line,
            };
            (current >= min_level).then_some((current, body))
        })
        .collect()
}

pub fn execute(config_path: Option<&Path>, args: ShowArgs) -> Result<()> {
    let (config, _) = super::load_config(config_path)?;
    let registry = super::build_registry(&config);
    let path = registry.resolve_path(&args.handler)?;

    let files = FileAccess::with_max_read_bytes(config.max_read_bytes);
    let text = match files.read_file(&path) {
        FileAccessResult::Content {
            text, truncated, ..
        } => {
            if truncated {
                print_info(&format!(
                    "Showing the last {} bytes of {}",
                    files.max_read_bytes().unwrap_or_default(),
                    path.display()
                ));
            }
            text
        }
        FileAccessResult::NotFound { requested_path } => {
            bail!("Log file {} not found", requested_path.display())
        }
        FileAccessResult::Misconfigured { reason } => bail!("Improperly configured: {}", reason),
        other => bail!("Unexpected file access result: {:?}", other),
    };

    let records = filter_records(&text, args.min_level);
    let skip = args
        .lines
        .map(|n| records.len().saturating_sub(n))
        .unwrap_or(0);
    for (level, line) in &records[skip..] {
        println!("{}", format_level(*level, line));
    }
    Ok(())
}
