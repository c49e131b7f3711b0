//! File access for log files: read, stat and clear
//!
//! Every operation takes an already-resolved path and opens, uses and
//! releases the file within the call. A missing file is an expected
//! outcome and is reported as [`FileAccessResult::NotFound`]; any other I/O
//! failure becomes [`FileAccessResult::Misconfigured`] with a short reason.

use loglens_core::FileAccessResult;
use std::fs::{self, File, Metadata, OpenOptions};
use std::io::{self, Read, Seek, SeekFrom};
use std::path::Path;
use std::time::UNIX_EPOCH;
use tracing::{debug, info, warn};

/// Stateless file operations, optionally capping how much is read
#[derive(Debug, Clone, Copy, Default)]
pub struct FileAccess {
    max_read_bytes: Option<u64>,
}

impl FileAccess {
    pub fn new() -> Self {
        Self::default()
    }

    /// Limit reads to the trailing `max` bytes of a file
    pub fn with_max_read_bytes(max: Option<u64>) -> Self {
        Self {
            max_read_bytes: max,
        }
    }

    pub fn max_read_bytes(&self) -> Option<u64> {
        self.max_read_bytes
    }

    /// Read a whole log file together with its modification time
    ///
    /// With a read cap, only the last `max_read_bytes` bytes are returned,
    /// starting after the first line break inside that window so the text
    /// never begins with a partial line, and `truncated` is set.
    pub fn read_file(&self, path: &Path) -> FileAccessResult {
        match self.try_read(path) {
            Ok(result) => result,
            Err(e) => classify(path, e),
        }
    }

    fn try_read(&self, path: &Path) -> io::Result<FileAccessResult> {
        let mut file = File::open(path)?;
        let metadata = file.metadata()?;
        if metadata.is_dir() {
            return Ok(is_directory(path));
        }
        let last_modified = modified_secs(&metadata)?;
        let size = metadata.len();

        let (bytes, truncated) = match self.max_read_bytes {
            Some(max) if size > max => {
                file.seek(SeekFrom::Start(size - max))?;
                let mut buffer = Vec::with_capacity(max as usize);
                file.take(max).read_to_end(&mut buffer)?;
                // Drop the partial first line when the window contains a break
                let start = buffer
                    .iter()
                    .position(|b| *b == b'\n')
                    .map(|pos| pos + 1)
                    .filter(|start| *start < buffer.len())
                    .unwrap_or(0);
                (buffer.split_off(start), true)
            }
            _ => {
                let mut buffer = Vec::with_capacity(size as usize);
                file.read_to_end(&mut buffer)?;
                (buffer, false)
            }
        };

        if truncated {
            debug!("Read of {} capped at {} bytes", path.display(), bytes.len());
        }

        Ok(FileAccessResult::Content {
            text: String::from_utf8_lossy(&bytes).into_owned(),
            last_modified,
            truncated,
        })
    }

    /// Modification time of a log file without reading it
    pub fn stat_timestamp(&self, path: &Path) -> FileAccessResult {
        let result = fs::metadata(path).and_then(|metadata| {
            if metadata.is_dir() {
                return Ok(is_directory(path));
            }
            Ok(FileAccessResult::Modified {
                last_modified: modified_secs(&metadata)?,
            })
        });

        match result {
            Ok(result) => result,
            Err(e) => classify(path, e),
        }
    }

    /// Truncate a log file to zero length
    ///
    /// The file keeps its inode so processes following it are unaffected.
    /// A missing file is reported, never created.
    pub fn clear_file(&self, path: &Path) -> FileAccessResult {
        let result = fs::metadata(path).and_then(|metadata| {
            if metadata.is_dir() {
                return Ok(is_directory(path));
            }
            OpenOptions::new().write(true).truncate(true).open(path)?;
            info!("Cleared log file {}", path.display());
            Ok(FileAccessResult::Cleared)
        });

        match result {
            Ok(result) => result,
            Err(e) => classify(path, e),
        }
    }
}

fn modified_secs(metadata: &Metadata) -> io::Result<f64> {
    let modified = metadata.modified()?;
    let since_epoch = modified
        .duration_since(UNIX_EPOCH)
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
    Ok(since_epoch.as_secs_f64())
}

fn is_directory(path: &Path) -> FileAccessResult {
    FileAccessResult::misconfigured(format!("{} is a directory", path.display()))
}

fn classify(path: &Path, err: io::Error) -> FileAccessResult {
    match err.kind() {
        io::ErrorKind::NotFound => FileAccessResult::not_found(path),
        io::ErrorKind::PermissionDenied => {
            warn!("Permission denied for log file {}", path.display());
            FileAccessResult::misconfigured(format!("permission denied for {}", path.display()))
        }
        kind => {
            warn!("Failed to access log file {}: {}", path.display(), err);
            FileAccessResult::misconfigured(format!("cannot access {}: {}", path.display(), kind))
        }
    }
}
