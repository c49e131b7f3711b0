//! Mock implementations for testing

use loglens_core::Level;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::ingest::ClientSink;

/// A client sink that records everything it receives
#[derive(Default)]
pub struct RecordingSink {
    records: Mutex<Vec<(Level, String)>>,
    call_count: AtomicUsize,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the number of records received
    pub fn call_count(&self) -> usize {
        self.call_count.load(Ordering::SeqCst)
    }

    /// Get all received records in order
    pub fn records(&self) -> Vec<(Level, String)> {
        self.records.lock().clone()
    }

    /// Check if a message containing `needle` was recorded
    pub fn was_recorded(&self, needle: &str) -> bool {
        self.records.lock().iter().any(|(_, m)| m.contains(needle))
    }
}

impl ClientSink for RecordingSink {
    fn record(&self, level: Level, message: &str) {
        self.call_count.fetch_add(1, Ordering::SeqCst);
        self.records.lock().push((level, message.to_string()));
    }
}
