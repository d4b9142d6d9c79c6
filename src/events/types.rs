//! Event type definitions for progress reporting.

use serde::{Deserialize, Serialize};

/// All events emitted by the dedup engine
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Event {
    /// Download phase events (per record)
    Fetch(FetchEvent),
    /// Engine-level events
    Engine(EngineEvent),
}

/// Events from the image fetcher
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum FetchEvent {
    /// A download attempt failed and will be retried after the backoff
    Retrying {
        url: String,
        attempt: u32,
        message: String,
    },
    /// All attempts for a URL are exhausted
    Failed { url: String, attempts: u32 },
}

/// Terminal outcome of a single input record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RecordOutcome {
    /// Fingerprint inserted into the registry (no duplicate found)
    Registered,
    /// Merged into a duplicate group
    Grouped,
    /// Download failed; reported as a failed record
    Failed,
    /// Fingerprint computation failed; logged and counted, not reported
    Dropped,
}

impl std::fmt::Display for RecordOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RecordOutcome::Registered => write!(f, "registered"),
            RecordOutcome::Grouped => write!(f, "grouped"),
            RecordOutcome::Failed => write!(f, "failed"),
            RecordOutcome::Dropped => write!(f, "dropped"),
        }
    }
}

/// Engine-level events
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum EngineEvent {
    /// The run has started
    Started { total_records: usize },
    /// A record reached its terminal outcome
    RecordFinished {
        id: String,
        outcome: RecordOutcome,
        completed: usize,
        total: usize,
    },
    /// The run completed
    Completed { summary: RunSummary },
}

/// Summary of a completed run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunSummary {
    /// Total input records
    pub total_records: usize,
    /// Records registered as unique
    pub registered: usize,
    /// Records merged into duplicate groups
    pub grouped: usize,
    /// Records whose download failed
    pub failed: usize,
    /// Records dropped after a fingerprint failure
    pub hash_dropped: usize,
    /// Number of duplicate groups found
    pub duplicate_groups: usize,
    /// Duration in milliseconds
    pub duration_ms: u64,
}
