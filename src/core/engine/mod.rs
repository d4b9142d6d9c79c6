//! # Engine Module
//!
//! Orchestrates the concurrent duplicate-detection run.
//!
//! ## Scheduling
//! A fixed pool of worker threads consumes records from a bounded
//! crossbeam channel sized to the input count; no dynamic resizing. Each
//! worker walks one record through fetch -> hash -> classify and lands on
//! exactly one terminal outcome. `thread::scope` joining the pool is the
//! completion barrier: the aggregation below it runs only after every
//! record is accounted for.
//!
//! Workers block only on network I/O and retry backoff; hashing and
//! registry scans are CPU-bound. The pool should be sized assuming a
//! worker can sit out a full backoff while holding its slot.
//!
//! ## Outcomes
//! - download failed after retries  -> `FailedRecord` (reported)
//! - fingerprint failed             -> dropped (logged + counted, not reported)
//! - no registry entry within range -> registered
//! - registry match                 -> merged into a duplicate group

use crate::core::fetcher::{FetchConfig, HttpFetcher, ImageFetcher};
use crate::core::hasher::FingerprintHasher;
use crate::core::record::{DuplicateGroup, FailedRecord, ImageRecord};
use crate::core::registry::{Classification, HashRegistry};
use crate::events::{null_sender, EngineEvent, Event, EventSender, RecordOutcome, RunSummary};
use crossbeam_channel::bounded;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::thread;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Engine configuration
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Size of the worker pool
    pub workers: usize,
    /// Exclusive upper bound on fingerprint distance for duplicates:
    /// `distance < threshold` is a duplicate, `distance == threshold` is not
    pub threshold: u32,
    /// Fetcher settings (timeout, attempts, backoff)
    pub fetch: FetchConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            workers: 10,
            threshold: 1,
            fetch: FetchConfig::default(),
        }
    }
}

/// Per-run counters. One outcome per input record, so the four outcome
/// counts always sum to `total_records`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunStats {
    pub total_records: usize,
    pub registered: usize,
    pub grouped: usize,
    pub failed: usize,
    pub hash_dropped: usize,
    pub duration_ms: u64,
}

impl RunStats {
    /// Every record reached exactly one terminal outcome.
    pub fn is_complete(&self) -> bool {
        self.registered + self.grouped + self.failed + self.hash_dropped == self.total_records
    }
}

/// Final output of a run.
#[derive(Debug, Clone)]
pub struct DedupResult {
    /// Flattened duplicate groups, unordered
    pub duplicates: Vec<DuplicateGroup>,
    /// Records whose download failed after all retries
    pub failed: Vec<FailedRecord>,
    pub stats: RunStats,
}

#[derive(Default)]
struct OutcomeCounters {
    registered: AtomicUsize,
    grouped: AtomicUsize,
    failed: AtomicUsize,
    dropped: AtomicUsize,
}

impl OutcomeCounters {
    fn bump(&self, outcome: RecordOutcome) {
        let counter = match outcome {
            RecordOutcome::Registered => &self.registered,
            RecordOutcome::Grouped => &self.grouped,
            RecordOutcome::Failed => &self.failed,
            RecordOutcome::Dropped => &self.dropped,
        };
        counter.fetch_add(1, Ordering::SeqCst);
    }
}

/// The concurrent dedup engine.
pub struct DedupEngine<F: ImageFetcher> {
    fetcher: F,
    config: EngineConfig,
}

impl DedupEngine<HttpFetcher> {
    /// Build an engine backed by a live HTTP fetcher.
    pub fn new(config: EngineConfig) -> Self {
        let fetcher = HttpFetcher::new(config.fetch.clone());
        Self { fetcher, config }
    }
}

impl<F: ImageFetcher> DedupEngine<F> {
    /// Build an engine over an explicit fetcher (fakes in tests, or a
    /// fetcher wired to an event sender).
    pub fn with_fetcher(fetcher: F, config: EngineConfig) -> Self {
        Self { fetcher, config }
    }

    /// Run without progress reporting.
    pub fn run(&self, records: Vec<ImageRecord>) -> DedupResult {
        self.run_with_events(records, &null_sender())
    }

    /// Run the full duplicate detection over `records`.
    ///
    /// Blocks until every record reaches a terminal outcome; there is no
    /// whole-run cancellation beyond the fetcher's per-request timeout.
    pub fn run_with_events(&self, records: Vec<ImageRecord>, events: &EventSender) -> DedupResult {
        let start = Instant::now();
        let total = records.len();

        events.send(Event::Engine(EngineEvent::Started {
            total_records: total,
        }));
        info!(total, workers = self.config.workers, threshold = self.config.threshold, "starting run");

        let registry = HashRegistry::new();
        let failed = Mutex::new(Vec::new());
        let counters = OutcomeCounters::default();
        let completed = AtomicUsize::new(0);

        // Bounded to the input count: everything is enqueued once, up
        // front, then the sender is dropped so workers drain and exit.
        let (tx, rx) = bounded(total.max(1));
        for record in records {
            let _ = tx.send(record);
        }
        drop(tx);

        thread::scope(|scope| {
            for _ in 0..self.config.workers.max(1) {
                let rx = rx.clone();
                let engine = &*self;
                let registry = &registry;
                let failed = &failed;
                let counters = &counters;
                let completed = &completed;
                scope.spawn(move || {
                    // One hasher per worker; it is cheap and keeps the
                    // hot path free of shared state
                    let hasher = FingerprintHasher::new();
                    for record in rx.iter() {
                        let outcome = engine.process_record(&record, &hasher, registry, failed);
                        counters.bump(outcome);
                        let done = completed.fetch_add(1, Ordering::SeqCst) + 1;
                        events.send(Event::Engine(EngineEvent::RecordFinished {
                            id: record.id.clone(),
                            outcome,
                            completed: done,
                            total,
                        }));
                    }
                });
            }
        });

        let (duplicates, registered) = registry.into_results();
        let failed = failed.into_inner().expect("failed-records lock poisoned");

        let stats = RunStats {
            total_records: total,
            registered,
            grouped: counters.grouped.load(Ordering::SeqCst),
            failed: failed.len(),
            hash_dropped: counters.dropped.load(Ordering::SeqCst),
            duration_ms: start.elapsed().as_millis() as u64,
        };

        events.send(Event::Engine(EngineEvent::Completed {
            summary: RunSummary {
                total_records: stats.total_records,
                registered: stats.registered,
                grouped: stats.grouped,
                failed: stats.failed,
                hash_dropped: stats.hash_dropped,
                duplicate_groups: duplicates.len(),
                duration_ms: stats.duration_ms,
            },
        }));
        info!(
            registered = stats.registered,
            grouped = stats.grouped,
            failed = stats.failed,
            hash_dropped = stats.hash_dropped,
            groups = duplicates.len(),
            "run complete"
        );

        DedupResult {
            duplicates,
            failed,
            stats,
        }
    }

    /// Walk one record to its terminal outcome.
    fn process_record(
        &self,
        record: &ImageRecord,
        hasher: &FingerprintHasher,
        registry: &HashRegistry,
        failed: &Mutex<Vec<FailedRecord>>,
    ) -> RecordOutcome {
        let image = match self.fetcher.fetch(&record.photo_url) {
            Ok(image) => image,
            Err(error) => {
                warn!(id = %record.id, url = %record.photo_url, %error, "download failed");
                failed
                    .lock()
                    .expect("failed-records lock poisoned")
                    .push(FailedRecord::from_record(record, error.to_string()));
                return RecordOutcome::Failed;
            }
        };

        let fingerprint = match hasher.hash(&image) {
            Ok(fingerprint) => fingerprint,
            Err(error) => {
                // Current policy: fingerprint failures are not reported as
                // failed records, only logged and counted
                warn!(id = %record.id, url = %record.photo_url, %error, "fingerprint failed, dropping record");
                return RecordOutcome::Dropped;
            }
        };
        // Decoded pixels are not needed past this point; only the record
        // and the fingerprint survive classification
        drop(image);

        match registry.classify(record, fingerprint, self.config.threshold) {
            Classification::Registered => RecordOutcome::Registered,
            Classification::Grouped {
                matched_id,
                distance,
            } => {
                debug!(id = %record.id, matched = %matched_id, distance, "duplicate found");
                RecordOutcome::Grouped
            }
        }
    }
}
