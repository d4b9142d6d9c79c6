//! # Core Module
//!
//! The UI-agnostic duplicate detection engine.
//!
//! ## Modules
//! - `source` - Parses the input record list
//! - `fetcher` - Downloads and decodes images with bounded retry
//! - `hasher` - Computes perceptual fingerprints
//! - `registry` - Shared fingerprint registry and duplicate classification
//! - `engine` - Orchestrates the concurrent run
//! - `report` - Writes the duplicate/failure reports

pub mod engine;
pub mod fetcher;
pub mod hasher;
pub mod record;
pub mod registry;
pub mod report;
pub mod source;

// Re-export commonly used types
pub use engine::{DedupEngine, DedupResult, EngineConfig, RunStats};
pub use fetcher::{FetchConfig, HttpFetcher, ImageFetcher};
pub use hasher::{Fingerprint, FingerprintHasher};
pub use record::{DuplicateGroup, FailedRecord, ImageRecord, OwnerPair};
pub use registry::{Classification, HashRegistry};
