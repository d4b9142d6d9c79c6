//! # Photo Dedup Remote
//!
//! Detects visually duplicate photos across a flat list of uploaded image
//! records by downloading each photo, computing a perceptual fingerprint,
//! and grouping records whose fingerprints are near-identical.
//!
//! ## Core Philosophy
//! - **Never abort on a bad image** - download and hash failures are data,
//!   not fatal errors
//! - **Report everything** - duplicates and failed downloads both end up in
//!   the output, with counts for what was dropped
//! - **Deterministic connectivity** - which records end up duplicate-linked
//!   is stable for a fixed input and threshold, even though worker
//!   scheduling varies
//!
//! ## Architecture
//! The library is split into a core engine (UI-agnostic) and presentation
//! layers:
//! - `core` - fetcher, hasher, registry, and the concurrent dedup engine
//! - `events` - event-driven progress reporting
//! - `error` - error types for the structural (fatal) failure paths
//! - `cli` - command-line interface

pub mod core;
pub mod error;
pub mod events;

// Re-export commonly used types at the crate root
pub use error::{DedupError, Result};

/// Initialize tracing for the library
///
/// This should be called by the application entry point.
pub fn init_tracing() {
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .expect("Failed to set global default tracing subscriber");
}
