//! # Registry Module
//!
//! The shared, append-only collection of fingerprints seen so far, and the
//! classification step that decides whether a new fingerprint is a
//! duplicate of any of them.
//!
//! ## Concurrency
//! All workers funnel through [`HashRegistry::classify`], which holds one
//! mutex across the scan, the group merge, and the insert. Two workers
//! classifying near-identical images at the same time therefore cannot
//! both miss each other's insert and register two entries for what should
//! be one duplicate pair.
//!
//! ## First-match, not best-match
//! The scan stops at the first entry within the threshold, not the
//! closest one. Which prior record becomes the "existing" half of a pairing
//! depends on insertion order, which depends on worker scheduling. Group
//! *membership* is still deterministic for a fixed input and threshold;
//! only the exact pairings vary. Known limitation, kept for simplicity.

use crate::core::hasher::Fingerprint;
use crate::core::record::{DuplicateGroup, ImageRecord, OwnerPair};
use std::collections::HashMap;
use std::sync::Mutex;

/// One registered record and its fingerprint. Never mutated after insert.
#[derive(Debug, Clone)]
pub struct RegistryEntry {
    pub record: ImageRecord,
    pub fingerprint: Fingerprint,
}

/// Outcome of classifying one fingerprint against the registry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Classification {
    /// No entry within the threshold; the fingerprint was inserted
    Registered,
    /// Merged into the duplicate group for the matched owner pair
    Grouped { matched_id: String, distance: u32 },
}

#[derive(Default)]
struct RegistryState {
    entries: Vec<RegistryEntry>,
    groups: HashMap<OwnerPair, DuplicateGroup>,
}

/// Shared classification state for one run.
pub struct HashRegistry {
    inner: Mutex<RegistryState>,
}

impl HashRegistry {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(RegistryState::default()),
        }
    }

    /// Classify a record's fingerprint against everything seen so far.
    ///
    /// Scans existing entries for the first one with
    /// `distance < threshold` (distance equal to the threshold is NOT a
    /// duplicate). On a match, both records' ids and urls are appended to
    /// the group keyed by their unordered owner pair; otherwise the new
    /// entry is inserted. Scan and insert happen under one lock.
    pub fn classify(
        &self,
        record: &ImageRecord,
        fingerprint: Fingerprint,
        threshold: u32,
    ) -> Classification {
        let mut state = self.inner.lock().expect("registry lock poisoned");

        let matched = state.entries.iter().find_map(|entry| {
            let distance = entry.fingerprint.distance(&fingerprint);
            (distance < threshold).then(|| (entry.record.clone(), distance))
        });

        match matched {
            Some((existing, distance)) => {
                let pair = OwnerPair::new(&record.frontliner_id, &existing.frontliner_id);
                state
                    .groups
                    .entry(pair)
                    .or_insert_with(|| DuplicateGroup::new(&record.frontliner_id))
                    .push_collision(record, &existing);
                Classification::Grouped {
                    matched_id: existing.id,
                    distance,
                }
            }
            None => {
                state.entries.push(RegistryEntry {
                    record: record.clone(),
                    fingerprint,
                });
                Classification::Registered
            }
        }
    }

    /// Number of registered (non-duplicate) entries so far.
    pub fn len(&self) -> usize {
        self.inner.lock().expect("registry lock poisoned").entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Consume the registry: flatten the owner-pair group map into an
    /// unordered list and report the final registry size. Pure collection;
    /// no further deduplication happens here.
    pub fn into_results(self) -> (Vec<DuplicateGroup>, usize) {
        let state = self
            .inner
            .into_inner()
            .expect("registry lock poisoned");
        (state.groups.into_values().collect(), state.entries.len())
    }
}

impl Default for HashRegistry {
    fn default() -> Self {
        Self::new()
    }
}
