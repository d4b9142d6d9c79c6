//! Record types shared across the engine.

use serde::{Deserialize, Serialize};

/// One input row: an uploaded photo and who it belongs to.
///
/// `frontliner_id` is the owner key duplicates are grouped under;
/// `store_id` is carried through to the failure report unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageRecord {
    pub id: String,
    pub store_id: String,
    pub frontliner_id: String,
    pub photo_url: String,
}

/// A record whose photo could not be downloaded after all retries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FailedRecord {
    pub id: String,
    pub store_id: String,
    pub frontliner_id: String,
    pub photo_url: String,
    /// Human-readable failure chain, for logs and pretty output. Not part
    /// of the failure report rows.
    pub reason: String,
}

impl FailedRecord {
    /// Build a failed record from the input record and the failure reason.
    pub fn from_record(record: &ImageRecord, reason: impl Into<String>) -> Self {
        Self {
            id: record.id.clone(),
            store_id: record.store_id.clone(),
            frontliner_id: record.frontliner_id.clone(),
            photo_url: record.photo_url.clone(),
            reason: reason.into(),
        }
    }
}

/// Unordered pair of frontliner ids, used as the duplicate-group key.
///
/// `OwnerPair::new(a, b)` and `OwnerPair::new(b, a)` are the same key, so a
/// collision between two owners lands in one group regardless of which
/// record was seen first. A self-pair (both ids equal) is valid and covers
/// duplicates within one owner's uploads.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OwnerPair {
    first: String,
    second: String,
}

impl OwnerPair {
    pub fn new(a: impl Into<String>, b: impl Into<String>) -> Self {
        let a = a.into();
        let b = b.into();
        if a <= b {
            Self { first: a, second: b }
        } else {
            Self { first: b, second: a }
        }
    }
}

/// Accumulated duplicates for one owner pair.
///
/// `frontliner_id` is the owner of the record that first triggered the
/// group; `ids` and `urls` collect both halves of every collision in
/// discovery order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DuplicateGroup {
    pub frontliner_id: String,
    pub duplicate_image_urls: Vec<String>,
    pub duplicate_ids: Vec<String>,
}

impl DuplicateGroup {
    /// Create an empty group owned by the triggering record's frontliner.
    pub fn new(frontliner_id: impl Into<String>) -> Self {
        Self {
            frontliner_id: frontliner_id.into(),
            duplicate_image_urls: Vec::new(),
            duplicate_ids: Vec::new(),
        }
    }

    /// Append a colliding pair: the incoming record and the registry entry
    /// it matched.
    pub fn push_collision(&mut self, incoming: &ImageRecord, existing: &ImageRecord) {
        self.duplicate_image_urls.push(incoming.photo_url.clone());
        self.duplicate_image_urls.push(existing.photo_url.clone());
        self.duplicate_ids.push(incoming.id.clone());
        self.duplicate_ids.push(existing.id.clone());
    }

    /// Number of collision pairs recorded in this group.
    pub fn collision_count(&self) -> usize {
        self.duplicate_ids.len() / 2
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(id: &str, frontliner: &str, url: &str) -> ImageRecord {
        ImageRecord {
            id: id.to_string(),
            store_id: "S1".to_string(),
            frontliner_id: frontliner.to_string(),
            photo_url: url.to_string(),
        }
    }

    #[test]
    fn owner_pair_is_order_independent() {
        assert_eq!(OwnerPair::new("F1", "F2"), OwnerPair::new("F2", "F1"));
    }

    #[test]
    fn owner_pair_supports_self_pair() {
        let pair = OwnerPair::new("F1", "F1");
        assert_eq!(pair, OwnerPair::new("F1", "F1"));
        assert_eq!(pair.first, "F1");
        assert_eq!(pair.second, "F1");
    }

    #[test]
    fn group_records_both_halves_of_a_collision() {
        let incoming = record("2", "F1", "http://x/b.jpg");
        let existing = record("1", "F1", "http://x/a.jpg");

        let mut group = DuplicateGroup::new("F1");
        group.push_collision(&incoming, &existing);

        assert_eq!(group.duplicate_ids, vec!["2", "1"]);
        assert_eq!(
            group.duplicate_image_urls,
            vec!["http://x/b.jpg", "http://x/a.jpg"]
        );
        assert_eq!(group.collision_count(), 1);
    }

    #[test]
    fn failed_record_carries_input_fields() {
        let rec = record("9", "F3", "http://x/gone.jpg");
        let failed = FailedRecord::from_record(&rec, "connection refused");

        assert_eq!(failed.id, "9");
        assert_eq!(failed.store_id, "S1");
        assert_eq!(failed.frontliner_id, "F3");
        assert_eq!(failed.reason, "connection refused");
    }
}
