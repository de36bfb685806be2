// Copyright 2026 KMFlow Engineering

//! Content-hash fingerprinting and duplicate detection for ingested
//! evidence.

use sha2::{Digest, Sha256};

/// Compute the hex-encoded SHA-256 of a canonical byte stream.
#[must_use]
pub fn content_hash(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    hex::encode(hasher.finalize())
}

/// An index from `(engagement_id, content_hash)` to the existing
/// [`crate::domain::EvidenceItem`] id, backing the idempotent duplicate
/// check. The relational store owns the durable version of this index;
/// this in-memory variant is used by the ingestion pipeline's unit tests
/// and by single-node deployments without a store configured.
#[derive(Debug, Default)]
pub struct FingerprintIndex {
    seen: dashmap::DashMap<(String, String), String>,
}

impl FingerprintIndex {
    /// Construct an empty index.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `evidence_id` for `(engagement_id, hash)` if absent, returning
    /// the id that should be treated as canonical: the newly inserted one on
    /// first sight, or the existing one on a repeat.
    pub fn record_or_get(
        &self,
        engagement_id: &str,
        hash: &str,
        evidence_id: &str,
    ) -> (String, bool) {
        let key = (engagement_id.to_string(), hash.to_string());
        match self.seen.entry(key) {
            dashmap::mapref::entry::Entry::Occupied(existing) => {
                (existing.get().clone(), false)
            }
            dashmap::mapref::entry::Entry::Vacant(slot) => {
                slot.insert(evidence_id.to_string());
                (evidence_id.to_string(), true)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_bytes_hash_identically() {
        assert_eq!(content_hash(b"hello world"), content_hash(b"hello world"));
    }

    #[test]
    fn different_bytes_hash_differently() {
        assert_ne!(content_hash(b"hello world"), content_hash(b"hello there"));
    }

    #[test]
    fn s1_ingest_idempotence() {
        let index = FingerprintIndex::new();
        let hash = content_hash(b"hello world");
        let (id_first, inserted_first) = index.record_or_get("e1", &hash, "v1");
        let (id_second, inserted_second) = index.record_or_get("e1", &hash, "v2");
        assert_eq!(id_first, "v1");
        assert_eq!(id_second, "v1");
        assert!(inserted_first);
        assert!(!inserted_second);
    }

    #[test]
    fn same_content_in_different_engagements_is_not_a_duplicate() {
        let index = FingerprintIndex::new();
        let hash = content_hash(b"hello world");
        let (id_a, inserted_a) = index.record_or_get("e1", &hash, "v1");
        let (id_b, inserted_b) = index.record_or_get("e2", &hash, "v2");
        assert_eq!(id_a, "v1");
        assert_eq!(id_b, "v2");
        assert!(inserted_a);
        assert!(inserted_b);
    }
}
