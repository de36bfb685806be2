// Copyright 2026 KMFlow Engineering

//! SeedTerm entity and the merge-chain canonicalization it drives.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// The category a seed term belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SeedTermCategory {
    /// A process activity.
    Activity,
    /// A system/tool name.
    System,
    /// A role or actor.
    Role,
    /// A regulation or policy.
    Regulation,
    /// A data artifact.
    Artifact,
}

/// Where a seed term originated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SeedTermSource {
    /// Entered directly by a consultant.
    Consultant,
    /// Suggested by NLP extraction.
    Nlp,
    /// Extracted verbatim from evidence.
    Extracted,
}

/// Lifecycle status of a seed term.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SeedTermStatus {
    /// Currently used for extraction and naming-variant resolution.
    Active,
    /// Retired, no longer used.
    Deprecated,
    /// Merged into another active term.
    Merged,
}

/// A domain vocabulary entry driving extraction focus and naming-variant
/// resolution.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeedTerm {
    /// Unique identifier.
    pub id: String,
    /// Owning engagement.
    pub engagement_id: String,
    /// The term text as entered.
    pub term: String,
    /// Term category.
    pub category: SeedTermCategory,
    /// Provenance.
    pub source: SeedTermSource,
    /// Current status.
    pub status: SeedTermStatus,
    /// If merged, the id of the term this one was merged into.
    pub merged_into: Option<String>,
}

/// Resolves a raw term name to its canonical form by walking the active
/// seed-term merge chain: lowercase fold, trim, resolve `merged_into`
/// transitively, detect cycles and error out if found.
///
/// `terms` is keyed by lower-cased, trimmed term text.
pub fn canonicalize(
    name: &str,
    terms: &HashMap<String, SeedTerm>,
) -> Result<String> {
    let fold = |s: &str| s.trim().to_lowercase();
    let mut current = fold(name);
    let mut visited = std::collections::HashSet::new();

    loop {
        if !visited.insert(current.clone()) {
            return Err(Error::SeedCycle(name.to_string()));
        }
        match terms.get(&current) {
            Some(term) if term.status == SeedTermStatus::Merged => {
                let Some(target_id) = &term.merged_into else {
                    return Ok(current);
                };
                // merged_into references another term's id; resolve to its
                // folded term text for the next hop.
                let Some(target) = terms.values().find(|t| &t.id == target_id) else {
                    return Ok(current);
                };
                current = fold(&target.term);
            }
            _ => return Ok(current),
        }
    }
}
