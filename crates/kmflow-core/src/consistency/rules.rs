// Copyright 2026 KMFlow Engineering

//! The six cross-source conflict detection rules. Each rule operates on a
//! slice of currently-valid assertions and returns the pairs of assertion
//! ids it flags; the caller (the scanner orchestrator) turns each pair into
//! a [`crate::domain::ConflictObject`] and runs it through the classifier.

use std::collections::HashMap;

use crate::domain::{Assertion, Predicate, SourcePlane};

/// A conflicting pair of assertion ids, in stable (sorted) order.
pub type ConflictPair = (String, String);

fn sorted_pair(a: &str, b: &str) -> ConflictPair {
    if a <= b {
        (a.to_string(), b.to_string())
    } else {
        (b.to_string(), a.to_string())
    }
}

/// Rule 1: two distinct `PRECEDES` edges form a length-2 cycle for the
/// same activity pair (A precedes B and B precedes A), both currently
/// valid.
#[must_use]
pub fn detect_sequence_conflict(assertions: &[Assertion], now: i64) -> Vec<ConflictPair> {
    let precedes: Vec<&Assertion> = assertions
        .iter()
        .filter(|a| a.predicate == Predicate::Precedes && a.is_current(now))
        .collect();

    let mut found = Vec::new();
    for (i, a) in precedes.iter().enumerate() {
        for b in precedes.iter().skip(i + 1) {
            if a.subject.id == b.object.id && a.object.id == b.subject.id {
                found.push(sorted_pair(&a.id, &b.id));
            }
        }
    }
    found
}

/// Rule 2: the same activity has two `PERFORMED_BY` edges to different
/// Role targets, both currently valid, sourced from different evidence
/// planes.
#[must_use]
pub fn detect_role_conflict(
    assertions: &[Assertion],
    plane_of: &HashMap<String, SourcePlane>,
    now: i64,
) -> Vec<ConflictPair> {
    let performed_by: Vec<&Assertion> = assertions
        .iter()
        .filter(|a| a.predicate == Predicate::PerformedBy && a.is_current(now))
        .collect();

    let mut found = Vec::new();
    for (i, a) in performed_by.iter().enumerate() {
        for b in performed_by.iter().skip(i + 1) {
            if a.subject.id != b.subject.id || a.object.id == b.object.id {
                continue;
            }
            let plane_a = plane_of.get(&a.id);
            let plane_b = plane_of.get(&b.id);
            if plane_a.is_some() && plane_b.is_some() && plane_a != plane_b {
                found.push(sorted_pair(&a.id, &b.id));
            }
        }
    }
    found
}

/// Rule 5: an upstream activity `PRODUCES` data object O1, a downstream
/// activity directly following it `CONSUMES` O2, and `O1 != O2` after seed
/// canonicalization. `precedes_pairs` gives the immediate-follows relation
/// (already canonicalized by the caller) to limit the check to adjacent
/// activities.
#[must_use]
pub fn detect_io_mismatch(
    assertions: &[Assertion],
    precedes_pairs: &[(String, String)],
    now: i64,
) -> Vec<ConflictPair> {
    let produces: HashMap<&str, Vec<&Assertion>> = group_by_subject(assertions, Predicate::Produces, now);
    let consumes: HashMap<&str, Vec<&Assertion>> = group_by_subject(assertions, Predicate::Consumes, now);

    let mut found = Vec::new();
    for (upstream, downstream) in precedes_pairs {
        let Some(produced) = produces.get(upstream.as_str()) else {
            continue;
        };
        let Some(consumed) = consumes.get(downstream.as_str()) else {
            continue;
        };
        for p in produced {
            for c in consumed {
                if p.object.id != c.object.id {
                    found.push(sorted_pair(&p.id, &c.id));
                }
            }
        }
    }
    found
}

/// Rule 3: two `GOVERNED_BY` edges from the same activity encode mutually
/// exclusive conditions, both currently valid. `mutually_exclusive` is the
/// policy catalog's pairwise exclusion table (policy ids, order-independent)
/// since exclusivity is a property of the policies themselves, not
/// something derivable from the edges alone.
#[must_use]
pub fn detect_rule_conflict(
    assertions: &[Assertion],
    mutually_exclusive: &HashMap<String, Vec<String>>,
    now: i64,
) -> Vec<ConflictPair> {
    let governed_by: Vec<&Assertion> = assertions
        .iter()
        .filter(|a| a.predicate == Predicate::GovernedBy && a.is_current(now))
        .collect();

    let mut found = Vec::new();
    for (i, a) in governed_by.iter().enumerate() {
        for b in governed_by.iter().skip(i + 1) {
            if a.subject.id != b.subject.id {
                continue;
            }
            if is_mutually_exclusive(mutually_exclusive, &a.object.id, &b.object.id) {
                found.push(sorted_pair(&a.id, &b.id));
            }
        }
    }
    found
}

fn is_mutually_exclusive(table: &HashMap<String, Vec<String>>, a: &str, b: &str) -> bool {
    table.get(a).is_some_and(|excluded| excluded.iter().any(|x| x == b))
        || table.get(b).is_some_and(|excluded| excluded.iter().any(|x| x == a))
}

/// One source's claim about an activity's existence: either asserting it
/// happens or explicitly denying it (absence plus a negating assertion),
/// surfaced outside the controlled edge vocabulary since existence is a
/// property of a node, not an edge between two.
#[derive(Debug, Clone)]
pub struct ExistenceClaim {
    /// Claim-bearing assertion id, for provenance on the resulting
    /// [`ConflictObject`].
    pub assertion_id: String,
    /// The activity whose existence is being claimed.
    pub activity_id: String,
    /// `true` asserts the activity happens; `false` denies it.
    pub asserts_existence: bool,
}

/// Rule 4: an activity is asserted by one source and denied by another.
#[must_use]
pub fn detect_existence_conflict(claims: &[ExistenceClaim]) -> Vec<ConflictPair> {
    let mut by_activity: HashMap<&str, Vec<&ExistenceClaim>> = HashMap::new();
    for c in claims {
        by_activity.entry(c.activity_id.as_str()).or_default().push(c);
    }

    let mut found = Vec::new();
    for group in by_activity.values() {
        for (i, a) in group.iter().enumerate() {
            for b in group.iter().skip(i + 1) {
                if a.asserts_existence != b.asserts_existence {
                    found.push(sorted_pair(&a.assertion_id, &b.assertion_id));
                }
            }
        }
    }
    found
}

/// Rule 6: a policy applies to an activity (per the policy catalog's
/// applicability table, outside the controlled edge vocabulary) but no
/// `GOVERNED_BY` edge connects them. Returns `(policy_id, activity_id)`
/// pairs rather than assertion-id pairs, since there is no assertion to
/// pair against; the scanner turns each into a `ConflictObject` with
/// `source_b_ref` left to the policy catalog entry.
#[must_use]
pub fn detect_control_gap(
    assertions: &[Assertion],
    applicability: &[(String, String)],
    now: i64,
) -> Vec<ConflictPair> {
    let governed: std::collections::HashSet<(&str, &str)> = assertions
        .iter()
        .filter(|a| a.predicate == Predicate::GovernedBy && a.is_current(now))
        .map(|a| (a.subject.id.as_str(), a.object.id.as_str()))
        .collect();

    applicability
        .iter()
        .filter(|(policy_id, activity_id)| !governed.contains(&(activity_id.as_str(), policy_id.as_str())))
        .map(|(policy_id, activity_id)| (activity_id.clone(), policy_id.clone()))
        .collect()
}

fn group_by_subject<'a>(
    assertions: &'a [Assertion],
    predicate: Predicate,
    now: i64,
) -> HashMap<&'a str, Vec<&'a Assertion>> {
    let mut groups: HashMap<&str, Vec<&Assertion>> = HashMap::new();
    for a in assertions {
        if a.predicate == predicate && a.is_current(now) {
            groups.entry(a.subject.id.as_str()).or_default().push(a);
        }
    }
    groups
}
