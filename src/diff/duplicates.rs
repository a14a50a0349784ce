//! Duplicate grouping and identity-collision detection.
//!
//! A duplicate is benign ("two versions of lodash ship in this image"). A
//! collision is a structural error: two components share an identity but
//! disagree on name, or on hash at the same version, which points at an
//! identity scheme failure or tampering. The two concepts stay separate in
//! the output.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

use crate::model::Component;

/// Duplicate findings for both SBOMs plus their delta.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DuplicateReport {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub before: Vec<DuplicateGroup>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub after: Vec<DuplicateGroup>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version_diff: Option<DuplicateVersionDiff>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub collisions: Vec<Collision>,
}

/// Components sharing a canonical identity, usually at different versions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DuplicateGroup {
    pub id: String,
    pub name: String,
    /// Sorted distinct versions across the group.
    pub versions: Vec<String>,
    pub components: Vec<Component>,
}

/// Changes in duplicate version sets between two SBOMs.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DuplicateVersionDiff {
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub versions_added: BTreeMap<String, Vec<String>>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub versions_removed: BTreeMap<String, Vec<String>>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub new_duplicates: Vec<DuplicateGroup>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub resolved_duplicates: Vec<DuplicateGroup>,
}

/// Reason a collision was flagged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CollisionReason {
    NameMismatch,
    HashMismatch,
}

impl CollisionReason {
    /// Stable string form used in report keys.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::NameMismatch => "name_mismatch",
            Self::HashMismatch => "hash_mismatch",
        }
    }
}

/// An ambiguous identity match.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Collision {
    pub id: String,
    pub reason: CollisionReason,
    pub components: Vec<Component>,
}

impl DuplicateReport {
    /// True when nothing was found on either side.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.before.is_empty()
            && self.after.is_empty()
            && self.version_diff.is_none()
            && self.collisions.is_empty()
    }
}

impl DuplicateVersionDiff {
    /// True when duplicate sets did not change.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.versions_added.is_empty()
            && self.versions_removed.is_empty()
            && self.new_duplicates.is_empty()
            && self.resolved_duplicates.is_empty()
    }
}

fn group_by_identity(comps: &[Component]) -> BTreeMap<String, Vec<Component>> {
    let mut groups: BTreeMap<String, Vec<Component>> = BTreeMap::new();
    for c in comps {
        groups.entry(c.id.clone()).or_default().push(c.clone());
    }
    groups
}

/// Find identities carried by two or more components.
///
/// Output is sorted by identity; each group's version list is the sorted
/// set of distinct versions.
#[must_use]
pub fn detect_duplicates(comps: &[Component]) -> Vec<DuplicateGroup> {
    let mut dups = Vec::new();
    for (id, components) in group_by_identity(comps) {
        if components.len() < 2 {
            continue;
        }
        let versions: BTreeSet<String> = components.iter().map(|c| c.version.clone()).collect();
        dups.push(DuplicateGroup {
            id,
            name: components[0].name.clone(),
            versions: versions.into_iter().collect(),
            components,
        });
    }
    dups
}

/// Find identity collisions: groups whose members disagree on name, or on
/// hash value for the same (version, algorithm) pair.
///
/// A name mismatch short-circuits hash inspection for the group, and each
/// `(identity, reason)` pair is reported at most once.
#[must_use]
pub fn detect_collisions(comps: &[Component]) -> Vec<Collision> {
    let mut collisions = Vec::new();

    for (id, components) in group_by_identity(comps) {
        if components.len() < 2 {
            continue;
        }

        let names: BTreeSet<&str> = components.iter().map(|c| c.name.as_str()).collect();
        if names.len() > 1 {
            collisions.push(Collision {
                id,
                reason: CollisionReason::NameMismatch,
                components,
            });
            continue;
        }

        // version -> algo -> hash
        let mut version_hashes: BTreeMap<String, BTreeMap<String, String>> = BTreeMap::new();
        let mut mismatch = false;
        'outer: for c in &components {
            let slot = version_hashes.entry(c.version.clone()).or_default();
            for (algo, hash) in &c.hashes {
                if let Some(existing) = slot.get(algo) {
                    if existing != hash {
                        mismatch = true;
                        break 'outer;
                    }
                } else {
                    slot.insert(algo.clone(), hash.clone());
                }
            }
        }
        if mismatch {
            collisions.push(Collision {
                id,
                reason: CollisionReason::HashMismatch,
                components,
            });
        }
    }

    collisions
}

/// Compare duplicate groups between a baseline and a candidate.
///
/// A group is *resolved* only when its identity disappears from the
/// candidate entirely; an identity that survives as a single component
/// contributes to `versions_removed` instead. Symmetrically, a group is
/// *new* only when its identity was absent from the baseline. For every
/// identity present on both sides the version sets are diffed.
#[must_use]
pub fn diff_duplicate_versions(
    before_groups: &[DuplicateGroup],
    after_groups: &[DuplicateGroup],
    before_comps: &[Component],
    after_comps: &[Component],
) -> DuplicateVersionDiff {
    let mut diff = DuplicateVersionDiff::default();

    let before_versions = version_sets(before_comps);
    let after_versions = version_sets(after_comps);

    for group in after_groups {
        if !before_versions.contains_key(&group.id) {
            diff.new_duplicates.push(group.clone());
        }
    }

    for group in before_groups {
        if !after_versions.contains_key(&group.id) {
            diff.resolved_duplicates.push(group.clone());
        }
    }

    // Version set deltas for every identity that has a duplicate group on
    // either side and survives on both.
    let mut candidates: BTreeSet<&str> = BTreeSet::new();
    candidates.extend(before_groups.iter().map(|g| g.id.as_str()));
    candidates.extend(after_groups.iter().map(|g| g.id.as_str()));

    for id in candidates {
        let (Some(b), Some(a)) = (before_versions.get(id), after_versions.get(id)) else {
            continue;
        };
        let added: Vec<String> = a.difference(b).cloned().collect();
        let removed: Vec<String> = b.difference(a).cloned().collect();
        if !added.is_empty() {
            diff.versions_added.insert(id.to_string(), added);
        }
        if !removed.is_empty() {
            diff.versions_removed.insert(id.to_string(), removed);
        }
    }

    diff.new_duplicates.sort_by(|x, y| x.id.cmp(&y.id));
    diff.resolved_duplicates.sort_by(|x, y| x.id.cmp(&y.id));

    diff
}

fn version_sets(comps: &[Component]) -> BTreeMap<String, BTreeSet<String>> {
    let mut sets: BTreeMap<String, BTreeSet<String>> = BTreeMap::new();
    for c in comps {
        sets.entry(c.id.clone()).or_default().insert(c.version.clone());
    }
    sets
}
