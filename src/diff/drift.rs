//! Drift classification for changed components.
//!
//! Classification priority is integrity > version > metadata > none. A
//! hash change without a version change outranks everything else: it is
//! the supply-chain signal this tool exists to catch, and tests pin the
//! ordering.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

use crate::model::Component;

/// Kind of change detected between two matched components.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DriftType {
    #[default]
    None,
    /// Version changed — a normal update.
    Version,
    /// Hash changed without a version change — suspicious.
    Integrity,
    /// Only metadata (licenses) changed.
    Metadata,
}

/// Details about a single component's drift.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DriftInfo {
    #[serde(rename = "type")]
    pub drift_type: DriftType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hash_changes: Option<HashDiff>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub version_from: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub version_to: String,
    /// `+lic` / `-lic` entries, sorted within each sign.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub licenses_diff: Vec<String>,
}

/// Changes between two hash maps.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HashDiff {
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub added: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub removed: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub changed: BTreeMap<String, HashChange>,
}

/// A before/after hash value for one algorithm.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HashChange {
    pub before: String,
    pub after: String,
}

/// Aggregate drift statistics over all changed components.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DriftSummary {
    pub version_drift: usize,
    pub integrity_drift: usize,
    pub metadata_drift: usize,
}

impl HashDiff {
    /// True when no hash changed, appeared, or disappeared.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty() && self.changed.is_empty()
    }
}

impl DriftSummary {
    /// True when no drift of any kind was counted.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.version_drift == 0 && self.integrity_drift == 0 && self.metadata_drift == 0
    }
}

/// Compare two hash maps. An algorithm present on both sides with an
/// identical value is not a change.
#[must_use]
pub fn diff_hashes(before: &indexmap::IndexMap<String, String>, after: &indexmap::IndexMap<String, String>) -> HashDiff {
    let mut diff = HashDiff::default();

    for (algo, hash) in after {
        match before.get(algo) {
            Some(before_hash) if before_hash != hash => {
                diff.changed.insert(
                    algo.clone(),
                    HashChange {
                        before: before_hash.clone(),
                        after: hash.clone(),
                    },
                );
            }
            Some(_) => {}
            None => {
                diff.added.insert(algo.clone(), hash.clone());
            }
        }
    }

    for (algo, hash) in before {
        if !after.contains_key(algo) {
            diff.removed.insert(algo.clone(), hash.clone());
        }
    }

    diff
}

/// Classify the drift between two components that share an identity.
#[must_use]
pub fn classify_drift(before: &Component, after: &Component) -> DriftInfo {
    let mut drift = DriftInfo::default();

    let version_changed = before.version != after.version;
    if version_changed {
        drift.version_from = before.version.clone();
        drift.version_to = after.version.clone();
    }

    let hash_diff = diff_hashes(&before.hashes, &after.hashes);
    let hashes_changed = !hash_diff.is_empty();
    if hashes_changed {
        drift.hash_changes = Some(hash_diff);
    }

    if !licenses_equal(&before.licenses, &after.licenses) {
        let before_set: BTreeSet<&str> = before.licenses.iter().map(String::as_str).collect();
        let after_set: BTreeSet<&str> = after.licenses.iter().map(String::as_str).collect();
        for lic in after_set.difference(&before_set) {
            drift.licenses_diff.push(format!("+{lic}"));
        }
        for lic in before_set.difference(&after_set) {
            drift.licenses_diff.push(format!("-{lic}"));
        }
    }

    drift.drift_type = if hashes_changed && !version_changed {
        DriftType::Integrity
    } else if version_changed {
        DriftType::Version
    } else if !drift.licenses_diff.is_empty() {
        DriftType::Metadata
    } else {
        DriftType::None
    };

    drift
}

/// Order-independent license list equality.
pub(crate) fn licenses_equal(a: &[String], b: &[String]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    let mut a: Vec<&str> = a.iter().map(String::as_str).collect();
    let mut b: Vec<&str> = b.iter().map(String::as_str).collect();
    a.sort_unstable();
    b.sort_unstable();
    a == b
}

/// Aggregate drift statistics from changed components.
#[must_use]
pub fn summarize_drift(changes: &[super::ChangedComponent]) -> DriftSummary {
    let mut summary = DriftSummary::default();
    for c in changes {
        match c.drift.drift_type {
            DriftType::Version => summary.version_drift += 1,
            DriftType::Integrity => summary.integrity_drift += 1,
            DriftType::Metadata => summary.metadata_drift += 1,
            DriftType::None => {}
        }
    }
    summary
}
