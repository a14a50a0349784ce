//! The differ: added / removed / changed sets plus the derived analyses.
//!
//! Pure over its inputs — two normalized component lists go in, a
//! [`DiffResult`] comes out. Malformed input is the ingest layer's
//! concern; nothing in here can fail.

mod drift;
mod duplicates;
pub mod graph;

pub use drift::{
    classify_drift, diff_hashes, summarize_drift, DriftInfo, DriftSummary, DriftType, HashChange,
    HashDiff,
};
pub use duplicates::{
    detect_collisions, detect_duplicates, diff_duplicate_versions, Collision, CollisionReason,
    DuplicateGroup, DuplicateReport, DuplicateVersionDiff,
};
pub use graph::{
    bfs_reachable, bfs_with_path, build_graph, diff_dependency_graphs, find_roots, AdjacencyMap,
    DependencyDiff, DepthSummary, TransitiveDep,
};

use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

use crate::model::Component;

/// A component that changed between the two SBOMs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChangedComponent {
    pub id: String,
    pub name: String,
    pub before: Component,
    pub after: Component,
    /// Human-readable change strings ("version: 1.0 -> 1.1").
    pub changes: Vec<String>,
    pub drift: DriftInfo,
}

/// Complete result of comparing two SBOMs.
///
/// The three component lists are sorted by identity (byte-wise) and are
/// disjoint with respect to identity. Sub-analyses are either present and
/// complete or omitted.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DiffResult {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub added: Vec<Component>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub removed: Vec<Component>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub changed: Vec<ChangedComponent>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duplicates: Option<DuplicateReport>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dependencies: Option<DependencyDiff>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub drift_summary: Option<DriftSummary>,
}

impl DiffResult {
    /// True when no components were added, removed, or changed.
    ///
    /// This is the emptiness the exit contract cares about; duplicate and
    /// dependency reports do not count.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty() && self.changed.is_empty()
    }
}

/// Compare two matched components, returning one change string per
/// differing field.
///
/// Version, licenses (order-independent), and any hash algorithm present
/// on both sides with differing values are compared. Hash algorithms are
/// visited in the baseline's stored order.
#[must_use]
pub fn compare_components(before: &Component, after: &Component) -> Vec<String> {
    let mut changes = Vec::new();

    if before.version != after.version {
        changes.push(format!("version: {} -> {}", before.version, after.version));
    }
    if !drift::licenses_equal(&before.licenses, &after.licenses) {
        changes.push(format!(
            "licenses: [{}] -> [{}]",
            before.licenses.join(", "),
            after.licenses.join(", ")
        ));
    }
    for (algo, hash) in &before.hashes {
        if let Some(new_hash) = after.hashes.get(algo) {
            if hash != new_hash {
                changes.push(format!("hash[{algo}]: {hash} -> {new_hash}"));
            }
        }
    }

    changes
}

/// Diff two normalized component lists.
///
/// Identity maps are first-wins on duplicates: later components with the
/// same identity are surfaced by the duplicate detector, not here.
#[must_use]
pub fn diff_components(before: &[Component], after: &[Component]) -> DiffResult {
    let before_dups = detect_duplicates(before);
    let after_dups = detect_duplicates(after);

    let mut before_map: HashMap<&str, &Component> = HashMap::new();
    for c in before {
        before_map.entry(c.id.as_str()).or_insert(c);
    }
    let mut after_map: HashMap<&str, &Component> = HashMap::new();
    for c in after {
        after_map.entry(c.id.as_str()).or_insert(c);
    }

    let mut result = DiffResult::default();

    for (id, c) in &after_map {
        if !before_map.contains_key(id) {
            result.added.push((*c).clone());
        }
    }
    for (id, c) in &before_map {
        if !after_map.contains_key(id) {
            result.removed.push((*c).clone());
        }
    }

    for (id, b) in &before_map {
        let Some(a) = after_map.get(id) else {
            continue;
        };
        let changes = compare_components(b, a);
        if changes.is_empty() {
            continue;
        }
        let drift = classify_drift(b, a);
        result.changed.push(ChangedComponent {
            id: (*id).to_string(),
            name: b.name.clone(),
            before: (*b).clone(),
            after: (*a).clone(),
            changes,
            drift,
        });
    }

    result.added.sort_by(|a, b| a.id.cmp(&b.id));
    result.removed.sort_by(|a, b| a.id.cmp(&b.id));
    result.changed.sort_by(|a, b| a.id.cmp(&b.id));

    let summary = summarize_drift(&result.changed);
    if !summary.is_empty() {
        result.drift_summary = Some(summary);
    }

    result.duplicates = assemble_duplicate_report(before, after, before_dups, after_dups);

    let dep_diff = diff_dependency_graphs(&build_graph(before), &build_graph(after));
    if !dep_diff.is_empty() {
        result.dependencies = Some(dep_diff);
    }

    result
}

/// Build the duplicate report: groups on both sides, their version delta,
/// and collisions from both SBOMs deduplicated by `(identity, reason)`.
fn assemble_duplicate_report(
    before: &[Component],
    after: &[Component],
    before_dups: Vec<DuplicateGroup>,
    after_dups: Vec<DuplicateGroup>,
) -> Option<DuplicateReport> {
    let mut report = DuplicateReport::default();

    if !before_dups.is_empty() || !after_dups.is_empty() {
        let version_diff =
            diff_duplicate_versions(&before_dups, &after_dups, before, after);
        if !version_diff.is_empty() {
            report.version_diff = Some(version_diff);
        }
        report.before = before_dups;
        report.after = after_dups;
    }

    let mut seen: HashSet<(String, &'static str)> = HashSet::new();
    for collision in detect_collisions(before)
        .into_iter()
        .chain(detect_collisions(after))
    {
        if seen.insert((collision.id.clone(), collision.reason.as_str())) {
            report.collisions.push(collision);
        }
    }

    if report.is_empty() {
        None
    } else {
        Some(report)
    }
}
