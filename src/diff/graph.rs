//! Dependency graph construction and reachability diffing.
//!
//! The graph is an adjacency map from component identity to declared
//! dependency identities, exactly as written in the document — dangling
//! edges are allowed. Reachability diffing finds dependencies that became
//! reachable (or stopped being reachable) from the graph roots, with the
//! shortest path and depth recorded for each.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashSet, VecDeque};

use crate::model::Component;

/// Adjacency map: identity → declared dependency identities.
pub type AdjacencyMap = BTreeMap<String, Vec<String>>;

/// Dependency changes between two SBOMs.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DependencyDiff {
    /// Per-source edges present only in the candidate.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub added_deps: BTreeMap<String, Vec<String>>,
    /// Per-source edges present only in the baseline.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub removed_deps: BTreeMap<String, Vec<String>>,
    /// Dependencies newly reachable from a root at depth > 1.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub transitive_new: Vec<TransitiveDep>,
    /// Dependencies that stopped being reachable from a root at depth > 1.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub transitive_lost: Vec<TransitiveDep>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub depth_summary: Option<DepthSummary>,
}

/// A transitive dependency with the shortest path that reaches it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransitiveDep {
    pub target: String,
    /// Path from a root to the target, inclusive on both ends.
    pub via: Vec<String>,
    /// Path length minus one.
    pub depth: usize,
}

/// New transitive dependencies bucketed by depth.
///
/// `depth_1` is retained for direct-edge accounting but is always 0 under
/// the reachability diff, which only emits entries with depth > 1.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DepthSummary {
    pub depth_1: usize,
    pub depth_2: usize,
    pub depth_3_plus: usize,
}

impl DependencyDiff {
    /// True when no dependency changes were detected.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.added_deps.is_empty()
            && self.removed_deps.is_empty()
            && self.transitive_new.is_empty()
            && self.transitive_lost.is_empty()
    }
}

/// Build the adjacency map from a component list.
///
/// Later components with a duplicate identity overwrite earlier entries,
/// matching the key semantics of a plain map.
#[must_use]
pub fn build_graph(comps: &[Component]) -> AdjacencyMap {
    let mut graph = AdjacencyMap::new();
    for c in comps {
        graph.insert(c.id.clone(), c.dependencies.clone());
    }
    graph
}

/// Find root nodes: keys that never appear as a target of any edge.
///
/// Returns a sorted list. Callers fall back to all keys when the graph has
/// no roots (purely cyclic graphs).
#[must_use]
pub fn find_roots(graph: &AdjacencyMap) -> Vec<String> {
    let is_target: HashSet<&str> = graph
        .values()
        .flat_map(|deps| deps.iter().map(String::as_str))
        .collect();

    graph
        .keys()
        .filter(|node| !is_target.contains(node.as_str()))
        .cloned()
        .collect()
}

/// All nodes reachable from `start` via BFS, excluding `start` itself.
///
/// Cycles are tolerated through the visited set; the start node stays
/// excluded even when a cycle leads back to it.
#[must_use]
pub fn bfs_reachable(graph: &AdjacencyMap, start: &str) -> BTreeSet<String> {
    let mut visited: BTreeSet<String> = BTreeSet::new();
    let mut queue: VecDeque<&str> = VecDeque::new();
    queue.push_back(start);

    while let Some(current) = queue.pop_front() {
        if !visited.insert(current.to_string()) {
            continue;
        }
        if let Some(deps) = graph.get(current) {
            for dep in deps {
                if !visited.contains(dep) {
                    queue.push_back(dep);
                }
            }
        }
    }

    visited.remove(start);
    visited
}

/// Shortest path from `start` to `target` via BFS.
///
/// Returns the path (starting at `start`, ending at `target`) and its depth
/// (path length minus one), or `None` when the target is unreachable.
#[must_use]
pub fn bfs_with_path(graph: &AdjacencyMap, start: &str, target: &str) -> Option<(Vec<String>, usize)> {
    if start == target {
        return None;
    }

    let mut visited: HashSet<String> = HashSet::new();
    let mut queue: VecDeque<Vec<String>> = VecDeque::new();
    queue.push_back(vec![start.to_string()]);

    while let Some(path) = queue.pop_front() {
        let current = path.last().map(String::as_str).unwrap_or(start);
        if !visited.insert(current.to_string()) {
            continue;
        }
        if let Some(deps) = graph.get(current) {
            for dep in deps {
                let mut next = path.clone();
                next.push(dep.clone());
                if dep == target {
                    let depth = next.len() - 1;
                    return Some((next, depth));
                }
                if !visited.contains(dep) {
                    queue.push_back(next);
                }
            }
        }
    }

    None
}

/// Diff the dependency graphs of two SBOMs.
///
/// Edge changes are the per-source symmetric difference of target lists.
/// Transitive changes are computed per root (falling back to every node
/// when the graph is purely cyclic); a target counts once across all roots,
/// first discovery wins, and only depths greater than 1 are reported.
#[must_use]
pub fn diff_dependency_graphs(before: &AdjacencyMap, after: &AdjacencyMap) -> DependencyDiff {
    let mut diff = DependencyDiff::default();

    for (id, after_deps) in after {
        let before_set: HashSet<&str> = before
            .get(id)
            .map(|deps| deps.iter().map(String::as_str).collect())
            .unwrap_or_default();

        let mut added: Vec<String> = after_deps
            .iter()
            .filter(|dep| !before_set.contains(dep.as_str()))
            .cloned()
            .collect();
        if !added.is_empty() {
            added.sort();
            diff.added_deps.insert(id.clone(), added);
        }
    }

    for (id, before_deps) in before {
        let after_set: HashSet<&str> = after
            .get(id)
            .map(|deps| deps.iter().map(String::as_str).collect())
            .unwrap_or_default();

        let mut removed: Vec<String> = before_deps
            .iter()
            .filter(|dep| !after_set.contains(dep.as_str()))
            .cloned()
            .collect();
        if !removed.is_empty() {
            removed.sort();
            diff.removed_deps.insert(id.clone(), removed);
        }
    }

    diff.transitive_new = diff_reachability(after, before);
    diff.transitive_lost = diff_reachability(before, after);

    if !diff.transitive_new.is_empty() {
        diff.depth_summary = Some(depth_summary(&diff.transitive_new));
    }

    diff
}

/// Targets reachable from the roots of `primary` that are not reachable
/// from the same root in `other`, restricted to depth > 1 in `primary`.
fn diff_reachability(primary: &AdjacencyMap, other: &AdjacencyMap) -> Vec<TransitiveDep> {
    let mut roots = find_roots(primary);
    if roots.is_empty() {
        roots = primary.keys().cloned().collect();
    }

    let mut seen: HashSet<String> = HashSet::new();
    let mut deps = Vec::new();

    for root in &roots {
        let primary_reach = bfs_reachable(primary, root);
        let other_reach = bfs_reachable(other, root);

        for target in &primary_reach {
            if other_reach.contains(target) || seen.contains(target) {
                continue;
            }
            if let Some((via, depth)) = bfs_with_path(primary, root, target) {
                if depth > 1 {
                    deps.push(TransitiveDep {
                        target: target.clone(),
                        via,
                        depth,
                    });
                    seen.insert(target.clone());
                }
            }
        }
    }

    deps.sort_by(|a, b| a.target.cmp(&b.target));
    deps
}

/// Bucket transitive dependencies by depth.
fn depth_summary(deps: &[TransitiveDep]) -> DepthSummary {
    let mut summary = DepthSummary::default();
    for dep in deps {
        match dep.depth {
            1 => summary.depth_1 += 1,
            2 => summary.depth_2 += 1,
            _ => summary.depth_3_plus += 1,
        }
    }
    summary
}
