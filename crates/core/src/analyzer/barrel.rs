//! Barrel / re-export chain analysis
//!
//! Computes the transitive export closure of aggregator ("barrel") files
//! and flags circular re-export chains. Re-export cycles are a distinct
//! issue kind from import cycles: they break symbol resolution even when
//! nothing cycles at runtime.

use std::collections::{BTreeSet, HashSet};

use super::GraphAnalyzer;
use crate::config::ArborConfig;
use crate::graph::{
    EdgeKind, GraphIssue, GraphStore, IssueKind, NodeId, NodeKind, Severity,
};

/// Barrel analyzer registered with the dispatcher
pub struct BarrelAnalyzer;

impl BarrelAnalyzer {
    pub fn new() -> Self {
        Self
    }
}

impl Default for BarrelAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

/// The full export surface of a file, following re-export edges
/// transitively. Named re-exports contribute their symbol lists; wildcard
/// re-exports contribute the target's own (transitive) exports. Cycles are
/// guarded by the visited set, so a circular chain terminates with
/// whatever was collected before closing the loop.
pub fn export_closure(store: &GraphStore, file: &NodeId) -> BTreeSet<String> {
    let mut closure: BTreeSet<String> = BTreeSet::new();
    let mut visited: HashSet<NodeId> = HashSet::new();
    collect_exports(store, file, &mut closure, &mut visited);
    closure
}

fn collect_exports(
    store: &GraphStore,
    file: &NodeId,
    closure: &mut BTreeSet<String>,
    visited: &mut HashSet<NodeId>,
) {
    if !visited.insert(file.clone()) {
        return;
    }
    let Some(node) = store.node(file) else {
        return;
    };
    closure.extend(node.meta().exports.iter().cloned());

    for (_, edge) in store.edges_from(file) {
        if edge.kind() != EdgeKind::Reexports {
            continue;
        }
        if edge.meta().is_wildcard {
            collect_exports(store, edge.to(), closure, visited);
        } else {
            closure.extend(edge.meta().symbols.iter().cloned());
        }
    }
}

/// Find cycles in the re-export edge set. Same stack-walk as import-cycle
/// detection, restricted to `Reexports` edges.
fn find_reexport_cycles(store: &GraphStore) -> Vec<Vec<String>> {
    let mut cycles: Vec<Vec<String>> = Vec::new();
    let mut seen: HashSet<Vec<String>> = HashSet::new();
    let mut visited: HashSet<NodeId> = HashSet::new();

    for node in store.nodes_by_kind(NodeKind::File) {
        if visited.contains(node.id()) {
            continue;
        }
        let mut stack: Vec<NodeId> = Vec::new();
        walk(store, node.id(), &mut stack, &mut visited, &mut seen, &mut cycles);
    }

    cycles.sort();
    cycles
}

fn walk(
    store: &GraphStore,
    node: &NodeId,
    stack: &mut Vec<NodeId>,
    visited: &mut HashSet<NodeId>,
    seen: &mut HashSet<Vec<String>>,
    cycles: &mut Vec<Vec<String>>,
) {
    stack.push(node.clone());

    let mut targets: Vec<NodeId> = store
        .edges_from(node)
        .into_iter()
        .filter(|(_, e)| e.kind() == EdgeKind::Reexports)
        .map(|(_, e)| e.to().clone())
        .collect();
    targets.sort();
    targets.dedup();

    for target in targets {
        if let Some(pos) = stack.iter().position(|n| n == &target) {
            let mut cycle: Vec<String> = stack[pos..]
                .iter()
                .map(|id| {
                    store
                        .node(id)
                        .and_then(|n| n.path().map(String::from))
                        .unwrap_or_else(|| id.to_string())
                })
                .collect();
            // Rotate to smallest member for deduplication
            if let Some(min_pos) = cycle
                .iter()
                .enumerate()
                .min_by_key(|(_, p)| p.clone())
                .map(|(i, _)| i)
            {
                cycle.rotate_left(min_pos);
            }
            if seen.insert(cycle.clone()) {
                cycles.push(cycle);
            }
        } else if !visited.contains(&target) && store.has_node(&target) {
            walk(store, &target, stack, visited, seen, cycles);
        }
    }

    stack.pop();
    visited.insert(node.clone());
}

impl GraphAnalyzer for BarrelAnalyzer {
    fn name(&self) -> &str {
        "barrel"
    }

    fn analyze(&self, store: &GraphStore, _config: &ArborConfig) -> Vec<GraphIssue> {
        find_reexport_cycles(store)
            .into_iter()
            .map(|cycle| {
                let mut chain: Vec<&str> = cycle
                    .iter()
                    .map(|p| p.rsplit('/').next().unwrap_or(p.as_str()))
                    .collect();
                chain.push(chain[0]);
                GraphIssue::new(
                    IssueKind::CircularReexport,
                    Severity::Error,
                    cycle.first().cloned().unwrap_or_default(),
                    format!("Circular re-export chain: {}", chain.join(" → ")),
                )
                .with_evidence(cycle)
            })
            .collect()
    }
}
