//! Dependency cycle detection
//!
//! Strongly-connected-component decomposition (petgraph's Tarjan) over
//! `imports`/`reexports` edges between file nodes, followed by bounded
//! elementary-cycle enumeration inside each component. Output is stable
//! for a stable graph: nodes are visited in identity order, every cycle is
//! rotated to start at its smallest member, and the final list is sorted.

use petgraph::algo::tarjan_scc;
use petgraph::graph::{DiGraph, NodeIndex};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap, HashSet};

use super::GraphAnalyzer;
use crate::config::{ArborConfig, CyclesConfig};
use crate::graph::{GraphIssue, GraphStore, IssueKind, NodeId, NodeKind, Severity};

/// Bounds for a cycle enumeration run
#[derive(Debug, Clone)]
pub struct CycleOptions {
    /// Restrict to files under this root-relative path prefix
    pub scope: Option<String>,

    /// Drop cycles shorter than this many members
    pub min_length: usize,

    /// Stop enumerating after this many cycles
    pub max_cycles: usize,
}

impl Default for CycleOptions {
    fn default() -> Self {
        Self {
            scope: None,
            min_length: 2,
            max_cycles: 50,
        }
    }
}

/// One detected dependency cycle
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Cycle {
    /// Member file paths in cycle order, starting at the smallest
    pub nodes: Vec<String>,
    pub length: usize,
    pub severity: Severity,

    /// `(from, to)` of the edge whose removal the heuristic suggests
    pub suggested_break: Option<(String, String)>,

    /// Human-readable chain, e.g. `a.ts → b.ts → a.ts`
    pub description: String,
}

/// Find all dependency cycles among file nodes.
pub fn find_cycles(store: &GraphStore, opts: &CycleOptions, config: &CyclesConfig) -> Vec<Cycle> {
    // Build a petgraph view of the dependency edges in scope
    let files: Vec<&NodeId> = store
        .nodes_by_kind(NodeKind::File)
        .into_iter()
        .filter(|n| match &opts.scope {
            Some(prefix) => n.path().map(|p| p.starts_with(prefix.as_str())).unwrap_or(false),
            None => true,
        })
        .map(|n| n.id())
        .collect();

    let mut graph: DiGraph<NodeId, ()> = DiGraph::new();
    let mut index_of: HashMap<&NodeId, NodeIndex> = HashMap::new();
    for id in &files {
        let idx = graph.add_node((*id).clone());
        index_of.insert(id, idx);
    }

    // Deduplicate parallel edges; petgraph cycles don't need multiplicity
    let mut seen: BTreeSet<(NodeIndex, NodeIndex)> = BTreeSet::new();
    for (_, edge) in store.all_edges() {
        if !edge.kind().is_dependency() {
            continue;
        }
        let (Some(&from), Some(&to)) = (index_of.get(edge.from()), index_of.get(edge.to()))
        else {
            continue;
        };
        if from != to && seen.insert((from, to)) {
            graph.add_edge(from, to, ());
        }
    }

    let mut cycles: Vec<Vec<NodeIndex>> = Vec::new();
    for component in tarjan_scc(&graph) {
        if component.len() < 2 {
            continue;
        }
        enumerate_cycles(&graph, &component, opts.max_cycles, &mut cycles);
        if cycles.len() >= opts.max_cycles {
            cycles.truncate(opts.max_cycles);
            break;
        }
    }

    let mut out: Vec<Cycle> = cycles
        .into_iter()
        .filter(|c| c.len() >= opts.min_length)
        .map(|members| describe_cycle(store, &graph, members, config))
        .collect();

    out.sort_by(|a, b| a.length.cmp(&b.length).then_with(|| a.nodes.cmp(&b.nodes)));
    out
}

/// Enumerate elementary cycles inside one SCC with a colored DFS. The DFS
/// visits members in identity order, so a stable graph yields a stable
/// cycle list.
fn enumerate_cycles(
    graph: &DiGraph<NodeId, ()>,
    component: &[NodeIndex],
    max_cycles: usize,
    cycles: &mut Vec<Vec<NodeIndex>>,
) {
    let members: BTreeSet<NodeIndex> = component.iter().copied().collect();
    let mut ordered: Vec<NodeIndex> = component.to_vec();
    ordered.sort_by_key(|&idx| graph[idx].clone());

    let mut seen: HashSet<Vec<NodeIndex>> = HashSet::new();
    let mut stack: Vec<NodeIndex> = Vec::new();
    let mut on_stack: HashSet<NodeIndex> = HashSet::new();
    let mut visited: HashSet<NodeIndex> = HashSet::new();

    for &start in &ordered {
        if visited.contains(&start) {
            continue;
        }
        dfs(
            graph, start, &members, &mut stack, &mut on_stack, &mut visited, &mut seen, cycles,
            max_cycles,
        );
        if cycles.len() >= max_cycles {
            return;
        }
    }
}

#[allow(clippy::too_many_arguments)]
fn dfs(
    graph: &DiGraph<NodeId, ()>,
    node: NodeIndex,
    members: &BTreeSet<NodeIndex>,
    stack: &mut Vec<NodeIndex>,
    on_stack: &mut HashSet<NodeIndex>,
    visited: &mut HashSet<NodeIndex>,
    seen: &mut HashSet<Vec<NodeIndex>>,
    cycles: &mut Vec<Vec<NodeIndex>>,
    max_cycles: usize,
) {
    visited.insert(node);
    on_stack.insert(node);
    stack.push(node);

    let mut neighbors: Vec<NodeIndex> = graph
        .neighbors(node)
        .filter(|n| members.contains(n))
        .collect();
    neighbors.sort_by_key(|&idx| graph[idx].clone());

    for neighbor in neighbors {
        if cycles.len() >= max_cycles {
            break;
        }
        if on_stack.contains(&neighbor) {
            // Found a cycle — extract it from the stack
            if let Some(pos) = stack.iter().position(|&n| n == neighbor) {
                let canonical = canonicalize(stack[pos..].to_vec(), graph);
                if seen.insert(canonical.clone()) {
                    cycles.push(canonical);
                }
            }
        } else if !visited.contains(&neighbor) {
            dfs(
                graph, neighbor, members, stack, on_stack, visited, seen, cycles, max_cycles,
            );
        }
    }

    stack.pop();
    on_stack.remove(&node);
}

/// Rotate a cycle to start at its smallest member for deduplication.
fn canonicalize(mut cycle: Vec<NodeIndex>, graph: &DiGraph<NodeId, ()>) -> Vec<NodeIndex> {
    if cycle.is_empty() {
        return cycle;
    }
    let min_pos = cycle
        .iter()
        .enumerate()
        .min_by_key(|(_, &idx)| graph[idx].clone())
        .map(|(i, _)| i)
        .unwrap_or(0);
    cycle.rotate_left(min_pos);
    cycle
}

/// Attach severity, break-point suggestion, and a readable description.
fn describe_cycle(
    store: &GraphStore,
    graph: &DiGraph<NodeId, ()>,
    members: Vec<NodeIndex>,
    config: &CyclesConfig,
) -> Cycle {
    let ids: Vec<NodeId> = members.iter().map(|&idx| graph[idx].clone()).collect();
    let paths: Vec<String> = ids
        .iter()
        .map(|id| {
            store
                .node(id)
                .and_then(|n| n.path().map(String::from))
                .unwrap_or_else(|| id.to_string())
        })
        .collect();

    let length = paths.len();
    let severity = if length >= config.error_length {
        Severity::Error
    } else {
        Severity::Warning
    };

    // Break-point heuristic: the edge into the member with the fewest
    // incoming edges from outside the cycle. Not a minimal feedback arc,
    // just the cheapest-looking seam.
    let cycle_set: BTreeSet<&NodeId> = ids.iter().collect();
    let mut best: Option<(usize, usize)> = None; // (position, outside_incoming)
    for (pos, id) in ids.iter().enumerate() {
        let outside = store
            .edges_to(id)
            .into_iter()
            .filter(|(_, e)| !cycle_set.contains(e.from()))
            .map(|(_, e)| (e.from().clone(), e.kind()))
            .collect::<BTreeSet<_>>()
            .len();
        if best.map(|(_, count)| outside < count).unwrap_or(true) {
            best = Some((pos, outside));
        }
    }
    let suggested_break = best.map(|(pos, _)| {
        let prev = (pos + length - 1) % length;
        (paths[prev].clone(), paths[pos].clone())
    });

    let mut chain: Vec<&str> = paths
        .iter()
        .map(|p| p.rsplit('/').next().unwrap_or(p.as_str()))
        .collect();
    chain.push(chain[0]);
    let description = chain.join(" → ");

    Cycle {
        nodes: paths,
        length,
        severity,
        suggested_break,
        description,
    }
}

/// The cycle analyzer as registered with the dispatcher
pub struct CycleDetector;

impl CycleDetector {
    pub fn new() -> Self {
        Self
    }
}

impl Default for CycleDetector {
    fn default() -> Self {
        Self::new()
    }
}

impl GraphAnalyzer for CycleDetector {
    fn name(&self) -> &str {
        "cycles"
    }

    fn analyze(&self, store: &GraphStore, config: &ArborConfig) -> Vec<GraphIssue> {
        let opts = CycleOptions {
            max_cycles: config.cycles.max_cycles,
            ..CycleOptions::default()
        };
        find_cycles(store, &opts, &config.cycles)
            .into_iter()
            .map(|cycle| {
                let mut evidence: Vec<String> = cycle.nodes.clone();
                if let Some((from, to)) = &cycle.suggested_break {
                    evidence.push(format!("suggested break: {} → {}", from, to));
                }
                GraphIssue::new(
                    IssueKind::CircularDependency,
                    cycle.severity,
                    cycle.nodes.first().cloned().unwrap_or_default(),
                    format!("Circular dependency: {}", cycle.description),
                )
                .with_evidence(evidence)
            })
            .collect()
    }
}
