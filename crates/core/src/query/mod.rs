//! Read-side queries over a graph store snapshot
//!
//! Four operations — digest, impact, path, module — plus the issue
//! listing, each a pure function of the store. Every report carries a
//! `truncated` flag; the engine wraps reports in an envelope with a token
//! estimate so budget-constrained callers can decide whether to ask for
//! more.

pub mod cache;

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashMap, VecDeque};

use crate::graph::{
    EdgeKind, GraphIssue, GraphStore, IssueKind, NodeId, NodeKind, Severity,
};

/// Default and maximum hop depth for impact traversal
pub const DEFAULT_IMPACT_DEPTH: usize = 2;
pub const MAX_IMPACT_DEPTH: usize = 4;

/// Defaults for path search
pub const DEFAULT_PATH_DEPTH: usize = 10;
pub const DEFAULT_MAX_PATHS: usize = 3;

/// Hard cap on BFS states explored by the path search
const PATH_SEARCH_BUDGET: usize = 10_000;

/// Risk classification for impact reports
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Hotspot {
    pub path: String,
    pub incoming: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntrypointInfo {
    pub path: String,
    pub name: String,
    pub kind: Option<String>,
}

/// Codebase summary
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DigestReport {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scope: Option<String>,
    pub files: usize,
    pub external_modules: usize,
    pub edges: usize,
    pub hotspots: Vec<Hotspot>,
    pub entrypoints: Vec<EntrypointInfo>,
    pub issues_by_kind: BTreeMap<String, usize>,
    pub truncated: bool,
}

/// Blast radius of a change
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImpactReport {
    pub target: String,
    pub depth: usize,
    pub direct_dependents: Vec<String>,
    /// `transitive_by_depth[0]` holds depth-1 dependents, and so on; each
    /// node appears only at its minimum distance
    pub transitive_by_depth: Vec<Vec<String>>,
    pub affected_entrypoints: Vec<EntrypointInfo>,
    pub total_dependents: usize,
    pub risk: RiskLevel,
    pub truncated: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathEntry {
    pub nodes: Vec<String>,
    /// Number of edges, i.e. `nodes.len() - 1`
    pub length: usize,
}

/// Dependency chains between two nodes
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathReport {
    pub from: String,
    pub to: String,
    pub connected: bool,
    pub paths: Vec<PathEntry>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shortest_path: Option<PathEntry>,
    /// The search hit its depth bound before exhausting the space
    pub max_depth_reached: bool,
    pub truncated: bool,
}

/// Details of one module
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModuleReport {
    pub path: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    pub is_barrel: bool,
    pub exports: Vec<String>,
    pub imports: Vec<String>,
    pub imported_by: Vec<String>,
    pub reexports: Vec<String>,
    pub entrypoints: Vec<EntrypointInfo>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transitive_exports: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transitive_dependencies: Option<Vec<String>>,
    pub truncated: bool,
}

/// Filter for the issue listing
#[derive(Debug, Clone, Default)]
pub struct IssueFilter {
    pub kind: Option<IssueKind>,
    pub severity: Option<Severity>,
    pub scope: Option<String>,
    pub limit: Option<usize>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IssuesReport {
    pub issues: Vec<GraphIssue>,
    pub total: usize,
    pub counts_by_kind: BTreeMap<String, usize>,
    pub truncated: bool,
}

/// The read API over a store snapshot.
pub struct GraphQuery<'a> {
    store: &'a GraphStore,
    max_items: usize,
}

impl<'a> GraphQuery<'a> {
    pub fn new(store: &'a GraphStore, max_items: usize) -> Self {
        Self {
            store,
            max_items: max_items.max(1),
        }
    }

    // ── digest ─────────────────────────────────────────────────

    pub fn digest(&self, scope: Option<&str>) -> DigestReport {
        let in_scope = |path: Option<&str>| match scope {
            Some(prefix) => path.map(|p| p.starts_with(prefix)).unwrap_or(false),
            None => true,
        };

        let files: Vec<_> = self
            .store
            .nodes_by_kind(NodeKind::File)
            .into_iter()
            .filter(|n| in_scope(n.path()))
            .collect();

        // Deduplicated edge count among in-scope files
        let mut edge_keys: BTreeSet<(String, String, EdgeKind)> = BTreeSet::new();
        for (_, edge) in self.store.all_edges() {
            let from_ok = self
                .store
                .node(edge.from())
                .map(|n| in_scope(n.path()))
                .unwrap_or(false);
            if from_ok {
                edge_keys.insert((
                    edge.from().to_string(),
                    edge.to().to_string(),
                    edge.kind(),
                ));
            }
        }

        // Hotspots: most-imported files first, path as tiebreak
        let mut hotspots: Vec<Hotspot> = files
            .iter()
            .map(|n| Hotspot {
                path: n.path().unwrap_or_default().to_string(),
                incoming: self.store.incoming_count(n.id()),
            })
            .filter(|h| h.incoming > 0)
            .collect();
        hotspots.sort_by(|a, b| b.incoming.cmp(&a.incoming).then_with(|| a.path.cmp(&b.path)));

        let entrypoints: Vec<EntrypointInfo> = self
            .store
            .nodes_by_kind(NodeKind::Entrypoint)
            .into_iter()
            .filter(|n| in_scope(n.path()))
            .map(entrypoint_info)
            .collect();

        let mut issues_by_kind: BTreeMap<String, usize> = BTreeMap::new();
        for issue in self.store.issues() {
            if in_scope(Some(&issue.file)) {
                *issues_by_kind.entry(issue.kind.as_str().to_string()).or_default() += 1;
            }
        }

        let truncated = hotspots.len() > self.max_items || entrypoints.len() > self.max_items;
        DigestReport {
            scope: scope.map(String::from),
            files: files.len(),
            external_modules: self.store.nodes_by_kind(NodeKind::Module).len(),
            edges: edge_keys.len(),
            hotspots: clip(hotspots, self.max_items),
            entrypoints: clip(entrypoints, self.max_items),
            issues_by_kind,
            truncated,
        }
    }

    // ── impact ─────────────────────────────────────────────────

    /// Breadth-first traversal of incoming edges from `target`, bucketed
    /// by exact minimum distance.
    pub fn impact(&self, target: &NodeId, depth: usize) -> ImpactReport {
        let depth = depth.clamp(1, MAX_IMPACT_DEPTH);

        let mut distance: HashMap<NodeId, usize> = HashMap::new();
        let mut by_depth: Vec<Vec<String>> = vec![Vec::new(); depth];
        let mut affected_entrypoints: Vec<EntrypointInfo> = Vec::new();
        let mut queue: VecDeque<(NodeId, usize)> = VecDeque::new();

        distance.insert(target.clone(), 0);
        queue.push_back((target.clone(), 0));

        while let Some((current, d)) = queue.pop_front() {
            if d >= depth {
                continue;
            }
            let mut dependents: Vec<NodeId> = self
                .store
                .edges_to(&current)
                .into_iter()
                .map(|(_, e)| e.from().clone())
                .collect();
            dependents.sort();
            dependents.dedup();

            for dependent in dependents {
                if distance.contains_key(&dependent) {
                    continue;
                }
                distance.insert(dependent.clone(), d + 1);
                queue.push_back((dependent.clone(), d + 1));

                match self.store.node(&dependent) {
                    Some(node) if node.kind() == NodeKind::Entrypoint => {
                        affected_entrypoints.push(entrypoint_info(node));
                    }
                    Some(node) if node.kind() == NodeKind::File => {
                        by_depth[d].push(node.path().unwrap_or_default().to_string());
                    }
                    _ => {}
                }
            }
        }

        let total_dependents: usize = by_depth.iter().map(|v| v.len()).sum();
        let risk = if !affected_entrypoints.is_empty() || total_dependents >= 10 {
            RiskLevel::High
        } else if total_dependents >= 3 {
            RiskLevel::Medium
        } else {
            RiskLevel::Low
        };

        let truncated = by_depth.iter().any(|v| v.len() > self.max_items);
        let direct_dependents = clip(by_depth.first().cloned().unwrap_or_default(), self.max_items);
        let transitive_by_depth: Vec<Vec<String>> = by_depth
            .into_iter()
            .map(|level| clip(level, self.max_items))
            .collect();

        ImpactReport {
            target: display_name(self.store, target),
            depth,
            direct_dependents,
            transitive_by_depth,
            affected_entrypoints,
            total_dependents,
            risk,
            truncated,
        }
    }

    // ── path ───────────────────────────────────────────────────

    /// Enumerate up to `max_paths` shortest dependency chains from `from`
    /// to `to`, ties broken by discovery order.
    pub fn path(
        &self,
        from: &NodeId,
        to: &NodeId,
        max_depth: usize,
        max_paths: usize,
    ) -> PathReport {
        let max_depth = max_depth.max(1);
        let max_paths = max_paths.max(1);

        let mut found: Vec<Vec<NodeId>> = Vec::new();
        let mut queue: VecDeque<Vec<NodeId>> = VecDeque::new();
        let mut explored = 0usize;
        let mut max_depth_reached = false;
        let mut truncated = false;

        queue.push_back(vec![from.clone()]);

        while let Some(path) = queue.pop_front() {
            explored += 1;
            if explored > PATH_SEARCH_BUDGET {
                truncated = true;
                break;
            }

            let Some(current) = path.last().cloned() else {
                continue;
            };
            if &current == to && path.len() > 1 {
                found.push(path);
                if found.len() >= max_paths {
                    truncated = !queue.is_empty();
                    break;
                }
                continue;
            }
            if path.len() - 1 >= max_depth {
                max_depth_reached = true;
                continue;
            }

            let mut next: Vec<NodeId> = self
                .store
                .edges_from(&current)
                .into_iter()
                .map(|(_, e)| e.to().clone())
                .collect();
            next.sort();
            next.dedup();

            for target in next {
                if path.contains(&target) {
                    continue; // no revisits within one path
                }
                let mut extended = path.clone();
                extended.push(target);
                queue.push_back(extended);
            }
        }

        let entries: Vec<PathEntry> = found
            .iter()
            .map(|path| PathEntry {
                nodes: path.iter().map(|id| display_name(self.store, id)).collect(),
                length: path.len() - 1,
            })
            .collect();

        PathReport {
            from: display_name(self.store, from),
            to: display_name(self.store, to),
            connected: !entries.is_empty(),
            shortest_path: entries.first().cloned(),
            paths: entries,
            max_depth_reached,
            truncated,
        }
    }

    // ── module ─────────────────────────────────────────────────

    pub fn module(&self, target: &NodeId, include_transitive: bool) -> ModuleReport {
        let node = self.store.node(target);
        let path = node
            .and_then(|n| n.path().map(String::from))
            .unwrap_or_else(|| target.to_string());

        let mut imports: Vec<String> = Vec::new();
        let mut reexports: Vec<String> = Vec::new();
        for (_, edge) in self.store.edges_from(target) {
            let name = display_name(self.store, edge.to());
            match edge.kind() {
                EdgeKind::Imports => imports.push(name),
                EdgeKind::Reexports => reexports.push(name),
                _ => {}
            }
        }
        imports.sort();
        imports.dedup();
        reexports.sort();
        reexports.dedup();

        let mut imported_by: Vec<String> = self
            .store
            .edges_to(target)
            .into_iter()
            .filter(|(_, e)| matches!(e.kind(), EdgeKind::Imports | EdgeKind::Reexports))
            .map(|(_, e)| display_name(self.store, e.from()))
            .collect();
        imported_by.sort();
        imported_by.dedup();

        let entrypoints: Vec<EntrypointInfo> = self
            .store
            .nodes_by_kind(NodeKind::Entrypoint)
            .into_iter()
            .filter(|n| n.path() == Some(path.as_str()))
            .map(entrypoint_info)
            .collect();

        let is_barrel = node.map(|n| n.meta().is_barrel).unwrap_or(false);
        let transitive_exports = (include_transitive && is_barrel).then(|| {
            crate::analyzer::barrel::export_closure(self.store, target)
                .into_iter()
                .collect()
        });
        let transitive_dependencies = include_transitive.then(|| {
            let mut deps = self.transitive_dependencies(target);
            deps.sort();
            deps
        });

        let truncated = imports.len() > self.max_items
            || imported_by.len() > self.max_items
            || reexports.len() > self.max_items;

        ModuleReport {
            path,
            language: node.and_then(|n| n.meta().language.clone()),
            is_barrel,
            exports: node.map(|n| n.meta().exports.clone()).unwrap_or_default(),
            imports: clip(imports, self.max_items),
            imported_by: clip(imported_by, self.max_items),
            reexports: clip(reexports, self.max_items),
            entrypoints,
            transitive_exports,
            transitive_dependencies,
            truncated,
        }
    }

    fn transitive_dependencies(&self, target: &NodeId) -> Vec<String> {
        let mut visited: BTreeSet<NodeId> = BTreeSet::new();
        let mut queue: VecDeque<NodeId> = VecDeque::new();
        visited.insert(target.clone());
        queue.push_back(target.clone());

        let mut result = Vec::new();
        while let Some(current) = queue.pop_front() {
            for (_, edge) in self.store.edges_from(&current) {
                if !edge.kind().is_dependency() {
                    continue;
                }
                if visited.insert(edge.to().clone()) {
                    result.push(display_name(self.store, edge.to()));
                    queue.push_back(edge.to().clone());
                }
            }
        }
        result
    }

    // ── issues ─────────────────────────────────────────────────

    pub fn issues(&self, filter: &IssueFilter) -> IssuesReport {
        let matching: Vec<GraphIssue> = self
            .store
            .issues()
            .iter()
            .filter(|issue| {
                filter.kind.map(|k| issue.kind == k).unwrap_or(true)
                    && filter.severity.map(|s| issue.severity == s).unwrap_or(true)
                    && filter
                        .scope
                        .as_deref()
                        .map(|prefix| issue.file.starts_with(prefix))
                        .unwrap_or(true)
            })
            .cloned()
            .collect();

        let total = matching.len();
        let mut counts_by_kind: BTreeMap<String, usize> = BTreeMap::new();
        for issue in &matching {
            *counts_by_kind.entry(issue.kind.as_str().to_string()).or_default() += 1;
        }

        let limit = filter.limit.unwrap_or(self.max_items);
        let truncated = total > limit;
        IssuesReport {
            issues: clip(matching, limit),
            total,
            counts_by_kind,
            truncated,
        }
    }
}

/// Rough token estimate for a serialized result (~4 chars per token).
pub fn estimate_tokens(serialized: &str) -> usize {
    serialized.len().div_ceil(4)
}

fn entrypoint_info(node: &crate::graph::GraphNode) -> EntrypointInfo {
    EntrypointInfo {
        path: node.path().unwrap_or_default().to_string(),
        name: node.name().to_string(),
        kind: node.meta().entrypoint_kind.map(|k| k.as_str().to_string()),
    }
}

/// Display a node as its path (files), specifier (externals), or id.
fn display_name(store: &GraphStore, id: &NodeId) -> String {
    match store.node(id) {
        Some(node) => match node.kind() {
            NodeKind::File => node.path().unwrap_or_default().to_string(),
            NodeKind::Module => node.name().to_string(),
            NodeKind::Entrypoint => {
                format!("{}#{}", node.path().unwrap_or_default(), node.name())
            }
        },
        None => id.to_string(),
    }
}

fn clip<T>(mut items: Vec<T>, max: usize) -> Vec<T> {
    items.truncate(max);
    items
}
