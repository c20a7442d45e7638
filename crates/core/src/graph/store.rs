//! The canonical graph store: nodes, edges, issues, and their indices

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};
use std::time::SystemTime;

use super::edge::{EdgeId, EdgeKind, GraphEdge};
use super::issue::GraphIssue;
use super::node::{GraphNode, NodeId, NodeKind};

/// Bookkeeping about the last index pass
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StoreMeta {
    /// When the last full or incremental index completed
    pub last_indexed: Option<SystemTime>,

    /// Duration of the last full build in milliseconds
    pub duration_ms: u64,

    /// Number of source files covered by the last full build
    pub file_count: usize,
}

/// The single source of truth for nodes, edges, and detected issues.
///
/// All mutation goes through `&mut self`; concurrent callers wrap the store
/// in a lock (see `GraphEngine`) so readers observe either the pre- or
/// post-mutation snapshot, never a partial one. The store performs no I/O
/// and no parsing.
///
/// Edges live in a tombstoned slab: `EdgeId`s stay valid across unrelated
/// removals, and the incoming/outgoing adjacency indices keep impact-style
/// queries proportional to the edges touching a node rather than the whole
/// edge set.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GraphStore {
    nodes: BTreeMap<NodeId, GraphNode>,
    edges: Vec<Option<GraphEdge>>,
    by_kind: BTreeMap<NodeKind, BTreeSet<NodeId>>,
    outgoing: HashMap<NodeId, Vec<EdgeId>>,
    incoming: HashMap<NodeId, Vec<EdgeId>>,
    issues: Vec<GraphIssue>,
    meta: StoreMeta,
}

impl GraphStore {
    pub fn new() -> Self {
        Self {
            nodes: BTreeMap::new(),
            edges: Vec::new(),
            by_kind: BTreeMap::new(),
            outgoing: HashMap::new(),
            incoming: HashMap::new(),
            issues: Vec::new(),
            meta: StoreMeta::default(),
        }
    }

    // ── Nodes ──────────────────────────────────────────────────

    /// Upsert a node by identity. An existing node keeps its identity and
    /// has the incoming metadata merged in; it is never duplicated.
    pub fn add_node(&mut self, node: GraphNode) {
        match self.nodes.get_mut(node.id()) {
            Some(existing) => {
                existing.meta_mut().merge(node.meta().clone());
            }
            None => {
                self.by_kind
                    .entry(node.kind())
                    .or_default()
                    .insert(node.id().clone());
                self.nodes.insert(node.id().clone(), node);
            }
        }
    }

    pub fn node(&self, id: &NodeId) -> Option<&GraphNode> {
        self.nodes.get(id)
    }

    pub fn node_mut(&mut self, id: &NodeId) -> Option<&mut GraphNode> {
        self.nodes.get_mut(id)
    }

    pub fn has_node(&self, id: &NodeId) -> bool {
        self.nodes.contains_key(id)
    }

    /// All nodes of one kind, in identity order.
    pub fn nodes_by_kind(&self, kind: NodeKind) -> Vec<&GraphNode> {
        self.by_kind
            .get(&kind)
            .map(|ids| ids.iter().filter_map(|id| self.nodes.get(id)).collect())
            .unwrap_or_default()
    }

    /// All nodes in identity order.
    pub fn all_nodes(&self) -> impl Iterator<Item = &GraphNode> {
        self.nodes.values()
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    // ── Edges ──────────────────────────────────────────────────

    /// Append an edge. Duplicate `(from, to, kind)` triples are permitted
    /// (they may carry distinct reasons); queries deduplicate when counting.
    pub fn add_edge(&mut self, edge: GraphEdge) -> EdgeId {
        let id = EdgeId(self.edges.len());
        self.outgoing.entry(edge.from().clone()).or_default().push(id);
        self.incoming.entry(edge.to().clone()).or_default().push(id);
        self.edges.push(Some(edge));
        id
    }

    pub fn edge(&self, id: EdgeId) -> Option<&GraphEdge> {
        self.edges.get(id.0).and_then(|slot| slot.as_ref())
    }

    /// All live edges with their ids.
    pub fn all_edges(&self) -> impl Iterator<Item = (EdgeId, &GraphEdge)> {
        self.edges
            .iter()
            .enumerate()
            .filter_map(|(i, slot)| slot.as_ref().map(|e| (EdgeId(i), e)))
    }

    pub fn edge_count(&self) -> usize {
        self.edges.iter().filter(|slot| slot.is_some()).count()
    }

    /// Outgoing edges of a node.
    pub fn edges_from(&self, id: &NodeId) -> Vec<(EdgeId, &GraphEdge)> {
        self.adjacent(&self.outgoing, id)
    }

    /// Incoming edges of a node.
    pub fn edges_to(&self, id: &NodeId) -> Vec<(EdgeId, &GraphEdge)> {
        self.adjacent(&self.incoming, id)
    }

    fn adjacent<'a>(
        &'a self,
        index: &'a HashMap<NodeId, Vec<EdgeId>>,
        id: &NodeId,
    ) -> Vec<(EdgeId, &'a GraphEdge)> {
        index
            .get(id)
            .map(|ids| {
                ids.iter()
                    .filter_map(|&eid| self.edge(eid).map(|e| (eid, e)))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Count incoming edges of a node, deduplicated by `(from, to, kind)`.
    pub fn incoming_count(&self, id: &NodeId) -> usize {
        let mut seen: HashSet<(&NodeId, EdgeKind)> = HashSet::new();
        for (_, edge) in self.edges_to(id) {
            seen.insert((edge.from(), edge.kind()));
        }
        seen.len()
    }

    fn remove_edge(&mut self, id: EdgeId) {
        let Some(edge) = self.edges.get_mut(id.0).and_then(|slot| slot.take()) else {
            return;
        };
        if let Some(out) = self.outgoing.get_mut(edge.from()) {
            out.retain(|&eid| eid != id);
        }
        if let Some(inc) = self.incoming.get_mut(edge.to()) {
            inc.retain(|&eid| eid != id);
        }
    }

    // ── File-scoped mutation (incremental updates) ─────────────

    /// Node ids owned by a file: its file node plus every entrypoint
    /// detected in it. External module placeholders are shared, not owned.
    pub fn nodes_owned_by(&self, path: &str) -> Vec<NodeId> {
        self.nodes
            .values()
            .filter(|n| {
                n.path() == Some(path)
                    && matches!(n.kind(), NodeKind::File | NodeKind::Entrypoint)
            })
            .map(|n| n.id().clone())
            .collect()
    }

    /// Replace a file's owned nodes and outgoing edges with a freshly
    /// indexed set. Edges where the file is only the `to` endpoint are
    /// left untouched.
    pub fn replace_file(
        &mut self,
        path: &str,
        nodes: Vec<GraphNode>,
        edges: Vec<GraphEdge>,
    ) {
        let owned = self.nodes_owned_by(path);
        for id in &owned {
            let out: Vec<EdgeId> = self.outgoing.get(id).cloned().unwrap_or_default();
            for eid in out {
                self.remove_edge(eid);
            }
            // Keep the incoming index: edges from other files still point
            // at this identity and survive the swap
            self.drop_node_keep_incoming(id);
        }
        for node in nodes {
            self.add_node(node);
        }
        for edge in edges {
            self.add_edge(edge);
        }
        self.prune_orphan_externals();
    }

    /// Remove a deleted file: its owned nodes and every edge with one of
    /// them as an endpoint.
    pub fn remove_file(&mut self, path: &str) {
        let owned = self.nodes_owned_by(path);
        for id in &owned {
            let mut touching: Vec<EdgeId> =
                self.outgoing.get(id).cloned().unwrap_or_default();
            touching.extend(self.incoming.get(id).cloned().unwrap_or_default());
            for eid in touching {
                self.remove_edge(eid);
            }
            self.drop_node(id);
        }
        self.prune_orphan_externals();
    }

    /// Remove edges between two nodes carrying a specific reason string.
    /// Used when a manual annotation is withdrawn.
    pub fn remove_edges_with_reason(&mut self, from: &NodeId, to: &NodeId, reason: &str) {
        let matching: Vec<EdgeId> = self
            .edges_from(from)
            .into_iter()
            .filter(|(_, e)| e.to() == to && e.reason() == Some(reason))
            .map(|(id, _)| id)
            .collect();
        for id in matching {
            self.remove_edge(id);
        }
        self.prune_orphan_externals();
    }

    fn drop_node(&mut self, id: &NodeId) {
        self.drop_node_keep_incoming(id);
        self.incoming.remove(id);
    }

    fn drop_node_keep_incoming(&mut self, id: &NodeId) {
        if let Some(node) = self.nodes.remove(id) {
            if let Some(ids) = self.by_kind.get_mut(&node.kind()) {
                ids.remove(id);
            }
        }
        self.outgoing.remove(id);
    }

    /// Drop external module placeholders no edge references anymore, so an
    /// incremental removal converges to the same store a rebuild produces.
    fn prune_orphan_externals(&mut self) {
        let orphans: Vec<NodeId> = self
            .nodes_by_kind(NodeKind::Module)
            .into_iter()
            .map(|n| n.id().clone())
            .filter(|id| {
                self.outgoing.get(id).map_or(true, |v| v.is_empty())
                    && self.incoming.get(id).map_or(true, |v| v.is_empty())
            })
            .collect();
        for id in orphans {
            self.drop_node(&id);
        }
    }

    // ── Issues & meta ──────────────────────────────────────────

    /// Replace the issue set wholesale.
    pub fn set_issues(&mut self, issues: Vec<GraphIssue>) {
        self.issues = issues;
    }

    pub fn issues(&self) -> &[GraphIssue] {
        &self.issues
    }

    pub fn meta(&self) -> &StoreMeta {
        &self.meta
    }

    pub fn update_meta(&mut self, duration_ms: u64, file_count: usize) {
        self.meta.last_indexed = Some(SystemTime::now());
        self.meta.duration_ms = duration_ms;
        self.meta.file_count = file_count;
    }

    /// Reset to empty.
    pub fn clear(&mut self) {
        self.nodes.clear();
        self.edges.clear();
        self.by_kind.clear();
        self.outgoing.clear();
        self.incoming.clear();
        self.issues.clear();
        self.meta = StoreMeta::default();
    }

    // ── Lookup helpers ─────────────────────────────────────────

    /// Find a file node by root-relative path, full node id, or unique
    /// path suffix. Returns `Err` with the candidates on ambiguity.
    pub fn find_file(&self, target: &str) -> Result<Option<NodeId>, Vec<String>> {
        let normalized = target.trim_start_matches("./").replace('\\', "/");

        let exact = NodeId::file(&normalized);
        if self.nodes.contains_key(&exact) {
            return Ok(Some(exact));
        }
        let as_id = NodeId::from(target);
        if self.nodes.contains_key(&as_id) {
            return Ok(Some(as_id));
        }

        let matches: Vec<&GraphNode> = self
            .nodes_by_kind(NodeKind::File)
            .into_iter()
            .filter(|n| {
                n.path()
                    .map(|p| p == normalized || p.ends_with(&format!("/{}", normalized)))
                    .unwrap_or(false)
            })
            .collect();

        match matches.len() {
            0 => Ok(None),
            1 => Ok(Some(matches[0].id().clone())),
            _ => Err(matches
                .iter()
                .filter_map(|n| n.path().map(String::from))
                .collect()),
        }
    }
}

impl Default for GraphStore {
    fn default() -> Self {
        Self::new()
    }
}
