//! Structural issue detection
//!
//! Read-only scans for conditions that are not cycles or layer breaks:
//! entrypoints with no handler edge, dynamic references that never
//! resolved, re-export chains pointing at missing targets or symbols, and
//! exports nothing imports.

use std::collections::BTreeSet;

use super::GraphAnalyzer;
use crate::config::ArborConfig;
use crate::graph::{
    EdgeKind, GraphIssue, GraphStore, IssueKind, NodeKind, Severity,
};

/// Issue detector registered with the dispatcher
pub struct IssueDetector;

impl IssueDetector {
    pub fn new() -> Self {
        Self
    }
}

impl Default for IssueDetector {
    fn default() -> Self {
        Self::new()
    }
}

impl GraphAnalyzer for IssueDetector {
    fn name(&self) -> &str {
        "issues"
    }

    fn analyze(&self, store: &GraphStore, _config: &ArborConfig) -> Vec<GraphIssue> {
        let mut issues: Vec<GraphIssue> = Vec::new();
        unreachable_entrypoints(store, &mut issues);
        unresolved_dynamic_edges(store, &mut issues);
        broken_export_chains(store, &mut issues);
        orphaned_exports(store, &mut issues);
        issues
    }
}

/// An entrypoint with no outgoing edge has no resolvable handler: nothing
/// it registers or calls exists in the graph.
fn unreachable_entrypoints(store: &GraphStore, issues: &mut Vec<GraphIssue>) {
    for entry in store.nodes_by_kind(NodeKind::Entrypoint) {
        let has_handler = store
            .edges_from(entry.id())
            .into_iter()
            .any(|(_, e)| store.has_node(e.to()));
        if !has_handler {
            issues.push(GraphIssue::new(
                IssueKind::UnreachableEntrypoint,
                Severity::Warning,
                entry.path().unwrap_or_default(),
                format!("Entrypoint '{}' has no resolvable handler", entry.name()),
            ));
        }
    }
}

/// Dynamic references that ended at an external placeholder were never
/// resolved; the graph cannot say what they load.
fn unresolved_dynamic_edges(store: &GraphStore, issues: &mut Vec<GraphIssue>) {
    let mut seen: BTreeSet<(String, String)> = BTreeSet::new();

    for (_, edge) in store.all_edges() {
        if !edge.meta().dynamic {
            continue;
        }
        let unresolved = match store.node(edge.to()) {
            Some(target) => target.kind() == NodeKind::Module,
            None => true,
        };
        if !unresolved {
            continue;
        }
        let Some(file) = store.node(edge.from()).and_then(|n| n.path().map(String::from)) else {
            continue;
        };
        let target = edge.to().to_string();
        if seen.insert((file.clone(), target.clone())) {
            let mut issue = GraphIssue::new(
                IssueKind::UnresolvedDynamicEdge,
                Severity::Info,
                file,
                format!("Dynamic reference to '{}' could not be resolved", target),
            );
            if let Some(line) = edge.meta().line {
                issue.evidence.push(format!("line {}", line));
            }
            issues.push(issue);
        }
    }
}

/// A re-export edge whose target node is missing, or whose named symbols
/// the target does not export, breaks the chain for consumers.
fn broken_export_chains(store: &GraphStore, issues: &mut Vec<GraphIssue>) {
    for (_, edge) in store.all_edges() {
        if edge.kind() != EdgeKind::Reexports {
            continue;
        }
        let Some(file) = store.node(edge.from()).and_then(|n| n.path().map(String::from)) else {
            continue;
        };

        match store.node(edge.to()) {
            None => {
                issues.push(GraphIssue::new(
                    IssueKind::BrokenExportChain,
                    Severity::Error,
                    file,
                    format!("Re-export target '{}' does not exist", edge.to()),
                ));
            }
            Some(target) if target.kind() == NodeKind::File => {
                if edge.meta().is_wildcard || edge.meta().symbols.is_empty() {
                    continue;
                }
                let target_exports = super::barrel::export_closure(store, edge.to());
                let missing: Vec<String> = edge
                    .meta()
                    .symbols
                    .iter()
                    .filter(|s| !target_exports.contains(*s))
                    .cloned()
                    .collect();
                if !missing.is_empty() {
                    issues.push(
                        GraphIssue::new(
                            IssueKind::BrokenExportChain,
                            Severity::Error,
                            file,
                            format!(
                                "Re-export of {} from '{}' not found in target",
                                missing.join(", "),
                                target.path().unwrap_or_default()
                            ),
                        )
                        .with_evidence(missing),
                    );
                }
            }
            // External module targets are fine: the chain leaves the tree
            Some(_) => {}
        }
    }
}

/// Files with a public surface nothing imports or re-exports. Entrypoint
/// files are exempt: they are consumed from outside the graph.
fn orphaned_exports(store: &GraphStore, issues: &mut Vec<GraphIssue>) {
    for file in store.nodes_by_kind(NodeKind::File) {
        if file.meta().exports.is_empty() {
            continue;
        }
        let incoming = store.edges_to(file.id());
        let imported = incoming
            .iter()
            .any(|(_, e)| matches!(e.kind(), EdgeKind::Imports | EdgeKind::Reexports));
        let is_entry_target = incoming
            .iter()
            .any(|(_, e)| matches!(e.kind(), EdgeKind::Registers | EdgeKind::Calls));
        if !imported && !is_entry_target {
            issues.push(
                GraphIssue::new(
                    IssueKind::OrphanedExport,
                    Severity::Info,
                    file.path().unwrap_or_default(),
                    format!(
                        "File exports {} symbol(s) but nothing imports it",
                        file.meta().exports.len()
                    ),
                )
                .with_evidence(file.meta().exports.clone()),
            );
        }
    }
}
