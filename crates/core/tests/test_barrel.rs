//! Tests for barrel analysis: export closures and re-export cycles

use arbor_core::analyzer::barrel::{export_closure, BarrelAnalyzer};
use arbor_core::analyzer::GraphAnalyzer;
use arbor_core::graph::{
    Confidence, EdgeKind, EdgeMeta, GraphEdge, GraphNode, GraphStore, NodeId,
};
use arbor_core::{ArborConfig, IssueKind};

fn barrel_file(path: &str, exports: &[&str], is_barrel: bool) -> GraphNode {
    let mut node = GraphNode::file(path, "typescript");
    node.meta_mut().exports = exports.iter().map(|s| s.to_string()).collect();
    node.meta_mut().is_barrel = is_barrel;
    node
}

fn reexport(from: &str, to: &str, symbols: &[&str], wildcard: bool) -> GraphEdge {
    GraphEdge::new(
        NodeId::file(from),
        NodeId::file(to),
        EdgeKind::Reexports,
        Confidence::High,
    )
    .with_meta(EdgeMeta {
        symbols: symbols.iter().map(|s| s.to_string()).collect(),
        is_wildcard: wildcard,
        ..EdgeMeta::default()
    })
}

#[test]
fn test_named_reexports_contribute_symbols() {
    let mut store = GraphStore::new();
    store.add_node(barrel_file("index.ts", &[], true));
    store.add_node(barrel_file("util.ts", &["helper", "other"], false));
    store.add_edge(reexport("index.ts", "util.ts", &["helper"], false));

    let closure = export_closure(&store, &NodeId::file("index.ts"));
    assert!(closure.contains("helper"));
    assert!(!closure.contains("other"));
}

#[test]
fn test_wildcard_reexport_pulls_transitive_exports() {
    let mut store = GraphStore::new();
    store.add_node(barrel_file("index.ts", &[], true));
    store.add_node(barrel_file("mid.ts", &["mid_fn"], true));
    store.add_node(barrel_file("deep.ts", &["deep_fn"], false));
    store.add_edge(reexport("index.ts", "mid.ts", &[], true));
    store.add_edge(reexport("mid.ts", "deep.ts", &[], true));

    let closure = export_closure(&store, &NodeId::file("index.ts"));
    assert!(closure.contains("mid_fn"));
    assert!(closure.contains("deep_fn"));
}

#[test]
fn test_closure_terminates_on_cycles() {
    let mut store = GraphStore::new();
    store.add_node(barrel_file("a.ts", &["from_a"], true));
    store.add_node(barrel_file("b.ts", &["from_b"], true));
    store.add_edge(reexport("a.ts", "b.ts", &[], true));
    store.add_edge(reexport("b.ts", "a.ts", &[], true));

    let closure = export_closure(&store, &NodeId::file("a.ts"));
    assert!(closure.contains("from_a"));
    assert!(closure.contains("from_b"));
}

#[test]
fn test_circular_reexport_reported_as_distinct_issue() {
    let mut store = GraphStore::new();
    store.add_node(barrel_file("a.ts", &[], true));
    store.add_node(barrel_file("b.ts", &[], true));
    store.add_edge(reexport("a.ts", "b.ts", &[], true));
    store.add_edge(reexport("b.ts", "a.ts", &[], true));

    let issues = BarrelAnalyzer::new().analyze(&store, &ArborConfig::default());
    assert_eq!(issues.len(), 1);
    assert_eq!(issues[0].kind, IssueKind::CircularReexport);
    assert_eq!(issues[0].severity, arbor_core::Severity::Error);
}

#[test]
fn test_import_cycle_is_not_reexport_cycle() {
    let mut store = GraphStore::new();
    store.add_node(barrel_file("a.ts", &[], false));
    store.add_node(barrel_file("b.ts", &[], false));
    store.add_edge(GraphEdge::new(
        NodeId::file("a.ts"),
        NodeId::file("b.ts"),
        EdgeKind::Imports,
        Confidence::High,
    ));
    store.add_edge(GraphEdge::new(
        NodeId::file("b.ts"),
        NodeId::file("a.ts"),
        EdgeKind::Imports,
        Confidence::High,
    ));

    let issues = BarrelAnalyzer::new().analyze(&store, &ArborConfig::default());
    assert!(issues.is_empty());
}
