//! Tests for layer rule checking and suggestion

use arbor_core::analyzer::layers::{check, suggest, LayerAnalyzer};
use arbor_core::analyzer::GraphAnalyzer;
use arbor_core::config::{ArborConfig, LayerRule};
use arbor_core::graph::{Confidence, EdgeKind, GraphEdge, GraphNode, GraphStore, NodeId};
use arbor_core::IssueKind;

fn store_with_imports(edges: &[(&str, &str)]) -> GraphStore {
    let mut store = GraphStore::new();
    for (from, to) in edges {
        store.add_node(GraphNode::file(from, "typescript"));
        store.add_node(GraphNode::file(to, "typescript"));
        store.add_edge(GraphEdge::new(
            NodeId::file(from),
            NodeId::file(to),
            EdgeKind::Imports,
            Confidence::High,
        ));
    }
    store
}

fn rule(from: &str, cannot: &str) -> LayerRule {
    LayerRule {
        name: Some(format!("{}-{}", from, cannot)),
        from: from.to_string(),
        cannot_import: cannot.to_string(),
    }
}

#[test]
fn test_violation_detected() {
    let store = store_with_imports(&[("src/core/engine.ts", "src/ui/panel.ts")]);
    let rules = vec![rule("src/core/**", "src/ui/**")];

    let violations = check(&store, &rules);
    assert_eq!(violations.len(), 1);
    assert_eq!(violations[0].from, "src/core/engine.ts");
    assert_eq!(violations[0].to, "src/ui/panel.ts");
}

#[test]
fn test_compliant_edge_passes() {
    let store = store_with_imports(&[("src/ui/panel.ts", "src/core/engine.ts")]);
    let rules = vec![rule("src/core/**", "src/ui/**")];

    assert!(check(&store, &rules).is_empty());
}

#[test]
fn test_duplicate_edges_reported_once() {
    let mut store = store_with_imports(&[("src/core/engine.ts", "src/ui/panel.ts")]);
    store.add_edge(GraphEdge::new(
        NodeId::file("src/core/engine.ts"),
        NodeId::file("src/ui/panel.ts"),
        EdgeKind::Imports,
        Confidence::Medium,
    ));

    let rules = vec![rule("src/core/**", "src/ui/**")];
    assert_eq!(check(&store, &rules).len(), 1);
}

#[test]
fn test_analyzer_emits_error_issues() {
    let store = store_with_imports(&[("src/core/engine.ts", "src/ui/panel.ts")]);
    let mut config = ArborConfig::default();
    config.layers.rules = vec![rule("src/core/**", "src/ui/**")];

    let issues = LayerAnalyzer::new().analyze(&store, &config);
    assert_eq!(issues.len(), 1);
    assert_eq!(issues[0].kind, IssueKind::LayerViolation);
    assert_eq!(issues[0].severity, arbor_core::Severity::Error);
}

#[test]
fn test_suggest_protects_one_way_flow() {
    // app → lib three times, lib never imports app
    let store = store_with_imports(&[
        ("app/a.ts", "lib/x.ts"),
        ("app/b.ts", "lib/y.ts"),
        ("app/c.ts", "lib/z.ts"),
    ]);

    let suggestions = suggest(&store);
    assert_eq!(suggestions.len(), 1);
    assert_eq!(suggestions[0].from, "lib/**");
    assert_eq!(suggestions[0].cannot_import, "app/**");
}

#[test]
fn test_suggest_skips_bidirectional_flow() {
    let store = store_with_imports(&[
        ("app/a.ts", "lib/x.ts"),
        ("app/b.ts", "lib/y.ts"),
        ("app/c.ts", "lib/z.ts"),
        ("lib/x.ts", "app/a.ts"),
    ]);

    assert!(suggest(&store).is_empty());
}

#[test]
fn test_suggest_ignores_sparse_flow() {
    let store = store_with_imports(&[("app/a.ts", "lib/x.ts")]);
    assert!(suggest(&store).is_empty());
}
