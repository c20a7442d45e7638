//! Tests for user annotations: persistence, ignore rules, store merging

use arbor_core::annotations::{AnnotationManager, MANUAL_REASON};
use arbor_core::graph::{Confidence, EdgeKind, GraphStore, NodeId, NodeKind};
use arbor_core::IssueKind;
use std::fs;
use tempfile::TempDir;

#[test]
fn test_missing_file_is_empty_set() {
    let dir = TempDir::new().unwrap();
    let manager = AnnotationManager::load(dir.path());

    let set = manager.get_all();
    assert!(set.edges.is_empty());
    assert!(set.entrypoints.is_empty());
    assert!(set.ignores.is_empty());
}

#[test]
fn test_corrupt_file_falls_back_to_empty() {
    let dir = TempDir::new().unwrap();
    fs::create_dir_all(dir.path().join(".arbor")).unwrap();
    fs::write(dir.path().join(".arbor/annotations.json"), "{ not json !").unwrap();

    let manager = AnnotationManager::load(dir.path());
    assert!(manager.get_all().edges.is_empty());
}

#[test]
fn test_roundtrip_through_disk() {
    let dir = TempDir::new().unwrap();

    let mut manager = AnnotationManager::load(dir.path());
    manager.add_edge("src/a.ts", "src/b.ts", "imports").unwrap();
    manager.add_entrypoint("src/job.ts", "nightly").unwrap();
    manager
        .add_ignore(Some("circular_dependency"), "src/legacy/**")
        .unwrap();

    let reloaded = AnnotationManager::load(dir.path());
    let set = reloaded.get_all();
    assert_eq!(set.edges.len(), 1);
    assert_eq!(set.entrypoints.len(), 1);
    assert_eq!(set.ignores.len(), 1);
    assert_eq!(set.version, 1);
}

#[test]
fn test_add_rejects_unknown_kinds() {
    let mut manager = AnnotationManager::in_memory();
    assert!(manager.add_edge("a", "b", "teleports").is_err());
    assert!(manager.add_ignore(Some("nonsense_kind"), "src/**").is_err());
}

#[test]
fn test_duplicate_adds_are_idempotent() {
    let mut manager = AnnotationManager::in_memory();
    manager.add_edge("a.ts", "b.ts", "imports").unwrap();
    manager.add_edge("a.ts", "b.ts", "imports").unwrap();
    assert_eq!(manager.get_all().edges.len(), 1);
}

#[test]
fn test_remove_edge() {
    let mut manager = AnnotationManager::in_memory();
    manager.add_edge("a.ts", "b.ts", "imports").unwrap();

    assert!(manager.remove_edge("a.ts", "b.ts").unwrap());
    assert!(!manager.remove_edge("a.ts", "b.ts").unwrap());
    assert!(manager.get_all().edges.is_empty());
}

// ── Ignore rules ───────────────────────────────────────────────

#[test]
fn test_should_ignore_wildcard_path() {
    let mut manager = AnnotationManager::in_memory();
    manager
        .add_ignore(Some("orphaned_export"), "src/legacy/**")
        .unwrap();

    assert!(manager.should_ignore(IssueKind::OrphanedExport, "src/legacy/old/deep.ts"));
    assert!(!manager.should_ignore(IssueKind::OrphanedExport, "src/new.ts"));
    assert!(!manager.should_ignore(IssueKind::CircularDependency, "src/legacy/old.ts"));
}

#[test]
fn test_kindless_ignore_matches_every_kind() {
    let mut manager = AnnotationManager::in_memory();
    manager.add_ignore(None, "generated/**").unwrap();

    assert!(manager.should_ignore(IssueKind::OrphanedExport, "generated/api.ts"));
    assert!(manager.should_ignore(IssueKind::CircularDependency, "generated/api.ts"));
}

#[test]
fn test_exact_path_ignore() {
    let mut manager = AnnotationManager::in_memory();
    manager.add_ignore(None, "src/known.ts").unwrap();
    assert!(manager.should_ignore(IssueKind::OrphanedExport, "src/known.ts"));
}

// ── Merging into the store ─────────────────────────────────────

#[test]
fn test_manual_edges_merge_as_high_confidence() {
    let mut manager = AnnotationManager::in_memory();
    manager.add_edge("src/a.ts", "src/b.ts", "calls").unwrap();

    let mut store = GraphStore::new();
    store.add_node(arbor_core::GraphNode::file("src/a.ts", "typescript"));
    store.add_node(arbor_core::GraphNode::file("src/b.ts", "typescript"));
    manager.merge_into(&mut store);

    let edges = store.edges_from(&NodeId::file("src/a.ts"));
    assert_eq!(edges.len(), 1);
    let (_, edge) = edges[0];
    assert_eq!(edge.kind(), EdgeKind::Calls);
    assert_eq!(edge.confidence(), Confidence::High);
    assert_eq!(edge.reason(), Some(MANUAL_REASON));
}

#[test]
fn test_manual_entrypoint_merges_with_registers_edge() {
    let mut manager = AnnotationManager::in_memory();
    manager.add_entrypoint("src/job.ts", "nightly").unwrap();

    let mut store = GraphStore::new();
    store.add_node(arbor_core::GraphNode::file("src/job.ts", "typescript"));
    manager.merge_into(&mut store);

    let entrypoints = store.nodes_by_kind(NodeKind::Entrypoint);
    assert_eq!(entrypoints.len(), 1);
    assert_eq!(entrypoints[0].name(), "nightly");

    let edges = store.edges_from(entrypoints[0].id());
    assert_eq!(edges.len(), 1);
    assert_eq!(edges[0].1.kind(), EdgeKind::Registers);
}
