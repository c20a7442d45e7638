//! Tests for incremental updates: event application, queueing, rebuild parity

use arbor_core::{ArborConfig, FileEvent, GraphEngine, IncrementalWatcher, NodeKind};
use std::collections::BTreeSet;
use std::fs;
use tempfile::TempDir;

fn project() -> (TempDir, GraphEngine) {
    let dir = TempDir::new().unwrap();
    let root = dir.path();
    fs::create_dir_all(root.join("src")).unwrap();
    fs::write(root.join("src/a.ts"), "import { b } from './b';\n").unwrap();
    fs::write(root.join("src/b.ts"), "import { c } from './c';\nexport const b = 1;\n").unwrap();
    fs::write(root.join("src/c.ts"), "export const c = 2;\n").unwrap();

    let engine = GraphEngine::new(root, ArborConfig::default());
    engine.build().unwrap();
    (dir, engine)
}

fn node_set(engine: &GraphEngine) -> BTreeSet<String> {
    engine.with_store(|store| {
        store
            .all_nodes()
            .map(|n| n.id().as_str().to_string())
            .collect()
    })
}

fn edge_set(engine: &GraphEngine) -> BTreeSet<String> {
    engine.with_store(|store| {
        store
            .all_edges()
            .map(|(_, e)| format!("{}>{}:{}", e.from(), e.to(), e.kind().as_str()))
            .collect()
    })
}

#[test]
fn test_modified_file_swaps_outgoing_edges() {
    let (_dir, engine) = project();
    let path = engine.root().join("src/b.ts");

    // b now imports a instead of c
    fs::write(&path, "import { a } from './a';\nexport const b = 1;\n").unwrap();
    engine.apply_event(&FileEvent::Modified(path)).unwrap();

    let edges = edge_set(&engine);
    assert!(edges.contains("file:src/b.ts>file:src/a.ts:imports"));
    assert!(!edges.contains("file:src/b.ts>file:src/c.ts:imports"));
    // The incoming edge a→b is untouched
    assert!(edges.contains("file:src/a.ts>file:src/b.ts:imports"));
}

#[test]
fn test_created_file_joins_graph() {
    let (_dir, engine) = project();
    let path = engine.root().join("src/d.ts");
    fs::write(&path, "import { c } from './c';\n").unwrap();

    engine.apply_event(&FileEvent::Created(path)).unwrap();

    assert!(node_set(&engine).contains("file:src/d.ts"));
    assert!(edge_set(&engine).contains("file:src/d.ts>file:src/c.ts:imports"));
}

#[test]
fn test_removal_matches_full_rebuild() {
    let (_dir, engine) = project();
    let path = engine.root().join("src/a.ts");

    // Incremental removal of a.ts (nothing imports it)
    fs::remove_file(&path).unwrap();
    engine.apply_event(&FileEvent::Removed(path)).unwrap();

    // A fresh engine over the same tree builds from scratch
    let fresh = GraphEngine::new(engine.root(), ArborConfig::default());
    fresh.build().unwrap();

    assert_eq!(node_set(&engine), node_set(&fresh));
    assert_eq!(edge_set(&engine), edge_set(&fresh));
}

#[test]
fn test_watcher_queues_and_drains_in_order() {
    let (_dir, engine) = project();
    let watcher = IncrementalWatcher::new();

    let d = engine.root().join("src/d.ts");
    let e = engine.root().join("src/e.ts");
    fs::write(&d, "import { c } from './c';\n").unwrap();
    fs::write(&e, "import { d } from './d';\n").unwrap();

    watcher.submit(FileEvent::Created(d));
    watcher.submit(FileEvent::Created(e));
    assert_eq!(watcher.pending(), 2);

    let applied = watcher.drain(&engine).unwrap();
    assert_eq!(applied, 2);
    assert_eq!(watcher.pending(), 0);

    // e→d resolved because d was applied first
    assert!(edge_set(&engine).contains("file:src/e.ts>file:src/d.ts:imports"));
}

#[test]
fn test_entrypoints_follow_file_changes() {
    let (_dir, engine) = project();
    let path = engine.root().join("src/c.ts");

    fs::write(
        &path,
        "export const c = 2;\nif (require.main === module) { run(); }\n",
    )
    .unwrap();
    engine.apply_event(&FileEvent::Modified(path.clone())).unwrap();
    let entrypoints =
        engine.with_store(|store| store.nodes_by_kind(NodeKind::Entrypoint).len());
    assert_eq!(entrypoints, 1);

    fs::write(&path, "export const c = 2;\n").unwrap();
    engine.apply_event(&FileEvent::Modified(path)).unwrap();
    let entrypoints =
        engine.with_store(|store| store.nodes_by_kind(NodeKind::Entrypoint).len());
    assert_eq!(entrypoints, 0);
}

#[test]
fn test_issues_refresh_after_apply() {
    let (_dir, engine) = project();

    // Introduce a cycle: c imports a
    let path = engine.root().join("src/c.ts");
    fs::write(&path, "import { a } from './a';\nexport const c = 2;\n").unwrap();
    engine.apply_event(&FileEvent::Modified(path.clone())).unwrap();

    let has_cycle = engine.with_store(|store| {
        store
            .issues()
            .iter()
            .any(|i| i.kind == arbor_core::IssueKind::CircularDependency)
    });
    assert!(has_cycle);

    // Break the cycle again
    fs::write(&path, "export const c = 2;\n").unwrap();
    engine.apply_event(&FileEvent::Modified(path)).unwrap();

    let has_cycle = engine.with_store(|store| {
        store
            .issues()
            .iter()
            .any(|i| i.kind == arbor_core::IssueKind::CircularDependency)
    });
    assert!(!has_cycle);
}
