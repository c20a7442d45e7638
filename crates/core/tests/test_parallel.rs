//! Tests for parallel indexing: determinism, isolation, error recovery

use arbor_core::config::IndexConfig;
use arbor_core::graph::canonical_path;
use arbor_core::indexer::IndexerRegistry;
use arbor_core::parallel::ParallelIndexer;
use arbor_core::resolver::PathResolver;
use std::collections::BTreeMap;
use std::collections::BTreeSet;
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

fn fixture() -> (TempDir, Vec<PathBuf>) {
    let dir = TempDir::new().unwrap();
    let root = dir.path();

    fs::create_dir_all(root.join("src")).unwrap();
    fs::write(root.join("src/a.ts"), "import { b } from './b';\n").unwrap();
    fs::write(root.join("src/b.ts"), "import { c } from './c';\nexport const b = 1;\n").unwrap();
    fs::write(root.join("src/c.ts"), "export const c = 2;\n").unwrap();
    fs::write(root.join("src/util.py"), "import os\n").unwrap();

    let files: Vec<PathBuf> = ["src/a.ts", "src/b.ts", "src/c.ts", "src/util.py"]
        .iter()
        .map(|f| root.join(f))
        .collect();
    (dir, files)
}

fn run(
    root: &std::path::Path,
    files: &[PathBuf],
    batch_size: usize,
    concurrency: usize,
) -> arbor_core::parallel::IndexOutcome {
    let registry = IndexerRegistry::new();
    let rel: Vec<String> = files
        .iter()
        .map(|f| canonical_path(f.strip_prefix(root).unwrap()))
        .collect();
    let resolver = PathResolver::new(&BTreeMap::new(), rel);
    ParallelIndexer::new(batch_size, concurrency)
        .index_all(root, files, &registry, &resolver, &[])
        .unwrap()
}

fn node_ids(outcome: &arbor_core::parallel::IndexOutcome) -> BTreeSet<String> {
    outcome
        .nodes
        .iter()
        .map(|n| n.id().as_str().to_string())
        .collect()
}

fn edge_keys(outcome: &arbor_core::parallel::IndexOutcome) -> BTreeSet<String> {
    outcome
        .edges
        .iter()
        .map(|e| format!("{}>{}:{}", e.from(), e.to(), e.kind().as_str()))
        .collect()
}

#[test]
fn test_all_files_indexed() {
    let (dir, files) = fixture();
    let outcome = run(dir.path(), &files, 2, 2);

    assert_eq!(outcome.stats.files_indexed, 4);
    assert_eq!(outcome.stats.error_count, 0);
    let ids = node_ids(&outcome);
    assert!(ids.contains("file:src/a.ts"));
    assert!(ids.contains("file:src/util.py"));
}

#[test]
fn test_deterministic_across_batch_shapes() {
    let (dir, files) = fixture();

    // Different batch sizes and concurrency caps, identical content
    let small = run(dir.path(), &files, 1, 1);
    let medium = run(dir.path(), &files, 2, 4);
    let large = run(dir.path(), &files, 64, 8);

    assert_eq!(node_ids(&small), node_ids(&medium));
    assert_eq!(node_ids(&medium), node_ids(&large));
    assert_eq!(edge_keys(&small), edge_keys(&medium));
    assert_eq!(edge_keys(&medium), edge_keys(&large));
}

#[test]
fn test_indexing_twice_is_idempotent() {
    let (dir, files) = fixture();
    let first = run(dir.path(), &files, 2, 2);
    let second = run(dir.path(), &files, 2, 2);

    assert_eq!(node_ids(&first), node_ids(&second));
    assert_eq!(edge_keys(&first), edge_keys(&second));
}

#[test]
fn test_unreadable_file_degrades_without_aborting() {
    let (dir, mut files) = fixture();
    // Invalid UTF-8 under a supported extension
    let bad = dir.path().join("src/bad.ts");
    fs::write(&bad, [0xff, 0xfe, 0x00, 0x80]).unwrap();
    files.push(bad);

    let outcome = run(dir.path(), &files, 2, 2);

    assert_eq!(outcome.stats.error_count, 1);
    assert_eq!(outcome.errors[0].file, "src/bad.ts");
    // The healthy siblings are unaffected and the bad file keeps its node
    let ids = node_ids(&outcome);
    assert!(ids.contains("file:src/a.ts"));
    assert!(ids.contains("file:src/bad.ts"));
}

#[test]
fn test_resolved_edges_cross_files() {
    let (dir, files) = fixture();
    let outcome = run(dir.path(), &files, 2, 2);

    let keys = edge_keys(&outcome);
    assert!(keys.contains("file:src/a.ts>file:src/b.ts:imports"));
    assert!(keys.contains("file:src/b.ts>file:src/c.ts:imports"));
}

#[test]
fn test_zero_concurrency_uses_default_pool() {
    let (dir, files) = fixture();
    let outcome = run(dir.path(), &files, 2, 0);
    assert_eq!(outcome.stats.files_indexed, 4);
}

#[test]
fn test_from_config() {
    let config = IndexConfig::default();
    let indexer = ParallelIndexer::from_config(&config);
    let (dir, files) = fixture();

    let registry = IndexerRegistry::new();
    let rel: Vec<String> = files
        .iter()
        .map(|f| canonical_path(f.strip_prefix(dir.path()).unwrap()))
        .collect();
    let resolver = PathResolver::new(&BTreeMap::new(), rel);
    let outcome = indexer
        .index_all(dir.path(), &files, &registry, &resolver, &[])
        .unwrap();
    assert_eq!(outcome.stats.files_indexed, 4);
}
