//! Tests for the Go indexer

use arbor_core::graph::{Confidence, EdgeKind, NodeId, NodeKind};
use arbor_core::indexer::go::GoIndexer;
use arbor_core::indexer::{IndexContext, Indexer};
use arbor_core::resolver::PathResolver;
use std::collections::BTreeMap;

fn index(source: &str, path: &str, files: &[&str]) -> arbor_core::indexer::IndexResult {
    let resolver = PathResolver::new(&BTreeMap::new(), files.iter().map(|s| s.to_string()));
    let ctx = IndexContext::new(&resolver, &[]);
    GoIndexer::new().index_file(path, source, &ctx)
}

#[test]
fn test_stdlib_import_is_external() {
    let result = index(
        "package util\n\nimport \"fmt\"\n",
        "util/print.go",
        &["util/print.go"],
    );

    let edge = &result.edges[0];
    assert_eq!(edge.kind(), EdgeKind::Imports);
    assert_eq!(edge.to(), &NodeId::external("fmt"));
    assert_eq!(edge.confidence(), Confidence::High);
}

#[test]
fn test_project_package_import_matches_directory() {
    let result = index(
        "package main\n\nimport \"example.com/proj/util\"\n\nfunc main() {}\n",
        "cmd/main.go",
        &["cmd/main.go", "util/helpers.go"],
    );

    let import = result
        .edges
        .iter()
        .find(|e| e.kind() == EdgeKind::Imports)
        .unwrap();
    assert_eq!(import.to(), &NodeId::file("util/helpers.go"));
    // Directory matching is a heuristic
    assert_eq!(import.confidence(), Confidence::Medium);
}

#[test]
fn test_import_spec_list() {
    let result = index(
        "package main\n\nimport (\n    \"fmt\"\n    \"os\"\n)\n\nfunc main() {}\n",
        "main.go",
        &["main.go"],
    );

    let imports: Vec<_> = result
        .edges
        .iter()
        .filter(|e| e.kind() == EdgeKind::Imports)
        .collect();
    assert_eq!(imports.len(), 2);
}

#[test]
fn test_package_main_entrypoint() {
    let result = index(
        "package main\n\nfunc main() {}\n",
        "cmd/main.go",
        &["cmd/main.go"],
    );

    assert!(result
        .nodes
        .iter()
        .any(|n| n.kind() == NodeKind::Entrypoint));
}

#[test]
fn test_library_package_has_no_entrypoint() {
    // `func main` outside `package main` is not a program entry
    let result = index(
        "package util\n\nfunc main() {}\n",
        "util/odd.go",
        &["util/odd.go"],
    );

    assert!(result
        .nodes
        .iter()
        .all(|n| n.kind() != NodeKind::Entrypoint));
}

#[test]
fn test_capitalized_names_exported() {
    let result = index(
        "package util\n\nfunc Public() {}\nfunc private() {}\n\ntype Thing struct{}\n\nconst Limit = 10\n",
        "util/lib.go",
        &["util/lib.go"],
    );

    let file = result
        .nodes
        .iter()
        .find(|n| n.kind() == NodeKind::File)
        .unwrap();
    assert!(file.meta().exports.contains(&"Public".to_string()));
    assert!(file.meta().exports.contains(&"Thing".to_string()));
    assert!(file.meta().exports.contains(&"Limit".to_string()));
    assert!(!file.meta().exports.contains(&"private".to_string()));
}
