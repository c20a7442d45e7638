//! Tests for the Rust indexer

use arbor_core::graph::{Confidence, EdgeKind, NodeId, NodeKind};
use arbor_core::indexer::rust::RustIndexer;
use arbor_core::indexer::{IndexContext, Indexer};
use arbor_core::resolver::PathResolver;
use std::collections::BTreeMap;

fn index(source: &str, path: &str, files: &[&str]) -> arbor_core::indexer::IndexResult {
    let resolver = PathResolver::new(&BTreeMap::new(), files.iter().map(|s| s.to_string()));
    let ctx = IndexContext::new(&resolver, &[]);
    RustIndexer::new().index_file(path, source, &ctx)
}

#[test]
fn test_mod_declaration_resolves_sibling() {
    let result = index(
        "mod config;\n",
        "src/main.rs",
        &["src/main.rs", "src/config.rs"],
    );

    let edge = &result.edges[0];
    assert_eq!(edge.kind(), EdgeKind::Imports);
    assert_eq!(edge.confidence(), Confidence::High);
    assert_eq!(edge.to(), &NodeId::file("src/config.rs"));
}

#[test]
fn test_mod_declaration_resolves_mod_rs() {
    let result = index(
        "mod indexer;\n",
        "src/lib.rs",
        &["src/lib.rs", "src/indexer/mod.rs"],
    );

    assert_eq!(result.edges[0].to(), &NodeId::file("src/indexer/mod.rs"));
}

#[test]
fn test_inline_mod_produces_no_edge() {
    let result = index(
        "mod helpers {\n    pub fn assist() {}\n}\n",
        "src/lib.rs",
        &["src/lib.rs"],
    );

    assert!(result.edges.is_empty());
}

#[test]
fn test_use_crate_path_resolves() {
    let result = index(
        "use crate::config::Settings;\n",
        "src/main.rs",
        &["src/main.rs", "src/config.rs"],
    );

    let edge = &result.edges[0];
    assert_eq!(edge.to(), &NodeId::file("src/config.rs"));
    assert_eq!(edge.confidence(), Confidence::Medium);
}

#[test]
fn test_use_external_crate() {
    let result = index(
        "use serde::Serialize;\n",
        "src/lib.rs",
        &["src/lib.rs"],
    );

    let edge = &result.edges[0];
    assert_eq!(edge.to(), &NodeId::external("serde"));
    assert_eq!(edge.confidence(), Confidence::High);
}

#[test]
fn test_fn_main_entrypoint() {
    let result = index(
        "fn main() {\n    println!(\"hi\");\n}\n",
        "src/main.rs",
        &["src/main.rs"],
    );

    let entry = result
        .nodes
        .iter()
        .find(|n| n.kind() == NodeKind::Entrypoint)
        .expect("entrypoint");
    assert_eq!(entry.path(), Some("src/main.rs"));
    assert!(result
        .edges
        .iter()
        .any(|e| e.from() == entry.id() && e.kind() == EdgeKind::Calls));
}

#[test]
fn test_pub_items_exported() {
    let result = index(
        "pub fn visible() {}\nfn hidden() {}\npub struct Config;\npub(crate) enum Mode { A }\n",
        "src/lib.rs",
        &["src/lib.rs"],
    );

    let file = result
        .nodes
        .iter()
        .find(|n| n.kind() == NodeKind::File)
        .unwrap();
    assert!(file.meta().exports.contains(&"visible".to_string()));
    assert!(file.meta().exports.contains(&"Config".to_string()));
    assert!(file.meta().exports.contains(&"Mode".to_string()));
    assert!(!file.meta().exports.contains(&"hidden".to_string()));
}

#[test]
fn test_self_import_skipped() {
    // `use crate::helper` resolving to the importing file itself is noise
    let result = index(
        "use crate::main;\n",
        "src/main.rs",
        &["src/main.rs"],
    );

    assert!(result
        .edges
        .iter()
        .all(|e| e.to() != &NodeId::file("src/main.rs")));
}
