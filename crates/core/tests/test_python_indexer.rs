//! Tests for the Python indexer

use arbor_core::graph::{Confidence, EdgeKind, NodeId, NodeKind};
use arbor_core::indexer::python::PythonIndexer;
use arbor_core::indexer::{IndexContext, Indexer};
use arbor_core::resolver::PathResolver;
use std::collections::BTreeMap;

fn index(source: &str, path: &str, files: &[&str]) -> arbor_core::indexer::IndexResult {
    let resolver = PathResolver::new(&BTreeMap::new(), files.iter().map(|s| s.to_string()));
    let ctx = IndexContext::new(&resolver, &[]);
    PythonIndexer::new().index_file(path, source, &ctx)
}

#[test]
fn test_package_import_is_external() {
    let result = index("import os\n", "main.py", &["main.py"]);

    assert_eq!(result.edges.len(), 1);
    let edge = &result.edges[0];
    assert_eq!(edge.kind(), EdgeKind::Imports);
    assert_eq!(edge.confidence(), Confidence::High);
    assert_eq!(edge.to(), &NodeId::external("os"));
}

#[test]
fn test_dotted_import_resolves_internal() {
    let result = index(
        "import pkg.util\n",
        "main.py",
        &["main.py", "pkg/util.py"],
    );

    let edge = &result.edges[0];
    assert_eq!(edge.to(), &NodeId::file("pkg/util.py"));
    assert_eq!(edge.confidence(), Confidence::High);
}

#[test]
fn test_relative_import_resolves_sibling() {
    let result = index(
        "from .util import helper\n",
        "pkg/mod.py",
        &["pkg/mod.py", "pkg/util.py"],
    );

    let edge = &result.edges[0];
    assert_eq!(edge.to(), &NodeId::file("pkg/util.py"));
    assert_eq!(edge.meta().symbols, vec!["helper".to_string()]);
}

#[test]
fn test_from_import_symbols_and_wildcard() {
    let result = index(
        "from pkg.util import first, second\nfrom pkg.other import *\n",
        "main.py",
        &["main.py", "pkg/util.py", "pkg/other.py"],
    );

    let named = result
        .edges
        .iter()
        .find(|e| e.to() == &NodeId::file("pkg/util.py"))
        .unwrap();
    assert_eq!(
        named.meta().symbols,
        vec!["first".to_string(), "second".to_string()]
    );

    let wildcard = result
        .edges
        .iter()
        .find(|e| e.to() == &NodeId::file("pkg/other.py"))
        .unwrap();
    assert!(wildcard.meta().is_wildcard);
}

#[test]
fn test_main_guard_entrypoint() {
    let result = index(
        "def main():\n    pass\n\nif __name__ == \"__main__\":\n    main()\n",
        "cli.py",
        &["cli.py"],
    );

    let entry = result
        .nodes
        .iter()
        .find(|n| n.kind() == NodeKind::Entrypoint)
        .expect("entrypoint");
    assert_eq!(entry.path(), Some("cli.py"));

    // The entrypoint points back at its owning file
    assert!(result
        .edges
        .iter()
        .any(|e| e.from() == entry.id() && e.to() == &NodeId::file("cli.py")));
}

#[test]
fn test_exports_skip_private_names() {
    let result = index(
        "def public_fn():\n    pass\n\ndef _private():\n    pass\n\nclass Thing:\n    pass\n\nLIMIT = 10\n",
        "lib.py",
        &["lib.py"],
    );

    let file = result
        .nodes
        .iter()
        .find(|n| n.kind() == NodeKind::File)
        .unwrap();
    assert_eq!(
        file.meta().exports,
        vec![
            "LIMIT".to_string(),
            "Thing".to_string(),
            "public_fn".to_string()
        ]
    );
}

#[test]
fn test_route_decorator_entrypoint() {
    let result = index(
        "@app.route(\"/users\")\ndef list_users():\n    return []\n",
        "api.py",
        &["api.py"],
    );

    let entry = result
        .nodes
        .iter()
        .find(|n| n.kind() == NodeKind::Entrypoint)
        .expect("route entrypoint");
    assert_eq!(entry.name(), "/users");
}

#[test]
fn test_dynamic_import_literal() {
    let result = index(
        "import importlib\nmod = importlib.import_module(\"pkg.util\")\n",
        "main.py",
        &["main.py", "pkg/util.py"],
    );

    let dynamic = result
        .edges
        .iter()
        .find(|e| e.meta().dynamic)
        .expect("dynamic edge");
    assert_eq!(dynamic.confidence(), Confidence::Medium);
    assert_eq!(dynamic.to(), &NodeId::file("pkg/util.py"));
}

#[test]
fn test_file_node_always_present() {
    let result = index("", "empty.py", &["empty.py"]);
    assert!(result
        .nodes
        .iter()
        .any(|n| n.kind() == NodeKind::File && n.path() == Some("empty.py")));
}
