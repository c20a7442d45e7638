//! Tests for the generic text-heuristic fallback indexer

use arbor_core::graph::{Confidence, EdgeKind, NodeId, NodeKind};
use arbor_core::indexer::generic::GenericIndexer;
use arbor_core::indexer::{IndexContext, Indexer, IndexerRegistry};
use arbor_core::resolver::PathResolver;
use std::collections::BTreeMap;
use std::path::Path;

fn index(source: &str, path: &str, files: &[&str]) -> arbor_core::indexer::IndexResult {
    let resolver = PathResolver::new(&BTreeMap::new(), files.iter().map(|s| s.to_string()));
    let ctx = IndexContext::new(&resolver, &[]);
    GenericIndexer::new().index_file(path, source, &ctx)
}

#[test]
fn test_include_directive_resolves_sibling() {
    let result = index(
        "#include \"util.h\"\n\nint main() { return 0; }\n",
        "src/main.c",
        &["src/main.c", "src/util.h"],
    );

    let edge = &result.edges[0];
    assert_eq!(edge.kind(), EdgeKind::Imports);
    assert_eq!(edge.to(), &NodeId::file("src/util.h"));
    assert_eq!(edge.confidence(), Confidence::Medium);
}

#[test]
fn test_ruby_require_relative() {
    let result = index(
        "require './helper'\n",
        "lib/main.rb",
        &["lib/main.rb", "lib/helper.rb"],
    );

    let edge = &result.edges[0];
    assert_eq!(edge.to(), &NodeId::file("lib/helper.rb"));
}

#[test]
fn test_unresolved_reference_is_low_confidence() {
    let result = index(
        "import 'somewhere/far'\n",
        "src/app.vue",
        &["src/app.vue"],
    );

    let edge = &result.edges[0];
    assert_eq!(edge.confidence(), Confidence::Low);
    assert!(edge.to().as_str().starts_with("module:"));
}

#[test]
fn test_never_errors_on_garbage() {
    let result = index("\u{0}\u{1}\u{2} not a language", "data/blob.lua", &[]);
    assert!(result.errors.is_empty());
    assert!(result
        .nodes
        .iter()
        .any(|n| n.kind() == NodeKind::File));
}

#[test]
fn test_registry_falls_back_to_generic() {
    let registry = IndexerRegistry::new();
    let indexer = registry.for_path(Path::new("script.lua"));
    assert_eq!(indexer.language(), "generic");

    let indexer = registry.for_path(Path::new("module.ts"));
    assert_eq!(indexer.language(), "typescript");
}

#[test]
fn test_registry_registration_takes_precedence() {
    struct FakeIndexer;
    impl Indexer for FakeIndexer {
        fn language(&self) -> &str {
            "fake"
        }
        fn extensions(&self) -> &[&str] {
            &[".ts"]
        }
        fn index_file(
            &self,
            path: &str,
            _content: &str,
            _ctx: &IndexContext,
        ) -> arbor_core::indexer::IndexResult {
            arbor_core::indexer::IndexResult {
                nodes: vec![arbor_core::GraphNode::file(path, "fake")],
                edges: vec![],
                errors: vec![],
            }
        }
    }

    let mut registry = IndexerRegistry::new();
    registry.register(Box::new(FakeIndexer));
    assert_eq!(registry.for_path(Path::new("a.ts")).language(), "fake");
}
