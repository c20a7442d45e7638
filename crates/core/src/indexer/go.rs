//! Go indexer using Tree-sitter
//!
//! Extracts import declarations (matched to package directories inside the
//! tree, external placeholders otherwise), exported identifiers, and
//! `func main` in `package main` as an entrypoint.

use std::path::Path;

use tree_sitter::{Node as TsNode, Parser, Tree};

use super::{IndexContext, Indexer, IndexResult};
use crate::graph::{
    Confidence, EdgeKind, EdgeMeta, EntrypointKind, GraphEdge, GraphNode, NodeId,
};

/// Go language indexer
pub struct GoIndexer;

impl GoIndexer {
    pub fn new() -> Self {
        Self
    }

    fn parse_tree(&self, content: &str) -> Option<Tree> {
        let mut parser = Parser::new();
        parser.set_language(&tree_sitter_go::LANGUAGE.into()).ok()?;
        parser.parse(content, None)
    }
}

impl Indexer for GoIndexer {
    fn language(&self) -> &str {
        "go"
    }

    fn extensions(&self) -> &[&str] {
        &[".go"]
    }

    fn index_file(&self, path: &str, content: &str, ctx: &IndexContext) -> IndexResult {
        let Some(tree) = self.parse_tree(content) else {
            return IndexResult::file_only(path, self.language(), "tree-sitter parse failed");
        };

        let file_id = NodeId::file(path);
        let mut edges: Vec<GraphEdge> = Vec::new();
        let mut exports: Vec<String> = Vec::new();
        let mut is_package_main = false;
        let mut has_main = false;

        let root = tree.root_node();
        let mut cursor = root.walk();
        for child in root.children(&mut cursor) {
            match child.kind() {
                "package_clause" => {
                    let name = child
                        .utf8_text(content.as_bytes())
                        .unwrap_or("")
                        .trim_start_matches("package")
                        .trim();
                    is_package_main = name == "main";
                }
                "import_declaration" => {
                    visit_import_declaration(&child, content, path, &file_id, ctx, &mut edges);
                }
                "function_declaration" | "method_declaration" => {
                    if let Some(name) = field_text(&child, "name", content) {
                        if name == "main" {
                            has_main = true;
                        }
                        if is_exported(&name) {
                            exports.push(name);
                        }
                    }
                }
                "type_declaration" => {
                    collect_spec_names(&child, content, "type_spec", &mut exports);
                }
                "var_declaration" => {
                    collect_spec_names(&child, content, "var_spec", &mut exports);
                }
                "const_declaration" => {
                    collect_spec_names(&child, content, "const_spec", &mut exports);
                }
                _ => {}
            }
        }

        let mut entrypoints = Vec::new();
        if is_package_main && has_main {
            let entry = GraphNode::entrypoint(path, "main", EntrypointKind::Main);
            edges.push(
                GraphEdge::new(
                    entry.id().clone(),
                    file_id.clone(),
                    EdgeKind::Calls,
                    Confidence::High,
                )
                .with_reason("func main"),
            );
            entrypoints.push(entry);
        }

        let mut file = GraphNode::file(path, self.language());
        exports.sort();
        exports.dedup();
        file.meta_mut().exports = exports;

        let mut nodes = vec![file];
        nodes.extend(entrypoints);
        IndexResult {
            nodes,
            edges,
            errors: Vec::new(),
        }
    }
}

/// An import_declaration holds one import_spec or an import_spec_list.
fn visit_import_declaration(
    node: &TsNode,
    source: &str,
    path: &str,
    file_id: &NodeId,
    ctx: &IndexContext,
    edges: &mut Vec<GraphEdge>,
) {
    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        match child.kind() {
            "import_spec" => visit_import_spec(&child, source, path, file_id, ctx, edges),
            "import_spec_list" => {
                let mut inner = child.walk();
                for spec in child.children(&mut inner) {
                    if spec.kind() == "import_spec" {
                        visit_import_spec(&spec, source, path, file_id, ctx, edges);
                    }
                }
            }
            _ => {}
        }
    }
}

fn visit_import_spec(
    node: &TsNode,
    source: &str,
    path: &str,
    file_id: &NodeId,
    ctx: &IndexContext,
    edges: &mut Vec<GraphEdge>,
) {
    let Some(specifier) = node
        .child_by_field_name("path")
        .and_then(|p| p.utf8_text(source.as_bytes()).ok())
        .map(|s| s.trim_matches('"').to_string())
    else {
        return;
    };

    let target = ctx.resolver.resolve(&specifier, Path::new(path));
    // Package-suffix matching is a directory heuristic, never certain
    let confidence = if target.is_internal() {
        Confidence::Medium
    } else {
        Confidence::High
    };

    edges.push(
        GraphEdge::new(file_id.clone(), target.node_id(), EdgeKind::Imports, confidence)
            .with_reason("import declaration")
            .with_meta(EdgeMeta {
                line: Some(node.start_position().row + 1),
                ..EdgeMeta::default()
            }),
    );
}

fn collect_spec_names(node: &TsNode, source: &str, spec_kind: &str, exports: &mut Vec<String>) {
    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        if child.kind() == spec_kind {
            if let Some(name) = field_text(&child, "name", source) {
                if is_exported(&name) {
                    exports.push(name);
                }
            }
        }
    }
}

/// Go exports by capitalization.
fn is_exported(name: &str) -> bool {
    name.chars().next().map(|c| c.is_uppercase()).unwrap_or(false)
}

fn field_text(node: &TsNode, field: &str, source: &str) -> Option<String> {
    node.child_by_field_name(field)
        .and_then(|n| n.utf8_text(source.as_bytes()).ok())
        .map(String::from)
}
