//! Rust indexer using Tree-sitter
//!
//! Extracts `mod` declarations and `use` paths as import edges, public
//! items as the export list, and `fn main` as an entrypoint.

use std::path::Path;

use tree_sitter::{Node as TsNode, Parser, Tree};

use super::{IndexContext, Indexer, IndexResult};
use crate::graph::{
    Confidence, EdgeKind, EdgeMeta, EntrypointKind, GraphEdge, GraphNode, NodeId,
};

/// Rust language indexer
pub struct RustIndexer;

impl RustIndexer {
    pub fn new() -> Self {
        Self
    }

    fn parse_tree(&self, content: &str) -> Option<Tree> {
        let mut parser = Parser::new();
        parser
            .set_language(&tree_sitter_rust::LANGUAGE.into())
            .ok()?;
        parser.parse(content, None)
    }
}

impl Indexer for RustIndexer {
    fn language(&self) -> &str {
        "rust"
    }

    fn extensions(&self) -> &[&str] {
        &[".rs"]
    }

    fn index_file(&self, path: &str, content: &str, ctx: &IndexContext) -> IndexResult {
        let Some(tree) = self.parse_tree(content) else {
            return IndexResult::file_only(path, self.language(), "tree-sitter parse failed");
        };

        let file_id = NodeId::file(path);
        let mut edges: Vec<GraphEdge> = Vec::new();
        let mut entrypoints: Vec<GraphNode> = Vec::new();
        let mut exports: Vec<String> = Vec::new();
        let mut has_main = false;

        let root = tree.root_node();
        let mut cursor = root.walk();
        for child in root.children(&mut cursor) {
            match child.kind() {
                "mod_item" => {
                    let Some(name) = field_text(&child, "name", content) else {
                        continue;
                    };
                    if is_public(&child, content) {
                        exports.push(name.clone());
                    }
                    // `mod x;` without a body points at a sibling module file
                    if child.child_by_field_name("body").is_none() {
                        let target = ctx
                            .resolver
                            .resolve(&format!("./{}", name), Path::new(path));
                        edges.push(
                            GraphEdge::new(
                                file_id.clone(),
                                target.node_id(),
                                EdgeKind::Imports,
                                if target.is_internal() {
                                    Confidence::High
                                } else {
                                    Confidence::Low
                                },
                            )
                            .with_reason("module declaration")
                            .with_meta(EdgeMeta {
                                line: Some(child.start_position().row + 1),
                                ..EdgeMeta::default()
                            }),
                        );
                    }
                }
                "use_declaration" => {
                    visit_use(&child, content, path, &file_id, ctx, &mut edges);
                }
                "function_item" => {
                    if let Some(name) = field_text(&child, "name", content) {
                        if name == "main" {
                            has_main = true;
                        }
                        if is_public(&child, content) {
                            exports.push(name);
                        }
                    }
                }
                "struct_item" | "enum_item" | "trait_item" | "type_item" | "const_item"
                | "static_item" | "macro_definition" => {
                    if is_public(&child, content) {
                        if let Some(name) = field_text(&child, "name", content) {
                            exports.push(name);
                        }
                    }
                }
                _ => {}
            }
        }

        if has_main {
            let entry = GraphNode::entrypoint(path, "main", EntrypointKind::Main);
            edges.push(
                GraphEdge::new(
                    entry.id().clone(),
                    file_id.clone(),
                    EdgeKind::Calls,
                    Confidence::High,
                )
                .with_reason("fn main"),
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

/// `use crate::a::b::C;` — resolve the module path against the source
/// tree. `crate::`/`self::`/`super::` paths are probed upward from the
/// importing file; external crate paths become placeholders.
fn visit_use(
    node: &TsNode,
    source: &str,
    path: &str,
    file_id: &NodeId,
    ctx: &IndexContext,
    edges: &mut Vec<GraphEdge>,
) {
    let Some(argument) = node.child_by_field_name("argument") else {
        return;
    };
    let Ok(raw) = argument.utf8_text(source.as_bytes()) else {
        return;
    };

    // Take the path up to any `{...}` group or glob
    let head = raw.split('{').next().unwrap_or(raw);
    let segments: Vec<&str> = head
        .split("::")
        .map(|s| s.trim())
        .filter(|s| !s.is_empty() && *s != "*")
        .collect();
    if segments.is_empty() {
        return;
    }

    let line = Some(node.start_position().row + 1);
    let is_local_root = matches!(segments[0], "crate" | "self" | "super");

    if is_local_root {
        let rest: Vec<&str> = segments[1..].to_vec();
        if rest.is_empty() {
            return;
        }
        match ctx.resolver.resolve_module_path(&rest, Path::new(path)) {
            Some(target_path) => {
                // Self-imports of the file's own items are not edges
                if target_path == path {
                    return;
                }
                edges.push(
                    GraphEdge::new(
                        file_id.clone(),
                        NodeId::file(&target_path),
                        EdgeKind::Imports,
                        Confidence::Medium,
                    )
                    .with_reason("use declaration")
                    .with_meta(EdgeMeta {
                        line,
                        symbols: vec![segments.last().copied().unwrap_or("").to_string()],
                        ..EdgeMeta::default()
                    }),
                );
            }
            None => {
                edges.push(
                    GraphEdge::new(
                        file_id.clone(),
                        NodeId::external(&segments.join("::")),
                        EdgeKind::Imports,
                        Confidence::Low,
                    )
                    .with_reason("unresolved use path")
                    .with_meta(EdgeMeta {
                        line,
                        ..EdgeMeta::default()
                    }),
                );
            }
        }
    } else {
        // External crate
        edges.push(
            GraphEdge::new(
                file_id.clone(),
                NodeId::external(segments[0]),
                EdgeKind::Imports,
                Confidence::High,
            )
            .with_reason("use declaration")
            .with_meta(EdgeMeta {
                line,
                ..EdgeMeta::default()
            }),
        );
    }
}

fn is_public(node: &TsNode, source: &str) -> bool {
    let mut cursor = node.walk();
    let result = node.children(&mut cursor).any(|c| {
        c.kind() == "visibility_modifier"
            && c.utf8_text(source.as_bytes())
                .map(|t| t.starts_with("pub"))
                .unwrap_or(false)
    });
    result
}

fn field_text(node: &TsNode, field: &str, source: &str) -> Option<String> {
    node.child_by_field_name(field)
        .and_then(|n| n.utf8_text(source.as_bytes()).ok())
        .map(String::from)
}
