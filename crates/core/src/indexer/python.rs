//! Python indexer using Tree-sitter
//!
//! Extracts `import`/`from ... import` edges (including relative imports),
//! `importlib`/`__import__` dynamic references, top-level definitions as
//! the export list, `__main__` guards, and Flask/FastAPI-style route
//! decorators.

use std::path::Path;

use tree_sitter::{Node as TsNode, Parser, Tree};

use super::{IndexContext, Indexer, IndexResult};
use crate::graph::{
    Confidence, EdgeKind, EdgeMeta, EntrypointKind, GraphEdge, GraphNode, NodeId,
};

/// Python language indexer
pub struct PythonIndexer;

impl PythonIndexer {
    pub fn new() -> Self {
        Self
    }

    fn parse_tree(&self, content: &str) -> Option<Tree> {
        let mut parser = Parser::new();
        parser
            .set_language(&tree_sitter_python::LANGUAGE.into())
            .ok()?;
        parser.parse(content, None)
    }
}

impl Indexer for PythonIndexer {
    fn language(&self) -> &str {
        "python"
    }

    fn extensions(&self) -> &[&str] {
        &[".py", ".pyi"]
    }

    fn index_file(&self, path: &str, content: &str, ctx: &IndexContext) -> IndexResult {
        let Some(tree) = self.parse_tree(content) else {
            return IndexResult::file_only(path, self.language(), "tree-sitter parse failed");
        };

        let file_id = NodeId::file(path);
        let mut edges: Vec<GraphEdge> = Vec::new();
        let mut entrypoints: Vec<GraphNode> = Vec::new();
        let mut exports: Vec<String> = Vec::new();

        let root = tree.root_node();
        let mut cursor = root.walk();
        for child in root.children(&mut cursor) {
            match child.kind() {
                "import_statement" => {
                    visit_import(&child, content, path, &file_id, ctx, &mut edges)
                }
                "import_from_statement" => {
                    visit_import_from(&child, content, path, &file_id, ctx, &mut edges)
                }
                "function_definition" | "class_definition" => {
                    if let Some(name) = field_text(&child, "name", content) {
                        if !name.starts_with('_') {
                            exports.push(name);
                        }
                    }
                }
                "decorated_definition" => visit_decorated(
                    &child,
                    content,
                    path,
                    &file_id,
                    &mut exports,
                    &mut entrypoints,
                    &mut edges,
                ),
                "expression_statement" => {
                    // Module-level assignments are part of the public surface
                    if let Some(assignment) = child.child(0).filter(|c| c.kind() == "assignment") {
                        if let Some(left) = assignment.child_by_field_name("left") {
                            if left.kind() == "identifier" {
                                if let Ok(name) = left.utf8_text(content.as_bytes()) {
                                    if !name.starts_with('_') {
                                        exports.push(name.to_string());
                                    }
                                }
                            }
                        }
                    }
                }
                _ => {}
            }
        }

        visit_dynamic_imports(&root, content, path, &file_id, ctx, &mut edges);

        if content.contains("__main__") && content.contains("__name__") {
            let entry = GraphNode::entrypoint(path, "main", EntrypointKind::Main);
            edges.push(
                GraphEdge::new(
                    entry.id().clone(),
                    file_id.clone(),
                    EdgeKind::Calls,
                    Confidence::High,
                )
                .with_reason("__main__ guard"),
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

/// `import a.b, c` — one edge per dotted name.
fn visit_import(
    node: &TsNode,
    source: &str,
    path: &str,
    file_id: &NodeId,
    ctx: &IndexContext,
    edges: &mut Vec<GraphEdge>,
) {
    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        let dotted = match child.kind() {
            "dotted_name" => Some(child),
            "aliased_import" => child.child_by_field_name("name"),
            _ => None,
        };
        let Some(dotted) = dotted else { continue };
        let Ok(module) = dotted.utf8_text(source.as_bytes()) else {
            continue;
        };
        push_import_edge(module, &[], false, node, path, file_id, ctx, edges);
    }
}

/// `from .pkg import a, b` — relative levels become `./`/`../` specifiers.
fn visit_import_from(
    node: &TsNode,
    source: &str,
    path: &str,
    file_id: &NodeId,
    ctx: &IndexContext,
    edges: &mut Vec<GraphEdge>,
) {
    let Some(module_node) = node.child_by_field_name("module_name") else {
        return;
    };
    let Ok(raw_module) = module_node.utf8_text(source.as_bytes()) else {
        return;
    };

    let mut symbols = Vec::new();
    let mut is_wildcard = false;
    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        match child.kind() {
            "wildcard_import" => is_wildcard = true,
            "dotted_name" if child.id() != module_node.id() => {
                if let Ok(name) = child.utf8_text(source.as_bytes()) {
                    symbols.push(name.to_string());
                }
            }
            "aliased_import" => {
                if let Some(name) = field_text(&child, "name", source) {
                    symbols.push(name);
                }
            }
            _ => {}
        }
    }

    let specifier = relative_to_specifier(raw_module);
    push_import_edge(&specifier, &symbols, is_wildcard, node, path, file_id, ctx, edges);
}

/// Rewrite Python's leading-dot notation into path-style relativity:
/// `.x` → `./x`, `..pkg.y` → `../pkg/y`, a bare `.` → `.`.
fn relative_to_specifier(module: &str) -> String {
    let dots = module.chars().take_while(|&c| c == '.').count();
    if dots == 0 {
        return module.to_string();
    }
    let rest = module[dots..].replace('.', "/");
    let mut prefix = if dots == 1 {
        "./".to_string()
    } else {
        "../".repeat(dots - 1)
    };
    if rest.is_empty() {
        prefix.pop(); // "./" → "." and "../" stays a directory reference
        prefix
    } else {
        format!("{}{}", prefix, rest)
    }
}

#[allow(clippy::too_many_arguments)]
fn push_import_edge(
    specifier: &str,
    symbols: &[String],
    is_wildcard: bool,
    node: &TsNode,
    path: &str,
    file_id: &NodeId,
    ctx: &IndexContext,
    edges: &mut Vec<GraphEdge>,
) {
    let target = ctx.resolver.resolve(specifier, Path::new(path));
    let confidence = if target.is_internal() {
        Confidence::High
    } else if specifier.starts_with('.') {
        Confidence::Low
    } else {
        // Bare package import: certain, even though external
        Confidence::High
    };

    edges.push(
        GraphEdge::new(file_id.clone(), target.node_id(), EdgeKind::Imports, confidence)
            .with_reason("static import")
            .with_meta(EdgeMeta {
                line: Some(node.start_position().row + 1),
                symbols: symbols.to_vec(),
                is_wildcard,
                ..EdgeMeta::default()
            }),
    );
}

/// Decorated definitions: collect the export name and recognize
/// `@app.route("/x")` / `@router.get("/x")` route registrations.
fn visit_decorated(
    node: &TsNode,
    source: &str,
    path: &str,
    file_id: &NodeId,
    exports: &mut Vec<String>,
    entrypoints: &mut Vec<GraphNode>,
    edges: &mut Vec<GraphEdge>,
) {
    if let Some(definition) = node.child_by_field_name("definition") {
        if let Some(name) = field_text(&definition, "name", source) {
            if !name.starts_with('_') {
                exports.push(name);
            }
        }
    }

    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        if child.kind() != "decorator" {
            continue;
        }
        let Ok(text) = child.utf8_text(source.as_bytes()) else {
            continue;
        };
        let looks_like_route = ["route", ".get", ".post", ".put", ".delete", ".patch"]
            .iter()
            .any(|m| text.contains(m));
        if !looks_like_route {
            continue;
        }
        let Some(route) = text.split('"').nth(1).or_else(|| text.split('\'').nth(1)) else {
            continue;
        };
        if !route.starts_with('/') {
            continue;
        }

        let entry = GraphNode::entrypoint(path, route, EntrypointKind::Route);
        edges.push(
            GraphEdge::new(
                entry.id().clone(),
                file_id.clone(),
                EdgeKind::Registers,
                Confidence::High,
            )
            .with_reason("route decorator")
            .with_meta(EdgeMeta {
                line: Some(child.start_position().row + 1),
                ..EdgeMeta::default()
            }),
        );
        entrypoints.push(entry);
        break;
    }
}

/// `importlib.import_module(...)` and `__import__(...)` anywhere in the
/// tree. Literal arguments resolve at medium confidence; computed ones
/// degrade to a low-confidence dynamic placeholder.
fn visit_dynamic_imports(
    node: &TsNode,
    source: &str,
    path: &str,
    file_id: &NodeId,
    ctx: &IndexContext,
    edges: &mut Vec<GraphEdge>,
) {
    if node.kind() == "call" {
        let callee = node
            .child_by_field_name("function")
            .and_then(|f| f.utf8_text(source.as_bytes()).ok())
            .unwrap_or("");
        if callee == "importlib.import_module" || callee == "__import__" {
            let line = Some(node.start_position().row + 1);
            let literal = node
                .child_by_field_name("arguments")
                .and_then(|args| args.child(1))
                .filter(|arg| arg.kind() == "string")
                .and_then(|arg| arg.utf8_text(source.as_bytes()).ok())
                .map(|s| s.trim_matches(|c| c == '\'' || c == '"').to_string());

            match literal {
                Some(specifier) => {
                    let target = ctx.resolver.resolve(&specifier, Path::new(path));
                    edges.push(
                        GraphEdge::new(
                            file_id.clone(),
                            target.node_id(),
                            EdgeKind::Imports,
                            Confidence::Medium,
                        )
                        .with_reason("dynamic import")
                        .with_meta(EdgeMeta {
                            line,
                            dynamic: true,
                            ..EdgeMeta::default()
                        }),
                    );
                }
                None => {
                    edges.push(
                        GraphEdge::new(
                            file_id.clone(),
                            NodeId::external("<computed>"),
                            EdgeKind::Imports,
                            Confidence::Low,
                        )
                        .with_reason("dynamic import with computed specifier")
                        .with_meta(EdgeMeta {
                            line,
                            dynamic: true,
                            ..EdgeMeta::default()
                        }),
                    );
                }
            }
        }
    }

    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        visit_dynamic_imports(&child, source, path, file_id, ctx, edges);
    }
}

fn field_text(node: &TsNode, field: &str, source: &str) -> Option<String> {
    node.child_by_field_name(field)
        .and_then(|n| n.utf8_text(source.as_bytes()).ok())
        .map(String::from)
}
