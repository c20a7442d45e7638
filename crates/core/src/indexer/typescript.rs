//! TypeScript/JavaScript indexer using Tree-sitter
//!
//! Extracts static imports, re-export chains (the barrel backbone),
//! dynamic `import()`/`require()` references, export lists, and
//! entrypoints (main-module guard, shebang scripts, HTTP route
//! registrations).

use std::path::Path;

use tree_sitter::{Node as TsNode, Parser, Tree};

use super::{IndexContext, Indexer, IndexResult};
use crate::graph::{
    Confidence, EdgeKind, EdgeMeta, EntrypointKind, GraphEdge, GraphNode, NodeId,
};

const ROUTE_OBJECTS: &[&str] = &["app", "router", "server", "api"];
const ROUTE_METHODS: &[&str] = &[
    "get", "post", "put", "delete", "patch", "head", "options", "all",
];

/// TypeScript indexer (also handles JavaScript variants)
pub struct TypeScriptIndexer;

impl TypeScriptIndexer {
    pub fn new() -> Self {
        Self
    }

    fn grammar_for(path: &str) -> tree_sitter::Language {
        if path.ends_with(".tsx") {
            tree_sitter_typescript::LANGUAGE_TSX.into()
        } else if path.ends_with(".ts") {
            tree_sitter_typescript::LANGUAGE_TYPESCRIPT.into()
        } else {
            tree_sitter_javascript::LANGUAGE.into()
        }
    }

    fn parse_tree(&self, path: &str, content: &str) -> Option<Tree> {
        let mut parser = Parser::new();
        parser.set_language(&Self::grammar_for(path)).ok()?;
        parser.parse(content, None)
    }
}

impl Indexer for TypeScriptIndexer {
    fn language(&self) -> &str {
        "typescript"
    }

    fn extensions(&self) -> &[&str] {
        &[".ts", ".tsx", ".js", ".jsx", ".mjs", ".cjs"]
    }

    fn index_file(&self, path: &str, content: &str, ctx: &IndexContext) -> IndexResult {
        let Some(tree) = self.parse_tree(path, content) else {
            return IndexResult::file_only(path, self.language(), "tree-sitter parse failed");
        };

        let mut state = FileState::new(path);
        let root = tree.root_node();

        let mut cursor = root.walk();
        for child in root.children(&mut cursor) {
            state.visit_top_level(&child, content, ctx);
        }

        // Second pass: dynamic import() / require() anywhere in the tree
        state.visit_calls(&root, content, ctx);

        state.detect_entrypoints(content, ctx);
        state.finish(self.language())
    }
}

/// Accumulated per-file extraction state
struct FileState<'p> {
    path: &'p str,
    file_id: NodeId,
    edges: Vec<GraphEdge>,
    entrypoints: Vec<GraphNode>,
    exports: Vec<String>,
    reexport_count: usize,
    plain_decl_count: usize,
}

impl<'p> FileState<'p> {
    fn new(path: &'p str) -> Self {
        Self {
            path,
            file_id: NodeId::file(path),
            edges: Vec::new(),
            entrypoints: Vec::new(),
            exports: Vec::new(),
            reexport_count: 0,
            plain_decl_count: 0,
        }
    }

    fn visit_top_level(&mut self, node: &TsNode, source: &str, ctx: &IndexContext) {
        match node.kind() {
            "import_statement" => self.visit_import(node, source, ctx),
            "export_statement" => self.visit_export(node, source, ctx),
            "comment" | "hash_bang_line" | "empty_statement" => {}
            _ => {
                self.plain_decl_count += 1;
            }
        }
    }

    /// `import ... from 'x'` — a syntactically static import.
    fn visit_import(&mut self, node: &TsNode, source: &str, ctx: &IndexContext) {
        let Some(specifier) = source_specifier(node, source) else {
            return;
        };

        let mut symbols = Vec::new();
        let mut is_wildcard = false;
        let mut cursor = node.walk();
        for child in node.children(&mut cursor) {
            if child.kind() == "import_clause" {
                collect_import_clause(&child, source, &mut symbols, &mut is_wildcard);
            }
        }

        let target = ctx.resolver.resolve(&specifier, Path::new(self.path));
        let confidence = if target.is_internal() {
            Confidence::High
        } else if specifier.starts_with('.') {
            // Relative specifier that did not resolve: degraded placeholder
            Confidence::Low
        } else {
            Confidence::High
        };

        self.edges.push(
            GraphEdge::new(
                self.file_id.clone(),
                target.node_id(),
                EdgeKind::Imports,
                confidence,
            )
            .with_reason("static import")
            .with_meta(EdgeMeta {
                line: Some(node.start_position().row + 1),
                symbols,
                is_wildcard,
                ..EdgeMeta::default()
            }),
        );
    }

    /// `export ...` — either a re-export (with a source) or a declaration.
    fn visit_export(&mut self, node: &TsNode, source: &str, ctx: &IndexContext) {
        if let Some(specifier) = source_specifier(node, source) {
            self.visit_reexport(node, source, ctx, &specifier);
            return;
        }

        // export <declaration> / export default <expr>
        if let Some(declaration) = node.child_by_field_name("declaration") {
            self.plain_decl_count += 1;
            match declaration.kind() {
                "lexical_declaration" | "variable_declaration" => {
                    let mut cursor = declaration.walk();
                    for declarator in declaration.children(&mut cursor) {
                        if declarator.kind() == "variable_declarator" {
                            if let Some(name) = field_text(&declarator, "name", source) {
                                self.exports.push(name);
                            }
                        }
                    }
                }
                _ => {
                    if let Some(name) = field_text(&declaration, "name", source) {
                        self.exports.push(name);
                    }
                }
            }
            return;
        }

        let mut cursor = node.walk();
        for child in node.children(&mut cursor) {
            match child.kind() {
                // export { a, b }
                "export_clause" => {
                    let mut inner = child.walk();
                    for spec in child.children(&mut inner) {
                        if spec.kind() == "export_specifier" {
                            if let Some(name) = field_text(&spec, "name", source) {
                                self.exports.push(name);
                            }
                        }
                    }
                }
                "default" => self.exports.push("default".to_string()),
                _ => {}
            }
        }
    }

    /// `export { a } from 'x'` / `export * from 'x'` — a re-export link.
    fn visit_reexport(
        &mut self,
        node: &TsNode,
        source: &str,
        ctx: &IndexContext,
        specifier: &str,
    ) {
        let mut symbols = Vec::new();
        let mut is_wildcard = false;
        let mut cursor = node.walk();
        for child in node.children(&mut cursor) {
            match child.kind() {
                "export_clause" => {
                    let mut inner = child.walk();
                    for spec in child.children(&mut inner) {
                        if spec.kind() == "export_specifier" {
                            // Re-exported under its alias when present
                            let exported = field_text(&spec, "alias", source)
                                .or_else(|| field_text(&spec, "name", source));
                            if let Some(name) = exported {
                                self.exports.push(name.clone());
                                symbols.push(name);
                            }
                        }
                    }
                }
                "*" | "namespace_export" => is_wildcard = true,
                _ => {}
            }
        }

        let target = ctx.resolver.resolve(specifier, Path::new(self.path));
        let confidence = if target.is_internal() {
            Confidence::High
        } else if specifier.starts_with('.') {
            Confidence::Low
        } else {
            Confidence::High
        };

        self.reexport_count += 1;
        self.edges.push(
            GraphEdge::new(
                self.file_id.clone(),
                target.node_id(),
                EdgeKind::Reexports,
                confidence,
            )
            .with_reason("re-export")
            .with_meta(EdgeMeta {
                line: Some(node.start_position().row + 1),
                symbols,
                is_wildcard,
                ..EdgeMeta::default()
            }),
        );
    }

    /// Walk the whole tree for `import()` / `require()` call expressions
    /// and HTTP route registrations.
    fn visit_calls(&mut self, node: &TsNode, source: &str, ctx: &IndexContext) {
        if node.kind() == "call_expression" {
            self.visit_call(node, source, ctx);
        }
        let mut cursor = node.walk();
        for child in node.children(&mut cursor) {
            self.visit_calls(&child, source, ctx);
        }
    }

    fn visit_call(&mut self, node: &TsNode, source: &str, ctx: &IndexContext) {
        let Some(function) = node.child_by_field_name("function") else {
            return;
        };
        let callee = function.utf8_text(source.as_bytes()).unwrap_or("");

        match function.kind() {
            // Dynamic import: import('x')
            "import" => self.visit_dynamic_ref(node, source, ctx, "dynamic import"),
            "identifier" if callee == "require" => {
                self.visit_dynamic_ref(node, source, ctx, "require")
            }
            "member_expression" => self.visit_route_registration(&function, node, source),
            _ => {}
        }
    }

    /// An `import(arg)` or `require(arg)` reference. A literal argument is
    /// still a resolvable import; anything computed degrades to a dynamic
    /// placeholder the issue detector can report.
    fn visit_dynamic_ref(&mut self, node: &TsNode, source: &str, ctx: &IndexContext, via: &str) {
        let Some(args) = node.child_by_field_name("arguments") else {
            return;
        };
        let first_arg = first_argument(&args);
        let line = Some(node.start_position().row + 1);

        match first_arg.as_ref().and_then(|a| string_literal(a, source)) {
            Some(specifier) => {
                let target = ctx.resolver.resolve(&specifier, Path::new(self.path));
                // require with a literal is as static as an import statement;
                // import() stays medium even when the literal resolves
                let confidence = if via == "require" {
                    Confidence::High
                } else {
                    Confidence::Medium
                };
                self.edges.push(
                    GraphEdge::new(
                        self.file_id.clone(),
                        target.node_id(),
                        EdgeKind::Imports,
                        confidence,
                    )
                    .with_reason(via)
                    .with_meta(EdgeMeta {
                        line,
                        dynamic: via != "require",
                        ..EdgeMeta::default()
                    }),
                );
            }
            None => {
                // Computed specifier: unresolvable, keep a low-confidence trace
                let raw = first_arg
                    .and_then(|a| a.utf8_text(source.as_bytes()).ok().map(String::from))
                    .unwrap_or_else(|| "<unknown>".to_string());
                let label = truncate(&raw, 48);
                self.edges.push(
                    GraphEdge::new(
                        self.file_id.clone(),
                        NodeId::external(&label),
                        EdgeKind::Imports,
                        Confidence::Low,
                    )
                    .with_reason(format!("{} with computed specifier", via))
                    .with_meta(EdgeMeta {
                        line,
                        dynamic: true,
                        ..EdgeMeta::default()
                    }),
                );
            }
        }
    }

    /// `app.get('/users', handler)` style registrations become route
    /// entrypoints owned by this file.
    fn visit_route_registration(&mut self, function: &TsNode, call: &TsNode, source: &str) {
        let object = field_text(function, "object", source).unwrap_or_default();
        let property = field_text(function, "property", source).unwrap_or_default();

        if !ROUTE_OBJECTS.contains(&object.as_str()) || !ROUTE_METHODS.contains(&property.as_str())
        {
            return;
        }
        let Some(args) = call.child_by_field_name("arguments") else {
            return;
        };
        let Some(route) = first_argument(&args).and_then(|a| string_literal(&a, source)) else {
            return;
        };

        let label = format!("{} {}", property.to_uppercase(), route);
        let entry = GraphNode::entrypoint(self.path, &label, EntrypointKind::Route);
        self.edges.push(
            GraphEdge::new(
                entry.id().clone(),
                self.file_id.clone(),
                EdgeKind::Registers,
                Confidence::High,
            )
            .with_reason("route registration")
            .with_meta(EdgeMeta {
                line: Some(call.start_position().row + 1),
                ..EdgeMeta::default()
            }),
        );
        self.entrypoints.push(entry);
    }

    fn detect_entrypoints(&mut self, content: &str, _ctx: &IndexContext) {
        let (label, kind) = if content.contains("require.main === module") {
            ("main", EntrypointKind::Main)
        } else if content.starts_with("#!") {
            ("script", EntrypointKind::Script)
        } else {
            return;
        };

        let entry = GraphNode::entrypoint(self.path, label, kind);
        self.edges.push(
            GraphEdge::new(
                entry.id().clone(),
                self.file_id.clone(),
                EdgeKind::Calls,
                Confidence::High,
            )
            .with_reason("main-module pattern"),
        );
        self.entrypoints.push(entry);
    }

    fn finish(mut self, language: &str) -> IndexResult {
        let mut file = GraphNode::file(self.path, language);
        self.exports.sort();
        self.exports.dedup();
        file.meta_mut().exports = self.exports;
        // A barrel only aggregates: re-exports present, nothing declared
        file.meta_mut().is_barrel = self.reexport_count > 0 && self.plain_decl_count == 0;

        let mut nodes = vec![file];
        nodes.extend(self.entrypoints);
        IndexResult {
            nodes,
            edges: self.edges,
            errors: Vec::new(),
        }
    }
}

// ── Tree helpers ───────────────────────────────────────────────

fn source_specifier(node: &TsNode, source: &str) -> Option<String> {
    node.child_by_field_name("source")
        .and_then(|s| s.utf8_text(source.as_bytes()).ok())
        .map(|s| s.trim_matches(|c| c == '\'' || c == '"' || c == '`').to_string())
}

fn field_text(node: &TsNode, field: &str, source: &str) -> Option<String> {
    node.child_by_field_name(field)
        .and_then(|n| n.utf8_text(source.as_bytes()).ok())
        .map(String::from)
}

fn collect_import_clause(
    node: &TsNode,
    source: &str,
    symbols: &mut Vec<String>,
    is_wildcard: &mut bool,
) {
    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        match child.kind() {
            // Default import: import Foo from 'mod'
            "identifier" => {
                if let Ok(name) = child.utf8_text(source.as_bytes()) {
                    symbols.push(name.to_string());
                }
            }
            // Named imports: import { a, b } from 'mod'
            "named_imports" => {
                let mut inner = child.walk();
                for spec in child.children(&mut inner) {
                    if spec.kind() == "import_specifier" {
                        if let Some(name) = field_text(&spec, "name", source) {
                            symbols.push(name);
                        }
                    }
                }
            }
            // Namespace import: import * as ns from 'mod'
            "namespace_import" => *is_wildcard = true,
            _ => {}
        }
    }
}

fn first_argument<'a>(args: &TsNode<'a>) -> Option<TsNode<'a>> {
    let mut cursor = args.walk();
    let found = args
        .children(&mut cursor)
        .find(|c| !matches!(c.kind(), "(" | ")" | ","));
    found
}

fn string_literal(node: &TsNode, source: &str) -> Option<String> {
    if node.kind() != "string" {
        return None;
    }
    let raw = node.utf8_text(source.as_bytes()).ok()?;
    // Template strings with interpolation are not literals
    if raw.contains("${") {
        return None;
    }
    Some(raw.trim_matches(|c| c == '\'' || c == '"' || c == '`').to_string())
}

fn truncate(s: &str, max: usize) -> String {
    match s.char_indices().nth(max) {
        Some((idx, _)) => format!("{}…", &s[..idx]),
        None => s.to_string(),
    }
}
