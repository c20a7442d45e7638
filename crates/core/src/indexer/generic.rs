//! Text-heuristic fallback indexer for unrecognized languages
//!
//! No grammar, no symbol tables: a small table of lazily-compiled regex
//! patterns over raw lines. Everything it emits is best-effort and tagged
//! low confidence (medium when the target resolves inside the tree), and
//! it never fails — a file it cannot make sense of still yields its file
//! node.

use regex::Regex;
use std::path::Path;
use std::sync::LazyLock;

use super::{IndexContext, Indexer, IndexResult};
use crate::graph::{Confidence, EdgeKind, EdgeMeta, GraphEdge, GraphNode, NodeId};

/// `(pattern, reason)` pairs; the first capture group is the specifier.
static IMPORT_PATTERNS: LazyLock<Vec<(Regex, &'static str)>> = LazyLock::new(|| {
    [
        (r#"^\s*#include\s+"([^"]+)""#, "include directive"),
        (r#"^\s*import\s+['"]([^'"]+)['"]"#, "import statement"),
        (r#"^\s*from\s+['"]([^'"]+)['"]"#, "import statement"),
        (r#"require\s*\(?\s*['"]([^'"]+)['"]"#, "require reference"),
        (r#"^\s*use\s+([A-Za-z0-9_:\\]+)\s*;"#, "use statement"),
        (r#"^\s*(?:source|\.)\s+([^\s;]+)"#, "shell source"),
        (r#"^\s*load\s+['"]([^'"]+)['"]"#, "load statement"),
    ]
    .into_iter()
    .map(|(pattern, reason)| (Regex::new(pattern).expect("static pattern"), reason))
    .collect()
});

/// Fallback indexer for files no language indexer claims
pub struct GenericIndexer;

impl GenericIndexer {
    pub fn new() -> Self {
        Self
    }
}

impl Indexer for GenericIndexer {
    fn language(&self) -> &str {
        "generic"
    }

    fn extensions(&self) -> &[&str] {
        &[
            ".c", ".h", ".cpp", ".cc", ".hpp", ".java", ".cs", ".kt", ".rb", ".php", ".swift",
            ".scala", ".lua", ".pl", ".sh", ".bash", ".vue", ".svelte",
        ]
    }

    fn index_file(&self, path: &str, content: &str, ctx: &IndexContext) -> IndexResult {
        let file_id = NodeId::file(path);
        let mut edges: Vec<GraphEdge> = Vec::new();

        for (line_no, line) in content.lines().enumerate() {
            for (pattern, reason) in IMPORT_PATTERNS.iter() {
                let Some(captures) = pattern.captures(line) else {
                    continue;
                };
                let Some(specifier) = captures.get(1).map(|m| m.as_str()) else {
                    continue;
                };

                // Includes and requires are usually sibling-relative even
                // without a leading "./" — try that reading before giving up
                let mut target = ctx.resolver.resolve(specifier, Path::new(path));
                if !target.is_internal() && !specifier.starts_with('.') {
                    let sibling = ctx
                        .resolver
                        .resolve(&format!("./{}", specifier), Path::new(path));
                    if sibling.is_internal() {
                        target = sibling;
                    }
                }
                let confidence = if target.is_internal() {
                    Confidence::Medium
                } else {
                    Confidence::Low
                };

                edges.push(
                    GraphEdge::new(file_id.clone(), target.node_id(), EdgeKind::Imports, confidence)
                        .with_reason(*reason)
                        .with_meta(EdgeMeta {
                            line: Some(line_no + 1),
                            ..EdgeMeta::default()
                        }),
                );
                break; // one match per line is enough
            }
        }

        IndexResult {
            nodes: vec![GraphNode::file(path, self.language())],
            edges,
            errors: Vec::new(),
        }
    }
}
