//! Per-language indexers that turn source files into graph fragments
//!
//! Each indexer is a pure function from `(path, content)` to nodes, edges,
//! and recoverable errors. Edge target specifiers are resolved to canonical
//! identities via [`PathResolver`] before being returned, so the store
//! never sees raw specifiers. New languages register an implementation
//! against the [`IndexerRegistry`]; files no indexer claims fall back to
//! the text-heuristic [`generic::GenericIndexer`].

pub mod generic;
pub mod go;
pub mod python;
pub mod rust;
pub mod typescript;

use glob::Pattern;
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::config::EntrypointHint;
use crate::graph::{
    Confidence, EdgeKind, EntrypointKind, GraphEdge, GraphNode, NodeKind,
};
use crate::resolver::PathResolver;

/// A recoverable per-file indexing failure. Never aborts a batch; the file
/// degrades to a file-node-only result.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexError {
    /// Root-relative path of the failing file
    pub file: String,
    pub message: String,
}

/// Result of indexing one file.
#[derive(Debug, Clone, Default)]
pub struct IndexResult {
    pub nodes: Vec<GraphNode>,
    pub edges: Vec<GraphEdge>,
    pub errors: Vec<IndexError>,
}

impl IndexResult {
    /// The degraded result for a file that could not be parsed: the file
    /// node alone, plus the error record.
    pub fn file_only(path: &str, language: &str, message: impl Into<String>) -> Self {
        Self {
            nodes: vec![GraphNode::file(path, language)],
            edges: Vec::new(),
            errors: vec![IndexError {
                file: path.to_string(),
                message: message.into(),
            }],
        }
    }

    pub fn merge(&mut self, other: IndexResult) {
        self.nodes.extend(other.nodes);
        self.edges.extend(other.edges);
        self.errors.extend(other.errors);
    }
}

/// Context threaded explicitly into every index call: the resolver and the
/// configured entrypoint hints. Constructed once per build, no globals.
pub struct IndexContext<'a> {
    pub resolver: &'a PathResolver,
    pub hints: &'a [EntrypointHint],
}

impl<'a> IndexContext<'a> {
    pub fn new(resolver: &'a PathResolver, hints: &'a [EntrypointHint]) -> Self {
        Self { resolver, hints }
    }

    /// Apply configured entrypoint hints to a freshly indexed file. Adds a
    /// hinted entrypoint only when the indexer found none itself.
    pub fn apply_hints(&self, path: &str, result: &mut IndexResult) {
        if self.hints.is_empty() {
            return;
        }
        let has_entrypoint = result
            .nodes
            .iter()
            .any(|n| n.kind() == NodeKind::Entrypoint);
        if has_entrypoint {
            return;
        }

        for hint in self.hints {
            let matched = Pattern::new(&hint.pattern)
                .map(|p| p.matches(path))
                .unwrap_or(false);
            if !matched {
                continue;
            }
            let kind = EntrypointKind::parse(&hint.kind).unwrap_or(EntrypointKind::Main);
            let entry = GraphNode::entrypoint(path, kind.as_str(), kind);
            let edge = GraphEdge::new(
                entry.id().clone(),
                crate::graph::NodeId::file(path),
                EdgeKind::Registers,
                Confidence::Medium,
            )
            .with_reason("configured entrypoint hint");
            result.nodes.push(entry);
            result.edges.push(edge);
            break;
        }
    }
}

/// Capability implemented by every language indexer.
pub trait Indexer: Send + Sync {
    /// Language name recorded on file nodes
    fn language(&self) -> &str;

    /// File extensions this indexer claims (with leading dot)
    fn extensions(&self) -> &[&str];

    /// Whether this indexer handles the given path
    fn supports(&self, path: &Path) -> bool {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) => {
                let with_dot = format!(".{}", ext);
                self.extensions().contains(&with_dot.as_str())
            }
            None => false,
        }
    }

    /// Index one file. `path` is root-relative. Must not panic on malformed
    /// input: parse failures degrade to [`IndexResult::file_only`].
    fn index_file(&self, path: &str, content: &str, ctx: &IndexContext) -> IndexResult;
}

/// Registry-based dispatch over the language indexers, with the generic
/// text-heuristic indexer as the fallback for everything else.
pub struct IndexerRegistry {
    indexers: Vec<Box<dyn Indexer>>,
    fallback: Box<dyn Indexer>,
}

impl IndexerRegistry {
    /// Create a registry with all built-in indexers.
    pub fn new() -> Self {
        Self {
            indexers: vec![
                Box::new(typescript::TypeScriptIndexer::new()),
                Box::new(python::PythonIndexer::new()),
                Box::new(rust::RustIndexer::new()),
                Box::new(go::GoIndexer::new()),
            ],
            fallback: Box::new(generic::GenericIndexer::new()),
        }
    }

    /// Register an additional language indexer. Registered indexers take
    /// precedence over built-ins for the extensions they claim.
    pub fn register(&mut self, indexer: Box<dyn Indexer>) {
        self.indexers.insert(0, indexer);
    }

    /// Find the indexer for a path; unrecognized languages get the fallback.
    pub fn for_path(&self, path: &Path) -> &dyn Indexer {
        self.indexers
            .iter()
            .find(|ix| ix.supports(path))
            .map(|boxed| &**boxed)
            .unwrap_or(&*self.fallback)
    }

    /// All extensions any registered indexer (or the fallback) claims.
    pub fn supported_extensions(&self) -> Vec<&str> {
        let mut extensions: Vec<&str> = self
            .indexers
            .iter()
            .flat_map(|ix| ix.extensions().iter().copied())
            .collect();
        extensions.extend_from_slice(self.fallback.extensions());
        extensions.sort();
        extensions.dedup();
        extensions
    }
}

impl Default for IndexerRegistry {
    fn default() -> Self {
        Self::new()
    }
}
