//! Arbor Core - Source-Tree Dependency Graph Engine
//!
//! This crate provides the structural analysis infrastructure for Arbor:
//! - Per-language indexers (Tree-sitter backed, with a generic fallback)
//! - A canonical dependency graph store with stable node identities
//! - Cycle, layer, barrel, and structural-issue analyzers
//! - Parallel initial indexing and serialized incremental updates
//! - Cached digest / impact / path / module queries for token-budgeted callers

pub mod analyzer;
pub mod annotations;
pub mod config;
pub mod discovery;
pub mod engine;
pub mod graph;
pub mod indexer;
pub mod parallel;
pub mod query;
pub mod resolver;
pub mod snapshot;
pub mod watcher;

pub use analyzer::cycles::{find_cycles, Cycle, CycleOptions};
pub use analyzer::{AnalyzerDispatcher, GraphAnalyzer};
pub use annotations::{AnnotationManager, AnnotationSet};
pub use config::ArborConfig;
pub use discovery::discover_files;
pub use engine::{EngineError, GraphEngine, QueryEnvelope};
pub use graph::{
    Confidence, EdgeKind, EntrypointKind, GraphEdge, GraphIssue, GraphNode, GraphStore,
    IssueKind, NodeId, NodeKind, Severity,
};
pub use indexer::{IndexError, Indexer, IndexerRegistry};
pub use parallel::{IndexStats, ParallelIndexer};
pub use query::{GraphQuery, IssueFilter};
pub use resolver::{PathResolver, Resolution};
pub use snapshot::GraphSnapshot;
pub use watcher::{FileEvent, IncrementalWatcher};

/// Arbor version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
