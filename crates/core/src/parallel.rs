//! Parallel indexing across bounded worker concurrency
//!
//! Files are partitioned into bounded-size batches and indexed on a scoped
//! rayon pool. Workers share no mutable state: each file produces an
//! isolated [`IndexResult`], and rayon's order-preserving collect plus a
//! sequential merge make the combined output deterministic in content no
//! matter how batches interleave. A failing file is recorded and skipped,
//! never aborting its siblings.

use anyhow::Result;
use rayon::prelude::*;
use std::path::{Path, PathBuf};
use std::time::Instant;

use crate::config::{EntrypointHint, IndexConfig};
use crate::graph::{canonical_path, GraphEdge, GraphNode};
use crate::indexer::{IndexContext, IndexError, IndexResult, IndexerRegistry};
use crate::resolver::PathResolver;

/// Counters for one indexing run
#[derive(Debug, Clone, Default)]
pub struct IndexStats {
    pub files_indexed: usize,
    pub error_count: usize,
    pub duration_ms: u64,
}

/// Merged output of a full indexing run
#[derive(Debug, Default)]
pub struct IndexOutcome {
    pub nodes: Vec<GraphNode>,
    pub edges: Vec<GraphEdge>,
    pub errors: Vec<IndexError>,
    pub stats: IndexStats,
}

/// Orchestrates indexing of many files over a bounded worker pool.
pub struct ParallelIndexer {
    batch_size: usize,
    concurrency: usize,
}

impl ParallelIndexer {
    pub fn new(batch_size: usize, concurrency: usize) -> Self {
        Self {
            batch_size: batch_size.max(1),
            concurrency,
        }
    }

    pub fn from_config(config: &IndexConfig) -> Self {
        Self::new(config.batch_size, config.concurrency)
    }

    /// Index every file and merge the per-file results sequentially.
    pub fn index_all(
        &self,
        root: &Path,
        files: &[PathBuf],
        registry: &IndexerRegistry,
        resolver: &PathResolver,
        hints: &[EntrypointHint],
    ) -> Result<IndexOutcome> {
        let start = Instant::now();
        let ctx = IndexContext::new(resolver, hints);

        // num_threads(0) keeps the rayon default
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.concurrency)
            .build()?;

        let per_batch: Vec<Vec<IndexResult>> = pool.install(|| {
            files
                .par_chunks(self.batch_size)
                .map(|batch| {
                    batch
                        .iter()
                        .map(|file| index_one(root, file, registry, &ctx))
                        .collect()
                })
                .collect()
        });

        // Sequential merge in input order
        let mut merged = IndexResult::default();
        for batch in per_batch {
            for result in batch {
                merged.merge(result);
            }
        }

        let stats = IndexStats {
            files_indexed: files.len(),
            error_count: merged.errors.len(),
            duration_ms: start.elapsed().as_millis() as u64,
        };
        log::debug!(
            "indexed {} file(s), {} node(s), {} edge(s), {} error(s) in {}ms",
            stats.files_indexed,
            merged.nodes.len(),
            merged.edges.len(),
            stats.error_count,
            stats.duration_ms
        );

        Ok(IndexOutcome {
            nodes: merged.nodes,
            edges: merged.edges,
            errors: merged.errors,
            stats,
        })
    }
}

/// Index a single file on disk. All failure modes degrade to an
/// [`IndexError`] record inside the result.
pub fn index_one(
    root: &Path,
    file: &Path,
    registry: &IndexerRegistry,
    ctx: &IndexContext,
) -> IndexResult {
    let rel = canonical_path(file.strip_prefix(root).unwrap_or(file));
    let indexer = registry.for_path(file);

    let content = match std::fs::read_to_string(file) {
        Ok(content) => content,
        Err(e) => {
            return IndexResult::file_only(&rel, indexer.language(), format!("unreadable: {}", e));
        }
    };

    let mut result = indexer.index_file(&rel, &content, ctx);
    ctx.apply_hints(&rel, &mut result);
    result
}
