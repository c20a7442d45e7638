//! Engine: build, update, and query the dependency graph
//!
//! The one explicit context object tying the components together: config,
//! indexer registry, annotations, the locked store, and the query cache.
//! All mutation funnels through a single writer path — a full rebuild
//! swaps the store atomically, an incremental apply patches one file —
//! and the cache is invalidated before the write lock is released, so no
//! reader is ever served a result from a superseded snapshot.

use anyhow::{Context, Result};
use serde::Serialize;
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, RwLock};
use std::time::Instant;
use thiserror::Error;

use crate::analyzer::cycles::{find_cycles, CycleOptions};
use crate::analyzer::{layers, AnalyzerDispatcher};
use crate::annotations::AnnotationManager;
use crate::config::ArborConfig;
use crate::discovery::discover_files;
use crate::graph::{canonical_path, GraphNode, GraphStore, NodeId, NodeKind};
use crate::indexer::{IndexContext, IndexerRegistry};
use crate::parallel::{index_one, IndexStats, ParallelIndexer};
use crate::query::cache::{CachedResult, QueryCache};
use crate::query::{estimate_tokens, GraphQuery, IssueFilter};
use crate::resolver::PathResolver;
use crate::watcher::FileEvent;

/// Caller-side protocol violations. These are loud by design: they mean
/// the caller broke the store lifecycle, not that the input was bad.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("graph engine has been disposed")]
    Disposed,

    #[error("ambiguous target '{target}': matches {candidates:?}")]
    AmbiguousTarget {
        target: String,
        candidates: Vec<String>,
    },
}

/// A query result ready for a token-budgeted caller.
#[derive(Debug, Clone, Serialize)]
pub struct QueryEnvelope {
    pub token_estimate: usize,
    pub result: Value,
}

/// The engine owning one indexed root for the process lifetime.
pub struct GraphEngine {
    root: PathBuf,
    config: ArborConfig,
    registry: IndexerRegistry,
    dispatcher: AnalyzerDispatcher,
    annotations: Mutex<AnnotationManager>,
    store: RwLock<GraphStore>,
    cache: QueryCache,
    disposed: AtomicBool,
}

impl GraphEngine {
    pub fn new(root: impl Into<PathBuf>, config: ArborConfig) -> Self {
        let root = root.into();
        // Canonicalize so event paths and discovered paths share a prefix
        let root = std::fs::canonicalize(&root).unwrap_or(root);
        let annotations = AnnotationManager::load(&root);
        Self {
            root,
            config,
            registry: IndexerRegistry::new(),
            dispatcher: AnalyzerDispatcher::new(),
            annotations: Mutex::new(annotations),
            store: RwLock::new(GraphStore::new()),
            cache: QueryCache::new(),
            disposed: AtomicBool::new(false),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn config(&self) -> &ArborConfig {
        &self.config
    }

    /// Mark the engine unusable. Subsequent operations fail loudly.
    pub fn dispose(&self) {
        self.disposed.store(true, Ordering::SeqCst);
        self.cache.invalidate_all();
    }

    fn check_live(&self) -> Result<()> {
        if self.disposed.load(Ordering::SeqCst) {
            return Err(EngineError::Disposed.into());
        }
        Ok(())
    }

    /// Run a closure against the current store snapshot.
    pub fn with_store<T>(&self, f: impl FnOnce(&GraphStore) -> T) -> T {
        let store = self.store.read().unwrap_or_else(|e| e.into_inner());
        f(&store)
    }

    /// Replace the store wholesale (snapshot restore). Invalidates the
    /// cache before the write lock is released.
    pub fn swap_store(&self, new_store: GraphStore) -> Result<()> {
        self.check_live()?;
        let mut store = self.store.write().unwrap_or_else(|e| e.into_inner());
        *store = new_store;
        self.cache.invalidate_all();
        Ok(())
    }

    // ── Build ──────────────────────────────────────────────────

    /// Full rebuild: discover, index in parallel, merge annotations, run
    /// analyzers, then atomically swap the store in.
    pub fn build(&self) -> Result<IndexStats> {
        self.check_live()?;
        let start = Instant::now();

        let extensions = self.registry.supported_extensions();
        let files = discover_files(&self.root, &extensions, &self.config.index)
            .context("file discovery failed")?;

        let rel_paths: Vec<String> = files
            .iter()
            .map(|f| canonical_path(f.strip_prefix(&self.root).unwrap_or(f)))
            .collect();
        let resolver = PathResolver::new(&self.config.resolve.aliases, rel_paths);

        let indexer = ParallelIndexer::from_config(&self.config.index);
        let outcome = indexer.index_all(
            &self.root,
            &files,
            &self.registry,
            &resolver,
            &self.config.entrypoints.hints,
        )?;

        let mut new_store = GraphStore::new();
        for node in outcome.nodes {
            new_store.add_node(node);
        }
        for edge in outcome.edges {
            new_store.add_edge(edge);
        }
        materialize_placeholders(&mut new_store);

        {
            let annotations = self.annotations.lock().unwrap_or_else(|e| e.into_inner());
            annotations.merge_into(&mut new_store);
            let issues = self
                .dispatcher
                .run_all(&new_store, &self.config, &annotations);
            new_store.set_issues(issues);
        }

        let duration_ms = start.elapsed().as_millis() as u64;
        new_store.update_meta(duration_ms, outcome.stats.files_indexed);

        // Swap atomically; readers see the old store or the new one,
        // never a half-built state.
        {
            let mut store = self.store.write().unwrap_or_else(|e| e.into_inner());
            *store = new_store;
            self.cache.invalidate_all();
        }

        log::info!(
            "built graph for {}: {} file(s), {} error(s) in {}ms",
            self.root.display(),
            outcome.stats.files_indexed,
            outcome.stats.error_count,
            duration_ms
        );
        Ok(IndexStats {
            duration_ms,
            ..outcome.stats
        })
    }

    // ── Incremental apply ──────────────────────────────────────

    /// Apply one file event. Change/create replaces the file's owned
    /// nodes and outgoing edges; delete removes the node and everything
    /// incident. Analyzers re-run and the cache is invalidated before the
    /// write lock is released.
    pub fn apply_event(&self, event: &FileEvent) -> Result<()> {
        self.check_live()?;

        let abs = event.path();
        let rel = canonical_path(abs.strip_prefix(&self.root).unwrap_or(abs));

        let mut store = self.store.write().unwrap_or_else(|e| e.into_inner());

        match event {
            FileEvent::Removed(_) => {
                store.remove_file(&rel);
            }
            FileEvent::Created(path) | FileEvent::Modified(path) => {
                // Resolver sees the current file set plus this file
                let mut file_set: Vec<String> = store
                    .nodes_by_kind(NodeKind::File)
                    .into_iter()
                    .filter_map(|n| n.path().map(String::from))
                    .collect();
                file_set.push(rel.clone());
                let resolver = PathResolver::new(&self.config.resolve.aliases, file_set);
                let ctx = IndexContext::new(&resolver, &self.config.entrypoints.hints);

                let result = index_one(&self.root, path, &self.registry, &ctx);
                store.replace_file(&rel, result.nodes, result.edges);
                materialize_placeholders(&mut store);
            }
        }

        let annotations = self.annotations.lock().unwrap_or_else(|e| e.into_inner());
        let issues = self.dispatcher.run_all(&store, &self.config, &annotations);
        store.set_issues(issues);
        drop(annotations);

        self.cache.invalidate_all();
        Ok(())
    }

    // ── Queries ────────────────────────────────────────────────

    pub fn digest(&self, scope: Option<&str>) -> Result<QueryEnvelope> {
        let args = [("scope", scope.unwrap_or("").to_string())];
        self.cached("digest", &args, |query| query.digest(scope))
    }

    pub fn impact(&self, target: &str, depth: Option<usize>) -> Result<QueryEnvelope> {
        let depth = depth
            .unwrap_or(crate::query::DEFAULT_IMPACT_DEPTH)
            .clamp(1, crate::query::MAX_IMPACT_DEPTH);
        let resolved = self.resolve_target(target)?;
        let args = [
            ("target", target.to_string()),
            ("depth", depth.to_string()),
        ];
        self.cached("impact", &args, |query| match &resolved {
            Some(id) => query.impact(id, depth),
            None => query.impact(&NodeId::file(target), depth),
        })
    }

    pub fn path_between(
        &self,
        from: &str,
        to: &str,
        max_depth: Option<usize>,
        max_paths: Option<usize>,
    ) -> Result<QueryEnvelope> {
        let max_depth = max_depth.unwrap_or(crate::query::DEFAULT_PATH_DEPTH);
        let max_paths = max_paths.unwrap_or(crate::query::DEFAULT_MAX_PATHS);
        let from_id = self
            .resolve_target(from)?
            .unwrap_or_else(|| NodeId::file(from));
        let to_id = self.resolve_target(to)?.unwrap_or_else(|| NodeId::file(to));
        let args = [
            ("from", from.to_string()),
            ("to", to.to_string()),
            ("max_depth", max_depth.to_string()),
            ("max_paths", max_paths.to_string()),
        ];
        self.cached("path", &args, |query| {
            query.path(&from_id, &to_id, max_depth, max_paths)
        })
    }

    pub fn module(&self, target: &str, include_transitive: bool) -> Result<QueryEnvelope> {
        let resolved = self
            .resolve_target(target)?
            .unwrap_or_else(|| NodeId::file(target));
        let args = [
            ("target", target.to_string()),
            ("transitive", include_transitive.to_string()),
        ];
        self.cached("module", &args, |query| {
            query.module(&resolved, include_transitive)
        })
    }

    pub fn issues(&self, filter: &IssueFilter) -> Result<QueryEnvelope> {
        let args = [
            (
                "kind",
                filter.kind.map(|k| k.as_str().to_string()).unwrap_or_default(),
            ),
            (
                "severity",
                filter.severity.map(|s| s.to_string()).unwrap_or_default(),
            ),
            ("scope", filter.scope.clone().unwrap_or_default()),
            (
                "limit",
                filter.limit.map(|l| l.to_string()).unwrap_or_default(),
            ),
        ];
        self.cached("issues", &args, |query| query.issues(filter))
    }

    pub fn cycles(&self, opts: &CycleOptions) -> Result<QueryEnvelope> {
        self.check_live()?;
        let args = [
            ("scope", opts.scope.clone().unwrap_or_default()),
            ("min_length", opts.min_length.to_string()),
            ("max_cycles", opts.max_cycles.to_string()),
        ];
        let key = QueryCache::key("cycles", &args);
        if let Some(hit) = self.cache.get(&key) {
            return Ok(envelope_from(hit));
        }

        let store = self.store.read().unwrap_or_else(|e| e.into_inner());
        let cycles = find_cycles(&store, opts, &self.config.cycles);
        let total = cycles.len();
        let truncated = total >= opts.max_cycles;
        let value = serde_json::json!({
            "cycles": cycles,
            "total": total,
            "truncated": truncated,
        });
        drop(store);
        Ok(self.finish(key, value))
    }

    pub fn layers_check(&self) -> Result<QueryEnvelope> {
        self.check_live()?;
        let key = QueryCache::key("layers_check", &[]);
        if let Some(hit) = self.cache.get(&key) {
            return Ok(envelope_from(hit));
        }
        let store = self.store.read().unwrap_or_else(|e| e.into_inner());
        let violations = layers::check(&store, &self.config.layers.rules);
        let total = violations.len();
        let value = serde_json::json!({
            "violations": violations,
            "total": total,
            "truncated": false,
        });
        drop(store);
        Ok(self.finish(key, value))
    }

    pub fn layers_list(&self) -> Result<QueryEnvelope> {
        self.check_live()?;
        let value = serde_json::json!({
            "rules": self.config.layers.rules,
            "truncated": false,
        });
        let token_estimate = estimate_tokens(&value.to_string());
        Ok(QueryEnvelope {
            token_estimate,
            result: value,
        })
    }

    pub fn layers_suggest(&self) -> Result<QueryEnvelope> {
        self.check_live()?;
        let key = QueryCache::key("layers_suggest", &[]);
        if let Some(hit) = self.cache.get(&key) {
            return Ok(envelope_from(hit));
        }
        let store = self.store.read().unwrap_or_else(|e| e.into_inner());
        let rules = layers::suggest(&store);
        let value = serde_json::json!({
            "suggestions": rules,
            "truncated": false,
        });
        drop(store);
        Ok(self.finish(key, value))
    }

    // ── Annotations ────────────────────────────────────────────

    /// Run a closure against the annotation set.
    pub fn with_annotations<T>(&self, f: impl FnOnce(&AnnotationManager) -> T) -> T {
        let annotations = self.annotations.lock().unwrap_or_else(|e| e.into_inner());
        f(&annotations)
    }

    pub fn annotate_add_edge(&self, from: &str, to: &str, kind: &str) -> Result<()> {
        self.check_live()?;
        let mut annotations = self.annotations.lock().unwrap_or_else(|e| e.into_inner());
        annotations.add_edge(from, to, kind)?;
        drop(annotations);
        self.reapply_annotations()
    }

    pub fn annotate_add_entrypoint(&self, path: &str, name: &str) -> Result<()> {
        self.check_live()?;
        let mut annotations = self.annotations.lock().unwrap_or_else(|e| e.into_inner());
        annotations.add_entrypoint(path, name)?;
        drop(annotations);
        self.reapply_annotations()
    }

    pub fn annotate_add_ignore(&self, kind: Option<&str>, path: &str) -> Result<()> {
        self.check_live()?;
        let mut annotations = self.annotations.lock().unwrap_or_else(|e| e.into_inner());
        annotations.add_ignore(kind, path)?;
        drop(annotations);
        self.rerun_analyzers()
    }

    pub fn annotate_remove_edge(&self, from: &str, to: &str) -> Result<bool> {
        self.check_live()?;
        let mut annotations = self.annotations.lock().unwrap_or_else(|e| e.into_inner());
        let removed = annotations.remove_edge(from, to)?;
        drop(annotations);
        if removed {
            let mut store = self.store.write().unwrap_or_else(|e| e.into_inner());
            store.remove_edges_with_reason(
                &NodeId::file(from),
                &NodeId::file(to),
                crate::annotations::MANUAL_REASON,
            );
            drop(store);
            self.rerun_analyzers()?;
        }
        Ok(removed)
    }

    pub fn annotate_remove_ignore(&self, path: &str) -> Result<bool> {
        self.check_live()?;
        let mut annotations = self.annotations.lock().unwrap_or_else(|e| e.into_inner());
        let removed = annotations.remove_ignore(path)?;
        drop(annotations);
        if removed {
            self.rerun_analyzers()?;
        }
        Ok(removed)
    }

    /// Merge the (possibly grown) annotation set into the live store and
    /// refresh issues. Merging is idempotent for existing nodes; duplicate
    /// manual edges are deduplicated by queries.
    fn reapply_annotations(&self) -> Result<()> {
        let mut store = self.store.write().unwrap_or_else(|e| e.into_inner());
        let annotations = self.annotations.lock().unwrap_or_else(|e| e.into_inner());

        // Remove previous manual edges, then merge the full set back in,
        // so repeated adds do not accumulate duplicates.
        let manual_pairs: Vec<(NodeId, NodeId)> = store
            .all_edges()
            .filter(|(_, e)| e.reason() == Some(crate::annotations::MANUAL_REASON))
            .map(|(_, e)| (e.from().clone(), e.to().clone()))
            .collect();
        for (from, to) in manual_pairs {
            store.remove_edges_with_reason(&from, &to, crate::annotations::MANUAL_REASON);
        }
        annotations.merge_into(&mut store);

        let issues = self.dispatcher.run_all(&store, &self.config, &annotations);
        store.set_issues(issues);
        drop(annotations);
        self.cache.invalidate_all();
        Ok(())
    }

    fn rerun_analyzers(&self) -> Result<()> {
        let mut store = self.store.write().unwrap_or_else(|e| e.into_inner());
        let annotations = self.annotations.lock().unwrap_or_else(|e| e.into_inner());
        let issues = self.dispatcher.run_all(&store, &self.config, &annotations);
        store.set_issues(issues);
        drop(annotations);
        self.cache.invalidate_all();
        Ok(())
    }

    // ── Internals ──────────────────────────────────────────────

    /// Resolve a query target string to a node identity. Unknown targets
    /// are `None` (queries return well-formed empty results); ambiguity
    /// is an error listing the candidates.
    fn resolve_target(&self, target: &str) -> Result<Option<NodeId>> {
        self.check_live()?;
        let store = self.store.read().unwrap_or_else(|e| e.into_inner());
        store.find_file(target).map_err(|candidates| {
            EngineError::AmbiguousTarget {
                target: target.to_string(),
                candidates,
            }
            .into()
        })
    }

    fn cached<T: Serialize>(
        &self,
        operation: &str,
        args: &[(&str, String)],
        compute: impl FnOnce(&GraphQuery) -> T,
    ) -> Result<QueryEnvelope> {
        self.check_live()?;
        let key = QueryCache::key(operation, args);
        if let Some(hit) = self.cache.get(&key) {
            return Ok(envelope_from(hit));
        }

        let store = self.store.read().unwrap_or_else(|e| e.into_inner());
        let query = GraphQuery::new(&store, self.config.output.max_items);
        let report = compute(&query);
        let value = serde_json::to_value(report)?;
        drop(store);

        Ok(self.finish(key, value))
    }

    fn finish(&self, key: String, value: Value) -> QueryEnvelope {
        let token_estimate = estimate_tokens(&value.to_string());
        self.cache.put(
            key,
            Arc::new(CachedResult {
                value: value.clone(),
                token_estimate,
            }),
        );
        QueryEnvelope {
            token_estimate,
            result: value,
        }
    }
}

fn envelope_from(hit: Arc<CachedResult>) -> QueryEnvelope {
    QueryEnvelope {
        token_estimate: hit.token_estimate,
        result: hit.value.clone(),
    }
}

/// Ensure every external edge target has its placeholder node, so edge
/// endpoints always reference something the store knows about.
fn materialize_placeholders(store: &mut GraphStore) {
    let missing: Vec<String> = store
        .all_edges()
        .filter_map(|(_, edge)| {
            let to = edge.to();
            if store.has_node(to) {
                return None;
            }
            match to.kind() {
                Some(NodeKind::Module) => to
                    .as_str()
                    .strip_prefix("module:")
                    .map(String::from),
                _ => None,
            }
        })
        .collect();

    for specifier in missing {
        store.add_node(GraphNode::external(&specifier));
    }
}
