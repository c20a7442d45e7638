//! Read-only analyzers over the graph store
//!
//! Each analyzer scans a [`GraphStore`] snapshot and produces
//! [`GraphIssue`]s. Analyzers never mutate the store; the engine replaces
//! the issue set wholesale after every full or incremental index. Ignore
//! rules from the [`AnnotationManager`] are applied before issues are
//! stored, so the underlying condition can persist in the graph while
//! staying invisible to queries.

pub mod barrel;
pub mod cycles;
pub mod issues;
pub mod layers;

use crate::annotations::AnnotationManager;
use crate::config::ArborConfig;
use crate::graph::{GraphIssue, GraphStore};

/// Capability implemented by every graph analyzer.
pub trait GraphAnalyzer: Send + Sync {
    /// Human-readable name of this analyzer
    fn name(&self) -> &str;

    /// Scan the store and return issues
    fn analyze(&self, store: &GraphStore, config: &ArborConfig) -> Vec<GraphIssue>;
}

/// Runs all registered analyzers and post-processes their output.
pub struct AnalyzerDispatcher {
    analyzers: Vec<Box<dyn GraphAnalyzer>>,
}

impl AnalyzerDispatcher {
    /// Create a dispatcher with all built-in analyzers
    pub fn new() -> Self {
        Self {
            analyzers: vec![
                Box::new(cycles::CycleDetector::new()),
                Box::new(barrel::BarrelAnalyzer::new()),
                Box::new(layers::LayerAnalyzer::new()),
                Box::new(issues::IssueDetector::new()),
            ],
        }
    }

    /// Register an additional analyzer.
    pub fn register(&mut self, analyzer: Box<dyn GraphAnalyzer>) {
        self.analyzers.push(analyzer);
    }

    /// Run every analyzer, drop ignored issues, and order the rest
    /// deterministically (severity first, then file, then kind).
    pub fn run_all(
        &self,
        store: &GraphStore,
        config: &ArborConfig,
        annotations: &AnnotationManager,
    ) -> Vec<GraphIssue> {
        let mut all: Vec<GraphIssue> = Vec::new();

        for analyzer in &self.analyzers {
            let found = analyzer.analyze(store, config);
            log::debug!("{}: {} issue(s)", analyzer.name(), found.len());
            all.extend(found);
        }

        all.retain(|issue| !annotations.should_ignore(issue.kind, &issue.file));
        all.sort_by(|a, b| {
            b.severity
                .cmp(&a.severity)
                .then_with(|| a.file.cmp(&b.file))
                .then_with(|| a.kind.cmp(&b.kind))
                .then_with(|| a.message.cmp(&b.message))
        });
        all
    }
}

impl Default for AnalyzerDispatcher {
    fn default() -> Self {
        Self::new()
    }
}
