//! Architectural layer rules
//!
//! Evaluates configured `from must-not-import cannot_import` glob rules
//! against every dependency edge, and can suggest rules by clustering the
//! import flow between top-level directories.

use glob::Pattern;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::GraphAnalyzer;
use crate::config::{ArborConfig, LayerRule};
use crate::graph::{GraphIssue, GraphStore, IssueKind, NodeKind, Severity};

/// One edge breaking a layer rule
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LayerViolation {
    /// Rule name, or its `from` pattern when unnamed
    pub rule: String,
    pub from: String,
    pub to: String,
}

/// Check every dependency edge against the rule set.
pub fn check(store: &GraphStore, rules: &[LayerRule]) -> Vec<LayerViolation> {
    let compiled: Vec<(&LayerRule, Pattern, Pattern)> = rules
        .iter()
        .filter_map(|rule| {
            let from = Pattern::new(&rule.from).ok()?;
            let cannot = Pattern::new(&rule.cannot_import).ok()?;
            Some((rule, from, cannot))
        })
        .collect();
    if compiled.len() < rules.len() {
        log::warn!("{} layer rule(s) have invalid glob patterns", rules.len() - compiled.len());
    }

    let mut violations: Vec<LayerViolation> = Vec::new();
    let mut reported: BTreeMap<(String, String, String), ()> = BTreeMap::new();

    for (_, edge) in store.all_edges() {
        if !edge.kind().is_dependency() {
            continue;
        }
        let (Some(from_node), Some(to_node)) = (store.node(edge.from()), store.node(edge.to()))
        else {
            continue;
        };
        if from_node.kind() != NodeKind::File || to_node.kind() != NodeKind::File {
            continue;
        }
        let (Some(from_path), Some(to_path)) = (from_node.path(), to_node.path()) else {
            continue;
        };

        for (rule, from_glob, cannot_glob) in &compiled {
            if !from_glob.matches(from_path) || !cannot_glob.matches(to_path) {
                continue;
            }
            let rule_name = rule.name.clone().unwrap_or_else(|| rule.from.clone());
            let key = (rule_name.clone(), from_path.to_string(), to_path.to_string());
            if reported.insert(key, ()).is_none() {
                violations.push(LayerViolation {
                    rule: rule_name,
                    from: from_path.to_string(),
                    to: to_path.to_string(),
                });
            }
        }
    }

    violations.sort_by(|a, b| {
        a.rule
            .cmp(&b.rule)
            .then_with(|| a.from.cmp(&b.from))
            .then_with(|| a.to.cmp(&b.to))
    });
    violations
}

/// Suggest rules from the observed flow between top-level directories:
/// when imports run strictly one way between two directories, propose
/// protecting that direction.
pub fn suggest(store: &GraphStore) -> Vec<LayerRule> {
    let mut flow: BTreeMap<(String, String), usize> = BTreeMap::new();

    for (_, edge) in store.all_edges() {
        if !edge.kind().is_dependency() {
            continue;
        }
        let (Some(from_node), Some(to_node)) = (store.node(edge.from()), store.node(edge.to()))
        else {
            continue;
        };
        let (Some(from_path), Some(to_path)) = (from_node.path(), to_node.path()) else {
            continue;
        };
        let (Some(from_dir), Some(to_dir)) = (top_dir(from_path), top_dir(to_path)) else {
            continue;
        };
        if from_dir != to_dir {
            *flow.entry((from_dir, to_dir)).or_default() += 1;
        }
    }

    let mut rules: Vec<LayerRule> = Vec::new();
    for ((from_dir, to_dir), count) in &flow {
        let reverse = flow.get(&(to_dir.clone(), from_dir.clone())).copied().unwrap_or(0);
        // A dominant one-way flow: lower layer should not import back up
        if *count >= 3 && reverse == 0 {
            rules.push(LayerRule {
                name: Some(format!("{}-must-not-import-{}", to_dir, from_dir)),
                from: format!("{}/**", to_dir),
                cannot_import: format!("{}/**", from_dir),
            });
        }
    }
    rules
}

fn top_dir(path: &str) -> Option<String> {
    let mut parts = path.splitn(2, '/');
    let first = parts.next()?;
    // Files at the root have no layer
    parts.next()?;
    Some(first.to_string())
}

/// Layer analyzer registered with the dispatcher
pub struct LayerAnalyzer;

impl LayerAnalyzer {
    pub fn new() -> Self {
        Self
    }
}

impl Default for LayerAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

impl GraphAnalyzer for LayerAnalyzer {
    fn name(&self) -> &str {
        "layers"
    }

    fn analyze(&self, store: &GraphStore, config: &ArborConfig) -> Vec<GraphIssue> {
        check(store, &config.layers.rules)
            .into_iter()
            .map(|violation| {
                GraphIssue::new(
                    IssueKind::LayerViolation,
                    Severity::Error,
                    violation.from.clone(),
                    format!(
                        "Layer rule '{}' violated: {} imports {}",
                        violation.rule, violation.from, violation.to
                    ),
                )
                .with_evidence(vec![format!("{} → {}", violation.from, violation.to)])
            })
            .collect()
    }
}
