//! Structural issue types produced by the analyzers

use serde::{Deserialize, Serialize};

/// Severity level of an issue
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Warning,
    Error,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Severity::Error => write!(f, "error"),
            Severity::Warning => write!(f, "warning"),
            Severity::Info => write!(f, "info"),
        }
    }
}

impl Severity {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "error" => Some(Severity::Error),
            "warning" => Some(Severity::Warning),
            "info" => Some(Severity::Info),
            _ => None,
        }
    }
}

/// Enumerated structural problems the analyzers report.
///
/// These are analysis results, not failures: a cycle or a broken chain is
/// data served to the caller, never an error return.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueKind {
    /// Import cycle between files
    CircularDependency,
    /// Re-export chain that loops back on itself
    CircularReexport,
    /// Re-export whose target (or symbol) is missing
    BrokenExportChain,
    /// Dynamic reference whose target could not be resolved
    UnresolvedDynamicEdge,
    /// Entrypoint with no resolvable handler edge
    UnreachableEntrypoint,
    /// Exported symbols never imported anywhere
    OrphanedExport,
    /// Edge violating a configured layer rule
    LayerViolation,
}

impl IssueKind {
    pub fn as_str(&self) -> &str {
        match self {
            IssueKind::CircularDependency => "circular_dependency",
            IssueKind::CircularReexport => "circular_reexport",
            IssueKind::BrokenExportChain => "broken_export_chain",
            IssueKind::UnresolvedDynamicEdge => "unresolved_dynamic_edge",
            IssueKind::UnreachableEntrypoint => "unreachable_entrypoint",
            IssueKind::OrphanedExport => "orphaned_export",
            IssueKind::LayerViolation => "layer_violation",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "circular_dependency" => Some(IssueKind::CircularDependency),
            "circular_reexport" => Some(IssueKind::CircularReexport),
            "broken_export_chain" => Some(IssueKind::BrokenExportChain),
            "unresolved_dynamic_edge" => Some(IssueKind::UnresolvedDynamicEdge),
            "unreachable_entrypoint" => Some(IssueKind::UnreachableEntrypoint),
            "orphaned_export" => Some(IssueKind::OrphanedExport),
            "layer_violation" => Some(IssueKind::LayerViolation),
            _ => None,
        }
    }
}

/// A structural issue detected over the graph
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphIssue {
    pub kind: IssueKind,
    pub severity: Severity,

    /// Root-relative path of the owning file
    pub file: String,

    /// Human-readable summary
    pub message: String,

    /// Supporting detail lines (cycle members, missing symbols, rule names)
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub evidence: Vec<String>,
}

impl GraphIssue {
    pub fn new(
        kind: IssueKind,
        severity: Severity,
        file: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            kind,
            severity,
            file: file.into(),
            message: message.into(),
            evidence: Vec::new(),
        }
    }

    pub fn with_evidence(mut self, evidence: Vec<String>) -> Self {
        self.evidence = evidence;
        self
    }
}
