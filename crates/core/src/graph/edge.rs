//! Edge types for the dependency graph

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::node::NodeId;

/// Index of an edge in the store's edge slab
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EdgeId(pub usize);

/// The kind of relationship an edge represents
#[derive(
    Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord,
)]
#[serde(rename_all = "lowercase")]
pub enum EdgeKind {
    /// A file imports/includes/requires another module
    Imports,
    /// A file or entrypoint calls into another node
    Calls,
    /// An entrypoint registers a handler in a file
    Registers,
    /// A file re-exports symbols from another module
    Reexports,
}

impl EdgeKind {
    pub fn as_str(&self) -> &str {
        match self {
            EdgeKind::Imports => "imports",
            EdgeKind::Calls => "calls",
            EdgeKind::Registers => "registers",
            EdgeKind::Reexports => "reexports",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "imports" => Some(EdgeKind::Imports),
            "calls" => Some(EdgeKind::Calls),
            "registers" => Some(EdgeKind::Registers),
            "reexports" => Some(EdgeKind::Reexports),
            _ => None,
        }
    }

    /// Edge kinds that constitute a module dependency (cycle detection,
    /// impact traversal follow these plus `Calls`/`Registers` where noted).
    pub fn is_dependency(&self) -> bool {
        matches!(self, EdgeKind::Imports | EdgeKind::Reexports)
    }
}

/// How certain the indexer is that the edge target is correct.
///
/// High: syntactically static reference with a literal specifier (or a
/// user annotation). Medium: dynamic reference with a literal string, or
/// a resolution that needed a package/directory heuristic. Low: computed
/// or interpolated specifiers and text-heuristic matches.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
pub enum Confidence {
    Low,
    Medium,
    High,
}

impl Confidence {
    pub fn as_str(&self) -> &str {
        match self {
            Confidence::High => "high",
            Confidence::Medium => "medium",
            Confidence::Low => "low",
        }
    }
}

/// Typed edge metadata: known extension fields plus one `extra` bucket.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EdgeMeta {
    /// Line where the relationship is expressed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line: Option<usize>,

    /// Imported/re-exported symbol names, when named
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub symbols: Vec<String>,

    /// Wildcard import/re-export (`*`)
    #[serde(default)]
    pub is_wildcard: bool,

    /// Target was referenced dynamically (string-built, computed)
    #[serde(default)]
    pub dynamic: bool,

    /// Adapter-specific extension data
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub extra: BTreeMap<String, String>,
}

/// A directed edge in the dependency graph
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GraphEdge {
    from: NodeId,
    to: NodeId,
    kind: EdgeKind,
    confidence: Confidence,

    /// Human-readable derivation note (e.g. "static import", "manual annotation")
    reason: Option<String>,

    meta: EdgeMeta,
}

impl GraphEdge {
    pub fn new(from: NodeId, to: NodeId, kind: EdgeKind, confidence: Confidence) -> Self {
        Self {
            from,
            to,
            kind,
            confidence,
            reason: None,
            meta: EdgeMeta::default(),
        }
    }

    pub fn with_reason(mut self, reason: impl Into<String>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    pub fn with_meta(mut self, meta: EdgeMeta) -> Self {
        self.meta = meta;
        self
    }

    pub fn from(&self) -> &NodeId {
        &self.from
    }

    pub fn to(&self) -> &NodeId {
        &self.to
    }

    pub fn kind(&self) -> EdgeKind {
        self.kind
    }

    pub fn confidence(&self) -> Confidence {
        self.confidence
    }

    pub fn reason(&self) -> Option<&str> {
        self.reason.as_deref()
    }

    pub fn meta(&self) -> &EdgeMeta {
        &self.meta
    }

    /// The `(from, to, kind)` triple queries deduplicate by when counting.
    pub fn dedup_key(&self) -> (&NodeId, &NodeId, EdgeKind) {
        (&self.from, &self.to, self.kind)
    }
}
