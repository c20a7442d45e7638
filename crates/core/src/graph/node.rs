//! Node types for the dependency graph

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;

/// Stable node identity: a `kind:path` composite key.
///
/// Identity is derived purely from what the node represents, so re-indexing
/// the same file always produces the same id. That stability is what lets
/// incremental updates diff the old and new edge sets of a single file.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(String);

impl NodeId {
    /// Identity of a source file node, from its root-relative path.
    pub fn file(path: &str) -> Self {
        Self(format!("file:{}", path))
    }

    /// Identity of an external/unresolved module placeholder.
    pub fn external(specifier: &str) -> Self {
        Self(format!("module:{}", specifier))
    }

    /// Identity of an entrypoint detected inside a file.
    pub fn entrypoint(path: &str, name: &str) -> Self {
        Self(format!("entrypoint:{}#{}", path, name))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The node kind encoded in the identity prefix.
    pub fn kind(&self) -> Option<NodeKind> {
        match self.0.split(':').next() {
            Some("file") => Some(NodeKind::File),
            Some("module") => Some(NodeKind::Module),
            Some("entrypoint") => Some(NodeKind::Entrypoint),
            _ => None,
        }
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for NodeId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Normalize a root-relative path to the canonical form used in identities
/// (forward slashes, no leading `./`).
pub fn canonical_path(path: &Path) -> String {
    let raw = path.to_string_lossy().replace('\\', "/");
    raw.trim_start_matches("./").to_string()
}

/// The kind of entity a node represents
#[derive(
    Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord,
)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    /// A source file in the indexed tree
    File,
    /// An external or unresolvable module placeholder
    Module,
    /// A detected program/route/job start point
    Entrypoint,
}

/// How an entrypoint was classified
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum EntrypointKind {
    /// A main-function / `__main__` style program entry
    Main,
    /// An HTTP route registration
    Route,
    /// A scheduled or background job
    Job,
    /// A standalone script (shebang, executable module)
    Script,
    /// Declared by the user via annotations
    Manual,
}

impl EntrypointKind {
    pub fn as_str(&self) -> &str {
        match self {
            EntrypointKind::Main => "main",
            EntrypointKind::Route => "route",
            EntrypointKind::Job => "job",
            EntrypointKind::Script => "script",
            EntrypointKind::Manual => "manual",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "main" => Some(EntrypointKind::Main),
            "route" => Some(EntrypointKind::Route),
            "job" => Some(EntrypointKind::Job),
            "script" => Some(EntrypointKind::Script),
            "manual" => Some(EntrypointKind::Manual),
            _ => None,
        }
    }
}

/// Typed node metadata: the known extension fields per node kind, plus one
/// explicit `extra` bucket for adapter-specific data.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NodeMeta {
    /// Language name reported by the indexer (file nodes)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,

    /// Exported symbol names (file nodes)
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub exports: Vec<String>,

    /// Whether the file only aggregates re-exports (file nodes)
    #[serde(default)]
    pub is_barrel: bool,

    /// Classification of a detected entrypoint (entrypoint nodes)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entrypoint_kind: Option<EntrypointKind>,

    /// Adapter-specific extension data
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub extra: BTreeMap<String, String>,
}

impl NodeMeta {
    /// Merge another metadata set into this one. Non-default fields of
    /// `other` win, so later passes can attach export lists or language
    /// tags without clobbering what an earlier pass recorded.
    pub fn merge(&mut self, other: NodeMeta) {
        if other.language.is_some() {
            self.language = other.language;
        }
        if !other.exports.is_empty() {
            self.exports = other.exports;
        }
        if other.is_barrel {
            self.is_barrel = true;
        }
        if other.entrypoint_kind.is_some() {
            self.entrypoint_kind = other.entrypoint_kind;
        }
        self.extra.extend(other.extra);
    }
}

/// A node in the dependency graph
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GraphNode {
    /// Stable `kind:path` identity
    id: NodeId,

    /// The kind of entity this node represents
    kind: NodeKind,

    /// Display name (file name, module specifier, entrypoint label)
    name: String,

    /// Root-relative path; `None` for external module placeholders
    path: Option<String>,

    /// Typed metadata
    meta: NodeMeta,
}

impl GraphNode {
    pub fn new(
        id: NodeId,
        kind: NodeKind,
        name: String,
        path: Option<String>,
        meta: NodeMeta,
    ) -> Self {
        Self {
            id,
            kind,
            name,
            path,
            meta,
        }
    }

    /// Build a file node for a root-relative path.
    pub fn file(path: &str, language: &str) -> Self {
        let name = path.rsplit('/').next().unwrap_or(path).to_string();
        Self {
            id: NodeId::file(path),
            kind: NodeKind::File,
            name,
            path: Some(path.to_string()),
            meta: NodeMeta {
                language: Some(language.to_string()),
                ..NodeMeta::default()
            },
        }
    }

    /// Build an external module placeholder for an unresolvable specifier.
    pub fn external(specifier: &str) -> Self {
        Self {
            id: NodeId::external(specifier),
            kind: NodeKind::Module,
            name: specifier.to_string(),
            path: None,
            meta: NodeMeta::default(),
        }
    }

    /// Build an entrypoint node owned by a file.
    pub fn entrypoint(path: &str, name: &str, kind: EntrypointKind) -> Self {
        Self {
            id: NodeId::entrypoint(path, name),
            kind: NodeKind::Entrypoint,
            name: name.to_string(),
            path: Some(path.to_string()),
            meta: NodeMeta {
                entrypoint_kind: Some(kind),
                ..NodeMeta::default()
            },
        }
    }

    pub fn id(&self) -> &NodeId {
        &self.id
    }

    pub fn kind(&self) -> NodeKind {
        self.kind
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn path(&self) -> Option<&str> {
        self.path.as_deref()
    }

    pub fn meta(&self) -> &NodeMeta {
        &self.meta
    }

    pub fn meta_mut(&mut self) -> &mut NodeMeta {
        &mut self.meta
    }
}
