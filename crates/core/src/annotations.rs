//! User-declared graph overrides persisted under `.arbor/`
//!
//! Manual edges, manual entrypoints, and issue-ignore rules live in a
//! versioned JSON file. A missing file is an empty set; a corrupt file is
//! reported and falls back to empty rather than blocking indexing. Manual
//! edges and entrypoints are merged into the store as ordinary nodes and
//! edges with high confidence and a fixed reason, so analyzers treat them
//! exactly like inferred ones.

use anyhow::{Context, Result};
use glob::Pattern;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::graph::{
    Confidence, EdgeKind, EntrypointKind, GraphEdge, GraphNode, GraphStore, IssueKind, NodeId,
};

const ANNOTATION_FILE_VERSION: u32 = 1;

/// Reason string stamped on every annotation-sourced edge.
pub const MANUAL_REASON: &str = "manual annotation";

/// A user-declared edge between two files
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ManualEdge {
    /// Root-relative path of the source file
    pub from: String,
    /// Root-relative path of the target file
    pub to: String,
    /// Edge kind: "imports", "calls", "registers", "reexports"
    pub kind: String,
}

/// A user-declared entrypoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ManualEntrypoint {
    /// Root-relative path of the owning file
    pub path: String,
    /// Entrypoint label
    pub name: String,
}

/// An issue-ignore rule
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IgnoreRule {
    /// Issue kind to ignore; `None` matches every kind
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    /// Wildcard pattern over root-relative paths (e.g. `src/legacy/**`)
    pub path: String,
}

/// The persisted annotation set
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnnotationSet {
    pub version: u32,
    #[serde(default)]
    pub edges: Vec<ManualEdge>,
    #[serde(default)]
    pub entrypoints: Vec<ManualEntrypoint>,
    #[serde(default)]
    pub ignores: Vec<IgnoreRule>,
}

impl Default for AnnotationSet {
    fn default() -> Self {
        Self {
            version: ANNOTATION_FILE_VERSION,
            edges: Vec::new(),
            entrypoints: Vec::new(),
            ignores: Vec::new(),
        }
    }
}

/// Loads, mutates, and persists user annotations.
pub struct AnnotationManager {
    file: PathBuf,
    set: AnnotationSet,
}

impl AnnotationManager {
    /// Load annotations for a project root. Missing file → empty set;
    /// corrupt file → warning and empty set.
    pub fn load(root: &Path) -> Self {
        let file = root.join(".arbor").join("annotations.json");
        let set = match std::fs::read_to_string(&file) {
            Ok(contents) => match serde_json::from_str::<AnnotationSet>(&contents) {
                Ok(set) => set,
                Err(e) => {
                    log::warn!("corrupt annotation file {}: {}", file.display(), e);
                    AnnotationSet::default()
                }
            },
            Err(_) => AnnotationSet::default(),
        };
        Self { file, set }
    }

    /// In-memory manager for tests and embedded callers.
    pub fn in_memory() -> Self {
        Self {
            file: PathBuf::new(),
            set: AnnotationSet::default(),
        }
    }

    pub fn get_all(&self) -> &AnnotationSet {
        &self.set
    }

    // ── Mutation ───────────────────────────────────────────────

    pub fn add_edge(&mut self, from: &str, to: &str, kind: &str) -> Result<()> {
        if EdgeKind::parse(kind).is_none() {
            anyhow::bail!("unknown edge kind: {}", kind);
        }
        let edge = ManualEdge {
            from: from.to_string(),
            to: to.to_string(),
            kind: kind.to_string(),
        };
        if !self.set.edges.contains(&edge) {
            self.set.edges.push(edge);
        }
        self.save()
    }

    pub fn add_entrypoint(&mut self, path: &str, name: &str) -> Result<()> {
        let entry = ManualEntrypoint {
            path: path.to_string(),
            name: name.to_string(),
        };
        if !self.set.entrypoints.contains(&entry) {
            self.set.entrypoints.push(entry);
        }
        self.save()
    }

    pub fn add_ignore(&mut self, kind: Option<&str>, path: &str) -> Result<()> {
        if let Some(kind) = kind {
            if IssueKind::parse(kind).is_none() {
                anyhow::bail!("unknown issue kind: {}", kind);
            }
        }
        let rule = IgnoreRule {
            kind: kind.map(String::from),
            path: path.to_string(),
        };
        if !self.set.ignores.contains(&rule) {
            self.set.ignores.push(rule);
        }
        self.save()
    }

    pub fn remove_edge(&mut self, from: &str, to: &str) -> Result<bool> {
        let before = self.set.edges.len();
        self.set.edges.retain(|e| !(e.from == from && e.to == to));
        let removed = self.set.edges.len() != before;
        self.save()?;
        Ok(removed)
    }

    pub fn remove_entrypoint(&mut self, path: &str, name: &str) -> Result<bool> {
        let before = self.set.entrypoints.len();
        self.set
            .entrypoints
            .retain(|e| !(e.path == path && e.name == name));
        let removed = self.set.entrypoints.len() != before;
        self.save()?;
        Ok(removed)
    }

    pub fn remove_ignore(&mut self, path: &str) -> Result<bool> {
        let before = self.set.ignores.len();
        self.set.ignores.retain(|r| r.path != path);
        let removed = self.set.ignores.len() != before;
        self.save()?;
        Ok(removed)
    }

    // ── Consumption ────────────────────────────────────────────

    /// Whether an issue of `kind` in `file` matches an ignore rule.
    pub fn should_ignore(&self, kind: IssueKind, file: &str) -> bool {
        self.set.ignores.iter().any(|rule| {
            let kind_matches = match &rule.kind {
                Some(k) => IssueKind::parse(k) == Some(kind),
                None => true,
            };
            kind_matches
                && Pattern::new(&rule.path)
                    .map(|p| p.matches(file) || rule.path == file)
                    .unwrap_or(false)
        })
    }

    /// Merge manual edges and entrypoints into a store. Targets that do
    /// not exist stay tolerated dangling identities; the issue detector
    /// reports them like any other unresolved reference.
    pub fn merge_into(&self, store: &mut GraphStore) {
        for edge in &self.set.edges {
            let Some(kind) = EdgeKind::parse(&edge.kind) else {
                continue;
            };
            store.add_edge(
                GraphEdge::new(
                    NodeId::file(&edge.from),
                    NodeId::file(&edge.to),
                    kind,
                    Confidence::High,
                )
                .with_reason(MANUAL_REASON),
            );
        }

        for entry in &self.set.entrypoints {
            let node = GraphNode::entrypoint(&entry.path, &entry.name, EntrypointKind::Manual);
            store.add_edge(
                GraphEdge::new(
                    node.id().clone(),
                    NodeId::file(&entry.path),
                    EdgeKind::Registers,
                    Confidence::High,
                )
                .with_reason(MANUAL_REASON),
            );
            store.add_node(node);
        }
    }

    fn save(&self) -> Result<()> {
        if self.file.as_os_str().is_empty() {
            return Ok(()); // in-memory manager
        }
        if let Some(dir) = self.file.parent() {
            std::fs::create_dir_all(dir).context("failed to create .arbor directory")?;
        }
        let contents = serde_json::to_string_pretty(&self.set)?;
        std::fs::write(&self.file, contents).context("failed to write annotation file")?;
        Ok(())
    }
}
