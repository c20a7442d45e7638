//! On-disk graph snapshots for fast reloads
//!
//! The built store is serialized to `.arbor/graph.msgpack` with a JSON
//! metadata sidecar holding the format version, tool version, an optional
//! git commit, and per-file content checksums. A snapshot whose checksums
//! no longer match the tree is stale and ignored.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use crate::graph::GraphStore;

const SNAPSHOT_FORMAT_VERSION: u32 = 1;

/// Metadata about a persisted snapshot
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SnapshotMeta {
    pub format_version: u32,

    /// Arbor version that created this snapshot
    pub tool_version: String,

    /// Git commit hash when the snapshot was written, if in a repo
    pub commit_hash: Option<String>,

    pub created: SystemTime,

    /// Root-relative path → sha256 of contents
    pub file_checksums: BTreeMap<String, String>,
}

/// Manages snapshot persistence under `.arbor/`
pub struct GraphSnapshot {
    dir: PathBuf,
    root: PathBuf,
}

impl GraphSnapshot {
    pub fn new(root: &Path) -> Self {
        Self {
            dir: root.join(".arbor"),
            root: root.to_path_buf(),
        }
    }

    /// Save a store and its file checksums.
    pub fn save(&self, store: &GraphStore, files: &[String]) -> Result<()> {
        std::fs::create_dir_all(&self.dir).context("failed to create .arbor directory")?;

        let meta = SnapshotMeta {
            format_version: SNAPSHOT_FORMAT_VERSION,
            tool_version: crate::VERSION.to_string(),
            commit_hash: commit_hash(&self.root),
            created: SystemTime::now(),
            file_checksums: self.checksums(files)?,
        };

        let meta_contents = serde_json::to_string_pretty(&meta)?;
        std::fs::write(self.dir.join("graph.meta.json"), meta_contents)?;

        let graph_contents = rmp_serde::to_vec_named(store)?;
        std::fs::write(self.dir.join("graph.msgpack"), graph_contents)?;
        Ok(())
    }

    /// Load the snapshot if present and still valid for the tree.
    pub fn load(&self) -> Result<Option<GraphStore>> {
        let graph_path = self.dir.join("graph.msgpack");
        let meta_path = self.dir.join("graph.meta.json");
        if !graph_path.exists() || !meta_path.exists() {
            return Ok(None);
        }

        let meta_contents = std::fs::read_to_string(&meta_path)?;
        let meta: SnapshotMeta = match serde_json::from_str(&meta_contents) {
            Ok(meta) => meta,
            Err(e) => {
                log::warn!("unreadable snapshot metadata: {}", e);
                return Ok(None);
            }
        };

        if !self.is_valid(&meta) {
            return Ok(None);
        }

        let graph_contents = std::fs::read(&graph_path)?;
        match rmp_serde::from_slice(&graph_contents) {
            Ok(store) => Ok(Some(store)),
            Err(e) => {
                log::warn!("unreadable snapshot graph: {}", e);
                Ok(None)
            }
        }
    }

    /// A snapshot is valid when versions match and no checksummed file
    /// changed or disappeared.
    pub fn is_valid(&self, meta: &SnapshotMeta) -> bool {
        if meta.format_version != SNAPSHOT_FORMAT_VERSION || meta.tool_version != crate::VERSION {
            return false;
        }
        for (rel, expected) in &meta.file_checksums {
            let path = self.root.join(rel);
            match checksum_file(&path) {
                Ok(actual) if &actual == expected => {}
                _ => return false,
            }
        }
        true
    }

    /// Remove any persisted snapshot.
    pub fn clear(&self) -> Result<()> {
        for name in ["graph.msgpack", "graph.meta.json"] {
            let path = self.dir.join(name);
            if path.exists() {
                std::fs::remove_file(path)?;
            }
        }
        Ok(())
    }

    fn checksums(&self, files: &[String]) -> Result<BTreeMap<String, String>> {
        let mut checksums = BTreeMap::new();
        for rel in files {
            let path = self.root.join(rel);
            if path.exists() {
                checksums.insert(rel.clone(), checksum_file(&path)?);
            }
        }
        Ok(checksums)
    }
}

fn checksum_file(path: &Path) -> Result<String> {
    let contents = std::fs::read(path)?;
    let mut hasher = Sha256::new();
    hasher.update(&contents);
    Ok(format!("{:x}", hasher.finalize()))
}

/// Current HEAD commit, when the root is inside a git repository.
fn commit_hash(root: &Path) -> Option<String> {
    git2::Repository::discover(root)
        .ok()?
        .head()
        .ok()?
        .peel_to_commit()
        .ok()
        .map(|commit| commit.id().to_string())
}
