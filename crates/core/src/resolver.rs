//! Canonical identity resolution for import specifiers
//!
//! Maps a module specifier plus the importing file's location to the
//! canonical node identity an edge should target. Resolution is a pure
//! function of the specifier, the importing file, the configured alias
//! table, and the discovered file set; it performs no I/O.

use std::collections::{BTreeMap, BTreeSet};
use std::path::{Component, Path};

use crate::graph::{canonical_path, NodeId};

/// Extensions probed when a specifier omits one, in priority order.
const PROBE_EXTENSIONS: &[&str] = &[
    "ts", "tsx", "js", "jsx", "mjs", "cjs", "py", "rs", "go", "rb", "php", "java", "c", "h",
    "cpp", "hpp", "cs", "kt", "swift", "sh", "lua",
];

/// Index-file names probed when a specifier names a directory.
const INDEX_FILES: &[&str] = &["index.ts", "index.tsx", "index.js", "__init__.py", "mod.rs"];

/// Outcome of resolving a specifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// The specifier maps to a file inside the indexed tree.
    Internal(String),
    /// Bare package or unresolvable specifier; represented by a stable
    /// placeholder identity rather than failing.
    External(String),
}

impl Resolution {
    /// The node identity an edge targeting this resolution should use.
    pub fn node_id(&self) -> NodeId {
        match self {
            Resolution::Internal(path) => NodeId::file(path),
            Resolution::External(spec) => NodeId::external(spec),
        }
    }

    pub fn is_internal(&self) -> bool {
        matches!(self, Resolution::Internal(_))
    }
}

/// Resolves module specifiers to canonical node identities.
pub struct PathResolver {
    /// Alias prefixes sorted longest-first so `@app/x` wins over `@app`
    aliases: Vec<(String, String)>,

    /// Root-relative paths of every discovered file
    files: BTreeSet<String>,
}

impl PathResolver {
    pub fn new(aliases: &BTreeMap<String, String>, files: impl IntoIterator<Item = String>) -> Self {
        let mut aliases: Vec<(String, String)> = aliases
            .iter()
            .map(|(k, v)| (k.clone(), v.trim_matches('/').to_string()))
            .collect();
        aliases.sort_by(|a, b| b.0.len().cmp(&a.0.len()));

        Self {
            aliases,
            files: files.into_iter().collect(),
        }
    }

    /// Resolve `specifier` as written in `from_file` (root-relative).
    pub fn resolve(&self, specifier: &str, from_file: &Path) -> Resolution {
        let spec = specifier.trim();
        if spec.is_empty() {
            return Resolution::External(specifier.to_string());
        }

        if spec.starts_with("./") || spec.starts_with("../") || spec == "." || spec == ".." {
            return self.resolve_relative(spec, from_file);
        }

        if let Some(resolution) = self.resolve_alias(spec) {
            return resolution;
        }

        // Python-style dotted module: "pkg.util" → "pkg/util"
        if spec.contains('.') && !spec.contains('/') {
            let as_path = spec.replace('.', "/");
            if let Some(path) = self.probe(&as_path) {
                return Resolution::Internal(path);
            }
        }

        // Root-anchored bare specifier ("src/util")
        if spec.contains('/') {
            if let Some(path) = self.probe(spec.trim_matches('/')) {
                return Resolution::Internal(path);
            }
            // Go-style import path: match the last segment as a package
            // directory and pick its lexically-first file.
            if let Some(path) = self.match_package_dir(spec) {
                return Resolution::Internal(path);
            }
        }

        Resolution::External(spec.to_string())
    }

    /// Resolve a relative specifier against the importing file's directory.
    fn resolve_relative(&self, specifier: &str, from_file: &Path) -> Resolution {
        let base = from_file.parent().unwrap_or_else(|| Path::new(""));
        let joined = normalize(&base.join(specifier));

        match self.probe(&joined) {
            Some(path) => Resolution::Internal(path),
            // Unresolvable relative targets degrade to placeholders; the
            // caller tags the edge low-confidence, not an error.
            None => Resolution::External(specifier.to_string()),
        }
    }

    /// Apply a configured alias prefix, then probe the mapped path.
    fn resolve_alias(&self, specifier: &str) -> Option<Resolution> {
        for (prefix, target) in &self.aliases {
            let rest = match specifier.strip_prefix(prefix.as_str()) {
                Some(rest) if rest.is_empty() => "",
                Some(rest) if rest.starts_with('/') => &rest[1..],
                _ => continue,
            };

            let candidate = if rest.is_empty() {
                target.clone()
            } else {
                format!("{}/{}", target, rest)
            };
            return Some(match self.probe(&candidate) {
                Some(path) => Resolution::Internal(path),
                None => Resolution::External(specifier.to_string()),
            });
        }
        None
    }

    /// Try a root-relative base path with extension and index-file probing.
    fn probe(&self, base: &str) -> Option<String> {
        let base = base.trim_start_matches("./");

        // Exact path (already has extension)
        if self.files.contains(base) {
            return Some(base.to_string());
        }

        for ext in PROBE_EXTENSIONS {
            let candidate = format!("{}.{}", base, ext);
            if self.files.contains(&candidate) {
                return Some(candidate);
            }
        }

        for name in INDEX_FILES {
            let candidate = if base.is_empty() {
                name.to_string()
            } else {
                format!("{}/{}", base, name)
            };
            if self.files.contains(&candidate) {
                return Some(candidate);
            }
        }

        None
    }

    /// Resolve a `::`-separated module path (Rust `use crate::a::b`) by
    /// walking up from the importing file's directory and probing the
    /// joined segments at each level. The trailing segment is retried
    /// without itself, since it is usually an item rather than a module.
    pub fn resolve_module_path(&self, segments: &[&str], from_file: &Path) -> Option<String> {
        if segments.is_empty() {
            return None;
        }
        let mut dirs: Vec<String> = Vec::new();
        let mut dir = from_file.parent().unwrap_or_else(|| Path::new(""));
        loop {
            dirs.push(canonical_path(dir));
            match dir.parent() {
                Some(parent) => dir = parent,
                None => break,
            }
        }

        let full = segments.join("/");
        let without_item = segments[..segments.len() - 1].join("/");

        for base in &dirs {
            for candidate in [&full, &without_item] {
                if candidate.is_empty() {
                    continue;
                }
                let joined = if base.is_empty() {
                    candidate.clone()
                } else {
                    format!("{}/{}", base, candidate)
                };
                if let Some(path) = self.probe(&joined) {
                    return Some(path);
                }
            }
        }
        None
    }

    /// Match the last segment of an import path against a package
    /// directory; deterministic via lexically-first file in that dir.
    fn match_package_dir(&self, specifier: &str) -> Option<String> {
        let last = specifier.trim_end_matches('/').rsplit('/').next()?;
        let needle = format!("/{}/", last);
        self.files
            .iter()
            .find(|p| p.contains(&needle) || p.starts_with(&format!("{}/", last)))
            .cloned()
    }
}

/// Collapse `.` and `..` components without touching the filesystem.
fn normalize(path: &Path) -> String {
    let mut parts: Vec<String> = Vec::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                parts.pop();
            }
            Component::Normal(part) => parts.push(part.to_string_lossy().into_owned()),
            _ => {}
        }
    }
    canonical_path(Path::new(&parts.join("/")))
}
