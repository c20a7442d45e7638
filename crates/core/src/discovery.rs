//! File discovery with gitignore-aware filtering
//!
//! Uses the `ignore` crate (from ripgrep) to automatically respect
//! `.gitignore`, `.ignore`, and `.git/info/exclude` files, layered with
//! the include/exclude globs and max-file-size cutoff from `.arbor.toml`.
//! Everything here runs before any content reaches an indexer.

use anyhow::Result;
use ignore::overrides::OverrideBuilder;
use ignore::WalkBuilder;
use std::path::{Path, PathBuf};

use crate::config::IndexConfig;

/// Discover files under `root` matching any of the given `extensions`,
/// honoring the config's include/exclude globs and size limit.
///
/// Returns absolute paths sorted alphabetically.
pub fn discover_files(
    root: &Path,
    extensions: &[&str],
    config: &IndexConfig,
) -> Result<Vec<PathBuf>> {
    let root = root.canonicalize()?;

    let mut builder = WalkBuilder::new(&root);
    builder
        .hidden(true) // skip hidden files/dirs
        .git_ignore(true) // respect .gitignore
        .git_global(true) // respect global gitignore
        .git_exclude(true); // respect .git/info/exclude

    // Excludes are expressed as negated overrides in gitignore syntax;
    // includes are plain overrides restricting the walk.
    if !config.exclude.is_empty() || !config.include.is_empty() {
        let mut overrides = OverrideBuilder::new(&root);
        for pattern in &config.include {
            overrides.add(pattern)?;
        }
        for pattern in &config.exclude {
            let glob = if pattern.ends_with('/') {
                format!("!{}**", pattern)
            } else {
                format!("!{}", pattern)
            };
            overrides.add(&glob)?;
        }
        builder.overrides(overrides.build()?);
    }

    let mut files = Vec::new();
    let mut oversize = 0usize;

    for entry in builder.build() {
        let entry = match entry {
            Ok(e) => e,
            Err(_) => continue, // skip unreadable entries
        };

        if !entry.file_type().is_some_and(|ft| ft.is_file()) {
            continue;
        }

        if let Ok(meta) = entry.metadata() {
            if meta.len() > config.max_file_size {
                oversize += 1;
                continue;
            }
        }

        let path = entry.into_path();
        if has_supported_extension(&path, extensions) {
            if path.is_absolute() {
                files.push(path);
            } else {
                files.push(root.join(path));
            }
        }
    }

    if oversize > 0 {
        log::debug!("discovery skipped {} oversize file(s)", oversize);
    }

    files.sort();
    Ok(files)
}

fn has_supported_extension(path: &Path, extensions: &[&str]) -> bool {
    let ext = match path.extension().and_then(|e| e.to_str()) {
        Some(e) => e,
        None => return false,
    };
    let with_dot = format!(".{}", ext);
    extensions.contains(&with_dot.as_str())
}
