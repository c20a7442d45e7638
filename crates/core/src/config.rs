//! Configuration file parsing for .arbor.toml

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// Main configuration structure for .arbor.toml
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArborConfig {
    #[serde(default)]
    pub index: IndexConfig,

    #[serde(default)]
    pub resolve: ResolveConfig,

    #[serde(default)]
    pub cycles: CyclesConfig,

    #[serde(default)]
    pub layers: LayersConfig,

    #[serde(default)]
    pub entrypoints: EntrypointsConfig,

    #[serde(default)]
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexConfig {
    /// Include globs; empty means every supported file
    #[serde(default)]
    pub include: Vec<String>,

    /// Exclude path patterns (gitignore syntax, trailing `/` for dirs)
    #[serde(default = "default_exclude")]
    pub exclude: Vec<String>,

    /// Files larger than this are skipped before reaching an indexer
    #[serde(default = "default_max_file_size")]
    pub max_file_size: u64,

    /// Files per indexing batch
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,

    /// Worker cap for parallel indexing; 0 uses the rayon default
    #[serde(default)]
    pub concurrency: usize,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ResolveConfig {
    /// Path alias prefixes, e.g. `"@app" = "src"`
    #[serde(default)]
    pub aliases: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CyclesConfig {
    /// Cycles at or above this length are reported as errors
    #[serde(default = "default_error_length")]
    pub error_length: usize,

    /// Hard cap on enumerated cycles per run
    #[serde(default = "default_max_cycles")]
    pub max_cycles: usize,
}

/// A layering rule: files matching `from` must not import files
/// matching `cannot_import`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LayerRule {
    #[serde(default)]
    pub name: Option<String>,

    /// Glob over root-relative paths
    pub from: String,

    /// Glob over root-relative paths
    pub cannot_import: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LayersConfig {
    #[serde(default)]
    pub rules: Vec<LayerRule>,
}

/// A hint mapping a path glob to an entrypoint kind, for frameworks the
/// indexers cannot recognize syntactically.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntrypointHint {
    /// Glob over root-relative paths
    pub pattern: String,

    /// Entrypoint kind: "main", "route", "job", "script"
    pub kind: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EntrypointsConfig {
    #[serde(default)]
    pub hints: Vec<EntrypointHint>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Max entries per list in a query result before truncation
    #[serde(default = "default_max_items")]
    pub max_items: usize,

    /// Soft token budget a digest aims to stay under
    #[serde(default = "default_max_tokens")]
    pub max_tokens: usize,
}

// Default functions

fn default_exclude() -> Vec<String> {
    vec![
        "node_modules/".to_string(),
        "dist/".to_string(),
        "build/".to_string(),
        "target/".to_string(),
        ".git/".to_string(),
        "__pycache__/".to_string(),
        ".venv/".to_string(),
        "venv/".to_string(),
        "vendor/".to_string(),
        ".arbor/".to_string(),
    ]
}

fn default_max_file_size() -> u64 {
    1_048_576
}

fn default_batch_size() -> usize {
    32
}

fn default_error_length() -> usize {
    4
}

fn default_max_cycles() -> usize {
    50
}

fn default_max_items() -> usize {
    25
}

fn default_max_tokens() -> usize {
    2_000
}

impl Default for ArborConfig {
    fn default() -> Self {
        toml::from_str("").expect("empty TOML should parse to defaults")
    }
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            include: Vec::new(),
            exclude: default_exclude(),
            max_file_size: default_max_file_size(),
            batch_size: default_batch_size(),
            concurrency: 0,
        }
    }
}

impl Default for CyclesConfig {
    fn default() -> Self {
        Self {
            error_length: default_error_length(),
            max_cycles: default_max_cycles(),
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            max_items: default_max_items(),
            max_tokens: default_max_tokens(),
        }
    }
}

impl ArborConfig {
    /// Load configuration from a file
    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: ArborConfig = toml::from_str(&contents)?;
        Ok(config)
    }

    /// Find and load .arbor.toml from the given directory or its ancestors
    pub fn find_and_load(start_dir: &Path) -> Result<Self> {
        let mut current = start_dir;

        loop {
            let config_path = current.join(".arbor.toml");
            if config_path.exists() {
                return Self::from_file(&config_path);
            }

            match current.parent() {
                Some(parent) => current = parent,
                None => break,
            }
        }

        // No config found, use defaults
        Ok(Self::default())
    }

    /// Save configuration to a file
    pub fn save(&self, path: &Path) -> Result<()> {
        let contents = toml::to_string_pretty(self)?;
        std::fs::write(path, contents)?;
        Ok(())
    }
}
