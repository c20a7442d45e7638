//! Arbor CLI library — exposed for integration tests

pub mod commands;
pub mod output;
pub mod progress;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "arbor")]
#[command(about = "Dependency graph queries for source trees", long_about = None)]
#[command(version = arbor_core::VERSION)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Repository root (default: current directory)
    #[arg(long, global = true)]
    pub root: Option<PathBuf>,

    /// Output format
    #[arg(long, value_enum, global = true)]
    pub format: Option<OutputFormat>,

    /// Rebuild the graph even if a valid snapshot exists
    #[arg(long, global = true)]
    pub rebuild: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize .arbor.toml configuration
    Init,

    /// Build the dependency graph and persist a snapshot
    Index,

    /// Summarize the codebase: counts, hotspots, entrypoints, issues
    Digest {
        /// Restrict to a path prefix
        #[arg(long)]
        scope: Option<String>,
    },

    /// Blast radius of changing a file
    Impact {
        /// Target file (path, node id, or unique suffix)
        target: String,

        /// Traversal depth in hops (1-4)
        #[arg(long)]
        depth: Option<usize>,
    },

    /// Dependency chains between two files
    Path {
        from: String,
        to: String,

        #[arg(long)]
        max_depth: Option<usize>,

        #[arg(long)]
        max_paths: Option<usize>,
    },

    /// Details of one module
    Module {
        target: String,

        /// Include transitive exports and dependencies
        #[arg(long)]
        transitive: bool,
    },

    /// List structural issues
    Issues {
        /// Filter by issue kind (e.g. circular_dependency)
        #[arg(long)]
        kind: Option<String>,

        /// Filter by severity: error, warning, info
        #[arg(long)]
        severity: Option<String>,

        /// Restrict to a path prefix
        #[arg(long)]
        scope: Option<String>,

        #[arg(long)]
        limit: Option<usize>,
    },

    /// Enumerate dependency cycles
    Cycles {
        /// Restrict to a path prefix
        #[arg(long)]
        scope: Option<String>,

        #[arg(long)]
        min_length: Option<usize>,

        #[arg(long)]
        max_cycles: Option<usize>,
    },

    /// Check, list, or suggest layer rules
    Layers {
        #[command(subcommand)]
        action: commands::layers::LayersAction,
    },

    /// Manage manual edges, entrypoints, and ignore rules
    Annotate {
        #[command(subcommand)]
        action: commands::annotate::AnnotateAction,
    },

    /// Watch the tree and apply incremental updates
    Watch {
        /// Debounce duration in milliseconds
        #[arg(long, default_value = "300")]
        debounce: u64,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    Terminal,
    Json,
}
