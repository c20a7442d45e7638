//! Manage manual edges, entrypoints, and ignore rules

use anyhow::Result;
use arbor_core::GraphSnapshot;
use clap::Subcommand;
use colored::Colorize;

use crate::{Cli, OutputFormat};

#[derive(Subcommand)]
pub enum AnnotateAction {
    /// List all annotations
    List,

    /// Declare an edge between two files
    AddEdge {
        from: String,
        to: String,

        /// Edge kind: imports, calls, registers, reexports
        #[arg(long, default_value = "imports")]
        kind: String,
    },

    /// Declare an entrypoint
    AddEntrypoint {
        path: String,

        /// Entrypoint label
        #[arg(long, default_value = "main")]
        name: String,
    },

    /// Ignore issues matching a kind and path pattern
    AddIgnore {
        /// Wildcard path pattern (e.g. "src/legacy/**")
        path: String,

        /// Issue kind to ignore; omitted means every kind
        #[arg(long)]
        kind: Option<String>,
    },

    /// Remove a manual edge
    RemoveEdge { from: String, to: String },

    /// Remove an ignore rule
    RemoveIgnore { path: String },
}

pub fn run(cli: &Cli, action: &AnnotateAction) -> Result<()> {
    let engine = super::load_engine(cli)?;
    let mutated = !matches!(action, AnnotateAction::List);

    match action {
        AnnotateAction::List => {
            let set = engine.with_annotations(|a| a.get_all().clone());
            match super::resolve_format(cli) {
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&set)?),
                OutputFormat::Terminal => {
                    if set.edges.is_empty() && set.entrypoints.is_empty() && set.ignores.is_empty()
                    {
                        println!("  {}", "no annotations".dimmed());
                        return Ok(());
                    }
                    for edge in &set.edges {
                        println!("  edge: {} -[{}]-> {}", edge.from, edge.kind, edge.to);
                    }
                    for entry in &set.entrypoints {
                        println!("  entrypoint: {} ({})", entry.path, entry.name);
                    }
                    for rule in &set.ignores {
                        let kind = rule.kind.as_deref().unwrap_or("*");
                        println!("  ignore: {} on {}", kind, rule.path);
                    }
                }
            }
        }
        AnnotateAction::AddEdge { from, to, kind } => {
            engine.annotate_add_edge(from, to, kind)?;
            println!("  {} {} -[{}]-> {}", "added".green(), from, kind, to);
        }
        AnnotateAction::AddEntrypoint { path, name } => {
            engine.annotate_add_entrypoint(path, name)?;
            println!("  {} entrypoint {} ({})", "added".green(), path, name);
        }
        AnnotateAction::AddIgnore { path, kind } => {
            engine.annotate_add_ignore(kind.as_deref(), path)?;
            println!(
                "  {} ignore {} on {}",
                "added".green(),
                kind.as_deref().unwrap_or("*"),
                path
            );
        }
        AnnotateAction::RemoveEdge { from, to } => {
            if engine.annotate_remove_edge(from, to)? {
                println!("  {} edge {} -> {}", "removed".green(), from, to);
            } else {
                println!("  {} no matching edge", "skipped:".yellow());
            }
        }
        AnnotateAction::RemoveIgnore { path } => {
            if engine.annotate_remove_ignore(path)? {
                println!("  {} ignore on {}", "removed".green(), path);
            } else {
                println!("  {} no matching rule", "skipped:".yellow());
            }
        }
    }

    // Keep the persisted snapshot in step with the mutated store
    if mutated {
        super::save_snapshot(&engine, &GraphSnapshot::new(engine.root()))?;
    }
    Ok(())
}
