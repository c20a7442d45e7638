//! Build the dependency graph and persist a snapshot

use anyhow::Result;
use arbor_core::{ArborConfig, GraphEngine, GraphSnapshot};
use colored::Colorize;

use crate::progress::Step;
use crate::Cli;

pub fn run(cli: &Cli) -> Result<()> {
    let root = super::resolve_root(cli);
    println!(
        "{}",
        format!("  arbor v{} — indexing {}", arbor_core::VERSION, root.display()).bold()
    );
    println!();

    let config = ArborConfig::find_and_load(&root)?;
    let engine = GraphEngine::new(root.clone(), config);

    let step = Step::new("Building graph");
    let stats = engine.build()?;
    let (nodes, edges, issues) =
        engine.with_store(|store| (store.node_count(), store.edge_count(), store.issues().len()));
    step.finish(&format!(
        "{} files, {} nodes, {} edges ({:.1}s)",
        stats.files_indexed,
        nodes,
        edges,
        stats.duration_ms as f64 / 1000.0
    ));

    if stats.error_count > 0 {
        println!(
            "  {} {} file(s) degraded to file-node-only",
            "warn:".yellow(),
            stats.error_count
        );
    }
    if issues > 0 {
        println!("  {} structural issue(s) — see `arbor issues`", issues);
    }

    let step = Step::new("Saving snapshot");
    super::save_snapshot(&engine, &GraphSnapshot::new(&root))?;
    step.finish(".arbor/graph.msgpack");
    Ok(())
}
