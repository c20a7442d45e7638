//! CLI subcommands

pub mod annotate;
pub mod cycles;
pub mod digest;
pub mod impact;
pub mod index;
pub mod init;
pub mod issues;
pub mod layers;
pub mod module;
pub mod path;
pub mod watch;

use anyhow::Result;
use arbor_core::{ArborConfig, GraphEngine, GraphSnapshot, NodeKind};
use std::path::{Path, PathBuf};

use crate::progress::Step;
use crate::{Cli, OutputFormat};

pub(crate) fn resolve_root(cli: &Cli) -> PathBuf {
    let root = cli.root.as_deref().unwrap_or_else(|| Path::new("."));
    std::fs::canonicalize(root).unwrap_or_else(|_| root.to_path_buf())
}

pub(crate) fn resolve_format(cli: &Cli) -> OutputFormat {
    cli.format.unwrap_or(OutputFormat::Terminal)
}

/// Build an engine for the root: restore a valid snapshot when allowed,
/// otherwise run a full build and persist a fresh one.
pub(crate) fn load_engine(cli: &Cli) -> Result<GraphEngine> {
    let root = resolve_root(cli);
    let config = ArborConfig::find_and_load(&root)?;
    let engine = GraphEngine::new(root.clone(), config);
    let snapshot = GraphSnapshot::new(&root);

    if !cli.rebuild {
        if let Some(store) = snapshot.load()? {
            log::debug!("restored graph snapshot for {}", root.display());
            engine.swap_store(store)?;
            return Ok(engine);
        }
    }

    let step = Step::new("Building graph");
    let stats = engine.build()?;
    step.finish(&format!(
        "{} files, {} errors, {:.1}s",
        stats.files_indexed,
        stats.error_count,
        stats.duration_ms as f64 / 1000.0
    ));
    save_snapshot(&engine, &snapshot)?;
    Ok(engine)
}

pub(crate) fn save_snapshot(engine: &GraphEngine, snapshot: &GraphSnapshot) -> Result<()> {
    engine.with_store(|store| {
        let files: Vec<String> = store
            .nodes_by_kind(NodeKind::File)
            .into_iter()
            .filter_map(|n| n.path().map(String::from))
            .collect();
        snapshot.save(store, &files)
    })
}
