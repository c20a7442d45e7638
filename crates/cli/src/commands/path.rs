//! Dependency chain query between two files

use anyhow::Result;

use crate::{output, Cli, OutputFormat};

pub fn run(
    cli: &Cli,
    from: &str,
    to: &str,
    max_depth: Option<usize>,
    max_paths: Option<usize>,
) -> Result<()> {
    let engine = super::load_engine(cli)?;
    let envelope = engine.path_between(from, to, max_depth, max_paths)?;

    match super::resolve_format(cli) {
        OutputFormat::Json => output::print_json(&envelope),
        OutputFormat::Terminal => output::print_path(&envelope),
    }
    Ok(())
}
