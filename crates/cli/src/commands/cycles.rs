//! Dependency cycle listing

use anyhow::Result;
use arbor_core::CycleOptions;

use crate::{output, Cli, OutputFormat};

pub fn run(
    cli: &Cli,
    scope: Option<&str>,
    min_length: Option<usize>,
    max_cycles: Option<usize>,
) -> Result<()> {
    let engine = super::load_engine(cli)?;

    let defaults = CycleOptions::default();
    let opts = CycleOptions {
        scope: scope.map(String::from),
        min_length: min_length.unwrap_or(defaults.min_length),
        max_cycles: max_cycles.unwrap_or(engine.config().cycles.max_cycles),
    };
    let envelope = engine.cycles(&opts)?;

    match super::resolve_format(cli) {
        OutputFormat::Json => output::print_json(&envelope),
        OutputFormat::Terminal => output::print_cycles(&envelope),
    }
    Ok(())
}
