//! Module details query

use anyhow::Result;

use crate::{output, Cli, OutputFormat};

pub fn run(cli: &Cli, target: &str, transitive: bool) -> Result<()> {
    let engine = super::load_engine(cli)?;
    let envelope = engine.module(target, transitive)?;

    match super::resolve_format(cli) {
        OutputFormat::Json => output::print_json(&envelope),
        OutputFormat::Terminal => output::print_module(&envelope),
    }
    Ok(())
}
