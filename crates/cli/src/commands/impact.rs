//! Impact (blast radius) query

use anyhow::Result;

use crate::{output, Cli, OutputFormat};

pub fn run(cli: &Cli, target: &str, depth: Option<usize>) -> Result<()> {
    let engine = super::load_engine(cli)?;
    let envelope = engine.impact(target, depth)?;

    match super::resolve_format(cli) {
        OutputFormat::Json => output::print_json(&envelope),
        OutputFormat::Terminal => output::print_impact(&envelope),
    }
    Ok(())
}
