//! Codebase digest query

use anyhow::Result;

use crate::{output, Cli, OutputFormat};

pub fn run(cli: &Cli, scope: Option<&str>) -> Result<()> {
    let engine = super::load_engine(cli)?;
    let envelope = engine.digest(scope)?;

    match super::resolve_format(cli) {
        OutputFormat::Json => output::print_json(&envelope),
        OutputFormat::Terminal => output::print_digest(&envelope),
    }
    Ok(())
}
