//! Layer rule checking, listing, and suggestion

use anyhow::Result;
use clap::Subcommand;

use crate::{output, Cli, OutputFormat};

#[derive(Subcommand)]
pub enum LayersAction {
    /// Evaluate configured rules against the graph
    Check,
    /// List configured rules
    List,
    /// Suggest rules from the observed import flow
    Suggest,
}

pub fn run(cli: &Cli, action: &LayersAction) -> Result<()> {
    let engine = super::load_engine(cli)?;
    let format = super::resolve_format(cli);

    match action {
        LayersAction::Check => {
            let envelope = engine.layers_check()?;
            match format {
                OutputFormat::Json => output::print_json(&envelope),
                OutputFormat::Terminal => output::print_layers_check(&envelope),
            }
        }
        LayersAction::List => {
            let envelope = engine.layers_list()?;
            match format {
                OutputFormat::Json => output::print_json(&envelope),
                OutputFormat::Terminal => output::print_layer_rules(&envelope, "rules"),
            }
        }
        LayersAction::Suggest => {
            let envelope = engine.layers_suggest()?;
            match format {
                OutputFormat::Json => output::print_json(&envelope),
                OutputFormat::Terminal => output::print_layer_rules(&envelope, "suggestions"),
            }
        }
    }
    Ok(())
}
