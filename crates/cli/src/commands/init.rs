//! Initialize .arbor.toml configuration

use anyhow::Result;
use arbor_core::ArborConfig;
use colored::Colorize;

use crate::Cli;

pub fn run(cli: &Cli) -> Result<()> {
    let root = super::resolve_root(cli);
    let config_path = root.join(".arbor.toml");

    if config_path.exists() {
        println!(
            "  {} .arbor.toml already exists at {}",
            "skipped:".yellow(),
            config_path.display()
        );
        return Ok(());
    }

    let config = ArborConfig::default();
    config.save(&config_path)?;

    println!("  {} {}", "created".green(), config_path.display());
    println!();
    println!("  Customize the configuration, then run:");
    println!("    arbor index");
    Ok(())
}
