//! Arbor CLI - dependency graph queries for source trees

use anyhow::Result;
use arbor_cli::{commands, Cli, Commands};
use clap::Parser;

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let cli = Cli::parse();

    match &cli.command {
        Commands::Init => commands::init::run(&cli),
        Commands::Index => commands::index::run(&cli),
        Commands::Digest { scope } => commands::digest::run(&cli, scope.as_deref()),
        Commands::Impact { target, depth } => commands::impact::run(&cli, target, *depth),
        Commands::Path {
            from,
            to,
            max_depth,
            max_paths,
        } => commands::path::run(&cli, from, to, *max_depth, *max_paths),
        Commands::Module { target, transitive } => commands::module::run(&cli, target, *transitive),
        Commands::Issues {
            kind,
            severity,
            scope,
            limit,
        } => commands::issues::run(
            &cli,
            kind.as_deref(),
            severity.as_deref(),
            scope.as_deref(),
            *limit,
        ),
        Commands::Cycles {
            scope,
            min_length,
            max_cycles,
        } => commands::cycles::run(&cli, scope.as_deref(), *min_length, *max_cycles),
        Commands::Layers { action } => commands::layers::run(&cli, action),
        Commands::Annotate { action } => commands::annotate::run(&cli, action),
        Commands::Watch { debounce } => commands::watch::run(&cli, *debounce),
    }
}
