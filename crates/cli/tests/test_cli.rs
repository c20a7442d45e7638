//! CLI argument parsing tests

use arbor_cli::{Cli, Commands, OutputFormat};
use clap::CommandFactory;
use clap::Parser;

#[test]
fn test_command_definition_is_consistent() {
    Cli::command().debug_assert();
}

#[test]
fn test_parse_digest_with_scope() {
    let cli = Cli::parse_from(["arbor", "digest", "--scope", "src/core"]);
    match cli.command {
        Commands::Digest { scope } => assert_eq!(scope.as_deref(), Some("src/core")),
        _ => panic!("expected digest"),
    }
}

#[test]
fn test_parse_impact_with_depth() {
    let cli = Cli::parse_from(["arbor", "impact", "src/a.ts", "--depth", "3"]);
    match cli.command {
        Commands::Impact { target, depth } => {
            assert_eq!(target, "src/a.ts");
            assert_eq!(depth, Some(3));
        }
        _ => panic!("expected impact"),
    }
}

#[test]
fn test_parse_global_format_flag() {
    let cli = Cli::parse_from(["arbor", "digest", "--format", "json"]);
    assert_eq!(cli.format, Some(OutputFormat::Json));
}

#[test]
fn test_parse_annotate_add_edge() {
    let cli = Cli::parse_from([
        "arbor", "annotate", "add-edge", "src/a.ts", "src/b.ts", "--kind", "calls",
    ]);
    match cli.command {
        Commands::Annotate { action } => match action {
            arbor_cli::commands::annotate::AnnotateAction::AddEdge { from, to, kind } => {
                assert_eq!(from, "src/a.ts");
                assert_eq!(to, "src/b.ts");
                assert_eq!(kind, "calls");
            }
            _ => panic!("expected add-edge"),
        },
        _ => panic!("expected annotate"),
    }
}

#[test]
fn test_parse_layers_subcommand() {
    let cli = Cli::parse_from(["arbor", "layers", "suggest"]);
    match cli.command {
        Commands::Layers { action } => {
            assert!(matches!(
                action,
                arbor_cli::commands::layers::LayersAction::Suggest
            ));
        }
        _ => panic!("expected layers"),
    }
}
