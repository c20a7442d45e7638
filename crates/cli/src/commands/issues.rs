//! Structural issue listing

use anyhow::{bail, Result};
use arbor_core::{IssueFilter, IssueKind, Severity};

use crate::{output, Cli, OutputFormat};

pub fn run(
    cli: &Cli,
    kind: Option<&str>,
    severity: Option<&str>,
    scope: Option<&str>,
    limit: Option<usize>,
) -> Result<()> {
    let kind = match kind {
        Some(raw) => match IssueKind::parse(raw) {
            Some(kind) => Some(kind),
            None => bail!("unknown issue kind: {}", raw),
        },
        None => None,
    };
    let severity = match severity {
        Some(raw) => match Severity::parse(raw) {
            Some(severity) => Some(severity),
            None => bail!("unknown severity: {}", raw),
        },
        None => None,
    };

    let filter = IssueFilter {
        kind,
        severity,
        scope: scope.map(String::from),
        limit,
    };

    let engine = super::load_engine(cli)?;
    let envelope = engine.issues(&filter)?;

    match super::resolve_format(cli) {
        OutputFormat::Json => output::print_json(&envelope),
        OutputFormat::Terminal => output::print_issues(&envelope),
    }
    Ok(())
}
