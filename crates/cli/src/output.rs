//! Terminal and JSON rendering of query envelopes
//!
//! Every query returns a JSON envelope (`token_estimate` + `result`); the
//! JSON format prints it verbatim, the terminal format renders the fields
//! a human wants to scan.

use arbor_core::QueryEnvelope;
use colored::Colorize;
use serde_json::Value;

pub fn print_json(envelope: &QueryEnvelope) {
    match serde_json::to_string_pretty(envelope) {
        Ok(json) => println!("{}", json),
        Err(e) => eprintln!("  {}: {}", "serialization error".red(), e),
    }
}

pub fn print_digest(envelope: &QueryEnvelope) {
    let r = &envelope.result;
    println!("{}", "  Codebase digest".bold());
    println!(
        "  {} files, {} external modules, {} edges",
        num(r, "files"),
        num(r, "external_modules"),
        num(r, "edges")
    );

    if let Some(hotspots) = r.get("hotspots").and_then(Value::as_array) {
        if !hotspots.is_empty() {
            println!();
            println!("  {}", "Hotspots (most imported)".bold());
            for h in hotspots {
                println!(
                    "    {:>4}  {}",
                    num(h, "incoming").to_string().cyan(),
                    text(h, "path")
                );
            }
        }
    }

    if let Some(entrypoints) = r.get("entrypoints").and_then(Value::as_array) {
        if !entrypoints.is_empty() {
            println!();
            println!("  {}", "Entrypoints".bold());
            for e in entrypoints {
                println!(
                    "    {} {} ({})",
                    text(e, "path"),
                    text(e, "name").green(),
                    text(e, "kind")
                );
            }
        }
    }

    if let Some(issues) = r.get("issues_by_kind").and_then(Value::as_object) {
        if !issues.is_empty() {
            println!();
            println!("  {}", "Issues".bold());
            for (kind, count) in issues {
                println!("    {:>4}  {}", count.to_string().yellow(), kind);
            }
        }
    }
    footer(envelope);
}

pub fn print_impact(envelope: &QueryEnvelope) {
    let r = &envelope.result;
    println!(
        "{}",
        format!("  Impact of changing {}", text(r, "target")).bold()
    );
    println!(
        "  risk: {}  dependents: {}",
        risk_colored(&text(r, "risk")),
        num(r, "total_dependents")
    );

    if let Some(levels) = r.get("transitive_by_depth").and_then(Value::as_array) {
        for (i, level) in levels.iter().enumerate() {
            let Some(paths) = level.as_array() else { continue };
            if paths.is_empty() {
                continue;
            }
            println!();
            println!("  {}", format!("Depth {}", i + 1).bold());
            for p in paths {
                println!("    {}", p.as_str().unwrap_or_default());
            }
        }
    }

    if let Some(entrypoints) = r.get("affected_entrypoints").and_then(Value::as_array) {
        if !entrypoints.is_empty() {
            println!();
            println!("  {}", "Affected entrypoints".bold().red());
            for e in entrypoints {
                println!("    {} {}", text(e, "path"), text(e, "name").green());
            }
        }
    }
    footer(envelope);
}

pub fn print_path(envelope: &QueryEnvelope) {
    let r = &envelope.result;
    let connected = r.get("connected").and_then(Value::as_bool).unwrap_or(false);

    if !connected {
        println!(
            "  {} {} → {}",
            "no path".yellow(),
            text(r, "from"),
            text(r, "to")
        );
        if r.get("max_depth_reached").and_then(Value::as_bool) == Some(true) {
            println!("  {}", "(search hit the depth bound)".dimmed());
        }
        return;
    }

    if let Some(paths) = r.get("paths").and_then(Value::as_array) {
        for entry in paths {
            let nodes: Vec<&str> = entry
                .get("nodes")
                .and_then(Value::as_array)
                .map(|a| a.iter().filter_map(Value::as_str).collect())
                .unwrap_or_default();
            println!(
                "  [{}] {}",
                num(entry, "length").to_string().cyan(),
                nodes.join(" → ")
            );
        }
    }
    footer(envelope);
}

pub fn print_module(envelope: &QueryEnvelope) {
    let r = &envelope.result;
    let barrel = if r.get("is_barrel").and_then(Value::as_bool) == Some(true) {
        " (barrel)"
    } else {
        ""
    };
    println!("{}", format!("  {}{}", text(r, "path"), barrel).bold());
    if let Some(language) = r.get("language").and_then(Value::as_str) {
        println!("  language: {}", language);
    }

    for (label, field) in [
        ("exports", "exports"),
        ("imports", "imports"),
        ("imported by", "imported_by"),
        ("re-exports", "reexports"),
        ("transitive exports", "transitive_exports"),
        ("transitive dependencies", "transitive_dependencies"),
    ] {
        let Some(items) = r.get(field).and_then(Value::as_array) else {
            continue;
        };
        if items.is_empty() {
            continue;
        }
        println!();
        println!("  {}", label.bold());
        for item in items {
            println!("    {}", item.as_str().unwrap_or_default());
        }
    }

    if let Some(entrypoints) = r.get("entrypoints").and_then(Value::as_array) {
        if !entrypoints.is_empty() {
            println!();
            println!("  {}", "entrypoints".bold());
            for e in entrypoints {
                println!("    {} ({})", text(e, "name").green(), text(e, "kind"));
            }
        }
    }
    footer(envelope);
}

pub fn print_issues(envelope: &QueryEnvelope) {
    let r = &envelope.result;
    let Some(issues) = r.get("issues").and_then(Value::as_array) else {
        return;
    };
    if issues.is_empty() {
        println!("  {}", "no issues".green());
        return;
    }

    for issue in issues {
        let severity = text(issue, "severity");
        println!(
            "  {} [{}] {}",
            severity_icon(&severity),
            text(issue, "kind").dimmed(),
            text(issue, "message")
        );
        println!("      {}", text(issue, "file").dimmed());
    }
    println!();
    println!("  {} issue(s)", num(r, "total"));
    footer(envelope);
}

pub fn print_cycles(envelope: &QueryEnvelope) {
    let r = &envelope.result;
    let Some(cycles) = r.get("cycles").and_then(Value::as_array) else {
        return;
    };
    if cycles.is_empty() {
        println!("  {}", "no cycles".green());
        return;
    }

    for cycle in cycles {
        let severity = text(cycle, "severity");
        println!(
            "  {} [{}] {}",
            severity_icon(&severity),
            num(cycle, "length").to_string().cyan(),
            text(cycle, "description")
        );
        if let Some(break_edge) = cycle.get("suggested_break").and_then(Value::as_array) {
            if break_edge.len() == 2 {
                println!(
                    "      {} {} → {}",
                    "break:".dimmed(),
                    break_edge[0].as_str().unwrap_or_default(),
                    break_edge[1].as_str().unwrap_or_default()
                );
            }
        }
    }
    println!();
    println!("  {} cycle(s)", num(r, "total"));
    footer(envelope);
}

pub fn print_layers_check(envelope: &QueryEnvelope) {
    let r = &envelope.result;
    let Some(violations) = r.get("violations").and_then(Value::as_array) else {
        return;
    };
    if violations.is_empty() {
        println!("  {}", "no layer violations".green());
        return;
    }
    for v in violations {
        println!(
            "  {} [{}] {} → {}",
            severity_icon("error"),
            text(v, "rule").dimmed(),
            text(v, "from"),
            text(v, "to")
        );
    }
    println!();
    println!("  {} violation(s)", num(r, "total"));
    footer(envelope);
}

pub fn print_layer_rules(envelope: &QueryEnvelope, field: &str) {
    let r = &envelope.result;
    let Some(rules) = r.get(field).and_then(Value::as_array) else {
        return;
    };
    if rules.is_empty() {
        println!("  {}", "no rules".dimmed());
        return;
    }
    for rule in rules {
        let name = rule
            .get("name")
            .and_then(Value::as_str)
            .unwrap_or("(unnamed)");
        println!(
            "  {} {} must not import {}",
            name.bold(),
            text(rule, "from"),
            text(rule, "cannot_import")
        );
    }
}

fn footer(envelope: &QueryEnvelope) {
    let truncated = envelope
        .result
        .get("truncated")
        .and_then(Value::as_bool)
        .unwrap_or(false);
    let mut note = format!("~{} tokens", envelope.token_estimate);
    if truncated {
        note.push_str(", truncated");
    }
    println!();
    println!("  {}", note.dimmed());
}

fn severity_icon(severity: &str) -> colored::ColoredString {
    match severity {
        "error" => "✗".red(),
        "warning" => "!".yellow(),
        _ => "·".dimmed(),
    }
}

fn risk_colored(risk: &str) -> colored::ColoredString {
    match risk {
        "high" => risk.red().bold(),
        "medium" => risk.yellow(),
        _ => risk.green(),
    }
}

fn text(value: &Value, field: &str) -> String {
    value
        .get(field)
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}

fn num(value: &Value, field: &str) -> u64 {
    value.get(field).and_then(Value::as_u64).unwrap_or(0)
}
