//! Watch mode — apply file changes to the graph incrementally

use anyhow::Result;
use arbor_core::{FileEvent, IncrementalWatcher};
use colored::Colorize;
use notify_debouncer_mini::{new_debouncer, DebouncedEventKind};
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crate::Cli;

pub fn run(cli: &Cli, debounce_ms: u64) -> Result<()> {
    let root = super::resolve_root(cli);
    let engine = super::load_engine(cli)?;
    let watcher = IncrementalWatcher::new();

    eprintln!(
        "{}",
        format!("  arbor v{} — watch mode", arbor_core::VERSION).bold()
    );
    eprintln!();
    print_summary(&engine);
    eprintln!();
    eprintln!("  {}", "Watching for changes... (Ctrl-C to stop)".dimmed());

    // ── Ctrl-C handler ─────────────────────────────────────────
    let running = Arc::new(AtomicBool::new(true));
    let r = running.clone();
    ctrlc::set_handler(move || {
        r.store(false, Ordering::SeqCst);
    })?;

    // ── Set up file watcher ────────────────────────────────────
    let (tx, rx) = std::sync::mpsc::channel();
    let mut debouncer = new_debouncer(Duration::from_millis(debounce_ms), tx)?;

    use notify::RecursiveMode;
    debouncer
        .watcher()
        .watch(root.as_ref(), RecursiveMode::Recursive)?;

    // ── Event loop ─────────────────────────────────────────────
    while running.load(Ordering::SeqCst) {
        match rx.recv_timeout(Duration::from_millis(200)) {
            Ok(Ok(events)) => {
                for event in events {
                    if event.kind != DebouncedEventKind::Any {
                        continue;
                    }
                    if skip_path(&event.path) {
                        continue;
                    }
                    let file_event = if event.path.exists() {
                        FileEvent::Modified(event.path.clone())
                    } else {
                        FileEvent::Removed(event.path.clone())
                    };
                    watcher.submit(file_event);
                }

                if watcher.pending() > 0 {
                    match watcher.drain(&engine) {
                        Ok(applied) => {
                            eprintln!();
                            eprintln!("  {} {} change(s) applied", "update:".green(), applied);
                            print_summary(&engine);
                        }
                        Err(e) => {
                            eprintln!("  {}: {}", "update error".red(), e);
                        }
                    }
                }
            }
            Ok(Err(errs)) => {
                eprintln!("  {}: {:?}", "watch error".red(), errs);
            }
            Err(std::sync::mpsc::RecvTimeoutError::Timeout) => {
                // Normal timeout — check if we should keep running
            }
            Err(std::sync::mpsc::RecvTimeoutError::Disconnected) => {
                break;
            }
        }
    }

    eprintln!();
    super::save_snapshot(&engine, &arbor_core::GraphSnapshot::new(&root))?;
    eprintln!("  {}", "Stopped watching.".bold());
    Ok(())
}

fn print_summary(engine: &arbor_core::GraphEngine) {
    let (files, edges, issues) = engine.with_store(|store| {
        (
            store.nodes_by_kind(arbor_core::NodeKind::File).len(),
            store.edge_count(),
            store.issues().len(),
        )
    });
    eprintln!("  {} files, {} edges, {} issue(s)", files, edges, issues);
}

fn skip_path(path: &Path) -> bool {
    path.components().any(|c| {
        matches!(
            c.as_os_str().to_str(),
            Some(".git") | Some(".arbor") | Some("node_modules") | Some("target")
        )
    })
}
