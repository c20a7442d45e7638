//! Tests for file discovery: globs, excludes, size limits

use arbor_core::config::IndexConfig;
use arbor_core::discover_files;
use std::fs;
use tempfile::TempDir;

const EXTENSIONS: &[&str] = &[".ts", ".py", ".rs"];

fn names(files: &[std::path::PathBuf]) -> Vec<String> {
    files
        .iter()
        .filter_map(|f| f.file_name().and_then(|n| n.to_str()).map(String::from))
        .collect()
}

#[test]
fn test_discovers_supported_extensions_only() {
    let dir = TempDir::new().unwrap();
    let root = dir.path();
    fs::write(root.join("a.ts"), "x").unwrap();
    fs::write(root.join("b.py"), "x").unwrap();
    fs::write(root.join("c.txt"), "x").unwrap();

    let files = discover_files(root, EXTENSIONS, &IndexConfig::default()).unwrap();
    let names = names(&files);
    assert!(names.contains(&"a.ts".to_string()));
    assert!(names.contains(&"b.py".to_string()));
    assert!(!names.contains(&"c.txt".to_string()));
}

#[test]
fn test_default_excludes_apply() {
    let dir = TempDir::new().unwrap();
    let root = dir.path();
    fs::create_dir_all(root.join("node_modules/pkg")).unwrap();
    fs::create_dir_all(root.join("src")).unwrap();
    fs::write(root.join("node_modules/pkg/index.ts"), "x").unwrap();
    fs::write(root.join("src/a.ts"), "x").unwrap();

    let files = discover_files(root, EXTENSIONS, &IndexConfig::default()).unwrap();
    assert_eq!(names(&files), vec!["a.ts".to_string()]);
}

#[test]
fn test_max_file_size_cutoff() {
    let dir = TempDir::new().unwrap();
    let root = dir.path();
    fs::write(root.join("small.ts"), "ok").unwrap();
    fs::write(root.join("big.ts"), "x".repeat(4096)).unwrap();

    let config = IndexConfig {
        max_file_size: 1024,
        ..IndexConfig::default()
    };
    let files = discover_files(root, EXTENSIONS, &config).unwrap();
    assert_eq!(names(&files), vec!["small.ts".to_string()]);
}

#[test]
fn test_custom_exclude_pattern() {
    let dir = TempDir::new().unwrap();
    let root = dir.path();
    fs::create_dir_all(root.join("generated")).unwrap();
    fs::write(root.join("generated/api.ts"), "x").unwrap();
    fs::write(root.join("main.ts"), "x").unwrap();

    let mut config = IndexConfig::default();
    config.exclude.push("generated/".to_string());

    let files = discover_files(root, EXTENSIONS, &config).unwrap();
    assert_eq!(names(&files), vec!["main.ts".to_string()]);
}

#[test]
fn test_results_sorted() {
    let dir = TempDir::new().unwrap();
    let root = dir.path();
    fs::write(root.join("z.ts"), "x").unwrap();
    fs::write(root.join("a.ts"), "x").unwrap();
    fs::write(root.join("m.ts"), "x").unwrap();

    let files = discover_files(root, EXTENSIONS, &IndexConfig::default()).unwrap();
    let sorted = {
        let mut copy = files.clone();
        copy.sort();
        copy
    };
    assert_eq!(files, sorted);
}

#[test]
fn test_hidden_files_skipped() {
    let dir = TempDir::new().unwrap();
    let root = dir.path();
    fs::write(root.join(".hidden.ts"), "x").unwrap();
    fs::write(root.join("visible.ts"), "x").unwrap();

    let files = discover_files(root, EXTENSIONS, &IndexConfig::default()).unwrap();
    assert_eq!(names(&files), vec!["visible.ts".to_string()]);
}
