//! Integration tests for Squirrel
//!
//! These tests drive the trie, the reactors and manifests together against
//! real temporary directories.

#[path = "style.rs"]
mod style;

#[path = "integration/file_mirroring.rs"]
mod file_mirroring;
#[path = "integration/manifest_mirroring.rs"]
mod manifest_mirroring;
#[path = "integration/reactor_events.rs"]
mod reactor_events;

use std::fs;
use std::path::Path;

/// Routes tracing output through the test harness so it shows up for failing tests.
pub fn init_test_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("squirrel_core=debug")
        .with_test_writer()
        .try_init();
}

/// Every entry below `root` as a sorted relative path, directories ending in `/`.
pub fn layout_of(root: &Path) -> Vec<String> {
    fn walk(dir: &Path, prefix: &str, out: &mut Vec<String>) {
        for entry in fs::read_dir(dir).unwrap() {
            let entry = entry.unwrap();
            let name = format!("{prefix}{}", entry.file_name().to_string_lossy());
            if entry.path().is_dir() {
                out.push(format!("{name}/"));
                walk(&entry.path(), &format!("{name}/"), out);
            } else {
                out.push(name);
            }
        }
    }

    let mut out = Vec::new();
    walk(root, "", &mut out);
    out.sort();
    out
}
