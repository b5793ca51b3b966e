//! Building mirrors from JSON manifests

use std::fs;

use squirrel_core::reactor::test_fixtures::create_temp_mirror_dirs;
use squirrel_core::{
    FileReactor, Manifest, MirrorConfig, ReactorError, SquirrelError, TrieError,
};

use crate::{init_test_tracing, layout_of};

const MANIFEST: &str = r#"{
    "a": ["foo"],
    "ab": ["bar"],
    "abc": ["foo", "bar", "quux"],
    "ad": ["baz"]
}"#;

#[test]
fn test_manifest_builds_mirror() {
    init_test_tracing();
    let (temp_dir, root, pool) = create_temp_mirror_dirs();
    let manifest_path = temp_dir.path().join("manifest.json");
    fs::write(&manifest_path, MANIFEST).unwrap();

    let manifest = Manifest::load(&manifest_path).unwrap();
    let reactor = FileReactor::new(&MirrorConfig::new(&root).with_pool(&pool)).unwrap();
    let trie = manifest.build_trie(reactor).unwrap();

    assert_eq!(trie.len(), manifest.len());
    assert_eq!(
        layout_of(&root),
        [
            "a/", "a/b/", "a/b/bar", "a/b/c/", "a/b/c/bar", "a/b/c/foo", "a/b/c/quux", "a/d/",
            "a/d/baz", "a/foo",
        ]
    );
}

#[test]
fn test_ignored_files_survive_updates() {
    init_test_tracing();
    let (_temp_dir, root, pool) = create_temp_mirror_dirs();
    let config = MirrorConfig::new(&root)
        .with_pool(&pool)
        .with_ignore_pattern(r"\.keep");

    let manifest = Manifest::from_json_str(r#"{"a": ["foo", "bar"]}"#).unwrap();
    let mut trie = manifest
        .build_trie(FileReactor::new(&config).unwrap())
        .unwrap();

    // Anchored at the start of the name
    fs::write(root.join("a/.keep"), "").unwrap();
    fs::write(root.join("a/x.keep"), "").unwrap();

    trie.insert("a", vec!["bar".to_string()]).unwrap();

    assert_eq!(layout_of(&root), ["a/", "a/.keep", "a/bar"]);
}

#[test]
fn test_second_build_into_same_root_conflicts() {
    let (_temp_dir, root, pool) = create_temp_mirror_dirs();
    let config = MirrorConfig::new(&root).with_pool(&pool);
    let json = serde_json::json!({ "a": ["foo"], "b": [] }).to_string();
    let manifest = Manifest::from_json_str(&json).unwrap();

    manifest
        .build_trie(FileReactor::new(&config).unwrap())
        .unwrap();
    let result = manifest.build_trie(FileReactor::new(&config).unwrap());

    assert!(matches!(
        result,
        Err(SquirrelError::Trie(TrieError::Reactor(
            ReactorError::AlreadyExists { .. }
        )))
    ));
}

#[test]
fn test_invalid_ignore_pattern_is_a_user_error() {
    let (_temp_dir, root, pool) = create_temp_mirror_dirs();
    let config = MirrorConfig::new(&root)
        .with_pool(&pool)
        .with_ignore_pattern("(unclosed");

    let error = SquirrelError::from(FileReactor::new(&config).unwrap_err());

    assert!(error.is_user_error());
    assert!(error.user_message().contains("ignore pattern"));
}
