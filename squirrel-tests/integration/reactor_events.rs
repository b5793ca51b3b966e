//! Callback sequences seen by reactors attached to a trie

use std::fs;

use squirrel_core::reactor::test_fixtures::{chain_of, create_temp_mirror_dirs};
use squirrel_core::reactor::{ReactorEvent, RecordingReactor};
use squirrel_core::{
    CompositeReactor, FileReactor, MirrorConfig, Reactor, ReactorError, TracingReactor, Trie,
    TrieError,
};

use crate::{init_test_tracing, layout_of};

type Files = Vec<String>;

fn files(names: &[&str]) -> Files {
    names.iter().map(|name| name.to_string()).collect()
}

#[test]
fn test_composite_sees_mirror_changes_in_order() {
    init_test_tracing();
    let (_temp_dir, root, pool) = create_temp_mirror_dirs();
    let recorder = RecordingReactor::<Files>::new();

    let reactors: Vec<Box<dyn Reactor<Files>>> = vec![
        Box::new(FileReactor::new(&MirrorConfig::new(&root).with_pool(&pool)).unwrap()),
        Box::new(TracingReactor::default()),
        Box::new(recorder.clone()),
    ];
    let mut trie = Trie::with_reactor(CompositeReactor::new(reactors)).unwrap();
    trie.insert("ab", files(&["foo"])).unwrap();
    trie.insert("ac", files(&["bar"])).unwrap();
    trie.remove("ab").unwrap();

    assert_eq!(
        recorder.take_events(),
        vec![
            ReactorEvent::Created {
                chain: chain_of(&[""]),
            },
            ReactorEvent::Created {
                chain: chain_of(&["", "ab"]),
            },
            ReactorEvent::Inserted {
                chain: chain_of(&["", "ab"]),
                value: files(&["foo"]),
            },
            ReactorEvent::Created {
                chain: chain_of(&["", "a"]),
            },
            ReactorEvent::Moved {
                old_chain: chain_of(&[""]),
                old_key: "ab".to_string(),
                new_chain: chain_of(&["", "a"]),
                new_key: "b".to_string(),
            },
            ReactorEvent::Created {
                chain: chain_of(&["", "a", "c"]),
            },
            ReactorEvent::Inserted {
                chain: chain_of(&["", "a", "c"]),
                value: files(&["bar"]),
            },
            ReactorEvent::Deleted {
                chain: chain_of(&["", "a", "b"]),
                value: files(&["foo"]),
            },
            ReactorEvent::Removed {
                chain: chain_of(&["", "a", "b"]),
            },
            ReactorEvent::Moved {
                old_chain: chain_of(&["", "a"]),
                old_key: "c".to_string(),
                new_chain: chain_of(&[""]),
                new_key: "ac".to_string(),
            },
            ReactorEvent::Removed {
                chain: chain_of(&["", "a"]),
            },
        ]
    );
    assert_eq!(layout_of(&root), ["ac/", "ac/bar"]);
}

#[test]
fn test_mirror_conflict_keeps_trie_change() {
    init_test_tracing();
    let (_temp_dir, root, pool) = create_temp_mirror_dirs();
    fs::create_dir(root.join("ab")).unwrap();

    let reactor = FileReactor::new(&MirrorConfig::new(&root).with_pool(&pool)).unwrap();
    let mut trie = Trie::with_reactor(reactor).unwrap();

    let result = trie.insert("ab", files(&["foo"]));

    match result {
        Err(TrieError::Reactor(ReactorError::AlreadyExists { path })) => {
            assert_eq!(path, root.join("ab"));
        }
        other => panic!("Expected AlreadyExists, got {other:?}"),
    }
    assert_eq!(trie.get("ab"), Some(&files(&["foo"])));
    assert_eq!(trie.len(), 1);
}

#[test]
fn test_missing_pool_file_is_reported() {
    let (_temp_dir, root, pool) = create_temp_mirror_dirs();
    let reactor = FileReactor::new(&MirrorConfig::new(&root).with_pool(&pool)).unwrap();
    let mut trie = Trie::with_reactor(reactor).unwrap();

    let result = trie.insert("a", files(&["gnusto"]));

    match result {
        Err(TrieError::Reactor(ReactorError::Io { path, .. })) => {
            assert_eq!(path, root.join("a").join("gnusto"));
        }
        other => panic!("Expected I/O error, got {other:?}"),
    }
}

#[test]
fn test_escaping_file_names_are_rejected() {
    let (_temp_dir, root, pool) = create_temp_mirror_dirs();
    let reactor = FileReactor::new(&MirrorConfig::new(&root).with_pool(&pool)).unwrap();
    let mut trie = Trie::with_reactor(reactor).unwrap();

    for name in ["../foo", "a/foo", ".."] {
        let result = trie.insert("a", files(&[name]));
        assert!(
            matches!(
                result,
                Err(TrieError::Reactor(ReactorError::InvalidFileName { .. }))
            ),
            "{name} was accepted"
        );
    }
    assert!(!root.parent().unwrap().join("foo").exists());
}

#[test]
fn test_keys_cannot_escape_the_mirror_root() {
    init_test_tracing();
    let (temp_dir, root, pool) = create_temp_mirror_dirs();
    let victim = temp_dir.path().join("victim");
    fs::write(&victim, "keep me").unwrap();

    let reactor = FileReactor::new(&MirrorConfig::new(&root).with_pool(&pool)).unwrap();
    let mut trie = Trie::with_reactor(reactor).unwrap();

    let escaped = trie.insert("../outside", files(&["foo"]));
    assert!(matches!(
        escaped,
        Err(TrieError::Reactor(ReactorError::InvalidKey { .. }))
    ));
    assert!(!temp_dir.path().join("outside").exists());

    // The node stays in the trie, so the second insert only fires `inserted`
    for names in [["foo"], ["bar"]] {
        let result = trie.insert("..", files(&names));
        assert!(
            matches!(
                result,
                Err(TrieError::Reactor(ReactorError::InvalidKey { .. }))
            ),
            "{result:?}"
        );
    }

    assert_eq!(fs::read_to_string(&victim).unwrap(), "keep me");
    assert!(layout_of(&root).is_empty());
}
