//! Trie driven mirroring of pool files into a directory hierarchy

use std::fs;
use std::path::Path;

use proptest::prelude::*;
use squirrel_core::reactor::test_fixtures::{
    POOL_FILES, create_temp_mirror_dirs, pool_file_content,
};
use squirrel_core::{FileReactor, MirrorConfig, PlacementMethod, SubTrie, Trie, TrieError};

use crate::{init_test_tracing, layout_of};

/// Checks that every file in the mirror was put there with `method`.
fn assert_placed_with(method: PlacementMethod, root: &Path, pool: &Path) {
    for relative in layout_of(root) {
        if relative.ends_with('/') {
            continue;
        }
        let placed = root.join(&relative);
        let name = placed.file_name().unwrap().to_string_lossy().into_owned();
        let source = pool.join(&name);

        let is_symlink = fs::symlink_metadata(&placed)
            .unwrap()
            .file_type()
            .is_symlink();
        if method == PlacementMethod::Symlink {
            assert!(is_symlink, "{relative} is not a symlink");
            assert_eq!(fs::read_link(&placed).unwrap(), source);
            continue;
        }

        assert!(!is_symlink, "{relative} is a symlink");
        assert_eq!(fs::read_to_string(&placed).unwrap(), pool_file_content(&name));

        // Writes through a hard link show up in the pool
        fs::write(&placed, "placeholder").unwrap();
        let pool_content = fs::read_to_string(&source).unwrap();
        if method == PlacementMethod::Hardlink {
            assert_eq!(pool_content, "placeholder", "{relative} is not a hard link");
        } else {
            assert_eq!(pool_content, pool_file_content(&name));
        }
        fs::write(&placed, pool_file_content(&name)).unwrap();
    }
}

fn mirror_smoke(method: PlacementMethod) {
    init_test_tracing();
    if !method.is_supported() {
        return;
    }

    let (_temp_dir, root, pool) = create_temp_mirror_dirs();
    let reactor = FileReactor::new(
        &MirrorConfig::new(&root)
            .with_pool(&pool)
            .with_method(method),
    )
    .unwrap();
    let mut trie = Trie::with_reactor(reactor).unwrap();
    assert!(layout_of(&root).is_empty());

    trie.insert("a", vec!["foo"]).unwrap();
    assert_eq!(layout_of(&root), ["a/", "a/foo"]);
    assert_placed_with(method, &root, &pool);

    trie.insert("ab", vec!["bar"]).unwrap();
    assert_eq!(layout_of(&root), ["a/", "a/b/", "a/b/bar", "a/foo"]);

    trie.insert("abc", vec!["foo", "bar", "quux"]).unwrap();
    assert_eq!(
        layout_of(&root),
        [
            "a/", "a/b/", "a/b/bar", "a/b/c/", "a/b/c/bar", "a/b/c/foo", "a/b/c/quux", "a/foo",
        ]
    );
    assert_placed_with(method, &root, &pool);

    trie.insert("ad", vec!["baz"]).unwrap();
    trie.insert("abc", vec!["bar", "baz"]).unwrap();
    assert_eq!(
        layout_of(&root),
        [
            "a/", "a/b/", "a/b/bar", "a/b/c/", "a/b/c/bar", "a/b/c/baz", "a/d/", "a/d/baz",
            "a/foo",
        ]
    );
    assert_placed_with(method, &root, &pool);

    assert_eq!(trie.remove("a").unwrap(), vec!["foo"]);
    assert_eq!(
        layout_of(&root),
        ["a/", "a/b/", "a/b/bar", "a/b/c/", "a/b/c/bar", "a/b/c/baz", "a/d/", "a/d/baz"]
    );

    trie.remove("ad").unwrap();
    assert_eq!(
        layout_of(&root),
        ["ab/", "ab/bar", "ab/c/", "ab/c/bar", "ab/c/baz"]
    );
    assert_placed_with(method, &root, &pool);

    assert_eq!(trie.len(), 2);
    assert_eq!(trie.node_count(), 3);
}

#[test]
fn test_copy_mirror_smoke() {
    mirror_smoke(PlacementMethod::Copy);
}

#[test]
fn test_hardlink_mirror_smoke() {
    mirror_smoke(PlacementMethod::Hardlink);
}

#[test]
fn test_symlink_mirror_smoke() {
    mirror_smoke(PlacementMethod::Symlink);
}

#[test]
fn test_split_moves_existing_directory() {
    init_test_tracing();
    let (_temp_dir, root, pool) = create_temp_mirror_dirs();
    let reactor = FileReactor::new(&MirrorConfig::new(&root).with_pool(&pool)).unwrap();
    let mut trie = Trie::with_reactor(reactor).unwrap();

    trie.insert("foobar", vec!["foo"]).unwrap();
    trie.insert("foobaz", vec!["baz"]).unwrap();
    assert_eq!(
        layout_of(&root),
        ["fooba/", "fooba/r/", "fooba/r/foo", "fooba/z/", "fooba/z/baz"]
    );

    trie.insert("foo", vec!["quux"]).unwrap();
    assert_eq!(
        layout_of(&root),
        [
            "foo/", "foo/ba/", "foo/ba/r/", "foo/ba/r/foo", "foo/ba/z/", "foo/ba/z/baz",
            "foo/quux",
        ]
    );

    trie.remove("foobaz").unwrap();
    assert_eq!(layout_of(&root), ["foo/", "foo/bar/", "foo/bar/foo", "foo/quux"]);
}

#[test]
fn test_emptied_trie_leaves_empty_root() {
    let (_temp_dir, root, pool) = create_temp_mirror_dirs();
    let reactor = FileReactor::new(&MirrorConfig::new(&root).with_pool(&pool)).unwrap();
    let mut trie = Trie::with_reactor(reactor).unwrap();

    trie.insert("", vec!["foo"]).unwrap();
    trie.insert("x", vec!["bar"]).unwrap();
    assert_eq!(layout_of(&root), ["foo", "x/", "x/bar"]);

    trie.remove("x").unwrap();
    trie.remove("").unwrap();

    assert!(layout_of(&root).is_empty());
    assert!(root.is_dir());
    assert!(trie.is_empty());
}

/// Layout the mirror of `node` must have, in `layout_of` form.
fn expected_layout(node: SubTrie<'_, Vec<String>>, prefix: &str, out: &mut Vec<String>) {
    for name in node.value().into_iter().flatten() {
        out.push(format!("{prefix}{name}"));
    }
    for child in node.children() {
        let dir = format!("{prefix}{}/", child.suffix());
        out.push(dir.clone());
        expected_layout(child, &dir, out);
    }
}

#[derive(Debug, Clone)]
enum Op {
    Insert(String, Vec<String>),
    Remove(String),
}

fn op_strategy() -> impl Strategy<Value = Op> {
    let key = "[ab]{0,4}";
    let files = proptest::sample::subsequence(POOL_FILES.to_vec(), 0..=POOL_FILES.len())
        .prop_map(|names| names.into_iter().map(String::from).collect::<Vec<_>>());
    prop_oneof![
        3 => (key, files).prop_map(|(key, files)| Op::Insert(key, files)),
        2 => key.prop_map(Op::Remove),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn prop_mirror_follows_trie(ops in proptest::collection::vec(op_strategy(), 1..24)) {
        let (_temp_dir, root, pool) = create_temp_mirror_dirs();
        let reactor = FileReactor::new(&MirrorConfig::new(&root).with_pool(&pool)).unwrap();
        let mut trie = Trie::with_reactor(reactor).unwrap();

        for op in ops {
            match op {
                Op::Insert(key, files) => {
                    trie.insert(&key, files).unwrap();
                }
                Op::Remove(key) => match trie.remove(&key) {
                    Ok(_) | Err(TrieError::KeyNotFound { .. }) => {}
                    Err(e) => panic!("Removing {key:?} failed: {e}"),
                },
            }

            let mut expected = Vec::new();
            expected_layout(trie.root(), "", &mut expected);
            expected.sort();
            prop_assert_eq!(layout_of(&root), expected);
        }
    }
}
