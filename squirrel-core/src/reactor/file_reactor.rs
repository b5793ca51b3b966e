//! Reactor keeping a directory hierarchy in sync with a trie.
//!
//! Values are lists of file names. Every trie node is a directory below the
//! mirror root and the files of its value are put there from the pool
//! directory by copying, hard linking or symlinking.

use std::collections::HashSet;
use std::fs;
use std::io;
use std::path::{Component, Path, PathBuf};

use regex::Regex;
use tracing::{debug, trace};

use super::{Reactor, ReactorError};
use crate::config::{MirrorConfig, PlacementMethod};

/// Filesystem mirror of a trie holding lists of file names.
#[derive(Debug)]
pub struct FileReactor {
    root: PathBuf,
    pool: PathBuf,
    method: PlacementMethod,
    ignore: Option<Regex>,
}

impl FileReactor {
    /// Creates a reactor from a validated mirror configuration.
    ///
    /// # Errors
    ///
    /// - `ReactorError::UnsupportedMethod` - If the platform cannot place files that way
    /// - `ReactorError::NotADirectory` - If root or pool is not a directory
    /// - `ReactorError::NotWritable` - If root cannot be written to
    /// - `ReactorError::InvalidIgnorePattern` - If the ignore regex does not compile
    pub fn new(config: &MirrorConfig) -> Result<Self, ReactorError> {
        if !config.method.is_supported() {
            return Err(ReactorError::UnsupportedMethod {
                method: config.method,
            });
        }

        let root = config.root_dir.clone();
        if !root.is_dir() {
            return Err(ReactorError::NotADirectory { path: root });
        }
        // Mode bits say nothing about mounts or the effective user
        match tempfile::tempfile_in(&root) {
            Ok(_) => {}
            Err(e)
                if matches!(
                    e.kind(),
                    io::ErrorKind::PermissionDenied | io::ErrorKind::ReadOnlyFilesystem
                ) =>
            {
                return Err(ReactorError::NotWritable { path: root });
            }
            Err(e) => return Err(ReactorError::io_at(&root)(e)),
        }

        let pool = config.pool_dir.clone();
        if !pool.is_dir() {
            return Err(ReactorError::NotADirectory { path: pool });
        }

        // Anchored at the start of the name only, like a prefix match.
        let ignore = config
            .ignore_pattern
            .as_deref()
            .map(|pattern| Regex::new(&format!("^(?:{pattern})")))
            .transpose()?;

        debug!(
            root = %root.display(),
            pool = %pool.display(),
            method = %config.method,
            "File reactor ready"
        );

        Ok(Self {
            root,
            pool,
            method: config.method,
            ignore,
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn pool(&self) -> &Path {
        &self.pool
    }

    pub fn method(&self) -> PlacementMethod {
        self.method
    }

    /// Directory mirroring the node at `chain`.
    ///
    /// # Errors
    ///
    /// - `ReactorError::InvalidKey` - If a suffix is not usable as a directory name
    pub fn node_path(&self, chain: &[String]) -> Result<PathBuf, ReactorError> {
        let mut path = self.root.clone();
        for suffix in chain.iter().filter(|suffix| !suffix.is_empty()) {
            path.push(checked_suffix(suffix)?);
        }
        Ok(path)
    }

    fn is_ignored(&self, name: &str) -> bool {
        self.ignore.as_ref().is_some_and(|regex| regex.is_match(name))
    }

    fn place(&self, src: &Path, dst: &Path) -> io::Result<()> {
        match self.method {
            PlacementMethod::Copy => fs::copy(src, dst).map(|_| ()),
            PlacementMethod::Hardlink => fs::hard_link(src, dst),
            PlacementMethod::Symlink => symlink(src, dst),
        }
    }
}

#[cfg(unix)]
fn symlink(src: &Path, dst: &Path) -> io::Result<()> {
    std::os::unix::fs::symlink(src, dst)
}

#[cfg(windows)]
fn symlink(src: &Path, dst: &Path) -> io::Result<()> {
    std::os::windows::fs::symlink_file(src, dst)
}

#[cfg(not(any(unix, windows)))]
fn symlink(_src: &Path, _dst: &Path) -> io::Result<()> {
    Err(io::Error::new(
        io::ErrorKind::Unsupported,
        "symbolic links are not supported",
    ))
}

/// Present on disk, without following symlinks.
fn is_present(path: &Path) -> bool {
    fs::symlink_metadata(path).is_ok()
}

/// A single normal path component without separators, so joining it never
/// leaves the directory it is joined to.
fn is_plain_name(name: &str) -> bool {
    if name.contains(std::path::is_separator) {
        return false;
    }
    let mut components = Path::new(name).components();
    matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(_)), None)
    )
}

fn checked_file_name(name: &str) -> Result<&str, ReactorError> {
    if is_plain_name(name) {
        Ok(name)
    } else {
        Err(ReactorError::InvalidFileName {
            name: name.to_string(),
        })
    }
}

fn checked_suffix(suffix: &str) -> Result<&str, ReactorError> {
    if is_plain_name(suffix) {
        Ok(suffix)
    } else {
        Err(ReactorError::InvalidKey {
            suffix: suffix.to_string(),
        })
    }
}

impl<T: AsRef<str>> Reactor<Vec<T>> for FileReactor {
    fn created(&mut self, chain: &[String]) -> Result<(), ReactorError> {
        if chain.iter().all(|suffix| suffix.is_empty()) {
            // The root directory already exists
            return Ok(());
        }

        let path = self.node_path(chain)?;
        if is_present(&path) {
            return Err(ReactorError::AlreadyExists { path });
        }
        fs::create_dir(&path).map_err(ReactorError::io_at(&path))?;
        debug!(path = %path.display(), "Created directory");
        Ok(())
    }

    fn inserted(&mut self, chain: &[String], files: &Vec<T>) -> Result<(), ReactorError> {
        let dir = self.node_path(chain)?;
        let names = files
            .iter()
            .map(|name| checked_file_name(name.as_ref()))
            .collect::<Result<Vec<_>, _>>()?;

        for &name in &names {
            let dst = dir.join(name);
            if dst.is_dir() {
                return Err(ReactorError::AlreadyExists { path: dst });
            }
            if is_present(&dst) {
                trace!(path = %dst.display(), "Already in place");
                continue;
            }

            let src = self.pool.join(name);
            self.place(&src, &dst).map_err(ReactorError::io_at(&dst))?;
            debug!(
                src = %src.display(),
                dst = %dst.display(),
                method = %self.method,
                "Placed file"
            );
        }

        // Drop files left over from the previous value
        let needed: HashSet<&str> = names.into_iter().collect();
        for entry in fs::read_dir(&dir).map_err(ReactorError::io_at(&dir))? {
            let entry = entry.map_err(ReactorError::io_at(&dir))?;
            let path = entry.path();
            let file_type = entry.file_type().map_err(ReactorError::io_at(&path))?;
            if file_type.is_dir() {
                continue;
            }

            let file_name = entry.file_name();
            let Some(name) = file_name.to_str() else {
                continue;
            };
            if needed.contains(name) || self.is_ignored(name) {
                continue;
            }

            fs::remove_file(&path).map_err(ReactorError::io_at(&path))?;
            debug!(path = %path.display(), "Removed stale file");
        }

        Ok(())
    }

    fn deleted(&mut self, chain: &[String], files: &Vec<T>) -> Result<(), ReactorError> {
        let dir = self.node_path(chain)?;
        for name in files {
            let path = dir.join(checked_file_name(name.as_ref())?);
            if !is_present(&path) {
                return Err(ReactorError::Missing { path });
            }
            fs::remove_file(&path).map_err(ReactorError::io_at(&path))?;
            debug!(path = %path.display(), "Deleted file");
        }
        Ok(())
    }

    fn removed(&mut self, chain: &[String]) -> Result<(), ReactorError> {
        let path = self.node_path(chain)?;
        if !path.is_dir() {
            return Err(ReactorError::Missing { path });
        }
        fs::remove_dir_all(&path).map_err(ReactorError::io_at(&path))?;
        debug!(path = %path.display(), "Removed directory");
        Ok(())
    }

    fn moved(
        &mut self,
        old_chain: &[String],
        old_key: &str,
        new_chain: &[String],
        new_key: &str,
    ) -> Result<(), ReactorError> {
        let src = self.node_path(old_chain)?.join(checked_suffix(old_key)?);
        let dst = self.node_path(new_chain)?.join(checked_suffix(new_key)?);
        if !is_present(&src) {
            return Err(ReactorError::Missing { path: src });
        }
        if is_present(&dst) {
            return Err(ReactorError::AlreadyExists { path: dst });
        }
        fs::rename(&src, &dst).map_err(ReactorError::io_at(&dst))?;
        debug!(src = %src.display(), dst = %dst.display(), "Moved directory");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::os::unix::fs::PermissionsExt;

    use super::*;
    use crate::reactor::test_fixtures::{chain_of, create_temp_mirror_dirs, pool_file_content};

    fn reactor_for(root: &Path, pool: &Path, method: PlacementMethod) -> FileReactor {
        FileReactor::new(
            &MirrorConfig::new(root)
                .with_pool(pool)
                .with_method(method),
        )
        .unwrap()
    }

    fn names_in(dir: &Path) -> Vec<String> {
        let mut names: Vec<String> = fs::read_dir(dir)
            .unwrap()
            .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        names
    }

    #[test]
    fn test_root_creation_is_a_no_op() {
        let (_temp_dir, root, pool) = create_temp_mirror_dirs();
        let mut reactor = reactor_for(&root, &pool, PlacementMethod::Copy);

        Reactor::<Vec<String>>::created(&mut reactor, &chain_of(&[""])).unwrap();

        assert!(names_in(&root).is_empty());
    }

    #[test]
    fn test_create_existing_directory_fails() {
        let (_temp_dir, root, pool) = create_temp_mirror_dirs();
        fs::create_dir(root.join("a")).unwrap();
        let mut reactor = reactor_for(&root, &pool, PlacementMethod::Copy);

        let result = Reactor::<Vec<String>>::created(&mut reactor, &chain_of(&["", "a"]));

        match result {
            Err(ReactorError::AlreadyExists { path }) => assert_eq!(path, root.join("a")),
            other => panic!("Expected AlreadyExists, got {other:?}"),
        }
    }

    #[test]
    fn test_insert_copies_and_cleans_up() {
        let (_temp_dir, root, pool) = create_temp_mirror_dirs();
        let mut reactor = reactor_for(&root, &pool, PlacementMethod::Copy);
        let chain = chain_of(&["", "a"]);

        Reactor::<Vec<&str>>::created(&mut reactor, &chain).unwrap();
        reactor.inserted(&chain, &vec!["foo", "bar"]).unwrap();
        assert_eq!(names_in(&root.join("a")), vec!["bar", "foo"]);
        assert_eq!(
            fs::read_to_string(root.join("a/foo")).unwrap(),
            pool_file_content("foo")
        );

        reactor.inserted(&chain, &vec!["bar", "baz"]).unwrap();
        assert_eq!(names_in(&root.join("a")), vec!["bar", "baz"]);
    }

    #[test]
    fn test_insert_keeps_ignored_files() {
        let (_temp_dir, root, pool) = create_temp_mirror_dirs();
        let mut reactor = FileReactor::new(
            &MirrorConfig::new(&root)
                .with_pool(&pool)
                .with_ignore_pattern("gophermap"),
        )
        .unwrap();
        fs::write(root.join("gophermap"), "i hello\n").unwrap();
        fs::write(root.join("stale"), "old").unwrap();

        reactor.inserted(&chain_of(&[""]), &vec!["quux"]).unwrap();

        assert_eq!(names_in(&root), vec!["gophermap", "quux"]);
    }

    #[test]
    fn test_ignore_pattern_matches_name_start_only() {
        let (_temp_dir, root, pool) = create_temp_mirror_dirs();
        let reactor = FileReactor::new(
            &MirrorConfig::new(&root)
                .with_pool(&pool)
                .with_ignore_pattern("map"),
        )
        .unwrap();

        assert!(reactor.is_ignored("mapping"));
        assert!(!reactor.is_ignored("gophermap"));
    }

    #[test]
    fn test_insert_rejects_path_like_names() {
        let (_temp_dir, root, pool) = create_temp_mirror_dirs();
        let mut reactor = reactor_for(&root, &pool, PlacementMethod::Copy);

        for name in ["../foo", "a/b", "", "."] {
            let result = reactor.inserted(&chain_of(&[""]), &vec![name]);
            assert!(
                matches!(result, Err(ReactorError::InvalidFileName { .. })),
                "{name:?} was accepted"
            );
        }
    }

    #[test]
    fn test_insert_name_clashing_with_child_directory() {
        let (_temp_dir, root, pool) = create_temp_mirror_dirs();
        fs::create_dir(root.join("foo")).unwrap();
        let mut reactor = reactor_for(&root, &pool, PlacementMethod::Copy);

        let result = reactor.inserted(&chain_of(&[""]), &vec!["foo"]);

        assert!(matches!(result, Err(ReactorError::AlreadyExists { .. })));
    }

    #[test]
    fn test_insert_missing_pool_file() {
        let (_temp_dir, root, pool) = create_temp_mirror_dirs();
        let mut reactor = reactor_for(&root, &pool, PlacementMethod::Copy);

        let result = reactor.inserted(&chain_of(&[""]), &vec!["nonexistent"]);

        match result {
            Err(ReactorError::Io { path, source }) => {
                assert_eq!(path, root.join("nonexistent"));
                assert_eq!(source.kind(), io::ErrorKind::NotFound);
            }
            other => panic!("Expected Io error, got {other:?}"),
        }
    }

    #[test]
    fn test_delete_missing_file_fails() {
        let (_temp_dir, root, pool) = create_temp_mirror_dirs();
        let mut reactor = reactor_for(&root, &pool, PlacementMethod::Copy);

        let result = reactor.deleted(&chain_of(&[""]), &vec!["foo"]);

        assert!(matches!(result, Err(ReactorError::Missing { .. })));
    }

    #[test]
    fn test_remove_and_move_directories() {
        let (_temp_dir, root, pool) = create_temp_mirror_dirs();
        let mut reactor = reactor_for(&root, &pool, PlacementMethod::Copy);
        fs::create_dir_all(root.join("a/b/c")).unwrap();
        fs::create_dir_all(root.join("a/d")).unwrap();

        Reactor::<Vec<String>>::removed(&mut reactor, &chain_of(&["", "a", "d"])).unwrap();
        Reactor::<Vec<String>>::moved(
            &mut reactor,
            &chain_of(&["", "a"]),
            "b",
            &chain_of(&[""]),
            "ab",
        )
        .unwrap();
        Reactor::<Vec<String>>::removed(&mut reactor, &chain_of(&["", "a"])).unwrap();

        assert_eq!(names_in(&root), vec!["ab"]);
        assert!(root.join("ab/c").is_dir());
    }

    #[test]
    fn test_remove_missing_directory_fails() {
        let (_temp_dir, root, pool) = create_temp_mirror_dirs();
        let mut reactor = reactor_for(&root, &pool, PlacementMethod::Copy);

        let result = Reactor::<Vec<String>>::removed(&mut reactor, &chain_of(&["", "zz"]));

        assert!(matches!(result, Err(ReactorError::Missing { .. })));
    }

    #[test]
    fn test_improper_root() {
        let (_temp_dir, root, pool) = create_temp_mirror_dirs();

        let missing = FileReactor::new(&MirrorConfig::new(root.join("quux")).with_pool(&pool));
        match missing {
            Err(error @ ReactorError::NotADirectory { .. }) => {
                assert!(error.to_string().ends_with("quux is not a directory"));
            }
            other => panic!("Expected NotADirectory, got {other:?}"),
        }

        let error = ReactorError::NotWritable {
            path: root.join("foobar"),
        };
        assert!(error.to_string().ends_with("foobar is not writable"));
    }

    #[test]
    fn test_pool_must_be_directory() {
        let (_temp_dir, root, pool) = create_temp_mirror_dirs();
        let file_pool = pool.join("barbaz");
        fs::write(&file_pool, "").unwrap();

        let result = FileReactor::new(&MirrorConfig::new(&root).with_pool(&file_pool));

        match result {
            Err(error @ ReactorError::NotADirectory { .. }) => {
                assert!(error.to_string().ends_with("barbaz is not a directory"));
            }
            other => panic!("Expected NotADirectory, got {other:?}"),
        }
    }

    #[test]
    fn test_invalid_ignore_pattern() {
        let (_temp_dir, root, pool) = create_temp_mirror_dirs();

        let result = FileReactor::new(
            &MirrorConfig::new(&root)
                .with_pool(&pool)
                .with_ignore_pattern("(unclosed"),
        );

        assert!(matches!(result, Err(ReactorError::InvalidIgnorePattern(_))));
    }

    #[test]
    fn test_node_path_skips_root_suffix() {
        let (_temp_dir, root, pool) = create_temp_mirror_dirs();
        let reactor = reactor_for(&root, &pool, PlacementMethod::Copy);

        assert_eq!(reactor.node_path(&chain_of(&[""])).unwrap(), root);
        assert_eq!(
            reactor.node_path(&chain_of(&["", "foo", "bar"])).unwrap(),
            root.join("foo").join("bar")
        );
    }

    #[test]
    fn test_suffixes_leaving_the_root_are_rejected() {
        let (_temp_dir, root, pool) = create_temp_mirror_dirs();
        let mut reactor = reactor_for(&root, &pool, PlacementMethod::Copy);
        let outside = root.parent().unwrap().to_path_buf();
        fs::write(outside.join("victim"), "keep me").unwrap();

        for suffix in ["..", "../x", ".", "a/b", "/etc"] {
            let chain = chain_of(&["", suffix]);
            let created = Reactor::<Vec<&str>>::created(&mut reactor, &chain);
            let inserted = reactor.inserted(&chain, &vec!["foo"]);
            let removed = Reactor::<Vec<&str>>::removed(&mut reactor, &chain);
            let moved = Reactor::<Vec<&str>>::moved(
                &mut reactor,
                &chain_of(&[""]),
                suffix,
                &chain_of(&[""]),
                "z",
            );

            for result in [created, inserted, removed, moved] {
                assert!(
                    matches!(result, Err(ReactorError::InvalidKey { .. })),
                    "{suffix:?} was accepted: {result:?}"
                );
            }
        }

        let victim = fs::read_to_string(outside.join("victim")).unwrap();
        assert_eq!(victim, "keep me");
        assert!(!outside.join("x").exists());
        assert!(names_in(&root).is_empty());
    }

    #[test]
    fn test_unwritable_root_detected_by_writing() {
        let (_temp_dir, root, pool) = create_temp_mirror_dirs();
        let locked_root = root.join("locked");
        fs::create_dir(&locked_root).unwrap();
        fs::set_permissions(&locked_root, fs::Permissions::from_mode(0o500)).unwrap();

        // Privileged users write through mode bits
        let canary = locked_root.join("canary");
        let writable = fs::write(&canary, "").is_ok();
        let _ = fs::remove_file(&canary);
        let result = FileReactor::new(&MirrorConfig::new(&locked_root).with_pool(&pool));
        fs::set_permissions(&locked_root, fs::Permissions::from_mode(0o700)).unwrap();

        if writable {
            assert!(result.is_ok(), "{result:?}");
        } else {
            assert!(matches!(result, Err(ReactorError::NotWritable { .. })));
        }
        assert!(names_in(&locked_root).is_empty());
    }
}
