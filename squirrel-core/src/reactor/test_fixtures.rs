//! Test fixtures for reactor testing.
//!
//! Provides a mirror root and a populated pool directory so filesystem
//! reactors can be exercised against real files.

/// Files present in every fixture pool.
pub const POOL_FILES: [&str; 4] = ["foo", "bar", "baz", "quux"];

// Type alias for complex return type
type TempMirrorDirs = (tempfile::TempDir, std::path::PathBuf, std::path::PathBuf);

/// Expected content of a pool file created by [`create_temp_mirror_dirs`].
pub fn pool_file_content(name: &str) -> String {
    format!("content of {name}\n")
}

/// Creates an empty mirror root and a pool holding [`POOL_FILES`].
///
/// # Panics
///
/// Panics if temporary directory creation fails or if pool files cannot be written.
/// This is acceptable in test fixtures where failures indicate environment issues.
pub fn create_temp_mirror_dirs() -> TempMirrorDirs {
    let temp_dir = tempfile::tempdir().unwrap();
    let root_dir = temp_dir.path().join("root");
    let pool_dir = temp_dir.path().join("pool");

    std::fs::create_dir_all(&root_dir).unwrap();
    std::fs::create_dir_all(&pool_dir).unwrap();

    for name in POOL_FILES {
        std::fs::write(pool_dir.join(name), pool_file_content(name)).unwrap();
    }

    (temp_dir, root_dir, pool_dir)
}

/// Builds an owned chain from string slices.
pub fn chain_of(parts: &[&str]) -> Vec<String> {
    parts.iter().map(|part| part.to_string()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_temp_mirror_dirs() {
        let (_temp_dir, root, pool) = create_temp_mirror_dirs();

        assert!(root.is_dir());
        assert!(pool.is_dir());
        assert_eq!(std::fs::read_dir(&root).unwrap().count(), 0);
        assert_eq!(
            std::fs::read_to_string(pool.join("baz")).unwrap(),
            "content of baz\n"
        );
    }
}
