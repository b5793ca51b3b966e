//! JSON manifests describing which files live under which key.
//!
//! A manifest is a single JSON object mapping keys to lists of file names:
//!
//! ```json
//! { "a": ["foo"], "ab": ["bar"], "abc": ["foo", "bar", "quux"] }
//! ```

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::reactor::Reactor;
use crate::trie::Trie;
use crate::{Result, SquirrelError};

/// Keys and the files stored under them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Manifest {
    entries: BTreeMap<String, Vec<String>>,
}

impl Manifest {
    /// Parses a manifest from JSON text.
    ///
    /// # Errors
    ///
    /// - `SquirrelError::Manifest` - If the text is not a JSON object of string lists
    pub fn from_json_str(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| SquirrelError::Manifest {
            reason: e.to_string(),
        })
    }

    /// Reads and parses a manifest file.
    ///
    /// # Errors
    ///
    /// - `SquirrelError::Io` - If the file cannot be read
    /// - `SquirrelError::Manifest` - If the content is not a valid manifest
    pub fn load(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        tracing::debug!(path = %path.display(), "Loaded manifest");
        Self::from_json_str(&json)
    }

    pub fn insert(&mut self, key: impl Into<String>, files: Vec<String>) -> Option<Vec<String>> {
        self.entries.insert(key.into(), files)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.entries
            .iter()
            .map(|(key, files)| (key.as_str(), files.as_slice()))
    }

    /// Builds a trie holding every entry, reporting to `reactor`.
    ///
    /// Entries are inserted in key order, so the reactor sees the same
    /// sequence of changes on every run.
    ///
    /// # Errors
    ///
    /// - `SquirrelError::Trie` - If the reactor rejects a change
    pub fn build_trie<R: Reactor<Vec<String>>>(&self, reactor: R) -> Result<Trie<Vec<String>, R>> {
        let mut trie = Trie::with_reactor(reactor)?;
        for (key, files) in &self.entries {
            trie.insert(key, files.clone())?;
        }
        Ok(trie)
    }
}

impl FromIterator<(String, Vec<String>)> for Manifest {
    fn from_iter<I: IntoIterator<Item = (String, Vec<String>)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reactor::EmptyReactor;

    #[test]
    fn test_parse_manifest() {
        let manifest = Manifest::from_json_str(r#"{"ab": ["bar"], "a": ["foo"]}"#).unwrap();

        let entries: Vec<(&str, &[String])> = manifest.entries().collect();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].0, "a");
        assert_eq!(entries[1].1, ["bar".to_string()]);
    }

    #[test]
    fn test_reject_malformed_manifest() {
        for json in [r#"["a"]"#, r#"{"a": "foo"}"#, "{"] {
            match Manifest::from_json_str(json) {
                Err(SquirrelError::Manifest { .. }) => {}
                other => panic!("Expected manifest error for {json}, got {other:?}"),
            }
        }
    }

    #[test]
    fn test_build_trie() {
        let manifest: Manifest = [
            ("foo".to_string(), vec!["a".to_string()]),
            ("foobar".to_string(), vec!["b".to_string()]),
        ]
        .into_iter()
        .collect();

        let trie = manifest.build_trie(EmptyReactor).unwrap();

        assert_eq!(trie.len(), 2);
        assert_eq!(trie.get("foobar"), Some(&vec!["b".to_string()]));
    }

    #[test]
    fn test_load_missing_file() {
        let result = Manifest::load(Path::new("/nonexistent/manifest.json"));
        assert!(matches!(result, Err(SquirrelError::Io(_))));
    }
}
