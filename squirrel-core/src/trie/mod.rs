//! Compressed prefix tree reporting its changes to a reactor.
//!
//! Every node stores the part of the key it adds to its parent (its suffix).
//! Nodes are split when a new key diverges inside a suffix and merged back
//! when removals leave a node without a value and with a single child.
//!
//! ```
//! use squirrel_core::Trie;
//!
//! let mut trie = Trie::new();
//! trie.insert("foo", 1).unwrap();
//! trie.insert("foobar", 2).unwrap();
//!
//! assert_eq!(trie.get("foobar"), Some(&2));
//! assert_eq!(trie.get("foob"), None);
//!
//! let foo = trie.subtrie("foo").unwrap();
//! assert_eq!(foo.chain(), ["", "foo"]);
//! assert!(!foo.is_terminal());
//! ```

mod iter;
mod node;
mod view;

pub use iter::{Iter, Keys};
pub use view::SubTrie;

use node::Node;

use crate::reactor::{EmptyReactor, Reactor, ReactorError};

/// Chain of the root node.
static ROOT_CHAIN: [String; 1] = [String::new()];

/// Errors returned by trie operations.
#[derive(Debug, thiserror::Error)]
pub enum TrieError {
    /// No value is stored under the key
    #[error("Key {key:?} not found")]
    KeyNotFound {
        /// Key that was looked up
        key: String,
    },

    /// The reactor rejected a change; the trie itself has been updated
    #[error("Reactor error: {0}")]
    Reactor(#[from] ReactorError),
}

/// Radix trie with string keys.
///
/// Mutations report every created, filled, emptied, moved and removed node to
/// the reactor `R`. The tree is rebuilt completely before the first callback
/// fires; when a callback fails, the change stays applied and the error is
/// returned.
#[derive(Debug)]
pub struct Trie<V, R = EmptyReactor> {
    root: Node<V>,
    reactor: R,
    len: usize,
}

impl<V> Trie<V> {
    /// Creates an empty trie that reports to nobody.
    pub fn new() -> Self {
        Self {
            root: Node::root(),
            reactor: EmptyReactor,
            len: 0,
        }
    }
}

impl<V> Default for Trie<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V, R: Reactor<V>> Trie<V, R> {
    /// Creates an empty trie reporting to `reactor`.
    ///
    /// The reactor is told about the root node straight away.
    ///
    /// # Errors
    ///
    /// - `TrieError::Reactor` - If the reactor rejects the root node
    pub fn with_reactor(mut reactor: R) -> Result<Self, TrieError> {
        reactor.created(&ROOT_CHAIN)?;
        Ok(Self {
            root: Node::root(),
            reactor,
            len: 0,
        })
    }

    /// Stores `value` under `key`, returning the value it replaces.
    ///
    /// # Errors
    ///
    /// - `TrieError::Reactor` - If the reactor rejects one of the changes
    pub fn insert(&mut self, key: &str, value: V) -> Result<Option<V>, TrieError> {
        let mut changes = Vec::new();
        let previous = self.root.insert(&ROOT_CHAIN, key, value, &mut changes);
        if previous.is_none() {
            self.len += 1;
        }

        let stored = self.root.find(key).and_then(|node| node.content.as_ref());
        for change in &changes {
            change.notify(stored, &mut self.reactor)?;
        }
        Ok(previous)
    }

    /// Removes and returns the value stored under `key`.
    ///
    /// Nodes left without a value are dropped or merged into their only
    /// child; the root always stays.
    ///
    /// # Errors
    ///
    /// - `TrieError::KeyNotFound` - If no value is stored under `key`
    /// - `TrieError::Reactor` - If the reactor rejects one of the changes
    pub fn remove(&mut self, key: &str) -> Result<V, TrieError> {
        let mut changes = Vec::new();
        let (chain, value) = self
            .root
            .take(&ROOT_CHAIN, key, &mut changes)
            .ok_or_else(|| TrieError::KeyNotFound {
                key: key.to_string(),
            })?;
        self.len -= 1;

        self.reactor.deleted(&chain, &value)?;
        for change in &changes {
            change.notify(None, &mut self.reactor)?;
        }
        Ok(value)
    }
}

impl<V, R> Trie<V, R> {
    /// Chain of the root: a single empty suffix.
    pub fn chain(&self) -> &[String] {
        &ROOT_CHAIN
    }

    /// True when no key other than possibly the empty one is stored.
    pub fn is_terminal(&self) -> bool {
        self.root.is_terminal()
    }

    /// True when a value is stored under the empty key.
    pub fn has_content(&self) -> bool {
        self.root.content.is_some()
    }

    pub fn get(&self, key: &str) -> Option<&V> {
        self.root.find(key)?.content.as_ref()
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// View of the root node.
    pub fn root(&self) -> SubTrie<'_, V> {
        SubTrie::new(ROOT_CHAIN.to_vec(), &self.root)
    }

    /// View of the root's child whose suffix is exactly `suffix`.
    pub fn subtrie(&self, suffix: &str) -> Option<SubTrie<'_, V>> {
        self.root().subtrie(suffix)
    }

    /// Number of stored values.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Number of nodes, the root included.
    pub fn node_count(&self) -> usize {
        self.root.node_count()
    }

    /// Entries in lexicographic key order.
    pub fn iter(&self) -> Iter<'_, V> {
        Iter::new(&self.root)
    }

    /// Keys in lexicographic order.
    pub fn keys(&self) -> Keys<'_, V> {
        Keys::new(self.iter())
    }

    pub fn reactor(&self) -> &R {
        &self.reactor
    }

    pub fn reactor_mut(&mut self) -> &mut R {
        &mut self.reactor
    }

    pub fn into_reactor(self) -> R {
        self.reactor
    }
}

impl<'a, V, R> IntoIterator for &'a Trie<V, R> {
    type Item = (String, &'a V);
    type IntoIter = Iter<'a, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
