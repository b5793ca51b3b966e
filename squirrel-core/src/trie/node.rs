//! Trie nodes and the restructuring algorithms.
//!
//! Nodes do not know their parents. Chains are built while descending and
//! every structural change is recorded as a [`Change`]; the trie replays the
//! changes to its reactor only after the tree is consistent again, so a
//! failing reactor never leaves the tree half rebuilt.

use std::collections::BTreeMap;

use tracing::trace;

use crate::reactor::{Reactor, ReactorError};

#[derive(Debug, Clone)]
pub(crate) struct Node<V> {
    pub(crate) suffix: String,
    pub(crate) content: Option<V>,
    /// Children keyed by the first character of their suffix
    pub(crate) children: BTreeMap<char, Node<V>>,
}

/// Structural change recorded while the tree is rebuilt, replayed to the
/// reactor once the tree is consistent again.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Change {
    Created(Vec<String>),
    /// The value of the operation's key landed at this chain
    Inserted(Vec<String>),
    Removed(Vec<String>),
    Moved {
        old_chain: Vec<String>,
        old_key: String,
        new_chain: Vec<String>,
        new_key: String,
    },
}

impl Change {
    /// Fires the matching callback. `inserted` is the value the operation stored.
    pub(crate) fn notify<V, R: Reactor<V> + ?Sized>(
        &self,
        inserted: Option<&V>,
        reactor: &mut R,
    ) -> Result<(), ReactorError> {
        match self {
            Change::Created(chain) => reactor.created(chain),
            Change::Inserted(chain) => match inserted {
                Some(value) => reactor.inserted(chain, value),
                None => Ok(()),
            },
            Change::Removed(chain) => reactor.removed(chain),
            Change::Moved {
                old_chain,
                old_key,
                new_chain,
                new_key,
            } => reactor.moved(old_chain, old_key, new_chain, new_key),
        }
    }
}

/// Copy of `chain` with `suffix` appended.
pub(crate) fn chain_with(chain: &[String], suffix: &str) -> Vec<String> {
    let mut extended = Vec::with_capacity(chain.len() + 1);
    extended.extend_from_slice(chain);
    extended.push(suffix.to_string());
    extended
}

/// Length in bytes of the longest common prefix, on char boundaries.
pub(crate) fn common_prefix_len(a: &str, b: &str) -> usize {
    a.char_indices()
        .zip(b.chars())
        .take_while(|((_, x), y)| x == y)
        .last()
        .map_or(0, |((offset, c), _)| offset + c.len_utf8())
}

impl<V> Node<V> {
    pub(crate) fn root() -> Self {
        Self::new(String::new(), None)
    }

    fn new(suffix: String, content: Option<V>) -> Self {
        Self {
            suffix,
            content,
            children: BTreeMap::new(),
        }
    }

    pub(crate) fn is_terminal(&self) -> bool {
        self.children.is_empty()
    }

    /// Child whose suffix equals `suffix` exactly.
    pub(crate) fn child(&self, suffix: &str) -> Option<&Node<V>> {
        let first = suffix.chars().next()?;
        self.children
            .get(&first)
            .filter(|child| child.suffix == suffix)
    }

    /// Node reached by following `rkey` from here.
    pub(crate) fn find(&self, rkey: &str) -> Option<&Node<V>> {
        let mut node = self;
        let mut rest = rkey;
        while let Some(first) = rest.chars().next() {
            let child = node.children.get(&first)?;
            rest = rest.strip_prefix(child.suffix.as_str())?;
            node = child;
        }
        Some(node)
    }

    /// Number of nodes in this subtree, this one included.
    pub(crate) fn node_count(&self) -> usize {
        1 + self.children.values().map(Node::node_count).sum::<usize>()
    }

    fn attach(&mut self, child: Node<V>) {
        if let Some(first) = child.suffix.chars().next() {
            self.children.insert(first, child);
        }
    }

    /// Stores `value` under `rkey` relative to this node.
    ///
    /// Returns the value previously stored under that key.
    pub(crate) fn insert(
        &mut self,
        chain: &[String],
        rkey: &str,
        value: V,
        changes: &mut Vec<Change>,
    ) -> Option<V> {
        let Some(first) = rkey.chars().next() else {
            changes.push(Change::Inserted(chain.to_vec()));
            return self.content.replace(value);
        };

        let Some(child) = self.children.get_mut(&first) else {
            // No child shares a prefix with the key
            trace!(chain = ?chain, suffix = rkey, "New leaf");
            let leaf_chain = chain_with(chain, rkey);
            changes.push(Change::Created(leaf_chain.clone()));
            changes.push(Change::Inserted(leaf_chain));
            self.attach(Node::new(rkey.to_string(), Some(value)));
            return None;
        };

        let common = common_prefix_len(&child.suffix, rkey);

        if common == child.suffix.len() {
            // Child suffix is a prefix of the key: descend
            let child_chain = chain_with(chain, &child.suffix);
            return child.insert(&child_chain, &rkey[common..], value, changes);
        }

        let old_key = std::mem::take(&mut child.suffix);
        let old_rest = old_key[common..].to_string();

        if common == rkey.len() {
            // Key is a proper prefix of the child suffix: new node goes between
            trace!(chain = ?chain, suffix = rkey, old_key = %old_key, "Inserting above subtree");
            let new_chain = chain_with(chain, rkey);
            changes.push(Change::Created(new_chain.clone()));
            changes.push(Change::Inserted(new_chain.clone()));
            changes.push(Change::Moved {
                old_chain: chain.to_vec(),
                old_key,
                new_chain,
                new_key: old_rest.clone(),
            });

            let mut moved = std::mem::replace(child, Node::new(rkey.to_string(), Some(value)));
            moved.suffix = old_rest;
            child.attach(moved);
            return None;
        }

        // Key and child suffix diverge: split at the common prefix
        let shared = &rkey[..common];
        let leaf_key = &rkey[common..];
        trace!(chain = ?chain, shared, old_key = %old_key, "Splitting subtree");
        let shared_chain = chain_with(chain, shared);
        let leaf_chain = chain_with(&shared_chain, leaf_key);
        changes.push(Change::Created(shared_chain.clone()));
        changes.push(Change::Moved {
            old_chain: chain.to_vec(),
            old_key,
            new_chain: shared_chain,
            new_key: old_rest.clone(),
        });
        changes.push(Change::Created(leaf_chain.clone()));
        changes.push(Change::Inserted(leaf_chain));

        let mut moved = std::mem::replace(child, Node::new(shared.to_string(), None));
        moved.suffix = old_rest;
        child.attach(moved);
        child.attach(Node::new(leaf_key.to_string(), Some(value)));
        None
    }

    /// Takes the value stored under `rkey` relative to this node and compacts
    /// the nodes left without purpose.
    ///
    /// Returns the chain the value was stored at together with the value.
    pub(crate) fn take(
        &mut self,
        chain: &[String],
        rkey: &str,
        changes: &mut Vec<Change>,
    ) -> Option<(Vec<String>, V)> {
        let Some(first) = rkey.chars().next() else {
            return self.content.take().map(|value| (chain.to_vec(), value));
        };

        let child = self.children.get_mut(&first)?;
        let rest = rkey.strip_prefix(child.suffix.as_str())?;
        let child_chain = chain_with(chain, &child.suffix);
        let taken = child.take(&child_chain, rest, changes)?;
        self.compact_child(first, chain, child_chain, changes);
        Some(taken)
    }

    /// Detaches an empty child or merges a valueless child with its only
    /// grandchild.
    fn compact_child(
        &mut self,
        first: char,
        chain: &[String],
        child_chain: Vec<String>,
        changes: &mut Vec<Change>,
    ) {
        let Some(child) = self.children.get_mut(&first) else {
            return;
        };
        if child.content.is_some() || child.children.len() > 1 {
            return;
        }

        let Some((_, mut grandchild)) = child.children.pop_first() else {
            trace!(chain = ?child_chain, "Detaching empty node");
            self.children.remove(&first);
            changes.push(Change::Removed(child_chain));
            return;
        };

        let merged_key = format!("{}{}", child.suffix, grandchild.suffix);
        trace!(chain = ?child_chain, merged_key = %merged_key, "Merging node with its only child");
        changes.push(Change::Moved {
            old_chain: child_chain.clone(),
            old_key: std::mem::take(&mut grandchild.suffix),
            new_chain: chain.to_vec(),
            new_key: merged_key.clone(),
        });
        changes.push(Change::Removed(child_chain));
        grandchild.suffix = merged_key;
        *child = grandchild;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_common_prefix_len() {
        assert_eq!(common_prefix_len("foobar", "foobaz"), 5);
        assert_eq!(common_prefix_len("foo", "bar"), 0);
        assert_eq!(common_prefix_len("", "bar"), 0);
        assert_eq!(common_prefix_len("foo", "foo"), 3);
        assert_eq!(common_prefix_len("äöx", "äöy"), 4);
        assert_eq!(common_prefix_len("ä", "ö"), 0);
    }

    #[test]
    fn test_chain_with() {
        let chain = chain_with(&[String::new()], "foo");
        assert_eq!(chain, vec!["".to_string(), "foo".to_string()]);
    }

    #[test]
    fn test_find_requires_whole_suffix() {
        let mut root = Node::root();
        root.attach(Node::new("foobar".to_string(), Some(1)));

        assert!(root.find("foobar").is_some());
        assert!(root.find("foo").is_none());
        assert!(root.find("foobarbaz").is_none());
        assert!(root.child("foobar").is_some());
        assert!(root.child("foo").is_none());
    }
}
