//! Read-only views of trie nodes.

use super::iter::Iter;
use super::node::{Node, chain_with};

/// A node of a trie together with its chain.
///
/// Obtained from [`Trie::root`](super::Trie::root) or
/// [`Trie::subtrie`](super::Trie::subtrie) and walked further down with
/// [`SubTrie::subtrie`].
#[derive(Debug)]
pub struct SubTrie<'a, V> {
    chain: Vec<String>,
    node: &'a Node<V>,
}

impl<'a, V> SubTrie<'a, V> {
    pub(crate) fn new(chain: Vec<String>, node: &'a Node<V>) -> Self {
        Self { chain, node }
    }

    /// Suffixes of all nodes from the root to this one.
    pub fn chain(&self) -> &[String] {
        &self.chain
    }

    /// Part of the key this node adds to its parent's key.
    pub fn suffix(&self) -> &'a str {
        &self.node.suffix
    }

    /// Full key of this node.
    pub fn key(&self) -> String {
        self.chain.concat()
    }

    /// True when the node has no children.
    pub fn is_terminal(&self) -> bool {
        self.node.is_terminal()
    }

    pub fn has_content(&self) -> bool {
        self.node.content.is_some()
    }

    /// Value stored at this node.
    pub fn value(&self) -> Option<&'a V> {
        self.node.content.as_ref()
    }

    /// Value stored under `rkey` relative to this node.
    pub fn get(&self, rkey: &str) -> Option<&'a V> {
        self.node.find(rkey)?.content.as_ref()
    }

    /// Child whose suffix is exactly `suffix`.
    pub fn subtrie(&self, suffix: &str) -> Option<SubTrie<'a, V>> {
        let child = self.node.child(suffix)?;
        Some(SubTrie::new(chain_with(&self.chain, suffix), child))
    }

    /// Children in suffix order.
    pub fn children(&self) -> impl Iterator<Item = SubTrie<'a, V>> + '_ {
        self.node
            .children
            .values()
            .map(|child| SubTrie::new(chain_with(&self.chain, &child.suffix), child))
    }

    /// Number of nodes below and including this one.
    pub fn node_count(&self) -> usize {
        self.node.node_count()
    }

    /// Entries of this subtree with keys relative to this node.
    pub fn iter(&self) -> Iter<'a, V> {
        Iter::new(self.node)
    }
}

impl<V> Clone for SubTrie<'_, V> {
    fn clone(&self) -> Self {
        Self {
            chain: self.chain.clone(),
            node: self.node,
        }
    }
}
