//! Ordered iteration over trie entries.

use super::node::Node;

/// Iterator over `(key, value)` pairs in lexicographic key order.
#[derive(Debug)]
pub struct Iter<'a, V> {
    stack: Vec<(String, &'a Node<V>)>,
}

impl<'a, V> Iter<'a, V> {
    pub(crate) fn new(start: &'a Node<V>) -> Self {
        Self {
            stack: vec![(String::new(), start)],
        }
    }
}

impl<'a, V> Iterator for Iter<'a, V> {
    type Item = (String, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        // Pre-order walk; a key sorts before every key it is a prefix of.
        while let Some((key, node)) = self.stack.pop() {
            for child in node.children.values().rev() {
                self.stack.push((format!("{key}{}", child.suffix), child));
            }
            if let Some(value) = &node.content {
                return Some((key, value));
            }
        }
        None
    }
}

/// Iterator over keys in lexicographic order.
#[derive(Debug)]
pub struct Keys<'a, V> {
    inner: Iter<'a, V>,
}

impl<'a, V> Keys<'a, V> {
    pub(crate) fn new(inner: Iter<'a, V>) -> Self {
        Self { inner }
    }
}

impl<V> Iterator for Keys<'_, V> {
    type Item = String;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(key, _)| key)
    }
}
