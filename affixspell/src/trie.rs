//! Character trie backing the root-word store.
//!
//! Nodes keep their children in a sorted small vector, so lookup is a binary
//! search per character and iteration is alphabetical. Enumeration is
//! breadth-first so a depth bound can prune whole subtrees instead of
//! filtering keys after the fact. Once built the trie is never mutated and is
//! safe for unsynchronized concurrent reads.

use std::collections::VecDeque;

use smol_str::SmolStr;

#[derive(Clone, Debug)]
struct Node<V> {
    children: Vec<(char, Node<V>)>,
    value: Option<V>,
}

impl<V> Node<V> {
    fn new() -> Node<V> {
        Node {
            children: Vec::new(),
            value: None,
        }
    }

    fn find_child(&self, key: char) -> Option<&Node<V>> {
        self.children
            .binary_search_by_key(&key, |(c, _)| *c)
            .ok()
            .map(|index| &self.children[index].1)
    }
}

/// Prefix tree from string keys to values.
#[derive(Clone, Debug)]
pub struct StringTrie<V> {
    root: Node<V>,
    len: usize,
}

impl<V> StringTrie<V> {
    pub fn new() -> StringTrie<V> {
        StringTrie {
            root: Node::new(),
            len: 0,
        }
    }

    /// Number of keys stored.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Inserts a key, returning the previously stored value if any.
    pub fn insert(&mut self, key: &str, value: V) -> Option<V> {
        let mut node = &mut self.root;
        for c in key.chars() {
            let index = match node.children.binary_search_by_key(&c, |(k, _)| *k) {
                Ok(index) => index,
                Err(index) => {
                    node.children.insert(index, (c, Node::new()));
                    index
                }
            };
            node = &mut node.children[index].1;
        }

        let previous = node.value.replace(value);
        if previous.is_none() {
            self.len += 1;
        }
        previous
    }

    pub fn get(&self, key: &str) -> Option<&V> {
        let mut node = &self.root;
        for c in key.chars() {
            node = node.find_child(c)?;
        }
        node.value.as_ref()
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Breadth-first iteration over all keys.
    pub fn iter(&self) -> Iter<'_, V> {
        self.iter_within_depth(usize::MAX)
    }

    /// Breadth-first iteration over keys of at most `max_depth` characters.
    ///
    /// Subtrees below the bound are never visited, which is what keeps
    /// bounded candidate scans cheap for suggestion collaborators.
    pub fn iter_within_depth(&self, max_depth: usize) -> Iter<'_, V> {
        let mut queue = VecDeque::new();
        queue.push_back((String::new(), &self.root));
        Iter { queue, max_depth }
    }
}

impl<V> Default for StringTrie<V> {
    fn default() -> Self {
        StringTrie::new()
    }
}

/// Breadth-first key/value iterator with an optional depth bound.
pub struct Iter<'a, V> {
    queue: VecDeque<(String, &'a Node<V>)>,
    max_depth: usize,
}

impl<'a, V> Iterator for Iter<'a, V> {
    type Item = (SmolStr, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        while let Some((key, node)) = self.queue.pop_front() {
            let depth = key.chars().count();
            if depth < self.max_depth {
                for (c, child) in &node.children {
                    let mut child_key = String::with_capacity(key.len() + c.len_utf8());
                    child_key.push_str(&key);
                    child_key.push(*c);
                    self.queue.push_back((child_key, child));
                }
            }

            if let Some(value) = node.value.as_ref() {
                return Some((SmolStr::new(key), value));
            }
        }

        None
    }
}
