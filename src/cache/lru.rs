//! LRU Policy Module
//!
//! Implements Least Recently Used eviction with an arena-backed doubly-linked
//! list. Nodes are addressed by stable indices instead of pointers.

use std::collections::HashMap;
use std::fmt;
use std::hash::Hash;

use tracing::warn;

use crate::cache::EvictionPolicy;

// == Node ==
#[derive(Debug)]
struct Node<K> {
    key: K,
    prev: Option<usize>,
    next: Option<usize>,
}

// == LRU Policy ==
/// Tracks access order for LRU eviction.
///
/// - Head = Most recently used
/// - Tail = Least recently used
///
/// A vacant arena slot is `None`, so any key value (including an empty
/// string) can be tracked.
#[derive(Debug)]
pub struct LruPolicy<K> {
    /// Node arena; `None` marks a slot on the free list
    nodes: Vec<Option<Node<K>>>,
    /// Vacant arena slots available for reuse
    free: Vec<usize>,
    /// Key to arena index
    index: HashMap<K, usize>,
    head: Option<usize>,
    tail: Option<usize>,
    capacity: usize,
}

impl<K: Hash + Eq + Clone> LruPolicy<K> {
    // == Constructor ==
    /// Creates an empty policy tracking at most `capacity` keys.
    ///
    /// A capacity of zero is raised to one.
    pub fn new(capacity: usize) -> Self {
        if capacity == 0 {
            warn!("LRU policy created with zero capacity, using 1");
        }
        let capacity = capacity.max(1);

        Self {
            nodes: Vec::with_capacity(capacity),
            free: Vec::new(),
            index: HashMap::with_capacity(capacity),
            head: None,
            tail: None,
            capacity,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    // == Contains ==
    /// Checks if a key is being tracked.
    pub fn contains(&self, key: &K) -> bool {
        self.index.contains_key(key)
    }

    // == Peek LRU ==
    /// Returns the least recently used key without removing it.
    pub fn peek_lru(&self) -> Option<&K> {
        self.tail.and_then(|idx| self.node(idx)).map(|n| &n.key)
    }

    // == Iter ==
    /// Iterates keys from most to least recently used.
    pub fn iter(&self) -> impl Iterator<Item = &K> + '_ {
        std::iter::successors(self.head, move |&idx| self.node(idx).and_then(|n| n.next))
            .filter_map(move |idx| self.node(idx).map(|n| &n.key))
    }

    fn node(&self, idx: usize) -> Option<&Node<K>> {
        self.nodes.get(idx).and_then(Option::as_ref)
    }

    fn node_mut(&mut self, idx: usize) -> Option<&mut Node<K>> {
        self.nodes.get_mut(idx).and_then(Option::as_mut)
    }

    /// Stores a detached node and returns its index.
    fn alloc(&mut self, key: K) -> usize {
        let node = Some(Node {
            key,
            prev: None,
            next: None,
        });
        match self.free.pop() {
            Some(idx) => {
                self.nodes[idx] = node;
                idx
            }
            None => {
                self.nodes.push(node);
                self.nodes.len() - 1
            }
        }
    }

    /// Vacates an arena slot. The node must already be unlinked.
    fn release(&mut self, idx: usize) -> Option<K> {
        let node = self.nodes.get_mut(idx)?.take()?;
        self.free.push(idx);
        Some(node.key)
    }

    /// Detaches a node from the list, fixing up its neighbours and the ends.
    fn unlink(&mut self, idx: usize) {
        let Some((prev, next)) = self.node(idx).map(|n| (n.prev, n.next)) else {
            return;
        };

        match prev {
            Some(p) => {
                if let Some(node) = self.node_mut(p) {
                    node.next = next;
                }
            }
            None => self.head = next,
        }
        match next {
            Some(n) => {
                if let Some(node) = self.node_mut(n) {
                    node.prev = prev;
                }
            }
            None => self.tail = prev,
        }

        if let Some(node) = self.node_mut(idx) {
            node.prev = None;
            node.next = None;
        }
    }

    /// Links a detached node at the head.
    fn push_front(&mut self, idx: usize) {
        let old_head = self.head;
        if let Some(node) = self.node_mut(idx) {
            node.prev = None;
            node.next = old_head;
        }
        match old_head {
            Some(h) => {
                if let Some(node) = self.node_mut(h) {
                    node.prev = Some(idx);
                }
            }
            None => self.tail = Some(idx),
        }
        self.head = Some(idx);
    }

    fn move_to_front(&mut self, idx: usize) {
        if self.head == Some(idx) {
            return;
        }
        self.unlink(idx);
        self.push_front(idx);
    }

    fn evict_tail(&mut self) -> Option<K> {
        let idx = self.tail?;
        self.unlink(idx);
        let key = self.release(idx)?;
        self.index.remove(&key);
        Some(key)
    }
}

impl<K: Hash + Eq + Clone + Send> EvictionPolicy<K> for LruPolicy<K> {
    fn record_access(&mut self, key: &K) -> Option<K> {
        if let Some(&idx) = self.index.get(key) {
            self.move_to_front(idx);
            return None;
        }

        let evicted = if self.index.len() >= self.capacity {
            self.evict_tail()
        } else {
            None
        };

        let idx = self.alloc(key.clone());
        self.push_front(idx);
        self.index.insert(key.clone(), idx);

        evicted
    }

    fn remove(&mut self, key: &K) {
        if let Some(idx) = self.index.remove(key) {
            self.unlink(idx);
            self.release(idx);
        }
    }

    fn len(&self) -> usize {
        self.index.len()
    }
}

impl<K: Hash + Eq + Clone + fmt::Display> fmt::Display for LruPolicy<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.index.is_empty() {
            return write!(f, "<EMPTY LRU>");
        }
        for key in self.iter() {
            write!(f, "{} -> ", key)?;
        }
        Ok(())
    }
}
