//! Recency List Module
//!
//! Intrusive doubly linked list ordering cache nodes for eviction.
//!
//! Nodes live in a slab (`Vec<Option<Node>>`) and link to their neighbours
//! by slot index, so the list owns every node and the index only ever holds
//! a copyable `NodeId`. Freed slots are recycled through a free list.
//!
//! ```text
//!   head ──► [A] ◄──► [B] ◄──► [C] ◄── tail
//!            MRU / newest       LRU / oldest
//! ```

use super::entry::CacheEntry;

// == Node Handle ==
/// Non-owning handle to a node in a [`RecencyList`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(usize);

// == Node ==
#[derive(Debug)]
struct Node<K, V> {
    key: K,
    entry: CacheEntry<V>,
    prev: Option<NodeId>,
    next: Option<NodeId>,
}

// == Recency List ==
/// Slab-backed recency list.
///
/// - Head = most recently used (or most recently inserted under FIFO)
/// - Tail = next eviction victim
#[derive(Debug)]
pub struct RecencyList<K, V> {
    slots: Vec<Option<Node<K, V>>>,
    free: Vec<usize>,
    head: Option<NodeId>,
    tail: Option<NodeId>,
    len: usize,
}

impl<K, V> RecencyList<K, V> {
    // == Constructor ==
    /// Creates an empty list.
    pub fn new() -> Self {
        Self {
            slots: Vec::new(),
            free: Vec::new(),
            head: None,
            tail: None,
            len: 0,
        }
    }

    // == Length ==
    /// Returns the number of linked nodes.
    pub fn len(&self) -> usize {
        self.len
    }

    // == Accessors ==
    /// Returns the handle at the tail (next victim).
    pub fn back(&self) -> Option<NodeId> {
        self.tail
    }

    /// Returns the entry stored at `id`.
    pub fn entry(&self, id: NodeId) -> Option<&CacheEntry<V>> {
        self.node(id).map(|node| &node.entry)
    }

    /// Returns the entry stored at `id` mutably.
    pub fn entry_mut(&mut self, id: NodeId) -> Option<&mut CacheEntry<V>> {
        self.node_mut(id).map(|node| &mut node.entry)
    }

    // == Push Front ==
    /// Links a new node at the head and returns its handle.
    pub fn push_front(&mut self, key: K, entry: CacheEntry<V>) -> NodeId {
        let node = Node {
            key,
            entry,
            prev: None,
            next: self.head,
        };

        let id = match self.free.pop() {
            Some(slot) => {
                self.slots[slot] = Some(node);
                NodeId(slot)
            }
            None => {
                self.slots.push(Some(node));
                NodeId(self.slots.len() - 1)
            }
        };

        match self.head {
            Some(old_head) => {
                if let Some(head_node) = self.node_mut(old_head) {
                    head_node.prev = Some(id);
                }
            }
            None => self.tail = Some(id),
        }
        self.head = Some(id);
        self.len += 1;
        id
    }

    // == Move To Front ==
    /// Relinks an existing node at the head.
    ///
    /// Returns false if `id` is not a live node.
    pub fn move_to_front(&mut self, id: NodeId) -> bool {
        if self.node(id).is_none() {
            return false;
        }
        if self.head == Some(id) {
            return true;
        }

        self.detach(id);

        let old_head = self.head;
        if let Some(node) = self.node_mut(id) {
            node.prev = None;
            node.next = old_head;
        }
        match old_head {
            Some(old_head) => {
                if let Some(head_node) = self.node_mut(old_head) {
                    head_node.prev = Some(id);
                }
            }
            None => self.tail = Some(id),
        }
        self.head = Some(id);
        true
    }

    // == Remove ==
    /// Unlinks the node and frees its slot, returning its key and entry.
    pub fn remove(&mut self, id: NodeId) -> Option<(K, CacheEntry<V>)> {
        self.node(id)?;
        self.detach(id);

        let node = self.slots[id.0].take()?;
        self.free.push(id.0);
        self.len -= 1;
        Some((node.key, node.entry))
    }

    // == Clear ==
    /// Drops every node and resets the slab.
    pub fn clear(&mut self) {
        self.slots.clear();
        self.free.clear();
        self.head = None;
        self.tail = None;
        self.len = 0;
    }

    // == Iteration ==
    /// Iterates nodes from head to tail.
    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter {
            list: self,
            cursor: self.head,
            remaining: self.len,
        }
    }

    fn node(&self, id: NodeId) -> Option<&Node<K, V>> {
        self.slots.get(id.0).and_then(Option::as_ref)
    }

    fn node_mut(&mut self, id: NodeId) -> Option<&mut Node<K, V>> {
        self.slots.get_mut(id.0).and_then(Option::as_mut)
    }

    /// Splices the node out of the chain, leaving it allocated.
    fn detach(&mut self, id: NodeId) {
        let Some((prev, next)) = self.node(id).map(|node| (node.prev, node.next)) else {
            return;
        };

        match prev {
            Some(prev_id) => {
                if let Some(prev_node) = self.node_mut(prev_id) {
                    prev_node.next = next;
                }
            }
            None => self.head = next,
        }

        match next {
            Some(next_id) => {
                if let Some(next_node) = self.node_mut(next_id) {
                    next_node.prev = prev;
                }
            }
            None => self.tail = prev,
        }

        if let Some(node) = self.node_mut(id) {
            node.prev = None;
            node.next = None;
        }
    }
}

impl<K, V> Default for RecencyList<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
impl<K, V> RecencyList<K, V> {
    pub fn front(&self) -> Option<NodeId> {
        self.head
    }

    pub fn key(&self, id: NodeId) -> Option<&K> {
        self.node(id).map(|node| &node.key)
    }

    /// Walks the chain tail to head, following `prev` links.
    pub fn keys_backward(&self) -> Vec<&K> {
        let mut keys = Vec::new();
        let mut cursor = self.tail;
        while let Some(id) = cursor {
            let Some(node) = self.node(id) else { break };
            keys.push(&node.key);
            cursor = node.prev;
        }
        keys
    }
}

// == Iterator ==
/// Head-to-tail iterator over `(handle, key, entry)`.
pub struct Iter<'a, K, V> {
    list: &'a RecencyList<K, V>,
    cursor: Option<NodeId>,
    remaining: usize,
}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = (NodeId, &'a K, &'a CacheEntry<V>);

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.cursor?;
        let node = self.list.node(id)?;
        self.cursor = node.next;
        self.remaining = self.remaining.saturating_sub(1);
        Some((id, &node.key, &node.entry))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}
