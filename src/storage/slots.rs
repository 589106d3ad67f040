//! Slot Pool Module
//!
//! Fixed-capacity allocator handing out pre-computed buffer offsets to keys.

use std::collections::HashMap;

// == Slot Pool ==
/// A fixed pool of offsets, each of which can be held by at most one key.
///
/// The pool is built once from a list of offsets and never grows.
#[derive(Debug)]
pub struct SlotPool {
    /// Offsets not currently held by any key
    free: Vec<usize>,
    /// Offsets held by keys
    occupied: HashMap<String, usize>,
    /// Total number of offsets in the pool
    slots: usize,
}

impl SlotPool {
    // == Constructor ==
    /// Creates a pool over the given offsets.
    ///
    /// Offsets are handed out in the order given.
    pub fn new(offsets: Vec<usize>) -> Self {
        let slots = offsets.len();
        let mut free = offsets;
        // Popped from the back, so reverse to serve the first offset first
        free.reverse();

        Self {
            free,
            occupied: HashMap::with_capacity(slots),
            slots,
        }
    }

    // == Occupy ==
    /// Assigns an offset to `key`.
    ///
    /// A key that already holds an offset keeps it. Returns `None` when the
    /// key holds nothing and the pool is full.
    pub fn occupy(&mut self, key: &str) -> Option<usize> {
        if let Some(&offset) = self.occupied.get(key) {
            return Some(offset);
        }

        let offset = self.free.pop()?;
        self.occupied.insert(key.to_string(), offset);
        Some(offset)
    }

    // == Free ==
    /// Returns the offset held by `key` to the pool. No-op for unknown keys.
    pub fn free(&mut self, key: &str) {
        if let Some(offset) = self.occupied.remove(key) {
            self.free.push(offset);
        }
    }

    // == Get ==
    /// Returns the offset held by `key`.
    pub fn get(&self, key: &str) -> Option<usize> {
        self.occupied.get(key).copied()
    }

    // == Is Full ==
    pub fn is_full(&self) -> bool {
        self.free.is_empty()
    }

    // == Size ==
    /// Returns the number of occupied offsets.
    pub fn size(&self) -> usize {
        self.occupied.len()
    }

    // == Slots ==
    /// Returns the total number of offsets in the pool.
    pub fn slots(&self) -> usize {
        self.slots
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pool_new() {
        let pool = SlotPool::new(vec![0, 8, 16]);
        assert_eq!(pool.size(), 0);
        assert_eq!(pool.slots(), 3);
        assert!(!pool.is_full());
    }

    #[test]
    fn test_pool_occupy_in_order() {
        let mut pool = SlotPool::new(vec![0, 8, 16]);

        assert_eq!(pool.occupy("a"), Some(0));
        assert_eq!(pool.occupy("b"), Some(8));
        assert_eq!(pool.occupy("c"), Some(16));
        assert!(pool.is_full());
        assert_eq!(pool.occupy("d"), None);
    }

    #[test]
    fn test_pool_occupy_same_key_keeps_offset() {
        let mut pool = SlotPool::new(vec![0, 8]);

        assert_eq!(pool.occupy("a"), Some(0));
        assert_eq!(pool.occupy("a"), Some(0));
        assert_eq!(pool.size(), 1);
    }

    #[test]
    fn test_pool_occupy_existing_key_when_full() {
        let mut pool = SlotPool::new(vec![0]);

        pool.occupy("a");
        assert!(pool.is_full());
        assert_eq!(pool.occupy("a"), Some(0));
    }

    #[test]
    fn test_pool_free_recycles_offset() {
        let mut pool = SlotPool::new(vec![0, 8]);

        pool.occupy("a");
        pool.occupy("b");
        pool.free("a");

        assert_eq!(pool.get("a"), None);
        assert_eq!(pool.size(), 1);
        assert_eq!(pool.occupy("c"), Some(0));
    }

    #[test]
    fn test_pool_free_unknown_key() {
        let mut pool = SlotPool::new(vec![0]);

        pool.occupy("a");
        pool.free("nonexistent");

        assert_eq!(pool.size(), 1);
        assert_eq!(pool.get("a"), Some(0));
    }
}
