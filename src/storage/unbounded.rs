//! Unbounded Storage Module
//!
//! A thin wrapper around a `HashMap<String, Vec<u8>>`.

use std::collections::HashMap;
use std::fmt;

use crate::error::Result;
use crate::storage::{Capacity, Storage};

/// Map-backed storage with no capacity limit. `put` never fails.
#[derive(Debug, Default)]
pub struct UnboundedStorage {
    data: HashMap<String, Vec<u8>>,
}

impl UnboundedStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Storage for UnboundedStorage {
    fn put(&mut self, key: &str, value: &[u8]) -> Result<()> {
        self.data.insert(key.to_string(), value.to_vec());
        Ok(())
    }

    fn get(&self, key: &str) -> Option<&[u8]> {
        self.data.get(key).map(Vec::as_slice)
    }

    fn remove(&mut self, key: &str) {
        self.data.remove(key);
    }

    fn size(&self) -> usize {
        self.data.len()
    }

    fn capacity(&self) -> Capacity {
        Capacity::Unbounded
    }
}

impl fmt::Display for UnboundedStorage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "UnboundedStorage ({} entries)", self.data.len())
    }
}
