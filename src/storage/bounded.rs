//! Bounded Storage Module
//!
//! Packs variable-length values into fixed slots of a single pre-allocated
//! buffer, grouped into size classes.

use std::collections::{BTreeMap, HashMap};
use std::fmt;

use serde::Serialize;
use tracing::{debug, info};

use crate::error::{CacheError, Result};
use crate::storage::{Capacity, SlotPool, Storage};

/// Bytes reserved at the start of every slot for the value length.
pub const LENGTH_HEADER: usize = 4;

// == Bucket ==
/// One size class: every slot is `slot_size` bytes long.
#[derive(Debug)]
struct Bucket {
    slot_size: usize,
    slots: SlotPool,
}

// == Bucket Stats ==
/// Occupancy snapshot of one size class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BucketStats {
    /// Slot size in bytes, length header included
    pub slot_size: usize,
    /// Slots currently holding a value
    pub occupied: usize,
    /// Total slots in the class
    pub slots: usize,
}

// == Bounded Storage ==
/// Storage with a fixed capacity that can hold values of different sizes.
///
/// Each slot is laid out as `[u32 LE length][value bytes][padding]`. A key
/// lives in at most one size class at a time.
#[derive(Debug)]
pub struct BoundedStorage {
    /// Maps a key to the index of the bucket holding it
    key_to_bucket: HashMap<String, usize>,
    /// Buckets sorted by ascending slot size
    buckets: Vec<Bucket>,
    /// Backing buffer shared by every bucket
    data: Vec<u8>,
    /// Total number of slots across buckets
    capacity: usize,
}

impl BoundedStorage {
    // == Constructor ==
    /// Creates a new BoundedStorage.
    ///
    /// # Arguments
    /// * `classes` - `(max value size, slot count)` pairs. Pairs with a zero
    ///   size or zero count are ignored; for a repeated size the last pair wins.
    ///
    /// # Errors
    /// `InvalidConfiguration` if no usable pair remains or the layout does not
    /// fit in memory addressing.
    pub fn new(classes: impl IntoIterator<Item = (usize, usize)>) -> Result<Self> {
        let classes: BTreeMap<usize, usize> = classes
            .into_iter()
            .filter(|&(size, count)| size > 0 && count > 0)
            .collect();

        if classes.is_empty() {
            return Err(CacheError::InvalidConfiguration(
                "size class mapping must contain at least one non-zero size and count"
                    .to_string(),
            ));
        }

        let overflow = || {
            CacheError::InvalidConfiguration("size class layout overflows usize".to_string())
        };

        let mut buckets = Vec::with_capacity(classes.len());
        let mut total_bytes: usize = 0;
        let mut capacity: usize = 0;

        for (size, count) in classes {
            let slot_size = size.checked_add(LENGTH_HEADER).ok_or_else(overflow)?;
            let bucket_bytes = slot_size.checked_mul(count).ok_or_else(overflow)?;

            let start = total_bytes;
            let offsets = (0..count).map(|i| start + i * slot_size).collect();

            total_bytes = total_bytes.checked_add(bucket_bytes).ok_or_else(overflow)?;
            capacity += count;
            buckets.push(Bucket {
                slot_size,
                slots: SlotPool::new(offsets),
            });
        }

        info!(
            "Bounded storage allocated: {} buckets, {} slots, {} bytes",
            buckets.len(),
            capacity,
            total_bytes
        );

        Ok(Self {
            key_to_bucket: HashMap::with_capacity(capacity),
            buckets,
            data: vec![0; total_bytes],
            capacity,
        })
    }

    // == Bucket Of ==
    /// Returns the slot size of the bucket currently holding `key`.
    pub fn bucket_of(&self, key: &str) -> Option<usize> {
        self.key_to_bucket
            .get(key)
            .map(|&idx| self.buckets[idx].slot_size)
    }

    // == Bucket Stats ==
    /// Returns per-bucket occupancy in ascending slot size order.
    pub fn bucket_stats(&self) -> Vec<BucketStats> {
        self.buckets
            .iter()
            .map(|b| BucketStats {
                slot_size: b.slot_size,
                occupied: b.slots.size(),
                slots: b.slots.slots(),
            })
            .collect()
    }

    /// Finds the smallest bucket that fits `need` bytes and either has a free
    /// slot or already holds the key.
    fn select_bucket(&self, need: usize, current: Option<usize>) -> Option<usize> {
        self.buckets
            .iter()
            .enumerate()
            .find(|(idx, b)| {
                need <= b.slot_size && (!b.slots.is_full() || current == Some(*idx))
            })
            .map(|(idx, _)| idx)
    }
}

impl Storage for BoundedStorage {
    fn put(&mut self, key: &str, value: &[u8]) -> Result<()> {
        let no_space = || CacheError::NoSpace {
            key: key.to_string(),
            len: value.len(),
        };

        let need = value.len() + LENGTH_HEADER;
        let header = u32::try_from(value.len()).map_err(|_| no_space())?;
        let current = self.key_to_bucket.get(key).copied();

        let Some(target) = self.select_bucket(need, current) else {
            debug!("No bucket fits key ({}) with {} bytes", key, value.len());
            return Err(no_space());
        };

        // A key must be unique across buckets
        if let Some(prev) = current.filter(|&prev| prev != target) {
            self.buckets[prev].slots.free(key);
        }

        let offset = self.buckets[target].slots.occupy(key).ok_or_else(no_space)?;
        let body = offset + LENGTH_HEADER;
        self.data[offset..body].copy_from_slice(&header.to_le_bytes());
        self.data[body..body + value.len()].copy_from_slice(value);

        self.key_to_bucket.insert(key.to_string(), target);
        Ok(())
    }

    fn get(&self, key: &str) -> Option<&[u8]> {
        let bucket = self.buckets.get(*self.key_to_bucket.get(key)?)?;
        let offset = bucket.slots.get(key)?;

        let body = offset + LENGTH_HEADER;
        let header: [u8; LENGTH_HEADER] = self.data.get(offset..body)?.try_into().ok()?;
        let len = u32::from_le_bytes(header) as usize;

        self.data.get(body..body + len)
    }

    fn remove(&mut self, key: &str) {
        if let Some(idx) = self.key_to_bucket.remove(key) {
            self.buckets[idx].slots.free(key);
        }
    }

    fn size(&self) -> usize {
        self.buckets.iter().map(|b| b.slots.size()).sum()
    }

    fn capacity(&self) -> Capacity {
        Capacity::Bounded(self.capacity)
    }
}

impl fmt::Display for BoundedStorage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "BoundedStorage [")?;
        for (i, b) in self.buckets.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}B: {}/{}", b.slot_size, b.slots.size(), b.slots.slots())?;
        }
        write!(f, "] ({}/{} entries)", self.size(), self.capacity)
    }
}
