//! Expiration Map Module
//!
//! Tracks the absolute expiration instant of every live key.

use std::collections::HashMap;
use std::time::{Duration, Instant};

// == Expiration Map ==
/// Maps a key to the instant after which it is considered expired.
#[derive(Debug, Default)]
pub struct ExpirationMap {
    deadlines: HashMap<String, Instant>,
}

impl ExpirationMap {
    pub fn new() -> Self {
        Self::default()
    }

    // == Insert ==
    /// Sets the deadline of `key`, returning the previous one.
    pub fn insert(&mut self, key: &str, deadline: Instant) -> Option<Instant> {
        self.deadlines.insert(key.to_string(), deadline)
    }

    pub fn remove(&mut self, key: &str) -> Option<Instant> {
        self.deadlines.remove(key)
    }

    pub fn deadline(&self, key: &str) -> Option<Instant> {
        self.deadlines.get(key).copied()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.deadlines.contains_key(key)
    }

    // == Is Expired ==
    /// Checks whether `key` is expired at `now`.
    ///
    /// An entry expires strictly after its deadline. A key without a
    /// deadline counts as expired.
    pub fn is_expired(&self, key: &str, now: Instant) -> bool {
        match self.deadlines.get(key) {
            Some(&deadline) => now > deadline,
            None => true,
        }
    }

    // == Time To Live ==
    /// Returns the time left before `key` expires, zero once it has.
    pub fn ttl_remaining(&self, key: &str, now: Instant) -> Option<Duration> {
        self.deadline(key)
            .map(|deadline| deadline.saturating_duration_since(now))
    }

    // == Drain Expired ==
    /// Removes and returns every key whose deadline has passed at `now`.
    ///
    /// Scans every entry, so the cost grows with the number of tracked keys.
    pub fn drain_expired(&mut self, now: Instant) -> Vec<String> {
        let mut expired = Vec::new();
        self.deadlines.retain(|key, deadline| {
            let keep = now <= *deadline;
            if !keep {
                expired.push(key.clone());
            }
            keep
        });
        expired
    }

    pub fn len(&self) -> usize {
        self.deadlines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.deadlines.is_empty()
    }
}
