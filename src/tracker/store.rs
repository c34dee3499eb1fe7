//! The cache state guarded by the tracker's lock.
//!
//! `NewsStore` is plain synchronous data: every method runs to completion
//! without suspending, so the tracker can hold its mutex around any of them
//! and never across a fetch or a sleep.

use std::collections::HashMap;

/// What happened to a candidate item offered to [`NewsStore::push`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PushOutcome {
    /// Appended to the key's list.
    Stored,
    /// An identical item is already waiting for this key.
    Duplicate,
    /// The candidate was empty.
    Empty,
    /// The key already holds `capacity` items.
    Full,
    /// The key is not part of the fixed key set.
    UnknownKey,
}

#[derive(Debug, Default)]
struct Slot {
    /// Undelivered items, oldest first.
    items: Vec<String>,
    /// Refresh cycles without a new item since the last drain.
    missed_cycles: u32,
}

/// Per-key bounded, de-duplicated lists of undelivered news items.
#[derive(Debug)]
pub struct NewsStore {
    /// The fixed key set in construction order.
    keys: Vec<String>,
    slots: HashMap<String, Slot>,
    capacity: usize,
}

impl NewsStore {
    /// Create a store with an empty list and a zero miss counter per key.
    pub fn new(keys: &[String], capacity: usize) -> Self {
        let slots = keys
            .iter()
            .map(|key| (key.clone(), Slot::default()))
            .collect();
        Self {
            keys: keys.to_vec(),
            slots,
            capacity,
        }
    }

    /// The fixed key set, in construction order.
    pub fn keys(&self) -> &[String] {
        &self.keys
    }

    /// Number of undelivered items for `key` (0 for unknown keys).
    pub fn len(&self, key: &str) -> usize {
        self.slots.get(key).map_or(0, |slot| slot.items.len())
    }

    /// Whether `key` has reached capacity and should not be fetched.
    pub fn is_full(&self, key: &str) -> bool {
        self.len(key) >= self.capacity
    }

    /// Offer a candidate item for `key`.
    ///
    /// Only non-empty items not already waiting for this key are appended,
    /// and never beyond capacity.
    pub fn push(&mut self, key: &str, item: String) -> PushOutcome {
        let Some(slot) = self.slots.get_mut(key) else {
            return PushOutcome::UnknownKey;
        };
        if item.is_empty() {
            return PushOutcome::Empty;
        }
        if slot.items.contains(&item) {
            return PushOutcome::Duplicate;
        }
        if slot.items.len() >= self.capacity {
            return PushOutcome::Full;
        }
        slot.items.push(item);
        PushOutcome::Stored
    }

    /// Take every undelivered item for `key`, leaving it empty and resetting
    /// its miss counter.  Unknown keys yield nothing and change nothing.
    pub fn drain(&mut self, key: &str) -> Vec<String> {
        match self.slots.get_mut(key) {
            Some(slot) => {
                slot.missed_cycles = 0;
                std::mem::take(&mut slot.items)
            }
            None => Vec::new(),
        }
    }

    /// Take every undelivered item for every key, in key order.
    pub fn drain_all(&mut self) -> Vec<(String, Vec<String>)> {
        let Self { keys, slots, .. } = self;
        keys.iter()
            .map(|key| {
                let items = slots.get_mut(key).map_or_else(Vec::new, |slot| {
                    slot.missed_cycles = 0;
                    std::mem::take(&mut slot.items)
                });
                (key.clone(), items)
            })
            .collect()
    }

    /// Undelivered item counts per key, in key order.  Does not drain.
    pub fn pending(&self) -> Vec<(String, usize)> {
        self.keys
            .iter()
            .map(|key| (key.clone(), self.len(key)))
            .collect()
    }

    /// Current miss counter for `key`, `None` for unknown keys.
    ///
    /// Kept for interface compatibility: it is reset on every drain but no
    /// refresh policy reads or increments it.
    pub fn missed_cycles(&self, key: &str) -> Option<u32> {
        self.slots.get(key).map(|slot| slot.missed_cycles)
    }

    /// Copy of the undelivered items for `key`.  Does not drain.
    #[cfg(test)]
    pub fn peek(&self, key: &str) -> Vec<String> {
        self.slots
            .get(key)
            .map(|slot| slot.items.clone())
            .unwrap_or_default()
    }

    #[cfg(test)]
    pub(crate) fn set_missed_cycles(&mut self, key: &str, value: u32) {
        if let Some(slot) = self.slots.get_mut(key) {
            slot.missed_cycles = value;
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
